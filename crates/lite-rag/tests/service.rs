mod common;

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use lite_rag::error::Error;
use lite_rag::generation::PromptBuilder;
use lite_rag::providers::DocumentStore;
use lite_rag::types::ADD_SUCCESS_MESSAGE;
use lite_rag::RagService;

use common::{echo_service, memory_store, EchoLlm, FailingLlm, FailingStore};

const K8S: &str = "Kubernetes is a container orchestration platform for automating deployment, scaling, and management.";
const PROMETHEUS: &str = "Prometheus is an open-source monitoring and alerting toolkit.";

#[tokio::test]
async fn test_query_empty_store_uses_empty_context() {
    let (service, _store, llm) = echo_service();

    let answer = service.handle_query("anything").await.unwrap();

    assert_eq!(answer, PromptBuilder::build_rag_prompt("", "anything"));
    assert_eq!(llm.calls().len(), 1);
}

#[tokio::test]
async fn test_kubernetes_scenario() {
    let (service, store, llm) = echo_service();
    store
        .add(&[K8S.to_string()], &["k8s".to_string()])
        .await
        .unwrap();

    let answer = service.handle_query("What is Kubernetes?").await.unwrap();

    assert!(answer.to_lowercase().contains("orchestration"));
    let (model, prompt) = llm.calls().pop().unwrap();
    assert_eq!(model, "tinyllama");
    assert_eq!(prompt, PromptBuilder::build_rag_prompt(K8S, "What is Kubernetes?"));
}

#[tokio::test]
async fn test_query_picks_the_most_similar_document() {
    let (service, store, _llm) = echo_service();
    store
        .add(
            &[K8S.to_string(), PROMETHEUS.to_string()],
            &["k8s.txt".to_string(), "prometheus.txt".to_string()],
        )
        .await
        .unwrap();

    let answer = service
        .handle_query("Which toolkit handles monitoring and alerting?")
        .await
        .unwrap();

    assert!(answer.contains(PROMETHEUS));
    assert!(!answer.contains(K8S));
}

#[tokio::test]
async fn test_answer_is_returned_verbatim() {
    let (service, _store, _llm) = echo_service();
    let answer = service.handle_query("  spaced question?  ").await.unwrap();
    assert!(answer.contains("Question:   spaced question?  \n"));
}

#[tokio::test]
async fn test_add_scenario() {
    let (service, store, _llm) = echo_service();

    let response = service.handle_add("hello world").await.unwrap();

    assert_eq!(response.request, "hello world");
    assert_eq!(response.message, ADD_SUCCESS_MESSAGE);
    let id = Uuid::parse_str(&response.document_id).unwrap();
    assert_eq!(id.get_version_num(), 4);
    assert_eq!(id.hyphenated().to_string(), response.document_id);

    let stored = store.fetch(&[response.document_id.clone()]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "hello world");
}

#[tokio::test]
async fn test_add_then_query_round_trip() {
    let (service, store, _llm) = echo_service();
    store
        .add(&[K8S.to_string()], &["k8s".to_string()])
        .await
        .unwrap();

    let added = service
        .handle_add("Grafana dashboards visualize time series metrics")
        .await
        .unwrap();

    let result = store
        .query(&["Grafana dashboards visualize metrics".to_string()], 1)
        .await
        .unwrap();
    assert_eq!(result.top_id(), Some(added.document_id.as_str()));

    let answer = service.handle_query("Grafana dashboards").await.unwrap();
    assert!(answer.contains("Grafana dashboards visualize time series metrics"));
}

#[tokio::test]
async fn test_add_accepts_any_string() {
    let (service, store, _llm) = echo_service();

    let empty = service.handle_add("").await.unwrap();
    let dup_a = service.handle_add("same").await.unwrap();
    let dup_b = service.handle_add("same").await.unwrap();

    assert_ne!(dup_a.document_id, dup_b.document_id);
    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(store.fetch(&[empty.document_id]).await.unwrap()[0].text, "");
}

#[tokio::test]
async fn test_add_ids_are_unique() {
    let (service, store, _llm) = echo_service();

    let mut ids = HashSet::new();
    for i in 0..500 {
        let response = service.handle_add(&format!("doc {}", i)).await.unwrap();
        assert!(ids.insert(response.document_id));
    }

    assert_eq!(store.count().await.unwrap(), 500);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let service = RagService::new(Arc::new(FailingStore), Arc::new(EchoLlm::default()), "tinyllama");

    assert!(matches!(
        service.handle_query("What is Kubernetes?").await,
        Err(Error::Store(_))
    ));
    assert!(matches!(service.handle_add("doc").await, Err(Error::Store(_))));
}

#[tokio::test]
async fn test_llm_failure_propagates() {
    let store = memory_store();
    let service = RagService::new(store, Arc::new(FailingLlm), "tinyllama");

    let err = service.handle_query("What is Kubernetes?").await.unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn test_concurrent_queries_are_independent() {
    let (service, store, llm) = echo_service();
    store
        .add(&[K8S.to_string()], &["k8s".to_string()])
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.handle_query(&format!("question {}", i)).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(llm.calls().len(), 16);
}
