//! Service wired to the real Ollama providers, pointed at a local stand-in
//! for the Ollama HTTP API.

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use lite_rag::config::LlmConfig;
use lite_rag::providers::{DocumentStore, LocalStore, OllamaProvider};
use lite_rag::types::ADD_SUCCESS_MESSAGE;
use lite_rag::RagService;

/// Mirrors Ollama: an empty prompt embeds to `[]`
async fn embeddings(Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["prompt"].as_str().unwrap_or_default().to_lowercase();
    if prompt.is_empty() {
        return Json(json!({ "embedding": [] }));
    }

    let hits = |word: &str| if prompt.contains(word) { 1.0 } else { 0.0 };
    Json(json!({
        "embedding": [hits("kubernetes"), hits("prometheus"), 0.1]
    }))
}

async fn generate(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "model": body["model"],
        "response": format!("echo: {}", body["prompt"].as_str().unwrap_or_default()),
        "done": true
    }))
}

async fn ollama_service() -> (RagService, Arc<LocalStore>) {
    let app = Router::new()
        .route("/api/embeddings", post(embeddings))
        .route("/api/generate", post(generate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = LlmConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: Some(5),
        ..LlmConfig::default()
    };
    let (embedder, llm) = OllamaProvider::new(&config).unwrap().split();
    let store = Arc::new(LocalStore::in_memory(Arc::new(embedder)));
    let service = RagService::new(store.clone(), Arc::new(llm), "tinyllama");
    (service, store)
}

#[tokio::test]
async fn test_empty_strings_are_accepted() {
    let (service, store) = ollama_service().await;

    let added = service.handle_add("").await.unwrap();
    assert_eq!(added.request, "");
    assert_eq!(added.message, ADD_SUCCESS_MESSAGE);
    assert_eq!(store.count().await.unwrap(), 1);

    let answer = service.handle_query("").await.unwrap();
    assert!(answer.starts_with("echo: Context:\n"));
    assert!(answer.ends_with("Question: \n\nAnswer clearly and concisely:"));
}

#[tokio::test]
async fn test_empty_question_still_answers_from_a_populated_store() {
    let (service, _store) = ollama_service().await;
    service
        .handle_add("Kubernetes is a container orchestration platform.")
        .await
        .unwrap();
    service.handle_add("").await.unwrap();

    assert!(service.handle_query("").await.is_ok());

    let answer = service.handle_query("What is Kubernetes?").await.unwrap();
    assert!(answer.contains("Context:\nKubernetes is a container orchestration platform."));
}
