//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use lite_rag::config::RagConfig;
use lite_rag::error::{Error, Result};
use lite_rag::providers::{DocumentStore, EmbeddingProvider, LlmProvider, LocalStore};
use lite_rag::server::{state::AppState, RagServer};
use lite_rag::types::{Document, QueryResult};
use lite_rag::RagService;

const DIMS: usize = 256;

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % DIMS] += 1.0;
        }
        Ok(vector)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Embedding backend that is always down
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("model not loaded"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Generation stub that answers with the prompt it was given
#[derive(Default)]
pub struct EchoLlm {
    calls: Mutex<Vec<(String, String)>>,
}

impl EchoLlm {
    /// (model, prompt) pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.calls.lock().push((model.to_string(), prompt.to_string()));
        Ok(prompt.to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Generation backend that is always down
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
        Err(Error::llm("connection refused"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Store that is always unreachable
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn add(&self, _documents: &[String], _ids: &[String]) -> Result<()> {
        Err(Error::store("unreachable"))
    }

    async fn upsert(&self, _documents: &[String], _ids: &[String]) -> Result<()> {
        Err(Error::store("unreachable"))
    }

    async fn get(&self) -> Result<Vec<String>> {
        Err(Error::store("unreachable"))
    }

    async fn fetch(&self, _ids: &[String]) -> Result<Vec<Document>> {
        Err(Error::store("unreachable"))
    }

    async fn delete(&self, _ids: &[String]) -> Result<()> {
        Err(Error::store("unreachable"))
    }

    async fn query(&self, _texts: &[String], _n_results: usize) -> Result<QueryResult> {
        Err(Error::store("unreachable"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub fn memory_store() -> Arc<LocalStore> {
    Arc::new(LocalStore::in_memory(Arc::new(KeywordEmbedder)))
}

/// Service over an in-memory store and an echoing backend
pub fn echo_service() -> (RagService, Arc<LocalStore>, Arc<EchoLlm>) {
    let store = memory_store();
    let llm = Arc::new(EchoLlm::default());
    let service = RagService::new(store.clone(), llm.clone(), "tinyllama");
    (service, store, llm)
}

/// Serve `service` on an ephemeral port and return its base URL
pub async fn spawn_server(service: RagService) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::with_service(RagConfig::default(), service);
    let server = RagServer::with_state(state);
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    format!("http://{}", addr)
}
