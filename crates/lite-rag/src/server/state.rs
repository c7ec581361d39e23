//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::{open_store, EmbeddingProvider, OllamaProvider};
use crate::service::RagService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Query/add operations over the injected backends
    service: RagService,
}

impl AppState {
    /// Build the Ollama providers and the configured store
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");

        let (embedder, llm) = OllamaProvider::new(&config.llm)?.split();
        tracing::info!(
            "Ollama client initialized at {} (embeddings: {}, generation: {})",
            config.llm.base_url,
            embedder.model(),
            config.llm.generate_model
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let store = open_store(&config, embedder).await?;
        tracing::info!("Document store initialized ({})", store.name());

        let service = RagService::new(store, Arc::new(llm), config.llm.generate_model.clone());
        Ok(Self::with_service(config, service))
    }

    /// Wrap an already constructed service
    pub fn with_service(config: RagConfig, service: RagService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, service }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the RAG service
    pub fn service(&self) -> &RagService {
        &self.inner.service
    }
}
