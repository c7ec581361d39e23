//! Provider abstractions for embeddings, generation and document storage
//!
//! The service only talks to these traits, so the Ollama and Chroma backends
//! can be swapped for the local store or for test doubles.

pub mod chroma;
pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod store;

use std::sync::Arc;

use crate::config::{RagConfig, StoreBackend};
use crate::error::Result;

pub use chroma::ChromaStore;
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::LocalStore;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
pub use store::{DocumentStore, ReindexReport};

/// Open the document store selected by `config.store.backend`
pub async fn open_store(
    config: &RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Local => Arc::new(LocalStore::open(&config.store.path, embedder)?),
        StoreBackend::Chroma => Arc::new(ChromaStore::connect(&config.store, embedder).await?),
    };
    Ok(store)
}
