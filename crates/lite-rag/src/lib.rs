//! lite-rag: a minimal retrieval-augmented generation service
//!
//! Documents live in a [`DocumentStore`](providers::DocumentStore) (a local
//! JSON snapshot or a Chroma collection). A query retrieves the single best
//! match, embeds it as context in a prompt, and returns whatever the
//! generation backend (Ollama) produces. Ingestion replaces the whole store
//! with one document per text file in a directory.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod service;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use service::RagService;
pub use types::{AddResponse, Document, QueryResponse, QueryResult};
