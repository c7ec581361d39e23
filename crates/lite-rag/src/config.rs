//! Configuration for the RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "LITE_RAG_CONFIG";

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Document store configuration
    pub store: StoreConfig,
    /// Ingestion configuration
    pub ingestion: IngestionConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from an explicit path, then `LITE_RAG_CONFIG`,
    /// then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that can only fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.llm.generate_model.trim().is_empty() {
            return Err(Error::Config("llm.generate_model must not be empty".into()));
        }
        if self.llm.embed_model.trim().is_empty() {
            return Err(Error::Config("llm.embed_model must not be empty".into()));
        }
        if self.store.backend == StoreBackend::Chroma {
            let store = &self.store;
            for (key, value) in [
                ("store.chroma_tenant", &store.chroma_tenant),
                ("store.chroma_database", &store.chroma_database),
                ("store.collection", &store.collection),
            ] {
                if value.trim().is_empty() {
                    return Err(Error::Config(format!("{} must not be empty", key)));
                }
            }
        }
        if self.ingestion.extensions.is_empty() {
            return Err(Error::Config("ingestion.extensions must list at least one extension".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Request timeout in seconds; unset means requests may block indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "tinyllama".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            timeout_secs: None,
        }
    }
}

/// Which document store backs the service
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON snapshot on the local filesystem
    #[default]
    Local,
    /// Chroma server collection
    Chroma,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Local => "local",
            StoreBackend::Chroma => "chroma",
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: StoreBackend,
    /// Snapshot path for the local backend
    pub path: PathBuf,
    /// Chroma server URL (REST v2 API, Chroma 1.x)
    pub chroma_url: String,
    /// Chroma tenant owning the database
    pub chroma_tenant: String,
    /// Chroma database holding the collection
    pub chroma_database: String,
    /// Collection name
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lite-rag")
            .join("store.json");

        Self {
            backend: StoreBackend::Local,
            path,
            // 8000 is taken by the service itself
            chroma_url: "http://localhost:8001".to_string(),
            chroma_tenant: "default_tenant".to_string(),
            chroma_database: "default_database".to_string(),
            collection: "docs".to_string(),
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Directory scanned by a full re-ingestion
    pub directory: PathBuf,
    /// File extensions treated as text documents (without the dot)
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Single file used by the bootstrap path
    pub bootstrap_file: PathBuf,
    /// Fixed id the bootstrap document is stored under
    pub bootstrap_id: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("docs"),
            extensions: vec!["txt".to_string()],
            recursive: false,
            bootstrap_file: PathBuf::from("k8s.txt"),
            bootstrap_id: "k8s".to_string(),
        }
    }
}
