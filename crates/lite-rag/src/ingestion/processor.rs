//! Ingestion orchestration: scan, then replace the store contents

use std::path::Path;
use std::sync::Arc;

use crate::config::IngestionConfig;
use crate::error::{Error, Result};
use crate::providers::DocumentStore;
use crate::types::Document;

use super::scanner::DirectoryScanner;

/// Summary of an ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents now in the store from this run
    pub documents: usize,
    /// Documents that were removed first
    pub removed: usize,
}

/// Main ingestion pipeline
pub struct Ingestor {
    store: Arc<dyn DocumentStore>,
    scanner: DirectoryScanner,
}

impl Ingestor {
    /// Create an ingestor writing to `store`
    pub fn new(store: Arc<dyn DocumentStore>, config: &IngestionConfig) -> Self {
        Self {
            store,
            scanner: DirectoryScanner::from_config(config),
        }
    }

    /// Read every recognised file in `dir` without touching the store
    pub async fn scan_directory(&self, dir: &Path) -> Result<Vec<Document>> {
        let scanner = self.scanner.clone();
        let dir = dir.to_path_buf();

        tokio::task::spawn_blocking(move || scanner.scan(&dir))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    /// Replace the store contents with one document per file in `dir`.
    ///
    /// All files are read before anything is deleted, so a read failure
    /// leaves the store as it was.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestReport> {
        tracing::info!("Ingesting {} into {}", dir.display(), self.store.name());

        let documents = self.scan_directory(dir).await?;
        let report = self.store.reindex_all(&documents).await?;

        tracing::info!(
            "Re-indexed {} documents ({} removed)",
            report.added,
            report.removed
        );

        Ok(IngestReport {
            documents: report.added,
            removed: report.removed,
        })
    }

    /// Store a single file under a fixed id, leaving other documents alone.
    ///
    /// Superseded by [`Ingestor::ingest_directory`]; kept for setups that
    /// still seed the store from one file.
    pub async fn bootstrap_file(&self, path: &Path, id: &str) -> Result<IngestReport> {
        tracing::warn!(
            "Single-file bootstrap is deprecated; prefer ingesting a directory"
        );

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::file_read(path, e))?;

        let ids = [id.to_string()];
        let removed = self.store.fetch(&ids).await?.len();
        self.store.upsert(&[text], &ids).await?;

        tracing::info!("Stored {} as '{}'", path.display(), id);

        Ok(IngestReport {
            documents: 1,
            removed,
        })
    }
}
