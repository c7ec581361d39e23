//! Document store trait: a vector index keyed by document id

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::{Document, QueryResult};

/// Outcome of a full re-index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Documents deleted before the new batch went in
    pub removed: usize,
    /// Documents in the new batch
    pub added: usize,
}

/// Trait for document storage and similarity search
///
/// Implementations:
/// - `LocalStore`: JSON snapshot on disk (or in memory) with brute-force cosine search
/// - `ChromaStore`: Chroma server collection
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add documents under the given ids.
    ///
    /// `documents` and `ids` are parallel slices. Ids must not already exist.
    async fn add(&self, documents: &[String], ids: &[String]) -> Result<()>;

    /// Add documents, replacing any stored under the same ids.
    ///
    /// A failure (embedding included) leaves existing entries untouched.
    async fn upsert(&self, documents: &[String], ids: &[String]) -> Result<()>;

    /// Ids of every stored document
    async fn get(&self) -> Result<Vec<String>>;

    /// Fetch stored documents by id; unknown ids are skipped
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Document>>;

    /// Delete documents by id; unknown ids are ignored
    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Up to `n_results` best matches for each query text
    async fn query(&self, texts: &[String], n_results: usize) -> Result<QueryResult>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize> {
        Ok(self.get().await?.len())
    }

    /// Delete every stored document, returning how many were removed
    async fn clear(&self) -> Result<usize> {
        let ids = self.get().await?;
        if !ids.is_empty() {
            self.delete(&ids).await?;
        }
        Ok(ids.len())
    }

    /// Replace the whole store with `documents`.
    ///
    /// The default is two-phase: clear, then bulk insert. If the process dies
    /// between the phases the store is left empty. Backends that can swap
    /// their contents in one step override this.
    async fn reindex_all(&self, documents: &[Document]) -> Result<ReindexReport> {
        check_batch_ids(documents.iter().map(|d| d.id.as_str()))?;

        let removed = self.clear().await?;

        if !documents.is_empty() {
            let (texts, ids): (Vec<String>, Vec<String>) = documents
                .iter()
                .map(|d| (d.text.clone(), d.id.clone()))
                .unzip();
            self.add(&texts, &ids).await?;
        }

        Ok(ReindexReport {
            removed,
            added: documents.len(),
        })
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Validate the shape of an `add` call
pub(crate) fn check_add_args(documents: &[String], ids: &[String]) -> Result<()> {
    if documents.len() != ids.len() {
        return Err(Error::store(format!(
            "add called with {} documents but {} ids",
            documents.len(),
            ids.len()
        )));
    }
    check_batch_ids(ids.iter().map(String::as_str))
}

/// Reject batches that repeat an id
pub(crate) fn check_batch_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_add_args() {
        let docs = vec!["a".to_string(), "b".to_string()];
        assert!(check_add_args(&docs, &["1".into(), "2".into()]).is_ok());
        assert!(matches!(
            check_add_args(&docs, &["1".into()]),
            Err(Error::Store(_))
        ));
        assert!(matches!(
            check_add_args(&docs, &["1".into(), "1".into()]),
            Err(Error::DuplicateId(id)) if id == "1"
        ));
    }
}
