//! Local document store: a JSON snapshot on disk searched by brute-force
//! cosine similarity.
//!
//! Several handles may share one snapshot, typically a running server and
//! the ingestion binary. Every handle reloads the file once it no longer
//! matches the version it last saw. Mutations hold an exclusive lock on a
//! sidecar `<snapshot>.lock` file while they reload, apply the change and
//! rename a fresh temp file over the snapshot. In-memory entries change only
//! after that write succeeds. Without a path the store lives purely in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{File, Metadata, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::types::{Document, QueryResult};

use super::embedding::EmbeddingProvider;
use super::store::{check_add_args, check_batch_ids, DocumentStore, ReindexReport};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    id: String,
    text: String,
    embedding: Vec<f32>,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    documents: Vec<StoredEntry>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    documents: &'a [StoredEntry],
}

/// Identifies one written version of the snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
    /// Each write renames a new file into place
    #[cfg(unix)]
    inode: u64,
}

impl FileStamp {
    fn of(meta: &Metadata) -> io::Result<Self> {
        Ok(Self {
            modified: meta.modified()?,
            len: meta.len(),
            #[cfg(unix)]
            inode: std::os::unix::fs::MetadataExt::ino(meta),
        })
    }
}

#[derive(Default)]
struct Contents {
    entries: Vec<StoredEntry>,
    /// File version `entries` were loaded from or last written as
    stamp: Option<FileStamp>,
}

/// Local vector store
pub struct LocalStore {
    embedder: Arc<dyn EmbeddingProvider>,
    /// Snapshot location; `None` keeps everything in memory
    path: Option<PathBuf>,
    contents: RwLock<Contents>,
    /// Serializes mutations made through this handle
    write_gate: Mutex<()>,
}

impl LocalStore {
    /// Open (or create) a store persisted at `path`
    pub fn open(path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents = match file_stamp(&path)? {
            Some(stamp) => Contents {
                entries: load_snapshot(&path)?,
                stamp: Some(stamp),
            },
            None => Contents::default(),
        };

        tracing::info!(
            "Local store opened at {} ({} documents)",
            path.display(),
            contents.entries.len()
        );

        Ok(Self {
            embedder,
            path: Some(path),
            contents: RwLock::new(contents),
            write_gate: Mutex::new(()),
        })
    }

    /// Create a store that is never written to disk
    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            path: None,
            contents: RwLock::new(Contents::default()),
            write_gate: Mutex::new(()),
        }
    }

    async fn build_entries(&self, documents: &[String], ids: &[String]) -> Result<Vec<StoredEntry>> {
        let embeddings = self.embedder.embed_batch(documents).await?;
        if embeddings.len() != documents.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} documents",
                self.embedder.name(),
                embeddings.len(),
                documents.len()
            )));
        }

        let now = Utc::now();
        Ok(ids
            .iter()
            .zip(documents)
            .zip(embeddings)
            .map(|((id, text), embedding)| StoredEntry {
                id: id.clone(),
                text: text.clone(),
                embedding,
                added_at: now,
            })
            .collect())
    }

    /// Pick up a snapshot written by another handle since we last looked
    async fn refresh(&self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let known = self.contents.read().stamp;

        let reloaded = run_blocking(move || match file_stamp(&path)? {
            Some(current) if Some(current) != known => Ok(Some(Contents {
                entries: load_snapshot(&path)?,
                stamp: Some(current),
            })),
            _ => Ok(None),
        })
        .await?;

        if let Some(fresh) = reloaded {
            let mut contents = self.contents.write();
            // A local write may have landed while we were reading
            if contents.stamp == known {
                tracing::debug!("Reloaded snapshot ({} documents)", fresh.entries.len());
                *contents = fresh;
            }
        }
        Ok(())
    }

    /// Apply `change` to the latest entries and persist the result
    async fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Vec<StoredEntry>) -> Result<T> + Send + 'static,
    {
        let _gate = self.write_gate.lock().await;
        let (known, mut entries) = {
            let contents = self.contents.read();
            (contents.stamp, contents.entries.clone())
        };

        let Some(path) = self.path.clone() else {
            let output = change(&mut entries)?;
            self.contents.write().entries = entries;
            return Ok(output);
        };

        let (output, contents) = run_blocking(move || {
            let _lock = lock_snapshot(&path)?;
            if let Some(current) = file_stamp(&path)? {
                if Some(current) != known {
                    entries = load_snapshot(&path)?;
                }
            }

            let output = change(&mut entries)?;
            let stamp = write_atomic(&path, &entries)?;
            Ok((
                output,
                Contents {
                    entries,
                    stamp: Some(stamp),
                },
            ))
        })
        .await?;

        *self.contents.write() = contents;
        Ok(output)
    }
}

async fn run_blocking<R, F>(work: F) -> Result<R>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
}

fn file_stamp(path: &Path) -> Result<Option<FileStamp>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(FileStamp::of(&meta)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_snapshot(path: &Path) -> Result<Vec<StoredEntry>> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .map_err(|e| Error::store(format!("Corrupt snapshot '{}': {}", path.display(), e)))?;
    Ok(snapshot.documents)
}

/// Exclusive lock on `<snapshot>.lock`, released when the handle drops
fn lock_snapshot(path: &Path) -> Result<File> {
    let mut lock_path = OsString::from(path.as_os_str());
    lock_path.push(".lock");

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(PathBuf::from(lock_path))?;
    file.lock()?;
    Ok(file)
}

fn write_atomic(path: &Path, entries: &[StoredEntry]) -> Result<FileStamp> {
    let bytes = serde_json::to_vec_pretty(&SnapshotRef { documents: entries })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    let stamp = FileStamp::of(&tmp.as_file().metadata()?)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(stamp)
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn add(&self, documents: &[String], ids: &[String]) -> Result<()> {
        check_add_args(documents, ids)?;
        let new_entries = self.build_entries(documents, ids).await?;

        self.mutate(move |entries| {
            if let Some(existing) = new_entries
                .iter()
                .find(|n| entries.iter().any(|e| e.id == n.id))
            {
                return Err(Error::DuplicateId(existing.id.clone()));
            }
            entries.extend(new_entries);
            Ok(())
        })
        .await
    }

    /// Embeds first, so a failed embedding leaves the old entries in place
    async fn upsert(&self, documents: &[String], ids: &[String]) -> Result<()> {
        check_add_args(documents, ids)?;
        let new_entries = self.build_entries(documents, ids).await?;

        self.mutate(move |entries| {
            let replaced: HashSet<&str> = new_entries.iter().map(|e| e.id.as_str()).collect();
            entries.retain(|e| !replaced.contains(e.id.as_str()));
            entries.extend(new_entries);
            Ok(())
        })
        .await
    }

    async fn get(&self) -> Result<Vec<String>> {
        self.refresh().await?;
        Ok(self.contents.read().entries.iter().map(|e| e.id.clone()).collect())
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<Document>> {
        self.refresh().await?;
        let contents = self.contents.read();
        Ok(ids
            .iter()
            .filter_map(|id| contents.entries.iter().find(|e| &e.id == id))
            .map(|e| Document::new(e.id.clone(), e.text.clone()))
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let doomed: HashSet<String> = ids.iter().cloned().collect();

        self.mutate(move |entries| {
            entries.retain(|e| !doomed.contains(&e.id));
            Ok(())
        })
        .await
    }

    async fn query(&self, texts: &[String], n_results: usize) -> Result<QueryResult> {
        let query_embeddings = self.embedder.embed_batch(texts).await?;
        self.refresh().await?;

        let contents = self.contents.read();
        let mut result = QueryResult::default();

        for query in &query_embeddings {
            let mut scored: Vec<(f32, &StoredEntry)> = contents
                .entries
                .iter()
                .map(|e| (cosine_sim(query, &e.embedding), e))
                .collect();

            // Stable sort keeps insertion order among ties
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            scored.truncate(n_results);

            result.ids.push(scored.iter().map(|(_, e)| e.id.clone()).collect());
            result.documents.push(scored.iter().map(|(_, e)| e.text.clone()).collect());
            result.distances.push(scored.iter().map(|(sim, _)| 1.0 - sim).collect());
        }

        Ok(result)
    }

    async fn count(&self) -> Result<usize> {
        self.refresh().await?;
        Ok(self.contents.read().entries.len())
    }

    /// Embeds the whole batch first, then swaps it in and writes one
    /// snapshot. An interrupted run leaves the previous contents.
    async fn reindex_all(&self, documents: &[Document]) -> Result<ReindexReport> {
        check_batch_ids(documents.iter().map(|d| d.id.as_str()))?;

        let (texts, ids): (Vec<String>, Vec<String>) = documents
            .iter()
            .map(|d| (d.text.clone(), d.id.clone()))
            .unzip();
        let new_entries = self.build_entries(&texts, &ids).await?;

        let removed = self
            .mutate(move |entries| Ok(std::mem::replace(entries, new_entries).len()))
            .await?;

        Ok(ReindexReport {
            removed,
            added: documents.len(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.path.as_ref().map_or(true, |p| {
            p.parent().map_or(true, |dir| dir.as_os_str().is_empty() || dir.exists())
        }))
    }

    fn name(&self) -> &str {
        if self.path.is_some() {
            "local-json"
        } else {
            "in-memory"
        }
    }
}
