//! Directory scanning for text documents

use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::IngestionConfig;
use crate::error::{Error, Result};
use crate::types::Document;

/// Collects one document per recognised text file in a directory
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    /// Lowercased extensions without the dot
    extensions: Vec<String>,
    recursive: bool,
}

impl DirectoryScanner {
    pub fn new<S: AsRef<str>>(extensions: &[S], recursive: bool) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            recursive,
        }
    }

    pub fn from_config(config: &IngestionConfig) -> Self {
        Self::new(&config.extensions, config.recursive)
    }

    /// Whether `path` has one of the recognised extensions
    pub fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|known| *known == e))
    }

    /// Read every recognised file under `dir`, keyed by filename and sorted by id.
    ///
    /// Fails on the first file that cannot be read as UTF-8 text.
    pub fn scan(&self, dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(Error::file_read(dir, "not a directory"));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut documents = Vec::new();
        let mut seen = HashSet::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::file_read(path, e)
            })?;

            if !entry.file_type().is_file() || !self.is_recognized(entry.path()) {
                continue;
            }

            let path = entry.path();
            let id = entry
                .file_name()
                .to_str()
                .ok_or_else(|| Error::file_read(path, "file name is not valid UTF-8"))?
                .to_string();

            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateId(id));
            }

            let text = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
            tracing::debug!("Read {} ({} bytes)", path.display(), text.len());

            documents.push(Document::new(id, text));
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}
