//! Document types shared by the stores and ingestion

use serde::{Deserialize, Serialize};

/// A unit of ingested text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id within the store (filename, fixed label or UUID)
    pub id: String,
    /// Raw text content
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ranked matches for a batch of query texts.
///
/// Each outer entry corresponds to one query text; inner lists are ordered
/// best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
    pub distances: Vec<Vec<f32>>,
}

impl QueryResult {
    /// Text of the best match for the first query, if any
    pub fn top_document(&self) -> Option<&str> {
        self.documents
            .first()
            .and_then(|docs| docs.first())
            .map(String::as_str)
    }

    /// Id of the best match for the first query, if any
    pub fn top_id(&self) -> Option<&str> {
        self.ids.first().and_then(|ids| ids.first()).map(String::as_str)
    }
}
