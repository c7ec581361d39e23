//! Request parameter types

use serde::{Deserialize, Serialize};

/// `POST /query?q=...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParams {
    /// The question to answer
    pub q: String,
}

/// `POST /add?doc=...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddParams {
    /// Document text to insert
    pub doc: String,
}
