//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};

/// Confirmation returned by every successful add
pub const ADD_SUCCESS_MESSAGE: &str = "Document added successfully";

/// Response from a RAG query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer, verbatim from the backend
    pub answer: String,
}

/// Response from adding a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddResponse {
    /// The submitted document text
    pub request: String,
    /// Fixed confirmation message
    pub message: String,
    /// Generated document id
    pub document_id: String,
}

impl AddResponse {
    pub fn new(request: String, document_id: String) -> Self {
        Self {
            request,
            message: ADD_SUCCESS_MESSAGE.to_string(),
            document_id,
        }
    }
}
