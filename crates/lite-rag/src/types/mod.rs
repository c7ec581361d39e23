//! Core types for the RAG service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Document, QueryResult};
pub use query::{AddParams, QueryParams};
pub use response::{AddResponse, QueryResponse, ADD_SUCCESS_MESSAGE};
