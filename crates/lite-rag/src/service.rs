//! Query and add operations, independent of the HTTP layer

use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::providers::{DocumentStore, LlmProvider};
use crate::types::AddResponse;

/// The RAG service: one store, one generation backend, one model.
#[derive(Clone)]
pub struct RagService {
    store: Arc<dyn DocumentStore>,
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl RagService {
    /// Create a service over explicitly constructed backends
    pub fn new(
        store: Arc<dyn DocumentStore>,
        llm: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            llm,
            model: model.into(),
        }
    }

    /// Document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Generation backend
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Generation model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `question` using the single best-matching document as context.
    ///
    /// An empty store yields an empty context, not an error.
    pub async fn handle_query(&self, question: &str) -> Result<String> {
        let start = Instant::now();

        let results = self.store.query(&[question.to_string()], 1).await?;
        let context = results.top_document().unwrap_or_default();

        match results.top_id() {
            Some(id) => tracing::debug!("Using document '{}' as context", id),
            None => tracing::debug!("No documents matched; generating without context"),
        }

        let prompt = PromptBuilder::build_rag_prompt(context, question);
        let answer = self.llm.generate(&self.model, &prompt).await?;

        tracing::info!(
            "Query answered in {}ms ({} chars)",
            start.elapsed().as_millis(),
            answer.len()
        );

        Ok(answer)
    }

    /// Store `text` under a fresh UUID v4
    pub async fn handle_add(&self, text: &str) -> Result<AddResponse> {
        let document_id = Uuid::new_v4().to_string();

        self.store
            .add(&[text.to_string()], &[document_id.clone()])
            .await?;

        tracing::info!("Added document {} ({} bytes)", document_id, text.len());

        Ok(AddResponse::new(text.to_string(), document_id))
    }
}
