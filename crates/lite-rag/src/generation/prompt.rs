//! Prompt templates for RAG generation

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the RAG prompt: context first, then the question, then the
    /// answering instruction.
    pub fn build_rag_prompt(context: &str, question: &str) -> String {
        format!(
            "Context:\n{context}\n\nQuestion: {question}\n\nAnswer clearly and concisely:",
            context = context,
            question = question
        )
    }
}
