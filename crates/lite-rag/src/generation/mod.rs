//! Answer generation via Ollama

mod ollama;
mod prompt;

pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
