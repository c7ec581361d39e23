//! Offline document ingestion

mod processor;
mod scanner;

pub use processor::{IngestReport, Ingestor};
pub use scanner::DirectoryScanner;
