//! Ingestion binary: replaces the store contents with a directory of text files
//!
//! Run with: cargo run -p lite-rag --bin lite-rag-ingest -- docs/
//! or, for the deprecated single-file path:
//! cargo run -p lite-rag --bin lite-rag-ingest -- --bootstrap k8s.txt --id k8s

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lite_rag::{
    config::RagConfig,
    ingestion::Ingestor,
    providers::{open_store, EmbeddingProvider, OllamaEmbedder},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lite-rag-ingest", version, about = "Re-index the document store")]
struct Args {
    /// TOML config file (falls back to $LITE_RAG_CONFIG, then defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to ingest (defaults to ingestion.directory)
    #[arg(conflicts_with = "bootstrap")]
    dir: Option<PathBuf>,

    /// Deprecated: add a single file under a fixed id instead of re-indexing
    /// (FILE defaults to ingestion.bootstrap_file)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    bootstrap: Option<Option<PathBuf>>,

    /// Document id for --bootstrap (defaults to ingestion.bootstrap_id)
    #[arg(long, requires = "bootstrap")]
    id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lite_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = RagConfig::load(args.config.as_deref())?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.llm)?);
    let store = open_store(&config, embedder).await?;
    let ingestor = Ingestor::new(store, &config.ingestion);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = if let Some(file) = args.bootstrap {
        let file = file.unwrap_or_else(|| config.ingestion.bootstrap_file.clone());
        let id = args.id.unwrap_or_else(|| config.ingestion.bootstrap_id.clone());
        spinner.set_message(format!("Embedding {}", file.display()));
        ingestor.bootstrap_file(&file, &id).await
    } else {
        let dir = args.dir.unwrap_or_else(|| config.ingestion.directory.clone());
        spinner.set_message(format!("Embedding documents from {}", dir.display()));
        ingestor.ingest_directory(&dir).await
    };

    spinner.finish_and_clear();
    let report = result?;

    println!(
        "Embedded {} document(s) successfully ({} replaced)",
        report.documents, report.removed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_takes_an_optional_file() {
        let args =
            Args::try_parse_from(["lite-rag-ingest", "--bootstrap", "k8s.txt", "--id", "k8s"])
                .unwrap();
        assert_eq!(args.bootstrap, Some(Some(PathBuf::from("k8s.txt"))));
        assert_eq!(args.id.as_deref(), Some("k8s"));

        let args = Args::try_parse_from(["lite-rag-ingest", "--bootstrap"]).unwrap();
        assert_eq!(args.bootstrap, Some(None));

        let args = Args::try_parse_from(["lite-rag-ingest", "docs"]).unwrap();
        assert_eq!(args.bootstrap, None);
        assert_eq!(args.dir, Some(PathBuf::from("docs")));
    }

    #[test]
    fn test_id_requires_bootstrap() {
        assert!(Args::try_parse_from(["lite-rag-ingest", "--id", "k8s"]).is_err());
    }
}
