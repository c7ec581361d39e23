//! RAG Server binary
//!
//! Run with: cargo run -p lite-rag --bin lite-rag-server

use clap::Parser;
use lite_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lite-rag-server", version, about = "Serve /query and /add over HTTP")]
struct Args {
    /// TOML config file (falls back to $LITE_RAG_CONFIG, then defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lite_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Store backend: {}", config.store.backend.as_str());
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);

    let server = RagServer::new(config).await?;

    let llm_ready = matches!(server.state().service().llm().health_check().await, Ok(true));
    if !llm_ready {
        tracing::warn!("Ollama is not reachable; /query will fail until it is started");
        tracing::warn!("  ollama serve && ollama pull tinyllama && ollama pull nomic-embed-text");
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /query?q=...  - Ask a question");
    println!("  POST /add?doc=...  - Add a document");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
