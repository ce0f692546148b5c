//! Chat server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server

use pdf_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Collection: {}", config.vector_db.collection);
    tracing::info!("  - Top k: {}", config.query.top_k);

    let server = RagServer::new(config)?;

    let health = server.state().orchestrator().health_check().await;
    if health.all_up() {
        tracing::info!("All providers reachable");
    } else {
        tracing::warn!(
            "Provider check: embedding={} index={} generation={}",
            health.embedding,
            health.index,
            health.generation
        );
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("\nEndpoints:");
    println!("  GET  /            - Liveness");
    println!("  POST /chat        - Ask a question");
    println!("  POST /upload/pdf  - Upload a PDF");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
