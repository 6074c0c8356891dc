//! LexForge Ingestion
//!
//! Offline batch path:
//! 1. Walks a directory of legislative XML files
//! 2. Parses each into the document model
//! 3. Chunks sections and generates embeddings
//! 4. Upserts chunks and full documents into the store

mod chunker;
mod dom;
mod indexer;
mod parser;

use chunker::ChunkingConfig;
use indexer::IndexWriter;
use lexforge_common::embeddings::create_embedder;
use lexforge_common::model::Language;
use lexforge_common::store::{DbPool, PgStore};
use lexforge_common::{config::AppConfig, metrics, VERSION};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting LexForge ingestion v{}", VERSION);

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    metrics::register_metrics();

    info!("Connecting to document store...");
    let db = Arc::new(DbPool::new(&config.database).await?);
    let store = Arc::new(PgStore::new(db));

    let embedder = create_embedder(&config.embedding)?;

    let writer = IndexWriter::new(embedder, store, ChunkingConfig::default());

    let dir = std::env::var("INGEST_DIR").unwrap_or_else(|_| "data/xml".to_string());
    let language = std::env::var("INGEST_LANGUAGE")
        .ok()
        .and_then(|s| Language::parse(&s))
        .unwrap_or(Language::En);

    info!(dir = %dir, language = language.as_str(), "Starting directory ingest");
    let summary = writer.ingest_directory(Path::new(&dir), language).await?;

    info!(
        indexed = summary.indexed,
        failed = summary.failed,
        chunks = summary.chunks,
        "Ingestion complete"
    );

    Ok(())
}
