//! Document store access layer
//!
//! The persistent store/index is an external collaborator exposing
//! vector-similarity and full-text queries over one chunk collection. This
//! module provides:
//! - The `DocumentStore` capability trait
//! - A Postgres adapter (pgvector + full-text search)
//! - An in-memory implementation for tests and local runs
//! - Connection pool management

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use crate::model::Language;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// A retrievable unit handed to the store by the indexing adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Chunk id (unique within the collection)
    pub id: String,

    /// Id of the document the chunk was projected from
    pub document_id: String,

    /// Section label the chunk covers
    pub section_label: String,

    /// Document language
    pub language: Language,

    /// Display title (short title of the instrument)
    pub title: String,

    /// Chunk text, whitespace-normalized
    pub content: String,

    /// Embedding vector for the chunk text
    pub embedding: Vec<f32>,

    /// Citation source-type tag, e.g. "legislation-section"
    pub source_type: String,

    /// Source metadata sufficient to build a citation
    pub metadata: serde_json::Value,
}

/// A chunk returned by one retrieval leg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHit {
    /// Chunk id
    pub id: String,

    /// Id of the owning document
    pub document_id: String,

    /// Raw leg score (similarity or normalized keyword rank)
    pub score: f32,

    /// Chunk text
    pub content: String,

    /// Citation source-type tag
    pub source_type: String,

    /// Source metadata sufficient to build a citation
    pub metadata: serde_json::Value,
}

/// A fully hydrated source document for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub language: Language,
    /// Full parsed document as stored at index time
    pub content: serde_json::Value,
}

/// Narrow store capability consumed by retrieval and indexing.
///
/// Both search legs run over the same candidate universe; each returns raw
/// scores plus the metadata needed to build a citation without another
/// round-trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Vector-similarity query
    async fn vector_search(
        &self,
        embedding: &[f32],
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>>;

    /// Full-text keyword query
    async fn keyword_search(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>>;

    /// Fetch a full source document for hydration
    async fn fetch_document(
        &self,
        document_id: &str,
        language: Language,
    ) -> Result<Option<SourceDocument>>;

    /// Upsert chunk projections (index side)
    async fn upsert_chunks(&self, chunks: &[StoredChunk]) -> Result<()>;

    /// Upsert a full document for later hydration (index side)
    async fn upsert_document(&self, document: &SourceDocument) -> Result<()>;
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Self::connect(&config.url, config).await?;

        let replica = match config.read_url {
            Some(ref read_url) => {
                info!("Connecting to read replica...");
                Some(Self::connect(read_url, config).await?)
            }
            None => None,
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    async fn connect(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opts = ConnectOptions::new(url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to {}: {}", url, e),
            })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;

        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }
}
