//! Index writer
//!
//! Offline path from parsed documents to the store: chunk, normalize,
//! embed in batches, upsert. Directory batches isolate failures per file;
//! one malformed document never aborts the batch.

use crate::chunker::{chunk_document, ChunkingConfig};
use crate::parser;
use lexforge_common::embeddings::{normalize_for_embedding, Embedder};
use lexforge_common::errors::Result;
use lexforge_common::metrics;
use lexforge_common::model::{Language, LegalDocument};
use lexforge_common::store::{DocumentStore, SourceDocument, StoredChunk};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Writes parsed documents into the store
pub struct IndexWriter {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    chunking: ChunkingConfig,
}

/// Outcome of a directory batch
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub indexed: usize,
    pub failed: usize,
    pub chunks: usize,
}

impl IndexWriter {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            chunking,
        }
    }

    /// Chunk, embed, and upsert one parsed document
    #[instrument(skip(self, doc), fields(document_id = %doc.id, language = %doc.language.as_str()))]
    pub async fn index_document(&self, doc: &LegalDocument) -> Result<usize> {
        let started = Instant::now();

        let chunks = chunk_document(doc, &self.chunking);
        if chunks.is_empty() {
            warn!("Document produced no chunks");
            return Ok(0);
        }

        let texts: Vec<String> = chunks
            .iter()
            .map(|c| normalize_for_embedding(&c.content))
            .collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk {
                id: chunk.id,
                document_id: chunk.document_id,
                section_label: chunk.section_label,
                language: chunk.language,
                title: chunk.title,
                content: chunk.content,
                embedding,
                source_type: chunk.source_type,
                metadata: chunk.metadata,
            })
            .collect();

        self.store.upsert_chunks(&stored).await?;

        // Full document for query-time hydration
        self.store
            .upsert_document(&SourceDocument {
                id: doc.id.clone(),
                title: doc.short_title.clone(),
                language: doc.language,
                content: serde_json::to_value(doc)?,
            })
            .await?;

        metrics::record_ingestion(
            started.elapsed().as_secs_f64(),
            stored.len(),
            doc.language.as_str(),
        );
        info!(chunks = stored.len(), "Document indexed");

        Ok(stored.len())
    }

    /// Parse and index every `.xml` file in a directory.
    ///
    /// Parse or index failures are logged and counted, never propagated.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn ingest_directory(&self, dir: &Path, language: Language) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();

        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "xml").unwrap_or(false))
            .collect();
        entries.sort();

        for path in entries {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to read file");
                    summary.failed += 1;
                    continue;
                }
            };

            let doc = match parser::parse(&raw, language) {
                Ok(doc) => doc,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to parse document");
                    metrics::record_parse_failure(language.as_str());
                    summary.failed += 1;
                    continue;
                }
            };

            match self.index_document(&doc).await {
                Ok(chunks) => {
                    summary.indexed += 1;
                    summary.chunks += chunks;
                }
                Err(e) => {
                    error!(path = %path.display(), document_id = %doc.id, error = %e, "Failed to index document");
                    summary.failed += 1;
                }
            }
        }

        info!(
            indexed = summary.indexed,
            failed = summary.failed,
            chunks = summary.chunks,
            "Directory ingest complete"
        );

        Ok(summary)
    }
}
