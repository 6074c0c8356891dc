//! Context assembly
//!
//! The query-time pipeline: cache probe, language detection, candidate
//! over-fetch, cross-encoder rerank, citation construction, budgeted
//! prompt assembly, and optional hydration of the top-ranked source.
//! Citations are a superset of prompt-referenced material: the character
//! budget drops oversized blocks from the prompt only, never from the
//! citation list.

mod language;

pub use language::detect_language;

use crate::citation::{build_citation, Citation};
use crate::rerank::{rerank_candidates, CrossEncoder, RankedCandidate};
use crate::retrieval::{HybridRetriever, SearchOptions};
use lexforge_common::cache::{keys, CacheStore};
use lexforge_common::config::RetrievalConfig;
use lexforge_common::embeddings::Embedder;
use lexforge_common::errors::{AppError, Result};
use lexforge_common::metrics;
use lexforge_common::model::Language;
use lexforge_common::store::{DocumentStore, SourceDocument};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Floor for the rerank pool, so small top-n requests still give the
/// cross-encoder something to reorder
pub const MIN_CANDIDATES: usize = 10;

/// Options for one context build
#[derive(Debug, Clone, Copy)]
pub struct ContextOptions {
    /// Number of citations to retain
    pub top_n: usize,

    /// Pinned language; `None` means detect from the query
    pub language: Option<Language>,
}

/// The query-time output handed to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegislationContext {
    pub language: Language,

    /// Sequential 1-based ids in final rank order
    pub citations: Vec<Citation>,

    /// Rank-ordered candidate blocks annotated with citation ids, bounded
    /// by the character budget
    pub prompt: String,

    /// Fully hydrated top source, when available
    pub hydrated_sources: Vec<SourceDocument>,
}

/// Builds citation-annotated contexts from queries
pub struct ContextBuilder {
    retriever: HybridRetriever,
    encoder: Arc<dyn CrossEncoder>,
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn CacheStore>,
    config: RetrievalConfig,
}

impl ContextBuilder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        encoder: Arc<dyn CrossEncoder>,
        cache: Arc<dyn CacheStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            retriever: HybridRetriever::new(store.clone(), embedder),
            encoder,
            store,
            cache,
            config,
        }
    }

    /// Build a context for a query.
    ///
    /// Fails on an invalid query or an unreachable store; rerank and
    /// hydration failures degrade locally instead.
    pub async fn build_context(
        &self,
        query: &str,
        options: &ContextOptions,
    ) -> Result<LegislationContext> {
        let top_n = options.top_n.max(1);
        let cache_key = keys::context(query, top_n, options.language.map(|l| l.as_str()));

        // Cache is an optimization, never a correctness dependency: any
        // read failure or undecodable entry falls through to a live build.
        if let Some(cached) = self.cache.get(&cache_key).await {
            match serde_json::from_str(&cached) {
                Ok(context) => {
                    metrics::record_cache(true, "context");
                    return Ok(context);
                }
                Err(e) => warn!(error = %e, "Undecodable cached context, rebuilding"),
            }
        }
        metrics::record_cache(false, "context");

        let language = options
            .language
            .unwrap_or_else(|| detect_language(query));

        // Over-fetch so the rerank has a meaningful pool
        let fetch = (top_n * 2).max(MIN_CANDIDATES).min(100);
        let candidates = self
            .retriever
            .search(query, &SearchOptions { limit: fetch, language })
            .await?;

        let (ranked, degraded) = rerank_candidates(self.encoder.as_ref(), query, candidates).await;
        if degraded {
            debug!("Context build proceeding on hybrid ordering");
        }

        let top: Vec<RankedCandidate> = ranked.into_iter().take(top_n).collect();

        let mut citations = Vec::with_capacity(top.len());
        for (index, ranked) in top.iter().enumerate() {
            citations.push(build_citation(
                index + 1,
                &ranked.candidate.source_type,
                &ranked.candidate.metadata,
                None,
            )?);
        }

        // Hydration is independent of prompt assembly; run them together.
        let (prompt, hydrated_sources) = tokio::join!(
            async { assemble_prompt(&top, self.config.max_prompt_chars) },
            self.hydrate_top(&top, language)
        );

        let context = LegislationContext {
            language,
            citations,
            prompt,
            hydrated_sources,
        };

        if let Ok(encoded) = serde_json::to_string(&context) {
            self.cache
                .set(
                    &cache_key,
                    &encoded,
                    Duration::from_secs(self.config.context_ttl_secs),
                )
                .await;
        }

        Ok(context)
    }

    /// Fetch the top-ranked source in full for display. Failure degrades
    /// to an empty hydration list, never to a failed build.
    async fn hydrate_top(&self, top: &[RankedCandidate], language: Language) -> Vec<SourceDocument> {
        if !self.config.hydrate_top_source {
            return Vec::new();
        }
        let Some(first) = top.first() else {
            return Vec::new();
        };

        match self.fetch_source(&first.candidate.document_id, language).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!(error = %e, "Hydration failed, continuing without sources");
                Vec::new()
            }
        }
    }

    async fn fetch_source(
        &self,
        document_id: &str,
        language: Language,
    ) -> Result<Vec<SourceDocument>> {
        let document = self
            .store
            .fetch_document(document_id, language)
            .await
            .map_err(|e| AppError::HydrationFailed {
                source_id: document_id.to_string(),
                message: e.to_string(),
            })?;

        match document {
            Some(document) => Ok(vec![document]),
            None => {
                debug!(document_id, "Top source not stored, skipping hydration");
                Ok(Vec::new())
            }
        }
    }
}

/// Concatenate candidate blocks in rank order under the character budget.
///
/// A block that does not fit is dropped from the prompt but stays in the
/// citation list, so citations may reference trimmed material.
fn assemble_prompt(top: &[RankedCandidate], budget: usize) -> String {
    let mut prompt = String::new();

    for (index, ranked) in top.iter().enumerate() {
        let block = format!("[{}] {}\n\n", index + 1, ranked.candidate.content);
        if prompt.len() + block.len() > budget {
            debug!(citation_id = index + 1, "Block over remaining budget, dropped from prompt");
            continue;
        }
        prompt.push_str(&block);
    }

    prompt.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rerank::MockCrossEncoder;
    use lexforge_common::cache::MemoryCache;
    use lexforge_common::embeddings::{Embedder, MockEmbedder};
    use lexforge_common::errors::AppError;
    use lexforge_common::store::{MemoryStore, StoredChunk};

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let embedder = MockEmbedder::new(64);

        let rows = [
            ("c1", "322", "Theft", "Every one commits theft who fraudulently takes a thing."),
            ("c2", "334", "Punishment", "Every one who commits theft is guilty of an offence."),
            ("c3", "320", "Vessels", "No person shall operate a vessel in a dangerous manner."),
        ];

        let mut chunks = Vec::new();
        for (id, label, note, text) in rows {
            chunks.push(StoredChunk {
                id: id.to_string(),
                document_id: "C-46".to_string(),
                section_label: label.to_string(),
                language: Language::En,
                title: "Criminal Code".to_string(),
                content: format!("{}\n{}", note, text),
                embedding: embedder.embed(text).await.unwrap(),
                source_type: "legislation-section".to_string(),
                metadata: serde_json::json!({
                    "document_id": "C-46",
                    "title": "Criminal Code",
                    "section_label": label,
                    "marginal_note": note,
                    "doc_type": "act",
                }),
            });
        }
        store.upsert_chunks(&chunks).await.unwrap();
        store
            .upsert_document(&SourceDocument {
                id: "C-46".to_string(),
                title: "Criminal Code".to_string(),
                language: Language::En,
                content: serde_json::json!({"sections": ["322", "334", "320"]}),
            })
            .await
            .unwrap();
        store
    }

    fn builder(store: Arc<MemoryStore>, config: RetrievalConfig) -> ContextBuilder {
        ContextBuilder::new(
            store,
            Arc::new(MockEmbedder::new(64)),
            Arc::new(MockCrossEncoder),
            Arc::new(MemoryCache::new()),
            config,
        )
    }

    fn default_config() -> RetrievalConfig {
        RetrievalConfig {
            default_top_n: 5,
            max_prompt_chars: 12_000,
            context_ttl_secs: 300,
            hydrate_top_source: true,
        }
    }

    #[tokio::test]
    async fn test_build_context_end_to_end() {
        let builder = builder(seeded_store().await, default_config());

        let context = builder
            .build_context(
                "theft",
                &ContextOptions {
                    top_n: 2,
                    language: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(context.language, Language::En);
        assert_eq!(context.citations.len(), 2);
        assert_eq!(context.citations[0].id, 1);
        assert_eq!(context.citations[1].id, 2);
        assert!(context.citations[0].text.en.contains("Criminal Code"));
        assert!(!context.citations[0].text.fr.is_empty());
        assert!(context.prompt.starts_with("[1] "));
        assert!(context.prompt.contains("[2] "));

        // Top source hydrated in full
        assert_eq!(context.hydrated_sources.len(), 1);
        assert_eq!(context.hydrated_sources[0].id, "C-46");
    }

    #[tokio::test]
    async fn test_repeat_build_is_byte_identical_within_ttl() {
        let builder = builder(seeded_store().await, default_config());
        let options = ContextOptions {
            top_n: 3,
            language: Some(Language::En),
        };

        let first = builder.build_context("theft", &options).await.unwrap();
        let second = builder.build_context("theft", &options).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_prompt_budget_drops_blocks_but_keeps_citations() {
        let config = RetrievalConfig {
            max_prompt_chars: 80,
            ..default_config()
        };
        let builder = builder(seeded_store().await, config);

        let context = builder
            .build_context(
                "theft",
                &ContextOptions {
                    top_n: 3,
                    language: Some(Language::En),
                },
            )
            .await
            .unwrap();

        // All citations survive; the prompt holds fewer blocks.
        assert_eq!(context.citations.len(), 3);
        assert!(context.prompt.len() <= 80);
        let shown = context.prompt.matches('[').count();
        assert!(shown < context.citations.len());
    }

    #[tokio::test]
    async fn test_hydration_miss_degrades_to_empty() {
        // Chunks only, no stored document to hydrate
        let store = Arc::new(MemoryStore::new());
        let embedder = MockEmbedder::new(64);
        store
            .upsert_chunks(&[StoredChunk {
                id: "c1".to_string(),
                document_id: "C-46".to_string(),
                section_label: "322".to_string(),
                language: Language::En,
                title: "Criminal Code".to_string(),
                content: "Every one commits theft who takes.".to_string(),
                embedding: embedder.embed("theft").await.unwrap(),
                source_type: "legislation-section".to_string(),
                metadata: serde_json::json!({"document_id": "C-46", "title": "Criminal Code"}),
            }])
            .await
            .unwrap();

        let context = builder(store, default_config())
            .build_context(
                "theft",
                &ContextOptions {
                    top_n: 1,
                    language: Some(Language::En),
                },
            )
            .await
            .unwrap();

        assert!(context.hydrated_sources.is_empty());
        assert_eq!(context.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_query_propagates() {
        let builder = builder(seeded_store().await, default_config());

        let err = builder
            .build_context(
                "  ",
                &ContextOptions {
                    top_n: 5,
                    language: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery { .. }));
    }

    #[tokio::test]
    async fn test_french_query_detected_and_recorded() {
        let store = Arc::new(MemoryStore::new());
        let embedder = MockEmbedder::new(64);
        store
            .upsert_chunks(&[StoredChunk {
                id: "fr1".to_string(),
                document_id: "C-46".to_string(),
                section_label: "322".to_string(),
                language: Language::Fr,
                title: "Code criminel".to_string(),
                content: "Commet un vol quiconque prend une chose.".to_string(),
                embedding: embedder.embed("vol").await.unwrap(),
                source_type: "legislation-section".to_string(),
                metadata: serde_json::json!({"document_id": "C-46", "title": "Code criminel"}),
            }])
            .await
            .unwrap();

        let context = builder(store, default_config())
            .build_context(
                "qu'est-ce que le vol",
                &ContextOptions {
                    top_n: 1,
                    language: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(context.language, Language::Fr);
        assert_eq!(context.citations.len(), 1);
    }
}
