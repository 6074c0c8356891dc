//! Hybrid retriever
//!
//! Issues the vector and keyword legs in parallel against the store and
//! merges them under the fixed weights. A single failed leg degrades to an
//! empty contribution; only both legs failing surfaces
//! `RetrievalUnavailable`.

use super::{hybrid_score, RetrievedCandidate, SearchOptions};
use lexforge_common::embeddings::Embedder;
use lexforge_common::errors::{AppError, Result};
use lexforge_common::metrics;
use lexforge_common::store::{ChunkHit, DocumentStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

pub struct HybridRetriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
}

impl HybridRetriever {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Run both legs and return candidates ordered by hybrid score
    /// descending, at most `options.limit` of them.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RetrievedCandidate>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidQuery {
                message: "query must not be empty".to_string(),
            });
        }
        if options.limit == 0 || options.limit > 100 {
            return Err(AppError::InvalidQuery {
                message: format!("limit {} outside 1..=100", options.limit),
            });
        }

        let started = Instant::now();

        // Fetch more from each leg than the caller asked for so the merge
        // has something to choose from.
        let leg_limit = options.limit * 2;

        let vector_leg = async {
            let embedding = self.embedder.embed(trimmed).await?;
            self.store
                .vector_search(&embedding, options.language, leg_limit)
                .await
        };
        let keyword_leg = self
            .store
            .keyword_search(trimmed, options.language, leg_limit);

        let (vector_results, keyword_results) = tokio::join!(vector_leg, keyword_leg);

        let (vector_hits, keyword_hits) = match (vector_results, keyword_results) {
            (Ok(v), Ok(k)) => (v, k),
            (Ok(v), Err(e)) => {
                warn!(error = %e, "Keyword leg failed, degrading to vector only");
                metrics::record_leg_failure("keyword");
                (v, Vec::new())
            }
            (Err(e), Ok(k)) => {
                warn!(error = %e, "Vector leg failed, degrading to keyword only");
                metrics::record_leg_failure("vector");
                (Vec::new(), k)
            }
            (Err(vector_err), Err(keyword_err)) => {
                return Err(AppError::RetrievalUnavailable {
                    message: format!(
                        "both retrieval legs failed: {}; {}",
                        vector_err, keyword_err
                    ),
                });
            }
        };

        let mut candidates = merge(trimmed, vector_hits, keyword_hits);

        candidates.sort_by(|a, b| {
            b.hybrid_score
                .total_cmp(&a.hybrid_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        candidates.truncate(options.limit);

        metrics::record_search(
            started.elapsed().as_secs_f64(),
            options.language.as_str(),
            candidates.len(),
        );

        Ok(candidates)
    }
}

/// Merge the two legs into one candidate set under the fixed weights
fn merge(query: &str, vector_hits: Vec<ChunkHit>, keyword_hits: Vec<ChunkHit>) -> Vec<RetrievedCandidate> {
    let mut by_id: HashMap<String, RetrievedCandidate> = HashMap::new();

    for hit in vector_hits {
        by_id.insert(
            hit.id.clone(),
            RetrievedCandidate {
                id: hit.id,
                document_id: hit.document_id,
                content: hit.content,
                source_type: hit.source_type,
                metadata: hit.metadata,
                vector_score: hit.score,
                keyword_score: 0.0,
                hybrid_score: 0.0,
            },
        );
    }

    for hit in keyword_hits {
        match by_id.get_mut(&hit.id) {
            Some(candidate) => candidate.keyword_score = hit.score,
            None => {
                by_id.insert(
                    hit.id.clone(),
                    RetrievedCandidate {
                        id: hit.id,
                        document_id: hit.document_id,
                        content: hit.content,
                        source_type: hit.source_type,
                        metadata: hit.metadata,
                        vector_score: 0.0,
                        keyword_score: hit.score,
                        hybrid_score: 0.0,
                    },
                );
            }
        }
    }

    by_id
        .into_values()
        .map(|mut candidate| {
            let exact = candidate.content.contains(query);
            candidate.hybrid_score =
                hybrid_score(candidate.vector_score, candidate.keyword_score, exact);
            candidate
        })
        .collect()
}
