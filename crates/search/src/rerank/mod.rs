//! Cross-encoder reranking
//!
//! The reranker is an external collaborator: an opaque
//! `(query, candidate) -> score` function. Candidates are scored
//! concurrently; any scoring failure degrades the whole pass to
//! hybrid-score ordering rather than failing the context build.
//! Ordering is total (rerank score desc, hybrid score desc, source id asc)
//! so citation numbering is reproducible across runs.

use crate::retrieval::RetrievedCandidate;
use async_trait::async_trait;
use lexforge_common::config::RerankConfig;
use lexforge_common::errors::{AppError, Result};
use lexforge_common::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Trait for cross-encoder scoring
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score a candidate's relevance to the query
    async fn score(&self, query: &str, text: &str) -> Result<f32>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// A candidate with its rerank score attached
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub candidate: RetrievedCandidate,
    /// `None` when the pass degraded to hybrid ordering
    pub rerank_score: Option<f32>,
}

/// Rerank candidates, falling back to hybrid ordering on any failure.
///
/// Returns the ranked list and whether the pass degraded.
pub async fn rerank_candidates(
    encoder: &dyn CrossEncoder,
    query: &str,
    candidates: Vec<RetrievedCandidate>,
) -> (Vec<RankedCandidate>, bool) {
    let scores = futures::future::join_all(
        candidates
            .iter()
            .map(|c| encoder.score(query, &c.content)),
    )
    .await;

    let degraded = scores.iter().any(|s| s.is_err());
    if degraded {
        if let Some(Err(e)) = scores.iter().find(|s| s.is_err()) {
            warn!(error = %e, "Cross-encoder failed, falling back to hybrid ordering");
        }
        metrics::record_rerank_fallback();

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|candidate| RankedCandidate {
                candidate,
                rerank_score: None,
            })
            .collect();
        sort_by_hybrid(&mut ranked);
        return (ranked, true);
    }

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .zip(scores)
        .map(|(candidate, score)| RankedCandidate {
            candidate,
            rerank_score: score.ok(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        let a_score = a.rerank_score.unwrap_or(f32::NEG_INFINITY);
        let b_score = b.rerank_score.unwrap_or(f32::NEG_INFINITY);
        b_score
            .total_cmp(&a_score)
            .then_with(|| b.candidate.hybrid_score.total_cmp(&a.candidate.hybrid_score))
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });

    (ranked, false)
}

fn sort_by_hybrid(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| {
        b.candidate
            .hybrid_score
            .total_cmp(&a.candidate.hybrid_score)
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
}

/// HTTP cross-encoder client
pub struct HttpCrossEncoder {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: Vec<&'a str>,
    model: &'a str,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    relevance_score: f32,
}

impl HttpCrossEncoder {
    pub fn new(config: &RerankConfig) -> Result<Self> {
        let base_url = config
            .api_base
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "rerank.api_base is required for the http provider".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
        })
    }
}

#[async_trait]
impl CrossEncoder for HttpCrossEncoder {
    async fn score(&self, query: &str, text: &str) -> Result<f32> {
        let url = format!("{}/rerank", self.base_url);

        let request = RerankRequest {
            query,
            documents: vec![text],
            model: &self.model,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::RerankUnavailable {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RerankUnavailable {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: RerankResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::RerankUnavailable {
                    message: format!("Failed to parse response: {}", e),
                })?;

        result
            .results
            .first()
            .map(|r| r.relevance_score)
            .ok_or_else(|| AppError::RerankUnavailable {
                message: "Empty response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Deterministic mock: scores by query-term overlap, so tests can predict
/// the ordering without a live model.
pub struct MockCrossEncoder;

#[async_trait]
impl CrossEncoder for MockCrossEncoder {
    async fn score(&self, query: &str, text: &str) -> Result<f32> {
        let text_lower = text.to_lowercase();
        let terms: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();
        if terms.is_empty() {
            return Ok(0.0);
        }
        let hits = terms
            .iter()
            .filter(|t| text_lower.contains(t.as_str()))
            .count();
        Ok(hits as f32 / terms.len() as f32)
    }

    fn model_name(&self) -> &str {
        "mock-rerank"
    }
}

/// An encoder that always fails, for exercising the fallback path in tests
#[cfg(test)]
pub struct FailingCrossEncoder;

#[cfg(test)]
#[async_trait]
impl CrossEncoder for FailingCrossEncoder {
    async fn score(&self, _query: &str, _text: &str) -> Result<f32> {
        Err(AppError::RerankUnavailable {
            message: "cross-encoder down".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing-rerank"
    }
}

/// Create a cross-encoder based on configuration
pub fn create_cross_encoder(config: &RerankConfig) -> Result<Arc<dyn CrossEncoder>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpCrossEncoder::new(config)?)),
        "mock" => Ok(Arc::new(MockCrossEncoder)),
        other => {
            warn!(provider = other, "Unknown rerank provider, using mock");
            Ok(Arc::new(MockCrossEncoder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, content: &str, hybrid: f32) -> RetrievedCandidate {
        RetrievedCandidate {
            id: id.to_string(),
            document_id: "C-1".to_string(),
            content: content.to_string(),
            source_type: "legislation-section".to_string(),
            metadata: serde_json::json!({}),
            vector_score: hybrid,
            keyword_score: 0.0,
            hybrid_score: hybrid,
        }
    }

    #[tokio::test]
    async fn test_rerank_reorders_by_relevance() {
        let candidates = vec![
            candidate("a", "unrelated provision about fees", 0.9),
            candidate("b", "theft of a vessel is an offence", 0.5),
        ];

        let (ranked, degraded) =
            rerank_candidates(&MockCrossEncoder, "theft vessel", candidates).await;

        assert!(!degraded);
        assert_eq!(ranked[0].candidate.id, "b");
        assert!(ranked[0].rerank_score.unwrap() > ranked[1].rerank_score.unwrap());
    }

    #[tokio::test]
    async fn test_fallback_keeps_hybrid_order() {
        let candidates = vec![
            candidate("b", "second", 0.5),
            candidate("a", "first", 0.9),
        ];

        let (ranked, degraded) =
            rerank_candidates(&FailingCrossEncoder, "query", candidates).await;

        assert!(degraded);
        assert_eq!(ranked[0].candidate.id, "a");
        assert!(ranked[0].rerank_score.is_none());
    }

    #[tokio::test]
    async fn test_tie_breaks_are_deterministic() {
        // Equal rerank scores, equal hybrid scores: source id ascending
        let candidates = vec![
            candidate("z", "theft", 0.5),
            candidate("a", "theft", 0.5),
        ];

        let (ranked, _) = rerank_candidates(&MockCrossEncoder, "theft", candidates).await;
        assert_eq!(ranked[0].candidate.id, "a");
        assert_eq!(ranked[1].candidate.id, "z");
    }

    #[tokio::test]
    async fn test_equal_rerank_falls_to_hybrid() {
        let candidates = vec![
            candidate("a", "theft", 0.4),
            candidate("b", "theft", 0.8),
        ];

        let (ranked, _) = rerank_candidates(&MockCrossEncoder, "theft", candidates).await;
        assert_eq!(ranked[0].candidate.id, "b");
    }
}
