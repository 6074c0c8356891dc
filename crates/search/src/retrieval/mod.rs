//! Hybrid retrieval engine
//!
//! Two retrieval legs run over the same chunk collection: vector similarity
//! and full-text keyword rank. Per candidate the legs combine under fixed
//! weights, with an exact-match boost layered on top so literal-term
//! queries always surface the exact hit.

mod hybrid;

pub use hybrid::HybridRetriever;

use lexforge_common::model::Language;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Weight of the vector-similarity leg. Dominant so semantic matches
/// remain primary.
pub const VECTOR_WEIGHT: f32 = 0.7;

/// Weight of the keyword-rank leg
pub const KEYWORD_WEIGHT: f32 = 0.3;

/// Added when the literal query string appears verbatim in candidate text
pub const EXACT_MATCH_BOOST: f32 = 0.15;

/// The query surface consumed by the engine
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,

    /// Maximum results to return; defaults to the configured top-n
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

/// Resolved search options
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub limit: usize,
    pub language: Language,
}

/// A ranked candidate, created per query and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedCandidate {
    /// Source identifier (chunk id)
    pub id: String,

    /// Id of the owning document
    pub document_id: String,

    /// Candidate text
    pub content: String,

    /// Citation source-type tag
    pub source_type: String,

    /// Source metadata sufficient to build a citation
    pub metadata: serde_json::Value,

    /// Raw vector-similarity score; 0 when absent from that leg
    pub vector_score: f32,

    /// Raw keyword-rank score; 0 when absent from that leg
    pub keyword_score: f32,

    /// Combined score the result order is based on
    pub hybrid_score: f32,
}

/// Fixed-weight linear combination of the two leg scores.
///
/// A candidate absent from one leg contributes 0 for that term rather than
/// being excluded.
pub fn hybrid_score(vector_similarity: f32, keyword_rank: f32, exact_match: bool) -> f32 {
    let combined = VECTOR_WEIGHT * vector_similarity + KEYWORD_WEIGHT * keyword_rank;
    if exact_match {
        combined + EXACT_MATCH_BOOST
    } else {
        combined
    }
}
