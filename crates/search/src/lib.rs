//! LexForge Search Library
//!
//! Query-time pipeline for legislation question answering:
//! - Hybrid retrieval (vector similarity + keyword rank under fixed weights)
//! - Cross-encoder reranking with deterministic fallback ordering
//! - Citation-annotated context assembly with bounded prompt budget
//! - Bilingual, source-type-specific citation formatters
//!
//! Request handling, authentication, and rendering live outside this crate;
//! callers hand in a query and get back a [`context::LegislationContext`].

pub mod citation;
pub mod context;
pub mod rerank;
pub mod retrieval;

pub use context::{ContextBuilder, ContextOptions, LegislationContext};
pub use retrieval::{HybridRetriever, RetrievedCandidate, SearchOptions};
