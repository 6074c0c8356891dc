//! In-memory document store
//!
//! Deterministic stand-in for the Postgres store, used in tests and local
//! runs without a database. Vector scoring is cosine similarity; keyword
//! scoring is term-overlap normalized to 0..1.

use super::{ChunkHit, DocumentStore, SourceDocument, StoredChunk};
use crate::errors::Result;
use crate::model::Language;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<Vec<StoredChunk>>,
    documents: RwLock<HashMap<(String, Language), SourceDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }

    /// Fraction of query terms present in the content
    fn keyword_score(query: &str, content: &str) -> f32 {
        let content_lower = content.to_lowercase();
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return 0.0;
        }
        let hits = terms
            .iter()
            .filter(|t| content_lower.contains(t.as_str()))
            .count();
        hits as f32 / terms.len() as f32
    }

    fn to_hit(chunk: &StoredChunk, score: f32) -> ChunkHit {
        ChunkHit {
            id: chunk.id.clone(),
            document_id: chunk.document_id.clone(),
            score,
            content: chunk.content.clone(),
            source_type: chunk.source_type.clone(),
            metadata: chunk.metadata.clone(),
        }
    }

    fn rank(mut hits: Vec<ChunkHit>, limit: usize) -> Vec<ChunkHit> {
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        hits
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn vector_search(
        &self,
        embedding: &[f32],
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let chunks = self.chunks.read().await;
        let hits = chunks
            .iter()
            .filter(|c| c.language == language)
            .map(|c| Self::to_hit(c, Self::cosine(embedding, &c.embedding)))
            .collect();
        Ok(Self::rank(hits, limit))
    }

    async fn keyword_search(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let chunks = self.chunks.read().await;
        let hits = chunks
            .iter()
            .filter(|c| c.language == language)
            .map(|c| Self::to_hit(c, Self::keyword_score(query, &c.content)))
            .filter(|h| h.score > 0.0)
            .collect();
        Ok(Self::rank(hits, limit))
    }

    async fn fetch_document(
        &self,
        document_id: &str,
        language: Language,
    ) -> Result<Option<SourceDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(document_id.to_string(), language)).cloned())
    }

    async fn upsert_chunks(&self, new_chunks: &[StoredChunk]) -> Result<()> {
        let mut chunks = self.chunks.write().await;
        for chunk in new_chunks {
            match chunks.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk.clone(),
                None => chunks.push(chunk.clone()),
            }
        }
        Ok(())
    }

    async fn upsert_document(&self, document: &SourceDocument) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(
            (document.id.clone(), document.language),
            document.clone(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            id: id.to_string(),
            document_id: "C-1".to_string(),
            section_label: "1".to_string(),
            language: Language::En,
            title: "Test Act".to_string(),
            content: content.to_string(),
            embedding,
            source_type: "legislation-section".to_string(),
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_vector_search_ranks_by_similarity() {
        let store = MemoryStore::new();
        store
            .upsert_chunks(&[
                chunk("a", "alpha", vec![1.0, 0.0]),
                chunk("b", "beta", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store
            .vector_search(&[1.0, 0.0], Language::En, 10)
            .await
            .unwrap();
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_keyword_search_filters_misses() {
        let store = MemoryStore::new();
        store
            .upsert_chunks(&[
                chunk("a", "every one commits theft who takes", vec![1.0]),
                chunk("b", "dangerous operation of a vessel", vec![1.0]),
            ])
            .await
            .unwrap();

        let hits = store.keyword_search("theft", Language::En, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_language_isolation() {
        let store = MemoryStore::new();
        let mut fr = chunk("fr-1", "quiconque commet un vol", vec![1.0]);
        fr.language = Language::Fr;
        store
            .upsert_chunks(&[chunk("en-1", "commits theft", vec![1.0]), fr])
            .await
            .unwrap();

        let hits = store.keyword_search("vol", Language::Fr, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "fr-1");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store
            .upsert_chunks(&[chunk("a", "first", vec![1.0])])
            .await
            .unwrap();
        store
            .upsert_chunks(&[chunk("a", "second", vec![1.0])])
            .await
            .unwrap();

        let hits = store.keyword_search("second", Language::En, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_document_fetch_roundtrip() {
        let store = MemoryStore::new();
        let doc = SourceDocument {
            id: "C-46".to_string(),
            title: "Criminal Code".to_string(),
            language: Language::En,
            content: serde_json::json!({"sections": []}),
        };
        store.upsert_document(&doc).await.unwrap();

        let fetched = store.fetch_document("C-46", Language::En).await.unwrap();
        assert_eq!(fetched.unwrap().title, "Criminal Code");

        let missing = store.fetch_document("C-46", Language::Fr).await.unwrap();
        assert!(missing.is_none());
    }
}
