//! Postgres document store
//!
//! Vector similarity goes through pgvector's `<=>` cosine-distance
//! operator; keyword search goes through PostgreSQL full-text search with
//! `ts_rank_cd` normalized by document length. Both legs query the same
//! chunk collection and return the citation metadata alongside the score,
//! so retrieval never needs a second round-trip.

use super::{ChunkHit, DbPool, DocumentStore, SourceDocument, StoredChunk};
use crate::errors::{AppError, Result};
use crate::model::Language;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use std::sync::Arc;
use tracing::debug;

/// Document store backed by Postgres
pub struct PgStore {
    db: Arc<DbPool>,
}

impl PgStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Render an embedding as a pgvector literal
    fn embedding_literal(embedding: &[f32]) -> String {
        format!(
            "[{}]",
            embedding
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(",")
        )
    }

    fn row_to_hit(row: &sea_orm::QueryResult) -> Option<ChunkHit> {
        let score: f64 = row.try_get("", "score").ok()?;
        Some(ChunkHit {
            id: row.try_get("", "id").ok()?,
            document_id: row.try_get("", "document_id").ok()?,
            score: score as f32,
            content: row.try_get("", "content").ok()?,
            source_type: row.try_get("", "source_type").ok()?,
            metadata: row
                .try_get::<serde_json::Value, _>("", "metadata")
                .unwrap_or(serde_json::Value::Null),
        })
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn vector_search(
        &self,
        embedding: &[f32],
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let embedding_str = Self::embedding_literal(embedding);

        let sql = format!(
            r#"
            SELECT
                id,
                document_id,
                content,
                source_type,
                metadata,
                1 - (embedding <=> '{embedding}'::vector) as score
            FROM legislation_chunks
            WHERE language = $1
            ORDER BY embedding <=> '{embedding}'::vector
            LIMIT $2
            "#,
            embedding = embedding_str
        );

        let rows = self
            .db
            .read()
            .query_all(Statement::from_sql_and_values(
                DbBackend::Postgres,
                &sql,
                vec![language.as_str().into(), (limit as i64).into()],
            ))
            .await
            .map_err(|e| AppError::RetrievalUnavailable {
                message: format!("Vector search failed: {}", e),
            })?;

        debug!(rows = rows.len(), "Vector search complete");
        Ok(rows.iter().filter_map(Self::row_to_hit).collect())
    }

    async fn keyword_search(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        // ts_rank_cd with flag 32 divides the rank by itself + 1, keeping
        // scores in 0..1 so they compose with the similarity leg.
        let sql = format!(
            r#"
            SELECT
                id,
                document_id,
                content,
                source_type,
                metadata,
                ts_rank_cd(
                    to_tsvector('{ts}', content),
                    plainto_tsquery('{ts}', $2),
                    32
                ) as score
            FROM legislation_chunks
            WHERE language = $1
              AND to_tsvector('{ts}', content) @@ plainto_tsquery('{ts}', $2)
            ORDER BY score DESC
            LIMIT $3
            "#,
            ts = language.ts_config()
        );

        let rows = self
            .db
            .read()
            .query_all(Statement::from_sql_and_values(
                DbBackend::Postgres,
                &sql,
                vec![
                    language.as_str().into(),
                    query.into(),
                    (limit as i64).into(),
                ],
            ))
            .await
            .map_err(|e| AppError::RetrievalUnavailable {
                message: format!("Keyword search failed: {}", e),
            })?;

        debug!(rows = rows.len(), "Keyword search complete");
        Ok(rows.iter().filter_map(Self::row_to_hit).collect())
    }

    async fn fetch_document(
        &self,
        document_id: &str,
        language: Language,
    ) -> Result<Option<SourceDocument>> {
        let sql = r#"
            SELECT id, title, language, content
            FROM legislation_documents
            WHERE id = $1 AND language = $2
        "#;

        let row = self
            .db
            .read()
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                vec![document_id.into(), language.as_str().into()],
            ))
            .await?;

        Ok(row.and_then(|row| {
            let lang: String = row.try_get("", "language").ok()?;
            Some(SourceDocument {
                id: row.try_get("", "id").ok()?,
                title: row.try_get("", "title").ok()?,
                language: Language::parse(&lang)?,
                content: row
                    .try_get::<serde_json::Value, _>("", "content")
                    .unwrap_or(serde_json::Value::Null),
            })
        }))
    }

    async fn upsert_chunks(&self, chunks: &[StoredChunk]) -> Result<()> {
        for chunk in chunks {
            let embedding_str = Self::embedding_literal(&chunk.embedding);

            let sql = format!(
                r#"
                INSERT INTO legislation_chunks
                    (id, document_id, section_label, language, title, content,
                     embedding, source_type, metadata)
                VALUES ($1, $2, $3, $4, $5, $6, '{embedding}'::vector, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    content = EXCLUDED.content,
                    embedding = EXCLUDED.embedding,
                    metadata = EXCLUDED.metadata
                "#,
                embedding = embedding_str
            );

            self.db
                .write()
                .execute(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    &sql,
                    vec![
                        chunk.id.clone().into(),
                        chunk.document_id.clone().into(),
                        chunk.section_label.clone().into(),
                        chunk.language.as_str().into(),
                        chunk.title.clone().into(),
                        chunk.content.clone().into(),
                        chunk.source_type.clone().into(),
                        chunk.metadata.clone().into(),
                    ],
                ))
                .await?;
        }

        debug!(chunks = chunks.len(), "Chunks upserted");
        Ok(())
    }

    async fn upsert_document(&self, document: &SourceDocument) -> Result<()> {
        let sql = r#"
            INSERT INTO legislation_documents (id, title, language, content)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                content = EXCLUDED.content
        "#;

        self.db
            .write()
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                vec![
                    document.id.clone().into(),
                    document.title.clone().into(),
                    document.language.as_str().into(),
                    document.content.clone().into(),
                ],
            ))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_literal_format() {
        let embedding = vec![0.1, 0.2, 0.3];
        assert_eq!(PgStore::embedding_literal(&embedding), "[0.1,0.2,0.3]");
    }
}
