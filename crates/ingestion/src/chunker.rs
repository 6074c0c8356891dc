//! Section chunking
//!
//! Projects a parsed document into retrievable units: one chunk per
//! section (marginal note plus body), with oversized bodies split and
//! sub-indexed. Each chunk carries the citation source metadata the store
//! returns at query time, so a hit can become a citation without a second
//! lookup.

use lexforge_common::model::{Language, LegalDocument, Section, SectionType};
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

/// Source-type tag attached to every legislation chunk
pub const SOURCE_TYPE: &str = "legislation-section";

/// Configuration for section chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters; larger section bodies are split
    pub max_chunk_chars: usize,
    /// Sections shorter than this (after trimming) are not indexed
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 2000,
            min_chunk_chars: 1,
        }
    }
}

/// A retrievable unit before embedding
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    /// Deterministic id, stable across re-ingestion of the same document
    pub id: String,
    pub document_id: String,
    pub section_label: String,
    pub language: Language,
    pub title: String,
    pub content: String,
    pub source_type: String,
    pub metadata: serde_json::Value,
}

/// Project a parsed document into chunks
pub fn chunk_document(doc: &LegalDocument, config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();

    for section in &doc.sections {
        let content = section_content(section);
        if content.trim().len() < config.min_chunk_chars {
            continue;
        }

        let base_id = chunk_id(doc, section);
        let metadata = citation_metadata(doc, section);

        if content.len() <= config.max_chunk_chars {
            chunks.push(DocumentChunk {
                id: base_id,
                document_id: doc.id.clone(),
                section_label: section.label.clone(),
                language: doc.language,
                title: doc.short_title.clone(),
                content,
                source_type: SOURCE_TYPE.to_string(),
                metadata,
            });
            continue;
        }

        // Oversized body: split and sub-index
        let splitter = TextSplitter::new(ChunkConfig::new(config.max_chunk_chars));
        for (index, part) in splitter.chunks(&content).enumerate() {
            chunks.push(DocumentChunk {
                id: format!("{}#{}", base_id, index + 1),
                document_id: doc.id.clone(),
                section_label: section.label.clone(),
                language: doc.language,
                title: doc.short_title.clone(),
                content: part.to_string(),
                source_type: SOURCE_TYPE.to_string(),
                metadata: metadata.clone(),
            });
        }
    }

    debug!(
        document_id = %doc.id,
        sections = doc.sections.len(),
        chunks = chunks.len(),
        "Document chunked"
    );

    chunks
}

/// Marginal note plus body text
fn section_content(section: &Section) -> String {
    match &section.marginal_note {
        Some(note) => format!("{}\n{}", note, section.text),
        None => section.text.clone(),
    }
}

fn chunk_id(doc: &LegalDocument, section: &Section) -> String {
    format!(
        "{}:{}:{}:{}",
        doc.id,
        doc.language.as_str(),
        section_type_tag(section.section_type),
        section.label
    )
}

fn section_type_tag(section_type: SectionType) -> &'static str {
    match section_type {
        SectionType::Ordinary => "ordinary",
        SectionType::Schedule => "schedule",
        SectionType::Form => "form",
        SectionType::Table => "table",
    }
}

/// The payload the citation formatter needs at query time
fn citation_metadata(doc: &LegalDocument, section: &Section) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        "document_id": doc.id,
        "title": doc.short_title,
        "section_label": section.label,
        "doc_type": doc.doc_type,
        "language": doc.language,
    });

    if let Some(note) = &section.marginal_note {
        metadata["marginal_note"] = serde_json::Value::String(note.clone());
    }
    if let Some(label) = &section.schedule_label {
        metadata["schedule_label"] = serde_json::Value::String(label.clone());
    }

    metadata
}
