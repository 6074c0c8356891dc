//! Document model for parsed federal legislation
//!
//! Shared, behavior-free types produced by the ingestion parser and read
//! (as chunk projections) by the retrieval pipeline. The parser is the sole
//! writer of these values.
//!
//! A parsed instance is always monolingual: bilingual coverage comes from
//! parsing the EN and FR source documents separately and correlating by
//! section label.

use serde::{Deserialize, Serialize};

/// Document language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// PostgreSQL text-search configuration for this language
    pub fn ts_config(&self) -> &'static str {
        match self {
            Language::En => "english",
            Language::Fr => "french",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "eng" => Some(Language::En),
            "fr" | "fra" => Some(Language::Fr),
            _ => None,
        }
    }
}

/// Kind of legislative instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Primary legislation (an Act), identified by chapter number
    Act,
    /// Subordinate legislation, identified by instrument number
    Regulation,
}

/// Root entity for a parsed act or regulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalDocument {
    /// Statute chapter number or regulation instrument number
    pub id: String,

    /// Short title in the document's language
    pub short_title: String,

    /// Long title, when the instrument carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_title: Option<String>,

    pub doc_type: DocumentType,

    pub language: Language,

    /// All sections in document order, including schedule content
    pub sections: Vec<Section>,

    /// Terms introduced by Definition blocks anywhere in the body
    pub defined_terms: Vec<DefinedTerm>,

    /// Root-level Recommendation blocks (regulations only)
    pub recommendations: Vec<RegulationBlock>,

    /// Root-level Notice blocks (regulations only)
    pub notices: Vec<RegulationBlock>,
}

impl LegalDocument {
    /// Look up a section by `(section_type, label)`.
    ///
    /// Labels are not unique document-wide (schedules reuse numbering), so
    /// the section type is part of the identity.
    pub fn section(&self, section_type: SectionType, label: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.section_type == section_type && s.label == label)
    }

    /// Resolve the defined terms applicable to a section: every
    /// document-scoped definition plus any scoped to the section's
    /// enclosing Part. Part-scoped definitions never apply outside
    /// their Part.
    pub fn definitions_for_section(&self, section: &Section) -> Vec<&DefinedTerm> {
        self.defined_terms
            .iter()
            .filter(|term| match &term.scope {
                DefinitionScope::Document => true,
                DefinitionScope::Part(part) => section.part_label.as_deref() == Some(part),
            })
            .collect()
    }
}

/// Structural role of a section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Ordinary,
    Schedule,
    Form,
    Table,
}

/// A numbered or labeled unit of legal text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Composite label, e.g. "3", "3(1)", "3(1)(a)"
    pub label: String,

    /// Marginal note (heading), when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marginal_note: Option<String>,

    /// Rendered body text with cross-references rewritten as anchors
    pub text: String,

    pub section_type: SectionType,

    /// Label of the enclosing unit, e.g. "3(1)" for "3(1)(a)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_label: Option<String>,

    /// Label of the enclosing Part heading, when the section sits under one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_label: Option<String>,

    /// Label of the enclosing schedule, for schedule/form/table sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_label: Option<String>,

    /// Title of the enclosing schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_title: Option<String>,

    /// Verbatim OriginatingRef text of the enclosing schedule's heading,
    /// e.g. "(Section 2)". `None` when the heading carries no
    /// OriginatingRef, never an empty string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_originating_ref: Option<String>,
}

/// Scope of a defined term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionScope {
    /// Applies throughout the document
    Document,
    /// Applies only within the named Part
    Part(String),
}

/// A term introduced by a Definition block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinedTerm {
    pub term: String,

    pub language: Language,

    /// Label of the section whose Definition block introduced the term
    pub section_label: String,

    pub scope: DefinitionScope,

    /// LIMS lifecycle metadata. `None` when the Definition element carried
    /// no `lims:*` attributes at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lims: Option<LimsMetadata>,
}

/// LIMS attribute vocabulary on Definition elements.
///
/// Every field is independently optional; values are copied verbatim from
/// the source attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimsMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enacted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inforce_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pit_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_date: Option<String>,
}

impl LimsMetadata {
    /// True when no attribute was present
    pub fn is_empty(&self) -> bool {
        self.fid.is_none()
            && self.id.is_none()
            && self.enacted_date.is_none()
            && self.inforce_start_date.is_none()
            && self.pit_date.is_none()
            && self.current_date.is_none()
    }
}

/// Kind of regulation-only root block
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Recommendation,
    Notice,
}

/// A root-level Recommendation or Notice block of a regulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationBlock {
    pub block_type: BlockType,

    /// Verbatim `publication-requirement` attribute. Only Notice blocks
    /// carry it; always `None` on a Recommendation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_requirement: Option<String>,

    /// Labels of the sections this block cross-references, in document
    /// order, deduplicated
    pub source_sections: Vec<String>,

    /// Rendered body with cross-references rewritten as anchors
    pub body: String,

    /// Footnotes in source order
    pub footnotes: Vec<Footnote>,
}

/// A footnote attached to a regulation block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footnote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub label: String,
    pub text: String,
}
