//! Citation formatters
//!
//! Deterministic, bilingual, source-type-specific citation builders. Every
//! formatter populates both EN and FR text/title even for a monolingual
//! query, falling back to fixed bilingual placeholder labels when inputs
//! are missing, never to empty strings. A dispatch function selects the
//! formatter by source-type tag; a tag outside the closed set is a
//! programming/data error and fails hard.

mod legislation;
mod votes;

pub use legislation::{build_legislation_citation, LegislationSectionInput};
pub use votes::{
    build_vote_member_citation, build_vote_party_citation, build_vote_question_citation,
    VoteMemberInput, VotePartyInput, VoteQuestionInput,
};

use lexforge_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

/// A value carried in both output languages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub fr: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, fr: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.into(),
        }
    }

    /// The same value in both slots
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            en: value.clone(),
            fr: value,
        }
    }
}

/// Closed set of citation source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "vote_question")]
    VoteQuestion,
    #[serde(rename = "vote_party")]
    VoteParty,
    #[serde(rename = "vote_member")]
    VoteMember,
    #[serde(rename = "legislation-section")]
    LegislationSection,
}

impl SourceType {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "vote_question" => Some(SourceType::VoteQuestion),
            "vote_party" => Some(SourceType::VoteParty),
            "vote_member" => Some(SourceType::VoteMember),
            "legislation-section" => Some(SourceType::LegislationSection),
            _ => None,
        }
    }
}

/// A verifiable citation attached to a context build.
///
/// Ids are sequential and 1-based in final rank order, stable only within
/// one context build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: usize,
    pub source_type: SourceType,
    pub text: Bilingual,
    pub title: Bilingual,
    /// Absent means non-linkable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Bilingual>,
}

/// Per-field output replacements.
///
/// Lets a caller inject enumeration context (e.g. an ordinal among several
/// citations) without recomputing the rest of the citation.
#[derive(Debug, Clone, Default)]
pub struct CitationOverrides {
    pub text_en: Option<String>,
    pub text_fr: Option<String>,
    pub title_en: Option<String>,
    pub title_fr: Option<String>,
}

impl CitationOverrides {
    pub(crate) fn apply(&self, citation: &mut Citation) {
        if let Some(text) = &self.text_en {
            citation.text.en = text.clone();
        }
        if let Some(text) = &self.text_fr {
            citation.text.fr = text.clone();
        }
        if let Some(title) = &self.title_en {
            citation.title.en = title.clone();
        }
        if let Some(title) = &self.title_fr {
            citation.title.fr = title.clone();
        }
    }
}

/// Build a citation for a source-type tag and its metadata payload.
///
/// Fails with `UnsupportedSourceType` for any tag outside the closed set:
/// a new source type introduced without a formatter must surface loudly.
pub fn build_citation(
    id: usize,
    source_type: &str,
    metadata: &serde_json::Value,
    overrides: Option<&CitationOverrides>,
) -> Result<Citation> {
    let parsed = SourceType::parse(source_type).ok_or_else(|| AppError::UnsupportedSourceType {
        source_type: source_type.to_string(),
    })?;

    let citation = match parsed {
        SourceType::VoteQuestion => {
            build_vote_question_citation(id, &input_from(metadata), overrides)
        }
        SourceType::VoteParty => build_vote_party_citation(id, &input_from(metadata), overrides),
        SourceType::VoteMember => build_vote_member_citation(id, &input_from(metadata), overrides),
        SourceType::LegislationSection => {
            build_legislation_citation(id, &input_from(metadata), overrides)
        }
    };

    Ok(citation)
}

/// Lenient metadata decode: unknown fields are ignored, missing fields
/// fall back to the formatter placeholders.
fn input_from<T: Default + serde::de::DeserializeOwned>(metadata: &serde_json::Value) -> T {
    serde_json::from_value(metadata.clone()).unwrap_or_default()
}

/// Bilingual date rendering ("May 1, 2024" / "1 mai 2024").
///
/// Unparseable inputs pass through verbatim into both slots; absent inputs
/// are the caller's placeholder concern.
pub(crate) fn format_date(raw: &str) -> Bilingual {
    const MONTHS_EN: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    const MONTHS_FR: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ];

    match chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => {
            use chrono::Datelike;
            let month = date.month0() as usize;
            Bilingual::new(
                format!("{} {}, {}", MONTHS_EN[month], date.day(), date.year()),
                format!("{} {} {}", date.day(), MONTHS_FR[month], date.year()),
            )
        }
        Err(_) => Bilingual::same(raw),
    }
}

/// Fixed placeholder for an absent date
pub(crate) fn unknown_date() -> Bilingual {
    Bilingual::new("unknown date", "date inconnue")
}
