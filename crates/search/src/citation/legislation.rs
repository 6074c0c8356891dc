//! Legislation section citations
//!
//! Built from the chunk metadata the store returns with every hit:
//! instrument id, short title, and section label. URLs point at the
//! consolidated Justice Laws site, language-parameterized, with the
//! section anchor derived from the base section number.

use super::{Bilingual, Citation, CitationOverrides, SourceType};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislationSectionInput {
    /// Chapter or instrument number, e.g. "C-46" or "SOR/2024-100"
    pub document_id: Option<String>,
    /// Short title in the indexed language
    pub title: Option<String>,
    /// French short title when the correlated FR parse is available
    pub title_fr: Option<String>,
    pub section_label: Option<String>,
    pub marginal_note: Option<String>,
    /// "act" or "regulation"
    pub doc_type: Option<String>,
}

/// Base section number for the URL anchor: "3(1)(a)" anchors at "3"
fn base_label(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}

/// Instrument ids become URL path segments with "/" flattened
fn url_id(document_id: &str) -> String {
    document_id.replace('/', "-")
}

fn legislation_url(input: &LegislationSectionInput) -> Bilingual {
    let (path_en, path_fr) = match input.doc_type.as_deref() {
        Some("regulation") => ("regulations", "reglements"),
        _ => ("acts", "lois"),
    };

    match &input.document_id {
        Some(document_id) => {
            let id = url_id(document_id);
            match input.section_label.as_deref().filter(|l| !l.is_empty()) {
                Some(label) => Bilingual::new(
                    format!(
                        "https://laws-lois.justice.gc.ca/eng/{}/{}/section-{}.html",
                        path_en,
                        id,
                        base_label(label)
                    ),
                    format!(
                        "https://laws-lois.justice.gc.ca/fra/{}/{}/section-{}.html",
                        path_fr,
                        id,
                        base_label(label)
                    ),
                ),
                None => Bilingual::new(
                    format!("https://laws-lois.justice.gc.ca/eng/{}/{}/", path_en, id),
                    format!("https://laws-lois.justice.gc.ca/fra/{}/{}/", path_fr, id),
                ),
            }
        }
        None => Bilingual::new(
            "https://laws-lois.justice.gc.ca/eng/",
            "https://laws-lois.justice.gc.ca/fra/",
        ),
    }
}

/// Citation for a section of an act or regulation
pub fn build_legislation_citation(
    id: usize,
    input: &LegislationSectionInput,
    overrides: Option<&CitationOverrides>,
) -> Citation {
    let title = match (&input.title, &input.title_fr) {
        (Some(en), Some(fr)) => Bilingual::new(en.clone(), fr.clone()),
        (Some(en), None) => Bilingual::same(en.clone()),
        (None, Some(fr)) => Bilingual::same(fr.clone()),
        (None, None) => Bilingual::new("unknown instrument", "instrument inconnu"),
    };

    let section = match input.section_label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => Bilingual::new(format!("s {}", label), format!("art {}", label)),
        None => Bilingual::new("unknown provision", "disposition inconnue"),
    };

    let text = match input.marginal_note.as_deref().filter(|n| !n.is_empty()) {
        Some(note) => Bilingual::new(
            format!("{}, {} ({})", title.en, section.en, note),
            format!("{}, {} ({})", title.fr, section.fr, note),
        ),
        None => Bilingual::new(
            format!("{}, {}", title.en, section.en),
            format!("{}, {}", title.fr, section.fr),
        ),
    };

    let mut citation = Citation {
        id,
        source_type: SourceType::LegislationSection,
        text,
        title,
        url: Some(legislation_url(input)),
    };

    if let Some(overrides) = overrides {
        overrides.apply(&mut citation);
    }
    citation
}
