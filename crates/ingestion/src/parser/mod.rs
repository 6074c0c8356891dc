//! Legal XML parser
//!
//! Converts bilingual legislative markup (Justice-style consolidated XML)
//! into the shared document model: sections, defined terms, schedules,
//! regulation-only blocks, and footnotes. One parse handles one language;
//! bilingual coverage comes from parsing the EN and FR source documents
//! separately.

mod blocks;
mod body;
mod render;
mod schedule;

use crate::dom;
use body::Collector;
use lexforge_common::errors::{AppError, Result};
use lexforge_common::model::{BlockType, DocumentType, Language, LegalDocument};
use tracing::debug;

/// Parse raw markup into a legal document.
///
/// Fails with `AppError::Parse` when the root element is neither a
/// recognized statute nor regulation container, or when mandatory
/// identification fields are missing.
pub fn parse(raw: &str, language: Language) -> Result<LegalDocument> {
    let root = dom::parse_tree(raw)?;

    let doc_type = match root.name.as_str() {
        "Statute" => DocumentType::Act,
        "Regulation" => DocumentType::Regulation,
        other => {
            return Err(AppError::Parse {
                document: "<input>".to_string(),
                message: format!("unrecognized root element '{}'", other),
            })
        }
    };

    let (id, short_title, long_title) = identification(&root, doc_type)?;

    let mut collector = Collector::new(language);

    if let Some(body) = root.child("Body") {
        collector.walk_body(body);
    }

    for sched in root.children_named("Schedule") {
        schedule::walk_schedule(&mut collector, sched);
    }

    // Regulation-only blocks are recognized at the root level only.
    let mut recommendations = Vec::new();
    let mut notices = Vec::new();
    if doc_type == DocumentType::Regulation {
        for el in root.children_named("Recommendation") {
            recommendations.push(blocks::parse_block(el, BlockType::Recommendation));
        }
        for el in root.children_named("Notice") {
            notices.push(blocks::parse_block(el, BlockType::Notice));
        }
    }

    debug!(
        id = %id,
        sections = collector.sections.len(),
        terms = collector.terms.len(),
        "Document parsed"
    );

    Ok(LegalDocument {
        id,
        short_title,
        long_title,
        doc_type,
        language,
        sections: collector.sections,
        defined_terms: collector.terms,
        recommendations,
        notices,
    })
}

/// Extract the identification block: short title plus the chapter number
/// (acts) or instrument number (regulations).
fn identification(
    root: &dom::Element,
    doc_type: DocumentType,
) -> Result<(String, String, Option<String>)> {
    let ident = root.child("Identification").ok_or_else(|| AppError::Parse {
        document: "<input>".to_string(),
        message: "missing Identification block".to_string(),
    })?;

    let short_title = ident
        .child("ShortTitle")
        .map(|t| t.text())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Parse {
            document: "<input>".to_string(),
            message: "missing ShortTitle".to_string(),
        })?;

    let long_title = ident
        .child("LongTitle")
        .map(|t| t.text())
        .filter(|t| !t.is_empty());

    let id = match doc_type {
        DocumentType::Act => ident.child("Chapter").map(|chapter| {
            chapter
                .child("ConsolidatedNumber")
                .map(|n| n.text())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| chapter.text())
        }),
        DocumentType::Regulation => ident.child("InstrumentNumber").map(|n| n.text()),
    }
    .filter(|id| !id.is_empty())
    .ok_or_else(|| AppError::Parse {
        document: short_title.clone(),
        message: "missing chapter or instrument number".to_string(),
    })?;

    Ok((id, short_title, long_title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexforge_common::model::SectionType;

    const MINIMAL_ACT: &str = r#"
        <Statute>
            <Identification>
                <LongTitle>An Act respecting examples</LongTitle>
                <ShortTitle>Example Act</ShortTitle>
                <Chapter><ConsolidatedNumber>E-1</ConsolidatedNumber></Chapter>
            </Identification>
            <Body>
                <Section>
                    <Label>1</Label>
                    <MarginalNote>Prohibition</MarginalNote>
                    <Text>No person shall operate a vessel without authorization.</Text>
                </Section>
            </Body>
        </Statute>"#;

    #[test]
    fn test_minimal_act_english() {
        let doc = parse(MINIMAL_ACT, Language::En).unwrap();
        assert_eq!(doc.id, "E-1");
        assert_eq!(doc.short_title, "Example Act");
        assert_eq!(doc.long_title.as_deref(), Some("An Act respecting examples"));
        assert_eq!(doc.doc_type, DocumentType::Act);
        assert_eq!(doc.language, Language::En);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].section_type, SectionType::Ordinary);
        assert_eq!(doc.sections[0].label, "1");
        assert_eq!(doc.sections[0].marginal_note.as_deref(), Some("Prohibition"));
    }

    #[test]
    fn test_minimal_french_definition() {
        let xml = r#"
            <Statute>
                <Identification>
                    <ShortTitle>Loi type</ShortTitle>
                    <Chapter><ConsolidatedNumber>T-1</ConsolidatedNumber></Chapter>
                </Identification>
                <Body>
                    <Section>
                        <Label>2</Label>
                        <Definition lims:fid="555">
                            <Text><DefinedTermFr>bâtiment</DefinedTermFr> Tout genre de navire.</Text>
                        </Definition>
                    </Section>
                </Body>
            </Statute>"#;

        let doc = parse(xml, Language::Fr).unwrap();
        assert_eq!(doc.defined_terms.len(), 1);
        let term = &doc.defined_terms[0];
        assert_eq!(term.term, "bâtiment");
        assert_eq!(term.language, Language::Fr);
        assert_eq!(term.lims.as_ref().unwrap().fid.as_deref(), Some("555"));
    }

    #[test]
    fn test_unrecognized_root_fails() {
        let err = parse("<Gazette><Body/></Gazette>", Language::En).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_missing_identification_fails() {
        let err = parse("<Statute><Body/></Statute>", Language::En).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_missing_number_fails() {
        let xml = r#"
            <Statute>
                <Identification><ShortTitle>Example Act</ShortTitle></Identification>
                <Body/>
            </Statute>"#;
        let err = parse(xml, Language::En).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_regulation_with_blocks() {
        let xml = r#"
            <Regulation>
                <Identification>
                    <ShortTitle>Example Regulations</ShortTitle>
                    <InstrumentNumber>SOR/2024-100</InstrumentNumber>
                </Identification>
                <Recommendation>
                    <Text>Her Excellency, on the recommendation of the Minister,
                    makes these Regulations under
                    <XRefInternal link="5">section 5</XRefInternal>.</Text>
                </Recommendation>
                <Notice publication-requirement="statutory-gazette">
                    <Text>Notice is given under
                    <XRefInternal link="12">section 12</XRefInternal>.</Text>
                </Notice>
                <Body>
                    <Section><Label>1</Label><Text>These Regulations apply.</Text></Section>
                </Body>
            </Regulation>"#;

        let doc = parse(xml, Language::En).unwrap();
        assert_eq!(doc.id, "SOR/2024-100");
        assert_eq!(doc.doc_type, DocumentType::Regulation);
        assert_eq!(doc.recommendations.len(), 1);
        assert_eq!(doc.notices.len(), 1);
        assert!(doc.recommendations[0].publication_requirement.is_none());
        assert_eq!(
            doc.notices[0].publication_requirement.as_deref(),
            Some("statutory-gazette")
        );
        assert_eq!(doc.recommendations[0].source_sections, vec!["5"]);
        assert_eq!(doc.notices[0].source_sections, vec!["12"]);
    }

    #[test]
    fn test_blocks_ignored_on_statutes() {
        let xml = r#"
            <Statute>
                <Identification>
                    <ShortTitle>Example Act</ShortTitle>
                    <Chapter><ConsolidatedNumber>E-1</ConsolidatedNumber></Chapter>
                </Identification>
                <Notice publication-requirement="x"><Text>stray</Text></Notice>
                <Body/>
            </Statute>"#;

        let doc = parse(xml, Language::En).unwrap();
        assert!(doc.notices.is_empty());
        assert!(doc.recommendations.is_empty());
    }

    #[test]
    fn test_schedule_sections_keep_separate_identity() {
        let xml = r#"
            <Statute>
                <Identification>
                    <ShortTitle>Example Act</ShortTitle>
                    <Chapter><ConsolidatedNumber>E-1</ConsolidatedNumber></Chapter>
                </Identification>
                <Body>
                    <Section><Label>1</Label><Text>Main body rule.</Text></Section>
                </Body>
                <Schedule>
                    <ScheduleFormHeading>
                        <Label>SCHEDULE</Label>
                        <OriginatingRef>(Section 1)</OriginatingRef>
                    </ScheduleFormHeading>
                    <List>
                        <Section><Label>1</Label><Text>Listed item.</Text></Section>
                    </List>
                </Schedule>
            </Statute>"#;

        let doc = parse(xml, Language::En).unwrap();
        // Labels collide; lookup identity includes the section type.
        let ordinary = doc.section(SectionType::Ordinary, "1").unwrap();
        assert!(ordinary.schedule_originating_ref.is_none());
        let schedule = doc.section(SectionType::Schedule, "1").unwrap();
        assert_eq!(schedule.schedule_originating_ref.as_deref(), Some("(Section 1)"));
    }

    #[test]
    fn test_chapter_text_fallback_when_no_consolidated_number() {
        let xml = r#"
            <Statute>
                <Identification>
                    <ShortTitle>Example Act</ShortTitle>
                    <Chapter>1992, c. 31</Chapter>
                </Identification>
                <Body/>
            </Statute>"#;

        let doc = parse(xml, Language::En).unwrap();
        assert_eq!(doc.id, "1992, c. 31");
    }
}
