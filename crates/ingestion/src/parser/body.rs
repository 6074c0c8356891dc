//! Body walk
//!
//! Depth-first descent over the document body: numbered units become
//! `Section` values with composed labels ("3" + "(1)" + "(a)" → "3(1)(a)"),
//! `Heading` elements with a Part label open a Part scope for definitions,
//! and `Definition` elements yield `DefinedTerm` entries with their LIMS
//! attributes copied verbatim.

use super::render;
use crate::dom::Element;
use lexforge_common::model::{
    DefinedTerm, DefinitionScope, Language, LimsMetadata, Section, SectionType,
};

/// Numbered sub-units that become their own sections
const SUB_UNITS: &[&str] = &["Subsection", "Paragraph", "Subparagraph", "Clause"];

/// Children excluded from a unit's own body text
const NON_BODY: &[&str] = &[
    "Label",
    "MarginalNote",
    "Subsection",
    "Paragraph",
    "Subparagraph",
    "Clause",
];

/// Schedule context inherited by every section nested under a schedule
#[derive(Debug, Clone, Default)]
pub(super) struct ScheduleInfo {
    pub label: Option<String>,
    pub title: Option<String>,
    pub originating_ref: Option<String>,
}

/// Accumulates sections and defined terms during the walk
pub(super) struct Collector {
    language: Language,
    pub sections: Vec<Section>,
    pub terms: Vec<DefinedTerm>,
}

impl Collector {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            sections: Vec::new(),
            terms: Vec::new(),
        }
    }

    /// Walk the document body, tracking the enclosing Part
    pub fn walk_body(&mut self, body: &Element) {
        let mut part: Option<String> = None;

        for el in body.child_elements() {
            match el.name.as_str() {
                "Heading" => {
                    if let Some(label) = el.child("Label") {
                        let text = label.text();
                        if is_part_label(&text) {
                            part = Some(text);
                        }
                    }
                }
                "Section" => self.collect_section(el, None, part.as_deref(), None),
                _ => {}
            }
        }
    }

    /// Collect one numbered unit and its nested sub-units
    pub fn collect_section(
        &mut self,
        el: &Element,
        parent_label: Option<&str>,
        part: Option<&str>,
        schedule: Option<&ScheduleInfo>,
    ) {
        let own_label = el.child("Label").map(|l| l.text()).filter(|l| !l.is_empty());
        let label = match (parent_label, own_label) {
            (Some(parent), Some(own)) => format!("{}{}", parent, own),
            (None, Some(own)) => own,
            (Some(parent), None) => parent.to_string(),
            // A unit with no label anywhere is not addressable; skip it.
            (None, None) => return,
        };

        let marginal_note = el
            .child("MarginalNote")
            .map(render::render)
            .filter(|s| !s.is_empty());

        let section_type = if schedule.is_some() {
            SectionType::Schedule
        } else {
            SectionType::Ordinary
        };

        self.sections.push(Section {
            label: label.clone(),
            marginal_note,
            text: render::render_excluding(el, NON_BODY),
            section_type,
            parent_label: parent_label.map(String::from),
            part_label: part.map(String::from),
            schedule_label: schedule.and_then(|s| s.label.clone()),
            schedule_title: schedule.and_then(|s| s.title.clone()),
            schedule_originating_ref: schedule.and_then(|s| s.originating_ref.clone()),
        });

        self.collect_definitions(el, &label, part);

        for sub in el.child_elements() {
            if SUB_UNITS.contains(&sub.name.as_str()) {
                self.collect_section(sub, Some(&label), part, schedule);
            }
        }
    }

    /// Definition elements belonging to this unit (nested sub-units scan
    /// their own)
    fn collect_definitions(&mut self, el: &Element, section_label: &str, part: Option<&str>) {
        let mut found = Vec::new();
        definitions_within(el, &mut found);

        for def in found {
            if let Some(term) = self.parse_definition(def, section_label, part) {
                self.terms.push(term);
            }
        }
    }

    fn parse_definition(
        &self,
        def: &Element,
        section_label: &str,
        part: Option<&str>,
    ) -> Option<DefinedTerm> {
        let term_element = match self.language {
            Language::En => "DefinedTermEn",
            Language::Fr => "DefinedTermFr",
        };

        let term = def.descendant(term_element)?.text();
        if term.is_empty() {
            return None;
        }

        let scope = match part {
            Some(part) => DefinitionScope::Part(part.to_string()),
            None => DefinitionScope::Document,
        };

        Some(DefinedTerm {
            term,
            language: self.language,
            section_label: section_label.to_string(),
            scope,
            lims: lims_metadata(def),
        })
    }
}

/// LIMS attributes, extracted attribute-by-attribute.
///
/// A Definition with none of them yields no metadata object at all,
/// preserving the absent-vs-empty distinction.
fn lims_metadata(def: &Element) -> Option<LimsMetadata> {
    let lims = LimsMetadata {
        fid: def.attr("lims:fid").map(String::from),
        id: def.attr("lims:id").map(String::from),
        enacted_date: def.attr("lims:enacted-date").map(String::from),
        inforce_start_date: def.attr("lims:inforce-start-date").map(String::from),
        pit_date: def.attr("lims:pit-date").map(String::from),
        current_date: def.attr("lims:current-date").map(String::from),
    };

    if lims.is_empty() {
        None
    } else {
        Some(lims)
    }
}

/// Definitions under an element, stopping at nested numbered units
fn definitions_within<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    for child in el.child_elements() {
        if SUB_UNITS.contains(&child.name.as_str()) {
            continue;
        }
        if child.name == "Definition" {
            out.push(child);
        }
        definitions_within(child, out);
    }
}

fn is_part_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("part") || lower.starts_with("partie")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_tree;

    fn walk(xml: &str, language: Language) -> Collector {
        let body = parse_tree(xml).unwrap();
        let mut collector = Collector::new(language);
        collector.walk_body(&body);
        collector
    }

    #[test]
    fn test_label_composition() {
        let collector = walk(
            r#"<Body>
                <Section>
                    <Label>3</Label>
                    <Text>General rule.</Text>
                    <Subsection>
                        <Label>(1)</Label>
                        <Text>First case.</Text>
                        <Paragraph>
                            <Label>(a)</Label>
                            <Text>a specific case</Text>
                        </Paragraph>
                    </Subsection>
                </Section>
            </Body>"#,
            Language::En,
        );

        let labels: Vec<&str> = collector.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["3", "3(1)", "3(1)(a)"]);
        assert_eq!(collector.sections[2].parent_label.as_deref(), Some("3(1)"));
        assert_eq!(collector.sections[0].section_type, SectionType::Ordinary);
    }

    #[test]
    fn test_part_heading_scopes_definitions() {
        let collector = walk(
            r#"<Body>
                <Section>
                    <Label>2</Label>
                    <Definition lims:fid="10">
                        <Text><DefinedTermEn>vessel</DefinedTermEn> means a boat.</Text>
                    </Definition>
                </Section>
                <Heading><Label>PART 2</Label></Heading>
                <Section>
                    <Label>14</Label>
                    <Definition>
                        <Text><DefinedTermEn>operator</DefinedTermEn> means a person.</Text>
                    </Definition>
                </Section>
            </Body>"#,
            Language::En,
        );

        assert_eq!(collector.terms.len(), 2);
        assert_eq!(collector.terms[0].scope, DefinitionScope::Document);
        assert_eq!(
            collector.terms[1].scope,
            DefinitionScope::Part("PART 2".to_string())
        );
        assert_eq!(collector.sections[1].part_label.as_deref(), Some("PART 2"));
    }

    #[test]
    fn test_lims_single_attribute() {
        let collector = walk(
            r#"<Body><Section><Label>2</Label>
                <Definition lims:fid="12345">
                    <Text><DefinedTermEn>day</DefinedTermEn> means a calendar day.</Text>
                </Definition>
            </Section></Body>"#,
            Language::En,
        );

        let lims = collector.terms[0].lims.as_ref().unwrap();
        assert_eq!(lims.fid.as_deref(), Some("12345"));
        assert!(lims.id.is_none());
        assert!(lims.enacted_date.is_none());
        assert!(lims.inforce_start_date.is_none());
        assert!(lims.pit_date.is_none());
        assert!(lims.current_date.is_none());
    }

    #[test]
    fn test_lims_absent_entirely() {
        let collector = walk(
            r#"<Body><Section><Label>2</Label>
                <Definition>
                    <Text><DefinedTermEn>day</DefinedTermEn> means a calendar day.</Text>
                </Definition>
            </Section></Body>"#,
            Language::En,
        );

        assert!(collector.terms[0].lims.is_none());
    }

    #[test]
    fn test_multiple_definitions_in_one_section() {
        let collector = walk(
            r#"<Body><Section><Label>2</Label>
                <Definition><Text><DefinedTermEn>act</DefinedTermEn> ...</Text></Definition>
                <Definition><Text><DefinedTermEn>omission</DefinedTermEn> ...</Text></Definition>
            </Section></Body>"#,
            Language::En,
        );

        let terms: Vec<&str> = collector.terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["act", "omission"]);
        assert!(collector.terms.iter().all(|t| t.section_label == "2"));
    }

    #[test]
    fn test_definition_term_follows_requested_language() {
        let xml = r#"<Body><Section><Label>2</Label>
            <Definition lims:fid="555">
                <Text><DefinedTermFr>bâtiment</DefinedTermFr> Tout genre de navire.</Text>
            </Definition>
        </Section></Body>"#;

        let fr = walk(xml, Language::Fr);
        assert_eq!(fr.terms.len(), 1);
        assert_eq!(fr.terms[0].term, "bâtiment");
        assert_eq!(fr.terms[0].language, Language::Fr);
        assert_eq!(fr.terms[0].lims.as_ref().unwrap().fid.as_deref(), Some("555"));

        // No EN term element: the EN pass yields nothing for this block
        let en = walk(xml, Language::En);
        assert!(en.terms.is_empty());
    }
}
