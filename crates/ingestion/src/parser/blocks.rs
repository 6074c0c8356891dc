//! Regulation-only root blocks
//!
//! Recommendation and Notice blocks appear only at the document root of a
//! regulation. Internal cross-references inside a block's body contribute
//! their target labels to `source_sections` in document order, deduplicated;
//! footnotes parse in source order.

use super::render;
use crate::dom::{Element, Node};
use lexforge_common::model::{BlockType, Footnote, RegulationBlock};

pub(super) fn parse_block(el: &Element, block_type: BlockType) -> RegulationBlock {
    // Only a Notice carries the attribute; a Recommendation never does.
    let publication_requirement = match block_type {
        BlockType::Notice => el.attr("publication-requirement").map(String::from),
        BlockType::Recommendation => None,
    };

    RegulationBlock {
        block_type,
        publication_requirement,
        source_sections: source_sections(el),
        body: render::render_excluding(el, &["Footnote"]),
        footnotes: footnotes(el),
    }
}

/// Cross-reference targets in document order, deduplicated
fn source_sections(el: &Element) -> Vec<String> {
    let mut targets = Vec::new();
    collect_targets(el, &mut targets);

    let mut seen = std::collections::HashSet::new();
    targets.retain(|t| seen.insert(t.clone()));
    targets
}

fn collect_targets(el: &Element, out: &mut Vec<String>) {
    for child in &el.children {
        if let Node::Element(e) = child {
            if e.name == "XRefInternal" {
                if let Some(target) = render::xref_target(e) {
                    out.push(target);
                }
            }
            collect_targets(e, out);
        }
    }
}

/// Footnotes in source order
fn footnotes(el: &Element) -> Vec<Footnote> {
    let mut notes = Vec::new();
    collect_footnotes(el, &mut notes);
    notes
}

fn collect_footnotes(el: &Element, out: &mut Vec<Footnote>) {
    for child in el.child_elements() {
        if child.name == "Footnote" {
            out.push(Footnote {
                id: child.attr("id").map(String::from),
                placement: child.attr("placement").map(String::from),
                status: child.attr("status").map(String::from),
                label: child.child("Label").map(|l| l.text()).unwrap_or_default(),
                text: child
                    .child("Text")
                    .map(render::render)
                    .unwrap_or_else(|| child.text()),
            });
        } else {
            collect_footnotes(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_tree;

    #[test]
    fn test_notice_source_sections_ordered_and_deduped() {
        let el = parse_tree(
            r#"<Notice publication-requirement="SOR">
                <Text>Under <XRefInternal link="5">section 5</XRefInternal> and
                <XRefInternal link="3">section 3</XRefInternal>, as required by
                <XRefInternal link="5">section 5</XRefInternal>.</Text>
            </Notice>"#,
        )
        .unwrap();

        let block = parse_block(&el, BlockType::Notice);
        assert_eq!(block.source_sections, vec!["5", "3"]);
        assert_eq!(block.publication_requirement.as_deref(), Some("SOR"));
    }

    #[test]
    fn test_recommendation_never_has_publication_requirement() {
        // Even a stray attribute on the element must not surface.
        let el = parse_tree(
            r#"<Recommendation publication-requirement="SOR">
                <Text>Her Excellency recommends.</Text>
            </Recommendation>"#,
        )
        .unwrap();

        let block = parse_block(&el, BlockType::Recommendation);
        assert!(block.publication_requirement.is_none());
    }

    #[test]
    fn test_body_renders_xrefs_as_anchors() {
        let el = parse_tree(
            r#"<Notice><Text>See <XRefInternal link="7">section 7</XRefInternal>.</Text></Notice>"#,
        )
        .unwrap();

        let block = parse_block(&el, BlockType::Notice);
        assert!(block.body.contains(r##"<a href="#section-7">section 7</a>"##));
    }

    #[test]
    fn test_scraped_target_when_link_absent() {
        let el = parse_tree(
            r#"<Notice><Text>See <XRefInternal>subsection 12(1)</XRefInternal>.</Text></Notice>"#,
        )
        .unwrap();

        let block = parse_block(&el, BlockType::Notice);
        assert_eq!(block.source_sections, vec!["12(1)"]);
    }

    #[test]
    fn test_footnotes_in_source_order() {
        let el = parse_tree(
            r#"<Notice>
                <Text>Body text.</Text>
                <Footnote id="fn1" placement="bottom" status="official">
                    <Label>*</Label>
                    <Text>First note.</Text>
                </Footnote>
                <Footnote id="fn2">
                    <Label>**</Label>
                    <Text>Second note.</Text>
                </Footnote>
            </Notice>"#,
        )
        .unwrap();

        let block = parse_block(&el, BlockType::Notice);
        assert_eq!(block.footnotes.len(), 2);
        assert_eq!(block.footnotes[0].id.as_deref(), Some("fn1"));
        assert_eq!(block.footnotes[0].placement.as_deref(), Some("bottom"));
        assert_eq!(block.footnotes[0].status.as_deref(), Some("official"));
        assert_eq!(block.footnotes[0].label, "*");
        assert_eq!(block.footnotes[0].text, "First note.");
        assert_eq!(block.footnotes[1].id.as_deref(), Some("fn2"));
        assert!(block.footnotes[1].placement.is_none());
    }
}
