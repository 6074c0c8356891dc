//! Schedule walk
//!
//! Sections can nest arbitrarily deep under a schedule (through List,
//! FormGroup, TableGroup and the like); all of them resolve to the same
//! schedule ancestor and inherit its label, title, and OriginatingRef.

use super::body::{Collector, ScheduleInfo};
use super::render;
use crate::dom::Element;
use lexforge_common::model::{Section, SectionType};

/// Walk one root-level Schedule element
pub(super) fn walk_schedule(collector: &mut Collector, schedule: &Element) {
    let heading = schedule.child("ScheduleFormHeading");

    let info = ScheduleInfo {
        label: heading
            .and_then(|h| h.child("Label"))
            .map(|l| l.text())
            .filter(|l| !l.is_empty()),
        title: heading
            .and_then(|h| h.child("TitleText"))
            .map(|t| t.text())
            .filter(|t| !t.is_empty()),
        // Verbatim heading text; absent stays None, never "".
        originating_ref: heading
            .and_then(|h| h.child("OriginatingRef"))
            .map(|r| r.text())
            .filter(|r| !r.is_empty()),
    };

    descend(collector, schedule, &info);
}

fn descend(collector: &mut Collector, el: &Element, info: &ScheduleInfo) {
    for child in el.child_elements() {
        match child.name.as_str() {
            "ScheduleFormHeading" => {}
            "Section" => collector.collect_section(child, None, None, Some(info)),
            "FormGroup" => {
                collector.sections.push(group_section(child, info, SectionType::Form, "Form"));
                descend(collector, child, info);
            }
            "TableGroup" => {
                collector.sections.push(group_section(child, info, SectionType::Table, "Table"));
                descend(collector, child, info);
            }
            // List and any other container: keep looking for sections
            _ => descend(collector, child, info),
        }
    }
}

/// A FormGroup/TableGroup projects its own section carrying the group
/// caption, so schedules with only tabular content remain retrievable.
fn group_section(
    group: &Element,
    info: &ScheduleInfo,
    section_type: SectionType,
    fallback_label: &str,
) -> Section {
    let caption = group
        .child("Caption")
        .map(render::render)
        .filter(|c| !c.is_empty());

    let label = group
        .child("Label")
        .map(|l| l.text())
        .filter(|l| !l.is_empty())
        .or_else(|| caption.clone())
        .unwrap_or_else(|| fallback_label.to_string());

    Section {
        label,
        marginal_note: None,
        text: caption.unwrap_or_default(),
        section_type,
        parent_label: None,
        part_label: None,
        schedule_label: info.label.clone(),
        schedule_title: info.title.clone(),
        schedule_originating_ref: info.originating_ref.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_tree;
    use lexforge_common::model::Language;

    fn walk(xml: &str) -> Collector {
        let schedule = parse_tree(xml).unwrap();
        let mut collector = Collector::new(Language::En);
        walk_schedule(&mut collector, &schedule);
        collector
    }

    #[test]
    fn test_originating_ref_propagates_through_nesting() {
        let collector = walk(
            r#"<Schedule>
                <ScheduleFormHeading>
                    <Label>SCHEDULE I</Label>
                    <TitleText>Designated Substances</TitleText>
                    <OriginatingRef>(Section 2)</OriginatingRef>
                </ScheduleFormHeading>
                <List>
                    <Section><Label>1</Label><Text>Item one.</Text></Section>
                </List>
                <FormGroup>
                    <Section><Label>2</Label><Text>Item two.</Text></Section>
                </FormGroup>
                <TableGroup>
                    <List>
                        <Section><Label>3</Label><Text>Item three.</Text></Section>
                    </List>
                </TableGroup>
            </Schedule>"#,
        );

        let sections: Vec<&Section> = collector
            .sections
            .iter()
            .filter(|s| s.section_type == SectionType::Schedule)
            .collect();
        assert_eq!(sections.len(), 3);
        for section in sections {
            assert_eq!(section.schedule_label.as_deref(), Some("SCHEDULE I"));
            assert_eq!(section.schedule_title.as_deref(), Some("Designated Substances"));
            assert_eq!(section.schedule_originating_ref.as_deref(), Some("(Section 2)"));
        }
    }

    #[test]
    fn test_missing_originating_ref_is_none() {
        let collector = walk(
            r#"<Schedule>
                <ScheduleFormHeading><Label>SCHEDULE</Label></ScheduleFormHeading>
                <List><Section><Label>1</Label><Text>Item.</Text></Section></List>
            </Schedule>"#,
        );

        for section in &collector.sections {
            assert!(section.schedule_originating_ref.is_none());
        }
    }

    #[test]
    fn test_groups_project_their_own_sections() {
        let collector = walk(
            r#"<Schedule>
                <ScheduleFormHeading><Label>SCHEDULE 2</Label></ScheduleFormHeading>
                <FormGroup><Caption>Form 1 Application</Caption></FormGroup>
                <TableGroup><Caption>Fee Table</Caption></TableGroup>
            </Schedule>"#,
        );

        assert_eq!(collector.sections.len(), 2);
        assert_eq!(collector.sections[0].section_type, SectionType::Form);
        assert_eq!(collector.sections[0].text, "Form 1 Application");
        assert_eq!(collector.sections[1].section_type, SectionType::Table);
        assert_eq!(collector.sections[1].schedule_label.as_deref(), Some("SCHEDULE 2"));
    }
}
