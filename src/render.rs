//! Field rendering and document assembly.
//!
//! `render_field` dispatches one custom field to the right interpreter based
//! on the shape decided at load time. `assemble` walks the whole task in the
//! fixed section order and produces the final block stream. Nothing here can
//! fail: a bad field degrades to a fallback block, never to a missing
//! document.

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::delta::{parse_delta, render_ops};
use crate::fields::FieldValue;
use crate::layout::{Block, HeadingLevel, StyleId};
use crate::lookup::TaskLookup;
use crate::markdown::render_markdown;
use crate::markup::{esc, urlify_text};
use crate::task::{CustomField, EntityRef, Task};

/// Field rendered as a standalone link section near the top.
pub const RECORDING_FIELD: &str = "AI Recording URL";

/// Field whose first entity becomes the owner meta line.
pub const OWNER_FIELD: &str = "Owner of this VE";

/// Relationship fields, printed in this order under "Related".
pub const RELATED_ORDER: [&str; 5] = [
    "Owner of this VE",
    "Contributors to this value exchange",
    "People identified as possible future contributors",
    "Work Navigator",
    "Wellbeing Mentor",
];

/// Text fields printed first, in this order; the rest follow in source order.
pub const PREFERRED_ORDER: [&str; 7] = [
    "AI Summary",
    "Looking Back (Value Recognition)",
    "What is your mission?",
    "Summary of Next Actions",
    "Comments on VE Collaborators for this period",
    "Comments on VE collaborators for next period",
    "Time and Money",
];

const EMPTY_RELATION_WARNING: &str = "not completed – please think about this";

/// Render one custom field into blocks. Dispatch order: rich-text payload,
/// then reference shapes, then plain text, then the stringify fallback.
pub fn render_field(field: &CustomField, lookup: &TaskLookup) -> Vec<Block> {
    if let Some(raw) = field.richtext() {
        match parse_delta(raw) {
            Ok(doc) => return render_ops(&doc.ops, lookup),
            Err(error) => {
                warn!(field = %field.name, %error, "rich text payload did not parse, using plain value");
            }
        }
    }
    match &field.parsed {
        FieldValue::ReferenceList(refs) => entity_blocks(refs),
        FieldValue::SingleReference(entity) => entity_blocks(std::slice::from_ref(entity)),
        FieldValue::PlainText(text) => {
            vec![Block::paragraph(
                urlify_text(text, lookup).replace('\n', "<br/>"),
            )]
        }
        FieldValue::Empty => Vec::new(),
        FieldValue::Other(value) => vec![Block::paragraph(esc(&stringify(value)))],
    }
}

/// One button (or plain label) per entity, each followed by a spacer.
/// Entities with nothing to show are skipped rather than rendered blank.
fn entity_blocks(refs: &[EntityRef]) -> Vec<Block> {
    let mut blocks = Vec::new();
    for entity in refs {
        let label = match entity.label() {
            Some(l) => l,
            None => continue,
        };
        match entity.url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => blocks.push(Block::Button {
                label: label.to_string(),
                url: url.to_string(),
            }),
            None => blocks.push(Block::paragraph(esc(label))),
        }
        blocks.push(Block::spacer(4.0));
    }
    blocks
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Assemble the whole document: title and meta, description, recording link,
/// the Related section, preferred text fields, then the remaining text
/// fields in their source order.
pub fn assemble(task: &Task) -> Vec<Block> {
    let lookup = TaskLookup::from_task(task);
    let mut blocks = Vec::new();

    title_and_meta(task, &mut blocks);

    let description = task
        .markdown_description
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| task.description.as_deref().filter(|t| !t.trim().is_empty()));
    if let Some(text) = description {
        blocks.push(Block::heading(HeadingLevel::H2, "Description"));
        blocks.push(Block::spacer(2.0));
        blocks.extend(render_markdown(text));
    }

    if let Some(field) = task.field(RECORDING_FIELD) {
        url_link_section(field, "Verbatim recording", &mut blocks);
    }

    blocks.push(Block::heading(HeadingLevel::H2, "Related"));
    blocks.push(Block::spacer(2.0));
    for name in RELATED_ORDER {
        if let Some(field) = task.field(name) {
            relationship_section(field, &mut blocks);
        }
    }

    let mut printed: HashSet<&str> = HashSet::new();
    for name in PREFERRED_ORDER {
        if let Some(field) = task.field(name) {
            if field.is_text() {
                text_section(field, &lookup, &mut blocks);
                printed.insert(name);
            }
        }
    }
    for field in &task.custom_fields {
        if field.is_text() && !printed.contains(field.name.as_str()) {
            text_section(field, &lookup, &mut blocks);
        }
    }

    blocks
}

fn title_and_meta(task: &Task, blocks: &mut Vec<Block>) {
    blocks.push(Block::heading(HeadingLevel::H1, esc(task.display_name())));

    if let Some(url) = task.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let href = esc(url);
        blocks.push(Block::Paragraph {
            markup: format!(r#"<a href="{href}">{href}</a>"#),
            style: StyleId::Link,
        });
    }

    if let Some(owner) = task.field(OWNER_FIELD).and_then(first_entity) {
        if let Some(name) = owner.name.as_deref().filter(|n| !n.trim().is_empty()) {
            let markup = match owner.url.as_deref().filter(|u| !u.trim().is_empty()) {
                Some(url) => format!(
                    r#"<b>Owner:</b> <a href="{}">{}</a>"#,
                    esc(url),
                    esc(name)
                ),
                None => format!("<b>Owner:</b> {}", esc(name)),
            };
            blocks.push(Block::Paragraph {
                markup,
                style: StyleId::Meta,
            });
        }
    }

    let mut dates = Vec::new();
    if let Some(created) = task.created() {
        dates.push(format!("<b>Created:</b> {created}"));
    }
    if let Some(updated) = task.updated() {
        dates.push(format!("<b>Updated:</b> {updated}"));
    }
    if !dates.is_empty() {
        blocks.push(Block::Paragraph {
            markup: dates.join("  "),
            style: StyleId::Meta,
        });
    }

    blocks.push(Block::spacer(8.0));
}

fn first_entity(field: &CustomField) -> Option<&EntityRef> {
    match &field.parsed {
        FieldValue::ReferenceList(refs) => refs.first(),
        FieldValue::SingleReference(entity) => Some(entity),
        _ => None,
    }
}

/// A named field holding a single URL, rendered as its own link section.
/// Skipped when the value is absent.
fn url_link_section(field: &CustomField, label: &str, blocks: &mut Vec<Block>) {
    let url = match &field.parsed {
        FieldValue::PlainText(s) => s.trim().to_string(),
        FieldValue::Other(v) => stringify(v),
        _ => return,
    };
    if url.is_empty() {
        return;
    }
    let href = esc(&url);
    blocks.push(Block::heading(HeadingLevel::H2, esc(label)));
    blocks.push(Block::Paragraph {
        markup: format!(r#"<a href="{href}">{href}</a>"#),
        style: StyleId::Link,
    });
    blocks.push(Block::spacer(6.0));
}

/// One relationship field under "Related": sub-heading plus a bulleted list
/// of entity links. An empty relationship is called out, not hidden.
fn relationship_section(field: &CustomField, blocks: &mut Vec<Block>) {
    blocks.push(Block::heading(HeadingLevel::H3, esc(&field.name)));

    let refs: &[EntityRef] = match &field.parsed {
        FieldValue::ReferenceList(refs) => refs,
        FieldValue::SingleReference(entity) => std::slice::from_ref(entity),
        _ => &[],
    };

    if refs.is_empty() {
        blocks.push(Block::Paragraph {
            markup: esc(EMPTY_RELATION_WARNING),
            style: StyleId::Warn,
        });
    } else {
        let items: Vec<String> = refs
            .iter()
            .filter_map(|entity| {
                entity.label().map(|label| {
                    match entity.url.as_deref().filter(|u| !u.trim().is_empty()) {
                        Some(url) => {
                            format!(r#"<a href="{}">{}</a>"#, esc(url), esc(label))
                        }
                        None => esc(label),
                    }
                })
            })
            .collect();
        if items.is_empty() {
            blocks.push(Block::paragraph("—"));
        } else {
            blocks.push(Block::BulletList { items });
        }
    }
    blocks.push(Block::spacer(6.0));
}

/// A prose field: name as sub-heading, then whatever the field renders to.
/// Fields with no content emit no heading either.
fn text_section(field: &CustomField, lookup: &TaskLookup, blocks: &mut Vec<Block>) {
    if field.is_blank() {
        return;
    }
    blocks.push(Block::heading(HeadingLevel::H2, esc(&field.name)));
    blocks.push(Block::spacer(2.0));
    blocks.extend(render_field(field, lookup));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: Value) -> Task {
        Task::from_value(value).unwrap()
    }

    fn headings(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { markup, .. } => Some(markup.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_richtext_takes_priority_over_plain_value() {
        let task = load(json!({
            "id": "1",
            "custom_fields": [{
                "name": "AI Summary", "type": "text",
                "value": "plain words",
                "value_richtext": json!({"ops": [{"insert": "rich words\n"}]}).to_string(),
            }]
        }));
        let lookup = TaskLookup::from_task(&task);
        let blocks = render_field(task.field("AI Summary").unwrap(), &lookup);
        assert_eq!(blocks[0], Block::paragraph("rich words"));
    }

    #[test]
    fn test_malformed_richtext_falls_back_to_plain() {
        let task = load(json!({
            "id": "1",
            "custom_fields": [{
                "name": "AI Summary", "type": "text",
                "value": "see https://example.com",
                "value_richtext": "{definitely not json",
            }]
        }));
        let lookup = TaskLookup::from_task(&task);
        let blocks = render_field(task.field("AI Summary").unwrap(), &lookup);
        assert_eq!(
            blocks,
            vec![Block::paragraph(
                r#"see <a href="https://example.com">https://example.com</a>"#
            )]
        );
    }

    #[test]
    fn test_reference_list_renders_buttons_with_spacers() {
        let task = load(json!({
            "id": "1",
            "custom_fields": [{
                "name": "People", "type": "users",
                "value": [
                    {"id": 7, "name": "Ada", "url": "https://example.com/u/7"},
                    {"id": 8, "name": "Grace"},
                    {"id": 9},
                ],
            }]
        }));
        let lookup = TaskLookup::from_task(&task);
        let blocks = render_field(task.field("People").unwrap(), &lookup);
        assert_eq!(
            blocks,
            vec![
                Block::Button {
                    label: "Ada".to_string(),
                    url: "https://example.com/u/7".to_string()
                },
                Block::spacer(4.0),
                Block::paragraph("Grace"),
                Block::spacer(4.0),
                // entity 9 has an id, so it is still labelled
                Block::paragraph("9"),
                Block::spacer(4.0),
            ]
        );
    }

    #[test]
    fn test_stringify_fallback() {
        let task = load(json!({
            "id": "1",
            "custom_fields": [{"name": "Score", "type": "number", "value": 42}]
        }));
        let lookup = TaskLookup::from_task(&task);
        let blocks = render_field(task.field("Score").unwrap(), &lookup);
        assert_eq!(blocks, vec![Block::paragraph("42")]);
    }

    #[test]
    fn test_blank_field_emits_no_heading() {
        let task = load(json!({
            "id": "1",
            "name": "T",
            "custom_fields": [
                {"name": "Ghost Notes", "type": "text", "value": []},
            ]
        }));
        let blocks = assemble(&task);
        assert!(!headings(&blocks).contains(&"Ghost Notes"));
    }

    #[test]
    fn test_empty_relationship_warns_instead_of_vanishing() {
        let task = load(json!({
            "id": "1",
            "name": "T",
            "custom_fields": [
                {"name": "Work Navigator", "type": "tasks", "value": []},
            ]
        }));
        let blocks = assemble(&task);
        let pos = blocks
            .iter()
            .position(|b| matches!(b, Block::Heading { markup, .. } if markup == "Work Navigator"))
            .expect("relationship sub-heading present");
        assert_eq!(
            blocks[pos + 1],
            Block::Paragraph {
                markup: "not completed – please think about this".to_string(),
                style: StyleId::Warn,
            }
        );
    }

    #[test]
    fn test_section_order() {
        let task = load(json!({
            "id": "123",
            "custom_id": "VE-123",
            "name": "Quarterly exchange",
            "url": "https://app.clickup.com/t/123",
            "markdown_description": "# Context\nwords",
            "description": "ignored when markdown is present",
            "custom_fields": [
                {"name": "Extra Thoughts", "type": "text", "value": "tail section"},
                {"name": "AI Recording URL", "type": "url",
                 "value": "https://example.com/rec"},
                {"name": "Owner of this VE", "type": "users",
                 "value": [{"id": 7, "name": "Ada", "url": "https://example.com/u/7"}]},
                {"name": "AI Summary", "type": "text", "value": "headline"},
            ]
        }));
        let blocks = assemble(&task);
        assert_eq!(
            headings(&blocks),
            vec![
                "Quarterly exchange",
                "Description",
                "Context",
                "Verbatim recording",
                "Related",
                "Owner of this VE",
                "AI Summary",
                "Extra Thoughts",
            ]
        );
        // The markdown description was used; the plain one was not.
        assert!(blocks
            .iter()
            .all(|b| !matches!(b, Block::Paragraph { markup, .. } if markup.contains("ignored"))));
        // Owner appears in the meta line too.
        assert!(blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph { markup, style: StyleId::Meta } if markup.contains("Ada")
        )));
    }

    #[test]
    fn test_mentions_resolve_across_fields() {
        // The mention lives in one field; a bare link to the same task in
        // another field picks up the mention's label.
        let mention_payload = json!({"ops": [
            {"insert": {"task_mention":
                {"task_id": "555", "custom_id": "VE-555", "name": "Budget review"}}},
            {"insert": "\n"},
        ]})
        .to_string();
        let task = load(json!({
            "id": "1",
            "name": "T",
            "custom_fields": [
                {"name": "AI Summary", "type": "text", "value": "x",
                 "value_richtext": mention_payload},
                {"name": "Extra", "type": "text",
                 "value": "see https://app.clickup.com/t/555"},
            ]
        }));
        let blocks = assemble(&task);
        assert!(blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph { markup, .. } if markup.contains("[VE-555] Budget review")
        )));
    }
}
