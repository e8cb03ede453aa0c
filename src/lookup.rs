//! Cross-reference table for task mentions and task links.
//!
//! Before any field is rendered, every rich-text payload on the task is
//! scanned once. Each discovered reference is indexed under both its numeric
//! id and its human-readable custom id, so later lookups succeed with either
//! key. Names fill in, they never clobber: a mention carrying a real name
//! must not be downgraded by a later bare link.

use std::collections::HashMap;

use tracing::warn;

use crate::delta::{parse_delta, Insert};
use crate::markup::task_key_from_url;
use crate::task::{CustomField, Task};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    display_id: String,
    name: String,
}

/// Per-render lookup from task id *or* custom id to (display-id, name).
#[derive(Debug, Default)]
pub struct TaskLookup {
    entries: HashMap<String, Entry>,
}

impl TaskLookup {
    /// Build the index for one task: seed its own identity, then scan every
    /// rich-text custom field. Payloads that fail to parse are skipped.
    pub fn from_task(task: &Task) -> Self {
        let mut lookup = TaskLookup::default();
        lookup.seed_task(task);
        lookup.scan_fields(&task.custom_fields);
        lookup
    }

    /// Make the task's own identity resolvable, so self-references get the
    /// same label as everything else.
    pub fn seed_task(&mut self, task: &Task) {
        let display_id = task.custom_id.as_deref().unwrap_or(&task.id).to_string();
        let name = task.name.clone().unwrap_or_default();
        self.record(&task.id, &display_id, &name);
    }

    /// Scan rich-text payloads for task mentions and task-link texts.
    pub fn scan_fields(&mut self, fields: &[CustomField]) {
        for field in fields {
            let raw = match field.richtext() {
                Some(r) => r,
                None => continue,
            };
            let doc = match parse_delta(raw) {
                Ok(doc) => doc,
                // Non-fatal: a broken payload must not poison the index.
                Err(_) => continue,
            };
            for op in &doc.ops {
                match &op.insert {
                    Some(Insert::Mention { task_mention }) => {
                        if let Some(tid) = task_mention.task_id.as_deref() {
                            let display_id = task_mention.custom_id.as_deref().unwrap_or(tid);
                            let name = task_mention.name.as_deref().unwrap_or("");
                            self.record(tid, display_id, name);
                        }
                    }
                    Some(Insert::Text(text)) => {
                        if let Some(link) = op.attributes.link.as_deref() {
                            if let Some(key) = task_key_from_url(link) {
                                self.note_link_text(&key, text.trim());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Index a reference under both its numeric id and its display id.
    /// First writer wins per key; names only fill empty slots.
    pub fn record(&mut self, id: &str, display_id: &str, name: &str) {
        self.record_key(id, display_id, name);
        if display_id != id {
            self.record_key(display_id, display_id, name);
        }
    }

    fn record_key(&mut self, key: &str, display_id: &str, name: &str) {
        match self.entries.get_mut(key) {
            Some(entry) => {
                if entry.display_id != display_id {
                    // Known data-quality risk: ids from different namespaces
                    // can collide on one key. Keep the first mapping.
                    warn!(
                        key,
                        kept = %entry.display_id,
                        ignored = %display_id,
                        "reference key maps to more than one display id"
                    );
                    return;
                }
                if entry.name.is_empty() && !name.is_empty() {
                    entry.name = name.to_string();
                }
            }
            None => {
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        display_id: display_id.to_string(),
                        name: name.to_string(),
                    },
                );
            }
        }
    }

    /// Use visible link text as a name hint, but only when nothing better is
    /// known for the key.
    fn note_link_text(&mut self, key: &str, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.entries.get_mut(key) {
            Some(entry) if entry.name.is_empty() => entry.name = text.to_string(),
            Some(_) => {}
            None => {
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        display_id: key.to_string(),
                        name: text.to_string(),
                    },
                );
            }
        }
    }

    /// Exact lookup by either key.
    pub fn get(&self, key: &str) -> Option<(&str, &str)> {
        self.entries
            .get(key)
            .map(|e| (e.display_id.as_str(), e.name.as_str()))
    }

    /// Lookup with the unresolved fallback: the key stands in for the display
    /// id and the name stays empty.
    pub fn display(&self, key: &str) -> (String, String) {
        match self.entries.get(key) {
            Some(e) => (e.display_id.clone(), e.name.clone()),
            None => (key.to_string(), String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_with_richtext(payload: &str) -> Task {
        let raw = json!({
            "id": "900",
            "custom_id": "VE-900",
            "name": "Quarterly review",
            "custom_fields": [
                {"name": "Notes", "type": "text", "value": "x", "value_richtext": payload},
            ]
        })
        .to_string();
        Task::from_json(&raw).unwrap()
    }

    #[test]
    fn test_both_keys_resolve_identically() {
        let payload = json!({"ops": [
            {"insert": {"task_mention": {"task_id": "123", "custom_id": "ABC-1", "name": "Fix bug"}}},
            {"insert": "\n"},
        ]})
        .to_string();
        let lookup = TaskLookup::from_task(&task_with_richtext(&payload));
        assert_eq!(lookup.get("123"), Some(("ABC-1", "Fix bug")));
        assert_eq!(lookup.get("ABC-1"), Some(("ABC-1", "Fix bug")));
    }

    #[test]
    fn test_link_text_fills_but_never_clobbers() {
        let payload = json!({"ops": [
            {"insert": {"task_mention": {"task_id": "123", "custom_id": "ABC-1", "name": "Fix bug"}}},
            {"insert": "totally different words",
             "attributes": {"link": "https://app.clickup.com/t/123"}},
            {"insert": "the rollout task",
             "attributes": {"link": "https://app.clickup.com/t/9/DEF-2"}},
            {"insert": "\n"},
        ]})
        .to_string();
        let lookup = TaskLookup::from_task(&task_with_richtext(&payload));
        // Mention name survives the later link text.
        assert_eq!(lookup.get("123"), Some(("ABC-1", "Fix bug")));
        // Unknown key picks up the visible text as its name.
        assert_eq!(lookup.get("DEF-2"), Some(("DEF-2", "the rollout task")));
    }

    #[test]
    fn test_seeds_own_identity() {
        let payload = json!({"ops": [{"insert": "\n"}]}).to_string();
        let lookup = TaskLookup::from_task(&task_with_richtext(&payload));
        assert_eq!(lookup.get("900"), Some(("VE-900", "Quarterly review")));
        assert_eq!(lookup.get("VE-900"), Some(("VE-900", "Quarterly review")));
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        let lookup = TaskLookup::from_task(&task_with_richtext("{not json"));
        // Only the seeded identity is present.
        assert_eq!(lookup.get("900"), Some(("VE-900", "Quarterly review")));
        assert_eq!(lookup.get("123"), None);
    }

    #[test]
    fn test_display_fallback() {
        let lookup = TaskLookup::default();
        assert_eq!(
            lookup.display("GHOST-1"),
            ("GHOST-1".to_string(), String::new())
        );
    }
}
