//! ClickUp task data structures.
//!
//! This module models the slice of the ClickUp task JSON the renderer needs:
//! identity, description variants, and the ordered custom fields. Everything
//! is read-only after load.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::fields::FieldValue;

/// A fetched task. Root entity, constructed once per render.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub markdown_description: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Task {
    /// Deserialise a task and classify every custom field value.
    pub fn from_json(raw: &str) -> Result<Task, serde_json::Error> {
        let mut task: Task = serde_json::from_str(raw)?;
        task.classify_fields();
        Ok(task)
    }

    /// Same, from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Task, serde_json::Error> {
        let mut task: Task = serde_json::from_value(value)?;
        task.classify_fields();
        Ok(task)
    }

    fn classify_fields(&mut self) {
        for field in &mut self.custom_fields {
            field.parsed = FieldValue::classify(field.value.as_ref());
        }
    }

    /// Task title, with a stand-in for unnamed tasks.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => "ClickUp Task",
        }
    }

    /// Find a custom field by its display name.
    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|f| f.name == name)
    }

    pub fn created(&self) -> Option<NaiveDate> {
        self.date_created.as_deref().and_then(epoch_ms_date)
    }

    pub fn updated(&self) -> Option<NaiveDate> {
        self.date_updated.as_deref().and_then(epoch_ms_date)
    }
}

/// A named, typed value attached to a task. Immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub value_richtext: Option<String>,
    /// Shape-classified value, filled in after deserialisation.
    #[serde(skip)]
    pub parsed: FieldValue,
}

impl CustomField {
    /// True for `text` fields, the kind that carries prose sections.
    pub fn is_text(&self) -> bool {
        self.field_type == "text"
    }

    /// Serialised rich-text payload, when non-empty.
    pub fn richtext(&self) -> Option<&str> {
        self.value_richtext
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }

    /// True when this field would render nothing at all.
    pub fn is_blank(&self) -> bool {
        self.richtext().is_none() && self.parsed.is_blank()
    }
}

/// A lightweight pointer to a person or another task.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityRef {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl EntityRef {
    /// Best display label: name, then custom id, then raw id.
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.custom_id.as_deref().filter(|s| !s.trim().is_empty()))
            .or_else(|| self.id.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// People ids come back as numbers, task ids as strings. Accept both.
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(i64),
    }

    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|v| match v {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    }))
}

/// Parse one of ClickUp's epoch-millisecond timestamp strings.
pub fn epoch_ms_date(raw: &str) -> Option<NaiveDate> {
    let ms: i64 = raw.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_classifies_fields() {
        let raw = json!({
            "id": "123",
            "custom_id": "ABC-1",
            "name": "Fix bug",
            "url": "https://app.clickup.com/t/123",
            "custom_fields": [
                {"name": "Notes", "type": "text", "value": "plain words"},
                {"name": "Owner of this VE", "type": "users",
                 "value": [{"id": 7, "name": "Ada"}]},
            ]
        })
        .to_string();
        let task = Task::from_json(&raw).unwrap();
        assert_eq!(
            task.field("Notes").unwrap().parsed,
            FieldValue::PlainText("plain words".to_string())
        );
        assert!(matches!(
            task.field("Owner of this VE").unwrap().parsed,
            FieldValue::ReferenceList(_)
        ));
    }

    #[test]
    fn test_display_name_fallback() {
        let task = Task::from_json(r#"{"id": "1", "name": "  "}"#).unwrap();
        assert_eq!(task.display_name(), "ClickUp Task");
    }

    #[test]
    fn test_epoch_ms_date() {
        // 2019-09-06T14:34:10.202Z
        assert_eq!(
            epoch_ms_date("1567780450202"),
            NaiveDate::from_ymd_opt(2019, 9, 6)
        );
        assert_eq!(epoch_ms_date("not-a-number"), None);
    }

    #[test]
    fn test_entity_label_preference() {
        let e = EntityRef {
            id: Some("9".into()),
            custom_id: Some("T-9".into()),
            name: Some("".into()),
            url: None,
        };
        assert_eq!(e.label(), Some("T-9"));
    }
}
