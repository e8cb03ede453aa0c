//! Structural classification of custom field values.
//!
//! ClickUp field values arrive as untyped JSON whose shape depends on the
//! field type: strings, single related-entity objects, arrays of them, or
//! nothing at all. The shape is decided once at load time and matched
//! exhaustively afterwards.

use serde_json::Value;

use crate::task::EntityRef;

/// A custom field value, resolved to one of the shapes the renderer knows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    /// Absent, null, or an empty string.
    #[default]
    Empty,
    /// A plain string (may contain lightweight markdown or bare URLs).
    PlainText(String),
    /// An object carrying a `name` key: one person or linked task.
    SingleReference(EntityRef),
    /// An array of reference objects (possibly empty).
    ReferenceList(Vec<EntityRef>),
    /// Anything else; rendered via the stringify fallback.
    Other(Value),
}

impl FieldValue {
    /// Decide the shape of a raw value. Objects must carry a `name` key to
    /// count as references; arrays must contain only objects.
    pub fn classify(raw: Option<&Value>) -> FieldValue {
        let value = match raw {
            None | Some(Value::Null) => return FieldValue::Empty,
            Some(v) => v,
        };
        match value {
            Value::String(s) => {
                if s.is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::PlainText(s.clone())
                }
            }
            Value::Object(map) if map.contains_key("name") => {
                match serde_json::from_value::<EntityRef>(value.clone()) {
                    Ok(entity) => FieldValue::SingleReference(entity),
                    Err(_) => FieldValue::Other(value.clone()),
                }
            }
            Value::Array(items) if items.iter().all(Value::is_object) => {
                let refs = items
                    .iter()
                    .filter_map(|v| serde_json::from_value::<EntityRef>(v.clone()).ok())
                    .collect();
                FieldValue::ReferenceList(refs)
            }
            other => FieldValue::Other(other.clone()),
        }
    }

    /// True when rendering this value would produce nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::PlainText(s) => s.trim().is_empty(),
            FieldValue::ReferenceList(refs) => refs.is_empty(),
            FieldValue::SingleReference(_) | FieldValue::Other(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_plain_string() {
        let v = json!("hello");
        assert_eq!(
            FieldValue::classify(Some(&v)),
            FieldValue::PlainText("hello".to_string())
        );
    }

    #[test]
    fn test_classify_empty_forms() {
        assert_eq!(FieldValue::classify(None), FieldValue::Empty);
        assert_eq!(FieldValue::classify(Some(&Value::Null)), FieldValue::Empty);
        let empty = json!("");
        assert_eq!(FieldValue::classify(Some(&empty)), FieldValue::Empty);
    }

    #[test]
    fn test_classify_single_reference() {
        let v = json!({"id": 42, "name": "Ada", "url": "https://example.com/u/42"});
        match FieldValue::classify(Some(&v)) {
            FieldValue::SingleReference(e) => {
                assert_eq!(e.name.as_deref(), Some("Ada"));
                assert_eq!(e.id.as_deref(), Some("42"));
            }
            other => panic!("expected single reference, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_reference_list_and_blankness() {
        let v = json!([{"id": "abc", "name": "One"}, {"id": "def", "name": "Two"}]);
        match FieldValue::classify(Some(&v)) {
            FieldValue::ReferenceList(refs) => assert_eq!(refs.len(), 2),
            other => panic!("expected reference list, got {other:?}"),
        }
        let empty = json!([]);
        let classified = FieldValue::classify(Some(&empty));
        assert_eq!(classified, FieldValue::ReferenceList(vec![]));
        assert!(classified.is_blank());
    }

    #[test]
    fn test_classify_fallback_shapes() {
        let num = json!(7);
        assert!(matches!(
            FieldValue::classify(Some(&num)),
            FieldValue::Other(_)
        ));
        let mixed = json!(["a", {"name": "b"}]);
        assert!(matches!(
            FieldValue::classify(Some(&mixed)),
            FieldValue::Other(_)
        ));
    }
}
