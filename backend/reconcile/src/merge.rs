use serde_json::{Map, Value};

use formbridge_core::{EditableField, StructuredPreview};

use crate::stored::serialize_structured;

/// Re-merge edited flat fields with the re-serialized structured fields into a
/// flat submit draft.
///
/// The user's latest scalar values win over whatever recognition produced; each
/// structured preview contributes one string field under its original name.
/// Name collisions cannot occur when both halves came from the same `split`
/// call, which classifies each key exactly once.
pub fn merge(editable: &[EditableField], structured: &[StructuredPreview]) -> Map<String, Value> {
    let mut draft = Map::new();
    for field in editable {
        draft.insert(field.name.clone(), field.value.clone());
    }
    for preview in structured {
        let previous = draft.insert(
            preview.name.clone(),
            Value::String(serialize_structured(&preview.value)),
        );
        debug_assert!(
            previous.is_none(),
            "structured field '{}' collides with an editable field",
            preview.name
        );
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edited_value_wins() {
        let editable = vec![EditableField {
            name: "patientName".into(),
            value: json!("Jane Smith"),
        }];
        let draft = merge(&editable, &[]);
        assert_eq!(draft["patientName"], json!("Jane Smith"));
    }

    #[test]
    fn test_structured_field_serialized_under_same_name() {
        let structured = vec![StructuredPreview {
            name: "allergies".into(),
            value: json!(["Penicillin", "Peanuts"]),
        }];
        let draft = merge(&[], &structured);
        assert_eq!(draft["allergies"], json!("[\"Penicillin\",\"Peanuts\"]"));
    }

    #[test]
    fn test_merge_keeps_both_halves() {
        let editable = vec![
            EditableField {
                name: "patientName".into(),
                value: json!("Jane Doe"),
            },
            EditableField {
                name: "patientId".into(),
                value: json!("12345"),
            },
        ];
        let structured = vec![StructuredPreview {
            name: "emergencyContact".into(),
            value: json!({ "name": "John Doe" }),
        }];
        let draft = merge(&editable, &structured);
        assert_eq!(draft.len(), 3);
        assert!(draft["emergencyContact"].is_string());
    }
}
