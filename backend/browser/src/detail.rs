//! Detail view of one stored record.
//!
//! Scalar fields become labelled rows; each structured-capable field is parsed
//! back from its stored text for display. Malformed stored text renders
//! verbatim — one bad field never fails the whole view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use formbridge_core::StoredPatientRecord;
use formbridge_reconcile::{display_label, parse_stored, StoredText};

/// One labelled scalar row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// One structured field rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSection {
    pub name: String,
    pub label: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SectionBody {
    /// Parsed and formatted, one line per entry.
    Entries(Vec<String>),
    /// Stored text that did not parse, shown verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDetail {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<DetailField>,
    pub sections: Vec<DetailSection>,
}

impl RecordDetail {
    pub fn from_stored(stored: &StoredPatientRecord) -> Self {
        let r = &stored.record;
        let scalar = |name: &str, value: &str| DetailField {
            name: name.to_string(),
            label: display_label(name),
            value: value.to_string(),
        };
        let optional = |name: &str, value: &Option<String>| {
            scalar(name, value.as_deref().unwrap_or("N/A"))
        };

        let fields = vec![
            scalar("patientName", &r.patient_name),
            scalar("patientId", &r.patient_id),
            scalar("dateOfBirth", &r.date_of_birth),
            scalar("address", &r.address),
            scalar("phoneNumber", &r.phone_number),
            scalar("email", &r.email),
            optional("insuranceProvider", &r.insurance_provider),
            optional("policyNumber", &r.policy_number),
        ];

        let mut sections = Vec::new();
        let mut section = |name: &str, text: &Option<String>, format: fn(&Value) -> String| {
            if let Some(text) = text {
                sections.push(DetailSection {
                    name: name.to_string(),
                    label: display_label(name),
                    body: parse_section(text, format),
                });
            }
        };

        section("medicalHistory", &r.medical_history, format_history_entry);
        section("medications", &r.medications, format_medication_entry);
        section("allergies", &r.allergies, format_plain_entry);
        section("emergencyContact", &r.emergency_contact, format_plain_entry);

        Self {
            id: stored.id,
            created_at: stored.created_at,
            fields,
            sections,
        }
    }
}

fn parse_section(text: &str, format: fn(&Value) -> String) -> SectionBody {
    match parse_stored(text) {
        StoredText::Structured(Value::Array(items)) => {
            SectionBody::Entries(items.iter().map(format).collect())
        }
        StoredText::Structured(Value::Object(map)) => {
            // Nested mapping shown as one line per key.
            SectionBody::Entries(
                map.iter()
                    .map(|(key, value)| {
                        format!("{}: {}", display_label(key), format_plain_entry(value))
                    })
                    .collect(),
            )
        }
        StoredText::Structured(other) => SectionBody::Entries(vec![format(&other)]),
        StoredText::Raw(raw) => SectionBody::Raw(raw),
    }
}

/// "Asthma (diagnosed: 2010)" when the item has the expected shape.
fn format_history_entry(item: &Value) -> String {
    match (item.get("condition"), item.get("diagnosed")) {
        (Some(Value::String(condition)), Some(Value::String(diagnosed))) => {
            format!("{condition} (diagnosed: {diagnosed})")
        }
        _ => format_plain_entry(item),
    }
}

/// "Albuterol - 90mcg (As needed)" when the item has the expected shape.
fn format_medication_entry(item: &Value) -> String {
    match (item.get("name"), item.get("dosage"), item.get("frequency")) {
        (
            Some(Value::String(name)),
            Some(Value::String(dosage)),
            Some(Value::String(frequency)),
        ) => format!("{name} - {dosage} ({frequency})"),
        _ => format_plain_entry(item),
    }
}

/// Strings as-is, anything else as compact JSON.
fn format_plain_entry(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
