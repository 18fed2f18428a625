use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::error::IntakeError;

/// A patient intake record in storage shape: every structured field already
/// re-serialized to text, plus the provenance pair from recognition.
///
/// Mirrors the backend data model: six required identity/contact fields, the rest
/// optional, everything string-typed except `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_name: String,
    pub patient_id: String,
    pub date_of_birth: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_ocr_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Names the storage schema knows about, in display order.
const SCHEMA_FIELDS: &[&str] = &[
    "patientName",
    "patientId",
    "dateOfBirth",
    "address",
    "phoneNumber",
    "email",
    "insuranceProvider",
    "policyNumber",
    "medicalHistory",
    "medications",
    "allergies",
    "emergencyContact",
    "rawOcrText",
    "confidence",
];

impl PatientRecord {
    /// Build a record from a merge draft (flat name -> scalar value mapping).
    ///
    /// Required fields must be present and non-empty. Numeric scalars coerce to
    /// their string form (the schema is string-typed except `confidence`). Keys
    /// outside the schema are dropped with a warning — the store would reject
    /// them, and the recognition contract never produces extras.
    pub fn from_draft(draft: &Map<String, Value>) -> Result<Self, IntakeError> {
        for key in draft.keys() {
            if !SCHEMA_FIELDS.contains(&key.as_str()) {
                warn!(field = %key, "dropping draft field not present in the storage schema");
            }
        }

        Ok(Self {
            patient_name: required_text(draft, "patientName")?,
            patient_id: required_text(draft, "patientId")?,
            date_of_birth: required_text(draft, "dateOfBirth")?,
            address: required_text(draft, "address")?,
            phone_number: required_text(draft, "phoneNumber")?,
            email: required_text(draft, "email")?,
            insurance_provider: optional_text(draft, "insuranceProvider"),
            policy_number: optional_text(draft, "policyNumber"),
            medical_history: optional_text(draft, "medicalHistory"),
            medications: optional_text(draft, "medications"),
            allergies: optional_text(draft, "allergies"),
            emergency_contact: optional_text(draft, "emergencyContact"),
            raw_ocr_text: optional_text(draft, "rawOcrText"),
            confidence: draft.get("confidence").and_then(Value::as_f64),
        })
    }
}

/// Coerce one scalar draft value to its stored text form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn required_text(draft: &Map<String, Value>, name: &str) -> Result<String, IntakeError> {
    draft
        .get(name)
        .and_then(scalar_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IntakeError::InvalidRecord(format!("missing required field '{name}'")))
}

fn optional_text(draft: &Map<String, Value>, name: &str) -> Option<String> {
    draft.get(name).and_then(scalar_text).filter(|s| !s.is_empty())
}

/// A record after the store assigned identity and timestamps. Immutable once
/// created; a correction is a new record, never an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPatientRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: PatientRecord,
}

/// One entry of the scaffold todo list that ships alongside the intake flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTodoItem {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub content: String,
}
