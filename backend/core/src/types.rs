use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field mapping extracted from one document, as the provider returned it.
///
/// The payload has no fixed schema, so entries stay as `serde_json::Value` and are
/// discriminated at runtime via [`ValueKind`]. `serde_json` is built with
/// `preserve_order`, so iteration follows the provider's key order — the order
/// fields are shown in.
pub type RecognitionResult = Map<String, Value>;

/// Runtime classification of one recognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// String, number, boolean, or null. Editable as a flat field.
    Scalar,
    /// Ordered sequence. Structured, even when every item is a scalar.
    List,
    /// Nested mapping. Structured.
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
            _ => ValueKind::Scalar,
        }
    }

    pub fn is_structured(self) -> bool {
        matches!(self, ValueKind::List | ValueKind::Object)
    }
}

/// One successful recognition call: extracted fields plus provenance.
///
/// Owned by the session that requested it, so provenance always matches the
/// upload it came from. The provider keeps no last-response state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOutcome {
    pub fields: RecognitionResult,
    pub raw_text: String,
    pub confidence: f64,
}

impl RecognitionOutcome {
    pub fn new(fields: RecognitionResult, raw_text: String, confidence: f64) -> Self {
        Self {
            fields,
            raw_text,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// A document handed to the recognition client.
///
/// Extension/MIME filtering is the caller's policy, not enforced here.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// A flat field the user can edit, derived from a Scalar-kind entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableField {
    pub name: String,
    pub value: Value,
}

/// A read-only List/Object entry shown as a preview and re-serialized on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPreview {
    pub name: String,
    pub value: Value,
}
