//! Reversible text encoding for structured fields.
//!
//! Structured values are stored as compact JSON text in a string-typed field;
//! parsing stored text back is total — anything malformed comes back as the raw
//! string so a single bad field can never break a detail view.

use serde_json::Value;
use tracing::debug;

/// Encode a structured value for storage in a flat string field.
pub fn serialize_structured(value: &Value) -> String {
    // Compact JSON; Value serialization cannot fail.
    serde_json::to_string(value).unwrap_or_default()
}

/// Stored structured text after a parse-for-display attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredText {
    /// Round-tripped back to its original shape.
    Structured(Value),
    /// Did not parse; shown verbatim instead.
    Raw(String),
}

/// Inverse of [`serialize_structured`]. Never errors: text this crate produced
/// parses back to the original value, anything else falls back to `Raw`.
pub fn parse_stored(text: &str) -> StoredText {
    match serde_json::from_str(text) {
        Ok(value) => StoredText::Structured(value),
        Err(err) => {
            debug!(%err, "stored structured text did not parse, showing raw");
            StoredText::Raw(text.to_string())
        }
    }
}
