//! OCR provider wire contract.
//!
//! `status == 200` with `formFields` present is the only success shape; every
//! other response normalizes to a single recognition failure carrying the
//! provider's message when it sent one.

use serde::{Deserialize, Serialize};

use formbridge_core::{IntakeError, RecognitionOutcome, RecognitionResult};

/// Response envelope as the OCR provider sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<OcrPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_fields: Option<RecognitionResult>,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub confidence: f64,
}

impl OcrResponse {
    /// Collapse the envelope into an outcome or one normalized failure.
    pub fn into_outcome(self) -> Result<RecognitionOutcome, IntakeError> {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "failed to process the document".to_string());

        if self.status != 200 {
            return Err(IntakeError::Recognition(message));
        }
        match self.data.and_then(|d| {
            d.form_fields
                .map(|fields| RecognitionOutcome::new(fields, d.raw_text, d.confidence))
        }) {
            Some(outcome) => Ok(outcome),
            None => Err(IntakeError::Recognition(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response: OcrResponse = serde_json::from_value(json!({
            "status": 200,
            "data": {
                "formFields": { "patientName": "Jane Doe" },
                "rawText": "Name: Jane Doe",
                "confidence": 0.95
            }
        }))
        .unwrap();
        let outcome = response.into_outcome().unwrap();
        assert_eq!(outcome.fields["patientName"], json!("Jane Doe"));
        assert_eq!(outcome.confidence, 0.95);
    }

    #[test]
    fn test_provider_error_carries_message() {
        let response = OcrResponse {
            status: 500,
            data: None,
            message: Some("upstream OCR unavailable".into()),
        };
        let err = response.into_outcome().unwrap_err();
        assert!(matches!(err, IntakeError::Recognition(ref m) if m == "upstream OCR unavailable"));
    }

    #[test]
    fn test_ok_status_without_fields_is_failure() {
        let response: OcrResponse = serde_json::from_value(json!({
            "status": 200,
            "data": { "rawText": "", "confidence": 0.0 }
        }))
        .unwrap();
        assert!(response.into_outcome().is_err());
    }

    #[test]
    fn test_missing_provenance_defaults() {
        let response: OcrResponse = serde_json::from_value(json!({
            "status": 200,
            "data": { "formFields": {} }
        }))
        .unwrap();
        let outcome = response.into_outcome().unwrap();
        assert_eq!(outcome.raw_text, "");
        assert_eq!(outcome.confidence, 0.0);
    }
}
