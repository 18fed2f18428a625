//! Mock OCR provider.
//!
//! Stands in for the real provider during development: waits a configurable
//! delay, then plays back a canned envelope through the same wire normalization
//! the real client would use. Real OCR integration is explicitly out of scope.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use formbridge_core::{DocumentUpload, IntakeError, RecognitionOutcome, RecognitionProvider};

use crate::wire::OcrResponse;

pub struct MockOcrProvider {
    delay: Duration,
    canned: OcrResponse,
}

impl MockOcrProvider {
    /// Provider that succeeds with the sample patient intake payload.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            canned: sample_response(),
        }
    }

    /// Provider that plays back an arbitrary envelope, for failure-path tests.
    pub fn with_response(delay: Duration, canned: OcrResponse) -> Self {
        Self { delay, canned }
    }

    /// Provider that fails with a provider-side error message.
    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self::with_response(
            delay,
            OcrResponse {
                status: 500,
                data: None,
                message: Some(message.into()),
            },
        )
    }
}

#[async_trait]
impl RecognitionProvider for MockOcrProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, upload: &DocumentUpload) -> Result<RecognitionOutcome, IntakeError> {
        info!(file = %upload.file_name, size = upload.bytes.len(), "processing document with mock OCR");
        tokio::time::sleep(self.delay).await;
        self.canned.clone().into_outcome()
    }
}

/// The canned success envelope: one filled-in patient intake form.
fn sample_response() -> OcrResponse {
    serde_json::from_value(json!({
        "status": 200,
        "data": {
            "formFields": {
                "patientName": "Jane Doe",
                "patientId": "12345",
                "dateOfBirth": "1980-05-15",
                "address": "123 Main St, Anytown, US 12345",
                "phoneNumber": "(555) 123-4567",
                "email": "jane.doe@example.com",
                "insuranceProvider": "Example Health Insurance",
                "policyNumber": "POL-987654321",
                "medicalHistory": [
                    { "condition": "Asthma", "diagnosed": "2010" },
                    { "condition": "Hypertension", "diagnosed": "2015" }
                ],
                "medications": [
                    { "name": "Albuterol", "dosage": "90mcg", "frequency": "As needed" },
                    { "name": "Lisinopril", "dosage": "10mg", "frequency": "Daily" }
                ],
                "allergies": ["Penicillin", "Peanuts"],
                "emergencyContact": {
                    "name": "John Doe",
                    "relationship": "Spouse",
                    "phoneNumber": "(555) 987-6543"
                }
            },
            "rawText": "Patient Intake Form\nName: Jane Doe\nID: 12345\nDOB: 05/15/1980\n...",
            "confidence": 0.95
        }
    }))
    .expect("sample envelope is valid")
}
