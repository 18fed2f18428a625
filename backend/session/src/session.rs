use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use formbridge_core::{
    DocumentUpload, EditableField, IntakeError, PatientRecord, RecognitionOutcome,
    RecognitionProvider, RecordStore, StoredPatientRecord, StructuredPreview, TodoItem,
};
use formbridge_logging::redact_phi;
use formbridge_reconcile::{merge, split, FieldSplit};

/// Where one upload-to-submit lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No file chosen yet.
    Idle,
    /// Recognition call outstanding; no editable fields exist yet.
    Loading,
    /// Fields split and editable; submit is legal.
    Ready,
    /// Recognition failed; only exit is selecting a new file.
    RecognitionFailed,
    /// Persistence write outstanding.
    Submitting,
    /// Record stored; all local state cleared. A new file starts over.
    Submitted,
    /// Persistence write failed; fields retained so the user can retry.
    SubmitFailed,
}

struct SessionInner {
    state: SessionState,
    /// Bumped on every file selection; a resolved recognition call whose
    /// generation no longer matches is stale and its outcome is discarded.
    generation: u64,
    fields: FieldSplit,
    /// Provenance for the current upload, owned here so it can never belong to
    /// a different session's document.
    outcome: Option<RecognitionOutcome>,
    error: Option<String>,
}

/// One in-flight document's edit state, mediating between the recognition
/// provider, the field reconciler, and the record store.
///
/// Clone-shareable; collaborators are injected so tests can substitute them.
/// At most one recognition call and one submit are honored at a time — a newer
/// file selection wins over an unresolved older one.
#[derive(Clone)]
pub struct FormSession {
    inner: Arc<Mutex<SessionInner>>,
    provider: Arc<dyn RecognitionProvider>,
    store: Arc<dyn RecordStore>,
}

impl FormSession {
    pub fn new(provider: Arc<dyn RecognitionProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                generation: 0,
                fields: FieldSplit::default(),
                outcome: None,
                error: None,
            })),
            provider,
            store,
        }
    }

    /// Run recognition for a newly selected file.
    ///
    /// Legal in every state except `Submitting`. The resulting success or
    /// failure lands in the session state, not the return value; `Err` here
    /// means the selection itself was rejected. If a newer selection arrives
    /// while this one is outstanding, this one's result is discarded on resume.
    pub async fn select_file(&self, upload: DocumentUpload) -> Result<(), IntakeError> {
        let generation = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == SessionState::Submitting {
                return Err(IntakeError::InvalidState(
                    "cannot select a file while a submit is in flight".into(),
                ));
            }
            inner.generation += 1;
            inner.state = SessionState::Loading;
            inner.fields = FieldSplit::default();
            inner.outcome = None;
            inner.error = None;
            inner.generation
        };

        let result = self.provider.recognize(&upload).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            debug!(
                file = %upload.file_name,
                generation,
                "discarding stale recognition result, a newer file was selected"
            );
            return Ok(());
        }

        match result {
            Ok(outcome) => {
                info!(
                    file = %upload.file_name,
                    confidence = outcome.confidence,
                    fields = outcome.fields.len(),
                    "recognition complete"
                );
                debug!(raw_text = %redact_phi(&outcome.raw_text), "recognized raw text");
                inner.fields = split(&outcome.fields);
                inner.outcome = Some(outcome);
                inner.state = SessionState::Ready;
            }
            Err(err) => {
                warn!(file = %upload.file_name, error = %err, "recognition failed");
                inner.error = Some(match err {
                    IntakeError::Recognition(message) => message,
                    other => other.to_string(),
                });
                inner.state = SessionState::RecognitionFailed;
            }
        }
        Ok(())
    }

    /// Overwrite one editable field with the user's value. Pure local mutation;
    /// legal only while fields exist (`Ready` or `SubmitFailed`).
    pub fn edit_field(&self, name: &str, value: Value) -> Result<(), IntakeError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            SessionState::Ready | SessionState::SubmitFailed => {}
            state => {
                return Err(IntakeError::InvalidState(format!(
                    "cannot edit fields in state {state:?}"
                )))
            }
        }
        match inner.fields.editable.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value;
                Ok(())
            }
            None => Err(IntakeError::InvalidState(format!(
                "no editable field named '{name}'"
            ))),
        }
    }

    /// Merge the edited fields with the re-serialized structured fields and
    /// hand the record to the store.
    ///
    /// On success the session terminates in `Submitted` with all local state
    /// cleared. On failure it holds in `SubmitFailed` with the fields intact so
    /// a retry needs no re-upload. At most one submit is in flight at a time.
    pub async fn submit(&self) -> Result<StoredPatientRecord, IntakeError> {
        let draft = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                SessionState::Ready | SessionState::SubmitFailed => {}
                SessionState::Submitting => {
                    return Err(IntakeError::InvalidState("submit already in flight".into()))
                }
                state => {
                    return Err(IntakeError::InvalidState(format!(
                        "nothing to submit in state {state:?}"
                    )))
                }
            }

            let mut draft = merge(&inner.fields.editable, &inner.fields.structured);
            if let Some(outcome) = &inner.outcome {
                draft.insert("rawOcrText".into(), Value::String(outcome.raw_text.clone()));
                if let Some(confidence) = serde_json::Number::from_f64(outcome.confidence) {
                    draft.insert("confidence".into(), Value::Number(confidence));
                }
            }
            inner.state = SessionState::Submitting;
            inner.error = None;
            draft
        };

        let record = match PatientRecord::from_draft(&draft) {
            Ok(record) => record,
            Err(err) => return self.fail_submit(err),
        };

        match self.store.create(record).await {
            Ok(stored) => {
                info!(record_id = %stored.id, patient = %stored.record.patient_id, "record submitted");
                // Scaffold todo reference. Its failure is not the submit's:
                // the record is already stored, and a retry would duplicate it.
                let todo = TodoItem {
                    content: format!(
                        "Patient Form: {} - ID: {}",
                        stored.record.patient_name, stored.record.patient_id
                    ),
                };
                if let Err(err) = self.store.create_todo(todo).await {
                    warn!(error = %err, "failed to create todo reference for submitted record");
                }

                let mut inner = self.inner.lock().unwrap();
                inner.state = SessionState::Submitted;
                inner.fields = FieldSplit::default();
                inner.outcome = None;
                inner.error = None;
                Ok(stored)
            }
            Err(err) => self.fail_submit(err),
        }
    }

    fn fail_submit(&self, err: IntakeError) -> Result<StoredPatientRecord, IntakeError> {
        warn!(error = %err, "submit failed, fields retained for retry");
        let mut inner = self.inner.lock().unwrap();
        inner.state = SessionState::SubmitFailed;
        inner.error = Some(err.to_string());
        Err(err)
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state
    }

    pub fn fields(&self) -> Vec<EditableField> {
        self.inner.lock().unwrap().fields.editable.clone()
    }

    pub fn previews(&self) -> Vec<StructuredPreview> {
        self.inner.lock().unwrap().fields.structured.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner.lock().unwrap().error.clone()
    }

    /// Provenance of the current upload, if recognition has succeeded.
    pub fn provenance(&self) -> Option<(String, f64)> {
        let inner = self.inner.lock().unwrap();
        inner
            .outcome
            .as_ref()
            .map(|o| (o.raw_text.clone(), o.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use formbridge_core::{RecognitionResult, StoredTodoItem};
    use formbridge_recognition::MockOcrProvider;
    use formbridge_store::InMemoryRecordStore;

    fn upload(name: &str) -> DocumentUpload {
        DocumentUpload::new(name, vec![0u8; 8])
    }

    fn ready_session() -> (FormSession, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let provider = Arc::new(MockOcrProvider::new(Duration::ZERO));
        (FormSession::new(provider, store.clone()), store)
    }

    /// Provider whose result names the file it was given, after a delay.
    struct SlowEchoProvider {
        delay: Duration,
    }

    #[async_trait]
    impl RecognitionProvider for SlowEchoProvider {
        fn name(&self) -> &str {
            "slow-echo"
        }

        async fn recognize(
            &self,
            upload: &DocumentUpload,
        ) -> Result<RecognitionOutcome, IntakeError> {
            tokio::time::sleep(self.delay).await;
            let mut fields = RecognitionResult::new();
            fields.insert("patientName".into(), json!(upload.file_name.clone()));
            Ok(RecognitionOutcome::new(fields, String::new(), 0.5))
        }
    }

    /// Store whose first create rejects, after which it delegates.
    struct FlakyStore {
        inner: InMemoryRecordStore,
        failed_once: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: InMemoryRecordStore::new(),
                failed_once: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn create(&self, record: PatientRecord) -> Result<StoredPatientRecord, IntakeError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(IntakeError::Submit("store rejected the write".into()));
            }
            self.inner.create(record).await
        }

        async fn list(&self) -> Result<Vec<StoredPatientRecord>, IntakeError> {
            self.inner.list().await
        }

        async fn observe(&self) -> Result<formbridge_core::RecordFeed, IntakeError> {
            self.inner.observe().await
        }

        async fn create_todo(&self, item: TodoItem) -> Result<StoredTodoItem, IntakeError> {
            self.inner.create_todo(item).await
        }

        async fn list_todos(&self) -> Result<Vec<StoredTodoItem>, IntakeError> {
            self.inner.list_todos().await
        }
    }

    #[tokio::test]
    async fn test_recognition_splits_fields() {
        let (session, _) = ready_session();
        session.select_file(upload("intake.pdf")).await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        let fields = session.fields();
        assert!(fields
            .iter()
            .any(|f| f.name == "patientName" && f.value == json!("Jane Doe")));
        let previews = session.previews();
        assert!(previews
            .iter()
            .any(|p| p.name == "allergies" && p.value == json!(["Penicillin", "Peanuts"])));
        // Nothing scalar leaked into previews and vice versa.
        assert!(fields.iter().all(|f| previews.iter().all(|p| p.name != f.name)));
    }

    #[tokio::test]
    async fn test_edit_then_submit_wins_over_recognized_value() {
        let (session, store) = ready_session();
        session.select_file(upload("intake.pdf")).await.unwrap();
        session.edit_field("patientName", json!("Jane Smith")).unwrap();

        let stored = session.submit().await.unwrap();
        assert_eq!(stored.record.patient_name, "Jane Smith");
        assert_eq!(
            stored.record.allergies.as_deref(),
            Some("[\"Penicillin\",\"Peanuts\"]")
        );
        assert_eq!(stored.record.confidence, Some(0.95));
        assert!(stored.record.raw_ocr_text.is_some());

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        let todos = store.list_todos().await.unwrap();
        assert_eq!(todos.len(), 1);
        assert!(todos[0].content.contains("Jane Smith"));
    }

    #[tokio::test]
    async fn test_submitted_session_is_cleared() {
        let (session, _) = ready_session();
        session.select_file(upload("intake.pdf")).await.unwrap();
        session.submit().await.unwrap();

        assert_eq!(session.state(), SessionState::Submitted);
        assert!(session.fields().is_empty());
        assert!(session.previews().is_empty());
        assert!(session.error_message().is_none());
        assert!(session.provenance().is_none());
    }

    #[tokio::test]
    async fn test_provider_error_enters_recognition_failed() {
        let store = Arc::new(InMemoryRecordStore::new());
        let provider = Arc::new(MockOcrProvider::failing(Duration::ZERO, "ocr backend down"));
        let session = FormSession::new(provider, store.clone());

        session.select_file(upload("intake.pdf")).await.unwrap();
        assert_eq!(session.state(), SessionState::RecognitionFailed);
        assert_eq!(session.error_message().as_deref(), Some("ocr backend down"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_retains_fields_for_retry() {
        let store = Arc::new(FlakyStore::new());
        let provider = Arc::new(MockOcrProvider::new(Duration::ZERO));
        let session = FormSession::new(provider, store.clone());

        session.select_file(upload("intake.pdf")).await.unwrap();
        session.edit_field("patientName", json!("Jane Smith")).unwrap();

        assert!(session.submit().await.is_err());
        assert_eq!(session.state(), SessionState::SubmitFailed);
        assert!(session.error_message().unwrap().contains("store rejected"));
        assert!(session
            .fields()
            .iter()
            .any(|f| f.name == "patientName" && f.value == json!("Jane Smith")));

        // Retry without re-uploading.
        let stored = session.submit().await.unwrap();
        assert_eq!(stored.record.patient_name, "Jane Smith");
        assert_eq!(session.state(), SessionState::Submitted);
    }

    #[tokio::test]
    async fn test_edit_and_submit_rejected_before_ready() {
        let (session, _) = ready_session();
        assert!(matches!(
            session.edit_field("patientName", json!("x")),
            Err(IntakeError::InvalidState(_))
        ));
        assert!(matches!(
            session.submit().await,
            Err(IntakeError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_field_edit_rejected() {
        let (session, _) = ready_session();
        session.select_file(upload("intake.pdf")).await.unwrap();
        assert!(session.edit_field("notAField", json!("x")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_file_selection_wins() {
        let store = Arc::new(InMemoryRecordStore::new());
        let provider = Arc::new(SlowEchoProvider {
            delay: Duration::from_secs(2),
        });
        let session = FormSession::new(provider, store);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.select_file(upload("first.pdf")).await })
        };
        // Let the first call reach its suspension point.
        tokio::task::yield_now().await;
        assert_eq!(session.state(), SessionState::Loading);

        session.select_file(upload("second.pdf")).await.unwrap();
        first.await.unwrap().unwrap();

        // The older result resolved after the newer one and was discarded.
        assert_eq!(session.state(), SessionState::Ready);
        let fields = session.fields();
        assert_eq!(fields[0].value, json!("second.pdf"));
    }
}
