use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::IntakeError;
use crate::record::{PatientRecord, StoredPatientRecord, StoredTodoItem, TodoItem};
use crate::types::{DocumentUpload, RecognitionOutcome};

/// Document recognition collaborator.
///
/// Implementations normalize every failure cause (transport, decode,
/// provider-side error, timeout) into `IntakeError::Recognition`; a raw transport
/// error must never cross this boundary. Implementations hold no per-call state —
/// the outcome, provenance included, belongs to the caller.
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Provider name for logging (e.g. "mock", "timeout").
    fn name(&self) -> &str;

    /// Extract form fields from one uploaded document.
    async fn recognize(&self, upload: &DocumentUpload) -> Result<RecognitionOutcome, IntakeError>;
}

/// Persistence collaborator for patient records and the scaffold todo list.
///
/// Injected into the session and browser rather than reached for as an ambient
/// singleton, so tests can substitute failing or canned implementations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a record, assigning identity and timestamps.
    async fn create(&self, record: PatientRecord) -> Result<StoredPatientRecord, IntakeError>;

    /// All stored records, most-recent-first as the backend returns them.
    async fn list(&self) -> Result<Vec<StoredPatientRecord>, IntakeError>;

    /// Open a live feed that delivers the full current record set on every change.
    async fn observe(&self) -> Result<RecordFeed, IntakeError>;

    async fn create_todo(&self, item: TodoItem) -> Result<StoredTodoItem, IntakeError>;

    async fn list_todos(&self) -> Result<Vec<StoredTodoItem>, IntakeError>;
}

/// Cancellable handle on a store's live record feed.
///
/// Each delivery is the complete current set, not a diff; the latest delivery is
/// authoritative. Dropping the handle releases the subscription.
pub struct RecordFeed {
    rx: broadcast::Receiver<Vec<StoredPatientRecord>>,
}

impl RecordFeed {
    pub fn new(rx: broadcast::Receiver<Vec<StoredPatientRecord>>) -> Self {
        Self { rx }
    }

    /// Wait for the next full record set. Returns `None` once the store side
    /// closes. A lagged receiver skips ahead to the newest set — older sets are
    /// superseded anyway.
    pub async fn next(&mut self) -> Option<Vec<StoredPatientRecord>> {
        loop {
            match self.rx.recv().await {
                Ok(records) => return Some(records),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "record feed lagged, skipping to latest set");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicit release, for call sites where a bare drop would read as a leak.
    pub fn cancel(self) {}
}
