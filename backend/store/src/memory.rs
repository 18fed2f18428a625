use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use formbridge_core::{
    IntakeError, PatientRecord, RecordFeed, RecordStore, StoredPatientRecord, StoredTodoItem,
    TodoItem,
};

/// In-memory record store backing the demo flow and tests.
///
/// Assigns identity/timestamps on create and drives the live feed: after every
/// change the full current set is broadcast, and a fresh observer receives the
/// current set immediately so it never waits for the next write.
pub struct InMemoryRecordStore {
    records: RwLock<Vec<StoredPatientRecord>>,
    todos: RwLock<Vec<StoredTodoItem>>,
    feed_tx: broadcast::Sender<Vec<StoredPatientRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        let (feed_tx, _) = broadcast::channel(16);
        Self {
            records: RwLock::new(Vec::new()),
            todos: RwLock::new(Vec::new()),
            feed_tx,
        }
    }

    /// Number of live feed observers.
    pub fn observer_count(&self) -> usize {
        self.feed_tx.receiver_count()
    }

    fn snapshot(&self) -> Vec<StoredPatientRecord> {
        // Most-recent-first, the order the hosted backend lists in.
        let records = self.records.read().unwrap();
        let mut out = records.clone();
        out.reverse();
        out
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, record: PatientRecord) -> Result<StoredPatientRecord, IntakeError> {
        let now = Utc::now();
        let stored = StoredPatientRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            record,
        };
        {
            let mut records = self.records.write().unwrap();
            records.push(stored.clone());
        }
        // Feed observers get the whole set, not a diff. No observers is fine.
        let _ = self.feed_tx.send(self.snapshot());
        debug!(record_id = %stored.id, "record stored");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredPatientRecord>, IntakeError> {
        Ok(self.snapshot())
    }

    async fn observe(&self) -> Result<RecordFeed, IntakeError> {
        let rx = self.feed_tx.subscribe();
        // Seed the new observer with the current set.
        let _ = self.feed_tx.send(self.snapshot());
        Ok(RecordFeed::new(rx))
    }

    async fn create_todo(&self, item: TodoItem) -> Result<StoredTodoItem, IntakeError> {
        let stored = StoredTodoItem {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            content: item.content,
        };
        let mut todos = self.todos.write().unwrap();
        todos.push(stored.clone());
        Ok(stored)
    }

    async fn list_todos(&self) -> Result<Vec<StoredTodoItem>, IntakeError> {
        Ok(self.todos.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record(name: &str) -> PatientRecord {
        let serde_json::Value::Object(draft) = json!({
            "patientName": name,
            "patientId": "12345",
            "dateOfBirth": "1980-05-15",
            "address": "123 Main St",
            "phoneNumber": "(555) 123-4567",
            "email": "jane.doe@example.com",
        }) else {
            unreachable!()
        };
        PatientRecord::from_draft(&draft).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_lists_recent_first() {
        let store = InMemoryRecordStore::new();
        let first = store.create(sample_record("Jane Doe")).await.unwrap();
        let second = store.create(sample_record("John Doe")).await.unwrap();
        assert_ne!(first.id, second.id);

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record.patient_name, "John Doe");
    }

    #[tokio::test]
    async fn test_feed_delivers_full_set_on_every_change() {
        let store = InMemoryRecordStore::new();
        store.create(sample_record("Jane Doe")).await.unwrap();

        let mut feed = store.observe().await.unwrap();
        // Seeded with the current set immediately.
        let seeded = feed.next().await.unwrap();
        assert_eq!(seeded.len(), 1);

        store.create(sample_record("John Doe")).await.unwrap();
        let updated = feed.next().await.unwrap();
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn test_dropping_feed_releases_observer() {
        let store = InMemoryRecordStore::new();
        let feed = store.observe().await.unwrap();
        assert_eq!(store.observer_count(), 1);
        feed.cancel();
        assert_eq!(store.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_todo_scaffold() {
        let store = InMemoryRecordStore::new();
        store
            .create_todo(TodoItem {
                content: "Patient Form: Jane Doe - ID: 12345".into(),
            })
            .await
            .unwrap();
        let todos = store.list_todos().await.unwrap();
        assert_eq!(todos.len(), 1);
        assert!(todos[0].content.starts_with("Patient Form:"));
    }
}
