use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use formbridge_core::{IntakeError, RecordFeed, RecordStore, StoredPatientRecord};

use crate::detail::RecordDetail;

/// Browsing state over the persisted record collection: a visible set, an
/// optional live feed, and an optional selection.
///
/// Once subscribed, the feed is authoritative: every delivery replaces the full
/// visible set. The feed is released on `unsubscribe` or when the browser is
/// dropped.
pub struct RecordBrowser {
    store: Arc<dyn RecordStore>,
    records: Vec<StoredPatientRecord>,
    selected: Option<Uuid>,
    feed: Option<RecordFeed>,
}

impl RecordBrowser {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            records: Vec::new(),
            selected: None,
            feed: None,
        }
    }

    /// One-shot fetch of the current record set.
    pub async fn refresh(&mut self) -> Result<(), IntakeError> {
        self.records = self.store.list().await?;
        Ok(())
    }

    /// Open the live feed. Idempotent; an existing feed is kept.
    pub async fn subscribe(&mut self) -> Result<(), IntakeError> {
        if self.feed.is_none() {
            self.feed = Some(self.store.observe().await?);
            debug!("record feed opened");
        }
        Ok(())
    }

    /// Wait for the next feed delivery and replace the visible set with it.
    /// Returns `false` when there is no feed or the store side closed it.
    pub async fn apply_next(&mut self) -> bool {
        let Some(feed) = self.feed.as_mut() else {
            return false;
        };
        match feed.next().await {
            Some(records) => {
                self.records = records;
                true
            }
            None => {
                self.feed = None;
                false
            }
        }
    }

    /// Release the live feed.
    pub fn unsubscribe(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.cancel();
            debug!("record feed released");
        }
    }

    pub fn records(&self) -> &[StoredPatientRecord] {
        &self.records
    }

    /// Select one record for detail view. Returns `false` when the id is not
    /// in the visible set.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.records.iter().any(|r| r.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Detail view of the selected record, structured fields parsed for
    /// display with raw-text fallback.
    pub fn selection_detail(&self) -> Option<RecordDetail> {
        let id = self.selected?;
        self.records
            .iter()
            .find(|r| r.id == id)
            .map(RecordDetail::from_stored)
    }
}
