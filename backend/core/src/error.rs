use thiserror::Error;

/// Top-level error type for the FormBridge intake pipeline.
///
/// Recognition and submit failures carry the human-readable message shown to the
/// user; neither halts anything beyond the operation that raised it. Malformed
/// stored structured text is not represented here at all — the record browser
/// absorbs it by falling back to the raw text.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Any recognition failure (transport, decode, provider-side, timeout),
    /// normalized into one kind. Raw transport errors never escape the client.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// Persistence write rejected or failed.
    #[error("submit failed: {0}")]
    Submit(String),

    /// Operation not legal in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// Merge draft cannot be turned into a storable record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
