pub mod error;
pub mod record;
pub mod traits;
pub mod types;

pub use error::IntakeError;
pub use record::{PatientRecord, StoredPatientRecord, StoredTodoItem, TodoItem};
pub use traits::{RecognitionProvider, RecordFeed, RecordStore};
pub use types::{
    DocumentUpload, EditableField, RecognitionOutcome, RecognitionResult, StructuredPreview,
    ValueKind,
};
