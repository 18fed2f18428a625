//! Logging components for FormBridge: structured console/file output and PHI
//! redaction for anything derived from patient documents.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_phi;
