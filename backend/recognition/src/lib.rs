pub mod mock;
pub mod timeout;
pub mod wire;

pub use mock::MockOcrProvider;
pub use timeout::TimeoutProvider;
pub use wire::{OcrPayload, OcrResponse};
