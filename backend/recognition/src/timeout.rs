//! Timeout boundary around any recognition provider.
//!
//! The provider has no timeout of its own, so the elapse is enforced here and
//! surfaced as an ordinary recognition failure.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use formbridge_core::{DocumentUpload, IntakeError, RecognitionOutcome, RecognitionProvider};

pub struct TimeoutProvider<P> {
    inner: P,
    limit: Duration,
}

impl<P: RecognitionProvider> TimeoutProvider<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<P: RecognitionProvider> RecognitionProvider for TimeoutProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn recognize(&self, upload: &DocumentUpload) -> Result<RecognitionOutcome, IntakeError> {
        match tokio::time::timeout(self.limit, self.inner.recognize(upload)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = self.inner.name(),
                    limit_ms = self.limit.as_millis() as u64,
                    "recognition timed out"
                );
                Err(IntakeError::Recognition(format!(
                    "recognition timed out after {}ms",
                    self.limit.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOcrProvider;

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let provider = TimeoutProvider::new(
            MockOcrProvider::new(Duration::from_secs(10)),
            Duration::from_secs(1),
        );
        let upload = DocumentUpload::new("intake.pdf", vec![]);
        let err = provider.recognize(&upload).await.unwrap_err();
        assert!(matches!(err, IntakeError::Recognition(ref m) if m.contains("timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_provider_passes_through() {
        let provider = TimeoutProvider::new(
            MockOcrProvider::new(Duration::from_millis(100)),
            Duration::from_secs(5),
        );
        let upload = DocumentUpload::new("intake.pdf", vec![]);
        assert!(provider.recognize(&upload).await.is_ok());
    }
}
