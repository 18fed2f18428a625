use serde::Deserialize;

/// FormBridge runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Log directory; unset means console-only logging
    pub log_dir: Option<String>,
    /// Artificial delay of the mock OCR provider
    pub mock_delay_ms: u64,
    /// Hard limit on one recognition call
    pub recognition_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_dir: Some("logs".to_string()),
            mock_delay_ms: 1_000,
            recognition_timeout_ms: 15_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("FORMBRIDGE_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("FORMBRIDGE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("FORMBRIDGE_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("FORMBRIDGE_LOG_DIR")
                .ok()
                .or(defaults.log_dir),
            mock_delay_ms: std::env::var("FORMBRIDGE_MOCK_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mock_delay_ms),
            recognition_timeout_ms: std::env::var("FORMBRIDGE_RECOGNITION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.recognition_timeout_ms),
        }
    }
}
