//! Telemetry configuration for the harvest kernel.

use serde::Deserialize;

/// Logging settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Service name attached to logs.
    pub service_name: String,
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON lines instead of compact text.
    #[serde(default = "default_json")]
    pub json: bool,
    /// Directory for a daily rolling log file, if any.
    pub log_dir: Option<String>,
}

fn default_json() -> bool {
    true
}
