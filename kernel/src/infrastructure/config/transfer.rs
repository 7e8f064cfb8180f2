//! Copy engine configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Settings for copy requests.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TransferSettings {
    /// Destination used when a request names none.
    pub default_destination: Option<PathBuf>,
    /// Roots copies may write into. Empty allows any destination.
    #[serde(default)]
    pub allowed_destinations: Vec<String>,
}
