//! Server configuration for the harvest kernel.

use serde::Deserialize;

/// Control-plane binding settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}
