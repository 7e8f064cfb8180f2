//! Configuration management for the harvest kernel.
//!
//! Settings come from built-in defaults overlaid by environment variables
//! prefixed with `HARVEST`, using `__` as the nesting separator
//! (`HARVEST__MONITOR__ROOT=/mnt/multiuser`).
//!
//! # Example
//!
//! ```
//! use harvest_kernel::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! assert_eq!(settings.monitor.max_depth, 5);
//! ```

pub mod monitor;
pub mod server;
pub mod telemetry;
pub mod transfer;

pub use monitor::MonitorSettings;
pub use server::ServerSettings;
pub use telemetry::TelemetrySettings;
pub use transfer::TransferSettings;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "HARVEST";

/// Top-level configuration for the harvest kernel.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Server settings.
    pub server: ServerSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
    /// Session monitor settings.
    #[serde(default)]
    pub monitor: MonitorSettings,
    /// Copy engine settings.
    #[serde(default)]
    pub transfer: TransferSettings,
}

impl Settings {
    /// Creates a new settings instance from environment variables and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_prefix(ENV_PREFIX)
    }

    /// Same as [`Settings::new`] with a custom environment prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 9191)?
            .set_default("telemetry.service_name", "harvest-kernel")?
            .set_default("telemetry.log_level", "info")?
            .set_default("telemetry.json", true)?
            // Merge in Environment variables
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("transfer.allowed_destinations"),
            )
            .build()?;

        s.try_deserialize()
    }
}

/// Helper for strong typing addresses
#[derive(Debug)]
pub struct BindAddress(pub String, pub u16);

impl BindAddress {
    /// Converts the bind address to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the IP address string cannot be parsed.
    pub fn to_socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip = self
            .0
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.0))?;
        Ok(std::net::SocketAddr::new(ip, self.1))
    }
}

impl From<&ServerSettings> for BindAddress {
    fn from(server: &ServerSettings) -> Self {
        Self(server.host.clone(), server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_environment() -> anyhow::Result<()> {
        let settings = Settings::with_prefix("HARVEST_TEST_UNSET")?;
        assert_eq!(settings.server.port, 9191);
        assert_eq!(settings.telemetry.log_level, "info");
        assert_eq!(settings.monitor.poll_interval_ms, 2000);
        assert_eq!(settings.monitor.max_depth, 5);
        assert_eq!(settings.monitor.max_entries_per_dir, 1000);
        assert!(settings.monitor.root.is_none());
        assert!(settings.transfer.allowed_destinations.is_empty());
        Ok(())
    }

    #[test]
    fn bind_address_parses() -> anyhow::Result<()> {
        let addr = BindAddress("127.0.0.1".into(), 9191).to_socket_addr()?;
        assert_eq!(addr.port(), 9191);
        assert!(BindAddress("not-an-ip".into(), 1).to_socket_addr().is_err());
        Ok(())
    }
}
