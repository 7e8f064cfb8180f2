use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::infrastructure::config::TelemetrySettings;

/// Log file name prefix used by the rolling file layer.
pub const LOG_FILE_PREFIX: &str = "harvest-kernel.log";

/// Builder for setting up structured logging.
pub struct TelemetryBuilder {
    service_name: String,
    service_version: String,
    log_level: String,
    json: bool,
    log_dir: Option<String>,
}

impl TelemetryBuilder {
    /// Creates a builder with `info` level JSON output on stdout.
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            log_level: "info".to_string(),
            json: true,
            log_dir: None,
        }
    }

    /// Creates a builder from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &TelemetrySettings, service_version: &str) -> Self {
        let builder = Self::new(settings.service_name.clone(), service_version)
            .with_log_level(settings.log_level.clone())
            .with_json(settings.json);
        match settings.log_dir {
            Some(ref dir) => builder.with_log_dir(dir.clone()),
            None => builder,
        }
    }

    /// Sets the default filter directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Chooses JSON lines (`true`) or compact text on stdout.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Also writes logs to a daily rolling file under `dir`.
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Initializes the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log directory cannot be created
    /// - A global subscriber is already installed
    pub fn init(self) -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let stdout_layer = if self.json {
            fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .boxed()
        } else {
            fmt::layer().compact().boxed()
        };

        let file_layer = match self.log_dir {
            Some(ref dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {dir}"))?;
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                Some(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(appender)
                        .boxed(),
                )
            }
            None => None,
        };

        Registry::default()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .context("Failed to init subscriber")?;

        tracing::info!(
            service = %self.service_name,
            version = %self.service_version,
            "Telemetry initialized"
        );
        Ok(())
    }
}
