//! Session monitor configuration.
//!
//! Either `root` is set, or it is resolved from `project_file` / `engine_dir`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery::ScanLimits;

/// Settings for the scan loop.
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    /// Explicit monitored root.
    pub root: Option<PathBuf>,
    /// Project descriptor file (root and content-dir resolution).
    pub project_file: Option<PathBuf>,
    /// Engine directory (root resolution).
    pub engine_dir: Option<PathBuf>,
    /// Delay between scans in milliseconds (default: 2000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Depth cap of the per-sandbox walk (default: 5)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Entries read per directory (default: 1000)
    #[serde(default = "default_max_entries")]
    pub max_entries_per_dir: usize,
}

impl MonitorSettings {
    /// Scan interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Scan limits derived from these settings.
    #[must_use]
    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            max_depth: self.max_depth,
            max_entries_per_dir: self.max_entries_per_dir,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            root: None,
            project_file: None,
            engine_dir: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_depth: default_max_depth(),
            max_entries_per_dir: default_max_entries(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_depth() -> usize {
    crate::discovery::scanner::DEFAULT_MAX_DEPTH
}

fn default_max_entries() -> usize {
    crate::discovery::scanner::DEFAULT_MAX_ENTRIES_PER_DIR
}
