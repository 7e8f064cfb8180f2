//! Shared test utilities for integration tests.
//!
//! Builds a monitored root in a temporary directory and wires the kernel
//! services the way the binary does.

#![allow(dead_code)]

use anyhow::Result;
use harvest_kernel::discovery::{ScanLimits, SessionRegistry, SessionScanner};
use harvest_kernel::monitor::SessionMonitor;
use harvest_kernel::state::AppState;
use harvest_kernel::transfer::CopyEngine;
use harvest_kernel::ws::Broadcaster;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Session identifier used by most tests.
pub const SESSION: &str = "1234ABCD5678";
/// User identifier used by most tests.
pub const USER: &str = "ABCDEF1234567890";

/// Integration test context providing a monitored root and an output directory.
pub struct HarvestTestContext {
    /// Monitored multi-user root.
    pub root: TempDir,
    /// Copy destination parent.
    pub out: TempDir,
    /// Event fan-out shared by the monitor and the copy handlers.
    pub broadcaster: Broadcaster,
    /// Scan loop over `root`.
    pub monitor: Arc<SessionMonitor>,
}

impl HarvestTestContext {
    /// Creates a context whose monitor polls every `interval`.
    pub fn new(interval: Duration) -> Result<Self> {
        let root = TempDir::new()?;
        let out = TempDir::new()?;
        let broadcaster = Broadcaster::new();
        let monitor = Arc::new(SessionMonitor::new(
            root.path().to_path_buf(),
            SessionScanner::new(ScanLimits::default()),
            Arc::new(SessionRegistry::new()),
            broadcaster.clone(),
            interval,
        ));

        Ok(Self {
            root,
            out,
            broadcaster,
            monitor,
        })
    }

    /// Control-plane state over this context, copying into `out` by default.
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::clone(&self.monitor),
            CopyEngine::default(),
            self.broadcaster.clone(),
            Some(self.out.path().to_path_buf()),
        ))
    }

    /// Sandbox directory of one session user.
    pub fn sandbox(&self, session_id: &str, user_id: &str) -> PathBuf {
        self.root
            .path()
            .join(session_id)
            .join(user_id)
            .join("Sandbox")
            .join("Game")
    }

    /// Writes a file relative to a sandbox, creating directories.
    pub fn write(&self, session_id: &str, user_id: &str, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.sandbox(session_id, user_id).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Removes a whole session directory.
    pub fn remove_session(&self, session_id: &str) -> Result<()> {
        fs::remove_dir_all(self.root.path().join(session_id))?;
        Ok(())
    }

    /// Path inside the output directory.
    pub fn out_path(&self, relative: &str) -> PathBuf {
        self.out.path().join(relative)
    }
}

/// Returns `true` if `path` is a regular file.
pub fn is_file(path: &Path) -> bool {
    path.metadata().is_ok_and(|m| m.is_file())
}
