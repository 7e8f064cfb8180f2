//! Request/Response types for the copy API.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transfer::{CopyOperation, CopySummary};
use crate::ws::CopyRequestId;

/// Request to copy an explicit list of files.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyFilesRequest {
    /// Files to copy.
    pub files: Vec<PathBuf>,
    /// Destination directory. Falls back to the configured default.
    pub destination: Option<PathBuf>,
    /// Sandbox the files came from, used as the layout root when it exists.
    pub sandbox_hint: Option<PathBuf>,
    /// Keep the directory layout below the sandbox or common root.
    #[serde(default = "default_preserve_structure")]
    pub preserve_structure: bool,
}

fn default_preserve_structure() -> bool {
    true
}

/// Result of one copy request.
#[derive(Debug, Clone, Serialize)]
pub struct CopyReport {
    /// Identifier shared with the `copy_progress` / `copy_completed` frames.
    pub request_id: CopyRequestId,
    /// Destination directory.
    pub destination: String,
    /// Aggregate counts.
    pub summary: CopySummary,
    /// Human-readable summary line.
    pub message: String,
    /// One record per attempted file.
    pub operations: Vec<CopyOperation>,
}
