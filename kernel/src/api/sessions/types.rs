//! Request/Response Types for Session API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::discovery::{Session, SessionEvent};
use crate::transfer::FileFilter;
use crate::transfer::summary::format_size;

/// Session response payload.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Composite key (`<session>_<user>`), used in URLs.
    pub key: String,
    /// Session directory name.
    pub session_id: String,
    /// User directory name.
    pub user_id: String,
    /// Sandbox directory.
    pub sandbox_path: String,
    /// Newest observed modification time.
    pub last_modified: DateTime<Utc>,
    /// Files counted by the last scan.
    pub file_count: u64,
    /// Bytes counted by the last scan.
    pub total_size: u64,
    /// `total_size` formatted for display.
    pub total_size_display: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            key: session.key().to_string(),
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            sandbox_path: session.sandbox_path.display().to_string(),
            last_modified: session.last_modified,
            file_count: session.file_count,
            total_size: session.total_size,
            total_size_display: format_size(session.total_size),
        }
    }
}

/// List sessions response payload.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Live sessions in key order.
    pub sessions: Vec<SessionResponse>,
    /// Number of sessions.
    pub count: usize,
}

/// Forced refresh response payload.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// Events produced by this refresh.
    pub events: Vec<SessionEvent>,
    /// Sessions live after the refresh.
    pub session_count: usize,
}

/// Query for the file listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesQuery {
    /// Only list files modified strictly after this instant (RFC 3339).
    pub since: Option<DateTime<Utc>>,
}

/// File listing response payload.
#[derive(Debug, Clone, Serialize)]
pub struct FilesResponse {
    /// Composite key of the session.
    pub key: String,
    /// Listed files.
    pub files: Vec<String>,
    /// Sum of the listed file sizes.
    pub total_size: u64,
    /// `total_size` formatted for display.
    pub total_size_display: String,
    /// File count per extension.
    pub by_extension: BTreeMap<String, usize>,
}

/// Request to copy one session's sandbox.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopySessionRequest {
    /// Destination directory. Falls back to the configured default.
    pub destination: Option<PathBuf>,
    /// File category to copy.
    #[serde(default)]
    pub filter: FileFilter,
}
