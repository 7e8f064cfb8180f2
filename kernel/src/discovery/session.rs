//! Session data model.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Identity of one (session, user) pair.
///
/// Equality and ordering use the pair itself, so two distinct pairs never
/// collapse into one registry entry even when their joined rendering would
/// look the same (identifiers may contain `_`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    session_id: String,
    user_id: String,
}

impl SessionKey {
    /// Creates a key from its two identifiers.
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }

    /// The session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The composite `session_id_user_id` string.
    #[must_use]
    pub fn composite(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.session_id, self.user_id)
    }
}

impl Serialize for SessionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One observed user sandbox inside a multi-user session.
///
/// Values are immutable snapshots: a rescan that sees different stats
/// produces a new `Session` rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Session directory name.
    pub session_id: String,
    /// User directory name.
    pub user_id: String,
    /// Absolute path of `.../Sandbox/Game`.
    pub sandbox_path: PathBuf,
    /// Newest file mtime under the sandbox, or the sandbox's own mtime.
    pub last_modified: DateTime<Utc>,
    /// Number of files counted by the bounded walk.
    pub file_count: u64,
    /// Total bytes of the counted files.
    pub total_size: u64,
}

impl Session {
    /// The registry key of this session.
    #[must_use]
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.session_id, &self.user_id)
    }

    /// Returns `true` if the change-detection stats differ from `other`.
    #[must_use]
    pub fn stats_differ(&self, other: &Session) -> bool {
        (self.last_modified, self.file_count, self.total_size)
            != (other.last_modified, other.file_count, other.total_size)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.session_id,
            self.last_modified.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// A complete scan result, ordered by key.
pub type SessionMap = BTreeMap<SessionKey, Session>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_joins_with_underscore() {
        let key = SessionKey::new("1234ABCD5678", "ABCDEF1234567890");
        assert_eq!(key.composite(), "1234ABCD5678_ABCDEF1234567890");
    }

    #[test]
    fn distinct_pairs_are_distinct_keys() {
        let a = SessionKey::new("AAAA_BBBB", "CCCCDDDD");
        let b = SessionKey::new("AAAA", "BBBB_CCCCDDDD");
        assert_ne!(a, b);

        let mut map = std::collections::BTreeSet::new();
        map.insert(a);
        map.insert(b);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn key_serializes_as_composite_string() -> anyhow::Result<()> {
        let key = SessionKey::new("1234ABCD", "5678EF90");
        assert_eq!(serde_json::to_string(&key)?, "\"1234ABCD_5678EF90\"");
        Ok(())
    }
}
