//! Authoritative set of live sessions.
//!
//! The scanner only ever produces fresh snapshots; the registry owns identity
//! across time. Each applied snapshot is diffed against the previous one and
//! swapped in under the same write lock, so readers see either the old or the
//! new state and never a half-applied diff.

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use super::session::{Session, SessionKey, SessionMap};

/// Lifecycle change observed between two scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A key appeared for the first time.
    #[serde(rename = "session_found")]
    Found(Session),
    /// A known key changed its mtime, file count or size.
    #[serde(rename = "session_updated")]
    Updated(Session),
    /// A known key disappeared.
    #[serde(rename = "session_removed")]
    Removed(SessionKey),
}

impl SessionEvent {
    /// Key of the session this event is about.
    #[must_use]
    pub fn key(&self) -> SessionKey {
        match self {
            Self::Found(session) | Self::Updated(session) => session.key(),
            Self::Removed(key) => key.clone(),
        }
    }

    /// Short label used for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Updated(_) => "updated",
            Self::Removed(_) => "removed",
        }
    }
}

/// Computes the events that turn `previous` into `current`.
///
/// Found and updated events come first in key order, followed by removals.
/// Sessions whose stats are unchanged produce nothing.
#[must_use]
pub fn diff_sessions(previous: &SessionMap, current: &SessionMap) -> Vec<SessionEvent> {
    let mut events = Vec::new();

    for (key, session) in current {
        match previous.get(key) {
            None => events.push(SessionEvent::Found(session.clone())),
            Some(old) if old.stats_differ(session) => {
                debug!(
                    session = %key,
                    files = %format!("{}->{}", old.file_count, session.file_count),
                    bytes = %format!("{}->{}", old.total_size, session.total_size),
                    "Session updated"
                );
                events.push(SessionEvent::Updated(session.clone()));
            }
            Some(_) => {}
        }
    }

    events.extend(
        previous
            .keys()
            .filter(|key| !current.contains_key(*key))
            .cloned()
            .map(SessionEvent::Removed),
    );

    events
}

/// Holds the current sessions and applies new scan snapshots.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<SessionMap>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held snapshot with `current` and returns the lifecycle events.
    pub fn apply_scan(&self, current: SessionMap) -> Vec<SessionEvent> {
        let mut sessions = self.sessions.write();
        let events = diff_sessions(&sessions, &current);
        *sessions = current;
        events
    }

    /// Copy of the current sessions in key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }

    /// Looks up one session by key.
    #[must_use]
    pub fn get(&self, key: &SessionKey) -> Option<Session> {
        self.sessions.read().get(key).cloned()
    }

    /// Looks up one session by its composite `session_id_user_id` string.
    ///
    /// Identifiers may contain `_`, so distinct pairs can share a composite.
    /// The first match in key order wins and the ambiguity is logged.
    #[must_use]
    pub fn find_by_composite(&self, composite: &str) -> Option<Session> {
        let sessions = self.sessions.read();
        let mut matches = sessions
            .iter()
            .filter(|(key, _)| key.composite() == composite);
        let (key, session) = matches.next()?;
        let others = matches.count();
        if others > 0 {
            warn!(
                composite,
                chosen = %key,
                others,
                "Composite key matches several sessions"
            );
        }
        Some(session.clone())
    }

    /// Number of sessions currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if no session is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn session(session_id: &str, user_id: &str, size: u64) -> Session {
        Session {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            sandbox_path: PathBuf::from(format!("/mu/{session_id}/{user_id}/Sandbox/Game")),
            last_modified: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            file_count: 1,
            total_size: size,
        }
    }

    fn map(sessions: &[Session]) -> SessionMap {
        sessions.iter().map(|s| (s.key(), s.clone())).collect()
    }

    #[test]
    fn first_scan_reports_everything_as_found() {
        let registry = SessionRegistry::new();
        let a = session("AAAAAAAA", "11111111", 10);
        let events = registry.apply_scan(map(&[a.clone()]));
        assert_eq!(events, vec![SessionEvent::Found(a)]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn diff_reports_only_removed_and_found() {
        let a = session("AAAAAAAA", "11111111", 10);
        let b = session("BBBBBBBB", "11111111", 10);
        let c = session("CCCCCCCC", "11111111", 10);

        let events = diff_sessions(&map(&[a.clone(), b.clone()]), &map(&[b, c.clone()]));
        assert_eq!(events.len(), 2);
        assert!(events.contains(&SessionEvent::Found(c)));
        assert!(events.contains(&SessionEvent::Removed(a.key())));
    }

    #[test]
    fn unchanged_rescan_is_silent() {
        let registry = SessionRegistry::new();
        let snapshot = map(&[session("AAAAAAAA", "11111111", 10)]);
        registry.apply_scan(snapshot.clone());
        assert!(registry.apply_scan(snapshot).is_empty());
    }

    #[test]
    fn changed_stats_report_update() {
        let registry = SessionRegistry::new();
        registry.apply_scan(map(&[session("AAAAAAAA", "11111111", 10)]));

        let grown = session("AAAAAAAA", "11111111", 20);
        let events = registry.apply_scan(map(&[grown.clone()]));
        assert_eq!(events, vec![SessionEvent::Updated(grown.clone())]);
        assert_eq!(registry.get(&grown.key()), Some(grown));
    }

    #[test]
    fn mtime_change_alone_reports_update() {
        let before = session("AAAAAAAA", "11111111", 10);
        let mut after = before.clone();
        after.last_modified = Utc.timestamp_opt(1_700_000_100, 0).unwrap();

        let events = diff_sessions(&map(&[before]), &map(&[after.clone()]));
        assert_eq!(events, vec![SessionEvent::Updated(after)]);
    }

    #[test]
    fn snapshot_is_detached_from_later_scans() {
        let registry = SessionRegistry::new();
        registry.apply_scan(map(&[session("AAAAAAAA", "11111111", 10)]));
        let snapshot = registry.snapshot();

        registry.apply_scan(SessionMap::new());
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn find_by_composite_matches_joined_key() {
        let registry = SessionRegistry::new();
        registry.apply_scan(map(&[session("AAAAAAAA", "11111111", 10)]));
        assert!(registry.find_by_composite("AAAAAAAA_11111111").is_some());
        assert!(registry.find_by_composite("AAAAAAAA").is_none());
    }

    #[test]
    fn ambiguous_composite_resolves_to_first_key() {
        let registry = SessionRegistry::new();
        let long_session = session("AAAAAAAA_BBBBBBBB", "CCCCCCCC", 10);
        let long_user = session("AAAAAAAA", "BBBBBBBB_CCCCCCCC", 20);
        registry.apply_scan(map(&[long_session, long_user.clone()]));

        let found = registry.find_by_composite("AAAAAAAA_BBBBBBBB_CCCCCCCC");
        assert_eq!(found, Some(long_user));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn removed_event_serializes_composite_key() -> anyhow::Result<()> {
        let event = SessionEvent::Removed(SessionKey::new("1234ABCD5678", "ABCDEF1234567890"));
        let json = serde_json::to_string(&event)?;
        assert_eq!(
            json,
            r#"{"type":"session_removed","payload":"1234ABCD5678_ABCDEF1234567890"}"#
        );
        Ok(())
    }
}
