//! Session discovery over a shared multi-user tree.
//!
//! The monitored root has the shape `root/{session_id}/{user_id}/Sandbox/Game/...`.
//! The scanner turns one pass over that tree into a [`SessionMap`] snapshot and
//! the registry diffs consecutive snapshots into lifecycle events.

/// Monitored-root resolution from project and engine locations.
pub mod resolve;
/// Session registry and lifecycle diffing.
pub mod registry;
/// Bounded scan of the monitored root.
pub mod scanner;
/// Session data model.
pub mod session;
/// Directory-name and sandbox-root predicates.
pub mod validator;

pub use registry::{SessionEvent, SessionRegistry, diff_sessions};
pub use scanner::{ScanLimits, SandboxStats, SessionScanner};
pub use session::{Session, SessionKey, SessionMap};
