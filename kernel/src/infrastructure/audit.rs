use serde::Serialize;
use tracing::{info, info_span};

/// Domain event for audit logging.
/// Structured for JSON serialization to enable machine-readable audit trails.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// The kernel started.
    SystemStartup {
        /// Component name.
        component: String,
    },
    /// The kernel is stopping.
    SystemShutdown {
        /// Why it stopped.
        reason: String,
    },
    /// A copy request ran to completion.
    CopyExecuted {
        /// Destination directory.
        destination: String,
        /// Files copied.
        succeeded: usize,
        /// Files that failed.
        failed: usize,
    },
    /// A copy request was refused by the destination policy.
    CopyDenied {
        /// Requested destination.
        destination: String,
        /// Policy error message.
        reason: String,
    },
}

/// Logs an audit event to the dedicated audit channel as structured JSON.
/// This uses a specific `target` which can be filtered by the subscriber to redirect to a secure file.
pub fn log_audit(event: &AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    let json = serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    info!(target: "audit", audit_json = %json, "Audit event");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_audit_variants_do_not_panic() {
        log_audit(&AuditEvent::SystemStartup {
            component: "Test".into(),
        });
        log_audit(&AuditEvent::SystemShutdown {
            reason: "Testing".into(),
        });
        log_audit(&AuditEvent::CopyExecuted {
            destination: "/tmp/out".into(),
            succeeded: 3,
            failed: 1,
        });
        log_audit(&AuditEvent::CopyDenied {
            destination: "/etc".into(),
            reason: "outside allowed roots".into(),
        });
    }

    #[test]
    fn audit_event_is_tagged() -> anyhow::Result<()> {
        let json = serde_json::to_value(AuditEvent::CopyDenied {
            destination: "/etc".into(),
            reason: "denied".into(),
        })?;
        assert_eq!(json["event_type"], "copy_denied");
        assert_eq!(json["destination"], "/etc");
        Ok(())
    }
}
