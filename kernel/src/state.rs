//! Shared state handed to every request handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::discovery::SessionRegistry;
use crate::monitor::SessionMonitor;
use crate::transfer::CopyEngine;
use crate::ws::Broadcaster;

/// Services reachable from the control plane.
pub struct AppState {
    monitor: Arc<SessionMonitor>,
    engine: Arc<CopyEngine>,
    broadcaster: Broadcaster,
    default_destination: Option<PathBuf>,
}

impl AppState {
    /// Bundles the running services.
    #[must_use]
    pub fn new(
        monitor: Arc<SessionMonitor>,
        engine: CopyEngine,
        broadcaster: Broadcaster,
        default_destination: Option<PathBuf>,
    ) -> Self {
        Self {
            monitor,
            engine: Arc::new(engine),
            broadcaster,
            default_destination,
        }
    }

    /// The scan loop.
    #[must_use]
    pub fn monitor(&self) -> &Arc<SessionMonitor> {
        &self.monitor
    }

    /// The live session registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.monitor.registry()
    }

    /// The copy engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<CopyEngine> {
        &self.engine
    }

    /// The WebSocket fan-out.
    #[must_use]
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Destination used when a copy request names none.
    #[must_use]
    pub fn default_destination(&self) -> Option<&Path> {
        self.default_destination.as_deref()
    }
}
