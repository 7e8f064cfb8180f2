//! Periodic rescanning of the monitored root.
//!
//! The monitor owns the scan loop: each cycle scans on a blocking worker,
//! swaps the result into the shared [`SessionRegistry`] and publishes the
//! resulting events to every WebSocket subscriber.

use metrics::{counter, gauge, histogram};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::discovery::{SessionEvent, SessionRegistry, SessionScanner};
use crate::ws::Broadcaster;

/// Background scanner that keeps a [`SessionRegistry`] current.
pub struct SessionMonitor {
    root: PathBuf,
    scanner: SessionScanner,
    registry: Arc<SessionRegistry>,
    broadcaster: Broadcaster,
    poll_interval: Duration,
    running: AtomicBool,
    wake: Notify,
    cycle: Mutex<()>,
}

impl SessionMonitor {
    /// Creates a monitor in the running state.
    #[must_use]
    pub fn new(
        root: PathBuf,
        scanner: SessionScanner,
        registry: Arc<SessionRegistry>,
        broadcaster: Broadcaster,
        poll_interval: Duration,
    ) -> Self {
        Self {
            root,
            scanner,
            registry,
            broadcaster,
            poll_interval,
            running: AtomicBool::new(true),
            wake: Notify::new(),
            cycle: Mutex::new(()),
        }
    }

    /// The monitored root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The registry this monitor feeds.
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Returns `true` until [`SessionMonitor::stop`] is called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs one scan cycle and returns the events it produced.
    ///
    /// Blocks on filesystem I/O. Concurrent callers are serialized so the
    /// diff of one cycle never interleaves with another.
    pub fn refresh(&self) -> Vec<SessionEvent> {
        let _cycle = self.cycle.lock();
        let started = Instant::now();

        let current = self.scanner.scan(&self.root);
        let events = self.registry.apply_scan(current);

        histogram!("harvest_scan_duration_seconds").record(started.elapsed().as_secs_f64());
        counter!("harvest_scans_total").increment(1);
        #[allow(clippy::cast_precision_loss)]
        let active = self.registry.len() as f64;
        gauge!("harvest_sessions_active").set(active);
        for event in &events {
            counter!("harvest_session_events_total", "kind" => event.kind()).increment(1);
        }

        self.broadcaster.publish_events(&events);
        events
    }

    /// Scans every poll interval until stopped.
    ///
    /// A cycle whose worker panics is logged and the loop carries on.
    pub async fn run(self: Arc<Self>) {
        info!(
            root = %self.root.display(),
            interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "Session monitor started"
        );

        while self.is_running() {
            let monitor = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || monitor.refresh()).await {
                Ok(events) if !events.is_empty() => {
                    debug!(count = events.len(), "Scan cycle produced events");
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "Scan cycle failed"),
            }

            if !self.is_running() {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = self.wake.notified() => {}
            }
        }

        info!(root = %self.root.display(), "Session monitor stopped");
    }

    /// Stops the loop after the current cycle.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }
}
