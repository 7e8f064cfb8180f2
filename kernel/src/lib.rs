//! Harvest Kernel - session discovery and sandbox harvesting.
//!
//! This crate watches a multi-user editing root for per-user sandboxes,
//! keeps a live registry of them, and copies their files out into
//! destination trees, either whole or as an explicit selection.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// REST endpoints over the registry and the copy engine.
pub mod api;
/// Sandbox discovery, scanning and the live session registry.
pub mod discovery;
/// Infrastructure components (config, server, telemetry).
pub mod infrastructure;
/// Background scan loop.
pub mod monitor;
/// Shared state for the control plane.
pub mod state;
/// Copy engine, layout rules and destination policy.
pub mod transfer;
/// WebSocket broadcaster for real-time updates.
pub mod ws;
