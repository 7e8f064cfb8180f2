/// Audit logging for copy and lifecycle events.
pub mod audit;
/// Configuration management for the kernel.
pub mod config;
/// HTTP server and control plane.
pub mod server;
/// Telemetry setup for structured logging.
pub mod telemetry;
