//! Copying sandbox files into a destination project tree.
//!
//! Every copy call returns one [`CopyOperation`] per file. Per-file problems
//! are recorded, never raised; only failing to set up the destination root
//! surfaces as a [`TransferError`].

/// Copy engine.
pub mod engine;
/// Extension allow-lists for session copies.
pub mod filter;
/// Common-root inference and destination computation.
pub mod layout;
/// Destination allow-list policy.
pub mod policy;
/// Report helpers.
pub mod summary;
/// Result and error types.
pub mod types;

pub use engine::CopyEngine;
pub use filter::FileFilter;
pub use policy::{DestinationPolicy, PolicyError};
pub use summary::CopySummary;
pub use types::{CopyOperation, TransferError};
