//! Domain types for WebSocket broadcasting.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::discovery::SessionEvent;
use crate::transfer::CopySummary;

/// Unique identifier for a WebSocket client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generates a new unique client ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for one copy request, shared by its progress and completion frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CopyRequestId(Uuid);

impl CopyRequestId {
    /// Generates a new request ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CopyRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of a running copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyProgress {
    /// Request this progress belongs to.
    pub request_id: CopyRequestId,
    /// Files processed so far.
    pub completed: usize,
    /// Files in the request.
    pub total: usize,
}

/// Final report of a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyCompleted {
    /// Request that finished.
    pub request_id: CopyRequestId,
    /// Destination directory.
    pub destination: String,
    /// Aggregate result.
    pub summary: CopySummary,
}

/// Messages fanned out to every subscriber.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// A registry change.
    Session(SessionEvent),
    /// A copy made progress.
    CopyProgress(CopyProgress),
    /// A copy finished.
    CopyCompleted(CopyCompleted),
    /// The kernel is shutting down.
    Shutdown,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
enum Frame<'a> {
    CopyProgress(&'a CopyProgress),
    CopyCompleted(&'a CopyCompleted),
}

impl BroadcastMessage {
    /// Converts the message to a WebSocket frame payload.
    ///
    /// Every frame is an object with a `type` tag and, except for
    /// `shutdown`, a `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be serialized to JSON.
    pub fn to_frame_payload(&self) -> Result<String, WsError> {
        let json = match self {
            Self::Session(event) => serde_json::to_string(event),
            Self::CopyProgress(progress) => serde_json::to_string(&Frame::CopyProgress(progress)),
            Self::CopyCompleted(done) => serde_json::to_string(&Frame::CopyCompleted(done)),
            Self::Shutdown => return Ok(r#"{"type":"shutdown"}"#.to_string()),
        };
        json.map_err(WsError::Serialization)
    }
}

impl From<SessionEvent> for BroadcastMessage {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}

/// Errors raised by the WebSocket layer.
#[derive(Debug, Error)]
pub enum WsError {
    /// Transport failure.
    #[error("WebSocket connection error: {0}")]
    AxumWs(#[from] axum::Error),

    /// Frame could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// No sender remains.
    #[error("Broadcast channel closed")]
    ChannelClosed,
}
