//! WebSocket push of session and copy events.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod types;

pub use broadcaster::Broadcaster;
pub use types::{
    BroadcastMessage, ClientId, CopyCompleted, CopyProgress, CopyRequestId, WsError,
};
