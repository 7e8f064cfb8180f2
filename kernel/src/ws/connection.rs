//! One subscriber's socket.
//!
//! The socket is split: the read half only watches for pings and the close
//! handshake, the write half carries broadcast frames and keepalives. A
//! `shutdown` frame is the last thing a client receives.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::ws::broadcaster::BroadcastReceiver;
use crate::ws::types::{BroadcastMessage, ClientId, WsError};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// A subscribed WebSocket client.
pub struct Connection {
    client_id: ClientId,
    socket: WebSocket,
    receiver: BroadcastReceiver,
}

impl Connection {
    /// Wraps an upgraded socket and the receiver subscribed for it.
    pub fn new(socket: WebSocket, receiver: BroadcastReceiver) -> Self {
        let client_id = ClientId::generate();
        info!(%client_id, "WebSocket client connected");
        Self {
            client_id,
            socket,
            receiver,
        }
    }

    /// Pushes broadcast frames until the client leaves or the kernel shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket fails or a frame cannot be encoded.
    pub async fn run(self) -> Result<(), WsError> {
        let Self {
            client_id,
            socket,
            mut receiver,
        } = self;
        let (mut outbound, mut inbound) = socket.split();
        let mut keepalive = interval(KEEPALIVE_INTERVAL);

        let reason = loop {
            tokio::select! {
                frame = inbound.next() => match frame {
                    None | Some(Ok(Message::Close(_))) => break "client closed",
                    Some(Ok(Message::Ping(data))) => outbound.send(Message::Pong(data)).await?,
                    Some(Ok(_)) => debug!(%client_id, "Ignoring client frame"),
                    Some(Err(e)) => {
                        warn!(%client_id, error = %e, "WebSocket read failed");
                        return Err(WsError::AxumWs(e));
                    }
                },

                message = receiver.recv() => match message {
                    Ok(message) => {
                        if forward(&mut outbound, &message).await? {
                            break "kernel shutdown";
                        }
                    }
                    Err(_) => break "broadcast channel closed",
                },

                _ = keepalive.tick() => outbound.send(Message::Ping(Bytes::new())).await?,
            }
        };

        info!(%client_id, reason, "Closing WebSocket connection");
        outbound.send(Message::Close(None)).await?;
        Ok(())
    }
}

/// Writes one broadcast frame to `sink`.
///
/// Returns `true` when the frame was the final `shutdown` frame and the
/// connection should close.
pub(crate) async fn forward<S>(sink: &mut S, message: &BroadcastMessage) -> Result<bool, WsError>
where
    S: Sink<Message> + Unpin,
    S::Error: Into<axum::BoxError>,
{
    let payload = message.to_frame_payload()?;
    sink.send(Message::Text(payload.into()))
        .await
        .map_err(|e| WsError::AxumWs(axum::Error::new(e)))?;
    Ok(matches!(message, BroadcastMessage::Shutdown))
}
