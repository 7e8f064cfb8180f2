//! Fan-out of session and copy events to WebSocket subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::discovery::SessionEvent;
use crate::ws::types::{BroadcastMessage, WsError};

const BROADCAST_CAPACITY: usize = 256;

/// Broadcasts messages to all connected WebSocket clients.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<BroadcastMessage>,
    client_count: Arc<AtomicUsize>,
}

impl Broadcaster {
    /// Creates a new broadcaster with an empty channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            sender,
            client_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribes a new client to receive broadcast messages.
    ///
    /// # Returns
    ///
    /// A receiver for the client.
    pub fn subscribe(&self) -> BroadcastReceiver {
        self.client_count.fetch_add(1, Ordering::SeqCst);
        debug!(client_count = self.client_count(), "Client subscribed");
        BroadcastReceiver {
            inner: self.sender.subscribe(),
            client_count: Arc::clone(&self.client_count),
        }
    }

    /// Broadcasts a message to all connected clients.
    ///
    /// Returns how many receivers the message reached. With no receivers the
    /// message is dropped and `0` is returned.
    pub fn broadcast(&self, message: BroadcastMessage) -> usize {
        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(receiver_count, "Broadcast sent");
                receiver_count
            }
            Err(_) => {
                debug!("Broadcast dropped, no clients connected");
                0
            }
        }
    }

    /// Broadcasts registry changes in order.
    pub fn publish_events(&self, events: &[SessionEvent]) {
        for event in events {
            self.broadcast(BroadcastMessage::Session(event.clone()));
        }
    }

    /// Returns the number of connected clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::SeqCst)
    }

    /// Returns a reference to the broadcast sender.
    #[must_use]
    pub fn sender(&self) -> &broadcast::Sender<BroadcastMessage> {
        &self.sender
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for broadcast messages from a broadcaster.
pub struct BroadcastReceiver {
    inner: broadcast::Receiver<BroadcastMessage>,
    client_count: Arc<AtomicUsize>,
}

impl BroadcastReceiver {
    /// Receive a broadcast message.
    ///
    /// # Errors
    /// Returns `WsError::ChannelClosed` if the channel is closed. A lagging
    /// receiver skips the missed messages and keeps receiving.
    pub async fn recv(&mut self) -> Result<BroadcastMessage, WsError> {
        loop {
            match self.inner.recv().await {
                Ok(message) => return Ok(message),
                Err(broadcast::error::RecvError::Closed) => return Err(WsError::ChannelClosed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "Receiver lagged");
                }
            }
        }
    }
}

impl Drop for BroadcastReceiver {
    fn drop(&mut self) {
        self.client_count.fetch_sub(1, Ordering::SeqCst);
        debug!(
            client_count = self.client_count.load(Ordering::SeqCst),
            "Client unsubscribed"
        );
    }
}
