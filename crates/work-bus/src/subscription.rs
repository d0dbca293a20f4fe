//! Subscription handles for receiving payloads from the bus.

use crate::bus::TopicMap;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The topic's channel was closed (bus dropped).
    #[error("bus closed")]
    Closed,
}

/// A live subscription on one topic.
///
/// Receiving blocks on the underlying channel - there is no polling loop
/// anywhere in the transport. Dropping the handle releases the
/// subscription; when the last subscriber of a topic drops, the topic
/// itself is removed from the bus so per-hash reply topics cannot
/// accumulate.
pub struct Subscription {
    /// Topic this subscription is attached to.
    topic: String,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<Vec<u8>>,

    /// Shared topic registry (for cleanup on drop).
    topics: TopicMap,
}

impl Subscription {
    pub(crate) fn new(topic: String, receiver: broadcast::Receiver<Vec<u8>>, topics: TopicMap) -> Self {
        Self {
            topic,
            receiver,
            topics,
        }
    }

    /// Receive the next payload, waiting as long as it takes.
    ///
    /// Returns `None` when the bus has been dropped. A subscriber that
    /// fell behind the channel capacity skips the dropped payloads and
    /// keeps going.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(topic = %self.topic, lagged = count, "subscriber lagged, payloads dropped");
                }
            }
        }
    }

    /// Receive without blocking.
    ///
    /// `Ok(None)` means no payload is currently buffered.
    pub fn try_recv(&mut self) -> Result<Option<Vec<u8>>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => return Ok(Some(payload)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            }
        }
    }

    /// The topic this subscription listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut map) = self.topics.lock() else {
            return;
        };
        // This handle still counts toward receiver_count until the struct
        // is fully dropped, so "1" means we are the last subscriber.
        let last = map
            .get(&self.topic)
            .is_some_and(|sender| sender.receiver_count() <= 1);
        if last {
            map.remove(&self.topic);
            debug!(topic = %self.topic, "last subscriber gone, topic removed");
        } else {
            debug!(topic = %self.topic, "subscription dropped");
        }
    }
}
