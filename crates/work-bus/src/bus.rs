//! The bus trait and its in-memory implementation.

use crate::subscription::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Registry of live topics, shared with every [`Subscription`] so dropped
/// subscribers can retire their topic.
pub(crate) type TopicMap = Arc<Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>>;

/// Publish/subscribe transport between the coordinator and the backends.
///
/// Topics are plain strings, payloads raw bytes; the conventions that give
/// them meaning live in the crate root.
#[async_trait]
pub trait WorkBus: Send + Sync {
    /// Publish a payload to a topic.
    ///
    /// Returns the number of subscribers that received it. Zero means the
    /// payload went nowhere - legal, but worth a log line.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> usize;

    /// Open a subscription on a topic.
    ///
    /// The subscription is live from the moment this returns; payloads
    /// published afterwards are buffered until received.
    fn subscribe(&self, topic: &str) -> Subscription;
}

/// In-memory bus: one `tokio::sync::broadcast` channel per topic, created
/// on demand.
///
/// Suitable for single-process operation; a distributed deployment would
/// implement [`WorkBus`] over an external broker instead. Reply topics are
/// created by the first subscriber and removed again when the last
/// subscriber drops, so sustained load cannot grow the topic map without
/// bound.
pub struct InMemoryWorkBus {
    /// Live topics.
    topics: TopicMap,

    /// Per-subscriber buffer capacity for new topics.
    capacity: usize,

    /// Total payloads published (including dropped ones).
    published: AtomicU64,
}

impl InMemoryWorkBus {
    /// Create a bus with the default per-topic capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific per-topic capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity,
            published: AtomicU64::new(0),
        }
    }

    /// Number of topics currently held open by at least one subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Number of subscribers on one topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .ok()
            .and_then(|map| map.get(topic).map(broadcast::Sender::receiver_count))
            .unwrap_or(0)
    }

    /// Total payloads published over the lifetime of the bus.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryWorkBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkBus for InMemoryWorkBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> usize {
        // Counted whether or not anyone is listening.
        self.published.fetch_add(1, Ordering::Relaxed);

        let sender = {
            let map = self
                .topics
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            map.get(topic).cloned()
        };

        let Some(sender) = sender else {
            warn!(topic, bytes = payload.len(), "payload dropped (no topic)");
            return 0;
        };

        match sender.send(payload) {
            Ok(receivers) => {
                debug!(topic, receivers, "payload published");
                receivers
            }
            Err(_) => {
                warn!(topic, "payload dropped (no subscribers)");
                // Reap the entry if the last subscriber raced away between
                // our clone above and the send.
                if let Ok(mut map) = self.topics.lock() {
                    if map
                        .get(topic)
                        .is_some_and(|s| s.receiver_count() == 0)
                    {
                        map.remove(topic);
                    }
                }
                0
            }
        }
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        let receiver = {
            // A poisoned map only means some other holder panicked; the
            // registry itself is still coherent.
            let mut map = self
                .topics
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            map.entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };

        debug!(topic, "subscription opened");
        Subscription::new(topic.to_string(), receiver, Arc::clone(&self.topics))
    }
}
