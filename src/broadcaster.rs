// Process-wide topic fan-out. One broadcast channel per topic; each
// subscriber owns its receiver queue, so a slow or dead client never blocks
// delivery to the others and per-topic publish order is preserved.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::Topic;

pub type ViewPayload = Arc<Value>;

/// Constructed once at startup and injected into the ingestion path and
/// every subscription handler. Messages published before a subscriber
/// joins are never replayed to it.
pub struct Broadcaster {
    channels: [broadcast::Sender<ViewPayload>; Topic::ALL.len()],
}

impl Broadcaster {
    /// `capacity` bounds each per-subscriber queue; a subscriber that falls
    /// further behind drops its oldest pending messages (observed as Lagged).
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| broadcast::channel(capacity).0),
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<ViewPayload> {
        self.channels[topic.index()].subscribe()
    }

    /// Deliver `view` to every current subscriber of `topic`. Returns the
    /// number of subscribers reached; zero subscribers is not an error.
    pub fn publish(&self, topic: Topic, view: Value) -> usize {
        self.channels[topic.index()]
            .send(Arc::new(view))
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels[topic.index()].receiver_count()
    }
}
