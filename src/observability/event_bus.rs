//! Tokio broadcast event bus for search notifications.
//!
//! Listeners (a visualizer, the CLI batch printer, tests) subscribe here
//! rather than registering callbacks with the query service.

use crate::models::SearchEvent;
use tokio::sync::broadcast;

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Broadcast channel for [`SearchEvent`]s.
///
/// Publishing never blocks; slow subscribers lag and skip events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SearchEvent>,
}

/// Receiver that skips events its predicate rejects.
pub struct FilteredReceiver<F> {
    receiver: broadcast::Receiver<SearchEvent>,
    predicate: F,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUS_CAPACITY)
    }
}

impl EventBus {
    /// Creates a new event bus with the given buffer capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event`. Without subscribers the event is dropped.
    #[allow(clippy::cast_precision_loss)]
    pub fn publish(&self, event: SearchEvent) {
        metrics::counter!("sixdeg_event_bus_publish_total", "event_type" => event.event_type())
            .increment(1);
        metrics::gauge!("sixdeg_event_bus_receivers").set(self.sender.receiver_count() as f64);
        match self.sender.send(event) {
            Ok(_) => {
                metrics::gauge!("sixdeg_event_bus_queue_depth").set(self.sender.len() as f64);
            },
            Err(_) => {
                metrics::counter!("sixdeg_event_bus_publish_failed_total").increment(1);
            },
        }
    }

    /// Subscribes to every event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        metrics::counter!("sixdeg_event_bus_subscriptions_total").increment(1);
        self.sender.subscribe()
    }

    /// Subscribes to the events `predicate` accepts, e.g. those
    /// [`involving`](SearchEvent::involves) one person.
    #[must_use]
    pub fn subscribe_filtered<F>(&self, predicate: F) -> FilteredReceiver<F>
    where
        F: Fn(&SearchEvent) -> bool,
    {
        metrics::counter!("sixdeg_event_bus_subscriptions_total").increment(1);
        FilteredReceiver {
            receiver: self.sender.subscribe(),
            predicate,
        }
    }

    /// Subscribes to events whose [`SearchEvent::event_type`] is
    /// `event_type`.
    ///
    /// The receiver does not borrow the bus, so the bus can be handed to a
    /// query service afterwards.
    #[must_use]
    pub fn subscribe_event_type(
        &self,
        event_type: &'static str,
    ) -> FilteredReceiver<impl Fn(&SearchEvent) -> bool + use<>> {
        self.subscribe_filtered(move |event| event.event_type() == event_type)
    }
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&SearchEvent) -> bool,
{
    /// Receives the next event that matches the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`broadcast::error::RecvError::Closed`] once every sender is
    /// dropped.
    pub async fn recv(&mut self) -> Result<SearchEvent, broadcast::error::RecvError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if (self.predicate)(&event) {
                        return Ok(event);
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    metrics::counter!("sixdeg_event_bus_lagged_total").increment(skipped);
                    tracing::warn!(skipped, "Event subscriber lagged");
                },
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventMeta, NodeId, SearchRecord};
    use std::sync::Arc;

    fn completed(from: &str, to: &str) -> SearchEvent {
        let record = SearchRecord::new(
            NodeId::new(from),
            NodeId::new(to),
            vec![NodeId::new(from), NodeId::new(to)],
            vec![NodeId::new(from), NodeId::new(to)],
        );
        SearchEvent::completed(Arc::new(record), None)
    }

    #[tokio::test]
    async fn test_subscribe_filtered_skips_non_matching() {
        let bus = EventBus::new(16);
        let mut filtered = bus.subscribe_event_type("completed");

        bus.publish(SearchEvent::GraphLoaded {
            meta: EventMeta::with_timestamp("test", None, chrono::Utc::now()),
            nodes: 2,
            edges: 1,
        });
        bus.publish(completed("A", "B"));

        let event = filtered.recv().await.expect("receive event");
        assert_eq!(event.event_type(), "completed");
    }

    #[tokio::test]
    async fn test_filter_by_involved_node() {
        let bus = EventBus::default();
        let mut filtered = bus.subscribe_filtered(|event| event.involves("Carol"));

        bus.publish(completed("A", "B"));
        bus.publish(completed("Carol", "B"));

        let event = filtered.recv().await.expect("receive event");
        assert!(event.involves("Carol"));
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(0);
        assert_eq!(bus.sender.receiver_count(), 0);
        bus.publish(completed("A", "B"));
    }

    struct Owner {
        bus: EventBus,
    }

    #[tokio::test]
    async fn test_typed_subscription_outlives_moved_bus() {
        let bus = EventBus::new(4);
        let mut completions = bus.subscribe_event_type("completed");
        let owner = Owner { bus };

        owner.bus.publish(completed("A", "B"));

        let event = completions.recv().await.expect("receive event");
        assert!(event.involves("A"));
    }

    #[tokio::test]
    async fn test_closed_after_bus_dropped() {
        let bus = EventBus::new(4);
        let mut filtered = bus.subscribe_filtered(|_| true);
        drop(bus);
        assert!(filtered.recv().await.is_err());
    }
}
