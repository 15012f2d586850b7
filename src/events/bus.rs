//! # Event bus for broadcasting monitor events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: publishing never
//! blocks, so a slow consumer can never stall the control loop.
//!
//! ## Architecture
//! ```text
//! Publishers:                       Consumers:
//!   loop      ──┐               ┌──► listener ──► SubscriberSet (push, bounded queues)
//!   tick      ──┼──► Bus ───────┤
//!   workers   ──┘  (ring buffer)└──► Monitor::subscribe() receivers (polling)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` calls `broadcast::Sender::send` and returns.
//! - **Bounded capacity**: one ring buffer holds the most recent `capacity` events.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip the `n` oldest items.
//! - **No persistence**: events published with no receiver are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for monitor events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_receivers_see_events_after_subscribe() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::Started));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TickSkipped));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickSkipped);
    }

    #[tokio::test]
    async fn test_lagging_receiver_skips_oldest() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(Event::new(EventKind::TickSkipped));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert!(rx.recv().await.is_ok());
    }
}
