//! Realtime fan-out channel
//!
//! Broadcasts change events to every subscriber currently attached to a
//! group. Delivery order per group (and hence per record kind within it)
//! equals publish order; cross-kind interleaving is unspecified. There is
//! no replay buffer — a reconnecting client must re-fetch current state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::event::ChangeEvent;

struct SubscriberEntry {
    id: u64,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

/// Per-group subscriber registry
#[derive(Default)]
pub struct RealtimeChannel {
    subscribers: DashMap<Uuid, Vec<SubscriberEntry>>,
    next_id: AtomicU64,
}

impl RealtimeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subscriber to a group. The returned subscription receives
    /// only events for that group and unregisters itself when dropped.
    pub fn subscribe(self: &Arc<Self>, group_id: Uuid) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers
            .entry(group_id)
            .or_default()
            .push(SubscriberEntry { id, tx });

        debug!(group_id = %group_id, subscriber_id = id, "Subscriber attached");

        Subscription {
            group_id,
            id,
            rx,
            channel: Arc::clone(self),
        }
    }

    /// Deliver an event to every subscriber of its group.
    ///
    /// Subscribers whose receiving end has gone away are dropped from the
    /// registry here, so a dead connection cannot leak registrations.
    pub fn publish(&self, event: ChangeEvent) {
        let Some(mut entry) = self.subscribers.get_mut(&event.group_id) else {
            return;
        };

        entry.retain(|subscriber| subscriber.tx.send(event.clone()).is_ok());
        let now_empty = entry.is_empty();
        drop(entry);

        if now_empty {
            self.subscribers
                .remove_if(&event.group_id, |_, entries| entries.is_empty());
        }
    }

    /// Number of live subscribers attached to a group
    pub fn subscriber_count(&self, group_id: Uuid) -> usize {
        self.subscribers
            .get(&group_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    fn unsubscribe(&self, group_id: Uuid, id: u64) {
        let Some(mut entry) = self.subscribers.get_mut(&group_id) else {
            return;
        };

        entry.retain(|subscriber| subscriber.id != id);
        let now_empty = entry.is_empty();
        drop(entry);

        if now_empty {
            self.subscribers
                .remove_if(&group_id, |_, entries| entries.is_empty());
        }

        debug!(group_id = %group_id, subscriber_id = id, "Subscriber detached");
    }
}

/// A live subscription to one group's event stream
pub struct Subscription {
    group_id: Uuid,
    id: u64,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
    channel: Arc<RealtimeChannel>,
}

impl Subscription {
    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    /// Wait for the next event. Returns `None` once the subscription is
    /// unregistered and the buffer drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Take the next buffered event without waiting
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.group_id, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use crate::realtime::event::EventBody;

    fn message_event(group_id: Uuid, body: &str) -> ChangeEvent {
        ChangeEvent::created(group_id, EventBody::Message(Message::system(group_id, body, None)))
    }

    #[tokio::test]
    async fn test_events_filtered_by_group() {
        let channel = Arc::new(RealtimeChannel::new());
        let group_a = Uuid::new_v4();
        let group_b = Uuid::new_v4();

        let mut sub_a = channel.subscribe(group_a);
        let mut sub_b = channel.subscribe(group_b);

        channel.publish(message_event(group_a, "for a"));

        let event = sub_a.recv().await.unwrap();
        assert_eq!(event.group_id, group_a);
        assert!(sub_b.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_delivery_preserves_publish_order() {
        let channel = Arc::new(RealtimeChannel::new());
        let group_id = Uuid::new_v4();
        let mut sub = channel.subscribe(group_id);

        for i in 0..10 {
            channel.publish(message_event(group_id, &format!("m{}", i)));
        }

        for i in 0..10 {
            match sub.recv().await.unwrap().body {
                EventBody::Message(msg) => assert_eq!(msg.body, format!("m{}", i)),
                other => panic!("unexpected event body: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_drop_releases_registration() {
        let channel = Arc::new(RealtimeChannel::new());
        let group_a = Uuid::new_v4();
        let group_b = Uuid::new_v4();

        let sub_a = channel.subscribe(group_a);
        let _sub_b = channel.subscribe(group_b);

        assert_eq!(channel.subscriber_count(group_a), 1);
        drop(sub_a);
        assert_eq!(channel.subscriber_count(group_a), 0);
        // Dropping one subscription leaves other groups untouched.
        assert_eq!(channel.subscriber_count(group_b), 1);
    }
}
