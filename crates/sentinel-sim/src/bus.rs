//! Publish/subscribe event bus.
//!
//! Every subscriber owns a bounded queue. Publishing never blocks: a full
//! queue drops the event (and counts it), a disconnected subscriber is
//! pruned. Clones share the same subscriber list, so collaborators on
//! other threads can publish through their own handle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use sentinel_core::events::{EventEnvelope, Topic};

struct Subscriber {
    /// `None` receives every topic.
    topics: Option<HashSet<Topic>>,
    tx: Sender<EventEnvelope>,
}

#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    dropped: Arc<AtomicU64>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            dropped: Arc::new(AtomicU64::new(0)),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        // A panicked publisher cannot leave the list half-updated.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe to `topics`, or to everything when empty.
    pub fn subscribe(&self, topics: &[Topic]) -> Receiver<EventEnvelope> {
        let (tx, rx) = bounded(self.capacity);
        let topics = if topics.is_empty() {
            None
        } else {
            Some(topics.iter().copied().collect())
        };
        self.lock().push(Subscriber { topics, tx });
        rx
    }

    pub fn publish(&self, envelope: &EventEnvelope) {
        let topic = envelope.topic();
        let mut subscribers = self.lock();
        subscribers.retain(|sub| {
            if sub.topics.as_ref().is_some_and(|t| !t.contains(&topic)) {
                return true;
            }
            match sub.tx.try_send(envelope.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Events discarded because a subscriber's queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("dropped", &self.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::events::SimEvent;

    fn envelope(event: SimEvent) -> EventEnvelope {
        EventEnvelope {
            tick: 1,
            time_secs: 0.1,
            event,
        }
    }

    fn expired(id: &str) -> EventEnvelope {
        envelope(SimEvent::HazardExpired {
            hazard_id: id.to_string(),
        })
    }

    #[test]
    fn test_topic_filter() {
        let bus = EventBus::new(8);
        let hazards = bus.subscribe(&[Topic::HazardExpired]);
        let waves = bus.subscribe(&[Topic::WaveStart]);
        let all = bus.subscribe(&[]);
        bus.publish(&expired("hazard-0001"));
        assert_eq!(hazards.try_iter().count(), 1);
        assert_eq!(waves.try_iter().count(), 0);
        assert_eq!(all.try_iter().count(), 1);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let bus = EventBus::new(2);
        let rx = bus.subscribe(&[]);
        for i in 0..5 {
            bus.publish(&expired(&format!("hazard-{i}")));
        }
        assert_eq!(rx.try_iter().count(), 2);
        assert_eq!(bus.dropped(), 3);
    }

    #[test]
    fn test_disconnected_subscriber_is_pruned() {
        let bus = EventBus::new(2);
        let rx = bus.subscribe(&[]);
        drop(rx);
        bus.publish(&expired("hazard-0001"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_clone_publishes_from_another_thread() {
        let bus = EventBus::new(4);
        let rx = bus.subscribe(&[]);
        let handle = bus.clone();
        std::thread::spawn(move || handle.publish(&expired("hazard-0002")))
            .join()
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), expired("hazard-0002"));
    }
}
