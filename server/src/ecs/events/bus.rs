//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Event bus implementation
//!
//! Events are queued while a tick runs and delivered to every subscriber
//! when [`EventBus::process_events`] drains the queue. The queue is bounded;
//! when nobody drains it the oldest events are discarded.

use super::types::GameEvent;
use crate::ecs::components::NpcId;
use metrics::counter;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Queued events kept before the oldest are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

pub type EventHandler = Box<dyn Fn(&GameEvent) + Send + Sync>;

struct Shared {
    handlers: RwLock<Vec<EventHandler>>,
    queue: Mutex<VecDeque<GameEvent>>,
    capacity: usize,
    dropped: AtomicUsize,
}

/// Cloneable handle to a shared event queue
///
/// Every clone publishes into and delivers from the same queue.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a bus holding at most `capacity` undelivered events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                handlers: RwLock::new(Vec::new()),
                queue: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY))),
                capacity: capacity.max(1),
                dropped: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to every event
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        let mut handlers = self
            .shared
            .handlers
            .write()
            .unwrap_or_else(|e| e.into_inner());
        handlers.push(Box::new(handler));
    }

    /// Subscribe to the events of a single NPC
    pub fn subscribe_npc<F>(&self, npc: NpcId, handler: F)
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if event.npc() == npc {
                handler(event);
            }
        });
    }

    /// Queue an event for the next delivery
    pub fn publish(&self, event: GameEvent) {
        let mut queue = self.shared.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= self.shared.capacity {
            queue.pop_front();
            if self.shared.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                tracing::warn!(
                    "Event queue full at {} events, dropping the oldest",
                    self.shared.capacity
                );
            }
            counter!("events.dropped").increment(1);
        }
        queue.push_back(event);
    }

    /// Deliver all queued events, returning how many were delivered
    ///
    /// Handlers run after the queue lock is released, so a handler may
    /// publish; those events wait for the next call.
    pub fn process_events(&self) -> usize {
        let events: Vec<GameEvent> = {
            let mut queue = self.shared.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.drain(..).collect()
        };

        let handlers = self
            .shared
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner());
        for event in &events {
            for handler in handlers.iter() {
                handler(event);
            }
        }
        events.len()
    }

    pub fn queue_len(&self) -> usize {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Events discarded because the queue was full
    pub fn dropped(&self) -> usize {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Activity;

    fn activity_changed(npc: NpcId) -> GameEvent {
        GameEvent::ActivityChanged {
            npc,
            from: Activity::Working,
            to: Activity::Fleeing,
            reason: "low health retreat".into(),
        }
    }

    #[test]
    fn test_publish_then_deliver() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        bus.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(activity_changed(NpcId::new()));
        assert_eq!(bus.queue_len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(bus.process_events(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_npc_subscription_filters() {
        let bus = EventBus::new();
        let watched = NpcId::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        bus.subscribe_npc(watched, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(activity_changed(watched));
        bus.publish(activity_changed(NpcId::new()));
        bus.publish(activity_changed(watched));
        assert_eq!(bus.process_events(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let bus = EventBus::with_capacity(2);
        let first = NpcId::new();
        let last = NpcId::new();
        bus.publish(activity_changed(first));
        bus.publish(activity_changed(NpcId::new()));
        bus.publish(activity_changed(last));

        assert_eq!(bus.queue_len(), 2);
        assert_eq!(bus.dropped(), 1);

        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.npc()));
        bus.process_events();

        let delivered = delivered.lock().unwrap();
        assert!(!delivered.contains(&first));
        assert_eq!(delivered.last(), Some(&last));
    }

    #[test]
    fn test_clones_share_queue() {
        let bus = EventBus::new();
        let other = bus.clone();

        other.publish(activity_changed(NpcId::new()));
        assert_eq!(bus.queue_len(), 1);
        assert_eq!(bus.process_events(), 1);
        assert_eq!(other.queue_len(), 0);
    }
}
