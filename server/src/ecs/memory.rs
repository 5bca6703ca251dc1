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

//! # Activity Memory
//!
//! Each NPC remembers its most recent activity changes in a fixed-capacity
//! ring buffer. When full, the oldest entry is evicted. The newest few
//! entries travel with remote decision requests.

use crate::ecs::components::Activity;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use townsfolk_common::MemoryEventSnapshot;

/// Default number of remembered activity changes
pub const DEFAULT_MEMORY_CAPACITY: usize = 20;

/// Number of entries included in a remote request
pub const SNAPSHOT_EVENTS: usize = 5;

/// A single remembered activity change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// Simulation time in milliseconds
    pub timestamp: u64,
    pub old_activity: Activity,
    pub new_activity: Activity,
    pub reason: String,
}

impl MemoryEvent {
    pub fn snapshot(&self) -> MemoryEventSnapshot {
        MemoryEventSnapshot {
            timestamp: self.timestamp,
            old_activity: self.old_activity.to_string(),
            new_activity: self.new_activity.to_string(),
            reason: self.reason.clone(),
        }
    }
}

/// Bounded history of activity changes, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMemory {
    capacity: usize,
    events: VecDeque<MemoryEvent>,
}

impl ActivityMemory {
    /// Create an empty memory; a capacity of zero is treated as one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(
        &mut self,
        timestamp: u64,
        old_activity: Activity,
        new_activity: Activity,
        reason: impl Into<String>,
    ) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(MemoryEvent {
            timestamp,
            old_activity,
            new_activity,
            reason: reason.into(),
        });
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest(&self) -> Option<&MemoryEvent> {
        self.events.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter()
    }

    /// The newest `count` events, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter().skip(self.events.len().saturating_sub(count))
    }

    pub fn recent_snapshots(&self) -> Vec<MemoryEventSnapshot> {
        self.recent(SNAPSHOT_EVENTS)
            .map(MemoryEvent::snapshot)
            .collect()
    }
}

impl Default for ActivityMemory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}
