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

//! Event type definitions

use crate::ecs::components::{Action, Activity, DecisionSource, JobRole, NpcId};
use serde::{Deserialize, Serialize};

/// All possible simulation events
///
/// Events carry the stable [`NpcId`] rather than the ECS handle so handlers
/// outside the population controller can correlate them with the spatial
/// world and remote service logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // Lifecycle
    NpcSpawned {
        npc: NpcId,
        role: JobRole,
        building: Option<String>,
    },

    // Activity
    ActivityChanged {
        npc: NpcId,
        from: Activity,
        to: Activity,
        reason: String,
    },

    // Decisions
    DecisionMade {
        npc: NpcId,
        action: Action,
        priority: i32,
        source: DecisionSource,
    },
    /// A decision below the acting priority; recorded, not applied
    DecisionConsidered {
        npc: NpcId,
        action: Action,
        priority: i32,
    },

    // Remote service
    RemoteDecisionReceived {
        npc: NpcId,
        action: Action,
        priority: i32,
    },
    RemoteDecisionFailed {
        npc: NpcId,
        error: String,
    },
}

impl GameEvent {
    /// The NPC this event concerns
    pub fn npc(&self) -> NpcId {
        match self {
            GameEvent::NpcSpawned { npc, .. }
            | GameEvent::ActivityChanged { npc, .. }
            | GameEvent::DecisionMade { npc, .. }
            | GameEvent::DecisionConsidered { npc, .. }
            | GameEvent::RemoteDecisionReceived { npc, .. }
            | GameEvent::RemoteDecisionFailed { npc, .. } => *npc,
        }
    }
}
