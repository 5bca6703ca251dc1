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

//! Remote decision service wire types
//!
//! The simulation posts a [`DecisionRequest`] to `POST /npc-decision` and
//! expects either a bare [`DecisionPayload`] or the `{status, decision}`
//! envelope back. `GET /health` answers with a [`HealthResponse`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path of the decision endpoint, relative to the service base URL
pub const DECISION_PATH: &str = "/npc-decision";

/// Path of the health probe endpoint, relative to the service base URL
pub const HEALTH_PATH: &str = "/health";

/// Plain three component vector used on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PositionSnapshot {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Personality traits, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalitySnapshot {
    pub aggression: f32,
    pub caution: f32,
    pub bravery: f32,
    pub friendliness: f32,
    pub curiosity: f32,
}

/// Needs, each in `[0, 100]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsSnapshot {
    pub hunger: f32,
    pub energy: f32,
    pub social: f32,
}

/// A recent activity change remembered by the NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEventSnapshot {
    /// Simulation time in milliseconds
    pub timestamp: u64,
    pub old_activity: String,
    pub new_activity: String,
    pub reason: String,
}

/// Everything the service may want to know about the NPC itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcStateSnapshot {
    pub id: Uuid,
    /// Job role label, e.g. `GUARD`
    #[serde(rename = "type")]
    pub role: String,
    pub health: f32,
    /// Current activity label, e.g. `PATROLLING`
    #[serde(rename = "state")]
    pub activity: String,
    pub position: PositionSnapshot,
    pub personality: PersonalitySnapshot,
    pub needs: NeedsSnapshot,
    /// Most recent activity changes, oldest first
    #[serde(default)]
    pub recent_events: Vec<MemoryEventSnapshot>,
}

/// A player within awareness range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlayerSnapshot {
    pub distance: f32,
    pub health: f32,
}

/// Ambient information about where the NPC stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub location: String,
    /// One of `dark`, `dawn`, `dusk`, `bright`
    pub lighting: String,
}

/// What the NPC currently perceives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameContextSnapshot {
    pub time_of_day: u8,
    pub threat_level: u8,
    pub nearby_players: Vec<NearbyPlayerSnapshot>,
    pub nearby_enemies: usize,
    pub nearby_allies: usize,
    pub environment: EnvironmentSnapshot,
}

/// Body of `POST /npc-decision`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub state: NpcStateSnapshot,
    pub context: GameContextSnapshot,
}

/// A decision suggested by the service
///
/// `priority` and `reasoning` are optional; `action` must name a known action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPayload {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Response of `POST /npc-decision`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionResponse {
    /// `{"status": "success", "decision": {...}}`
    Envelope {
        status: String,
        decision: Option<DecisionPayload>,
    },
    /// `{"action": "...", "priority": ..., "reasoning": ...}`
    Bare(DecisionPayload),
}

impl DecisionResponse {
    /// Unwrap the payload, rejecting envelopes that did not succeed
    pub fn into_payload(self) -> Result<DecisionPayload, String> {
        match self {
            DecisionResponse::Bare(payload) => Ok(payload),
            DecisionResponse::Envelope { status, decision } => {
                if status != "success" {
                    return Err(format!("service reported status '{}'", status));
                }
                decision.ok_or_else(|| "envelope carried no decision".to_string())
            }
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub agent_ready: bool,
}

impl HealthResponse {
    /// The service is usable only when healthy and its agent is loaded
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.agent_ready
    }
}
