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

//! Townsfolk Common Types and Protocols
//!
//! This crate defines the wire types shared between the simulation engine and
//! an optional remote decision service:
//! - NPC state and perception snapshots sent with each decision request
//! - Decision response payloads (bare or enveloped)
//! - Health probe payload

pub mod decision;

pub use decision::{
    DECISION_PATH, DecisionPayload, DecisionRequest, DecisionResponse, EnvironmentSnapshot, GameContextSnapshot,
    HEALTH_PATH, HealthResponse, MemoryEventSnapshot, NearbyPlayerSnapshot, NeedsSnapshot,
    NpcStateSnapshot, PersonalitySnapshot, PositionSnapshot,
};
