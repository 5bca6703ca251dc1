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

//! NPC-specific components

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Job role of an NPC
///
/// Drives the schedule table, the base personality profile and the faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobRole {
    Guard,
    Citizen,
    Trader,
    Raider,
    Merchant,
    Blacksmith,
    Farmer,
    Priest,
    Innkeeper,
    Woodcutter,
    Alchemist,
    Fletcher,
}

impl JobRole {
    pub const ALL: [JobRole; 12] = [
        JobRole::Guard,
        JobRole::Citizen,
        JobRole::Trader,
        JobRole::Raider,
        JobRole::Merchant,
        JobRole::Blacksmith,
        JobRole::Farmer,
        JobRole::Priest,
        JobRole::Innkeeper,
        JobRole::Woodcutter,
        JobRole::Alchemist,
        JobRole::Fletcher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobRole::Guard => "GUARD",
            JobRole::Citizen => "CITIZEN",
            JobRole::Trader => "TRADER",
            JobRole::Raider => "RAIDER",
            JobRole::Merchant => "MERCHANT",
            JobRole::Blacksmith => "BLACKSMITH",
            JobRole::Farmer => "FARMER",
            JobRole::Priest => "PRIEST",
            JobRole::Innkeeper => "INNKEEPER",
            JobRole::Woodcutter => "WOODCUTTER",
            JobRole::Alchemist => "ALCHEMIST",
            JobRole::Fletcher => "FLETCHER",
        }
    }

    /// Which side this role fights for
    pub fn faction(&self) -> Faction {
        match self {
            JobRole::Raider => Faction::Raiders,
            _ => Faction::Townsfolk,
        }
    }

    /// Roles trained to engage a high threat head on
    pub fn is_combatant(&self) -> bool {
        matches!(self, JobRole::Guard | JobRole::Raider)
    }

    /// Roles that trade with a friendly player instead of merely approaching
    pub fn is_merchant(&self) -> bool {
        matches!(self, JobRole::Trader | JobRole::Merchant)
    }
}

impl std::fmt::Display for JobRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobRole::ALL
            .iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown job role: {}", s))
    }
}

/// Allegiance of a simulated entity
///
/// Two entities of different factions treat each other as enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Townsfolk,
    Raiders,
    Wildlife,
}

/// NPC marker component - identifies an entity as a simulated townsperson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    /// Whether this NPC takes part in the update loop
    pub active: bool,
    /// Job role
    pub role: JobRole,
    /// Name of the building this NPC was spawned for
    pub building: Option<String>,
}

impl Npc {
    /// Create a new NPC marker
    pub fn new(role: JobRole) -> Self {
        Self {
            active: true,
            role,
            building: None,
        }
    }

    /// Attach the building the NPC works at
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    pub fn faction(&self) -> Faction {
        self.role.faction()
    }
}

/// Hit points of an entity, read from the spatial world every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
}

impl Health {
    pub fn new(current: f32) -> Self {
        Self {
            current: current.clamp(0.0, 100.0),
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self { current: 100.0 }
    }
}
