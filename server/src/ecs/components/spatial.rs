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

//! Spatial components for positioning, steering and buildings

use super::{JobRole, NpcId};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use townsfolk_common::PositionSnapshot;

/// Where an entity is, where it is heading and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    /// Heading in radians, `atan2(dx, dz)`
    pub facing: f32,
    /// Entity being pursued, if any
    pub target: Option<NpcId>,
}

impl Motion {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            destination: None,
            facing: 0.0,
            target: None,
        }
    }

    /// Turn to face `point`; no-op when standing on it
    pub fn face(&mut self, point: Vec3) {
        let delta = point - self.position;
        if delta.x.abs() > f32::EPSILON || delta.z.abs() > f32::EPSILON {
            self.facing = delta.x.atan2(delta.z);
        }
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// Fixed points an NPC returns to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchors {
    pub home: Vec3,
    pub workplace: Vec3,
}

impl Anchors {
    pub fn new(home: Vec3, workplace: Vec3) -> Self {
        Self { home, workplace }
    }
}

/// Kinds of building in a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Tavern,
    Blacksmith,
    Farm,
    Temple,
    Market,
    Alchemist,
    GuardPost,
    House,
    RaiderCamp,
}

/// A workplace or dwelling, created before any NPC and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub kind: BuildingKind,
    pub position: Vec3,
    /// Roles that work here, assigned round-robin
    #[serde(default)]
    pub job_slots: Vec<JobRole>,
    /// Number of NPCs spawned for this building
    #[serde(default)]
    pub capacity: usize,
}

impl Building {
    pub fn new(
        name: impl Into<String>,
        kind: BuildingKind,
        position: Vec3,
        job_slots: Vec<JobRole>,
        capacity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            job_slots,
            capacity,
        }
    }

    /// Role for the `index`th NPC spawned here
    pub fn role_for_slot(&self, index: usize) -> Option<JobRole> {
        if self.job_slots.is_empty() {
            return None;
        }
        Some(self.job_slots[index % self.job_slots.len()])
    }
}

/// Nearest dwelling to `point`, if the settlement has any
pub fn nearest_house(buildings: &[Building], point: Vec3) -> Option<&Building> {
    buildings
        .iter()
        .filter(|b| b.kind == BuildingKind::House)
        .min_by(|a, b| {
            a.position
                .distance_squared(point)
                .total_cmp(&b.position.distance_squared(point))
        })
}

/// The built-in village
pub fn default_village() -> Vec<Building> {
    vec![
        Building::new(
            "The Prancing Pony",
            BuildingKind::Tavern,
            Vec3::new(0.0, 0.0, -35.0),
            vec![JobRole::Innkeeper],
            3,
        ),
        Building::new(
            "Ironsmith's Forge",
            BuildingKind::Blacksmith,
            Vec3::new(25.0, 0.0, 0.0),
            vec![JobRole::Blacksmith, JobRole::Fletcher],
            2,
        ),
        Building::new(
            "Fertile Fields",
            BuildingKind::Farm,
            Vec3::new(-30.0, 0.0, 15.0),
            vec![JobRole::Farmer],
            4,
        ),
        Building::new(
            "Sacred Temple",
            BuildingKind::Temple,
            Vec3::new(0.0, 0.0, 35.0),
            vec![JobRole::Priest],
            2,
        ),
        Building::new(
            "Town Market",
            BuildingKind::Market,
            Vec3::new(-20.0, 0.0, -20.0),
            vec![JobRole::Merchant, JobRole::Trader, JobRole::Farmer],
            5,
        ),
        Building::new(
            "Potion Emporium",
            BuildingKind::Alchemist,
            Vec3::new(15.0, 0.0, -15.0),
            vec![JobRole::Alchemist],
            1,
        ),
        Building::new(
            "Watch House",
            BuildingKind::GuardPost,
            Vec3::new(10.0, 0.0, 10.0),
            vec![JobRole::Guard],
            3,
        ),
        Building::new(
            "Woodland Edge",
            BuildingKind::Farm,
            Vec3::new(-45.0, 0.0, -40.0),
            vec![JobRole::Woodcutter, JobRole::Citizen],
            2,
        ),
        Building::new(
            "Cottage Row",
            BuildingKind::House,
            Vec3::new(-12.0, 0.0, 22.0),
            Vec::new(),
            0,
        ),
        Building::new(
            "Hillside Homes",
            BuildingKind::House,
            Vec3::new(22.0, 0.0, -28.0),
            Vec::new(),
            0,
        ),
        Building::new(
            "Raider Camp",
            BuildingKind::RaiderCamp,
            Vec3::new(85.0, 0.0, -85.0),
            vec![JobRole::Raider],
            4,
        ),
    ]
}

/// Convert to the wire representation
pub fn position_snapshot(position: Vec3) -> PositionSnapshot {
    PositionSnapshot::new(position.x, position.y, position.z)
}
