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

//! World collaborators consumed by the simulation
//!
//! The population controller never owns positions or time. It reads them
//! through these traits once per tick:
//!
//! - [`WorldClock`] exposes the hour of day.
//! - [`SpatialWorld`] owns entity positions, health and factions.
//! - [`PlayerLocator`] reports where the player is.
//!
//! [`GameClock`] and [`SimulatedWorld`] are in-memory implementations used
//! by the server binary, benches and tests.

use crate::ecs::components::Faction;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only view of the time of day
pub trait WorldClock {
    /// Hour of day in `[0, 23]`
    fn current_hour(&self) -> u8;

    /// Days elapsed since the simulation started
    fn current_day(&self) -> u32 {
        0
    }
}

/// One tracked entity as seen by the spatial world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: Uuid,
    pub position: Vec3,
    pub health: f32,
    pub faction: Faction,
}

/// Owner of entity positions
pub trait SpatialWorld {
    /// Every tracked entity, excluding the player
    fn snapshot(&self) -> Vec<EntitySnapshot>;

    /// Overwrite the position of a tracked entity; unknown ids are ignored
    fn write_position(&mut self, id: Uuid, position: Vec3);

    /// Start tracking an entity
    fn spawn(&mut self, entity: EntitySnapshot);
}

/// Where the player is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub health: f32,
}

/// Locator for the human-controlled character
pub trait PlayerLocator {
    fn position(&self) -> Vec3;
    fn health(&self) -> f32;

    fn player(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position(),
            health: self.health(),
        }
    }
}

impl PlayerLocator for PlayerSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn health(&self) -> f32 {
        self.health
    }
}

/// Hour counter advanced by elapsed wall time
#[derive(Debug, Clone, PartialEq)]
pub struct GameClock {
    hour: u8,
    day: u32,
    hour_duration_ms: u64,
    accumulated_ms: u64,
}

impl GameClock {
    /// Create a clock at `start_hour` (taken modulo 24)
    pub fn new(start_hour: u8, hour_duration_ms: u64) -> Self {
        Self {
            hour: start_hour % 24,
            day: 0,
            hour_duration_ms: hour_duration_ms.max(1),
            accumulated_ms: 0,
        }
    }

    /// Advance by `elapsed_ms`, returning the number of hours that passed
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        self.accumulated_ms += elapsed_ms;
        let mut hours = 0;
        while self.accumulated_ms >= self.hour_duration_ms {
            self.accumulated_ms -= self.hour_duration_ms;
            self.hour += 1;
            if self.hour == 24 {
                self.hour = 0;
                self.day += 1;
            }
            hours += 1;
        }
        hours
    }

    pub fn set_hour(&mut self, hour: u8) {
        self.hour = hour % 24;
        self.accumulated_ms = 0;
    }
}

impl WorldClock for GameClock {
    fn current_hour(&self) -> u8 {
        self.hour
    }

    fn current_day(&self) -> u32 {
        self.day
    }
}

/// In-memory spatial world with a single player
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorld {
    entities: Vec<EntitySnapshot>,
    index: HashMap<Uuid, usize>,
    player: Option<PlayerSnapshot>,
}

impl SimulatedWorld {
    pub fn new(player_position: Vec3) -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
            player: Some(PlayerSnapshot {
                position: player_position,
                health: 100.0,
            }),
        }
    }

    pub fn entity(&self, id: Uuid) -> Option<&EntitySnapshot> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn set_health(&mut self, id: Uuid, health: f32) {
        if let Some(&i) = self.index.get(&id) {
            self.entities[i].health = health.clamp(0.0, 100.0);
        }
    }

    pub fn set_player_position(&mut self, position: Vec3) {
        let health = self.player.map(|p| p.health).unwrap_or(100.0);
        self.player = Some(PlayerSnapshot { position, health });
    }

    /// Convenience for spawning a hostile or neutral entity
    pub fn spawn_at(&mut self, position: Vec3, faction: Faction) -> Uuid {
        let id = Uuid::new_v4();
        self.spawn(EntitySnapshot {
            id,
            position,
            health: 100.0,
            faction,
        });
        id
    }
}

impl SpatialWorld for SimulatedWorld {
    fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities.clone()
    }

    fn write_position(&mut self, id: Uuid, position: Vec3) {
        if let Some(&i) = self.index.get(&id) {
            self.entities[i].position = position;
        }
    }

    fn spawn(&mut self, entity: EntitySnapshot) {
        match self.index.get(&entity.id) {
            Some(&i) => self.entities[i] = entity,
            None => {
                self.index.insert(entity.id, self.entities.len());
                self.entities.push(entity);
            }
        }
    }
}

impl PlayerLocator for SimulatedWorld {
    fn position(&self) -> Vec3 {
        self.player.map(|p| p.position).unwrap_or(Vec3::ZERO)
    }

    fn health(&self) -> f32 {
        self.player.map(|p| p.health).unwrap_or(0.0)
    }
}
