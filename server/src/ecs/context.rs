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

//! Per-tick perception of nearby entities and threat
//!
//! [`assess_context`] scans every tracked entity once for a single observer,
//! buckets those inside the awareness radius into enemies and allies by
//! faction, checks the player separately, and derives a threat level in
//! `[0, 100]`:
//!
//! | Condition                         | Threat |
//! |-----------------------------------|--------|
//! | each enemy in range               | +20    |
//! | each enemy closer than 10         | +30    |
//! | each enemy from 10 up to 20       | +15    |
//! | own health below 30 (else < 60)   | +40 (+20) |
//! | already in combat or on alert     | +25    |

use crate::ecs::components::{Activity, Faction};
use crate::world::{EntitySnapshot, PlayerSnapshot};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use townsfolk_common::NearbyPlayerSnapshot;
use uuid::Uuid;

/// Default awareness radius in world units
pub const DEFAULT_AWARENESS_RADIUS: f32 = 30.0;

/// Maximum threat level
pub const MAX_THREAT: u8 = 100;

/// Something perceived within the awareness radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyEntity {
    /// `None` for the player
    pub id: Option<Uuid>,
    pub position: Vec3,
    pub distance: f32,
    pub health: f32,
}

/// Everything an NPC perceived on its latest scan
///
/// Each list is sorted nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextAwareness {
    pub enemies: Vec<NearbyEntity>,
    pub allies: Vec<NearbyEntity>,
    pub players: Vec<NearbyEntity>,
    pub threat_level: u8,
}

impl ContextAwareness {
    pub fn nearest_enemy(&self) -> Option<&NearbyEntity> {
        self.enemies.first()
    }

    pub fn nearest_player(&self) -> Option<&NearbyEntity> {
        self.players.first()
    }

    pub fn player_nearby(&self) -> bool {
        !self.players.is_empty()
    }

    /// Players in the shape the remote service expects
    pub fn player_snapshots(&self) -> Vec<NearbyPlayerSnapshot> {
        self.players
            .iter()
            .map(|p| NearbyPlayerSnapshot {
                distance: p.distance,
                health: p.health,
            })
            .collect()
    }
}

/// The NPC doing the perceiving
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub id: Uuid,
    pub position: Vec3,
    pub health: f32,
    pub faction: Faction,
    pub activity: Activity,
}

/// Scan `entities` and the player from the observer's point of view
///
/// Reads positions, health and faction only. Dead entities and the observer
/// itself are ignored.
pub fn assess_context(
    observer: &Observer,
    entities: &[EntitySnapshot],
    player: Option<&PlayerSnapshot>,
    radius: f32,
) -> ContextAwareness {
    let mut context = ContextAwareness::default();

    for entity in entities {
        if entity.id == observer.id || entity.health <= 0.0 {
            continue;
        }
        let distance = observer.position.distance(entity.position);
        if distance >= radius {
            continue;
        }
        let nearby = NearbyEntity {
            id: Some(entity.id),
            position: entity.position,
            distance,
            health: entity.health,
        };
        if is_hostile(observer.faction, entity.faction) {
            context.enemies.push(nearby);
        } else {
            context.allies.push(nearby);
        }
    }

    if let Some(player) = player {
        let distance = observer.position.distance(player.position);
        if distance < radius && player.health > 0.0 {
            context.players.push(NearbyEntity {
                id: None,
                position: player.position,
                distance,
                health: player.health,
            });
        }
    }

    context
        .enemies
        .sort_by(|a, b| a.distance.total_cmp(&b.distance));
    context.allies.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    context.threat_level = threat_level(
        context.enemies.iter().map(|e| e.distance),
        observer.health,
        observer.activity,
    );
    context
}

/// Additive threat score, clamped to [`MAX_THREAT`]
pub fn threat_level(
    enemy_distances: impl IntoIterator<Item = f32>,
    health: f32,
    activity: Activity,
) -> u8 {
    let mut threat: u32 = 0;
    for distance in enemy_distances {
        threat += 20;
        if distance < 10.0 {
            threat += 30;
        } else if distance < 20.0 {
            threat += 15;
        }
    }

    if health < 30.0 {
        threat += 40;
    } else if health < 60.0 {
        threat += 20;
    }

    if matches!(activity, Activity::Combat | Activity::Alert) {
        threat += 25;
    }

    threat.min(MAX_THREAT as u32) as u8
}

/// Raiders and wildlife are hostile to everyone outside their own faction
pub fn is_hostile(observer: Faction, other: Faction) -> bool {
    observer != other
}

/// Ambient lighting label for an hour of the day
pub fn lighting(hour: u8) -> &'static str {
    match hour {
        20..=23 | 0..=5 => "dark",
        6..=7 => "dawn",
        18..=19 => "dusk",
        _ => "bright",
    }
}
