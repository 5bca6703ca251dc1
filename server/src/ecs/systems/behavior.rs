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

//! Behavior executor turning decisions into activities and destinations

use crate::ecs::components::{
    Action, Activity, ActivityState, Anchors, Decision, DecisionState, Motion, NpcId,
};
use crate::ecs::context::ContextAwareness;
use crate::ecs::events::{EventBus, GameEvent};
use crate::ecs::memory::ActivityMemory;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Distance a fleeing NPC tries to put between itself and the threat
pub const FLEE_DISTANCE: f32 = 30.0;

/// Patrol points are picked this far from home
pub const PATROL_RADIUS_MIN: f32 = 15.0;
pub const PATROL_RADIUS_MAX: f32 = 20.0;

/// A patrol point closer than this counts as reached
pub const PATROL_ARRIVAL: f32 = 2.0;

/// An approaching NPC stops this close to the player
pub const APPROACH_DISTANCE: f32 = 5.0;

/// Jitter around the workplace when heading to work
pub const WORKPLACE_JITTER: f32 = 1.5;

/// Half extent of the square a mid-range NPC wanders in
pub const WANDER_EXTENT: f32 = 7.5;

/// The mutable parts of an NPC touched by [`BehaviorExecutor::apply`]
pub struct Actor<'a> {
    pub id: NpcId,
    pub activity: &'a mut ActivityState,
    pub decision_state: &'a mut DecisionState,
    pub memory: &'a mut ActivityMemory,
    pub motion: &'a mut Motion,
}

pub struct BehaviorExecutor {
    rng: StdRng,
    event_bus: EventBus,
}

impl BehaviorExecutor {
    /// Create an executor; a fixed `seed` makes patrol and wander points repeatable
    pub fn new(event_bus: EventBus, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, event_bus }
    }

    /// Act on a decision
    ///
    /// Decisions below the acting priority are only remembered as
    /// considered. Returns `true` when the current activity changed.
    pub fn apply(&mut self, actor: Actor<'_>, decision: &Decision, now_ms: u64) -> bool {
        if !decision.is_actionable() {
            actor.decision_state.last_considered = Some(decision.clone());
            self.event_bus.publish(GameEvent::DecisionConsidered {
                npc: actor.id,
                action: decision.action,
                priority: decision.priority,
            });
            return false;
        }

        self.event_bus.publish(GameEvent::DecisionMade {
            npc: actor.id,
            action: decision.action,
            priority: decision.priority,
            source: decision.source,
        });

        let target = decision.action.activity();
        if target == actor.activity.current {
            return false;
        }

        let previous = match decision.action {
            // a routine suggestion matching the schedule just resumes it
            Action::Routine(activity) if activity == actor.activity.nominal => {
                match actor.activity.release() {
                    Some(previous) => previous,
                    None => return false,
                }
            }
            _ => actor.activity.set_override(target, decision.priority),
        };

        actor.motion.destination = None;
        actor.motion.target = None;
        self.record_change(
            actor.id,
            actor.memory,
            previous,
            actor.activity.current,
            &decision.reasoning,
            now_ms,
        );
        true
    }

    /// Log an activity change to memory and the event bus
    pub fn record_change(
        &self,
        npc: NpcId,
        memory: &mut ActivityMemory,
        from: Activity,
        to: Activity,
        reason: &str,
        now_ms: u64,
    ) {
        tracing::debug!("NPC {} {} -> {}: {}", npc, from, to, reason);
        memory.record(now_ms, from, to, reason);
        self.event_bus.publish(GameEvent::ActivityChanged {
            npc,
            from,
            to,
            reason: reason.to_string(),
        });
    }

    /// Set destination and facing for the activity in effect
    pub fn steer(
        &mut self,
        activity: Activity,
        motion: &mut Motion,
        anchors: &Anchors,
        context: &ContextAwareness,
    ) {
        match activity {
            Activity::Fleeing => {
                if let Some(threat) = context.nearest_enemy() {
                    let mut away = (motion.position - threat.position).normalize_or_zero();
                    if away == Vec3::ZERO {
                        away = self.random_heading();
                    }
                    motion.destination = Some(motion.position + away * FLEE_DISTANCE);
                    motion.target = None;
                }
            }
            Activity::Combat => match context.nearest_enemy() {
                Some(enemy) => {
                    motion.target = enemy.id.map(NpcId::from_uuid);
                    motion.destination = Some(enemy.position);
                    motion.face(enemy.position);
                }
                None => {
                    motion.target = None;
                    motion.destination = None;
                }
            },
            Activity::Patrolling => {
                let reached = motion
                    .destination
                    .is_none_or(|d| motion.distance_to(d) < PATROL_ARRIVAL);
                if reached {
                    let radius = self.rng.random_range(PATROL_RADIUS_MIN..=PATROL_RADIUS_MAX);
                    motion.destination = Some(anchors.home + self.random_heading() * radius);
                }
            }
            Activity::Approaching => match context.nearest_player() {
                Some(player) if player.distance > APPROACH_DISTANCE => {
                    motion.destination = Some(player.position);
                    motion.face(player.position);
                }
                Some(player) => {
                    motion.destination = None;
                    motion.face(player.position);
                }
                None => motion.destination = None,
            },
            Activity::Alert => {
                motion.destination = None;
                if let Some(threat) = context.nearest_enemy() {
                    motion.face(threat.position);
                }
            }
            Activity::Trading => {
                motion.destination = None;
                if let Some(player) = context.nearest_player() {
                    motion.face(player.position);
                }
            }
            Activity::Working => {
                if motion.destination.is_none()
                    && motion.distance_to(anchors.workplace) > WORKPLACE_JITTER * 2.0
                {
                    motion.destination = Some(anchors.workplace + self.jitter(WORKPLACE_JITTER));
                }
            }
            Activity::Sleeping => {
                if motion.destination.is_none() && motion.distance_to(anchors.home) > 0.5 {
                    motion.destination = Some(anchors.home);
                }
            }
            Activity::Eating | Activity::Resting | Activity::Socializing | Activity::Idle => {}
        }
    }

    /// Cheap random walk for NPCs outside the full update range
    pub fn wander(&mut self, motion: &mut Motion, anchors: &Anchors) {
        if motion.destination.is_some() {
            return;
        }
        let anchor = if self.rng.random_bool(0.5) {
            anchors.home
        } else {
            anchors.workplace
        };
        motion.destination = Some(anchor + self.jitter(WANDER_EXTENT));
    }

    fn random_heading(&mut self) -> Vec3 {
        let angle = self.rng.random_range(0.0..TAU);
        Vec3::new(angle.sin(), 0.0, angle.cos())
    }

    fn jitter(&mut self, extent: f32) -> Vec3 {
        Vec3::new(
            self.rng.random_range(-extent..=extent),
            0.0,
            self.rng.random_range(-extent..=extent),
        )
    }
}
