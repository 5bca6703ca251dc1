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

//! Population controller driving every NPC once per tick
//!
//! The controller owns the ECS world and the NPC registry. Each tick it:
//!
//! 1. Drains remote decision results and clears pending flags.
//! 2. Reads a snapshot of the spatial world.
//! 3. Buckets every NPC by distance to the player into a level-of-detail band.
//! 4. Runs the full pipeline for near NPCs: override release, schedule and
//!    needs, perception, decision on cadence, steering and movement.
//! 5. Random-walks mid-range NPCs and skips far ones entirely.
//! 6. Writes positions back and delivers queued events.

use super::{Actor, BehaviorExecutor, DecisionEngine, DecisionInput, MovementSystem};
use crate::config::{Configuration, PopulationConfig};
use crate::ecs::EcsEntity;
use crate::ecs::GameWorld;
use crate::ecs::components::*;
use crate::ecs::context::{ContextAwareness, Observer, assess_context, lighting};
use crate::ecs::events::{EventBus, GameEvent};
use crate::ecs::memory::ActivityMemory;
use crate::ecs::registry::{NpcRegistry, RegistryError};
use crate::remote::RemoteDecisionClient;
use crate::world::{EntitySnapshot, PlayerLocator, SpatialWorld, WorldClock};
use glam::Vec3;
use metrics::{counter, histogram};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Instant;
use townsfolk_common::{
    DecisionRequest, EnvironmentSnapshot, GameContextSnapshot, NpcStateSnapshot,
};
use uuid::Uuid;

/// Threat below which situational overrides are released
pub const CALM_THREAT: u8 = 20;

/// NPCs spawn within this distance of their building on each axis
pub const SPAWN_SPREAD: f32 = 2.5;

/// Within this distance of its workplace an NPC reports being inside it
pub const INDOORS_RADIUS: f32 = 5.0;

/// How much attention an NPC gets this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodBand {
    /// Full pipeline
    Near,
    /// Random walk only, needs frozen
    Mid,
    /// Not updated
    Far,
}

impl LodBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            LodBand::Near => "near",
            LodBand::Mid => "mid",
            LodBand::Far => "far",
        }
    }
}

/// Distance thresholds for level of detail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodBands {
    pub near: f32,
    pub mid: f32,
}

impl LodBands {
    pub fn new(near: f32, mid: f32) -> Self {
        Self { near, mid }
    }

    pub fn band(&self, distance: f32) -> LodBand {
        if distance < self.near {
            LodBand::Near
        } else if distance <= self.mid {
            LodBand::Mid
        } else {
            LodBand::Far
        }
    }
}

impl From<&PopulationConfig> for LodBands {
    fn from(config: &PopulationConfig) -> Self {
        Self::new(config.near_range, config.mid_range)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub near: usize,
    pub mid: usize,
    pub far: usize,
    /// Decision cycles run
    pub decisions: usize,
    /// Activity changes applied, from any cause
    pub state_changes: usize,
    /// Remote results drained at the top of the tick
    pub remote_results: usize,
    /// Events delivered at the end of the tick
    pub events: usize,
}

/// Everything needed to create one NPC
#[derive(Debug, Clone)]
pub struct NpcSpawn {
    pub role: JobRole,
    pub name: Option<String>,
    pub position: Vec3,
    pub home: Vec3,
    pub workplace: Vec3,
    pub building: Option<String>,
    /// Derived from the role profile when absent
    pub personality: Option<Personality>,
    pub health: f32,
    pub needs: Needs,
}

impl NpcSpawn {
    /// An NPC living and working where it stands
    pub fn new(role: JobRole, position: Vec3) -> Self {
        Self {
            role,
            name: None,
            position,
            home: position,
            workplace: position,
            building: None,
            personality: None,
            health: 100.0,
            needs: Needs::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_anchors(mut self, home: Vec3, workplace: Vec3) -> Self {
        self.home = home;
        self.workplace = workplace;
        self
    }

    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = Some(personality);
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn with_needs(mut self, needs: Needs) -> Self {
        self.needs = needs;
        self
    }
}

/// Read-only copy of one NPC's state
#[derive(Debug, Clone)]
pub struct NpcView {
    pub id: NpcId,
    pub name: String,
    pub role: JobRole,
    pub building: Option<String>,
    pub health: f32,
    pub personality: Personality,
    pub needs: Needs,
    pub activity: ActivityState,
    pub decision: DecisionState,
    pub context: ContextAwareness,
    pub motion: Motion,
    pub anchors: Anchors,
    pub memory: ActivityMemory,
}

/// Owner of the NPC collection and the per-tick update loop
pub struct PopulationController {
    world: GameWorld,
    registry: NpcRegistry,
    engine: DecisionEngine,
    executor: BehaviorExecutor,
    movement: MovementSystem,
    event_bus: EventBus,
    lod: LodBands,
    awareness_radius: f32,
    memory_capacity: usize,
    schedules: HashMap<JobRole, Schedule>,
    rng: StdRng,
}

impl PopulationController {
    pub fn new(config: &Configuration, remote: Option<RemoteDecisionClient>) -> Self {
        let event_bus = EventBus::new();
        let seed = config.simulation.seed;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            world: GameWorld::new(),
            registry: NpcRegistry::new(),
            engine: DecisionEngine::new(&config.decision, remote),
            executor: BehaviorExecutor::new(event_bus.clone(), seed.map(|s| s.wrapping_add(1))),
            movement: MovementSystem::new(config.population.move_speed),
            event_bus,
            lod: LodBands::from(&config.population),
            awareness_radius: config.population.awareness_radius,
            memory_capacity: config.population.memory_capacity,
            schedules: config.world.schedule_overrides(),
            rng,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn ids(&self) -> Vec<NpcId> {
        self.registry.ids().collect()
    }

    /// Create `capacity` NPCs for every building
    ///
    /// Slot `i` of a building takes `job_slots[i % len]`. Homes are the
    /// nearest house, or the building itself in a settlement without houses.
    pub fn populate(
        &mut self,
        buildings: &[Building],
        spatial: &mut impl SpatialWorld,
    ) -> Result<Vec<NpcId>, RegistryError> {
        let mut spawned = Vec::new();
        for building in buildings {
            if building.capacity > 0 && building.job_slots.is_empty() {
                tracing::warn!(
                    "Building {} has capacity {} but no job slots, skipping",
                    building.name,
                    building.capacity
                );
                continue;
            }
            let home = nearest_house(buildings, building.position)
                .map(|house| house.position)
                .unwrap_or(building.position);

            for slot in 0..building.capacity {
                let Some(role) = building.role_for_slot(slot) else {
                    continue;
                };
                let offset = Vec3::new(
                    self.rng.random_range(-SPAWN_SPREAD..=SPAWN_SPREAD),
                    0.0,
                    self.rng.random_range(-SPAWN_SPREAD..=SPAWN_SPREAD),
                );
                let spawn = NpcSpawn::new(role, building.position + offset)
                    .with_name(format!("{} {} {}", building.name, role, slot + 1))
                    .with_anchors(home, building.position)
                    .with_building(building.name.clone());
                spawned.push(self.spawn_npc(spawn, spatial)?);
            }
        }
        tracing::info!(
            "Populated {} NPCs across {} buildings",
            spawned.len(),
            buildings.len()
        );
        Ok(spawned)
    }

    /// Create a single NPC and start tracking it in the spatial world
    pub fn spawn_npc(
        &mut self,
        spawn: NpcSpawn,
        spatial: &mut impl SpatialWorld,
    ) -> Result<NpcId, RegistryError> {
        let id = NpcId::new();
        let role = spawn.role;
        let personality = match spawn.personality {
            Some(personality) => personality.clamped(),
            None => derive_personality(role, &mut self.rng),
        };
        let schedule = self
            .schedules
            .get(&role)
            .cloned()
            .unwrap_or_else(|| Schedule::for_role(role));
        let health = Health::new(spawn.health);
        let name = spawn
            .name
            .unwrap_or_else(|| format!("{} {}", role, self.registry.len() + 1));
        let mut npc = Npc::new(role);
        if let Some(building) = &spawn.building {
            npc = npc.with_building(building.clone());
        }

        let entity = self.world.spawn((
            id,
            Name::new(name),
            npc,
            health,
            personality,
            Needs::new(spawn.needs.hunger, spawn.needs.energy, spawn.needs.social),
            schedule,
            ActivityState::default(),
            DecisionState::new(),
            ActivityMemory::with_capacity(self.memory_capacity),
            Motion::at(spawn.position),
            Anchors::new(spawn.home, spawn.workplace),
            ContextAwareness::default(),
        ));
        if let Err(e) = self.registry.register(entity, id) {
            // keep the world and registry in step
            let _ = self.world.despawn(entity);
            return Err(e);
        }

        spatial.spawn(EntitySnapshot {
            id: id.uuid(),
            position: spawn.position,
            health: health.current,
            faction: role.faction(),
        });
        self.event_bus.publish(GameEvent::NpcSpawned {
            npc: id,
            role,
            building: spawn.building,
        });
        tracing::debug!("Spawned {} NPC {}", role, id);
        Ok(id)
    }

    /// Read-only view of one NPC
    pub fn npc(&self, id: NpcId) -> Option<NpcView> {
        let entity = self.registry.get_entity(id)?;
        let mut query = self
            .world
            .query_one::<(
                &Name,
                &Npc,
                &Health,
                &Personality,
                &Needs,
                &ActivityState,
                &DecisionState,
                &ContextAwareness,
                &Motion,
                &Anchors,
                &ActivityMemory,
            )>(entity);
        let (name, npc, health, personality, needs, activity, decision, context, motion, anchors, memory) =
            query.get().ok()?;
        Some(NpcView {
            id,
            name: name.to_string(),
            role: npc.role,
            building: npc.building.clone(),
            health: health.current,
            personality: *personality,
            needs: *needs,
            activity: *activity,
            decision: decision.clone(),
            context: context.clone(),
            motion: *motion,
            anchors: *anchors,
            memory: memory.clone(),
        })
    }

    /// Include or exclude an NPC from the update loop
    pub fn set_active(&mut self, id: NpcId, active: bool) -> bool {
        let Some(entity) = self.registry.get_entity(id) else {
            return false;
        };
        match self.world.get::<&mut Npc>(entity) {
            Ok(mut npc) => {
                npc.active = active;
                true
            }
            Err(_) => false,
        }
    }

    /// Number of NPCs per current activity, in [`Activity::ALL`] order
    pub fn activity_census(&self) -> Vec<(Activity, usize)> {
        let mut counts: HashMap<Activity, usize> = HashMap::new();
        for state in self.world.query::<&ActivityState>().iter() {
            *counts.entry(state.current).or_default() += 1;
        }
        Activity::ALL
            .iter()
            .filter_map(|activity| counts.get(activity).map(|count| (*activity, *count)))
            .collect()
    }

    /// Run one fixed-rate update
    ///
    /// `now_ms` is simulation time and `dt` the seconds since the previous
    /// tick. Nothing in here fails; per-NPC trouble degrades to defaults.
    pub fn tick(
        &mut self,
        now_ms: u64,
        dt: f32,
        clock: &impl WorldClock,
        player: &impl PlayerLocator,
        spatial: &mut impl SpatialWorld,
    ) -> TickReport {
        let started = Instant::now();
        let mut report = TickReport::default();
        let hour = clock.current_hour();
        let player = player.player();

        report.remote_results = self.apply_remote_results(now_ms);

        let snapshot = spatial.snapshot();
        let index: HashMap<Uuid, usize> = snapshot
            .iter()
            .enumerate()
            .map(|(i, entity)| (entity.id, i))
            .collect();

        let handles: Vec<(NpcId, EcsEntity)> = self.registry.iter().collect();
        for (id, entity) in handles {
            let Ok((
                name,
                npc,
                health,
                personality,
                needs,
                schedule,
                activity,
                decision_state,
                memory,
                motion,
                anchors,
                context,
            )) = self.world.query_one_mut::<(
                &Name,
                &Npc,
                &mut Health,
                &Personality,
                &mut Needs,
                &Schedule,
                &mut ActivityState,
                &mut DecisionState,
                &mut ActivityMemory,
                &mut Motion,
                &Anchors,
                &mut ContextAwareness,
            )>(entity)
            else {
                tracing::warn!("NPC {} is registered but missing components", id);
                continue;
            };
            if !npc.active {
                continue;
            }

            if let Some(tracked) = index.get(&id.uuid()).map(|&i| &snapshot[i]) {
                motion.position = tracked.position;
                *health = Health::new(tracked.health);
            }

            match self.lod.band(motion.position.distance(player.position)) {
                LodBand::Far => {
                    report.far += 1;
                    continue;
                }
                LodBand::Mid => {
                    report.mid += 1;
                    // nothing out here is perceived, so situational overrides lapse
                    if activity.is_overridden() && is_situational(activity.current) {
                        if let Some(previous) = activity.release() {
                            self.executor.record_change(
                                id,
                                memory,
                                previous,
                                activity.current,
                                "out of range",
                                now_ms,
                            );
                            report.state_changes += 1;
                        }
                    }
                    self.executor.wander(motion, anchors);
                    self.movement.step(motion, activity.current, dt);
                    spatial.write_position(id.uuid(), motion.position);
                    continue;
                }
                LodBand::Near => report.near += 1,
            }

            // Situational overrides end once the last perception was calm
            if let Some(reason) = release_reason(activity, context) {
                if let Some(previous) = activity.release() {
                    self.executor
                        .record_change(id, memory, previous, activity.current, reason, now_ms);
                    report.state_changes += 1;
                }
            }

            // An urgent need holds the NPC until it has recovered
            let held = activity.urgent;
            activity.urgent = needs.pressing_activity(held);
            let (nominal, reason) = match (activity.urgent, held) {
                (Some(urgent), _) => (urgent, urgent_reason(urgent)),
                (None, Some(_)) => (schedule.resolve(hour), "need satisfied"),
                (None, None) => (schedule.resolve(hour), "schedule"),
            };
            let routine_override = activity.is_overridden() && !is_situational(activity.current);
            let nominal_changed = nominal != activity.nominal;
            if let Some(previous) = activity.set_nominal(nominal) {
                self.executor
                    .record_change(id, memory, previous, nominal, reason, now_ms);
                report.state_changes += 1;
            } else if routine_override && nominal_changed {
                if let Some(previous) = activity.release() {
                    self.executor
                        .record_change(id, memory, previous, activity.current, reason, now_ms);
                    report.state_changes += 1;
                }
            }

            needs.update(activity.current, dt);

            let observer = Observer {
                id: id.uuid(),
                position: motion.position,
                health: health.current,
                faction: npc.faction(),
                activity: activity.current,
            };
            *context = assess_context(&observer, &snapshot, Some(&player), self.awareness_radius);

            let interval = self.engine.decision_interval(activity.current);
            if decision_state.is_due(now_ms, interval) {
                let input = DecisionInput {
                    role: npc.role,
                    health: health.current,
                    personality,
                    context: &*context,
                    activity: activity.current,
                    nominal: activity.nominal,
                };
                let decision = self.engine.decide(id, &input, decision_state, now_ms, || {
                    build_request(RequestParts {
                        id,
                        npc,
                        health: health.current,
                        personality,
                        needs: &*needs,
                        activity: activity.current,
                        memory: &*memory,
                        motion: &*motion,
                        anchors,
                        context: &*context,
                        hour,
                    })
                });
                report.decisions += 1;
                tracing::trace!("{} considered {}", name, decision.action);

                let actor = Actor {
                    id,
                    activity: &mut *activity,
                    decision_state: &mut *decision_state,
                    memory: &mut *memory,
                    motion: &mut *motion,
                };
                if self.executor.apply(actor, &decision, now_ms) {
                    report.state_changes += 1;
                }
            }

            self.executor
                .steer(activity.current, motion, anchors, context);
            self.movement.step(motion, activity.current, dt);
            spatial.write_position(id.uuid(), motion.position);
        }

        report.events = self.event_bus.process_events();

        counter!("population.lod", "band" => LodBand::Near.as_str()).increment(report.near as u64);
        counter!("population.lod", "band" => LodBand::Mid.as_str()).increment(report.mid as u64);
        counter!("population.lod", "band" => LodBand::Far.as_str()).increment(report.far as u64);
        histogram!("population.tick.duration").record(started.elapsed().as_secs_f64());

        report
    }

    /// Apply remote answers that still describe the NPC's situation
    ///
    /// Every answer, stale or not, is already in the decision cache.
    fn apply_remote_results(&mut self, now_ms: u64) -> usize {
        let results = self.engine.drain_remote(now_ms);
        let count = results.len();

        for remote in results {
            let Some(entity) = self.registry.get_entity(remote.npc) else {
                continue;
            };
            let Ok((npc, health, activity, decision_state, memory, motion, context)) =
                self.world.query_one_mut::<(
                    &Npc,
                    &Health,
                    &mut ActivityState,
                    &mut DecisionState,
                    &mut ActivityMemory,
                    &mut Motion,
                    &ContextAwareness,
                )>(entity)
            else {
                continue;
            };
            decision_state.pending_request = false;

            let decision = match remote.result {
                Ok(decision) => decision,
                Err(e) => {
                    self.event_bus.publish(GameEvent::RemoteDecisionFailed {
                        npc: remote.npc,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            self.event_bus.publish(GameEvent::RemoteDecisionReceived {
                npc: remote.npc,
                action: decision.action,
                priority: decision.priority,
            });

            let current = StateSignature::new(
                npc.role,
                health.current,
                context.enemies.len(),
                activity.current,
            );
            if current != remote.signature {
                tracing::debug!(
                    "Remote decision for NPC {} is stale, leaving it in the cache",
                    remote.npc
                );
                continue;
            }

            decision_state.last_decision = Some(decision.clone());
            let actor = Actor {
                id: remote.npc,
                activity,
                decision_state,
                memory,
                motion,
            };
            self.executor.apply(actor, &decision, now_ms);
        }
        count
    }
}

/// Threat, player and decision driven activities
fn is_situational(activity: Activity) -> bool {
    activity.is_threat_driven() || activity.is_player_driven() || activity == Activity::Patrolling
}

fn release_reason(activity: &ActivityState, context: &ContextAwareness) -> Option<&'static str> {
    if !activity.is_overridden() {
        return None;
    }
    let current = activity.current;
    if (current.is_threat_driven() || current == Activity::Patrolling)
        && context.threat_level < CALM_THREAT
    {
        return Some("threat subsided");
    }
    if current.is_player_driven() && !context.player_nearby() {
        return Some("player left");
    }
    None
}

fn urgent_reason(activity: Activity) -> &'static str {
    match activity {
        Activity::Eating => "hungry",
        Activity::Sleeping => "exhausted",
        Activity::Socializing => "lonely",
        _ => "urgent need",
    }
}

struct RequestParts<'a> {
    id: NpcId,
    npc: &'a Npc,
    health: f32,
    personality: &'a Personality,
    needs: &'a Needs,
    activity: Activity,
    memory: &'a ActivityMemory,
    motion: &'a Motion,
    anchors: &'a Anchors,
    context: &'a ContextAwareness,
    hour: u8,
}

fn build_request(parts: RequestParts<'_>) -> DecisionRequest {
    let location = match &parts.npc.building {
        Some(building) if parts.motion.distance_to(parts.anchors.workplace) <= INDOORS_RADIUS => {
            building.clone()
        }
        _ => "outdoors".to_string(),
    };
    DecisionRequest {
        state: NpcStateSnapshot {
            id: parts.id.uuid(),
            role: parts.npc.role.to_string(),
            health: parts.health,
            activity: parts.activity.to_string(),
            position: position_snapshot(parts.motion.position),
            personality: parts.personality.snapshot(),
            needs: parts.needs.snapshot(),
            recent_events: parts.memory.recent_snapshots(),
        },
        context: GameContextSnapshot {
            time_of_day: parts.hour,
            threat_level: parts.context.threat_level,
            nearby_players: parts.context.player_snapshots(),
            nearby_enemies: parts.context.enemies.len(),
            nearby_allies: parts.context.allies.len(),
            environment: EnvironmentSnapshot {
                location,
                lighting: lighting(parts.hour).to_string(),
            },
        },
    }
}
