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

//! End-to-end NPC scenarios driven through the population controller

use glam::Vec3;
use townsfolk_server::config::Configuration;
use townsfolk_server::ecs::components::*;
use townsfolk_server::ecs::systems::{NpcSpawn, PopulationController};
use townsfolk_server::world::{GameClock, PlayerLocator, SimulatedWorld};

fn population() -> PopulationController {
    let mut config = Configuration::default();
    config.simulation.seed = Some(7);
    PopulationController::new(&config, None)
}

/// Player inside the full-update range but outside awareness
fn world_with_distant_player() -> SimulatedWorld {
    SimulatedWorld::new(Vec3::new(0.0, 0.0, -45.0))
}

#[test]
fn test_guard_engages_raiders() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(12, 3000);

    let guard = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Guard, Vec3::ZERO)
                .with_personality(Personality::new(0.8, 0.8, 0.9, 0.3, 0.4))
                .with_health(80.0),
            &mut world,
        )
        .unwrap();
    for distance in [5.0, 8.0, 25.0] {
        world.spawn_at(Vec3::new(distance, 0.0, 0.0), Faction::Raiders);
    }

    let player = world.player();
    let report = population.tick(0, 0.2, &clock, &player, &mut world);
    assert_eq!(report.near, 1);
    assert_eq!(report.decisions, 1);

    let npc = population.npc(guard).unwrap();
    assert_eq!(npc.context.enemies.len(), 3);
    assert_eq!(npc.context.threat_level, 100);

    let decision = npc.decision.last_decision.unwrap();
    assert_eq!(decision.action, Action::Combat);
    assert_eq!(decision.priority, 9);
    assert_eq!(npc.activity.current, Activity::Combat);
    assert_eq!(npc.activity.nominal, Activity::Patrolling);
    assert_eq!(npc.motion.destination, Some(Vec3::new(5.0, 0.0, 0.0)));
    assert!(npc.motion.target.is_some());
}

#[test]
fn test_wounded_citizen_flees() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(12, 3000);

    let citizen = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Citizen, Vec3::ZERO)
                .with_personality(Personality::new(0.2, 0.7, 0.3, 0.8, 0.6))
                .with_health(25.0),
            &mut world,
        )
        .unwrap();
    world.spawn_at(Vec3::new(5.0, 0.0, 0.0), Faction::Raiders);

    let player = world.player();
    population.tick(0, 0.5, &clock, &player, &mut world);

    let npc = population.npc(citizen).unwrap();
    let decision = npc.decision.last_decision.unwrap();
    assert_eq!((decision.action, decision.priority), (Action::Flee, 10));
    assert_eq!(npc.activity.current, Activity::Fleeing);
    assert_eq!(
        npc.memory.latest().map(|e| e.reason.as_str()),
        Some("low health retreat")
    );

    let destination = npc.motion.destination.unwrap();
    assert!((destination - Vec3::new(-30.0, 0.0, 0.0)).length() < 1e-3);
    // hasted movement away from the raider
    assert!((npc.motion.position.x + 3.0).abs() < 1e-4);
}

#[test]
fn test_friendly_citizen_approaches_player() {
    let mut population = population();
    let mut world = SimulatedWorld::new(Vec3::new(12.0, 0.0, 0.0));
    let clock = GameClock::new(12, 3000);

    let citizen = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Citizen, Vec3::ZERO)
                .with_personality(Personality::new(0.2, 0.7, 0.3, 0.8, 0.6)),
            &mut world,
        )
        .unwrap();

    let player = world.player();
    population.tick(0, 1.0, &clock, &player, &mut world);

    let npc = population.npc(citizen).unwrap();
    let decision = npc.decision.last_decision.clone().unwrap();
    assert_eq!((decision.action, decision.priority), (Action::Approach, 6));
    assert!(npc.context.threat_level < 20);
    assert_eq!(npc.activity.current, Activity::Approaching);
    assert_eq!(npc.motion.destination, Some(Vec3::new(12.0, 0.0, 0.0)));

    // closes in until within conversational distance, then holds
    population.tick(1000, 1.0, &clock, &player, &mut world);
    population.tick(2000, 1.0, &clock, &player, &mut world);

    let npc = population.npc(citizen).unwrap();
    assert_eq!(npc.activity.current, Activity::Approaching);
    assert_eq!(npc.motion.destination, None);
    assert!(npc.motion.position.distance(player.position) <= 5.0);
}

#[test]
fn test_merchant_trades_with_player() {
    let mut population = population();
    let mut world = SimulatedWorld::new(Vec3::new(0.0, 0.0, 6.0));
    let clock = GameClock::new(10, 3000);

    let merchant = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Merchant, Vec3::ZERO)
                .with_personality(Personality::base_profile(JobRole::Merchant)),
            &mut world,
        )
        .unwrap();

    let player = world.player();
    population.tick(0, 0.2, &clock, &player, &mut world);

    let npc = population.npc(merchant).unwrap();
    assert_eq!(npc.activity.current, Activity::Trading);
    assert_eq!(npc.motion.destination, None);
}

#[test]
fn test_player_leaving_releases_player_override() {
    let mut population = population();
    let mut world = SimulatedWorld::new(Vec3::new(0.0, 0.0, 6.0));
    let clock = GameClock::new(10, 3000);

    let merchant = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Merchant, Vec3::ZERO)
                .with_personality(Personality::base_profile(JobRole::Merchant)),
            &mut world,
        )
        .unwrap();

    let player = world.player();
    population.tick(0, 0.2, &clock, &player, &mut world);
    assert_eq!(
        population.npc(merchant).unwrap().activity.current,
        Activity::Trading
    );

    // out of awareness, still in full-update range
    world.set_player_position(Vec3::new(0.0, 0.0, 40.0));
    let player = world.player();
    population.tick(200, 0.2, &clock, &player, &mut world);
    population.tick(400, 0.2, &clock, &player, &mut world);

    let npc = population.npc(merchant).unwrap();
    assert_eq!(npc.activity.current, Activity::Working);
    assert!(!npc.activity.is_overridden());
    assert!(npc.memory.iter().any(|e| e.reason == "player left"));
}

#[test]
fn test_threat_subsides_back_to_schedule() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(10, 3000);

    let citizen = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Farmer, Vec3::ZERO)
                .with_personality(Personality::new(0.2, 0.7, 0.3, 0.8, 0.6)),
            &mut world,
        )
        .unwrap();
    let raiders: Vec<_> = (0..2)
        .map(|_| world.spawn_at(Vec3::new(15.0, 0.0, 0.0), Faction::Raiders))
        .collect();

    let player = world.player();
    population.tick(0, 0.1, &clock, &player, &mut world);
    let npc = population.npc(citizen).unwrap();
    assert_eq!(npc.activity.current, Activity::Alert);
    assert_eq!(npc.activity.override_priority, Some(7));

    for raider in raiders {
        world.set_health(raider, 0.0);
    }

    // no decision is due yet, so the alert holds
    population.tick(1000, 0.1, &clock, &player, &mut world);
    assert_eq!(
        population.npc(citizen).unwrap().activity.current,
        Activity::Alert
    );

    let mut now = 1000;
    while now < 8000 {
        now += 1000;
        population.tick(now, 0.1, &clock, &player, &mut world);
    }

    let npc = population.npc(citizen).unwrap();
    assert_eq!(npc.activity.current, Activity::Working);
    assert!(!npc.activity.is_overridden());
    assert!(npc.memory.iter().any(|e| e.reason == "threat subsided"));
}

#[test]
fn test_low_priority_decisions_are_only_considered() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(10, 3000);

    let farmer = population
        .spawn_npc(NpcSpawn::new(JobRole::Farmer, Vec3::ZERO), &mut world)
        .unwrap();

    let player = world.player();
    population.tick(0, 0.2, &clock, &player, &mut world);

    let npc = population.npc(farmer).unwrap();
    let considered = npc.decision.last_considered.unwrap();
    assert_eq!(considered.priority, 3);
    assert_eq!(considered.action, Action::Routine(Activity::Working));
    assert_eq!(npc.activity.current, Activity::Working);
    assert!(!npc.activity.is_overridden());
}

#[test]
fn test_decision_cadence_shortens_in_combat() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(12, 3000);

    let guard = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Guard, Vec3::ZERO)
                .with_personality(Personality::base_profile(JobRole::Guard)),
            &mut world,
        )
        .unwrap();
    world.spawn_at(Vec3::new(3.0, 0.0, 0.0), Faction::Raiders);
    world.spawn_at(Vec3::new(4.0, 0.0, 0.0), Faction::Raiders);

    let player = world.player();
    let first = population.tick(0, 0.1, &clock, &player, &mut world);
    assert_eq!(first.decisions, 1);
    assert_eq!(
        population.npc(guard).unwrap().activity.current,
        Activity::Combat
    );

    assert_eq!(population.tick(1999, 0.1, &clock, &player, &mut world).decisions, 0);
    assert_eq!(population.tick(2000, 0.1, &clock, &player, &mut world).decisions, 1);
}

#[test]
fn test_schedule_wraps_past_midnight() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let home = Vec3::new(-10.0, 0.0, 0.0);

    let farmer = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Farmer, Vec3::ZERO).with_anchors(home, Vec3::new(10.0, 0.0, 0.0)),
            &mut world,
        )
        .unwrap();

    let clock = GameClock::new(2, 3000);
    let player = world.player();
    population.tick(0, 0.2, &clock, &player, &mut world);

    let npc = population.npc(farmer).unwrap();
    assert_eq!(npc.activity.nominal, Activity::Sleeping);
    assert_eq!(npc.motion.destination, Some(home));
}

#[test]
fn test_exhausted_worker_sleeps_until_rested() {
    let mut population = population();
    let mut world = world_with_distant_player();
    let clock = GameClock::new(10, 3000);

    let worker = population
        .spawn_npc(
            NpcSpawn::new(JobRole::Citizen, Vec3::ZERO).with_needs(Needs::new(90.0, 10.0, 90.0)),
            &mut world,
        )
        .unwrap();

    let player = world.player();
    let mut changes = 0;
    let mut slept_until = None;
    for step in 0..500u64 {
        changes += population
            .tick(step * 200, 0.2, &clock, &player, &mut world)
            .state_changes;
        let npc = population.npc(worker).unwrap();
        if npc.activity.current == Activity::Sleeping {
            // still recovering, never back at work in between
            assert!(npc.needs.energy < RECOVERED_THRESHOLD + 1.0);
            slept_until = Some(step);
        }
    }

    let npc = population.npc(worker).unwrap();
    assert!(slept_until.is_some_and(|step| step > 100));
    assert_eq!(changes, 2);
    let transitions: Vec<(Activity, Activity, &str)> = npc
        .memory
        .iter()
        .map(|e| (e.old_activity, e.new_activity, e.reason.as_str()))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Activity::Idle, Activity::Sleeping, "exhausted"),
            (Activity::Sleeping, Activity::Working, "need satisfied"),
        ]
    );
    assert!(npc.needs.energy >= RECOVERED_THRESHOLD - 5.0);
}
