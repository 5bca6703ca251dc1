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

//! Performance benchmarks for the population update loop
//!
//! Run with: cargo bench --bench population_benchmarks

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use glam::Vec3;
use std::hint::black_box;
use std::time::Duration;
use townsfolk_server::config::Configuration;
use townsfolk_server::ecs::components::*;
use townsfolk_server::ecs::context::{Observer, assess_context};
use townsfolk_server::ecs::systems::{
    DecisionCache, DecisionInput, NpcSpawn, PopulationController, local_decision,
};
use townsfolk_server::world::{EntitySnapshot, GameClock, PlayerLocator, SimulatedWorld};
use uuid::Uuid;

/// Spread `count` NPCs of every role on a ring around the player
fn setup_population(count: usize, radius: f32) -> (PopulationController, SimulatedWorld) {
    let mut config = Configuration::default();
    config.simulation.seed = Some(99);
    let mut population = PopulationController::new(&config, None);
    let mut world = SimulatedWorld::new(Vec3::ZERO);

    for i in 0..count {
        let angle = i as f32 / count as f32 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius * ((i % 4) as f32 + 1.0) / 4.0;
        let role = JobRole::ALL[i % JobRole::ALL.len()];
        population
            .spawn_npc(
                NpcSpawn::new(role, position).with_anchors(position + Vec3::X * 5.0, position),
                &mut world,
            )
            .unwrap();
    }
    (population, world)
}

/// Benchmark a single tick for growing populations inside the full-update band
fn bench_tick_near(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_near");
    for size in [10usize, 50, 200].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (mut population, mut world) = setup_population(size, 45.0);
            let clock = GameClock::new(12, 3000);
            let player = world.player();
            let mut now = 0;
            b.iter(|| {
                now += 200;
                black_box(population.tick(now, 0.2, &clock, &player, &mut world))
            });
        });
    }
    group.finish();
}

/// Benchmark how much the level-of-detail bands save
fn bench_tick_lod(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_lod");
    for radius in [40.0f32, 90.0, 400.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(radius), radius, |b, &radius| {
            let (mut population, mut world) = setup_population(200, radius);
            let clock = GameClock::new(12, 3000);
            let player = world.player();
            let mut now = 0;
            b.iter(|| {
                now += 200;
                black_box(population.tick(now, 0.2, &clock, &player, &mut world))
            });
        });
    }
    group.finish();
}

/// Benchmark context assessment against a crowded snapshot
fn bench_assess_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("assess_context");
    for size in [50usize, 500].iter() {
        let entities: Vec<EntitySnapshot> = (0..*size)
            .map(|i| EntitySnapshot {
                id: Uuid::new_v4(),
                position: Vec3::new((i % 25) as f32 * 3.0, 0.0, (i / 25) as f32 * 3.0),
                health: 100.0,
                faction: if i % 5 == 0 { Faction::Raiders } else { Faction::Townsfolk },
            })
            .collect();
        let observer = Observer {
            id: Uuid::new_v4(),
            position: Vec3::new(30.0, 0.0, 30.0),
            health: 80.0,
            faction: Faction::Townsfolk,
            activity: Activity::Patrolling,
        };

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &entities, |b, entities| {
            b.iter(|| black_box(assess_context(&observer, entities, None, 30.0)));
        });
    }
    group.finish();
}

/// Benchmark the local heuristic and the decision cache
fn bench_decisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("decisions");
    let personality = Personality::base_profile(JobRole::Guard);
    let context = ContextAwareness {
        threat_level: 45,
        ..ContextAwareness::default()
    };
    let input = DecisionInput {
        role: JobRole::Guard,
        health: 70.0,
        personality: &personality,
        context: &context,
        activity: Activity::Patrolling,
        nominal: Activity::Patrolling,
    };

    group.bench_function("local_decision", |b| {
        b.iter(|| black_box(local_decision(black_box(&input))))
    });

    group.bench_function("cache_lookup", |b| {
        b.iter_batched(
            || {
                let cache = DecisionCache::new(1024, 5000);
                for enemies in 0..64 {
                    let signature =
                        StateSignature::new(JobRole::Guard, 100.0, enemies, Activity::Patrolling);
                    cache.insert(signature, local_decision(&input), 0);
                }
                cache
            },
            |cache| {
                for enemies in 0..64 {
                    let signature =
                        StateSignature::new(JobRole::Guard, 100.0, enemies, Activity::Patrolling);
                    black_box(cache.get(&signature, 1000));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_schedule_resolve(c: &mut Criterion) {
    let schedules: Vec<Schedule> = JobRole::ALL.iter().map(|r| Schedule::for_role(*r)).collect();
    c.bench_function("schedule_resolve_day", |b| {
        b.iter(|| {
            for schedule in &schedules {
                for hour in 0..24 {
                    black_box(schedule.resolve(hour));
                }
            }
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(50);
    targets =
        bench_tick_near,
        bench_tick_lod,
        bench_assess_context,
        bench_decisions,
        bench_schedule_resolve
}

criterion_main!(benches);
