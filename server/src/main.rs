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

use clap::Parser;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;
use townsfolk_server::config::{Arguments, Configuration};
use townsfolk_server::ecs::PopulationController;
use townsfolk_server::ecs::events::GameEvent;
use townsfolk_server::remote::RemoteDecisionClient;
use townsfolk_server::world::{GameClock, PlayerLocator, SimulatedWorld, WorldClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration, falling back to defaults when no file exists
    let config = if std::path::Path::new(&arguments.config_file).exists() {
        Configuration::load(&arguments.config_file)?
    } else {
        tracing::warn!(
            "Configuration file {} not found, using defaults",
            arguments.config_file
        );
        Configuration::default()
    };
    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!("Starting Townsfolk simulation...");

    // Connect the remote decision service if enabled
    let remote = if config.remote.enabled {
        let client = RemoteDecisionClient::from_config(
            config.remote.to_remote_config(),
            tokio::runtime::Handle::current(),
        )?;
        tracing::info!(
            "Remote decisions via {} at {}",
            client.provider_name(),
            config.remote.endpoint()
        );
        client.check_health().await;
        client.spawn_health_monitor(Duration::from_secs(
            config.remote.health_check_interval_secs.max(1),
        ));
        Some(client)
    } else {
        tracing::info!("Remote decisions disabled, running local heuristics only");
        None
    };

    let mut population = PopulationController::new(&config, remote);
    population.event_bus().subscribe(|event| match event {
        GameEvent::ActivityChanged {
            npc,
            from,
            to,
            reason,
        } => tracing::debug!("{} changed {} -> {} ({})", npc, from, to, reason),
        GameEvent::RemoteDecisionFailed { npc, error } => {
            tracing::debug!("{} remote decision failed: {}", npc, error)
        }
        other => tracing::trace!("{:?}", other),
    });

    let mut world = SimulatedWorld::new(config.simulation.player_position);
    let buildings = config.world.buildings();
    population.populate(&buildings, &mut world)?;

    let mut clock = GameClock::new(
        config.simulation.start_hour,
        config.simulation.hour_duration_ms,
    );
    let tick_ms = config.simulation.tick_interval_ms;
    let dt = tick_ms as f32 / 1000.0;
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut now_ms: u64 = 0;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(
        "Simulating {} NPCs, tick {} ms, day starts at {:02}:00",
        population.len(),
        tick_ms,
        clock.current_hour()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let player = world.player();
                let report = population.tick(now_ms, dt, &clock, &player, &mut world);
                tracing::trace!("Tick at {} ms: {:?}", now_ms, report);
                now_ms += tick_ms;

                if clock.advance(tick_ms) > 0 {
                    let census = population
                        .activity_census()
                        .iter()
                        .map(|(activity, count)| format!("{}={}", activity, count))
                        .collect::<Vec<_>>()
                        .join(" ");
                    tracing::info!(
                        "Day {} {:02}:00 [{} near, {} mid, {} far] {}",
                        clock.current_day(),
                        clock.current_hour(),
                        report.near,
                        report.mid,
                        report.far,
                        census
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down simulation");
                break;
            }
        }
    }

    Ok(())
}
