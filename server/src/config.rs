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

use crate::ecs::components::{Building, JobRole, Schedule, ScheduleEntry, default_village};
use crate::remote::RemoteConfig;
use clap::Parser;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::collections::HashMap;
use thiserror::Error;

/// Base URL used when the remote section names no endpoint
pub const DEFAULT_REMOTE_ENDPOINT: &str = "http://localhost:5000";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub simulation: SimulationConfig,
    pub population: PopulationConfig,
    pub decision: DecisionConfig,
    pub remote: RemoteSettings,
    pub world: WorldConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        let conf: Configuration = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()));
        }
        if self.simulation.hour_duration_ms == 0 {
            return Err(ConfigError::Invalid("hour_duration_ms must be positive".into()));
        }
        if self.simulation.start_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "start_hour {} is not an hour of the day",
                self.simulation.start_hour
            )));
        }
        let population = &self.population;
        if !(population.near_range > 0.0 && population.near_range < population.mid_range) {
            return Err(ConfigError::Invalid(format!(
                "near_range {} must be positive and below mid_range {}",
                population.near_range, population.mid_range
            )));
        }
        if population.awareness_radius <= 0.0 || population.move_speed < 0.0 {
            return Err(ConfigError::Invalid(
                "awareness_radius must be positive and move_speed non-negative".into(),
            ));
        }
        if self.decision.cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid("cache_ttl_ms must be positive".into()));
        }
        if self.remote.enabled && self.remote.timeout_ms == 0 {
            return Err(ConfigError::Invalid("remote timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed update period of the population
    pub tick_interval_ms: u64,
    /// Wall time per in-game hour
    pub hour_duration_ms: u64,
    pub start_hour: u8,
    /// RNG seed for personality jitter and patrol points
    pub seed: Option<u64>,
    pub player_position: Vec3,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            hour_duration_ms: 3000,
            start_hour: 12,
            seed: None,
            player_position: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// NPCs closer than this to the player run the full pipeline
    pub near_range: f32,
    /// NPCs beyond this are not updated at all
    pub mid_range: f32,
    pub awareness_radius: f32,
    /// Walking speed in units per second
    pub move_speed: f32,
    pub memory_capacity: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            near_range: 50.0,
            mid_range: 100.0,
            awareness_radius: 30.0,
            move_speed: 4.0,
            memory_capacity: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub cache_ttl_ms: u64,
    /// Decision cadence while in combat
    pub combat_interval_ms: u64,
    /// Decision cadence otherwise
    pub peaceful_interval_ms: u64,
    /// Priority given to remote decisions that carry none
    pub remote_default_priority: i32,
    pub cache_capacity: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 5000,
            combat_interval_ms: 2000,
            peaceful_interval_ms: 5000,
            remote_default_priority: 8,
            cache_capacity: 10_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub enabled: bool,
    /// Base URL of the service; supports `${VAR}` substitution
    pub endpoint: Option<EnvField<String>>,
    pub timeout_ms: u64,
    pub health_check_interval_secs: u64,
}

impl RemoteSettings {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_ref()
            .map(|e| e.as_str())
            .unwrap_or(DEFAULT_REMOTE_ENDPOINT)
    }

    pub fn to_remote_config(&self) -> RemoteConfig {
        RemoteConfig::new(self.endpoint()).with_timeout_ms(self.timeout_ms)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_ms: 2000,
            health_check_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Replaces the built-in village when present
    pub buildings: Option<Vec<Building>>,
    /// Per-role schedule tables replacing the built-in ones
    pub schedules: HashMap<JobRole, Vec<ScheduleEntry>>,
}

impl WorldConfig {
    pub fn buildings(&self) -> Vec<Building> {
        self.buildings.clone().unwrap_or_else(default_village)
    }

    /// Validated schedule overrides
    ///
    /// A malformed table is dropped with a warning so the role keeps its
    /// built-in schedule.
    pub fn schedule_overrides(&self) -> HashMap<JobRole, Schedule> {
        let mut overrides = HashMap::new();
        for (role, entries) in &self.schedules {
            match Schedule::try_from_entries(entries.clone()) {
                Ok(schedule) => {
                    overrides.insert(*role, schedule);
                }
                Err(e) => {
                    tracing::warn!("Ignoring schedule override for {}: {}", role, e);
                }
            }
        }
        overrides
    }
}
