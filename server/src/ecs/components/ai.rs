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

//! AI components for NPC personality, decisions and activity arbitration

use super::{Activity, JobRole};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use townsfolk_common::PersonalitySnapshot;

/// Maximum absolute jitter applied to each base personality trait
pub const PERSONALITY_JITTER: f32 = 0.1;

/// Minimum priority a decision needs before it may change an activity
pub const ACTING_PRIORITY: i32 = 5;

/// Personality traits, each in `[0, 1]`, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggression: f32,
    pub caution: f32,
    pub bravery: f32,
    pub friendliness: f32,
    pub curiosity: f32,
}

impl Personality {
    pub const fn new(
        aggression: f32,
        caution: f32,
        bravery: f32,
        friendliness: f32,
        curiosity: f32,
    ) -> Self {
        Self {
            aggression,
            caution,
            bravery,
            friendliness,
            curiosity,
        }
    }

    /// Base profile for a role, before jitter
    pub fn base_profile(role: JobRole) -> Self {
        match role {
            JobRole::Guard => Self::new(0.7, 0.8, 0.9, 0.3, 0.4),
            JobRole::Raider => Self::new(0.9, 0.4, 0.7, 0.1, 0.5),
            JobRole::Trader | JobRole::Merchant => Self::new(0.1, 0.6, 0.4, 0.9, 0.7),
            _ => Self::new(0.2, 0.7, 0.3, 0.8, 0.6),
        }
    }

    /// Clamp every trait into `[0, 1]`
    pub fn clamped(self) -> Self {
        Self {
            aggression: clamp_trait(self.aggression),
            caution: clamp_trait(self.caution),
            bravery: clamp_trait(self.bravery),
            friendliness: clamp_trait(self.friendliness),
            curiosity: clamp_trait(self.curiosity),
        }
    }

    pub fn snapshot(&self) -> PersonalitySnapshot {
        PersonalitySnapshot {
            aggression: self.aggression,
            caution: self.caution,
            bravery: self.bravery,
            friendliness: self.friendliness,
            curiosity: self.curiosity,
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::base_profile(JobRole::Citizen)
    }
}

/// Role profile with independent jitter per trait, clamped into `[0, 1]`
pub fn derive_personality<R: Rng>(role: JobRole, rng: &mut R) -> Personality {
    let base = Personality::base_profile(role);
    let mut jitter = || rng.random_range(-PERSONALITY_JITTER..=PERSONALITY_JITTER);
    Personality {
        aggression: base.aggression + jitter(),
        caution: base.caution + jitter(),
        bravery: base.bravery + jitter(),
        friendliness: base.friendliness + jitter(),
        curiosity: base.curiosity + jitter(),
    }
    .clamped()
}

fn clamp_trait(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Something a decision asks the NPC to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Flee,
    Combat,
    Alert,
    Patrol,
    Approach,
    Trade,
    /// Carry on with a routine activity
    Routine(Activity),
}

impl Action {
    /// Activity label that results from acting on this action
    pub fn activity(&self) -> Activity {
        match self {
            Action::Flee => Activity::Fleeing,
            Action::Combat => Activity::Combat,
            Action::Alert => Activity::Alert,
            Action::Patrol => Activity::Patrolling,
            Action::Approach => Activity::Approaching,
            Action::Trade => Activity::Trading,
            Action::Routine(activity) => *activity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Flee => "FLEE",
            Action::Combat => "COMBAT",
            Action::Alert => "ALERT",
            Action::Patrol => "PATROL",
            Action::Approach => "APPROACH",
            Action::Trade => "TRADE",
            Action::Routine(activity) => activity.as_str(),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Accepts action verbs (`FLEE`, `PATROL`, ...) and routine activity labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        let action = match label.as_str() {
            "FLEE" => Action::Flee,
            "COMBAT" | "ATTACK" => Action::Combat,
            "ALERT" => Action::Alert,
            "PATROL" => Action::Patrol,
            "APPROACH" => Action::Approach,
            "TRADE" => Action::Trade,
            other => match other.parse::<Activity>() {
                Ok(activity) if activity.is_threat_driven() || activity.is_player_driven() => {
                    return Err(format!("Activity {} is not a routine action", activity));
                }
                Ok(activity) if activity == Activity::Patrolling => Action::Patrol,
                Ok(activity) => Action::Routine(activity),
                Err(_) => return Err(format!("Unknown action: {}", s)),
            },
        };
        Ok(action)
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionSource {
    Local,
    Remote,
}

/// A prioritized action with its reasoning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub priority: i32,
    pub reasoning: String,
    pub source: DecisionSource,
}

impl Decision {
    pub fn local(action: Action, priority: i32, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            priority,
            reasoning: reasoning.into(),
            source: DecisionSource::Local,
        }
    }

    pub fn remote(action: Action, priority: i32, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            priority,
            reasoning: reasoning.into(),
            source: DecisionSource::Remote,
        }
    }

    /// Whether the executor is allowed to act on this decision
    pub fn is_actionable(&self) -> bool {
        self.priority >= ACTING_PRIORITY
    }
}

/// Quantized key under which decisions are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateSignature {
    pub role: JobRole,
    /// `floor(health / 20) * 20`
    pub health_bucket: u8,
    pub enemy_count: usize,
    pub activity: Activity,
}

impl StateSignature {
    pub fn new(role: JobRole, health: f32, enemy_count: usize, activity: Activity) -> Self {
        Self {
            role,
            health_bucket: health_bucket(health),
            enemy_count,
            activity,
        }
    }
}

/// Health quantized down to a multiple of 20
pub fn health_bucket(health: f32) -> u8 {
    if !health.is_finite() {
        return 0;
    }
    let clamped = health.clamp(0.0, 100.0);
    ((clamped / 20.0).floor() * 20.0) as u8
}

/// Per-NPC decision bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionState {
    pub last_decision: Option<Decision>,
    /// Simulation time of the last decision, in milliseconds
    pub last_decision_ms: Option<u64>,
    pub last_state_key: Option<StateSignature>,
    /// A remote request is in flight
    pub pending_request: bool,
    /// Most recent decision that was below the acting priority
    pub last_considered: Option<Decision>,
}

impl DecisionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least `interval_ms` has passed since the last decision
    pub fn is_due(&self, now_ms: u64, interval_ms: u64) -> bool {
        match self.last_decision_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= interval_ms,
        }
    }

    pub fn record(&mut self, now_ms: u64, signature: StateSignature, decision: Decision) {
        self.last_decision_ms = Some(now_ms);
        self.last_state_key = Some(signature);
        self.last_decision = Some(decision);
    }
}

/// The activity in effect and whether a decision has overridden the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityState {
    pub current: Activity,
    /// What the schedule (or an urgent need) says the NPC should be doing
    pub nominal: Activity,
    /// Priority of the decision currently overriding `nominal`
    pub override_priority: Option<i32>,
    /// Need-driven activity held until the need recovers
    pub urgent: Option<Activity>,
}

impl ActivityState {
    pub fn new(nominal: Activity) -> Self {
        Self {
            current: nominal,
            nominal,
            override_priority: None,
            urgent: None,
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.override_priority.is_some()
    }

    /// Update the nominal activity, following it when not overridden
    ///
    /// Returns the previous activity when `current` changed.
    pub fn set_nominal(&mut self, nominal: Activity) -> Option<Activity> {
        self.nominal = nominal;
        if self.is_overridden() || self.current == nominal {
            return None;
        }
        let previous = self.current;
        self.current = nominal;
        Some(previous)
    }

    /// Impose `activity` on top of the schedule
    pub fn set_override(&mut self, activity: Activity, priority: i32) -> Activity {
        let previous = self.current;
        self.current = activity;
        self.override_priority = Some(priority);
        previous
    }

    /// Drop any override and resume the nominal activity
    ///
    /// Returns the previous activity when `current` changed.
    pub fn release(&mut self) -> Option<Activity> {
        self.override_priority = None;
        if self.current == self.nominal {
            return None;
        }
        let previous = self.current;
        self.current = self.nominal;
        Some(previous)
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new(Activity::Idle)
    }
}
