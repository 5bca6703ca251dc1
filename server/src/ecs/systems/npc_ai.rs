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

//! Decision engine producing prioritized actions for NPCs
//!
//! Every decision cycle follows the same path:
//!
//! 1. Quantize the NPC's situation into a [`StateSignature`].
//! 2. Return a cached remote decision for that signature if it is still
//!    fresh.
//! 3. Otherwise dispatch a remote request (at most one per NPC in flight)
//!    and answer this cycle with the local heuristic.
//!
//! Remote answers arrive on later ticks through [`DecisionEngine::drain_remote`]
//! and are cached under the signature captured when the request was sent.

use crate::config::DecisionConfig;
use crate::ecs::components::{
    Action, Activity, Decision, DecisionState, JobRole, NpcId, Personality, StateSignature,
};
use crate::ecs::context::ContextAwareness;
use crate::remote::{RemoteDecision, RemoteDecisionClient, RemoteError};
use metrics::counter;
use moka::sync::Cache;
use townsfolk_common::DecisionRequest;

/// Everything the heuristic looks at for one NPC
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub role: JobRole,
    pub health: f32,
    pub personality: &'a Personality,
    pub context: &'a ContextAwareness,
    /// Activity currently in effect
    pub activity: Activity,
    /// Activity the schedule (or an urgent need) asks for
    pub nominal: Activity,
}

impl DecisionInput<'_> {
    pub fn signature(&self) -> StateSignature {
        StateSignature::new(
            self.role,
            self.health,
            self.context.enemies.len(),
            self.activity,
        )
    }
}

/// Deterministic fallback heuristic, first matching rule wins
pub fn local_decision(input: &DecisionInput<'_>) -> Decision {
    let threat = input.context.threat_level;
    let personality = input.personality;

    if input.health < 30.0 && personality.bravery < 0.7 {
        return Decision::local(Action::Flee, 10, "low health retreat");
    }
    if threat > 60 && input.role.is_combatant() {
        return Decision::local(Action::Combat, 9, "engaging hostiles");
    }
    if threat > 40 {
        if personality.aggression > 0.6 {
            return Decision::local(Action::Combat, 8, "aggressive response to threat");
        }
        return Decision::local(Action::Alert, 7, "threat detected, holding");
    }
    if threat < 20 {
        if input.context.player_nearby() {
            if personality.friendliness > 0.6 {
                return if input.role.is_merchant() {
                    Decision::local(Action::Trade, 6, "offering wares to player")
                } else {
                    Decision::local(Action::Approach, 6, "greeting player")
                };
            }
            return Decision::local(Action::Patrol, 4, "keeping distance from player");
        }
        let action = match input.nominal {
            Activity::Idle | Activity::Patrolling => Action::Patrol,
            nominal => Action::Routine(nominal),
        };
        return Decision::local(action, 3, "following routine");
    }
    Decision::local(Action::Patrol, 5, "staying watchful")
}

#[derive(Debug, Clone)]
struct CachedDecision {
    decision: Decision,
    timestamp_ms: u64,
}

/// Signature keyed decision cache with a logical TTL
///
/// Expiry is measured in simulation milliseconds so replays and tests are
/// independent of wall time. The moka capacity bound keeps memory flat when
/// many distinct signatures are seen.
pub struct DecisionCache {
    entries: Cache<StateSignature, CachedDecision>,
    ttl_ms: u64,
}

impl DecisionCache {
    pub fn new(capacity: u64, ttl_ms: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
            ttl_ms,
        }
    }

    /// Fresh entry for `signature`, evicting it when stale
    pub fn get(&self, signature: &StateSignature, now_ms: u64) -> Option<Decision> {
        let cached = self.entries.get(signature)?;
        if now_ms.saturating_sub(cached.timestamp_ms) < self.ttl_ms {
            Some(cached.decision)
        } else {
            self.entries.invalidate(signature);
            None
        }
    }

    pub fn insert(&self, signature: StateSignature, decision: Decision, now_ms: u64) {
        self.entries.insert(
            signature,
            CachedDecision {
                decision,
                timestamp_ms: now_ms,
            },
        );
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

/// A remote answer taken off the result queue
#[derive(Debug)]
pub struct RemoteResult {
    pub npc: NpcId,
    /// Signature captured when the request was sent
    pub signature: StateSignature,
    pub result: Result<Decision, RemoteError>,
}

/// Produces decisions, consulting the cache and the remote service
pub struct DecisionEngine {
    cache: DecisionCache,
    remote: Option<RemoteDecisionClient>,
    combat_interval_ms: u64,
    peaceful_interval_ms: u64,
    remote_default_priority: i32,
}

impl DecisionEngine {
    /// Create an engine; `remote` of `None` runs in local-only mode
    pub fn new(config: &DecisionConfig, remote: Option<RemoteDecisionClient>) -> Self {
        Self {
            cache: DecisionCache::new(config.cache_capacity, config.cache_ttl_ms),
            remote,
            combat_interval_ms: config.combat_interval_ms,
            peaceful_interval_ms: config.peaceful_interval_ms,
            remote_default_priority: config.remote_default_priority,
        }
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    pub fn remote(&self) -> Option<&RemoteDecisionClient> {
        self.remote.as_ref()
    }

    /// How long an NPC waits between decisions while doing `activity`
    pub fn decision_interval(&self, activity: Activity) -> u64 {
        if activity == Activity::Combat {
            self.combat_interval_ms
        } else {
            self.peaceful_interval_ms
        }
    }

    /// Produce a decision for one NPC
    ///
    /// `request` is only invoked when a remote request is actually sent.
    /// Never fails: remote trouble degrades to the local heuristic.
    pub fn decide<F>(
        &mut self,
        npc: NpcId,
        input: &DecisionInput<'_>,
        state: &mut DecisionState,
        now_ms: u64,
        request: F,
    ) -> Decision
    where
        F: FnOnce() -> DecisionRequest,
    {
        let signature = input.signature();

        if let Some(decision) = self.cache.get(&signature, now_ms) {
            counter!("npc.decision.cache.hits").increment(1);
            state.record(now_ms, signature, decision.clone());
            return decision;
        }
        counter!("npc.decision.cache.misses").increment(1);

        if let Some(remote) = &self.remote {
            if remote.is_available() && !state.pending_request {
                state.pending_request = true;
                remote.dispatch(npc, signature, request());
            }
        }

        let decision = local_decision(input);
        counter!("npc.decision.local").increment(1);
        tracing::debug!(
            "NPC {} decided {} (priority {}): {}",
            npc,
            decision.action,
            decision.priority,
            decision.reasoning
        );
        state.record(now_ms, signature, decision.clone());
        decision
    }

    /// Take every remote answer that arrived since the last drain
    ///
    /// Successful answers are cached under their request-time signature.
    /// The caller is responsible for clearing each NPC's pending flag.
    pub fn drain_remote(&mut self, now_ms: u64) -> Vec<RemoteResult> {
        let Some(remote) = self.remote.as_mut() else {
            return Vec::new();
        };

        let mut results = Vec::new();
        for outcome in remote.drain() {
            let result = match outcome.result {
                Ok(answer) => {
                    let decision = self.to_decision(answer);
                    self.cache.insert(outcome.signature, decision.clone(), now_ms);
                    counter!("npc.decision.remote.accepted").increment(1);
                    Ok(decision)
                }
                Err(e) => {
                    counter!("npc.decision.remote.failures").increment(1);
                    tracing::warn!("Remote decision for NPC {} failed: {}", outcome.npc, e);
                    Err(e)
                }
            };
            results.push(RemoteResult {
                npc: outcome.npc,
                signature: outcome.signature,
                result,
            });
        }
        results
    }

    fn to_decision(&self, answer: RemoteDecision) -> Decision {
        Decision::remote(
            answer.action,
            answer.priority.unwrap_or(self.remote_default_priority),
            answer
                .reasoning
                .unwrap_or_else(|| "remote suggestion".to_string()),
        )
    }
}
