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

//! Fire-and-forget dispatch of remote decision requests
//!
//! Requests run as tasks on a tokio runtime and never block the caller.
//! Every request produces exactly one [`RemoteOutcome`] on an internal
//! queue, which the decision engine drains at the top of each tick.

use super::providers::{DecisionProvider, HttpDecisionProvider};
use super::types::{RemoteConfig, RemoteError, RemoteOutcome};
use crate::ecs::components::{NpcId, StateSignature};
use metrics::counter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use townsfolk_common::DecisionRequest;

/// Client for the remote decision service
pub struct RemoteDecisionClient {
    provider: Arc<dyn DecisionProvider>,
    available: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    runtime: Handle,
    timeout: Duration,
    sender: mpsc::UnboundedSender<RemoteOutcome>,
    receiver: mpsc::UnboundedReceiver<RemoteOutcome>,
}

impl RemoteDecisionClient {
    /// Create a client around any provider
    ///
    /// The service is considered unavailable until a health check succeeds.
    pub fn new(provider: Arc<dyn DecisionProvider>, timeout: Duration, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            provider,
            available: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            runtime,
            timeout,
            sender,
            receiver,
        }
    }

    /// Create a client for the HTTP service described by `config`
    pub fn from_config(config: RemoteConfig, runtime: Handle) -> Result<Self, RemoteError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let provider = HttpDecisionProvider::new(config)?;
        Ok(Self::new(Arc::new(provider), timeout, runtime))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Whether the last health check succeeded
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Override the availability flag without probing
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Number of dispatched requests that have not produced an outcome yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Probe the service once and record the result
    pub async fn check_health(&self) -> bool {
        probe(self.provider.as_ref(), &self.available, self.timeout).await
    }

    /// Re-probe the service every `interval` until the runtime shuts down
    pub fn spawn_health_monitor(&self, interval: Duration) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let available = Arc::clone(&self.available);
        let timeout = self.timeout;
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                probe(provider.as_ref(), &available, timeout).await;
            }
        })
    }

    /// Send a request without waiting for it
    ///
    /// The outcome, success or failure, is queued for [`Self::drain`].
    pub fn dispatch(&self, npc: NpcId, signature: StateSignature, request: DecisionRequest) {
        counter!("npc.decision.remote.requests").increment(1);
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let provider = Arc::clone(&self.provider);
        let in_flight = Arc::clone(&self.in_flight);
        let sender = self.sender.clone();
        let timeout = self.timeout;

        self.runtime.spawn(async move {
            let result = match tokio::time::timeout(timeout, provider.decide(request)).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(timeout.as_millis() as u64)),
            };
            in_flight.fetch_sub(1, Ordering::AcqRel);
            if sender
                .send(RemoteOutcome {
                    npc,
                    signature,
                    result,
                })
                .is_err()
            {
                tracing::debug!("Remote outcome for NPC {} dropped, client is gone", npc);
            }
        });
    }

    /// Take every outcome that has arrived so far
    pub fn drain(&mut self) -> Vec<RemoteOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }
}

async fn probe(provider: &dyn DecisionProvider, available: &AtomicBool, timeout: Duration) -> bool {
    let ready = tokio::time::timeout(timeout, provider.is_available())
        .await
        .unwrap_or(false);
    let was = available.swap(ready, Ordering::AcqRel);
    if ready != was {
        if ready {
            tracing::info!("Remote decision service ({}) is available", provider.name());
        } else {
            tracing::info!(
                "Remote decision service ({}) is unavailable, using local decisions",
                provider.name()
            );
        }
    }
    ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Action, Activity, JobRole};
    use crate::remote::providers::MockDecisionProvider;
    use crate::remote::types::RemoteDecision;
    use async_trait::async_trait;
    use townsfolk_common::{
        EnvironmentSnapshot, GameContextSnapshot, NeedsSnapshot, NpcStateSnapshot,
        PersonalitySnapshot, PositionSnapshot,
    };

    fn request(id: NpcId) -> DecisionRequest {
        DecisionRequest {
            state: NpcStateSnapshot {
                id: id.uuid(),
                role: "GUARD".into(),
                health: 80.0,
                activity: "PATROLLING".into(),
                position: PositionSnapshot::default(),
                personality: PersonalitySnapshot::default(),
                needs: NeedsSnapshot::default(),
                recent_events: Vec::new(),
            },
            context: GameContextSnapshot {
                time_of_day: 12,
                threat_level: 0,
                nearby_players: Vec::new(),
                nearby_enemies: 0,
                nearby_allies: 0,
                environment: EnvironmentSnapshot {
                    location: "Watch House".into(),
                    lighting: "bright".into(),
                },
            },
        }
    }

    fn signature() -> StateSignature {
        StateSignature::new(JobRole::Guard, 80.0, 0, Activity::Patrolling)
    }

    async fn wait_for_outcomes(client: &mut RemoteDecisionClient) -> Vec<RemoteOutcome> {
        for _ in 0..1000 {
            let outcomes = client.drain();
            if !outcomes.is_empty() {
                return outcomes;
            }
            tokio::task::yield_now().await;
        }
        Vec::new()
    }

    #[tokio::test]
    async fn test_health_check_sets_availability() {
        let mut mock = MockDecisionProvider::new();
        mock.expect_is_available().times(1).returning(|| true);
        mock.expect_name().returning(|| "mock");

        let client = RemoteDecisionClient::new(
            Arc::new(mock),
            Duration::from_millis(100),
            Handle::current(),
        );
        assert!(!client.is_available());
        assert!(client.check_health().await);
        assert!(client.is_available());
    }

    #[tokio::test]
    async fn test_dispatch_delivers_outcome() {
        let mut mock = MockDecisionProvider::new();
        mock.expect_decide().times(1).returning(|_| {
            Ok(RemoteDecision {
                action: Action::Combat,
                priority: Some(9),
                reasoning: Some("raiders".into()),
            })
        });

        let mut client = RemoteDecisionClient::new(
            Arc::new(mock),
            Duration::from_millis(100),
            Handle::current(),
        );
        let npc = NpcId::new();
        client.dispatch(npc, signature(), request(npc));

        let outcomes = wait_for_outcomes(&mut client).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].npc, npc);
        assert_eq!(outcomes[0].signature, signature());
        assert_eq!(
            outcomes[0].result.as_ref().map(|d| d.action),
            Ok(Action::Combat)
        );
        assert_eq!(client.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_is_delivered_as_outcome() {
        let mut mock = MockDecisionProvider::new();
        mock.expect_decide()
            .returning(|_| Err(RemoteError::NetworkError("connection refused".into())));

        let mut client = RemoteDecisionClient::new(
            Arc::new(mock),
            Duration::from_millis(100),
            Handle::current(),
        );
        let npc = NpcId::new();
        client.dispatch(npc, signature(), request(npc));

        let outcomes = wait_for_outcomes(&mut client).await;
        assert!(matches!(
            outcomes[0].result,
            Err(RemoteError::NetworkError(_))
        ));
    }

    struct SlowProvider;

    #[async_trait]
    impl DecisionProvider for SlowProvider {
        async fn decide(&self, _request: DecisionRequest) -> Result<RemoteDecision, RemoteError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(RemoteError::ApiError("unreachable".into()))
        }

        async fn is_available(&self) -> bool {
            tokio::time::sleep(Duration::from_secs(60)).await;
            true
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_service_times_out() {
        let mut client = RemoteDecisionClient::new(
            Arc::new(SlowProvider),
            Duration::from_millis(2000),
            Handle::current(),
        );
        let npc = NpcId::new();
        client.dispatch(npc, signature(), request(npc));
        assert_eq!(client.in_flight(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let outcomes = client.drain();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].result, Err(RemoteError::Timeout(2000)));

        assert!(!client.check_health().await);
        assert!(!client.is_available());
    }
}
