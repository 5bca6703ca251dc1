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

//! Common types for remote decision integration

use crate::ecs::components::{Action, NpcId, StateSignature};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use townsfolk_common::DecisionPayload;

/// Remote decision error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Service answered with a non-success status
    #[error("API error: {0}")]
    ApiError(String),
    /// No answer within the configured bound
    #[error("Timeout after {0} ms")]
    Timeout(u64),
    /// Answer could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Remote decision service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. `http://localhost:5000`
    pub endpoint: String,
    /// Upper bound on a single request, in milliseconds
    pub timeout_ms: u64,
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: 2000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Join the base URL with an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}

/// A validated suggestion from the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDecision {
    pub action: Action,
    /// `None` when the service did not attach a priority
    pub priority: Option<i32>,
    pub reasoning: Option<String>,
}

impl TryFrom<DecisionPayload> for RemoteDecision {
    type Error = RemoteError;

    fn try_from(payload: DecisionPayload) -> Result<Self, Self::Error> {
        let action = payload
            .action
            .parse::<Action>()
            .map_err(RemoteError::Malformed)?;
        Ok(Self {
            action,
            priority: payload.priority,
            reasoning: payload.reasoning,
        })
    }
}

/// Result of one dispatched request, delivered to the decision engine
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOutcome {
    pub npc: NpcId,
    /// Signature captured when the request was sent
    pub signature: StateSignature,
    pub result: Result<RemoteDecision, RemoteError>,
}
