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

//! Remote decision provider implementations

use super::types::{RemoteConfig, RemoteDecision, RemoteError};
use async_trait::async_trait;
use townsfolk_common::{DECISION_PATH, DecisionRequest, DecisionResponse, HEALTH_PATH, HealthResponse};

/// Trait for remote decision providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Ask the service what an NPC should do
    async fn decide(&self, request: DecisionRequest) -> Result<RemoteDecision, RemoteError>;

    /// Check if the service is up and ready to answer
    async fn is_available(&self) -> bool;

    /// Get provider name
    fn name(&self) -> &'static str;
}

/// HTTP provider speaking the `/npc-decision` + `/health` protocol
pub struct HttpDecisionProvider {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl HttpDecisionProvider {
    /// Create a new HTTP provider
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            return Err(RemoteError::ConfigError(format!(
                "Endpoint must be an http(s) URL: {}",
                config.endpoint
            )));
        }
        if config.timeout_ms == 0 {
            return Err(RemoteError::ConfigError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RemoteError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn map_send_error(&self, error: reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::Timeout(self.config.timeout_ms)
        } else {
            RemoteError::NetworkError(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl DecisionProvider for HttpDecisionProvider {
    async fn decide(&self, request: DecisionRequest) -> Result<RemoteDecision, RemoteError> {
        let response = self
            .client
            .post(self.config.url(DECISION_PATH))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let decision_response: DecisionResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(format!("Failed to parse response: {}", e)))?;

        let payload = decision_response
            .into_payload()
            .map_err(RemoteError::Malformed)?;

        RemoteDecision::try_from(payload)
    }

    async fn is_available(&self) -> bool {
        let response = match self.client.get(self.config.url(HEALTH_PATH)).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };
        match response.json::<HealthResponse>().await {
            Ok(health) => health.is_ready(),
            Err(e) => {
                tracing::debug!("Unreadable health response: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}
