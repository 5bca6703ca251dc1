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

//! Remote decision service integration
//!
//! The service is optional. When it is not configured, unreachable, slow or
//! returns nonsense, NPCs fall back to local decisions.

mod manager;
mod providers;
mod types;

pub use manager::RemoteDecisionClient;
pub use providers::{DecisionProvider, HttpDecisionProvider};
#[cfg(test)]
pub use providers::MockDecisionProvider;
pub use types::{RemoteConfig, RemoteDecision, RemoteError, RemoteOutcome};
