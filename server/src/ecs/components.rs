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

//! ECS Components
//!
//! Components are pure data attached to NPC entities. Systems in
//! [`crate::ecs::systems`] own all behavior.

mod ai;
mod identity;
mod needs;
mod npc;
mod schedule;
mod spatial;

// Re-export all components
pub use ai::*;
pub use identity::*;
pub use needs::*;
pub use npc::*;
pub use schedule::*;
pub use spatial::*;
