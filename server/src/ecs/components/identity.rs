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

//! Identity components for NPC identification and description

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a simulated character
///
/// Unlike the `hecs::Entity` handle, which is an arena slot, this id is what
/// the spatial world, the remote decision service and the event bus use to
/// talk about an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(pub Uuid);

impl NpcId {
    /// Create a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NpcId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NpcId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<NpcId> for Uuid {
    fn from(id: NpcId) -> Self {
        id.0
    }
}

impl std::fmt::Display for NpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of an NPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub display: String,
}

impl Name {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npc_id_round_trips_uuid() {
        let uuid = Uuid::new_v4();
        let id = NpcId::from_uuid(uuid);
        assert_eq!(id.uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_npc_ids_are_unique() {
        assert_ne!(NpcId::new(), NpcId::new());
    }

    #[test]
    fn test_name_display() {
        let name = Name::new("Ironsmith #1");
        assert_eq!(name.to_string(), "Ironsmith #1");
    }
}
