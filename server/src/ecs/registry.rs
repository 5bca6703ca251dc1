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

//! NPC Registry for mapping between stable NPC ids and ECS runtime handles
//!
//! This module provides bidirectional mapping between:
//! - `EcsEntity`: hecs runtime entity handles (arena slots)
//! - `NpcId`: stable identifiers shared with the spatial world and the
//!   remote decision service
//!
//! Registration order is preserved so every tick visits NPCs in the same
//! order they were populated.

use crate::ecs::EcsEntity;
use crate::ecs::components::NpcId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when registering NPCs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("entity {0:?} is already registered")]
    DuplicateEntity(EcsEntity),

    #[error("NPC id {0} is already registered")]
    DuplicateId(NpcId),
}

/// Registry for mapping between ECS entities and stable NPC ids
#[derive(Debug, Default)]
pub struct NpcRegistry {
    /// Map from NPC id to ECS entity handle
    id_to_entity: HashMap<NpcId, EcsEntity>,

    /// Map from ECS entity handle to NPC id
    entity_to_id: HashMap<EcsEntity, NpcId>,

    /// Registration order
    order: Vec<(NpcId, EcsEntity)>,
}

impl NpcRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping between an ECS entity and its NPC id
    ///
    /// # Arguments
    /// * `entity` - The ECS runtime entity handle
    /// * `id` - The stable id for this NPC
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeded
    /// * `Err(RegistryError)` if either the entity or id is already registered
    pub fn register(&mut self, entity: EcsEntity, id: NpcId) -> Result<(), RegistryError> {
        if self.entity_to_id.contains_key(&entity) {
            return Err(RegistryError::DuplicateEntity(entity));
        }
        if self.id_to_entity.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }

        self.id_to_entity.insert(id, entity);
        self.entity_to_id.insert(entity, id);
        self.order.push((id, entity));

        Ok(())
    }

    /// Look up an ECS entity by its NPC id
    pub fn get_entity(&self, id: NpcId) -> Option<EcsEntity> {
        self.id_to_entity.get(&id).copied()
    }

    /// Look up an NPC id by its ECS entity
    pub fn get_id(&self, entity: EcsEntity) -> Option<NpcId> {
        self.entity_to_id.get(&entity).copied()
    }

    /// Check if an NPC id is registered
    pub fn contains(&self, id: NpcId) -> bool {
        self.id_to_entity.contains_key(&id)
    }

    /// Get the number of registered NPCs
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All registrations in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (NpcId, EcsEntity)> + '_ {
        self.order.iter().copied()
    }

    /// All registered NPC ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = NpcId> + '_ {
        self.order.iter().map(|(id, _)| *id)
    }
}
