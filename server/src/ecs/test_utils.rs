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

use crate::ecs::components::{
    ActivityState, Anchors, Health, JobRole, Motion, Needs, Npc, NpcId, Personality,
};
use crate::ecs::{EcsEntity, GameWorld};
use glam::Vec3;

pub fn create_test_world() -> GameWorld {
    GameWorld::new()
}

/// Spawn a bare NPC with the role's base personality at `position`
pub fn spawn_test_npc(world: &mut GameWorld, role: JobRole, position: Vec3) -> EcsEntity {
    world.spawn((
        NpcId::new(),
        Npc::new(role),
        Health::default(),
        Personality::base_profile(role),
        Needs::default(),
        ActivityState::default(),
        Motion::at(position),
        Anchors::new(position, position),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_world() {
        let world = create_test_world();
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_spawn_npc() {
        let mut world = create_test_world();
        let entity = spawn_test_npc(&mut world, JobRole::Guard, Vec3::new(1.0, 0.0, 2.0));

        assert!(world.get::<&NpcId>(entity).is_ok());
        assert_eq!(
            world.get::<&Motion>(entity).map(|m| m.position).ok(),
            Some(Vec3::new(1.0, 0.0, 2.0))
        );
        assert_eq!(
            world.get::<&Npc>(entity).map(|n| n.role).ok(),
            Some(JobRole::Guard)
        );
    }
}
