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

//! Movement system for straight-line steering toward a destination

use crate::ecs::components::{Activity, Motion};

/// A destination closer than this counts as reached
pub const ARRIVAL_DISTANCE: f32 = 0.5;

/// Speed multiplier while fleeing or fighting
pub const HASTE_MULTIPLIER: f32 = 1.5;

pub struct MovementSystem {
    move_speed: f32,
}

impl MovementSystem {
    /// Create a new movement system walking at `move_speed` units per second
    pub fn new(move_speed: f32) -> Self {
        Self {
            move_speed: move_speed.max(0.0),
        }
    }

    pub fn speed_for(&self, activity: Activity) -> f32 {
        match activity {
            Activity::Fleeing | Activity::Combat => self.move_speed * HASTE_MULTIPLIER,
            _ => self.move_speed,
        }
    }

    /// Advance `motion` toward its destination for `dt` seconds
    ///
    /// Returns `true` when the entity moved. The destination is cleared on
    /// arrival; there is no obstacle avoidance.
    pub fn step(&self, motion: &mut Motion, activity: Activity, dt: f32) -> bool {
        let Some(destination) = motion.destination else {
            return false;
        };

        let delta = destination - motion.position;
        let distance = delta.length();
        if distance < ARRIVAL_DISTANCE {
            motion.destination = None;
            return false;
        }

        if !(dt > 0.0) {
            return false;
        }

        let travel = (self.speed_for(activity) * dt).min(distance);
        motion.face(destination);
        motion.position += delta / distance * travel;

        if motion.distance_to(destination) < ARRIVAL_DISTANCE {
            motion.destination = None;
        }
        travel > 0.0
    }
}
