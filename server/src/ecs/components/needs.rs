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

//! Physical and social needs

use super::Activity;
use serde::{Deserialize, Serialize};
use townsfolk_common::NeedsSnapshot;

/// Lower bound of every need
pub const NEED_MIN: f32 = 0.0;

/// Upper bound of every need
pub const NEED_MAX: f32 = 100.0;

/// A need below this level overrides the schedule
pub const URGENT_THRESHOLD: f32 = 15.0;

/// An urgent need keeps its override until it climbs back to this level
pub const RECOVERED_THRESHOLD: f32 = 60.0;

/// Per-second change applied to (hunger, energy, social)
#[derive(Debug, Clone, Copy, PartialEq)]
struct NeedRates {
    hunger: f32,
    energy: f32,
    social: f32,
}

const BASE_DECAY: NeedRates = NeedRates {
    hunger: -0.15,
    energy: -0.10,
    social: -0.08,
};

fn activity_rates(activity: Activity) -> NeedRates {
    match activity {
        Activity::Working => NeedRates {
            hunger: -0.17,
            energy: -0.10,
            social: 0.0,
        },
        Activity::Sleeping => NeedRates {
            hunger: 0.10,
            energy: 0.70,
            social: 0.0,
        },
        Activity::Eating => NeedRates {
            hunger: 1.50,
            energy: 0.05,
            social: 0.10,
        },
        Activity::Resting => NeedRates {
            hunger: 0.0,
            energy: 0.25,
            social: 0.0,
        },
        Activity::Socializing | Activity::Trading | Activity::Approaching => NeedRates {
            hunger: 0.0,
            energy: 0.0,
            social: 0.35,
        },
        Activity::Combat | Activity::Fleeing => NeedRates {
            hunger: -0.05,
            energy: -0.30,
            social: 0.0,
        },
        Activity::Patrolling | Activity::Alert => NeedRates {
            hunger: 0.0,
            energy: -0.05,
            social: 0.0,
        },
        Activity::Idle => NeedRates {
            hunger: 0.0,
            energy: 0.0,
            social: 0.0,
        },
    }
}

/// Hunger, energy and social satisfaction, each in `[0, 100]`
///
/// Higher is better: a hunger of 100 means fully fed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub energy: f32,
    pub social: f32,
}

impl Needs {
    pub fn new(hunger: f32, energy: f32, social: f32) -> Self {
        Self {
            hunger: clamp_need(hunger),
            energy: clamp_need(energy),
            social: clamp_need(social),
        }
    }

    /// Apply `dt` seconds of decay and regeneration for `activity`
    pub fn update(&mut self, activity: Activity, dt: f32) {
        *self = update_needs(*self, activity, dt);
    }

    /// The most pressing need, if any has dropped below the urgent threshold
    ///
    /// Hunger outranks energy, which outranks social.
    pub fn urgent_activity(&self) -> Option<Activity> {
        if self.hunger < URGENT_THRESHOLD {
            Some(Activity::Eating)
        } else if self.energy < URGENT_THRESHOLD {
            Some(Activity::Sleeping)
        } else if self.social < URGENT_THRESHOLD {
            Some(Activity::Socializing)
        } else {
            None
        }
    }

    /// Like [`Self::urgent_activity`], but keeps `held` while its need is
    /// still below [`RECOVERED_THRESHOLD`]
    pub fn pressing_activity(&self, held: Option<Activity>) -> Option<Activity> {
        match held.and_then(|activity| self.level_for(activity).map(|level| (activity, level))) {
            Some((activity, level)) if level < RECOVERED_THRESHOLD => Some(activity),
            _ => self.urgent_activity(),
        }
    }

    /// The need an activity restores
    fn level_for(&self, activity: Activity) -> Option<f32> {
        match activity {
            Activity::Eating => Some(self.hunger),
            Activity::Sleeping => Some(self.energy),
            Activity::Socializing => Some(self.social),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> NeedsSnapshot {
        NeedsSnapshot {
            hunger: self.hunger,
            energy: self.energy,
            social: self.social,
        }
    }
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: NEED_MAX,
            energy: NEED_MAX,
            social: NEED_MAX,
        }
    }
}

/// Pure form of [`Needs::update`]
pub fn update_needs(needs: Needs, activity: Activity, dt: f32) -> Needs {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let rates = activity_rates(activity);
    Needs {
        hunger: clamp_need(needs.hunger + (BASE_DECAY.hunger + rates.hunger) * dt),
        energy: clamp_need(needs.energy + (BASE_DECAY.energy + rates.energy) * dt),
        social: clamp_need(needs.social + (BASE_DECAY.social + rates.social) * dt),
    }
}

fn clamp_need(value: f32) -> f32 {
    if value.is_nan() {
        return NEED_MIN;
    }
    value.clamp(NEED_MIN, NEED_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_stay_in_range_for_every_activity() {
        let starts = [0.0, 0.5, 14.9, 50.0, 99.5, 100.0];
        let steps = [0.0, 0.2, 1.0, 60.0, 10_000.0];
        for activity in Activity::ALL {
            for &start in &starts {
                for &dt in &steps {
                    let out = update_needs(Needs::new(start, start, start), activity, dt);
                    for value in [out.hunger, out.energy, out.social] {
                        assert!(
                            (NEED_MIN..=NEED_MAX).contains(&value),
                            "{} from {} over {}s gave {}",
                            activity,
                            start,
                            dt,
                            value
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_constructor_clamps() {
        let needs = Needs::new(-5.0, 250.0, f32::NAN);
        assert_eq!(needs.hunger, 0.0);
        assert_eq!(needs.energy, 100.0);
        assert_eq!(needs.social, 0.0);
    }

    #[test]
    fn test_working_burns_hunger_faster_than_idle() {
        let start = Needs::new(80.0, 80.0, 80.0);
        let working = update_needs(start, Activity::Working, 10.0);
        let idle = update_needs(start, Activity::Idle, 10.0);
        assert!(working.hunger < idle.hunger);
    }

    #[test]
    fn test_sleeping_restores_energy() {
        let mut needs = Needs::new(80.0, 20.0, 80.0);
        needs.update(Activity::Sleeping, 10.0);
        assert!(needs.energy > 20.0);
    }

    #[test]
    fn test_socializing_restores_social() {
        let mut needs = Needs::new(80.0, 80.0, 20.0);
        needs.update(Activity::Socializing, 10.0);
        assert!(needs.social > 20.0);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let start = Needs::new(50.0, 50.0, 50.0);
        assert_eq!(update_needs(start, Activity::Working, -3.0), start);
    }

    #[test]
    fn test_pressing_activity_holds_until_recovered() {
        let hungry = Needs::new(10.0, 80.0, 80.0);
        assert_eq!(hungry.pressing_activity(None), Some(Activity::Eating));

        let eating = Needs::new(40.0, 80.0, 80.0);
        assert_eq!(eating.urgent_activity(), None);
        assert_eq!(
            eating.pressing_activity(Some(Activity::Eating)),
            Some(Activity::Eating)
        );

        let fed = Needs::new(RECOVERED_THRESHOLD, 80.0, 80.0);
        assert_eq!(fed.pressing_activity(Some(Activity::Eating)), None);
    }

    #[test]
    fn test_pressing_activity_yields_to_a_new_urgency() {
        // recovered hunger hands over to exhaustion
        let tired = Needs::new(70.0, 10.0, 80.0);
        assert_eq!(
            tired.pressing_activity(Some(Activity::Eating)),
            Some(Activity::Sleeping)
        );
        // a non-need activity is never held
        assert_eq!(
            Needs::default().pressing_activity(Some(Activity::Working)),
            None
        );
    }

    #[test]
    fn test_urgent_activity_ordering() {
        assert_eq!(Needs::default().urgent_activity(), None);
        assert_eq!(
            Needs::new(10.0, 10.0, 10.0).urgent_activity(),
            Some(Activity::Eating)
        );
        assert_eq!(
            Needs::new(50.0, 10.0, 10.0).urgent_activity(),
            Some(Activity::Sleeping)
        );
        assert_eq!(
            Needs::new(50.0, 50.0, 10.0).urgent_activity(),
            Some(Activity::Socializing)
        );
    }
}
