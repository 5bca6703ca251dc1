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

//! Daily schedules and the activities they resolve to
//!
//! A [`Schedule`] is an ordered list of hour ranges. A range whose start is
//! greater than its end wraps through midnight. Resolution is first match
//! wins, with [`Activity::Idle`] when nothing matches.

use super::JobRole;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// What an NPC is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    Sleeping,
    Eating,
    Working,
    Resting,
    Socializing,
    Patrolling,
    Idle,
    Combat,
    Alert,
    Fleeing,
    Approaching,
    Trading,
}

impl Activity {
    pub const ALL: [Activity; 12] = [
        Activity::Sleeping,
        Activity::Eating,
        Activity::Working,
        Activity::Resting,
        Activity::Socializing,
        Activity::Patrolling,
        Activity::Idle,
        Activity::Combat,
        Activity::Alert,
        Activity::Fleeing,
        Activity::Approaching,
        Activity::Trading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Sleeping => "SLEEPING",
            Activity::Eating => "EATING",
            Activity::Working => "WORKING",
            Activity::Resting => "RESTING",
            Activity::Socializing => "SOCIALIZING",
            Activity::Patrolling => "PATROLLING",
            Activity::Idle => "IDLE",
            Activity::Combat => "COMBAT",
            Activity::Alert => "ALERT",
            Activity::Fleeing => "FLEEING",
            Activity::Approaching => "APPROACHING",
            Activity::Trading => "TRADING",
        }
    }

    /// Activities imposed by perceived danger
    pub fn is_threat_driven(&self) -> bool {
        matches!(self, Activity::Combat | Activity::Alert | Activity::Fleeing)
    }

    /// Activities imposed by a nearby player
    pub fn is_player_driven(&self) -> bool {
        matches!(self, Activity::Approaching | Activity::Trading)
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown activity: {}", s))
    }
}

/// Errors raised when a schedule table is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("schedule table is empty")]
    Empty,

    #[error("hour range {start}-{end} for {activity} is outside 0-24")]
    HourOutOfRange {
        start: u8,
        end: u8,
        activity: Activity,
    },
}

/// A single `[start, end)` hour range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: u8,
    pub end: u8,
    pub activity: Activity,
}

impl ScheduleEntry {
    pub fn new(start: u8, end: u8, activity: Activity) -> Self {
        Self {
            start,
            end,
            activity,
        }
    }

    /// Whether `hour` falls in this range, honouring midnight wraparound
    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.start > 23 || self.end > 24 {
            return Err(ScheduleError::HourOutOfRange {
                start: self.start,
                end: self.end,
                activity: self.activity,
            });
        }
        Ok(())
    }
}

/// Ordered daily schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build a schedule, rejecting empty tables and impossible hours
    pub fn try_from_entries(entries: Vec<ScheduleEntry>) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self { entries })
    }

    /// Built-in table for a job role
    pub fn for_role(role: JobRole) -> Self {
        use Activity::*;
        let entries = match role {
            JobRole::Guard => vec![
                ScheduleEntry::new(2, 6, Sleeping),
                ScheduleEntry::new(6, 22, Patrolling),
                ScheduleEntry::new(22, 2, Resting),
            ],
            JobRole::Innkeeper => vec![
                ScheduleEntry::new(3, 8, Sleeping),
                ScheduleEntry::new(8, 23, Working),
                ScheduleEntry::new(23, 3, Resting),
            ],
            JobRole::Raider => vec![
                ScheduleEntry::new(8, 16, Sleeping),
                ScheduleEntry::new(16, 8, Patrolling),
            ],
            _ => vec![
                ScheduleEntry::new(22, 6, Sleeping),
                ScheduleEntry::new(6, 7, Eating),
                ScheduleEntry::new(12, 13, Eating),
                ScheduleEntry::new(7, 17, Working),
                ScheduleEntry::new(17, 18, Resting),
                ScheduleEntry::new(18, 19, Eating),
                ScheduleEntry::new(19, 22, Socializing),
            ],
        };
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Activity nominally in effect at `hour`
    pub fn resolve(&self, hour: u8) -> Activity {
        resolve_activity(self, hour)
    }
}

/// First matching range wins; [`Activity::Idle`] when none match
pub fn resolve_activity(schedule: &Schedule, hour: u8) -> Activity {
    schedule
        .entries
        .iter()
        .find(|entry| entry.contains(hour))
        .map(|entry| entry.activity)
        .unwrap_or(Activity::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleeping_only() -> Schedule {
        Schedule::try_from_entries(vec![ScheduleEntry::new(22, 6, Activity::Sleeping)]).unwrap()
    }

    #[test]
    fn test_wrapping_range_matches_after_midnight() {
        assert_eq!(resolve_activity(&sleeping_only(), 2), Activity::Sleeping);
        assert_eq!(resolve_activity(&sleeping_only(), 22), Activity::Sleeping);
        assert_eq!(resolve_activity(&sleeping_only(), 0), Activity::Sleeping);
    }

    #[test]
    fn test_wrapping_range_excludes_daytime() {
        assert_ne!(resolve_activity(&sleeping_only(), 10), Activity::Sleeping);
        assert_eq!(resolve_activity(&sleeping_only(), 6), Activity::Idle);
    }

    #[test]
    fn test_non_wrapping_range_is_half_open() {
        let schedule =
            Schedule::try_from_entries(vec![ScheduleEntry::new(7, 17, Activity::Working)]).unwrap();
        assert_eq!(schedule.resolve(6), Activity::Idle);
        assert_eq!(schedule.resolve(7), Activity::Working);
        assert_eq!(schedule.resolve(16), Activity::Working);
        assert_eq!(schedule.resolve(17), Activity::Idle);
    }

    #[test]
    fn test_first_match_wins() {
        let schedule = Schedule::for_role(JobRole::Farmer);
        assert_eq!(schedule.resolve(12), Activity::Eating);
        assert_eq!(schedule.resolve(9), Activity::Working);
        assert_eq!(schedule.resolve(20), Activity::Socializing);
        assert_eq!(schedule.resolve(23), Activity::Sleeping);
    }

    #[test]
    fn test_guard_patrols_instead_of_working() {
        let schedule = Schedule::for_role(JobRole::Guard);
        for hour in 6..22 {
            assert_eq!(schedule.resolve(hour), Activity::Patrolling);
        }
        assert_eq!(schedule.resolve(23), Activity::Resting);
        assert_eq!(schedule.resolve(1), Activity::Resting);
        assert_eq!(schedule.resolve(3), Activity::Sleeping);
    }

    #[test]
    fn test_innkeeper_works_late() {
        let schedule = Schedule::for_role(JobRole::Innkeeper);
        assert_eq!(schedule.resolve(22), Activity::Working);
        assert_eq!(schedule.resolve(23), Activity::Resting);
        assert_eq!(schedule.resolve(4), Activity::Sleeping);
    }

    #[test]
    fn test_every_role_covers_the_whole_day() {
        for role in JobRole::ALL {
            let schedule = Schedule::for_role(role);
            for hour in 0..24 {
                assert_ne!(
                    schedule.resolve(hour),
                    Activity::Idle,
                    "{} idle at {}",
                    role,
                    hour
                );
            }
        }
    }

    #[test]
    fn test_malformed_tables_are_rejected() {
        assert_eq!(Schedule::try_from_entries(vec![]), Err(ScheduleError::Empty));
        assert!(matches!(
            Schedule::try_from_entries(vec![ScheduleEntry::new(25, 3, Activity::Working)]),
            Err(ScheduleError::HourOutOfRange { .. })
        ));
    }

    #[test]
    fn test_activity_labels_parse() {
        assert_eq!("patrolling".parse::<Activity>().unwrap(), Activity::Patrolling);
        assert!("DANCING".parse::<Activity>().is_err());
        assert!(Activity::Combat.is_threat_driven());
        assert!(Activity::Trading.is_player_driven());
        assert!(!Activity::Working.is_threat_driven());
    }
}
