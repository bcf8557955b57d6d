use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::{Habit, SkipDates};
use crate::weight::{Milestone, WeightLog};

/// Per-date check buckets: date -> habit id -> presence. A check exists only
/// while its key is present; untoggling removes the key instead of storing
/// false.
pub type HabitChecks = BTreeMap<NaiveDate, BTreeMap<String, bool>>;

/// The whole tracked state. Derivations read it, mutations return a new one;
/// nothing in this crate holds on to a document between calls.
///
/// `skip_dates` is the only top-level field tolerated absent in stored data;
/// the other four must be present with the right shape or loading falls back
/// to the default document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerDocument {
    pub habits: Vec<Habit>,
    pub habit_checks: HabitChecks,
    #[serde(default)]
    pub skip_dates: SkipDates,
    pub weight_logs: Vec<WeightLog>,
    pub milestones: Vec<Milestone>,
}

impl TrackerDocument {
    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    /// True when `habit_id` has a check recorded for `date`.
    pub fn is_checked(&self, date: NaiveDate, habit_id: &str) -> bool {
        checked(&self.habit_checks, date, habit_id)
    }
}

/// Check presence lookup against a raw bucket map.
pub fn checked(checks: &HabitChecks, date: NaiveDate, habit_id: &str) -> bool {
    checks
        .get(&date)
        .and_then(|bucket| bucket.get(habit_id))
        .copied()
        .unwrap_or(false)
}
