//! Document mutations. Every operation takes the current document by value
//! and returns the next one; invalid input returns it unchanged. Callers are
//! expected to validate and give feedback before invoking, so nothing here
//! signals an error.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ulid::Ulid;

use crate::document::TrackerDocument;
use crate::habit::Habit;
use crate::weight::{Milestone, MilestoneKind, WeightLog};

pub(crate) fn fresh_id() -> String {
    Ulid::new().to_string()
}

/// Flip the check for `habit_id` on `date`. The date bucket is created
/// lazily and the key removed again on untoggle.
pub fn toggle_check(mut doc: TrackerDocument, date: NaiveDate, habit_id: &str) -> TrackerDocument {
    let bucket = doc.habit_checks.entry(date).or_default();
    let was_checked = bucket.remove(habit_id).unwrap_or(false);
    if !was_checked {
        bucket.insert(habit_id.to_string(), true);
    }
    doc
}

/// Add a habit. Whitespace-only names are rejected; an empty or full day
/// selection normalizes to "every day".
pub fn add_habit(
    mut doc: TrackerDocument,
    name: &str,
    active_days: Option<BTreeSet<u8>>,
) -> TrackerDocument {
    let name = name.trim();
    if name.is_empty() {
        return doc;
    }
    let active_days = active_days
        .map(|days| days.into_iter().filter(|day| *day < 7).collect::<BTreeSet<u8>>())
        .filter(|days| !days.is_empty() && days.len() < 7);
    doc.habits.push(Habit {
        id: fresh_id(),
        name: name.to_string(),
        active_days,
        discontinued: false,
    });
    doc
}

/// Discontinue or reactivate. Checks and skip logic are untouched.
pub fn set_discontinued(
    mut doc: TrackerDocument,
    habit_id: &str,
    discontinued: bool,
) -> TrackerDocument {
    if let Some(habit) = doc.habits.iter_mut().find(|h| h.id == habit_id) {
        habit.discontinued = discontinued;
    }
    doc
}

/// Remove the habit and purge its completion history, dropping date buckets
/// that end up empty.
pub fn delete_habit(mut doc: TrackerDocument, habit_id: &str) -> TrackerDocument {
    doc.habits.retain(|habit| habit.id != habit_id);
    for bucket in doc.habit_checks.values_mut() {
        bucket.remove(habit_id);
    }
    doc.habit_checks.retain(|_, bucket| !bucket.is_empty());
    doc
}

/// Record a weight reading. Non-finite or non-positive values are ignored.
pub fn add_weight_log(
    mut doc: TrackerDocument,
    date: NaiveDate,
    weight_kg: f64,
) -> TrackerDocument {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return doc;
    }
    doc.weight_logs.push(WeightLog {
        id: fresh_id(),
        date,
        weight_kg,
    });
    doc
}

/// Remove a log by id; no-op when absent.
pub fn delete_weight_log(mut doc: TrackerDocument, log_id: &str) -> TrackerDocument {
    doc.weight_logs.retain(|log| log.id != log_id);
    doc
}

/// Add a custom milestone. Empty labels and non-finite or non-positive
/// targets are ignored.
pub fn add_milestone(mut doc: TrackerDocument, label: &str, target_kg: f64) -> TrackerDocument {
    let label = label.trim();
    if label.is_empty() || !target_kg.is_finite() || target_kg <= 0.0 {
        return doc;
    }
    doc.milestones.push(Milestone {
        id: fresh_id(),
        label: label.to_string(),
        target_kg,
        kind: MilestoneKind::Custom,
    });
    doc
}

/// Remove a milestone by id; no-op when absent.
pub fn delete_milestone(mut doc: TrackerDocument, id: &str) -> TrackerDocument {
    doc.milestones.retain(|milestone| milestone.id != id);
    doc
}

/// Excuse every habit on `date`.
pub fn add_skip_date(mut doc: TrackerDocument, date: NaiveDate) -> TrackerDocument {
    doc.skip_dates.insert(date, true);
    doc
}

pub fn remove_skip_date(mut doc: TrackerDocument, date: NaiveDate) -> TrackerDocument {
    doc.skip_dates.remove(&date);
    doc
}
