use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

/// One body-weight reading. Several logs may share a date; identity is `id`,
/// assigned when the log is created. Logs stored before ids existed are
/// repaired at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightLog {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    /// User-authored and persisted.
    Custom,
    /// Generated from the current weight on demand, never persisted.
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub label: String,
    pub target_kg: f64,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
}

/// Latest and previous readings with their signed difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightChange {
    pub diff: f64,
    pub latest: f64,
    pub prev: f64,
}

/// The log with the maximum date. The first-inserted log wins a date tie, so
/// re-logging the same day does not displace the reading already shown.
pub fn latest_weight(logs: &[WeightLog]) -> Option<&WeightLog> {
    let (first, rest) = logs.split_first()?;
    let mut best = first;
    for log in rest {
        if log.date > best.date {
            best = log;
        }
    }
    Some(best)
}

/// Difference between the two highest-date logs. Stable descending sort, so
/// date ties resolve by insertion order. None with fewer than two logs.
pub fn weight_change(logs: &[WeightLog]) -> Option<WeightChange> {
    if logs.len() < 2 {
        return None;
    }
    let mut sorted: Vec<&WeightLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    let latest = sorted[0].weight_kg;
    let prev = sorted[1].weight_kg;
    Some(WeightChange {
        diff: latest - prev,
        latest,
        prev,
    })
}

/// Kilograms still above `target_kg`, rounded to one decimal. Exactly zero
/// once the target is met or passed.
pub fn kg_to_go(current: f64, target_kg: f64) -> f64 {
    if current <= target_kg {
        return 0.0;
    }
    round1(current - target_kg)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Synthetic "auto" milestones every `step_kg`, counting down from `start_kg`
/// to `end_kg` inclusive. Ids derive from the target value, so regenerating
/// with the same inputs yields the same ids.
pub fn generate_milestone_bands(start_kg: f64, end_kg: f64, step_kg: f64) -> Vec<Milestone> {
    let mut bands = Vec::new();
    if !(step_kg > 0.0) || !start_kg.is_finite() || !end_kg.is_finite() {
        return bands;
    }
    let mut kg = start_kg;
    while kg >= end_kg {
        bands.push(Milestone {
            id: format!("band-{kg}"),
            label: format!("{kg}kg milestone"),
            target_kg: kg,
            kind: MilestoneKind::Auto,
        });
        kg -= step_kg;
    }
    bands
}

/// Union keyed by target weight, heaviest first. A custom entry always beats
/// a band at the same target; among customs the later entry wins.
pub fn merge_milestones(custom: &[Milestone], bands: &[Milestone]) -> Vec<Milestone> {
    let mut merged: Vec<Milestone> = Vec::new();
    for milestone in custom {
        match merged
            .iter_mut()
            .find(|m| same_target(m.target_kg, milestone.target_kg))
        {
            Some(existing) => *existing = milestone.clone(),
            None => merged.push(milestone.clone()),
        }
    }
    for band in bands {
        if !merged
            .iter()
            .any(|m| same_target(m.target_kg, band.target_kg))
        {
            merged.push(band.clone());
        }
    }
    merged.sort_by(|a, b| b.target_kg.total_cmp(&a.target_kg));
    merged
}

fn same_target(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// The `count` targets still below `current`, closest first. Empty when the
/// current weight is unknown.
pub fn next_milestones(
    current: Option<f64>,
    milestones: &[Milestone],
    count: usize,
) -> Vec<Milestone> {
    let Some(current) = current else {
        return Vec::new();
    };
    let mut below: Vec<Milestone> = milestones
        .iter()
        .filter(|m| m.target_kg < current)
        .cloned()
        .collect();
    below.sort_by(|a, b| b.target_kg.total_cmp(&a.target_kg));
    below.truncate(count);
    below
}
