use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Dates on which tracking is suspended for every habit, whatever its own
/// activity mask says.
pub type SkipDates = BTreeMap<NaiveDate, bool>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    /// Monday-first weekday indices (0..=6) the habit is tracked on.
    /// Absent means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_days: Option<BTreeSet<u8>>,
    #[serde(default)]
    pub discontinued: bool,
}

impl Habit {
    /// Membership test against the activity mask, Monday-first numbering.
    pub fn is_active_on(&self, weekday_monday_first: u8) -> bool {
        match &self.active_days {
            Some(days) => days.contains(&weekday_monday_first),
            None => true,
        }
    }

    /// Schedulable on `date`: an active weekday that is not a document-wide
    /// skip day. Discontinuation is the caller's concern, not this check's.
    pub fn is_scheduled_on(&self, date: NaiveDate, skip_dates: &SkipDates) -> bool {
        self.is_active_on(calendar::weekday_index_monday_first(date))
            && !is_skip_date(skip_dates, date)
    }
}

/// A date is excused only while present with a true flag.
pub fn is_skip_date(skip_dates: &SkipDates, date: NaiveDate) -> bool {
    skip_dates.get(&date).copied().unwrap_or(false)
}
