use chrono::NaiveDate;

use crate::document::{checked, HabitChecks, TrackerDocument};
use crate::habit::{is_skip_date, Habit, SkipDates};

/// Aggregated completion for one week across all live habits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekTotals {
    pub possible: u32,
    pub actual: u32,
    /// Checks landed per week date, skip days forced to zero. Chart feed,
    /// same length and order as the week passed in.
    pub per_day: Vec<u32>,
}

/// Consecutive days with a check, walking back one calendar day at a time
/// from `end`. Zero when `end` itself is unchecked.
///
/// Counts raw check presence only: an unchecked skip day or off-schedule
/// weekday still ends the run. Users read a streak as "days in a row I did
/// the thing", so scheduling does not soften it.
pub fn streak(checks: &HabitChecks, habit_id: &str, end: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = end;
    while checked(checks, day, habit_id) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Possible/actual check counts over `week`, restricted to dates on or before
/// `today`, plus the per-date series. Discontinued habits never count; a skip
/// day contributes nothing and its series slot stays zero whatever was
/// recorded on it.
pub fn week_totals(doc: &TrackerDocument, week: &[NaiveDate], today: NaiveDate) -> WeekTotals {
    let mut totals = WeekTotals {
        per_day: vec![0; week.len()],
        ..WeekTotals::default()
    };
    for (slot, &date) in week.iter().enumerate() {
        if date > today || is_skip_date(&doc.skip_dates, date) {
            continue;
        }
        for habit in doc.habits.iter().filter(|h| !h.discontinued) {
            if !habit.is_scheduled_on(date, &doc.skip_dates) {
                continue;
            }
            totals.possible += 1;
            if doc.is_checked(date, &habit.id) {
                totals.actual += 1;
                totals.per_day[slot] += 1;
            }
        }
    }
    totals
}

/// Whole-percent completion, or None when nothing was possible. Zero possible
/// means "no data", never 0%.
pub fn completion_percent(totals: &WeekTotals) -> Option<u8> {
    if totals.possible == 0 {
        return None;
    }
    Some((f64::from(totals.actual) / f64::from(totals.possible) * 100.0).round() as u8)
}

/// Done/possible counts for one habit over an entire week, ignoring how far
/// into the week today is. Feeds the weekly grid's "n/m" badge.
pub fn habit_week_completion(
    habit: &Habit,
    week: &[NaiveDate],
    checks: &HabitChecks,
    skip_dates: &SkipDates,
) -> (u32, u32) {
    let mut done = 0;
    let mut possible = 0;
    for &date in week {
        if !habit.is_scheduled_on(date, skip_dates) {
            continue;
        }
        possible += 1;
        if checked(checks, date, &habit.id) {
            done += 1;
        }
    }
    (done, possible)
}

/// Live habits with a running streak ending today, longest first.
pub fn top_streaks(doc: &TrackerDocument, today: NaiveDate, count: usize) -> Vec<(Habit, u32)> {
    let mut ranked: Vec<(Habit, u32)> = doc
        .habits
        .iter()
        .filter(|habit| !habit.discontinued)
        .map(|habit| {
            let days = streak(&doc.habit_checks, &habit.id, today);
            (habit.clone(), days)
        })
        .filter(|(_, days)| *days > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(count);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str, active_days: Option<&[u8]>) -> Habit {
        Habit {
            id: id.to_string(),
            name: id.to_string(),
            active_days: active_days.map(|days| days.iter().copied().collect()),
            discontinued: false,
        }
    }

    fn check(doc: &mut TrackerDocument, d: NaiveDate, habit_id: &str) {
        doc.habit_checks
            .entry(d)
            .or_default()
            .insert(habit_id.to_string(), true);
    }

    #[test]
    fn streak_is_zero_without_a_check_on_the_end_date() {
        let mut doc = TrackerDocument::default();
        check(&mut doc, date(2025, 10, 21), "h1");
        // Nothing on the 22nd, so the run on the 21st does not count.
        assert_eq!(streak(&doc.habit_checks, "h1", date(2025, 10, 22)), 0);
    }

    #[test]
    fn streak_counts_back_until_the_first_gap() {
        let mut doc = TrackerDocument::default();
        let end = date(2025, 10, 22);
        for offset in 0..4 {
            check(&mut doc, end - Duration::days(offset), "h1");
        }
        // Gap on the 17th, then one more check further back.
        check(&mut doc, date(2025, 10, 16), "h1");
        assert_eq!(streak(&doc.habit_checks, "h1", end), 4);
    }

    #[test]
    fn streak_breaks_on_an_unchecked_skip_day() {
        let mut doc = TrackerDocument::default();
        check(&mut doc, date(2025, 10, 22), "h1");
        check(&mut doc, date(2025, 10, 20), "h1");
        // The 21st is a skip day with no check; the streak still stops there.
        doc.skip_dates.insert(date(2025, 10, 21), true);
        assert_eq!(streak(&doc.habit_checks, "h1", date(2025, 10, 22)), 1);
    }

    #[test]
    fn week_totals_cover_monday_through_today() {
        let mut doc = TrackerDocument::default();
        doc.habits.push(habit("h1", None));
        let monday = date(2025, 10, 20);
        let today = date(2025, 10, 22); // Wednesday
        for offset in 0..3 {
            check(&mut doc, monday + Duration::days(offset), "h1");
        }

        let week: Vec<NaiveDate> = (0..7).map(|o| monday + Duration::days(o)).collect();
        let totals = week_totals(&doc, &week, today);
        assert_eq!(totals.possible, 3);
        assert_eq!(totals.actual, 3);
        assert_eq!(completion_percent(&totals), Some(100));
        assert_eq!(totals.per_day, vec![1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(streak(&doc.habit_checks, "h1", today), 3);
    }

    #[test]
    fn a_skip_day_removes_the_date_from_the_totals() {
        let mut doc = TrackerDocument::default();
        doc.habits.push(habit("h1", None));
        let monday = date(2025, 10, 20);
        let today = date(2025, 10, 22);
        for offset in 0..3 {
            check(&mut doc, monday + Duration::days(offset), "h1");
        }
        doc.skip_dates.insert(today, true);

        let week: Vec<NaiveDate> = (0..7).map(|o| monday + Duration::days(o)).collect();
        let totals = week_totals(&doc, &week, today);
        // Wednesday no longer counts, checked or not.
        assert_eq!(totals.possible, 2);
        assert_eq!(totals.actual, 2);
        assert_eq!(totals.per_day, vec![1, 1, 0, 0, 0, 0, 0]);
        assert!(!doc.habits[0].is_scheduled_on(today, &doc.skip_dates));
    }

    #[test]
    fn discontinued_habits_and_dangling_checks_are_ignored() {
        let mut doc = TrackerDocument::default();
        doc.habits.push(habit("h1", None));
        doc.habits.push(Habit {
            discontinued: true,
            ..habit("h2", None)
        });
        let monday = date(2025, 10, 20);
        check(&mut doc, monday, "h1");
        check(&mut doc, monday, "h2");
        check(&mut doc, monday, "gone"); // no such habit anymore

        let week: Vec<NaiveDate> = (0..7).map(|o| monday + Duration::days(o)).collect();
        let totals = week_totals(&doc, &week, monday);
        assert_eq!(totals.possible, 1);
        assert_eq!(totals.actual, 1);
    }

    #[test]
    fn no_possible_days_means_no_percentage() {
        let totals = WeekTotals::default();
        assert_eq!(completion_percent(&totals), None);
    }

    #[test]
    fn habit_week_completion_respects_mask_and_skips() {
        let h = habit("h1", Some(&[0, 1, 2, 3, 4])); // Mon..Fri
        let monday = date(2025, 10, 20);
        let week: Vec<NaiveDate> = (0..7).map(|o| monday + Duration::days(o)).collect();

        let mut checks = HabitChecks::new();
        checks
            .entry(monday)
            .or_default()
            .insert("h1".to_string(), true);

        let mut skips = SkipDates::new();
        skips.insert(date(2025, 10, 24), true); // Friday excused

        let (done, possible) = habit_week_completion(&h, &week, &checks, &skips);
        assert_eq!(done, 1);
        assert_eq!(possible, 4);
    }

    #[test]
    fn top_streaks_rank_longest_first_and_drop_zero() {
        let mut doc = TrackerDocument::default();
        doc.habits.push(habit("short", None));
        doc.habits.push(habit("long", None));
        doc.habits.push(habit("none", None));
        let today = date(2025, 10, 22);
        check(&mut doc, today, "short");
        for offset in 0..5 {
            check(&mut doc, today - Duration::days(offset), "long");
        }

        let ranked = top_streaks(&doc, today, 3);
        let ids: Vec<&str> = ranked.iter().map(|(h, _)| h.id.as_str()).collect();
        assert_eq!(ids, vec!["long", "short"]);
        assert_eq!(ranked[0].1, 5);
    }
}
