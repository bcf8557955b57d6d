use chrono::{Datelike, Duration, Local, NaiveDate};

/// Current local calendar date. The only place the core reads the wall clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday (or Sunday) on or before `date`.
///
/// Week-start math runs on the 0=Sunday..6=Saturday numbering. With a Monday
/// start, Sunday shifts back six days rather than forward one, so a Sunday
/// still lands in the week that began the previous Monday.
pub fn start_of_week(date: NaiveDate, week_starts_monday: bool) -> NaiveDate {
    let day = i64::from(date.weekday().num_days_from_sunday());
    let diff = if week_starts_monday {
        if day == 0 {
            -6
        } else {
            1 - day
        }
    } else {
        -day
    };
    date + Duration::days(diff)
}

/// The seven dates of `date`'s Monday-first week, in order.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let start = start_of_week(date, true);
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

/// Weekday index with Monday=0 .. Sunday=6, the numbering habit activity
/// masks use. Keep it apart from the Sunday-based numbering inside
/// `start_of_week`; the two must never be mixed.
pub fn weekday_index_monday_first(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

// Monday-first, to match `weekday_index_monday_first`.
const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fixed English three-letter weekday, display only.
pub fn format_short_day(date: NaiveDate) -> &'static str {
    DAY_NAMES[weekday_index_monday_first(date) as usize]
}

/// Fixed English "7 Aug" style date, display only. Ordering always goes
/// through `NaiveDate` itself, never through a formatted string.
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{} {}", date.day(), MONTH_NAMES[date.month0() as usize])
}
