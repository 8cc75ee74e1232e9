//! Time context and date helpers.
//!
//! "Now" is always read through a `Clock` and handed to the code that needs
//! it, so the repository and the derived views stay pure and testable.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta, Timelike, Utc, Weekday};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Greeting for the hour of `now`.
pub fn greeting(now: &DateTime<Local>) -> &'static str {
    match now.hour() {
        0..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        _ => "Good Evening",
    }
}

/// Long date, e.g. "Saturday, June 15, 2024".
pub fn format_long_date(now: &DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

pub fn format_clock(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}

/// Short local timestamp for created/completed stamps.
pub fn format_stamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %H:%M").to_string()
}

/// Default export file name for the given day.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("todo-tasks-{}.json", today.format("%Y-%m-%d"))
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => match (d - today).num_days() {
            0 => "today".into(),
            1 => "tomorrow".into(),
            n if n > 1 => format!("in {n}d"),
            n => format!("{}d late", -n),
        },
    }
}

/// Parse a due date typed by a person.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - weekday names ("fri", "friday", "next friday")
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "" => return None,
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        // Out-of-range offsets are rejected rather than clamped.
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return TimeDelta::try_days(n).and_then(|d| today.checked_add_signed(d));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return TimeDelta::try_weeks(n).and_then(|d| today.checked_add_signed(d));
        }
    }

    let (next_week, name) = match s.strip_prefix("next ") {
        Some(name) => (true, name.trim()),
        None => (false, s.strip_prefix("this ").unwrap_or(s.as_str()).trim()),
    };
    if let Some(target) = parse_weekday(name) {
        let ahead = (7 + target.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            % 7;
        let ahead = if next_week { ahead + 7 } else { ahead };
        return today.checked_add_signed(TimeDelta::days(ahead));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
