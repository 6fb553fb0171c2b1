use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Formats an instant in the reminder timezone, e.g. "Friday, March 07 at 07:00 PM".
pub fn format_datetime(dt: &DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%A, %B %d at %I:%M %p").to_string()
}

/// Whole hours from `now` until `deadline`, rounded to the nearest hour.
pub fn hours_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> i64 {
    let minutes = (deadline - now).num_minutes();
    (minutes + 30).div_euclid(60)
}
