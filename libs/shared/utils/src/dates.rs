//! Date handling for `YYYY-MM-DD` strings without timezone round-trips.
//!
//! All calendar math here decomposes the string into year/month/day
//! integers and works on those directly. Routing a date-only string
//! through a UTC-normalizing parse shifts the apparent weekday near
//! midnight in non-UTC locales; nothing in this module touches UTC.

use chrono::{Datelike, Local, NaiveDate, Weekday};

const WEEKDAYS_ES: [&str; 7] = [
    "domingo",
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
];

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Parse a strict `YYYY-MM-DD` string into a calendar date.
/// Rejects malformed strings and impossible dates (e.g. `2024-02-31`).
pub fn parse_ymd(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    let year: i32 = value.get(0..4)?.parse().ok()?;
    let month: u32 = value.get(5..7)?.parse().ok()?;
    let day: u32 = value.get(8..10)?.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn is_valid_date_string(value: &str) -> bool {
    parse_ymd(value).is_some()
}

/// Day of week for a calendar date, 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Today's date as `YYYY-MM-DD` in the server's local calendar.
pub fn today_string() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Human-readable Spanish date for notification emails,
/// e.g. `"martes, 30 enero 2024"`.
pub fn format_display_es(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_ES[day_of_week(date) as usize];
    let month = MONTHS_ES[(date.month() - 1) as usize];
    format!("{}, {} {} {}", weekday, date.day(), month, date.year())
}
