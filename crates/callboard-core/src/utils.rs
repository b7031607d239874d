//! Presentation helpers for phone numbers and times

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Offset, Timelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\+\d{2})(\d{3})(\d{3})(\d{4})").ok());

const SHORT_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Group a `+CCAAABBBCCCC` number as `+CC AAA BBB CCCC`
///
/// Only the first match is rewritten; anything else is returned unchanged.
#[must_use]
pub fn format_phone(phone: &str) -> String {
    match PHONE_PATTERN.as_ref() {
        Some(re) => re.replacen(phone, 1, "$1 $2 $3 $4").into_owned(),
        None => phone.to_string(),
    }
}

/// Build the display offset, falling back to UTC for out-of-range values
#[must_use]
pub fn display_offset(utc_offset_minutes: i32) -> FixedOffset {
    utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Render a start time as `"15 mar 2024, 14:25"`
///
/// Timestamps carrying an offset are shifted into `offset`; naive timestamps
/// are taken as wall-clock time already. Unparsable input is returned as is.
#[must_use]
pub fn format_start_time(value: &str, offset: FixedOffset) -> String {
    let trimmed = value.trim();

    let local = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&offset).naive_local())
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        });

    local.map_or_else(|| value.to_string(), |dt| render_date(&dt))
}

/// Render epoch seconds as `"HH:MM:SS"` in `offset`
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_timestamp(seconds: f64, offset: FixedOffset) -> String {
    if !seconds.is_finite() {
        return "--:--:--".to_string();
    }

    DateTime::from_timestamp(seconds.floor() as i64, 0).map_or_else(
        || "--:--:--".to_string(),
        |dt| dt.with_timezone(&offset).format("%H:%M:%S").to_string(),
    )
}

/// Format a duration in seconds as `m:ss`, or a dash for ongoing calls
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(duration: Option<f64>) -> String {
    match duration {
        Some(secs) if secs.is_finite() && secs >= 0.0 => {
            let total = secs.round() as u64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "-".to_string(),
    }
}

fn render_date(dt: &NaiveDateTime) -> String {
    let month = usize::try_from(dt.month0())
        .ok()
        .and_then(|i| SHORT_MONTHS.get(i))
        .copied()
        .unwrap_or("?");

    format!(
        "{} {month} {}, {:02}:{:02}",
        dt.day(),
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}
