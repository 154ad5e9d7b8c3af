use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::db::Database;
use crate::error::ParseError;
use crate::models::{Project, TimeEntry};

/// Start a timer on a project.
///
/// A timer that is already running is stopped first, so at most one entry is
/// ever open. Returns the stopped entry (if any) and the new one.
pub fn start_timer(
    db: &Database,
    project: &Project,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(Option<TimeEntry>, TimeEntry)> {
    let stopped = stop_timer(db, now)?;

    let entry = db.start_entry(project.id, description, now)?;
    tracing::info!(entry_id = entry.id, project = %project.name, "timer started");

    Ok((stopped, entry))
}

/// Stop the running timer, if there is one
pub fn stop_timer(db: &Database, now: DateTime<Utc>) -> Result<Option<TimeEntry>> {
    let active = match db.active_entry()? {
        Some(entry) => entry,
        None => return Ok(None),
    };

    let entry = db.finish_entry(active.id, now)?;
    tracing::info!(
        entry_id = entry.id,
        seconds = entry.duration_seconds.unwrap_or(0.0),
        "timer stopped"
    );

    Ok(Some(entry))
}

/// Seconds elapsed on an entry; running entries count up to `now`
pub fn elapsed_seconds(entry: &TimeEntry, now: DateTime<Utc>) -> i64 {
    let end = entry.end_time.unwrap_or(now);
    (end - entry.start_time).num_seconds().max(0)
}

/// Start and end of a manually logged block of `seconds`.
///
/// Without an explicit start the block ends at `now`.
pub fn logged_span(
    seconds: i64,
    start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let length = Duration::try_seconds(seconds)
        .with_context(|| format!("Duration of {} seconds is too long", seconds))?;

    let start = match start {
        Some(start) => start,
        None => now
            .checked_sub_signed(length)
            .with_context(|| format!("Duration of {} seconds reaches before any valid date", seconds))?,
    };
    let end = start
        .checked_add_signed(length)
        .with_context(|| format!("Duration of {} seconds runs past any valid date", seconds))?;

    Ok((start, end))
}

fn duration_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})$").expect("valid regex"),
            Regex::new(r"^(\d+)h\s*(\d+)m$").expect("valid regex"),
            Regex::new(r"^(\d+)m$").expect("valid regex"),
            Regex::new(r"^(\d+)h$").expect("valid regex"),
        ]
    })
}

/// Parse a duration such as `1:30:00`, `1h 30m`, `90m` or `2h` into seconds
pub fn parse_duration(input: &str) -> Result<i64, ParseError> {
    let text = input.trim().to_lowercase();
    let [clock, hours_minutes, minutes, hours] = duration_patterns();
    let num = |caps: &regex::Captures, i: usize| -> Result<i64, ParseError> {
        caps[i]
            .parse::<i64>()
            .map_err(|_| ParseError::Duration(input.to_string()))
    };

    let seconds = |h: i64, m: i64, s: i64| -> Result<i64, ParseError> {
        h.checked_mul(3600)
            .and_then(|total| total.checked_add(m.checked_mul(60)?))
            .and_then(|total| total.checked_add(s))
            .ok_or_else(|| ParseError::Duration(input.to_string()))
    };

    if let Some(caps) = clock.captures(&text) {
        return seconds(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
    }
    if let Some(caps) = hours_minutes.captures(&text) {
        return seconds(num(&caps, 1)?, num(&caps, 2)?, 0);
    }
    if let Some(caps) = minutes.captures(&text) {
        return seconds(0, num(&caps, 1)?, 0);
    }
    if let Some(caps) = hours.captures(&text) {
        return seconds(num(&caps, 1)?, 0, 0);
    }

    Err(ParseError::Duration(input.to_string()))
}

/// Format seconds as `H:MM:SS`
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Format seconds as `Hh Mm`, or `Mm` under an hour
pub fn format_duration_short(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format fractional hours the way reports show them
pub fn format_hours(hours: f64) -> String {
    format_duration_short((hours * 3600.0).round() as i64)
}
