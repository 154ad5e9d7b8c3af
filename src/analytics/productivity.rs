//! Headline productivity numbers over the filtered entries.

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

use super::earnings::{safe_div, saturating_add};
use super::range::WeekStart;
use super::span::{Tally, WorkSpan};
use super::trends;
use crate::models::{DailyAverage, ProductivityMetrics};

pub const PEAK_HOURS: usize = 3;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Build the productivity snapshot.
///
/// `filtered` drives the totals, peak hours and weekday averages; the weekly
/// and monthly series always look at `all` entries.
pub fn compute_metrics(
    filtered: &[WorkSpan<'_>],
    all: &[WorkSpan<'_>],
    now: NaiveDateTime,
    week_start: WeekStart,
) -> ProductivityMetrics {
    let totals = Tally::of(filtered);

    ProductivityMetrics {
        total_hours: totals.total_hours(),
        billable_hours: totals.billable_hours(),
        productivity_rate: totals.productivity_score(),
        average_session_length: safe_div(totals.total_hours(), totals.sessions as f64),
        peak_productivity_hours: peak_hours(filtered),
        daily_averages: daily_averages(filtered),
        weekly_trends: trends::weekly_trends(all, now, week_start),
        monthly_comparison: trends::monthly_comparison(all, now),
    }
}

/// Hours of day with the most tracked time, busiest first.
///
/// Ties go to the earlier hour.
pub fn peak_hours(spans: &[WorkSpan<'_>]) -> Vec<u32> {
    let mut by_hour: BTreeMap<u32, f64> = BTreeMap::new();
    for span in spans {
        let seconds = by_hour.entry(span.local_start.hour()).or_insert(0.0);
        *seconds = saturating_add(*seconds, span.seconds);
    }

    let mut ranked: Vec<(u32, f64)> = by_hour.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(PEAK_HOURS)
        .map(|(hour, _)| hour)
        .collect()
}

/// One row per weekday, Sunday first, zero-filled
pub fn daily_averages(spans: &[WorkSpan<'_>]) -> Vec<DailyAverage> {
    let mut days = [Tally::default(); 7];
    for span in spans {
        let day = span.local_start.weekday().num_days_from_sunday() as usize;
        days[day].add(span);
    }

    days.iter()
        .zip(DAY_NAMES)
        .enumerate()
        .map(|(day, (tally, name))| DailyAverage {
            day_of_week: day as u32,
            day_name: name.to_string(),
            average_hours: tally.total_hours(),
            average_sessions: tally.sessions,
            productivity_score: tally.productivity_score(),
        })
        .collect()
}
