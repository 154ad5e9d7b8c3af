use chrono::Timelike;
use std::collections::BTreeMap;

use super::earnings::{percent, safe_div, saturating_add, SECONDS_PER_HOUR};
use super::span::WorkSpan;
use crate::models::TimePattern;

#[derive(Default)]
struct HourBucket {
    sessions: usize,
    billable_sessions: usize,
    seconds: f64,
}

/// Hour-of-day histogram over the filtered entries.
///
/// Only hours with at least one entry are listed, in ascending order.
/// `average_productivity` is the share of billable *entries* in the hour,
/// not the share of billable time.
pub fn hourly_patterns(spans: &[WorkSpan<'_>]) -> Vec<TimePattern> {
    let mut hours: BTreeMap<u32, HourBucket> = BTreeMap::new();

    for span in spans {
        let bucket = hours.entry(span.local_start.hour()).or_default();
        bucket.sessions += 1;
        bucket.seconds = saturating_add(bucket.seconds, span.seconds);
        if span.entry.is_billable {
            bucket.billable_sessions += 1;
        }
    }

    hours
        .into_iter()
        .map(|(hour, bucket)| TimePattern {
            hour,
            average_productivity: percent(bucket.billable_sessions as f64, bucket.sessions as f64),
            total_sessions: bucket.sessions,
            average_session_length: safe_div(bucket.seconds, bucket.sessions as f64) / SECONDS_PER_HOUR,
        })
        .collect()
}
