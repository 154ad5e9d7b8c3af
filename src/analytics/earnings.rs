//! Numeric helpers shared by every aggregation pass.
//!
//! Anything that is not a finite, non-negative number is treated as zero so
//! that no NaN or infinity ever reaches a report.

use crate::models::TimeEntry;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Clamp non-finite and negative values to zero
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Pin a result into the finite range; NaN becomes zero
pub fn finite(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

/// Add two non-negative amounts, saturating at `f64::MAX` instead of
/// overflowing to infinity
pub fn saturating_add(total: f64, amount: f64) -> f64 {
    finite(total + amount).max(0.0)
}

/// Worked seconds for an entry; open entries without a duration count as zero
pub fn entry_seconds(entry: &TimeEntry) -> f64 {
    entry.duration_seconds.map(non_negative).unwrap_or(0.0)
}

fn usable_rate(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| r.is_finite() && *r > 0.0)
}

/// Rate applied to an entry: entry override, then project rate, then the
/// user's default rate, then zero.
pub fn effective_rate(entry: &TimeEntry, default_rate: Option<f64>) -> f64 {
    usable_rate(entry.hourly_rate)
        .or_else(|| usable_rate(entry.project.as_ref().and_then(|p| p.hourly_rate)))
        .or_else(|| usable_rate(default_rate))
        .unwrap_or(0.0)
}

/// Earnings for a single entry; non-billable entries earn nothing
pub fn entry_earnings(entry: &TimeEntry, default_rate: Option<f64>) -> f64 {
    if !entry.is_billable {
        return 0.0;
    }
    let hours = entry_seconds(entry) / SECONDS_PER_HOUR;
    finite(hours * effective_rate(entry, default_rate)).max(0.0)
}

/// `numerator / denominator`, or zero when the denominator is not positive.
/// Quotients too large for an `f64` saturate.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() {
        finite(numerator / denominator)
    } else {
        0.0
    }
}

/// `part / whole * 100`, zero when `whole` is zero
pub fn percent(part: f64, whole: f64) -> f64 {
    finite(safe_div(part, whole) * 100.0)
}
