//! Productivity and earnings analytics over time entries.
//!
//! Everything in here is a pure function of the entries, the filter, the
//! options and the clock. Degenerate input (no entries, zero hours, missing
//! projects, bad numbers) resolves to zeros and sentinel rows, never to an
//! error.

pub mod clock;
pub mod earnings;
pub mod filter;
pub mod patterns;
pub mod productivity;
pub mod range;
pub mod rollup;
pub mod span;
pub mod trends;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::AnalyticsFilter;
pub use range::{DateRange, Period, WeekStart};

use crate::models::{ClientAnalytics, ProductivityMetrics, ProjectAnalytics, TimeEntry, TimePattern};
use span::WorkSpan;

/// User-level settings the aggregation depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    pub default_hourly_rate: Option<f64>,
    pub week_starts_on: WeekStart,
}

/// Complete analytics snapshot for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub period: Period,
    pub metrics: ProductivityMetrics,
    pub projects: Vec<ProjectAnalytics>,
    pub clients: Vec<ClientAnalytics>,
    pub hourly_patterns: Vec<TimePattern>,
}

/// Resolve the filter's date range against the clock
pub fn resolve_period(filter: &AnalyticsFilter, options: &AnalyticsOptions, clock: &impl Clock) -> Period {
    range::resolve(
        filter.date_range,
        filter.start_date,
        filter.end_date,
        clock.local_now(),
        options.week_starts_on,
    )
}

/// Entries matching the filter, in input order
pub fn filter_entries<'a>(
    entries: &'a [TimeEntry],
    filter: &AnalyticsFilter,
    options: &AnalyticsOptions,
    clock: &impl Clock,
) -> Vec<&'a TimeEntry> {
    let period = resolve_period(filter, options, clock);
    entries
        .iter()
        .filter(|e| filter.matches(&WorkSpan::new(e, options.default_hourly_rate, clock), &period))
        .collect()
}

/// Compute the full analytics snapshot
pub fn compute_analytics(
    entries: &[TimeEntry],
    filter: &AnalyticsFilter,
    options: &AnalyticsOptions,
    clock: &impl Clock,
) -> AnalyticsReport {
    let period = resolve_period(filter, options, clock);

    let all: Vec<WorkSpan> = entries
        .iter()
        .map(|e| WorkSpan::new(e, options.default_hourly_rate, clock))
        .collect();
    let filtered = filter::apply(&all, filter, &period);

    tracing::debug!(
        range = ?filter.date_range,
        start = %period.start,
        end = %period.end,
        total = all.len(),
        kept = filtered.len(),
        "computing analytics"
    );

    let metrics = productivity::compute_metrics(&filtered, &all, clock.local_now(), options.week_starts_on);
    let projects = rollup::project_rollups(&filtered);
    let clients = rollup::client_rollups(&filtered, &projects);
    let hourly_patterns = patterns::hourly_patterns(&filtered);

    AnalyticsReport {
        period,
        metrics,
        projects,
        clients,
        hourly_patterns,
    }
}
