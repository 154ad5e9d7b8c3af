//! Rolling weekly and monthly series.
//!
//! Both windows end at the period containing "now" and ignore the active
//! filter: they are always computed over the full entry collection.

use chrono::{Datelike, Duration, NaiveDateTime};
use std::collections::BTreeSet;

use super::earnings::{percent, safe_div};
use super::range::{shift_months, start_of_week, Period, WeekStart};
use super::span::{Tally, WorkSpan};
use crate::models::{MonthlyComparison, WeeklyTrend};

pub const TREND_WEEKS: i64 = 8;
pub const COMPARISON_MONTHS: i32 = 6;

/// The last eight calendar weeks, oldest first
pub fn weekly_trends(all: &[WorkSpan<'_>], now: NaiveDateTime, week_start: WeekStart) -> Vec<WeeklyTrend> {
    let this_week = start_of_week(now.date(), week_start);

    (0..TREND_WEEKS)
        .rev()
        .map(|weeks_back| {
            let start = this_week - Duration::weeks(weeks_back);
            let period = Period::week(start, week_start);
            let tally = Tally::of(all.iter().filter(|s| period.contains(s.local_start)));

            WeeklyTrend {
                week_start: start.format("%Y-%m-%d").to_string(),
                total_hours: tally.total_hours(),
                billable_hours: tally.billable_hours(),
                earnings: tally.earnings,
                sessions_count: tally.sessions,
                productivity_score: tally.productivity_score(),
            }
        })
        .collect()
}

/// The last six calendar months, oldest first, with month-over-month growth
pub fn monthly_comparison(all: &[WorkSpan<'_>], now: NaiveDateTime) -> Vec<MonthlyComparison> {
    let mut months: Vec<MonthlyComparison> = Vec::with_capacity(COMPARISON_MONTHS as usize);

    for months_back in (0..COMPARISON_MONTHS).rev() {
        let start = shift_months(now.date(), -months_back);
        let period = Period::month(start);
        let in_month: Vec<&WorkSpan> = all.iter().filter(|s| period.contains(s.local_start)).collect();

        let tally = Tally::of(in_month.iter().copied());
        let projects: BTreeSet<i64> = in_month.iter().map(|s| s.entry.project_id).collect();

        let growth_rate = match months.last() {
            Some(prev) if prev.earnings > 0.0 => {
                percent(tally.earnings - prev.earnings, prev.earnings)
            }
            _ => 0.0,
        };

        months.push(MonthlyComparison {
            month: start.format("%b").to_string(),
            year: start.year(),
            total_hours: tally.total_hours(),
            billable_hours: tally.billable_hours(),
            earnings: tally.earnings,
            projects_worked: projects.len(),
            average_hourly_rate: safe_div(tally.earnings, tally.billable_hours()),
            growth_rate,
        });
    }

    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::clock::FixedClock;
    use crate::models::TimeEntry;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, project_id: i64, month: u32, day: u32, hours: f64, rate: f64) -> TimeEntry {
        TimeEntry {
            id,
            project_id,
            project: None,
            description: None,
            start_time: Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap(),
            end_time: None,
            duration_seconds: Some(hours * 3600.0),
            is_billable: true,
            hourly_rate: Some(rate),
        }
    }

    fn now() -> NaiveDateTime {
        Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap().naive_utc()
    }

    fn spans(entries: &[TimeEntry]) -> Vec<WorkSpan<'_>> {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap());
        entries.iter().map(|e| WorkSpan::new(e, None, &clock)).collect()
    }

    #[test]
    fn test_weekly_window() {
        let entries = vec![
            entry(1, 1, 6, 10, 2.0, 50.0),
            // before the window (window starts Sunday April 21)
            entry(2, 1, 4, 20, 5.0, 50.0),
        ];
        let weeks = weekly_trends(&spans(&entries), now(), WeekStart::Sunday);

        assert_eq!(weeks.len(), 8);
        assert_eq!(weeks[0].week_start, "2024-04-21");
        assert_eq!(weeks[7].week_start, "2024-06-09");
        assert_eq!(weeks[7].total_hours, 2.0);
        assert_eq!(weeks[7].earnings, 100.0);
        let total: f64 = weeks.iter().map(|w| w.total_hours).sum();
        assert_eq!(total, 2.0);
    }

    #[test]
    fn test_monthly_growth() {
        let entries = vec![
            entry(1, 1, 4, 10, 2.0, 50.0),
            entry(2, 1, 5, 10, 3.0, 50.0),
            entry(3, 2, 6, 3, 3.0, 50.0),
        ];
        let months = monthly_comparison(&spans(&entries), now());

        assert_eq!(months.len(), 6);
        assert_eq!(months[0].month, "Jan");
        assert_eq!(months[5].month, "Jun");
        assert_eq!(months[5].year, 2024);

        // Jan..Mar empty, Apr 100, May 150, Jun 150
        assert_eq!(months[3].growth_rate, 0.0);
        assert_eq!(months[4].growth_rate, 50.0);
        assert_eq!(months[5].growth_rate, 0.0);
        assert_eq!(months[4].average_hourly_rate, 50.0);
        assert_eq!(months[5].projects_worked, 1);
    }

    #[test]
    fn test_growth_from_zero_is_zero() {
        let entries = vec![entry(1, 1, 6, 3, 3.0, 50.0)];
        let months = monthly_comparison(&spans(&entries), now());
        assert_eq!(months[5].earnings, 150.0);
        assert_eq!(months[5].growth_rate, 0.0);
        assert!(months.iter().all(|m| m.growth_rate.is_finite()));
    }
}
