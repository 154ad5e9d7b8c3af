//! End-to-end tests for `compute_analytics`

use super::*;
use crate::models::{ClientInfo, ProjectInfo, ProjectStatus, TimeEntry};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    // Wednesday
    Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::utc(now())
}

fn project(id: i64, rate: Option<f64>, client: Option<i64>) -> ProjectInfo {
    ProjectInfo {
        id,
        name: format!("Project {}", id),
        hourly_rate: rate,
        budget: None,
        status: ProjectStatus::Active,
        client: client.map(|id| ClientInfo {
            id,
            name: format!("Client {}", id),
        }),
    }
}

fn entry(id: i64, project: ProjectInfo, start: DateTime<Utc>, hours: f64, billable: bool) -> TimeEntry {
    let seconds = hours * 3600.0;
    TimeEntry {
        id,
        project_id: project.id,
        project: Some(project),
        description: None,
        start_time: start,
        end_time: Some(start + Duration::seconds(seconds as i64)),
        duration_seconds: Some(seconds),
        is_billable: billable,
        hourly_rate: None,
    }
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
}

fn scenario() -> Vec<TimeEntry> {
    let a = project(1, Some(50.0), Some(10));
    let b = project(2, Some(100.0), Some(20));
    vec![
        entry(3, b, day(10, 14), 3.0, true),
        entry(2, a.clone(), day(5, 11), 1.0, false),
        entry(1, a, day(3, 9), 2.0, true),
    ]
}

#[test]
fn test_three_entry_scenario() {
    let entries = scenario();
    let report = compute_analytics(&entries, &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock());

    assert_eq!(report.metrics.total_hours, 6.0);
    assert_eq!(report.metrics.billable_hours, 5.0);
    assert!((report.metrics.productivity_rate - 83.333).abs() < 0.01);
    assert_eq!(report.metrics.average_session_length, 2.0);

    let ids: Vec<i64> = report.projects.iter().map(|p| p.project_id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(report.projects[0].earnings, 300.0);
    assert_eq!(report.projects[1].earnings, 100.0);
    assert_eq!(report.projects[1].profitability, 2.0 / 3.0 * 100.0);

    assert_eq!(report.clients.len(), 2);
    assert_eq!(report.clients[0].client_name, "Client 20");
    assert_eq!(report.clients[1].projects.len(), 1);
}

#[test]
fn test_empty_entries_are_all_zero() {
    let report = compute_analytics(&[], &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock());

    assert_eq!(report.metrics.total_hours, 0.0);
    assert_eq!(report.metrics.productivity_rate, 0.0);
    assert_eq!(report.metrics.average_session_length, 0.0);
    assert!(report.metrics.peak_productivity_hours.is_empty());
    assert!(report.projects.is_empty());
    assert!(report.clients.is_empty());
    assert!(report.hourly_patterns.is_empty());
    assert_eq!(report.metrics.daily_averages.len(), 7);
    assert_eq!(report.metrics.weekly_trends.len(), 8);
    assert_eq!(report.metrics.monthly_comparison.len(), 6);
}

#[test]
fn test_entry_rate_beats_project_and_default() {
    let mut e = entry(1, project(1, Some(50.0), None), day(3, 9), 1.0, true);
    e.hourly_rate = Some(100.0);
    let options = AnalyticsOptions {
        default_hourly_rate: Some(25.0),
        ..AnalyticsOptions::default()
    };

    let report = compute_analytics(&[e], &AnalyticsFilter::default(), &options, &clock());
    assert_eq!(report.projects[0].earnings, 100.0);
}

#[test]
fn test_default_rate_applies_last() {
    let e = entry(1, project(1, None, None), day(3, 9), 2.0, true);
    let options = AnalyticsOptions {
        default_hourly_rate: Some(25.0),
        ..AnalyticsOptions::default()
    };

    let report = compute_analytics(&[e], &AnalyticsFilter::default(), &options, &clock());
    assert_eq!(report.projects[0].earnings, 50.0);
    assert_eq!(report.projects[0].average_hourly_rate, 25.0);
}

#[test]
fn test_series_ignore_filter_range() {
    let entries = scenario();
    let options = AnalyticsOptions::default();

    let month = compute_analytics(&entries, &AnalyticsFilter::default(), &options, &clock());
    let mut narrow = AnalyticsFilter::with_range(DateRange::Custom);
    narrow.start_date = Some(day(1, 0).naive_utc());
    narrow.end_date = Some(day(1, 1).naive_utc());
    narrow.project_ids.insert(99);
    let filtered = compute_analytics(&entries, &narrow, &options, &clock());

    assert_eq!(filtered.metrics.total_hours, 0.0);
    assert_eq!(filtered.metrics.weekly_trends, month.metrics.weekly_trends);
    assert_eq!(filtered.metrics.monthly_comparison, month.metrics.monthly_comparison);
    assert_eq!(month.metrics.monthly_comparison[5].earnings, 400.0);
}

#[test]
fn test_inverted_custom_range_is_empty() {
    let entries = scenario();
    let mut filter = AnalyticsFilter::with_range(DateRange::Custom);
    filter.start_date = Some(day(30, 0).naive_utc());
    filter.end_date = Some(day(1, 0).naive_utc());

    let report = compute_analytics(&entries, &filter, &AnalyticsOptions::default(), &clock());
    assert_eq!(report.metrics.total_hours, 0.0);
    assert!(report.projects.is_empty());
}

#[test]
fn test_week_range_only_counts_this_week() {
    let entries = scenario();
    let report = compute_analytics(
        &entries,
        &AnalyticsFilter::with_range(DateRange::Week),
        &AnalyticsOptions::default(),
        &clock(),
    );
    // Week of Sunday June 9 only holds the project B entry
    assert_eq!(report.metrics.total_hours, 3.0);
    assert_eq!(report.projects.len(), 1);
}

#[test]
fn test_open_entries_contribute_nothing() {
    let mut open = entry(1, project(1, Some(50.0), None), day(12, 14), 0.0, true);
    open.end_time = None;
    open.duration_seconds = None;

    let report = compute_analytics(&[open], &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock());
    assert_eq!(report.metrics.total_hours, 0.0);
    assert_eq!(report.metrics.productivity_rate, 0.0);
    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects[0].earnings, 0.0);
    assert_eq!(report.hourly_patterns[0].total_sessions, 1);
}

#[test]
fn test_non_finite_numbers_never_leak() {
    let mut a = entry(1, project(1, Some(f64::INFINITY), None), day(3, 9), 1.0, true);
    a.duration_seconds = Some(f64::NAN);
    let mut b = entry(2, project(2, Some(50.0), None), day(4, 9), 1.0, true);
    b.duration_seconds = Some(-7200.0);
    let mut c = entry(3, project(3, Some(50.0), None), day(4, 10), 1.0, true);
    c.project.as_mut().unwrap().budget = Some(f64::NAN);

    let report = compute_analytics(&[a, b, c], &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock());

    let m = &report.metrics;
    assert_eq!(m.total_hours, 1.0);
    assert!(m.productivity_rate.is_finite());
    for p in &report.projects {
        assert!(p.earnings.is_finite());
        assert!(p.average_hourly_rate.is_finite());
        assert_eq!(p.budget_utilization, None);
    }
}

#[test]
fn test_huge_durations_saturate_instead_of_overflowing() {
    let mut entries = vec![
        entry(1, project(1, Some(50.0), Some(10)), day(3, 9), 1.0, true),
        entry(2, project(1, Some(50.0), Some(10)), day(4, 9), 1.0, true),
    ];
    for e in &mut entries {
        e.duration_seconds = Some(1e308);
    }

    let report = compute_analytics(&entries, &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock());

    let m = &report.metrics;
    assert_eq!(m.total_hours, f64::MAX / 3600.0);
    assert_eq!(m.billable_hours, m.total_hours);
    assert_eq!(m.productivity_rate, 100.0);
    assert!(m.average_session_length.is_finite());

    let p = &report.projects[0];
    assert!(p.total_hours.is_finite());
    assert!(p.earnings.is_finite());
    assert_eq!(p.profitability, 100.0);
    assert!(p.average_hourly_rate.is_finite());
    assert!(p.time_distribution.iter().all(|d| d.hours.is_finite()));

    assert!(report.clients[0].earnings.is_finite());
    assert!(report.hourly_patterns.iter().all(|h| h.average_session_length.is_finite()));
    assert!(m.daily_averages.iter().all(|d| d.average_hours.is_finite()));
    assert!(m.weekly_trends.iter().all(|w| w.total_hours.is_finite() && w.earnings.is_finite()));
    assert!(m
        .monthly_comparison
        .iter()
        .all(|mo| mo.earnings.is_finite() && mo.growth_rate.is_finite()));
}

#[test]
fn test_billable_never_exceeds_total() {
    let entries = scenario();
    for range in [DateRange::Week, DateRange::Month, DateRange::Quarter, DateRange::Year] {
        for include_non_billable in [true, false] {
            let mut filter = AnalyticsFilter::with_range(range);
            filter.include_non_billable = include_non_billable;
            let m = compute_analytics(&entries, &filter, &AnalyticsOptions::default(), &clock()).metrics;

            assert!(m.billable_hours <= m.total_hours);
            assert!((0.0..=100.0).contains(&m.productivity_rate));
        }
    }
}

#[test]
fn test_compute_is_idempotent() {
    let entries = scenario();
    let filter = AnalyticsFilter::default();
    let options = AnalyticsOptions::default();

    let first = compute_analytics(&entries, &filter, &options, &clock());
    let second = compute_analytics(&entries, &filter, &options, &clock());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_filter_entries_matches_report() {
    let entries = scenario();
    let mut filter = AnalyticsFilter::default();
    filter.include_non_billable = false;

    let kept = filter_entries(&entries, &filter, &AnalyticsOptions::default(), &clock());
    let ids: Vec<i64> = kept.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 1]);
}
