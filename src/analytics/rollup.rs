//! Per-project and per-client rollups.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::earnings::{percent, safe_div, saturating_add, SECONDS_PER_HOUR};
use super::span::{Tally, WorkSpan};
use crate::models::{ClientAnalytics, ProjectAnalytics, ProjectInfo, ProjectStatus, TimeDistribution};

pub const UNKNOWN_PROJECT: &str = "Unknown Project";
pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const NO_CLIENT: &str = "No Client";

/// Group spans by key, keeping groups in first-seen order
fn group_by<'s, 'a, K, F>(spans: &'s [WorkSpan<'a>], key: F) -> Vec<(K, Vec<&'s WorkSpan<'a>>)>
where
    K: Ord + Copy,
    F: Fn(&WorkSpan<'a>) -> K,
{
    let mut index: BTreeMap<K, usize> = BTreeMap::new();
    let mut groups: Vec<(K, Vec<&'s WorkSpan<'a>>)> = Vec::new();

    for span in spans {
        let k = key(span);
        let slot = match index.get(&k) {
            Some(&slot) => slot,
            None => {
                groups.push((k, Vec::new()));
                index.insert(k, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].1.push(span);
    }

    groups
}

fn sort_by_earnings_desc<T>(rows: &mut [T], earnings: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| earnings(b).total_cmp(&earnings(a)));
}

/// One rollup per project present in `spans`, highest earnings first
pub fn project_rollups(spans: &[WorkSpan<'_>]) -> Vec<ProjectAnalytics> {
    let mut rows: Vec<ProjectAnalytics> = group_by(spans, |s| s.entry.project_id)
        .into_iter()
        .map(|(project_id, group)| project_rollup(project_id, &group))
        .collect();

    sort_by_earnings_desc(&mut rows, |r| r.earnings);
    rows
}

fn project_rollup(project_id: i64, group: &[&WorkSpan<'_>]) -> ProjectAnalytics {
    let info: Option<&ProjectInfo> = group.iter().find_map(|s| s.entry.project.as_ref());
    if info.is_none() {
        tracing::warn!(project_id, "time entries reference an unknown project");
    }

    let tally = Tally::of(group.iter().copied());

    let budget = info
        .and_then(|p| p.budget)
        .filter(|b| b.is_finite() && *b > 0.0);
    let budget_utilization = budget.map(|b| percent(tally.earnings, b));
    let completion_rate = match info.map(|p| p.status) {
        Some(ProjectStatus::Completed) => 100.0,
        _ => budget_utilization.map(|u| u.min(100.0)).unwrap_or(0.0),
    };

    ProjectAnalytics {
        project_id,
        project_name: info
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string()),
        client_name: info.and_then(|p| p.client.as_ref()).map(|c| c.name.clone()),
        total_hours: tally.total_hours(),
        billable_hours: tally.billable_hours(),
        earnings: tally.earnings,
        profitability: tally.productivity_score(),
        average_hourly_rate: safe_div(tally.earnings, tally.billable_hours()),
        time_distribution: time_distribution(group),
        completion_rate,
        budget_utilization,
    }
}

/// Hours and sessions per local calendar day, oldest first
fn time_distribution(group: &[&WorkSpan<'_>]) -> Vec<TimeDistribution> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for span in group {
        let day = days.entry(span.local_start.date()).or_insert((0.0, 0));
        day.0 = saturating_add(day.0, span.seconds);
        day.1 += 1;
    }

    days.into_iter()
        .map(|(date, (seconds, sessions))| {
            let hours = seconds / SECONDS_PER_HOUR;
            TimeDistribution {
                date: date.format("%Y-%m-%d").to_string(),
                hours,
                sessions,
                productivity: safe_div(hours, sessions as f64),
            }
        })
        .collect()
}

/// One rollup per client, highest earnings first.
///
/// Entries without a client share a single "No Client" row. `projects` are
/// the project rollups of the same spans; each client row embeds its own.
pub fn client_rollups(spans: &[WorkSpan<'_>], projects: &[ProjectAnalytics]) -> Vec<ClientAnalytics> {
    let mut rows: Vec<ClientAnalytics> = group_by(spans, |s| s.entry.client_id())
        .into_iter()
        .map(|(client_id, group)| {
            let tally = Tally::of(group.iter().copied());
            let project_ids: BTreeSet<i64> = group.iter().map(|s| s.entry.project_id).collect();

            let client_name = match client_id {
                None => NO_CLIENT.to_string(),
                Some(_) => group
                    .iter()
                    .filter_map(|s| s.entry.project.as_ref()?.client.as_ref())
                    .map(|c| c.name.clone())
                    .find(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
            };

            ClientAnalytics {
                client_id,
                client_name,
                total_hours: tally.total_hours(),
                billable_hours: tally.billable_hours(),
                earnings: tally.earnings,
                projects_count: project_ids.len(),
                average_project_value: safe_div(tally.earnings, project_ids.len() as f64),
                projects: projects
                    .iter()
                    .filter(|p| project_ids.contains(&p.project_id))
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    sort_by_earnings_desc(&mut rows, |r| r.earnings);
    rows
}
