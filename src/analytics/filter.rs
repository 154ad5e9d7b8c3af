use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::range::{DateRange, Period};
use super::span::WorkSpan;

/// Which entries an analytics run looks at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsFilter {
    pub date_range: DateRange,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub project_ids: BTreeSet<i64>,
    #[serde(default)]
    pub client_ids: BTreeSet<i64>,
    #[serde(default = "default_include_non_billable")]
    pub include_non_billable: bool,
}

fn default_include_non_billable() -> bool {
    true
}

impl Default for AnalyticsFilter {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            start_date: None,
            end_date: None,
            project_ids: BTreeSet::new(),
            client_ids: BTreeSet::new(),
            include_non_billable: default_include_non_billable(),
        }
    }
}

impl AnalyticsFilter {
    pub fn with_range(date_range: DateRange) -> Self {
        Self {
            date_range,
            ..Self::default()
        }
    }

    pub fn matches(&self, span: &WorkSpan<'_>, period: &Period) -> bool {
        if !period.contains(span.local_start) {
            return false;
        }

        if !self.project_ids.is_empty() && !self.project_ids.contains(&span.entry.project_id) {
            return false;
        }

        if !self.client_ids.is_empty() {
            match span.entry.client_id() {
                Some(id) if self.client_ids.contains(&id) => {}
                _ => return false,
            }
        }

        self.include_non_billable || span.entry.is_billable
    }
}

/// Keep the spans matching the filter, preserving input order
pub fn apply<'a>(spans: &[WorkSpan<'a>], filter: &AnalyticsFilter, period: &Period) -> Vec<WorkSpan<'a>> {
    spans
        .iter()
        .filter(|span| filter.matches(span, period))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::clock::FixedClock;
    use crate::models::{ClientInfo, ProjectInfo, ProjectStatus, TimeEntry};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn entry(id: i64, project_id: i64, client_id: Option<i64>, day: u32, billable: bool) -> TimeEntry {
        TimeEntry {
            id,
            project_id,
            project: Some(ProjectInfo {
                id: project_id,
                name: format!("Project {}", project_id),
                hourly_rate: None,
                budget: None,
                status: ProjectStatus::Active,
                client: client_id.map(|id| ClientInfo {
                    id,
                    name: format!("Client {}", id),
                }),
            }),
            description: None,
            start_time: Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap(),
            end_time: None,
            duration_seconds: Some(600.0),
            is_billable: billable,
            hourly_rate: None,
        }
    }

    fn june() -> Period {
        Period::month(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn kept(entries: &[TimeEntry], filter: &AnalyticsFilter) -> Vec<i64> {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap());
        let spans: Vec<WorkSpan> = entries.iter().map(|e| WorkSpan::new(e, None, &clock)).collect();
        apply(&spans, filter, &june()).iter().map(|s| s.entry.id).collect()
    }

    #[test]
    fn test_project_and_client_sets() {
        let entries = vec![
            entry(1, 10, Some(100), 3, true),
            entry(2, 11, None, 4, true),
            entry(3, 12, Some(101), 5, true),
        ];

        let mut filter = AnalyticsFilter::default();
        filter.project_ids.insert(11);
        assert_eq!(kept(&entries, &filter), vec![2]);

        let mut filter = AnalyticsFilter::default();
        filter.client_ids.insert(100);
        filter.client_ids.insert(101);
        assert_eq!(kept(&entries, &filter), vec![1, 3]);
    }

    #[test]
    fn test_non_billable_excluded_on_request() {
        let entries = vec![entry(1, 10, None, 3, true), entry(2, 10, None, 3, false)];
        let mut filter = AnalyticsFilter::default();
        assert_eq!(kept(&entries, &filter), vec![1, 2]);

        filter.include_non_billable = false;
        assert_eq!(kept(&entries, &filter), vec![1]);
    }

    #[test]
    fn test_order_is_preserved() {
        let entries = vec![
            entry(3, 10, None, 9, true),
            entry(1, 10, None, 2, true),
            entry(2, 10, None, 5, true),
        ];
        assert_eq!(kept(&entries, &AnalyticsFilter::default()), vec![3, 1, 2]);
    }
}
