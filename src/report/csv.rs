use anyhow::Result;
use std::io::Write;

use crate::analytics::earnings::{effective_rate, entry_earnings, entry_seconds};
use crate::analytics::{AnalyticsReport, Clock};
use crate::models::TimeEntry;
use crate::timer::format_duration;

/// Generate CSV of the project rollups
pub fn generate<W: Write>(report: &AnalyticsReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "project",
        "client",
        "total_hours",
        "billable_hours",
        "earnings",
        "profitability",
        "average_hourly_rate",
        "completion_rate",
        "budget_utilization",
    ])?;

    for project in &report.projects {
        wtr.write_record([
            project.project_name.clone(),
            project.client_name.clone().unwrap_or_default(),
            format!("{:.2}", project.total_hours),
            format!("{:.2}", project.billable_hours),
            format!("{:.2}", project.earnings),
            format!("{:.1}", project.profitability),
            format!("{:.2}", project.average_hourly_rate),
            format!("{:.1}", project.completion_rate),
            project
                .budget_utilization
                .map(|u| format!("{:.1}", u))
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Generate CSV report as string
pub fn generate_string(report: &AnalyticsReport) -> Result<String> {
    let mut buffer = Vec::new();
    generate(report, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Write time entries as a spreadsheet-friendly CSV, times in local time
pub fn export_entries<W: Write>(
    entries: &[&TimeEntry],
    default_rate: Option<f64>,
    clock: &impl Clock,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "Date",
        "Project",
        "Client",
        "Description",
        "Start Time",
        "End Time",
        "Duration",
        "Billable",
        "Hourly Rate",
        "Earnings",
    ])?;

    for entry in entries {
        let start = clock.to_local(entry.start_time);
        let project = entry.project.as_ref();

        wtr.write_record([
            start.format("%Y-%m-%d").to_string(),
            project.map(|p| p.name.clone()).unwrap_or_default(),
            project
                .and_then(|p| p.client.as_ref())
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            entry.description.clone().unwrap_or_default(),
            start.format("%H:%M:%S").to_string(),
            entry
                .end_time
                .map(|end| clock.to_local(end).format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            format_duration(entry_seconds(entry) as i64),
            if entry.is_billable { "Yes" } else { "No" }.to_string(),
            format!("{:.2}", effective_rate(entry, default_rate)),
            format!("{:.2}", entry_earnings(entry, default_rate)),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export time entries as string
pub fn export_entries_string(
    entries: &[&TimeEntry],
    default_rate: Option<f64>,
    clock: &impl Clock,
) -> Result<String> {
    let mut buffer = Vec::new();
    export_entries(entries, default_rate, clock, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{compute_analytics, AnalyticsFilter, AnalyticsOptions, FixedClock};
    use crate::models::{ClientInfo, ProjectInfo, ProjectStatus};
    use chrono::{FixedOffset, TimeZone, Utc};

    fn entries() -> Vec<TimeEntry> {
        vec![
            TimeEntry {
                id: 1,
                project_id: 1,
                project: Some(ProjectInfo {
                    id: 1,
                    name: "Test Project".to_string(),
                    hourly_rate: Some(50.0),
                    budget: None,
                    status: ProjectStatus::Active,
                    client: Some(ClientInfo {
                        id: 4,
                        name: "Acme".to_string(),
                    }),
                }),
                description: Some("Landing page, hero".to_string()),
                start_time: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
                end_time: Some(Utc.with_ymd_and_hms(2024, 6, 3, 11, 0, 0).unwrap()),
                duration_seconds: Some(7200.0),
                is_billable: true,
                hourly_rate: None,
            },
            TimeEntry {
                id: 2,
                project_id: 1,
                project: None,
                description: None,
                start_time: Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap(),
                end_time: None,
                duration_seconds: None,
                is_billable: false,
                hourly_rate: None,
            },
        ]
    }

    #[test]
    fn test_generate_csv() {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap());
        let entries = entries();
        let report = compute_analytics(&entries, &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock);

        let csv = generate_string(&report).unwrap();
        assert!(csv.starts_with("project,client,total_hours,billable_hours,earnings"));
        assert!(csv.contains("Test Project,Acme,2.00,2.00,100.00,100.0,50.00,0.0,"));
    }

    #[test]
    fn test_export_entries() {
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap(),
            FixedOffset::east_opt(2 * 3600).unwrap(),
        );
        let entries = entries();
        let refs: Vec<&TimeEntry> = entries.iter().collect();

        let csv = export_entries_string(&refs, Some(20.0), &clock).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,Project,Client,Description"));
        assert_eq!(
            lines[1],
            "2024-06-03,Test Project,Acme,\"Landing page, hero\",11:00:00,13:00:00,2:00:00,Yes,50.00,100.00"
        );
        assert_eq!(lines[2], "2024-06-04,,,,11:00:00,,0:00:00,No,20.00,0.00");
    }
}
