use crate::analytics::AnalyticsReport;
use crate::timer::format_hours;

/// Generate markdown report
pub fn generate(report: &AnalyticsReport, include_time_distribution: bool) -> String {
    let mut output = String::new();
    let m = &report.metrics;

    // Header
    output.push_str("# Productivity Report\n\n");
    output.push_str(&format!(
        "**Period:** {} to {}\n",
        report.period.start.format("%Y-%m-%d"),
        report.period.end.format("%Y-%m-%d")
    ));
    output.push_str(&format!("**Total time:** {}\n", format_hours(m.total_hours)));
    output.push_str(&format!("**Billable time:** {}\n", format_hours(m.billable_hours)));
    output.push_str(&format!("**Productivity:** {:.1}%\n", m.productivity_rate));
    output.push_str(&format!(
        "**Average session:** {}\n",
        format_hours(m.average_session_length)
    ));

    let peak = m
        .peak_productivity_hours
        .iter()
        .map(|h| format!("{:02}:00", h))
        .collect::<Vec<_>>()
        .join(", ");
    output.push_str(&format!(
        "**Peak hours:** {}\n\n",
        if peak.is_empty() { "-" } else { peak.as_str() }
    ));

    output.push_str("---\n\n");

    // Projects
    output.push_str("## Projects\n\n");
    if report.projects.is_empty() {
        output.push_str("No tracked time in this period.\n\n");
    } else {
        output.push_str("| Project | Client | Time | Billable | Earnings | Rate | Budget |\n");
        output.push_str("|---------|--------|------|----------|----------|------|--------|\n");
        for project in &report.projects {
            let budget = project
                .budget_utilization
                .map(|u| format!("{:.0}%", u))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "| {} | {} | {} | {:.0}% | {:.2} | {:.2} | {} |\n",
                project.project_name,
                project.client_name.as_deref().unwrap_or("-"),
                format_hours(project.total_hours),
                project.profitability,
                project.earnings,
                project.average_hourly_rate,
                budget
            ));
        }
        output.push('\n');

        if include_time_distribution {
            for project in &report.projects {
                output.push_str(&format!("### {}\n\n", project.project_name));
                output.push_str("| Date | Time | Sessions |\n");
                output.push_str("|------|------|----------|\n");
                for day in &project.time_distribution {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        day.date,
                        format_hours(day.hours),
                        day.sessions
                    ));
                }
                output.push('\n');
            }
        }
    }

    // Clients
    if !report.clients.is_empty() {
        output.push_str("## Clients\n\n");
        output.push_str("| Client | Projects | Time | Earnings | Per project |\n");
        output.push_str("|--------|----------|------|----------|-------------|\n");
        for client in &report.clients {
            output.push_str(&format!(
                "| {} | {} | {} | {:.2} | {:.2} |\n",
                client.client_name,
                client.projects_count,
                format_hours(client.total_hours),
                client.earnings,
                client.average_project_value
            ));
        }
        output.push('\n');
    }

    // Weekdays
    output.push_str("## By weekday\n\n");
    output.push_str("| Day | Time | Sessions | Billable |\n");
    output.push_str("|-----|------|----------|----------|\n");
    for day in &m.daily_averages {
        output.push_str(&format!(
            "| {} | {} | {} | {:.0}% |\n",
            day.day_name,
            format_hours(day.average_hours),
            day.average_sessions,
            day.productivity_score
        ));
    }
    output.push('\n');

    // Trends
    output.push_str("## Last 8 weeks\n\n");
    output.push_str("| Week of | Time | Billable | Earnings | Sessions |\n");
    output.push_str("|---------|------|----------|----------|----------|\n");
    for week in &m.weekly_trends {
        output.push_str(&format!(
            "| {} | {} | {} | {:.2} | {} |\n",
            week.week_start,
            format_hours(week.total_hours),
            format_hours(week.billable_hours),
            week.earnings,
            week.sessions_count
        ));
    }
    output.push('\n');

    output.push_str("## Last 6 months\n\n");
    output.push_str("| Month | Time | Earnings | Projects | Rate | Growth |\n");
    output.push_str("|-------|------|----------|----------|------|--------|\n");
    for month in &m.monthly_comparison {
        output.push_str(&format!(
            "| {} {} | {} | {:.2} | {} | {:.2} | {:+.1}% |\n",
            month.month,
            month.year,
            format_hours(month.total_hours),
            month.earnings,
            month.projects_worked,
            month.average_hourly_rate,
            month.growth_rate
        ));
    }
    output.push('\n');

    // Hours of day
    if !report.hourly_patterns.is_empty() {
        output.push_str("## Hours of day\n\n");
        output.push_str("| Hour | Sessions | Billable | Avg session |\n");
        output.push_str("|------|----------|----------|-------------|\n");
        for pattern in &report.hourly_patterns {
            output.push_str(&format!(
                "| {:02}:00 | {} | {:.0}% | {} |\n",
                pattern.hour,
                pattern.total_sessions,
                pattern.average_productivity,
                format_hours(pattern.average_session_length)
            ));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{compute_analytics, AnalyticsFilter, AnalyticsOptions, FixedClock};
    use crate::models::{ProjectInfo, ProjectStatus, TimeEntry};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_generate_markdown() {
        let entries = vec![TimeEntry {
            id: 1,
            project_id: 1,
            project: Some(ProjectInfo {
                id: 1,
                name: "Test Project".to_string(),
                hourly_rate: Some(60.0),
                budget: Some(240.0),
                status: ProjectStatus::Active,
                client: None,
            }),
            description: None,
            start_time: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2024, 6, 3, 11, 0, 0).unwrap()),
            duration_seconds: Some(7200.0),
            is_billable: true,
            hourly_rate: None,
        }];
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap());
        let report = compute_analytics(&entries, &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock);

        let md = generate(&report, true);
        assert!(md.contains("**Period:** 2024-06-01 to 2024-06-30"));
        assert!(md.contains("**Total time:** 2h 0m"));
        assert!(md.contains("**Peak hours:** 09:00"));
        assert!(md.contains("| Test Project | - | 2h 0m | 100% | 120.00 | 60.00 | 50% |"));
        assert!(md.contains("| No Client | 1 |"));
        assert!(md.contains("### Test Project"));
        assert!(md.contains("| 2024-06-03 | 2h 0m | 1 |"));
    }

    #[test]
    fn test_empty_report() {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap());
        let report = compute_analytics(&[], &AnalyticsFilter::default(), &AnalyticsOptions::default(), &clock);

        let md = generate(&report, false);
        assert!(md.contains("No tracked time in this period."));
        assert!(md.contains("**Peak hours:** -"));
        assert!(!md.contains("## Clients"));
    }
}
