use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Client stored in database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Project stored in database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub client_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub hourly_rate: Option<f64>,
    pub budget: Option<f64>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Paused,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "paused" => Ok(ProjectStatus::Paused),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(ParseError::ProjectStatus(s.to_string())),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client metadata joined onto a time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: i64,
    pub name: String,
}

/// Project metadata joined onto a time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: i64,
    pub name: String,
    pub hourly_rate: Option<f64>,
    pub budget: Option<f64>,
    pub status: ProjectStatus,
    pub client: Option<ClientInfo>,
}

/// A recorded (or still running) span of work on a project.
///
/// `duration_seconds` stays `None` while the entry is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    pub project_id: i64,
    pub project: Option<ProjectInfo>,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub is_billable: bool,
    pub hourly_rate: Option<f64>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn client_id(&self) -> Option<i64> {
        self.project.as_ref()?.client.as_ref().map(|c| c.id)
    }
}

/// Report data structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityMetrics {
    pub total_hours: f64,
    pub billable_hours: f64,
    pub productivity_rate: f64,
    pub average_session_length: f64,
    pub peak_productivity_hours: Vec<u32>,
    pub daily_averages: Vec<DailyAverage>,
    pub weekly_trends: Vec<WeeklyTrend>,
    pub monthly_comparison: Vec<MonthlyComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub day_of_week: u32,
    pub day_name: String,
    /// Summed hours logged on this weekday within the filtered range
    pub average_hours: f64,
    pub average_sessions: usize,
    pub productivity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub week_start: String,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub earnings: f64,
    pub sessions_count: usize,
    pub productivity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    pub month: String,
    pub year: i32,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub earnings: f64,
    pub projects_worked: usize,
    pub average_hourly_rate: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub project_id: i64,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub earnings: f64,
    pub profitability: f64,
    pub average_hourly_rate: f64,
    pub time_distribution: Vec<TimeDistribution>,
    pub completion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_utilization: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDistribution {
    pub date: String,
    pub hours: f64,
    pub sessions: usize,
    /// Average hours per session on that day
    pub productivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAnalytics {
    /// `None` for the bucket of entries without a client
    pub client_id: Option<i64>,
    pub client_name: String,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub earnings: f64,
    pub projects_count: usize,
    pub average_project_value: f64,
    pub projects: Vec<ProjectAnalytics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePattern {
    pub hour: u32,
    pub average_productivity: f64,
    pub total_sessions: usize,
    pub average_session_length: f64,
}
