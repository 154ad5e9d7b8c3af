use thiserror::Error;

/// Errors raised while parsing user-supplied values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid duration: {0}. Expected H:MM:SS, 1h 30m, 90m or 2h")]
    Duration(String),

    #[error("Invalid date: {0}. Expected YYYY-MM-DD")]
    Date(String),

    #[error("Invalid date/time: {0}. Expected YYYY-MM-DD HH:MM")]
    DateTime(String),

    #[error("Unknown date range: {0}. Expected week, month, quarter, year or custom")]
    DateRange(String),

    #[error("Unknown project status: {0}. Expected active, completed, paused or archived")]
    ProjectStatus(String),

    #[error("Unknown week start: {0}. Expected sunday or monday")]
    WeekStart(String),
}
