pub mod csv;
pub mod json;
pub mod markdown;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::analytics::AnalyticsReport;
use crate::error::ParseError;

/// Output formats for the analytics report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Json,
    Csv,
}

impl Format {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim() {
            "md" | "markdown" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => bail!("Unknown format: {}", other),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

/// Render an analytics report in the given format
pub fn render(report: &AnalyticsReport, format: Format, include_time_distribution: bool) -> Result<String> {
    match format {
        Format::Markdown => Ok(markdown::generate(report, include_time_distribution)),
        Format::Json => json::generate(report),
        Format::Csv => csv::generate_string(report),
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| ParseError::Date(input.to_string()))
}

/// Output path for one format; with several formats every file gets its own extension
pub fn output_path(base: &str, format: Format, multiple_formats: bool) -> String {
    let ext = format.extension();
    if !multiple_formats && base.ends_with(&format!(".{}", ext)) {
        base.to_string()
    } else {
        format!("{}.{}", base, ext)
    }
}
