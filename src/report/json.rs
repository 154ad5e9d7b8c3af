use anyhow::Result;

use crate::analytics::AnalyticsReport;

/// Generate JSON report
pub fn generate(report: &AnalyticsReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
