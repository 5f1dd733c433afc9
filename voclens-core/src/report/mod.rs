//! Report assembly
//!
//! Composes a weekly aggregate with the externally produced narrative into
//! the payload the narrative API consumes and the document the platform
//! publishes. No aggregation happens here.

pub mod html;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::stats::{WeekBucket, WeeklyReport};

/// Covered period, as the narrative API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodInfo {
    /// First covered day (yyyy-mm-dd)
    pub start: String,
    /// Last covered day (yyyy-mm-dd)
    pub end: String,
    /// Number of aggregation windows
    #[serde(rename = "totalWeeks")]
    pub total_weeks: u32,
}

/// JSON payload handed to the narrative collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub period: PeriodInfo,
    /// One-line roll-up ("{total} conversations over {weeks} weeks")
    pub summary: String,
    #[serde(rename = "weeklyData")]
    pub weekly_data: Vec<WeekBucket>,
}

impl ReportPayload {
    /// Project a weekly aggregate into the wire payload.
    pub fn from_weekly(weekly: &WeeklyReport) -> Self {
        Self {
            period: PeriodInfo {
                start: weekly.period_start.to_string(),
                end: weekly.period_end.to_string(),
                total_weeks: weekly.week_count,
            },
            summary: weekly.summary(),
            weekly_data: weekly.weeks.clone(),
        }
    }
}

/// Fully assembled report, ready for publishing.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    /// Document title
    pub title: String,
    /// Document subtitle (covered period)
    pub subtitle: String,
    /// Rendered HTML body (trend table + narrative)
    pub body_html: String,
    /// The payload the narrative was generated from
    pub payload: ReportPayload,
    /// The narrative text as received
    pub narrative: String,
}

/// Compose the weekly aggregate and the narrative into a document.
///
/// Fails when the aggregate is malformed: a window count that does not
/// match the week list (including an empty list for a non-zero count).
pub fn assemble(weekly: &WeeklyReport, narrative: &str) -> Result<ReportDocument> {
    if weekly.weeks.len() != weekly.week_count as usize {
        return Err(Error::Inconsistency(format!(
            "weekly aggregate declares {} weeks but carries {}",
            weekly.week_count,
            weekly.weeks.len()
        )));
    }

    let payload = ReportPayload::from_weekly(weekly);
    let body_html = html::report_body(weekly, narrative);

    Ok(ReportDocument {
        title: "Weekly VOC Report".to_string(),
        subtitle: format!(
            "Period: {} to {}",
            weekly.period_start, weekly.period_end
        ),
        body_html,
        payload,
        narrative: narrative.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::weekly_series;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn weekly() -> WeeklyReport {
        let names: HashMap<String, String> =
            [("t1".to_string(), "Bug".to_string())].into_iter().collect();
        weekly_series(
            &[],
            &names,
            &["t1".to_string()],
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            7,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_assemble_composes_payload_and_body() {
        let doc = assemble(&weekly(), "Trend looks flat.").unwrap();

        assert_eq!(doc.payload.period.total_weeks, 2);
        assert_eq!(doc.payload.weekly_data.len(), 2);
        assert_eq!(doc.narrative, "Trend looks flat.");
        assert!(doc.body_html.contains("Trend looks flat."));
        assert!(doc.subtitle.contains("2025-01-01"));
    }

    #[test]
    fn test_assemble_rejects_missing_weeks() {
        let mut broken = weekly();
        broken.weeks.clear();

        let err = assemble(&broken, "n/a").unwrap_err();
        assert!(matches!(err, Error::Inconsistency(_)));
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = ReportPayload::from_weekly(&weekly());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["period"]["totalWeeks"], 2);
        assert_eq!(json["period"]["start"], "2025-01-01");
        assert_eq!(json["weeklyData"][0]["weekNumber"], 1);
        assert_eq!(json["weeklyData"][0]["tags"][0]["tagName"], "Bug");
    }
}
