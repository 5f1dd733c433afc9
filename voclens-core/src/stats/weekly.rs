//! Fixed-length weekly windows for report tables
//!
//! Windows are `period_days` calendar days long, laid out back-to-back from
//! the range start. "Week" is the report vocabulary; the window length is
//! whatever the schedule's period says.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::Conversation;

/// Per-tag count within one window.
#[derive(Debug, Clone, Serialize)]
pub struct TagCount {
    /// Resolved tag name
    #[serde(rename = "tagName")]
    pub tag_name: String,
    /// Conversations matching the tag inside the window
    pub count: u64,
}

/// One aggregation window.
#[derive(Debug, Clone, Serialize)]
pub struct WeekBucket {
    /// 1-based window index
    #[serde(rename = "weekNumber")]
    pub week_number: u32,
    /// First day of the window (inclusive)
    #[serde(rename = "weekStart")]
    pub week_start: NaiveDate,
    /// Last day of the window (inclusive)
    #[serde(rename = "weekEnd")]
    pub week_end: NaiveDate,
    /// Per-tag counts; ids that did not resolve to a name are omitted
    pub tags: Vec<TagCount>,
}

/// Multi-week aggregation result for reports.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    /// First day covered (inclusive)
    #[serde(rename = "periodStart")]
    pub period_start: NaiveDate,
    /// Last day covered (inclusive)
    #[serde(rename = "periodEnd")]
    pub period_end: NaiveDate,
    /// Number of windows
    #[serde(rename = "totalWeeks")]
    pub week_count: u32,
    /// Sum of every count across all windows and tags
    pub total: u64,
    /// Windows in chronological order
    pub weeks: Vec<WeekBucket>,
}

impl WeeklyReport {
    /// One-line human-readable roll-up carried into the report payload.
    pub fn summary(&self) -> String {
        format!(
            "Collected {} VOC conversations over the last {} weeks.",
            self.total, self.week_count
        )
    }
}

/// Aggregate conversations into `week_count` windows of `period_days` days
/// starting at `range_start`.
///
/// Matching mirrors [`daily_series`](super::daily_series) except that tags
/// without a resolvable name are dropped from the output instead of being
/// emitted as zero rows. Report and narrative consumers rely on that shape.
pub fn weekly_series(
    records: &[Conversation],
    tag_names_by_id: &HashMap<String, String>,
    tag_ids: &[String],
    range_start: DateTime<Utc>,
    period_days: i64,
    week_count: u32,
) -> Result<WeeklyReport> {
    if period_days < 1 {
        return Err(Error::InvalidScheduleConfig(format!(
            "period_days must be positive, got {}",
            period_days
        )));
    }
    if week_count < 1 {
        return Err(Error::InvalidScheduleConfig(format!(
            "week_count must be positive, got {}",
            week_count
        )));
    }

    let start_day = range_start.date_naive();
    let mut weeks = Vec::with_capacity(week_count as usize);
    let mut total = 0u64;

    for k in 0..week_count {
        let week_start = start_day + Duration::days(k as i64 * period_days);
        let week_end = week_start + Duration::days(period_days - 1);

        let mut tags = Vec::new();
        for tag_id in tag_ids {
            // No name, no row: unresolved ids are silently dropped here
            let Some(name) = tag_names_by_id.get(tag_id) else {
                continue;
            };

            let count = records
                .iter()
                .filter(|r| {
                    let day = r.conversation_created_at.date_naive();
                    day >= week_start
                        && day <= week_end
                        && r.tag_names.iter().any(|n| n == name)
                })
                .count() as u64;

            total += count;
            tags.push(TagCount {
                tag_name: name.clone(),
                count,
            });
        }

        weeks.push(WeekBucket {
            week_number: k + 1,
            week_start,
            week_end,
            tags,
        });
    }

    Ok(WeeklyReport {
        period_start: start_day,
        period_end: start_day + Duration::days(period_days * week_count as i64 - 1),
        week_count,
        total,
        weeks,
    })
}
