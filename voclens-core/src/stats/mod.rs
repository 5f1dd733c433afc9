//! Time-bucketed conversation statistics
//!
//! The aggregation functions here are pure: they take a snapshot of
//! conversation records plus an id→name tag index and produce chart-ready
//! series ([`daily`]) or report tables ([`weekly`]). Database-backed
//! conveniences fetch the snapshot and index before delegating.
//!
//! ## Matching model
//!
//! Conversations carry tag *names* snapshotted at sync time; queries come
//! in as tag *ids*. Every aggregation resolves id → name through the index
//! first and matches by name equality. An id missing from the index cannot
//! match anything: the daily series still emits it as an all-zero row
//! (display name falls back to the raw id), the weekly table omits it
//! entirely. The two behaviors differ on purpose; report consumers depend
//! on the weekly shape.

pub mod daily;
pub mod weekly;

pub use daily::{daily_series, DailySeries, TagSeries};
pub use weekly::{weekly_series, TagCount, WeekBucket, WeeklyReport};

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::types::Conversation;

/// Count conversations created in `[range_start, range_end)`.
///
/// With a non-empty `tag_names` filter only conversations carrying at least
/// one of the names count, each at most once no matter how many names
/// match. An empty filter counts every in-range conversation.
pub fn count_in_range(
    records: &[Conversation],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    tag_names: &[String],
) -> u64 {
    records
        .iter()
        .filter(|r| r.conversation_created_at >= range_start && r.conversation_created_at < range_end)
        .filter(|r| tag_names.is_empty() || r.has_any_tag(tag_names))
        .count() as u64
}

/// Build the id→name index for a set of tag ids. Unknown ids are absent.
pub fn tag_name_index(db: &Database, tag_ids: &[String]) -> Result<HashMap<String, String>> {
    Ok(db
        .tags_by_ids(tag_ids)?
        .into_iter()
        .map(|(id, tag)| (id, tag.name))
        .collect())
}

/// Daily series over `[range_start, range_end]`, fetching records and tag
/// names from the store.
pub fn daily_series_for(
    db: &Database,
    tag_ids: &[String],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<DailySeries> {
    let start_ts = range_start.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end_ts = (range_end + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();

    let records = db.conversations_in_range(start_ts, end_ts)?;
    let names = tag_name_index(db, tag_ids)?;
    daily_series(&records, &names, tag_ids, range_start, range_end)
}

/// Weekly report over `week_count` windows starting at `range_start`,
/// fetching records and tag names from the store.
pub fn weekly_report_for(
    db: &Database,
    tag_ids: &[String],
    range_start: DateTime<Utc>,
    period_days: i64,
    week_count: u32,
) -> Result<WeeklyReport> {
    let end_ts = range_start + Duration::days(period_days.max(0) * week_count as i64);

    let records = db.conversations_in_range(range_start, end_ts)?;
    let names = tag_name_index(db, tag_ids)?;
    weekly_series(&records, &names, tag_ids, range_start, period_days, week_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn record(id: &str, tags: &[&str], at: DateTime<Utc>) -> Conversation {
        Conversation::new(id, tags.iter().map(|s| s.to_string()).collect(), at)
    }

    #[test]
    fn test_count_without_filter_counts_everything_in_range() {
        let records = vec![
            record("c1", &["Bug"], ts(2025, 1, 1, 10)),
            record("c2", &[], ts(2025, 1, 2, 10)),
            record("c3", &["Bug"], ts(2025, 1, 5, 10)),
        ];

        let count = count_in_range(&records, ts(2025, 1, 1, 0), ts(2025, 1, 3, 0), &[]);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_count_with_filter_counts_record_once() {
        let records = vec![
            record("c1", &["Bug", "Feature"], ts(2025, 1, 1, 10)),
            record("c2", &["Other"], ts(2025, 1, 1, 11)),
        ];

        // c1 matches both filter names but still counts once
        let filter = vec!["Bug".to_string(), "Feature".to_string()];
        let count = count_in_range(&records, ts(2025, 1, 1, 0), ts(2025, 1, 2, 0), &filter);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_range_end_is_exclusive() {
        let records = vec![record("c1", &[], ts(2025, 1, 2, 0))];
        assert_eq!(
            count_in_range(&records, ts(2025, 1, 1, 0), ts(2025, 1, 2, 0), &[]),
            0
        );
        assert_eq!(
            count_in_range(&records, ts(2025, 1, 2, 0), ts(2025, 1, 3, 0), &[]),
            1
        );
    }
}
