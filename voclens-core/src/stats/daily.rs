//! Calendar-day series for charting
//!
//! Produces one data point per calendar day per requested tag, zero-filled
//! across the whole range so chart axes stay contiguous.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::Conversation;

/// One line of a daily chart: a tag and its per-day counts.
#[derive(Debug, Clone, Serialize)]
pub struct TagSeries {
    /// Requested tag id
    #[serde(rename = "tagId")]
    pub tag_id: String,
    /// Resolved tag name, or the raw id when the tag is unknown
    #[serde(rename = "tagName")]
    pub tag_name: String,
    /// Counts aligned index-for-index with the date axis
    pub counts: Vec<u64>,
}

/// Chart-ready daily statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DailySeries {
    /// Every calendar day in the range, ascending, no gaps
    pub dates: Vec<NaiveDate>,
    /// One entry per requested tag id, in request order
    pub series: Vec<TagSeries>,
}

/// Count conversations per (day, tag) over `[range_start, range_end]`.
///
/// A conversation matches tag `t` on day `d` when it was created on `d`
/// and `t`'s resolved name appears in its tag snapshot; one conversation
/// can count for several tags at once. Ids missing from the index produce
/// an all-zero row whose display name falls back to the id itself.
pub fn daily_series(
    records: &[Conversation],
    tag_names_by_id: &HashMap<String, String>,
    tag_ids: &[String],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<DailySeries> {
    if range_end < range_start {
        return Err(Error::InvalidScheduleConfig(format!(
            "date range end {} precedes start {}",
            range_end, range_start
        )));
    }

    let day_count = (range_end - range_start).num_days() as usize + 1;
    let dates: Vec<NaiveDate> = (0..day_count)
        .map(|i| range_start + Duration::days(i as i64))
        .collect();

    let series = tag_ids
        .iter()
        .map(|tag_id| {
            let name = tag_names_by_id.get(tag_id);
            let mut counts = vec![0u64; day_count];

            // Unresolved ids keep their zero-filled row
            if let Some(name) = name {
                for record in records {
                    let day = record.conversation_created_at.date_naive();
                    if day < range_start || day > range_end {
                        continue;
                    }
                    if record.tag_names.iter().any(|n| n == name) {
                        counts[(day - range_start).num_days() as usize] += 1;
                    }
                }
            }

            TagSeries {
                tag_id: tag_id.clone(),
                tag_name: name.cloned().unwrap_or_else(|| tag_id.clone()),
                counts,
            }
        })
        .collect();

    Ok(DailySeries { dates, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn record(id: &str, tags: &[&str], at: DateTime<Utc>) -> Conversation {
        Conversation::new(id, tags.iter().map(|s| s.to_string()).collect(), at)
    }

    fn names(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn test_two_tags_two_days() {
        let records = vec![
            record("c1", &["Bug"], ts(2025, 1, 1, 9)),
            record("c2", &["Bug", "Feature"], ts(2025, 1, 1, 15)),
            record("c3", &["Feature"], ts(2025, 1, 2, 11)),
        ];
        let names = names(&[("t1", "Bug"), ("t2", "Feature")]);

        let result = daily_series(
            &records,
            &names,
            &["t1".to_string(), "t2".to_string()],
            day(2025, 1, 1),
            day(2025, 1, 2),
        )
        .unwrap();

        assert_eq!(result.dates, vec![day(2025, 1, 1), day(2025, 1, 2)]);
        assert_eq!(result.series[0].tag_name, "Bug");
        assert_eq!(result.series[0].counts, vec![2, 0]);
        assert_eq!(result.series[1].tag_name, "Feature");
        assert_eq!(result.series[1].counts, vec![1, 1]);
    }

    #[test]
    fn test_date_axis_is_contiguous_and_ascending() {
        let result = daily_series(
            &[],
            &HashMap::new(),
            &[],
            day(2025, 2, 26),
            day(2025, 3, 4),
        )
        .unwrap();

        assert_eq!(result.dates.len(), 7);
        assert!(result.dates.windows(2).all(|w| w[1] == w[0] + Duration::days(1)));
        assert!(result.series.is_empty());
    }

    #[test]
    fn test_single_day_range() {
        let result = daily_series(&[], &HashMap::new(), &[], day(2025, 1, 1), day(2025, 1, 1))
            .unwrap();
        assert_eq!(result.dates, vec![day(2025, 1, 1)]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = daily_series(&[], &HashMap::new(), &[], day(2025, 1, 2), day(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidScheduleConfig(_)));
    }

    #[test]
    fn test_unresolved_tag_yields_zero_row_with_id_as_name() {
        let records = vec![record("c1", &["ghost"], ts(2025, 1, 1, 9))];

        let result = daily_series(
            &records,
            &HashMap::new(),
            &["ghost".to_string()],
            day(2025, 1, 1),
            day(2025, 1, 1),
        )
        .unwrap();

        // The record's tag list holds the *name* "ghost" but the id never
        // resolved, so matching by name cannot see it: zero row, id shown.
        assert_eq!(result.series[0].tag_name, "ghost");
        assert_eq!(result.series[0].counts, vec![0]);
    }

    #[test]
    fn test_tag_rename_breaks_retroactive_matching() {
        // Conversations were synced while the tag was named "Bug"; the tag
        // has since been renamed. Matching is by current name, so history
        // no longer matches. Snapshot semantics, kept deliberately.
        let records = vec![record("c1", &["Bug"], ts(2025, 1, 1, 9))];
        let renamed = names(&[("t1", "Defect")]);

        let result = daily_series(
            &records,
            &renamed,
            &["t1".to_string()],
            day(2025, 1, 1),
            day(2025, 1, 1),
        )
        .unwrap();

        assert_eq!(result.series[0].tag_name, "Defect");
        assert_eq!(result.series[0].counts, vec![0]);
    }

    #[test]
    fn test_series_order_follows_request_order() {
        let records = vec![record("c1", &["B"], ts(2025, 1, 1, 9))];
        let names = names(&[("a", "A"), ("b", "B")]);

        let result = daily_series(
            &records,
            &names,
            &["b".to_string(), "a".to_string()],
            day(2025, 1, 1),
            day(2025, 1, 1),
        )
        .unwrap();

        assert_eq!(result.series[0].tag_id, "b");
        assert_eq!(result.series[1].tag_id, "a");
    }

    #[test]
    fn test_out_of_range_records_ignored() {
        let records = vec![
            record("c1", &["Bug"], ts(2024, 12, 31, 23)),
            record("c2", &["Bug"], ts(2025, 1, 3, 0)),
        ];
        let names = names(&[("t1", "Bug")]);

        let result = daily_series(
            &records,
            &names,
            &["t1".to_string()],
            day(2025, 1, 1),
            day(2025, 1, 2),
        )
        .unwrap();

        assert_eq!(result.series[0].counts, vec![0, 0]);
    }
}
