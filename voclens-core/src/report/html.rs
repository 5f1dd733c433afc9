//! HTML rendering for published report documents
//!
//! Output is a self-contained fragment: inline styles, a trend table with
//! one column per window and one row per tag, then the narrative section.

use std::collections::BTreeMap;

use crate::stats::WeeklyReport;

const TABLE_STYLE: &str = "<style>\
table { border-collapse: collapse; width: 100%; margin: 20px 0; }\
th, td { border: 1px solid #ddd; padding: 12px; text-align: center; }\
th { background-color: #4CAF50; color: white; font-weight: bold; }\
tr:nth-child(even) { background-color: #f2f2f2; }\
</style>";

/// Render the multi-week trend table.
pub fn weekly_table(weekly: &WeeklyReport) -> String {
    // Pivot: tag name -> counts per window, keeping tag rows stable
    let mut by_tag: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for (i, week) in weekly.weeks.iter().enumerate() {
        for tag in &week.tags {
            by_tag
                .entry(tag.tag_name.as_str())
                .or_insert_with(|| vec![0; weekly.weeks.len()])[i] = tag.count;
        }
    }

    let mut html = String::from(TABLE_STYLE);
    html.push_str("<table><thead><tr><th>Tag</th>");
    for week in &weekly.weeks {
        html.push_str(&format!("<th>{}</th>", week.week_start));
    }
    html.push_str("</tr></thead><tbody>");

    for (tag_name, counts) in &by_tag {
        html.push_str(&format!(
            "<tr><td style='text-align: left; font-weight: bold;'>{}</td>",
            escape(tag_name)
        ));
        for count in counts {
            html.push_str(&format!("<td>{}</td>", count));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

/// Render the full document body: heading, trend table, narrative.
pub fn report_body(weekly: &WeeklyReport, narrative: &str) -> String {
    format!(
        "<h1>Weekly VOC Report</h1>\
         <p><strong>{}</strong></p>\
         <hr/>\
         <h2>{}-week trend</h2>\
         {}\
         <hr/>\
         <h2>Analysis</h2>\
         <p>{}</p>",
        escape(&weekly.summary()),
        weekly.week_count,
        weekly_table(weekly),
        escape(narrative)
    )
}

/// Minimal HTML escaping for text interpolated into the body.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::weekly_series;
    use crate::types::Conversation;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[test]
    fn test_table_has_column_per_week_and_row_per_tag() {
        let names: HashMap<String, String> = [
            ("t1".to_string(), "Bug".to_string()),
            ("t2".to_string(), "Feature".to_string()),
        ]
        .into_iter()
        .collect();
        let records = vec![Conversation::new(
            "c1",
            vec!["Bug".to_string()],
            Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        )];

        let weekly = weekly_series(
            &records,
            &names,
            &["t1".to_string(), "t2".to_string()],
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            7,
            3,
        )
        .unwrap();

        let table = weekly_table(&weekly);
        assert_eq!(table.matches("<th>").count(), 4); // Tag column + 3 weeks
        assert_eq!(table.matches("<tr>").count(), 1 + 2); // header + 2 tags
        assert!(table.contains("2025-01-01"));
    }

    #[test]
    fn test_narrative_is_escaped() {
        let weekly = weekly_series(
            &[],
            &HashMap::new(),
            &[],
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            7,
            1,
        )
        .unwrap();

        let body = report_body(&weekly, "<script>alert(1)</script>");
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
