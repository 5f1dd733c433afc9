//! Schedule execution
//!
//! Firing a schedule means: aggregate the trailing weeks, obtain the
//! narrative, assemble and publish the document, then re-arm the schedule.
//! The schedule is only re-armed after a successful publish, so a failed
//! run stays due and the driver can retry on its next poll.

use chrono::{DateTime, Duration, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::platform::{DocumentSink, NarrativeClient};
use crate::report::{self, ReportPayload};
use crate::schedule;
use crate::stats;

/// Default number of aggregation windows per report
pub const REPORT_WEEKS: u32 = 8;

/// Runs due schedules end to end.
///
/// Mutates only the schedule row it executes. Concurrent execution of the
/// same schedule id is the caller's problem to prevent.
pub struct ScheduleExecutor<'a> {
    db: &'a Database,
    narrative: &'a dyn NarrativeClient,
    documents: &'a dyn DocumentSink,
    weeks: u32,
}

impl<'a> ScheduleExecutor<'a> {
    pub fn new(
        db: &'a Database,
        narrative: &'a dyn NarrativeClient,
        documents: &'a dyn DocumentSink,
    ) -> Self {
        Self {
            db,
            narrative,
            documents,
            weeks: REPORT_WEEKS,
        }
    }

    /// Override the number of report windows (config-driven).
    pub fn with_weeks(mut self, weeks: u32) -> Self {
        self.weeks = weeks;
        self
    }

    /// Execute a schedule at `now`, returning the published document URL.
    ///
    /// Runs regardless of the schedule's due state (manual trigger is
    /// allowed) and re-arms from `now`, not from the previous due time.
    /// Not idempotent: every call advances `next_execution_at`.
    pub async fn execute(&self, schedule_id: &str, now: DateTime<Utc>) -> Result<String> {
        let mut schedule = schedule::get_schedule(self.db, schedule_id)?;

        tracing::info!(
            schedule_id,
            team_id = %schedule.team_id,
            weeks = self.weeks,
            "Executing report schedule"
        );

        // Aggregate the trailing weeks ending at now
        let range_start = now - Duration::days(schedule.period_days * self.weeks as i64);
        let weekly = stats::weekly_report_for(
            self.db,
            &schedule.tag_ids,
            range_start,
            schedule.period_days,
            self.weeks,
        )?;

        let payload_json = serde_json::to_string(&ReportPayload::from_weekly(&weekly))?;
        let narrative = self.narrative.analyze(&payload_json).await;

        let document = report::assemble(&weekly, &narrative)?;
        let url = self
            .documents
            .publish(
                &schedule.team_id,
                &document.title,
                &document.subtitle,
                &document.body_html,
            )
            .await?;

        schedule.mark_executed(now);
        self.db.update_schedule_execution(&schedule)?;

        tracing::info!(
            schedule_id,
            url = %url,
            next_execution_at = %schedule.next_execution_at,
            "Schedule executed"
        );
        Ok(url)
    }
}
