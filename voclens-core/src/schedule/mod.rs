//! Recurring report schedules
//!
//! A schedule fires every `period_days` days per team. This module owns
//! creation (with validation) and the due/re-arm bookkeeping; the actual
//! report generation on fire lives in [`executor`].
//!
//! Nothing here transitions a schedule automatically: an external driver
//! (cron, the CLI) polls [`Database::due_schedules`] and invokes the
//! executor. Executing the same schedule from two drivers at once is not
//! supported; serialize per schedule id on the caller side.

pub mod executor;

pub use executor::{ScheduleExecutor, REPORT_WEEKS};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::Schedule;

/// Create and persist a schedule.
///
/// `period_days` below 1 is rejected. The new schedule is armed at
/// `start_date` and has never executed.
pub fn create_schedule(
    db: &Database,
    team_id: impl Into<String>,
    tag_ids: Vec<String>,
    start_date: DateTime<Utc>,
    period_days: i64,
) -> Result<Schedule> {
    if period_days < 1 {
        return Err(Error::InvalidScheduleConfig(format!(
            "period_days must be positive, got {}",
            period_days
        )));
    }

    let now = Utc::now();
    let schedule = Schedule {
        id: Uuid::new_v4().to_string(),
        team_id: team_id.into(),
        tag_ids,
        start_date,
        period_days,
        last_executed_at: None,
        next_execution_at: start_date,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    db.insert_schedule(&schedule)?;
    tracing::info!(
        schedule_id = %schedule.id,
        team_id = %schedule.team_id,
        period_days,
        "Created report schedule"
    );

    Ok(schedule)
}

/// Load a schedule, failing with `ScheduleNotFound` when the id is unknown.
pub fn get_schedule(db: &Database, id: &str) -> Result<Schedule> {
    db.get_schedule(id)?
        .ok_or_else(|| Error::ScheduleNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_create_arms_at_start_date() {
        let db = test_db();
        let schedule = create_schedule(
            &db,
            "team-1",
            vec!["t1".to_string()],
            ts(2025, 1, 1),
            7,
        )
        .unwrap();

        assert_eq!(schedule.next_execution_at, ts(2025, 1, 1));
        assert!(schedule.last_executed_at.is_none());
        assert!(schedule.is_active);

        let loaded = get_schedule(&db, &schedule.id).unwrap();
        assert_eq!(loaded.period_days, 7);
    }

    #[test]
    fn test_zero_period_rejected() {
        let db = test_db();
        let err =
            create_schedule(&db, "team-1", vec![], ts(2025, 1, 1), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidScheduleConfig(_)));

        let err =
            create_schedule(&db, "team-1", vec![], ts(2025, 1, 1), -3).unwrap_err();
        assert!(matches!(err, Error::InvalidScheduleConfig(_)));
    }

    #[test]
    fn test_get_unknown_schedule() {
        let db = test_db();
        let err = get_schedule(&db, "nope").unwrap_err();
        assert!(matches!(err, Error::ScheduleNotFound(_)));
    }
}
