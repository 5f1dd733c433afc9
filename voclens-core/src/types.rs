//! Core domain types for voclens
//!
//! These types represent the canonical data model synced from the messaging
//! platform plus the schedule records owned by this service.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Conversation** | A customer-support chat synced from the platform |
//! | **Tag** | A classification label; tags may nest via `parent_id` |
//! | **Team** | An organizational group that receives reports |
//! | **Schedule** | A recurring report definition for one team |
//!
//! ### Tag ids vs tag names
//!
//! The platform attaches tag *names* to conversations at sync time, while
//! schedules and statistics queries reference tag *ids*. Aggregation always
//! resolves id → name first and matches by name. Renaming a tag therefore
//! stops it matching conversations synced under the old name; that is the
//! platform's snapshot semantics and is kept as-is.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Tag
// ============================================

/// A classification tag synced from the messaging platform.
///
/// Tags form a forest via `parent_id`. The parent graph is expected to be
/// acyclic but is never trusted; traversal code carries a visited-set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Platform-assigned identifier
    pub id: String,
    /// Display name; conversations reference tags by this name
    pub name: String,
    /// Parent tag id (None for root tags)
    pub parent_id: Option<String>,
    /// When this tag was first synced
    pub created_at: DateTime<Utc>,
    /// Last sync touch
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Create a tag stamped with the current time on both timestamps.
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================
// Conversation
// ============================================

/// A customer-support conversation record.
///
/// `tag_names` is the platform's tag snapshot at sync time, in sync order;
/// duplicates are possible and matching treats the list as a set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Platform-assigned identifier
    pub id: String,
    /// Tag names attached at sync time (insertion order preserved)
    pub tag_names: Vec<String>,
    /// When the conversation was created on the platform
    pub conversation_created_at: DateTime<Utc>,
    /// When this record was first synced
    pub created_at: DateTime<Utc>,
    /// Last sync touch (re-sync replaces tag_names and bumps this)
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation record stamped with the current sync time.
    pub fn new(
        id: impl Into<String>,
        tag_names: Vec<String>,
        conversation_created_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            tag_names,
            conversation_created_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether any of the given names appears in this conversation's tags.
    pub fn has_any_tag(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.tag_names.contains(n))
    }
}

// ============================================
// Team
// ============================================

/// An organizational team (report publishing target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Platform-assigned identifier
    pub id: String,
    /// Team display name
    pub name: String,
    /// When this team was first synced
    pub created_at: DateTime<Utc>,
    /// Last sync touch
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================
// Schedule
// ============================================

/// Computed state of a schedule at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    /// Active, next execution still in the future
    Scheduled,
    /// Active, next execution time has passed
    Due,
    /// Deactivated; never picked up by drivers
    Inactive,
}

impl ScheduleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleState::Scheduled => "scheduled",
            ScheduleState::Due => "due",
            ScheduleState::Inactive => "inactive",
        }
    }
}

/// A recurring report schedule for one team.
///
/// Created with `next_execution_at = start_date`. Execution re-arms the
/// schedule from the execution timestamp, not from the previous due time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique identifier (uuid v4)
    pub id: String,
    /// Team that receives the generated report
    pub team_id: String,
    /// Tag ids the report aggregates over
    pub tag_ids: Vec<String>,
    /// First eligible execution time
    pub start_date: DateTime<Utc>,
    /// Period length in days (always >= 1)
    pub period_days: i64,
    /// Timestamp of the most recent execution, if any
    pub last_executed_at: Option<DateTime<Utc>>,
    /// Next eligible execution time
    pub next_execution_at: DateTime<Utc>,
    /// Whether drivers should pick this schedule up
    pub is_active: bool,
    /// When the schedule was created
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Compute the state of this schedule at `now`.
    pub fn state(&self, now: DateTime<Utc>) -> ScheduleState {
        if !self.is_active {
            ScheduleState::Inactive
        } else if now >= self.next_execution_at {
            ScheduleState::Due
        } else {
            ScheduleState::Scheduled
        }
    }

    /// Whether this schedule is active and past its next execution time.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == ScheduleState::Due
    }

    /// Record an execution at `now` and re-arm.
    ///
    /// Deliberately not idempotent: every call advances `next_execution_at`
    /// to `now + period_days`. Drivers must call this at most once per
    /// intended firing.
    pub fn mark_executed(&mut self, now: DateTime<Utc>) {
        self.last_executed_at = Some(now);
        self.next_execution_at = now + Duration::days(self.period_days);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn schedule() -> Schedule {
        Schedule {
            id: "s1".to_string(),
            team_id: "team-1".to_string(),
            tag_ids: vec!["t1".to_string()],
            start_date: ts(2025, 1, 1),
            period_days: 7,
            last_executed_at: None,
            next_execution_at: ts(2025, 1, 1),
            is_active: true,
            created_at: ts(2025, 1, 1),
            updated_at: ts(2025, 1, 1),
        }
    }

    #[test]
    fn test_schedule_states() {
        let mut s = schedule();
        assert_eq!(s.state(ts(2025, 1, 2)), ScheduleState::Due);
        s.next_execution_at = ts(2025, 1, 8);
        assert_eq!(s.state(ts(2025, 1, 2)), ScheduleState::Scheduled);
        s.is_active = false;
        assert_eq!(s.state(ts(2025, 1, 2)), ScheduleState::Inactive);
        assert!(!s.is_due(ts(2025, 2, 1)));
    }

    #[test]
    fn test_mark_executed_rearms_from_execution_time() {
        let mut s = schedule();
        s.mark_executed(ts(2025, 1, 3));
        assert_eq!(s.last_executed_at, Some(ts(2025, 1, 3)));
        assert_eq!(s.next_execution_at, ts(2025, 1, 10));
    }

    #[test]
    fn test_mark_executed_twice_double_advances() {
        let mut s = schedule();
        s.mark_executed(ts(2025, 1, 3));
        s.mark_executed(ts(2025, 1, 5));
        // Re-armed from the second call, not the first
        assert_eq!(s.next_execution_at, ts(2025, 1, 12));
    }

    #[test]
    fn test_has_any_tag() {
        let c = Conversation::new(
            "c1",
            vec!["Bug".to_string(), "Feature".to_string()],
            Utc::now(),
        );
        assert!(c.has_any_tag(&["Feature".to_string()]));
        assert!(!c.has_any_tag(&["Billing".to_string()]));
        assert!(!c.has_any_tag(&[]));
    }
}
