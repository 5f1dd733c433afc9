//! Database repository layer
//!
//! Provides query and upsert operations for all entity types. List-valued
//! columns (`conversations.tag_names`, `schedules.tag_ids`) are stored as
//! JSON arrays; unreadable values decode to an empty list rather than
//! failing the whole row.

use crate::error::{Error, Result};
use crate::types::{Conversation, Schedule, Tag, Team};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrency between sync writes and stat reads
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Tag operations
    // ============================================

    /// Insert or update a tag (sync is upsert-by-id)
    pub fn upsert_tag(&self, tag: &Tag) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO tags (id, name, parent_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                parent_id = excluded.parent_id,
                updated_at = excluded.updated_at
            "#,
            params![
                tag.id,
                tag.name,
                tag.parent_id,
                tag.created_at.to_rfc3339(),
                tag.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a tag by ID
    pub fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM tags WHERE id = ?", [id], Self::row_to_tag)
            .optional()
            .map_err(Error::from)
    }

    /// List all tags, ordered by name
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], Self::row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Direct children of a tag, ordered by name
    pub fn children_of(&self, parent_id: &str) -> Result<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM tags WHERE parent_id = ? ORDER BY name")?;
        let tags = stmt
            .query_map([parent_id], Self::row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Fetch a batch of tags, keyed by id. Unknown ids are simply absent.
    pub fn tags_by_ids(&self, ids: &[String]) -> Result<HashMap<String, Tag>> {
        let mut map = HashMap::with_capacity(ids.len());
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM tags WHERE id = ?")?;
        for id in ids {
            if let Some(tag) = stmt.query_row([id], Self::row_to_tag).optional()? {
                map.insert(tag.id.clone(), tag);
            }
        }
        Ok(map)
    }

    fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
            parent_id: row.get("parent_id")?,
            created_at: parse_ts(row.get::<_, String>("created_at")?),
            updated_at: parse_ts(row.get::<_, String>("updated_at")?),
        })
    }

    // ============================================
    // Conversation operations
    // ============================================

    /// Insert or update a conversation (re-sync replaces the tag snapshot)
    pub fn upsert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO conversations (id, tag_names, conversation_created_at, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                tag_names = excluded.tag_names,
                updated_at = excluded.updated_at
            "#,
            params![
                conversation.id,
                serde_json::to_string(&conversation.tag_names)?,
                conversation.conversation_created_at.to_rfc3339(),
                conversation.created_at.to_rfc3339(),
                conversation.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a conversation by ID
    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM conversations WHERE id = ?",
            [id],
            Self::row_to_conversation,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Conversations created in `[start, end)`. No guaranteed order.
    pub fn conversations_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM conversations
             WHERE conversation_created_at >= ?1 AND conversation_created_at < ?2",
        )?;
        let conversations = stmt
            .query_map(
                params![start.to_rfc3339(), end.to_rfc3339()],
                Self::row_to_conversation,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(conversations)
    }

    /// Total number of stored conversations
    pub fn conversation_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM conversations", [], |r| r.get(0))?;
        Ok(count)
    }

    fn row_to_conversation(row: &Row) -> rusqlite::Result<Conversation> {
        let tag_names_str: String = row.get("tag_names")?;

        Ok(Conversation {
            id: row.get("id")?,
            tag_names: serde_json::from_str(&tag_names_str).unwrap_or_default(),
            conversation_created_at: parse_ts(row.get::<_, String>("conversation_created_at")?),
            created_at: parse_ts(row.get::<_, String>("created_at")?),
            updated_at: parse_ts(row.get::<_, String>("updated_at")?),
        })
    }

    // ============================================
    // Team operations
    // ============================================

    /// Insert or update a team
    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO teams (id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                updated_at = excluded.updated_at
            "#,
            params![
                team.id,
                team.name,
                team.created_at.to_rfc3339(),
                team.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a team by ID
    pub fn get_team(&self, id: &str) -> Result<Option<Team>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM teams WHERE id = ?", [id], Self::row_to_team)
            .optional()
            .map_err(Error::from)
    }

    /// List all teams, ordered by name
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM teams ORDER BY name")?;
        let teams = stmt
            .query_map([], Self::row_to_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
        Ok(Team {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: parse_ts(row.get::<_, String>("created_at")?),
            updated_at: parse_ts(row.get::<_, String>("updated_at")?),
        })
    }

    // ============================================
    // Schedule operations
    // ============================================

    /// Insert a new schedule
    pub fn insert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO schedules (id, team_id, tag_ids, start_date, period_days,
                                   last_executed_at, next_execution_at, is_active,
                                   created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                schedule.id,
                schedule.team_id,
                serde_json::to_string(&schedule.tag_ids)?,
                schedule.start_date.to_rfc3339(),
                schedule.period_days,
                schedule.last_executed_at.map(|t| t.to_rfc3339()),
                schedule.next_execution_at.to_rfc3339(),
                schedule.is_active,
                schedule.created_at.to_rfc3339(),
                schedule.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a schedule by ID
    pub fn get_schedule(&self, id: &str) -> Result<Option<Schedule>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM schedules WHERE id = ?",
            [id],
            Self::row_to_schedule,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all schedules, newest first
    pub fn list_schedules(&self) -> Result<Vec<Schedule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM schedules ORDER BY created_at DESC")?;
        let schedules = stmt
            .query_map([], Self::row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }

    /// Schedules targeting a given team
    pub fn schedules_for_team(&self, team_id: &str) -> Result<Vec<Schedule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM schedules WHERE team_id = ? ORDER BY created_at DESC")?;
        let schedules = stmt
            .query_map([team_id], Self::row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }

    /// Active schedules whose next execution time has passed (driver poll)
    pub fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM schedules
             WHERE is_active = 1 AND next_execution_at <= ?1
             ORDER BY next_execution_at",
        )?;
        let schedules = stmt
            .query_map([now.to_rfc3339()], Self::row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }

    /// Persist the execution bookkeeping of a schedule.
    ///
    /// Fails with `ScheduleNotFound` if no row was updated.
    pub fn update_schedule_execution(&self, schedule: &Schedule) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            r#"
            UPDATE schedules SET
                last_executed_at = ?2,
                next_execution_at = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                schedule.id,
                schedule.last_executed_at.map(|t| t.to_rfc3339()),
                schedule.next_execution_at.to_rfc3339(),
                schedule.updated_at.to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::ScheduleNotFound(schedule.id.clone()));
        }
        Ok(())
    }

    /// Delete a schedule by ID.
    ///
    /// Fails with `ScheduleNotFound` if the id is unknown.
    pub fn delete_schedule(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM schedules WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(Error::ScheduleNotFound(id.to_string()));
        }
        Ok(())
    }

    fn row_to_schedule(row: &Row) -> rusqlite::Result<Schedule> {
        let tag_ids_str: String = row.get("tag_ids")?;
        let last_executed_str: Option<String> = row.get("last_executed_at")?;

        Ok(Schedule {
            id: row.get("id")?,
            team_id: row.get("team_id")?,
            tag_ids: serde_json::from_str(&tag_ids_str).unwrap_or_default(),
            start_date: parse_ts(row.get::<_, String>("start_date")?),
            period_days: row.get("period_days")?,
            last_executed_at: last_executed_str
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            next_execution_at: parse_ts(row.get::<_, String>("next_execution_at")?),
            is_active: row.get("is_active")?,
            created_at: parse_ts(row.get::<_, String>("created_at")?),
            updated_at: parse_ts(row.get::<_, String>("updated_at")?),
        })
    }
}

/// Parse an RFC3339 timestamp column, falling back to now on corruption.
fn parse_ts(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_tag_upsert_and_children() {
        let db = test_db();

        db.upsert_tag(&Tag::new("t1", "Bug", None)).unwrap();
        db.upsert_tag(&Tag::new("t2", "Crash", Some("t1".to_string())))
            .unwrap();
        db.upsert_tag(&Tag::new("t3", "Hang", Some("t1".to_string())))
            .unwrap();

        let children = db.children_of("t1").unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "Crash");

        // Upsert by id updates in place
        db.upsert_tag(&Tag::new("t1", "Defect", None)).unwrap();
        assert_eq!(db.get_tag("t1").unwrap().unwrap().name, "Defect");
        assert_eq!(db.list_tags().unwrap().len(), 3);

        let map = db
            .tags_by_ids(&["t1".to_string(), "missing".to_string()])
            .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("t1"));
    }

    #[test]
    fn test_conversation_range_is_half_open() {
        let db = test_db();

        for (id, at) in [
            ("c1", ts(2025, 1, 1, 0)),
            ("c2", ts(2025, 1, 2, 12)),
            ("c3", ts(2025, 1, 3, 0)),
        ] {
            db.upsert_conversation(&Conversation::new(id, vec![], at))
                .unwrap();
        }

        let found = db
            .conversations_in_range(ts(2025, 1, 1, 0), ts(2025, 1, 3, 0))
            .unwrap();
        let mut ids: Vec<_> = found.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_conversation_resync_replaces_tags() {
        let db = test_db();
        let at = ts(2025, 1, 1, 0);

        db.upsert_conversation(&Conversation::new("c1", vec!["Bug".to_string()], at))
            .unwrap();
        db.upsert_conversation(&Conversation::new(
            "c1",
            vec!["Bug".to_string(), "Feature".to_string()],
            at,
        ))
        .unwrap();

        let c = db.get_conversation("c1").unwrap().unwrap();
        assert_eq!(c.tag_names, vec!["Bug", "Feature"]);
        assert_eq!(db.conversation_count().unwrap(), 1);
    }

    #[test]
    fn test_schedule_roundtrip_and_due_query() {
        let db = test_db();

        let schedule = Schedule {
            id: "s1".to_string(),
            team_id: "team-1".to_string(),
            tag_ids: vec!["t1".to_string(), "t2".to_string()],
            start_date: ts(2025, 1, 1, 0),
            period_days: 7,
            last_executed_at: None,
            next_execution_at: ts(2025, 1, 1, 0),
            is_active: true,
            created_at: ts(2025, 1, 1, 0),
            updated_at: ts(2025, 1, 1, 0),
        };
        db.insert_schedule(&schedule).unwrap();

        let loaded = db.get_schedule("s1").unwrap().unwrap();
        assert_eq!(loaded.tag_ids, vec!["t1", "t2"]);
        assert!(loaded.last_executed_at.is_none());

        assert_eq!(db.due_schedules(ts(2025, 1, 2, 0)).unwrap().len(), 1);
        assert!(db.due_schedules(ts(2024, 12, 31, 0)).unwrap().is_empty());

        assert_eq!(db.schedules_for_team("team-1").unwrap().len(), 1);
        assert!(db.schedules_for_team("other").unwrap().is_empty());
    }

    #[test]
    fn test_schedule_delete_unknown_id() {
        let db = test_db();
        let err = db.delete_schedule("nope").unwrap_err();
        assert!(matches!(err, Error::ScheduleNotFound(_)));
    }
}
