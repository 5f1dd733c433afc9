//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- ============================================
    -- Synced entities (owned by the platform)
    -- ============================================

    CREATE TABLE IF NOT EXISTS tags (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        parent_id        TEXT,
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS conversations (
        id                      TEXT PRIMARY KEY,
        tag_names               JSON NOT NULL,      -- array of tag names, sync order
        conversation_created_at DATETIME NOT NULL,
        created_at              DATETIME NOT NULL,
        updated_at              DATETIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS teams (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    -- ============================================
    -- Schedules (owned by this service)
    -- ============================================

    CREATE TABLE IF NOT EXISTS schedules (
        id                TEXT PRIMARY KEY,
        team_id           TEXT NOT NULL,
        tag_ids           JSON NOT NULL,            -- array of tag ids
        start_date        DATETIME NOT NULL,
        period_days       INTEGER NOT NULL,
        last_executed_at  DATETIME,
        next_execution_at DATETIME NOT NULL,
        is_active         INTEGER NOT NULL DEFAULT 1,
        created_at        DATETIME NOT NULL,
        updated_at        DATETIME NOT NULL
    );

    -- ============================================
    -- Indexes
    -- ============================================

    CREATE INDEX IF NOT EXISTS idx_tags_parent ON tags(parent_id);
    CREATE INDEX IF NOT EXISTS idx_conversations_created
        ON conversations(conversation_created_at);
    CREATE INDEX IF NOT EXISTS idx_schedules_team ON schedules(team_id);
    CREATE INDEX IF NOT EXISTS idx_schedules_next
        ON schedules(next_execution_at) WHERE is_active = 1;
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
