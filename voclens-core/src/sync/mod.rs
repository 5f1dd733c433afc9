//! Platform sync
//!
//! Pulls tags, teams, and conversations from the messaging platform's open
//! API and upserts them into the local store. Every sync is idempotent:
//! entities are keyed by platform id and a re-sync refreshes names and tag
//! snapshots in place.

use chrono::{DateTime, Duration, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::platform::OpenApiClient;
use crate::types::{Conversation, Tag, Team};

/// Default lookback for conversation sync when no window is given
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Counts from a full sync pass.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// Tags upserted
    pub tags_synced: usize,
    /// Teams upserted
    pub teams_synced: usize,
    /// Conversations upserted
    pub conversations_synced: usize,
}

/// Coordinates sync between the platform API and the local store.
pub struct SyncCoordinator {
    db: Database,
    client: OpenApiClient,
}

impl SyncCoordinator {
    pub fn new(db: Database, client: OpenApiClient) -> Self {
        Self { db, client }
    }

    /// Access the underlying database (for post-sync queries)
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Sync all chat tags. Returns the number upserted.
    pub async fn sync_tags(&self) -> Result<usize> {
        tracing::info!("Starting tag sync");

        let response = self.client.chat_tags().await?;
        for dto in &response.chat_tags {
            self.db
                .upsert_tag(&Tag::new(&dto.id, &dto.name, dto.parent_id.clone()))?;
            tracing::debug!(tag_id = %dto.id, name = %dto.name, "Synced tag");
        }

        tracing::info!(count = response.chat_tags.len(), "Tag sync complete");
        Ok(response.chat_tags.len())
    }

    /// Sync all teams. Returns the number upserted.
    pub async fn sync_teams(&self) -> Result<usize> {
        tracing::info!("Starting team sync");

        let response = self.client.groups().await?;
        for dto in &response.groups {
            self.db.upsert_team(&Team::new(&dto.id, &dto.name))?;
            tracing::debug!(team_id = %dto.id, name = %dto.name, "Synced team");
        }

        tracing::info!(count = response.groups.len(), "Team sync complete");
        Ok(response.groups.len())
    }

    /// Sync conversations created in `[since, until]`.
    ///
    /// Defaults to the trailing week ending now. Conversations with no tags
    /// are stored with an empty snapshot, and records whose timestamps the
    /// platform reports out of range are skipped with a warning.
    pub async fn sync_conversations(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        let until = until.unwrap_or_else(Utc::now);
        let since = since.unwrap_or(until - Duration::days(DEFAULT_LOOKBACK_DAYS));

        tracing::info!(%since, %until, "Starting conversation sync");

        let response = self
            .client
            .user_chats(since.timestamp_millis(), until.timestamp_millis())
            .await?;

        let mut synced = 0;
        for dto in &response.user_chats {
            let Some(created_at) = DateTime::from_timestamp_millis(dto.created_at) else {
                tracing::warn!(conversation_id = %dto.id, millis = dto.created_at, "Unparseable timestamp, skipping");
                continue;
            };

            let tag_names = dto.tags.clone().unwrap_or_default();
            self.db.upsert_conversation(&Conversation::new(
                &dto.id,
                tag_names,
                created_at,
            ))?;
            synced += 1;
        }

        tracing::info!(count = synced, "Conversation sync complete");
        Ok(synced)
    }

    /// Sync tags, teams, and the default conversation window.
    pub async fn sync_all(&self) -> Result<SyncResult> {
        let tags_synced = self.sync_tags().await?;
        let teams_synced = self.sync_teams().await?;
        let conversations_synced = self.sync_conversations(None, None).await?;

        Ok(SyncResult {
            tags_synced,
            teams_synced,
            conversations_synced,
        })
    }
}
