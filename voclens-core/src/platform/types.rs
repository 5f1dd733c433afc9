//! Wire types for the messaging platform's open API
//!
//! Only the fields this service reads are modeled; unknown fields are
//! ignored on deserialization.

use serde::Deserialize;

/// Response from GET /chat-tags
#[derive(Debug, Deserialize)]
pub struct ChatTagsResponse {
    /// Pagination cursor (unused while tag counts stay under one page)
    #[serde(default)]
    pub next: Option<String>,
    #[serde(rename = "chatTags", default)]
    pub chat_tags: Vec<ChatTagDto>,
}

/// One tag as the platform reports it
#[derive(Debug, Deserialize)]
pub struct ChatTagDto {
    pub id: String,
    pub name: String,
    /// Parent tag id; absent for root tags (and on older API versions)
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
}

/// Response from GET /user-chats
#[derive(Debug, Deserialize)]
pub struct UserChatsResponse {
    #[serde(rename = "userChats", default)]
    pub user_chats: Vec<UserChatDto>,
}

/// One conversation as the platform reports it
#[derive(Debug, Deserialize)]
pub struct UserChatDto {
    pub id: String,
    /// Tag names attached to the conversation; may be missing entirely
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Creation time, epoch milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Response from GET /groups
#[derive(Debug, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<GroupDto>,
}

/// One team (group) as the platform reports it
#[derive(Debug, Deserialize)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
}

/// Response from POST /spaces/$me/articles (document API)
#[derive(Debug, Deserialize)]
pub struct CreateArticleResponse {
    pub article: ArticleDto,
    pub revision: RevisionDto,
}

#[derive(Debug, Deserialize)]
pub struct ArticleDto {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RevisionDto {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_chats_tolerates_missing_tags() {
        let json = r#"{
            "userChats": [
                {"id": "c1", "tags": ["Bug"], "createdAt": 1735689600000, "state": "closed"},
                {"id": "c2", "createdAt": 1735776000000}
            ]
        }"#;

        let response: UserChatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user_chats.len(), 2);
        assert_eq!(response.user_chats[0].tags.as_deref(), Some(&["Bug".to_string()][..]));
        assert!(response.user_chats[1].tags.is_none());
    }

    #[test]
    fn test_chat_tags_without_parent() {
        let json = r#"{"next": null, "chatTags": [{"id": "t1", "name": "Bug", "key": "bug"}]}"#;
        let response: ChatTagsResponse = serde_json::from_str(json).unwrap();
        assert!(response.chat_tags[0].parent_id.is_none());
        assert!(response.next.is_none());
    }
}
