//! Discussion and reply models.
//!
//! Replies arrive flat from the API; [`crate::services::thread`] derives the
//! nested forest. A deleted reply stays in the thread as a placeholder with
//! its author redacted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel text a deleted reply carries; the node is kept, not removed.
pub const DELETED_TEXT: &str = "[deleted]";

/// Author shown for deleted (or authorless) replies.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// A discussion thread. The `description` is free text that may embed
/// `***[[course:<id>]]***` reference tokens, preserved verbatim on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub user_id: i64,

    /// The detail endpoint names this field `user_username`.
    #[serde(default, alias = "user_username")]
    pub username: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub reply_count: Option<i64>,
}

/// A flat reply as received from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,

    pub text: String,

    pub user_id: i64,

    #[serde(default)]
    pub username: Option<String>,

    pub created_at: DateTime<Utc>,

    /// None for top-level replies. An id absent from the fetched set is
    /// treated as unresolved and the reply becomes a root.
    #[serde(default)]
    pub parent_reply_id: Option<String>,
}

impl Reply {
    pub fn is_deleted(&self) -> bool {
        self.text == DELETED_TEXT
    }
}

/// A reply with its nested children, derived client-side.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: Reply,

    pub child_replies: Vec<ReplyNode>,
}

/// Pagination metadata attached to discussion listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub returned: u64,
}

/// Response envelope of the discussion listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscussionsResponse {
    #[serde(default)]
    pub discussions: Vec<Discussion>,

    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// Response envelope of the reply listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepliesResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// Response after creating a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyCreated {
    pub reply_id: String,
}

/// Response after creating a discussion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscussionCreated {
    #[serde(default)]
    pub discussion_id: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}
