//! Discussion and reply endpoints.
//!
//! Discussion text travels verbatim, reference tokens included; only the
//! rendering layer expands them. Reply deletion is soft server-side and the
//! node stays visible as a placeholder.

use serde_json::json;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Discussion, DiscussionCreated, DiscussionsResponse, Reply, ReplyCreated, RepliesResponse,
};

impl ApiClient {
    /// Discussions referencing a specific course.
    /// GET /course/{id}/discussions?limit&offset (auth optional)
    pub async fn course_discussions(
        &self,
        course_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> ClientResult<DiscussionsResponse> {
        let request = self
            .http
            .get(self.url(&format!("/course/{course_id}/discussions")))
            .query(&page_params(limit, offset));

        let response = self.maybe_auth(request).await.send().await?;
        Self::handle(response).await
    }

    /// The global discussion feed.
    /// GET /course/discussions?limit&offset
    pub async fn all_discussions(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> ClientResult<DiscussionsResponse> {
        let request = self
            .http
            .get(self.url("/course/discussions"))
            .query(&page_params(limit, offset));

        let response = self.maybe_auth(request).await.send().await?;
        Self::handle(response).await
    }

    /// A single discussion.
    /// GET /course/discussion/{id}
    pub async fn get_discussion(&self, discussion_id: &str) -> ClientResult<Discussion> {
        let response = self
            .http
            .get(self.url(&format!("/course/discussion/{discussion_id}")))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Start a new discussion (requires login). Globally scoped; referenced
    /// course ids ride along as `course_ids`.
    /// POST /course/discussion
    pub async fn create_discussion(
        &self,
        title: &str,
        description: &str,
        course_ids: &[String],
    ) -> ClientResult<DiscussionCreated> {
        let session = self.require_auth("start a discussion").await?;

        if title.trim().is_empty() {
            return Err(ClientError::Validation("title is required".to_string()));
        }
        if description.trim().is_empty() {
            return Err(ClientError::Validation(
                "description is required".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.url("/course/discussion"))
            .bearer_auth(session.token)
            .json(&json!({
                "title": title,
                "description": description,
                "course_ids": course_ids,
            }))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// The flat reply list of a discussion; threading happens client-side.
    /// GET /course/discussion/{id}/replies
    pub async fn discussion_replies(&self, discussion_id: &str) -> ClientResult<Vec<Reply>> {
        let response = self
            .http
            .get(self.url(&format!("/course/discussion/{discussion_id}/replies")))
            .send()
            .await?;

        let body: RepliesResponse = Self::handle(response).await?;
        Ok(body.replies)
    }

    /// Post a top-level reply (requires login).
    /// POST /course/discussion/{id}/reply
    pub async fn post_reply(&self, discussion_id: &str, text: &str) -> ClientResult<ReplyCreated> {
        self.post_reply_inner(
            &format!("/course/discussion/{discussion_id}/reply"),
            text,
        )
        .await
    }

    /// Post a nested reply under an existing one (requires login).
    /// POST /course/discussion/{id}/reply/{reply_id}/reply
    pub async fn post_nested_reply(
        &self,
        discussion_id: &str,
        parent_reply_id: &str,
        text: &str,
    ) -> ClientResult<ReplyCreated> {
        self.post_reply_inner(
            &format!("/course/discussion/{discussion_id}/reply/{parent_reply_id}/reply"),
            text,
        )
        .await
    }

    async fn post_reply_inner(&self, path: &str, text: &str) -> ClientResult<ReplyCreated> {
        let session = self.require_auth("reply to a discussion").await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("reply text is required".to_string()));
        }

        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(session.token)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Delete one of your own replies (requires login). The server marks the
    /// reply deleted rather than removing it.
    /// DELETE /course/discussion/{id}/reply/{reply_id} with body { user_id }
    pub async fn delete_reply(&self, discussion_id: &str, reply_id: &str) -> ClientResult<()> {
        let session = self.require_auth("delete a reply").await?;

        let response = self
            .http
            .delete(self.url(&format!(
                "/course/discussion/{discussion_id}/reply/{reply_id}"
            )))
            .bearer_auth(session.token)
            .json(&json!({ "user_id": session.user.id }))
            .send()
            .await?;

        Self::handle_empty(response).await
    }
}

fn page_params(limit: Option<usize>, offset: Option<usize>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset {
        params.push(("offset", offset.to_string()));
    }
    params
}
