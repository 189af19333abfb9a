//! Course catalog and review endpoints.

use serde_json::json;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{CourseListing, CourseSummary, RatingStats, ReviewsResponse, SearchResponse};

impl ApiClient {
    /// Paginated course listing.
    /// GET /course?limit&offset
    ///
    /// Returns the page plus the authoritative total when the backend sends
    /// one; older deployments answer with a bare array.
    pub async fn list_courses(
        &self,
        limit: usize,
        offset: usize,
    ) -> ClientResult<(Vec<CourseSummary>, Option<u64>)> {
        let response = self
            .http
            .get(self.url("/course"))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;

        let listing: CourseListing = Self::handle(response).await?;
        Ok(listing.into_parts())
    }

    /// Semantic course search, capped to a bounded working set.
    /// POST /course/query with { query, limit }
    pub async fn query_courses(
        &self,
        query: &str,
        limit: usize,
    ) -> ClientResult<Vec<CourseSummary>> {
        let response = self
            .http
            .post(self.url("/course/query"))
            .json(&json!({ "query": query, "limit": limit }))
            .send()
            .await?;

        let body: SearchResponse = Self::handle(response).await?;
        Ok(body.courses)
    }

    /// Course detail.
    /// GET /course/{id}
    pub async fn get_course(&self, course_id: &str) -> ClientResult<CourseSummary> {
        let response = self
            .http
            .get(self.url(&format!("/course/{course_id}")))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Reviews plus the internal rating aggregate for a course.
    /// GET /course/{id}/reviews?limit&offset
    ///
    /// A 404 means no reviews exist yet and degrades to empty defaults.
    pub async fn course_reviews(
        &self,
        course_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> ClientResult<ReviewsResponse> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let response = self
            .http
            .get(self.url(&format!("/course/{course_id}/reviews")))
            .query(&params)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(ReviewsResponse::default());
        }

        Self::handle(response).await
    }

    /// The internal rating aggregate alone, used by catalog enrichment.
    pub async fn course_rating_stats(&self, course_id: &str) -> ClientResult<RatingStats> {
        let reviews = self.course_reviews(course_id, Some(1), None).await?;
        Ok(reviews.stats)
    }

    /// Submit a rating + text review for a course (requires login).
    /// POST /course/{id}/review
    pub async fn submit_review(
        &self,
        course_id: &str,
        rating: f64,
        description: &str,
    ) -> ClientResult<serde_json::Value> {
        let session = self.require_auth("submit a review").await?;

        if !(1.0..=5.0).contains(&rating) {
            return Err(ClientError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.url(&format!("/course/{course_id}/review")))
            .bearer_auth(session.token)
            .json(&json!({ "rating": rating, "description": description }))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Delete one of your own reviews (requires login).
    /// DELETE /course/{id}/review/{review_id}
    pub async fn delete_review(&self, course_id: &str, review_id: &str) -> ClientResult<()> {
        let session = self.require_auth("delete a review").await?;

        let response = self
            .http
            .delete(self.url(&format!("/course/{course_id}/review/{review_id}")))
            .bearer_auth(session.token)
            .send()
            .await?;

        Self::handle_empty(response).await
    }
}
