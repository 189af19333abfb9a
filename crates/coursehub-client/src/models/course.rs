//! Course catalog models.
//!
//! A course summary is immutable once fetched and identified by an opaque
//! string id. The internal rating aggregate is fetched from the reviews
//! endpoint and merged client-side per fetch; the merge is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as returned by the catalog endpoints.
///
/// The search endpoint names the provider aggregates
/// `original_website_rating` / `original_website_num_ratings`; both shapes
/// deserialize into the same struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    /// Opaque course id
    pub id: String,

    /// Course title
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Hosting platform (e.g. "Coursera")
    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub is_free: bool,

    #[serde(default)]
    pub url: Option<String>,

    /// External (provider) average rating
    #[serde(default, alias = "original_website_rating")]
    pub rating: f64,

    /// External (provider) rating count
    #[serde(default, alias = "original_website_num_ratings")]
    pub num_ratings: i64,
}

/// Internal rating aggregate computed from this system's own reviews.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingStats {
    #[serde(default)]
    pub avg_rating: f64,

    #[serde(default)]
    pub review_count: i64,

    #[serde(default)]
    pub min_rating: f64,

    #[serde(default)]
    pub max_rating: f64,
}

/// A course summary merged with its internal rating aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCourse {
    #[serde(flatten)]
    pub course: CourseSummary,

    /// Internal aggregate, recomputed per fetch
    pub internal: RatingStats,
}

/// Wire shape of the plain listing endpoint: either a bare course array or an
/// envelope carrying an authoritative total.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CourseListing {
    Paged {
        courses: Vec<CourseSummary>,
        #[serde(default)]
        total: Option<u64>,
    },
    Plain(Vec<CourseSummary>),
}

impl CourseListing {
    pub fn into_parts(self) -> (Vec<CourseSummary>, Option<u64>) {
        match self {
            CourseListing::Paged { courses, total } => (courses, total),
            CourseListing::Plain(courses) => (courses, None),
        }
    }
}

/// Response envelope of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}

/// A resolved course reference for inline display inside discussion text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRef {
    pub id: String,
    pub title: String,
    /// Empty when unknown; display layers omit the parenthesized platform then.
    pub platform: String,
}

impl CourseRef {
    /// Placeholder shown while (or after) a reference fails to resolve,
    /// titled from the truncated id.
    pub fn placeholder(id: &str) -> Self {
        let short: String = id.chars().take(8).collect();
        Self {
            id: id.to_string(),
            title: format!("Course Reference (ID: {short}...)"),
            platform: String::new(),
        }
    }
}

impl From<&CourseSummary> for CourseRef {
    fn from(course: &CourseSummary) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            platform: course.platform.clone(),
        }
    }
}

/// A single review submitted through this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub username: Option<String>,

    pub rating: f64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Reviews plus the internal aggregate, as answered by the reviews endpoint.
/// HTTP 404 means "no reviews yet" and degrades to this type's default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewsResponse {
    #[serde(default)]
    pub reviews: Vec<Review>,

    #[serde(default)]
    pub stats: RatingStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_field_aliases() {
        let course: CourseSummary = serde_json::from_str(
            r#"{
                "id": "abc-123",
                "title": "Intro to Databases",
                "platform": "Coursera",
                "original_website_rating": 4.5,
                "original_website_num_ratings": 1200
            }"#,
        )
        .unwrap();
        assert_eq!(course.rating, 4.5);
        assert_eq!(course.num_ratings, 1200);
    }

    #[test]
    fn test_listing_shapes() {
        let plain: CourseListing =
            serde_json::from_str(r#"[{"id": "a", "title": "A"}]"#).unwrap();
        let (courses, total) = plain.into_parts();
        assert_eq!(courses.len(), 1);
        assert!(total.is_none());

        let paged: CourseListing =
            serde_json::from_str(r#"{"courses": [{"id": "a", "title": "A"}], "total": 97}"#)
                .unwrap();
        let (courses, total) = paged.into_parts();
        assert_eq!(courses.len(), 1);
        assert_eq!(total, Some(97));
    }

    #[test]
    fn test_placeholder_truncates_id() {
        let placeholder = CourseRef::placeholder("0123456789abcdef");
        assert_eq!(placeholder.title, "Course Reference (ID: 01234567...)");
        assert!(placeholder.platform.is_empty());
    }
}
