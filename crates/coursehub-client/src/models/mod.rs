//! Wire-level data model for the CourseHub backend.

pub mod course;
pub mod discussion;
pub mod user;

pub use course::{
    CourseListing, CourseRef, CourseSummary, EnrichedCourse, RatingStats, Review, ReviewsResponse,
    SearchResponse,
};
pub use discussion::{
    Discussion, DiscussionCreated, DiscussionsResponse, PageInfo, RepliesResponse, Reply,
    ReplyCreated, ReplyNode, ANONYMOUS_AUTHOR, DELETED_TEXT,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, UserIdentity};
