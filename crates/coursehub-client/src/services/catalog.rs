//! Catalog query engine.
//!
//! Resolves one [`QueryState`] into one [`CoursePage`] through five phases in
//! strict order: fetch, enrich, filter, sort, paginate. Search and plain
//! listing paginate differently by design: full-text search cannot be
//! paginated server-side, so the client fetches a capped working set and
//! slices locally; the unfiltered listing uses server offset/limit.
//!
//! Any fetch failure aborts the whole query; no partial pages. Runs are
//! sequenced with a monotonic id so a slow, superseded run is discarded
//! instead of overwriting newer results.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use serde::Serialize;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{EnrichedCourse, RatingStats};

/// Sort key over the two rating aggregates. Unset means fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    InternalRating,
    ExternalRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Minimum-threshold filters. An unset filter always passes; set filters
/// compose with logical AND.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilters {
    /// Internal avg_rating >= threshold
    pub internal_rating: Option<f64>,

    /// External (provider) rating >= threshold
    pub external_rating: Option<f64>,

    /// Internal review_count >= threshold
    pub internal_review_count: Option<i64>,

    /// External num_ratings >= threshold
    pub external_review_count: Option<i64>,

    /// Tri-state: None passes everything, Some(..) is an exact match
    pub is_free: Option<bool>,
}

impl CatalogFilters {
    pub fn is_empty(&self) -> bool {
        self.internal_rating.is_none()
            && self.external_rating.is_none()
            && self.internal_review_count.is_none()
            && self.external_review_count.is_none()
            && self.is_free.is_none()
    }

    fn passes(&self, course: &EnrichedCourse) -> bool {
        self.internal_rating
            .map_or(true, |min| course.internal.avg_rating >= min)
            && self
                .external_rating
                .map_or(true, |min| course.course.rating >= min)
            && self
                .internal_review_count
                .map_or(true, |min| course.internal.review_count >= min)
            && self
                .external_review_count
                .map_or(true, |min| course.course.num_ratings >= min)
            && self.is_free.map_or(true, |free| course.course.is_free == free)
    }
}

/// The sole input to a catalog run; recomputed, not patched, on every change.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// Search text; blank selects listing mode
    pub query: String,

    pub filters: CatalogFilters,

    pub sort: Option<SortSpec>,

    /// 1-based page number
    pub page: usize,

    pub page_size: usize,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            filters: CatalogFilters::default(),
            sort: None,
            page: 1,
            page_size,
        }
    }

    fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1) * self.page_size
    }

    fn is_search(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// One resolved page of enriched courses.
#[derive(Debug, Clone, Serialize)]
pub struct CoursePage {
    pub courses: Vec<EnrichedCourse>,

    /// Filtered-result length in search mode; in listing mode either the
    /// backend's authoritative count or an estimate (see
    /// [`CoursePage::total_is_estimate`]).
    pub total: u64,

    /// Listing mode without an authoritative count estimates the total from
    /// the page shape: a full page implies at least one more page.
    pub total_is_estimate: bool,

    pub page: usize,

    pub page_size: usize,
}

impl CoursePage {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

/// Executes catalog queries against the API.
pub struct CatalogEngine {
    api: ApiClient,
    search_batch_limit: usize,
    seq: AtomicU64,
}

impl CatalogEngine {
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        Self {
            api,
            search_batch_limit: config.search_batch_limit,
            seq: AtomicU64::new(0),
        }
    }

    /// Run the five phases for one query state.
    ///
    /// Returns [`ClientError::Superseded`] when a newer run started before
    /// this one finished; callers drop that result silently.
    pub async fn run(&self, state: &QueryState) -> ClientResult<CoursePage> {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            query = %state.query,
            page = state.page,
            page_size = state.page_size,
            "catalog query"
        );

        // Fetch
        let (fetched, authoritative_total) = if state.is_search() {
            let courses = self
                .api
                .query_courses(state.query.trim(), self.search_batch_limit)
                .await?;
            (courses, None)
        } else {
            self.api
                .list_courses(state.page_size, state.offset())
                .await?
        };
        let returned = fetched.len();

        // Enrich: one stats request per course, all in flight at once.
        let stats: Vec<RatingStats> =
            join_all(fetched.iter().map(|c| self.api.course_rating_stats(&c.id)))
                .await
                .into_iter()
                .collect::<ClientResult<_>>()?;

        let mut courses: Vec<EnrichedCourse> = fetched
            .into_iter()
            .zip(stats)
            .map(|(course, internal)| EnrichedCourse { course, internal })
            .collect();

        // Filter
        courses.retain(|c| state.filters.passes(c));

        // Sort
        if let Some(sort) = state.sort {
            sort_courses(&mut courses, sort);
        }

        // Paginate
        let result = if state.is_search() {
            paginate_search(courses, state.page, state.page_size)
        } else {
            let (total, total_is_estimate) = match authoritative_total {
                Some(total) => (total, false),
                None => (
                    estimate_total(state.offset(), returned, state.page_size),
                    true,
                ),
            };
            CoursePage {
                courses,
                total,
                total_is_estimate,
                page: state.page,
                page_size: state.page_size,
            }
        };

        // A newer run started while this one was awaiting; its result wins.
        if self.seq.load(Ordering::SeqCst) != ticket {
            return Err(ClientError::Superseded);
        }
        Ok(result)
    }
}

fn sort_value(course: &EnrichedCourse, key: SortKey) -> f64 {
    match key {
        SortKey::InternalRating => course.internal.avg_rating,
        SortKey::ExternalRating => course.course.rating,
    }
}

/// Stable sort; ties keep their relative fetch order.
fn sort_courses(courses: &mut [EnrichedCourse], sort: SortSpec) {
    courses.sort_by(|a, b| {
        let ord = sort_value(a, sort.key).total_cmp(&sort_value(b, sort.key));
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Search mode slices the filtered+sorted working set locally; the total is
/// authoritative because the whole (capped) result set is in hand.
fn paginate_search(courses: Vec<EnrichedCourse>, page: usize, page_size: usize) -> CoursePage {
    let total = courses.len() as u64;
    let start = page.max(1).saturating_sub(1) * page_size;
    let slice: Vec<EnrichedCourse> = courses.into_iter().skip(start).take(page_size).collect();
    CoursePage {
        courses: slice,
        total,
        total_is_estimate: false,
        page,
        page_size,
    }
}

/// Listing mode has no count in hand. A full page implies at least one more
/// page; a short page signals the end.
fn estimate_total(offset: usize, returned: usize, page_size: usize) -> u64 {
    if returned < page_size {
        (offset + returned) as u64
    } else {
        (offset + returned + page_size) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseSummary;

    fn course(id: &str, external: f64, internal: f64, is_free: bool) -> EnrichedCourse {
        let course: CourseSummary = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Course {id}"),
            "rating": external,
            "num_ratings": 100,
            "is_free": is_free,
        }))
        .unwrap();
        EnrichedCourse {
            course,
            internal: RatingStats {
                avg_rating: internal,
                review_count: 10,
                min_rating: 1.0,
                max_rating: 5.0,
            },
        }
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let filters = CatalogFilters::default();
        assert!(filters.is_empty());

        let mut courses = vec![
            course("a", 3.0, 2.0, false),
            course("b", 5.0, 4.0, true),
            course("c", 1.0, 1.0, false),
        ];
        let before: Vec<String> = courses.iter().map(|c| c.course.id.clone()).collect();
        courses.retain(|c| filters.passes(c));
        let after: Vec<String> = courses.iter().map(|c| c.course.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let filters = CatalogFilters {
            external_rating: Some(3.0),
            is_free: Some(true),
            ..CatalogFilters::default()
        };

        assert!(filters.passes(&course("a", 4.0, 0.0, true)));
        assert!(!filters.passes(&course("b", 4.0, 0.0, false)));
        assert!(!filters.passes(&course("c", 2.0, 0.0, true)));
    }

    #[test]
    fn test_is_free_tri_state() {
        let paid_only = CatalogFilters {
            is_free: Some(false),
            ..CatalogFilters::default()
        };
        assert!(paid_only.passes(&course("a", 0.0, 0.0, false)));
        assert!(!paid_only.passes(&course("b", 0.0, 0.0, true)));
    }

    #[test]
    fn test_sort_external_descending() {
        let mut courses = vec![
            course("a", 3.0, 0.0, false),
            course("b", 5.0, 0.0, false),
            course("c", 1.0, 0.0, false),
        ];
        sort_courses(
            &mut courses,
            SortSpec {
                key: SortKey::ExternalRating,
                direction: SortDirection::Descending,
            },
        );
        let ratings: Vec<f64> = courses.iter().map(|c| c.course.rating).collect();
        assert_eq!(ratings, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_sort_internal_ascending_is_stable() {
        let mut courses = vec![
            course("a", 0.0, 2.0, false),
            course("b", 0.0, 2.0, false),
            course("c", 0.0, 1.0, false),
        ];
        sort_courses(
            &mut courses,
            SortSpec {
                key: SortKey::InternalRating,
                direction: SortDirection::Ascending,
            },
        );
        let ids: Vec<&str> = courses.iter().map(|c| c.course.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_search_pagination_slices_locally() {
        let courses: Vec<EnrichedCourse> = (0..30)
            .map(|i| course(&format!("c{i}"), 0.0, 0.0, false))
            .collect();

        let page = paginate_search(courses, 2, 12);
        assert_eq!(page.total, 30);
        assert!(!page.total_is_estimate);
        assert_eq!(page.courses.len(), 12);
        assert_eq!(page.courses.first().unwrap().course.id, "c12");
        assert_eq!(page.courses.last().unwrap().course.id, "c23");
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_search_pagination_past_the_end() {
        let courses: Vec<EnrichedCourse> =
            (0..5).map(|i| course(&format!("c{i}"), 0.0, 0.0, false)).collect();
        let page = paginate_search(courses, 4, 12);
        assert!(page.courses.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_estimated_total_full_and_short_pages() {
        assert_eq!(estimate_total(24, 12, 12), 48);
        assert_eq!(estimate_total(24, 5, 12), 29);
        assert_eq!(estimate_total(0, 0, 12), 0);
    }

    #[test]
    fn test_query_state_offset() {
        let mut state = QueryState::new(12);
        assert_eq!(state.offset(), 0);
        state.page = 3;
        assert_eq!(state.offset(), 24);
        assert!(!state.is_search());
        state.query = "  rust  ".to_string();
        assert!(state.is_search());
    }
}
