//! Catalog browsing commands.

use anyhow::Result;

use coursehub_client::services::catalog::{
    CatalogEngine, CatalogFilters, QueryState, SortDirection, SortSpec,
};
use coursehub_client::{ApiClient, ClientConfig};

use crate::CoursesArgs;

/// Run one catalog query and print the resulting page.
pub async fn browse(api: &ApiClient, config: &ClientConfig, args: CoursesArgs) -> Result<()> {
    let is_free = if args.free {
        Some(true)
    } else if args.paid {
        Some(false)
    } else {
        None
    };

    let state = QueryState {
        query: args.query.clone().unwrap_or_default(),
        filters: CatalogFilters {
            internal_rating: args.min_internal_rating,
            external_rating: args.min_external_rating,
            internal_review_count: args.min_internal_reviews,
            external_review_count: args.min_external_reviews,
            is_free,
        },
        sort: args.sort.map(|key| SortSpec {
            key: key.into(),
            direction: if args.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }),
        page: args.page,
        page_size: args.page_size.unwrap_or(config.page_size),
    };

    let engine = CatalogEngine::new(api.clone(), config);
    let page = match engine.run(&state).await {
        // A one-shot CLI run cannot be superseded, but the contract says
        // a stale result is dropped, not shown.
        Err(e) if e.is_superseded() => return Ok(()),
        other => other?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.courses.is_empty() {
        println!("No courses found. Try adjusting your search criteria.");
        return Ok(());
    }

    if let Some(query) = &args.query {
        println!("Showing results for: {query}\n");
    }

    println!(
        "  {:<44} {:<14} {:>9} {:>9} {:>6}",
        "TITLE", "PLATFORM", "EXTERNAL", "INTERNAL", "FREE"
    );
    for entry in &page.courses {
        let title: String = entry.course.title.chars().take(42).collect();
        println!(
            "  {:<44} {:<14} {:>9} {:>9} {:>6}",
            title,
            entry.course.platform,
            format!("{:.1} ({})", entry.course.rating, entry.course.num_ratings),
            format!(
                "{:.1} ({})",
                entry.internal.avg_rating, entry.internal.review_count
            ),
            if entry.course.is_free { "yes" } else { "no" },
        );
    }

    let total = if page.total_is_estimate {
        format!("~{}", page.total)
    } else {
        page.total.to_string()
    };
    println!(
        "\nPage {} of {} ({} courses)",
        page.page,
        page.total_pages().max(1),
        total
    );
    Ok(())
}

/// Show one course in detail. The reviews section has its own error slot so
/// a failing aggregate does not hide the course itself.
pub async fn detail(api: &ApiClient, course_id: &str, json: bool) -> Result<()> {
    let course = api.get_course(course_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&course)?);
        return Ok(());
    }

    println!("{}", course.title);
    if !course.platform.is_empty() {
        println!("Platform:  {}", course.platform);
    }
    if !course.authors.is_empty() {
        println!("Authors:   {}", course.authors.join(", "));
    }
    if !course.skills.is_empty() {
        println!("Skills:    {}", course.skills.join(", "));
    }
    println!("Price:     {}", if course.is_free { "free" } else { "paid" });
    println!(
        "Platform rating: {:.1} ({} ratings)",
        course.rating, course.num_ratings
    );
    if let Some(url) = &course.url {
        println!("URL:       {url}");
    }
    if !course.description.is_empty() {
        println!("\n{}", course.description);
    }

    match api.course_reviews(course_id, Some(1), None).await {
        Ok(reviews) => {
            println!(
                "\nCourseHub rating: {:.1} ({} reviews)",
                reviews.stats.avg_rating, reviews.stats.review_count
            );
        }
        Err(e) => println!("\nError loading review stats: {e}"),
    }

    Ok(())
}
