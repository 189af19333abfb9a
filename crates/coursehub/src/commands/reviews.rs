//! Review commands.

use anyhow::Result;

use coursehub_client::ApiClient;

use crate::render::format_date;

pub async fn list(
    api: &ApiClient,
    course_id: &str,
    limit: Option<usize>,
    offset: Option<usize>,
    json: bool,
) -> Result<()> {
    let response = api.course_reviews(course_id, limit, offset).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "reviews": response.reviews,
                "stats": response.stats,
            }))?
        );
        return Ok(());
    }

    if response.reviews.is_empty() {
        println!("No reviews yet for this course.");
        return Ok(());
    }

    println!(
        "{} reviews, average {:.1} (range {:.0}-{:.0})\n",
        response.stats.review_count,
        response.stats.avg_rating,
        response.stats.min_rating,
        response.stats.max_rating
    );

    for review in &response.reviews {
        let author = review.username.as_deref().unwrap_or("Anonymous");
        let date = review
            .created_at
            .as_ref()
            .map(format_date)
            .unwrap_or_default();
        println!("{:.0}/5  {author}  {date}", review.rating);
        if !review.description.is_empty() {
            println!("     {}", review.description);
        }
    }
    Ok(())
}

pub async fn submit(api: &ApiClient, course_id: &str, rating: f64, text: &str) -> Result<()> {
    match api.submit_review(course_id, rating, text).await {
        Ok(_) => {
            println!("Review submitted.");
            Ok(())
        }
        // The backend signals this only through its message text; show it as
        // a distinct notice rather than a generic failure.
        Err(e) if e.is_duplicate_review() => {
            println!("You have already reviewed this course. Delete your existing review first.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(api: &ApiClient, course_id: &str, review_id: &str) -> Result<()> {
    api.delete_review(course_id, review_id).await?;
    println!("Review deleted.");
    Ok(())
}
