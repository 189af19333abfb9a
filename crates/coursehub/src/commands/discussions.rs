//! Discussion and reply commands.

use anyhow::Result;

use coursehub_client::services::reference::{reference_token, scan_ids, ReferenceResolver};
use coursehub_client::services::thread::{build_reply_forest, redact_reply};
use coursehub_client::ApiClient;

use crate::render::{format_date, print_reply_tree, segments_to_text};

/// List discussions: the global feed, or one course's.
pub async fn list(
    api: &ApiClient,
    course_id: Option<&str>,
    limit: Option<usize>,
    offset: Option<usize>,
    json: bool,
) -> Result<()> {
    let response = match course_id {
        Some(course_id) => api.course_discussions(course_id, limit, offset).await?,
        None => api.all_discussions(limit, offset).await?,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "discussions": response.discussions,
                "pagination": response.pagination,
            }))?
        );
        return Ok(());
    }

    if response.discussions.is_empty() {
        println!("No discussions yet.");
        return Ok(());
    }

    // Resolve every referenced course across the page before rendering:
    // one fetch per unique id, not per occurrence.
    let resolver = ReferenceResolver::new(api.clone());
    resolver
        .prefetch(response.discussions.iter().map(|d| d.description.as_str()))
        .await;

    for discussion in &response.discussions {
        let author = discussion.username.as_deref().unwrap_or("Anonymous");
        let replies = discussion.reply_count.unwrap_or(0);
        println!(
            "[{}] {}  by {} · {} · {} replies",
            discussion.id,
            discussion.title,
            author,
            format_date(&discussion.created_at),
            replies
        );
        let body = resolver.render(&discussion.description).await;
        println!("    {}\n", segments_to_text(&body));
    }

    if let Some(pagination) = &response.pagination {
        println!(
            "Showing {} of {} (offset {})",
            pagination.returned, pagination.total, pagination.offset
        );
    }
    Ok(())
}

/// Show one discussion with its rendered body and threaded replies.
pub async fn show(api: &ApiClient, discussion_id: &str) -> Result<()> {
    let discussion = api.get_discussion(discussion_id).await?;

    let resolver = ReferenceResolver::new(api.clone());
    resolver.prefetch([discussion.description.as_str()]).await;

    let author = discussion.username.as_deref().unwrap_or("Anonymous");
    println!("{}", discussion.title);
    println!("{author} [OP] · {}\n", format_date(&discussion.created_at));
    let body = resolver.render(&discussion.description).await;
    println!("{}\n", segments_to_text(&body));

    // Replies have their own error slot; a failed fetch doesn't hide the body.
    match api.discussion_replies(discussion_id).await {
        Ok(replies) if replies.is_empty() => {
            println!("No replies yet. Be the first to reply!");
        }
        Ok(replies) => {
            let forest = build_reply_forest(&replies);
            println!("Replies:");
            print_reply_tree(&forest, 0, discussion.user_id);
        }
        Err(e) => println!("Error loading replies: {e}"),
    }
    Ok(())
}

/// Start a new discussion. `--reference` ids are appended to the body as
/// tokens; the full id set sent to the server is whatever the final body
/// embeds.
pub async fn create(
    api: &ApiClient,
    title: &str,
    text: &str,
    references: &[String],
) -> Result<()> {
    let mut body = text.to_string();
    for course_id in references {
        body.push(' ');
        body.push_str(&reference_token(course_id));
    }

    let course_ids = scan_ids(&body);
    let created = api.create_discussion(title, &body, &course_ids).await?;

    match created.discussion_id {
        Some(id) => println!("Discussion created: {id}"),
        None => println!("Discussion created."),
    }
    if !course_ids.is_empty() {
        println!("Referenced courses: {}", course_ids.join(", "));
    }
    Ok(())
}

pub async fn reply(
    api: &ApiClient,
    discussion_id: &str,
    parent: Option<&str>,
    text: &str,
) -> Result<()> {
    let created = match parent {
        Some(parent_reply_id) => {
            api.post_nested_reply(discussion_id, parent_reply_id, text)
                .await?
        }
        None => api.post_reply(discussion_id, text).await?,
    };
    println!("Reply posted: {}", created.reply_id);
    Ok(())
}

/// Delete a reply, then re-render the thread with the node redacted
/// locally: it keeps its place and its children, with the author anonymized.
pub async fn delete_reply(api: &ApiClient, discussion_id: &str, reply_id: &str) -> Result<()> {
    let discussion = api.get_discussion(discussion_id).await?;
    let replies = api.discussion_replies(discussion_id).await?;

    api.delete_reply(discussion_id, reply_id).await?;

    let mut forest = build_reply_forest(&replies);
    redact_reply(&mut forest, reply_id);

    println!("Reply deleted.\n");
    print_reply_tree(&forest, 0, discussion.user_id);
    Ok(())
}
