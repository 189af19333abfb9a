//! Plain-text rendering helpers for the terminal.

use chrono::{DateTime, Utc};
use coursehub_client::models::ReplyNode;
use coursehub_client::services::reference::TextSegment;

/// Flatten rendered segments into one displayable line of text. Course
/// references become "📚 Title (Platform)".
pub fn segments_to_text(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            TextSegment::Plain(text) => text.clone(),
            TextSegment::Reference(course) => {
                if course.platform.is_empty() {
                    format!("📚 {}", course.title)
                } else {
                    format!("📚 {} ({})", course.title, course.platform)
                }
            }
        })
        .collect()
}

pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %e, %Y").to_string()
}

/// Print a reply forest with two-space indentation per nesting level.
pub fn print_reply_tree(nodes: &[ReplyNode], depth: usize, original_poster_id: i64) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let author = node
            .reply
            .username
            .as_deref()
            .unwrap_or(coursehub_client::models::ANONYMOUS_AUTHOR);
        let op_tag = if node.reply.user_id == original_poster_id && !node.reply.is_deleted() {
            " [OP]"
        } else {
            ""
        };
        println!(
            "{indent}{author}{op_tag} · {}",
            format_date(&node.reply.created_at)
        );
        println!("{indent}  {}", node.reply.text);
        print_reply_tree(&node.child_replies, depth + 1, original_poster_id);
    }
}
