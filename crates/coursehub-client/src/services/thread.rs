//! Reply threading.
//!
//! The API returns replies flat, each with an optional parent id. Display
//! needs a rooted forest. The transform is pure, O(n), and order-preserving
//! within each sibling group; it never re-sorts by timestamp.

use std::collections::HashMap;

use crate::models::{Reply, ReplyNode, ANONYMOUS_AUTHOR, DELETED_TEXT};

/// Build an ordered forest from an unordered flat reply list.
///
/// Every input reply appears in exactly one node. A reply whose parent id
/// matches another reply becomes its child; a null, unresolvable, or
/// self-referencing parent makes the reply a root. Parent cycles are broken
/// by promoting the first cycle member (in input order) to a root, so the
/// forest always covers the full input and display cannot recurse forever.
pub fn build_reply_forest(replies: &[Reply]) -> Vec<ReplyNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(replies.len());
    for (i, reply) in replies.iter().enumerate() {
        index.insert(reply.id.as_str(), i);
    }

    let mut parents: Vec<Option<usize>> = vec![None; replies.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); replies.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, reply) in replies.iter().enumerate() {
        let parent = reply
            .parent_reply_id
            .as_deref()
            .and_then(|p| index.get(p).copied())
            .filter(|&p| p != i);

        match parent {
            Some(p) => {
                parents[i] = Some(p);
                children[p].push(i);
            }
            None => roots.push(i),
        }
    }

    // Nodes trapped in a parent cycle are reachable from no root; detach the
    // first such node from its parent and promote it, which frees the rest
    // of its cycle as descendants.
    let mut reachable = vec![false; replies.len()];
    for &root in &roots {
        mark_reachable(root, &children, &mut reachable);
    }
    for i in 0..replies.len() {
        if !reachable[i] {
            if let Some(p) = parents[i] {
                children[p].retain(|&c| c != i);
            }
            roots.push(i);
            mark_reachable(i, &children, &mut reachable);
        }
    }

    let mut slots: Vec<Option<Reply>> = replies.iter().cloned().map(Some).collect();
    roots
        .iter()
        .map(|&root| assemble(root, &children, &mut slots))
        .collect()
}

fn mark_reachable(start: usize, children: &[Vec<usize>], reachable: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if reachable[node] {
            continue;
        }
        reachable[node] = true;
        stack.extend(&children[node]);
    }
}

fn assemble(i: usize, children: &[Vec<usize>], slots: &mut Vec<Option<Reply>>) -> ReplyNode {
    let reply = slots[i].take().expect("each reply is assembled once");
    let child_replies = children[i]
        .iter()
        .map(|&c| assemble(c, children, slots))
        .collect();
    ReplyNode {
        reply,
        child_replies,
    }
}

/// Locally mark a reply deleted after the server confirmed the deletion:
/// the text becomes the sentinel and the author is anonymized, while the
/// node keeps its position and children. Returns false when the id is not
/// in the forest.
pub fn redact_reply(forest: &mut [ReplyNode], reply_id: &str) -> bool {
    for node in forest.iter_mut() {
        if node.reply.id == reply_id {
            node.reply.text = DELETED_TEXT.to_string();
            node.reply.username = Some(ANONYMOUS_AUTHOR.to_string());
            return true;
        }
        if redact_reply(&mut node.child_replies, reply_id) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reply(id: &str, parent: Option<&str>) -> Reply {
        Reply {
            id: id.to_string(),
            text: format!("text of {id}"),
            user_id: 1,
            username: Some("ada".to_string()),
            created_at: Utc::now(),
            parent_reply_id: parent.map(str::to_string),
        }
    }

    fn flatten_ids(forest: &[ReplyNode], out: &mut Vec<String>) {
        for node in forest {
            out.push(node.reply.id.clone());
            flatten_ids(&node.child_replies, out);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_forest() {
        assert!(build_reply_forest(&[]).is_empty());
    }

    #[test]
    fn test_children_attach_to_parents() {
        let replies = vec![
            reply("r1", None),
            reply("r2", Some("r1")),
            reply("r3", Some("r1")),
            reply("r4", Some("r2")),
        ];
        let forest = build_reply_forest(&replies);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].reply.id, "r1");
        assert_eq!(forest[0].child_replies.len(), 2);
        assert_eq!(forest[0].child_replies[0].reply.id, "r2");
        assert_eq!(forest[0].child_replies[1].reply.id, "r3");
        assert_eq!(forest[0].child_replies[0].child_replies[0].reply.id, "r4");
    }

    #[test]
    fn test_unresolvable_parent_becomes_root() {
        let replies = vec![reply("r1", None), reply("r2", Some("missing"))];
        let forest = build_reply_forest(&replies);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].reply.id, "r2");
        assert!(forest[1].child_replies.is_empty());
    }

    #[test]
    fn test_flatten_preserves_the_input_set() {
        let replies = vec![
            reply("a", Some("b")),
            reply("b", None),
            reply("c", Some("ghost")),
            reply("d", Some("a")),
        ];
        let forest = build_reply_forest(&replies);

        let mut ids = Vec::new();
        flatten_ids(&forest, &mut ids);
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sibling_order_follows_input_order() {
        let replies = vec![
            reply("p", None),
            reply("z", Some("p")),
            reply("a", Some("p")),
            reply("m", Some("p")),
        ];
        let forest = build_reply_forest(&replies);
        let siblings: Vec<&str> = forest[0]
            .child_replies
            .iter()
            .map(|n| n.reply.id.as_str())
            .collect();
        assert_eq!(siblings, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_self_parent_is_a_root() {
        let replies = vec![reply("loop", Some("loop"))];
        let forest = build_reply_forest(&replies);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].child_replies.is_empty());
    }

    #[test]
    fn test_cycle_is_broken_without_losing_replies() {
        // a -> b -> c -> a
        let replies = vec![
            reply("a", Some("c")),
            reply("b", Some("a")),
            reply("c", Some("b")),
        ];
        let forest = build_reply_forest(&replies);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].reply.id, "a");

        let mut ids = Vec::new();
        flatten_ids(&forest, &mut ids);
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_redact_keeps_position_and_children() {
        let replies = vec![
            reply("r1", None),
            reply("r2", Some("r1")),
            reply("r3", Some("r2")),
        ];
        let mut forest = build_reply_forest(&replies);

        assert!(redact_reply(&mut forest, "r2"));

        let redacted = &forest[0].child_replies[0];
        assert_eq!(redacted.reply.text, DELETED_TEXT);
        assert_eq!(redacted.reply.username.as_deref(), Some(ANONYMOUS_AUTHOR));
        assert!(redacted.reply.is_deleted());
        assert_eq!(redacted.child_replies[0].reply.id, "r3");
    }

    #[test]
    fn test_redact_unknown_id_is_a_noop() {
        let mut forest = build_reply_forest(&[reply("r1", None)]);
        assert!(!redact_reply(&mut forest, "nope"));
        assert_eq!(forest[0].reply.text, "text of r1");
    }
}
