/// Comment thread assembly
///
/// Turns the flat, paginated comment page returned by the store into a
/// forest of root comments with nested reply lists. Pure and synchronous;
/// no I/O.
use std::collections::HashMap;

use crate::models::CommentView;

/// Assemble a flat page of comments into root comments with nested replies.
///
/// One pass partitions the input into roots and a parent-id grouping map,
/// preserving each group's relative order; each root then recursively claims
/// its subtree. A comment whose parent is not part of this page is dropped:
/// the parent may live on another page, and no cross-page stitching is
/// attempted.
pub fn build_comment_tree(comments: Vec<CommentView>) -> Vec<CommentView> {
    let mut roots: Vec<CommentView> = Vec::new();
    let mut children: HashMap<i64, Vec<CommentView>> = HashMap::new();

    for comment in comments {
        match comment.parent_id {
            None => roots.push(comment),
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
        }
    }

    for root in &mut roots {
        attach_replies(root, &mut children);
    }

    roots
}

fn attach_replies(comment: &mut CommentView, children: &mut HashMap<i64, Vec<CommentView>>) {
    if let Some(mut replies) = children.remove(&comment.id) {
        for reply in &mut replies {
            attach_replies(reply, children);
        }
        comment.replies = replies;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn comment(id: i64, parent_id: Option<i64>) -> CommentView {
        CommentView {
            id,
            post_id: 1,
            user_id: Uuid::new_v4(),
            content: format!("comment {}", id),
            parent_id,
            like_count: 0,
            reply_count: 0,
            is_liked: false,
            is_reported: false,
            replies: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ids(forest: &[CommentView]) -> Vec<i64> {
        forest.iter().map(|c| c.id).collect()
    }

    #[test]
    fn nests_replies_under_their_parents() {
        let forest = build_comment_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![2, 3]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec![4]);
        assert!(forest[0].replies[0].replies[0].replies.is_empty());
        assert!(forest[0].replies[1].replies.is_empty());
    }

    #[test]
    fn drops_replies_whose_parent_is_not_on_this_page() {
        let forest = build_comment_tree(vec![comment(5, Some(99))]);
        assert!(forest.is_empty());
    }

    #[test]
    fn orphan_is_not_promoted_even_among_roots() {
        let forest = build_comment_tree(vec![
            comment(1, None),
            comment(5, Some(99)),
            comment(2, Some(1)),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![2]);
    }

    #[test]
    fn preserves_input_order_for_roots_and_reply_groups() {
        let forest = build_comment_tree(vec![
            comment(10, None),
            comment(30, Some(10)),
            comment(20, None),
            comment(25, Some(10)),
        ]);

        assert_eq!(ids(&forest), vec![10, 20]);
        assert_eq!(ids(&forest[0].replies), vec![30, 25]);
    }

    #[test]
    fn attaches_children_that_appear_before_their_parent() {
        // Newest-first pages list replies before their parents.
        let forest = build_comment_tree(vec![
            comment(4, Some(2)),
            comment(3, Some(1)),
            comment(2, Some(1)),
            comment(1, None),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![3, 2]);
        assert_eq!(ids(&forest[0].replies[1].replies), vec![4]);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }
}
