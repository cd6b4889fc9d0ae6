/// Data models for the content service
///
/// Row types (`Post`, `Comment`) map 1:1 to storage and derive
/// `sqlx::FromRow`. View types (`PostView`, `CommentView`) are the outward
/// representations: row fields plus derived counts, tags, and the
/// viewer-scoped engagement flags. Request bodies carry their validation
/// rules inline via `validator`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Post row as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new post. The owner is assigned here, once, and is
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
}

/// Viewer-scoped engagement flags for a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostEngagement {
    pub is_liked: bool,
    pub is_saved: bool,
    pub is_reported: bool,
}

/// Post row joined with aggregate counts and, when the store computed them
/// in the same round trip, the viewer's engagement flags. `engagement: None`
/// means the caller must back-fill flags from the ledger.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub like_count: i64,
    pub comment_count: i64,
    pub engagement: Option<PostEngagement>,
}

/// Outward-facing post representation
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
    pub is_saved: bool,
    pub is_reported: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment row as stored. `parent_id = None` marks a root comment attached
/// directly to the post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: Uuid,
    pub content: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outward-facing comment representation with nested replies
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub user_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub like_count: i64,
    pub reply_count: i64,
    pub is_liked: bool,
    pub is_reported: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        CommentView {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            parent_id: comment.parent_id,
            like_count: 0,
            reply_count: 0,
            is_liked: false,
            is_reported: false,
            replies: Vec::new(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Request body for creating a post
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 3, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating a post. Absent fields keep their stored value;
/// empty strings are treated as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 3, max = 255))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdatePostRequest {
    /// Normalize empty strings to `None` so they leave the stored value
    /// untouched instead of failing length validation.
    pub fn normalized(mut self) -> Self {
        fn drop_empty(field: &mut Option<String>) {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }

        drop_empty(&mut self.title);
        drop_empty(&mut self.content);
        drop_empty(&mut self.image_url);
        drop_empty(&mut self.link_url);
        self
    }
}

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
    pub parent_id: Option<i64>,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_request_rejects_short_title() {
        let req = CreatePostRequest {
            title: "hi".to_string(),
            content: "body".to_string(),
            image_url: None,
            link_url: None,
            tags: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_post_request_normalizes_empty_fields() {
        let req = UpdatePostRequest {
            title: Some("  ".to_string()),
            content: Some("new body".to_string()),
            image_url: Some(String::new()),
            link_url: None,
            tags: None,
        };

        let normalized = req.normalized();
        assert!(normalized.title.is_none());
        assert!(normalized.image_url.is_none());
        assert_eq!(normalized.content.as_deref(), Some("new body"));
        assert!(normalized.validate().is_ok());
    }

    #[test]
    fn comment_view_starts_without_replies_or_flags() {
        let comment = Comment {
            id: 7,
            post_id: 1,
            user_id: Uuid::new_v4(),
            content: "hello".to_string(),
            parent_id: Some(3),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let view = CommentView::from(comment);
        assert_eq!(view.parent_id, Some(3));
        assert_eq!(view.like_count, 0);
        assert!(!view.is_liked);
        assert!(view.replies.is_empty());
    }
}
