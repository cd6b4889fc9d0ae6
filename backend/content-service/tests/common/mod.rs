pub mod mock_stores;

use std::sync::Arc;

use content_service::db::{CommentStore, EngagementStore, PostStore};
use content_service::models::{CreateCommentRequest, CreatePostRequest};
use content_service::services::{CommentService, PostService};
use mock_stores::{InMemoryCommentStore, InMemoryEngagementStore, InMemoryPostStore};

/// Shared in-memory stores wired the same way `main` wires the Postgres ones.
pub struct TestStores {
    pub posts: Arc<InMemoryPostStore>,
    pub comments: Arc<InMemoryCommentStore>,
    pub engagement: Arc<InMemoryEngagementStore>,
}

impl TestStores {
    pub fn new() -> Self {
        let engagement = Arc::new(InMemoryEngagementStore::default());
        let comments = Arc::new(InMemoryCommentStore::default());
        let posts = Arc::new(InMemoryPostStore::new(engagement.clone(), comments.clone()));
        Self {
            posts,
            comments,
            engagement,
        }
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(
            self.posts.clone() as Arc<dyn PostStore>,
            self.comments.clone() as Arc<dyn CommentStore>,
            self.engagement.clone() as Arc<dyn EngagementStore>,
        )
    }

    pub fn comment_service(&self) -> CommentService {
        CommentService::new(
            self.comments.clone() as Arc<dyn CommentStore>,
            self.posts.clone() as Arc<dyn PostStore>,
            self.engagement.clone() as Arc<dyn EngagementStore>,
        )
    }
}

pub fn post_request(title: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: title.to_string(),
        content: "post body".to_string(),
        image_url: None,
        link_url: None,
        tags: vec![],
    }
}

pub fn comment_request(content: &str, parent_id: Option<i64>) -> CreateCommentRequest {
    CreateCommentRequest {
        content: content.to_string(),
        parent_id,
    }
}
