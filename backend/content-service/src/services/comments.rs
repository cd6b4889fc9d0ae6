/// Comment service - comment view composition and owner-scoped mutations
///
/// Validates the parent/post relationship at creation time, shapes flat
/// comment pages into threads, and scopes engagement flags to the acting
/// viewer. All counts are derived from the ledger and comment rows on read.
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::db::{CommentStore, EngagementStore, PostStore, Relation};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentView, CreateCommentRequest, UpdateCommentRequest};
use crate::services::comment_tree::build_comment_tree;
use crate::services::{clamp_page, clamp_page_size};

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
    engagement: Arc<dyn EngagementStore>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        posts: Arc<dyn PostStore>,
        engagement: Arc<dyn EngagementStore>,
    ) -> Self {
        Self {
            comments,
            posts,
            engagement,
        }
    }

    /// Create a comment on a post, optionally as a reply.
    ///
    /// The parent comment, when given, must exist and belong to the same
    /// post. Returns the freshly reloaded comment so the caller observes
    /// what is actually stored.
    pub async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentView> {
        req.validate()?;

        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;

        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::Validation("parent comment not found".to_string()))?;

            if parent.post_id != post_id {
                return Err(AppError::Validation(
                    "parent comment does not belong to this post".to_string(),
                ));
            }
        }

        let comment = self
            .comments
            .create(post_id, user_id, &req.content, req.parent_id)
            .await?;

        self.get_comment(comment.id, Some(user_id)).await
    }

    /// A single comment with its direct replies (oldest first).
    pub async fn get_comment(&self, comment_id: i64, viewer: Option<Uuid>) -> Result<CommentView> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment_id)))?;

        let mut view = enrich_comments(
            self.comments.as_ref(),
            self.engagement.as_ref(),
            vec![comment],
            viewer,
        )
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("comment enrichment dropped the comment".to_string()))?;

        view.replies = self.get_replies(comment_id, viewer).await?;
        Ok(view)
    }

    /// Direct replies to a comment, oldest first, without further nesting.
    pub async fn get_replies(
        &self,
        comment_id: i64,
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentView>> {
        let replies = self.comments.list_replies(comment_id).await?;
        enrich_comments(
            self.comments.as_ref(),
            self.engagement.as_ref(),
            replies,
            viewer,
        )
        .await
    }

    /// One page of a post's comments, assembled into threads.
    pub async fn list_post_comments(
        &self,
        post_id: i64,
        page: i64,
        page_size: i64,
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentView>> {
        let page = clamp_page(page);
        let page_size = clamp_page_size(page_size);
        let offset = (page - 1) * page_size;

        load_thread(
            self.comments.as_ref(),
            self.engagement.as_ref(),
            post_id,
            page_size,
            offset,
            viewer,
        )
        .await
    }

    pub async fn update_comment(
        &self,
        user_id: Uuid,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<CommentView> {
        req.validate()?;

        let comment = self.require_comment(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Unauthorized(
                "not the owner of this comment".to_string(),
            ));
        }

        if !self
            .comments
            .update(comment_id, user_id, &req.content)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "comment {} not found",
                comment_id
            )));
        }

        self.get_comment(comment_id, Some(user_id)).await
    }

    pub async fn delete_comment(&self, user_id: Uuid, comment_id: i64) -> Result<()> {
        let comment = self.require_comment(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Unauthorized(
                "not the owner of this comment".to_string(),
            ));
        }

        if !self.comments.delete(comment_id).await? {
            return Err(AppError::NotFound(format!(
                "comment {} not found",
                comment_id
            )));
        }

        Ok(())
    }

    pub async fn like(&self, user_id: Uuid, comment_id: i64) -> Result<()> {
        self.require_comment(comment_id).await?;
        self.engagement
            .add(Relation::CommentLike, comment_id, user_id)
            .await
    }

    pub async fn unlike(&self, user_id: Uuid, comment_id: i64) -> Result<()> {
        self.require_comment(comment_id).await?;
        self.engagement
            .remove(Relation::CommentLike, comment_id, user_id)
            .await
    }

    pub async fn report(&self, user_id: Uuid, comment_id: i64) -> Result<()> {
        self.require_comment(comment_id).await?;
        self.engagement
            .add(Relation::CommentReport, comment_id, user_id)
            .await
    }

    pub async fn unreport(&self, user_id: Uuid, comment_id: i64) -> Result<()> {
        self.require_comment(comment_id).await?;
        self.engagement
            .remove(Relation::CommentReport, comment_id, user_id)
            .await
    }

    async fn require_comment(&self, comment_id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment_id)))
    }
}

/// Fetch one flat page for the post and shape it into threads.
pub(crate) async fn load_thread(
    comments: &dyn CommentStore,
    engagement: &dyn EngagementStore,
    post_id: i64,
    limit: i64,
    offset: i64,
    viewer: Option<Uuid>,
) -> Result<Vec<CommentView>> {
    let page = comments.list_by_post(post_id, limit, offset).await?;
    let views = enrich_comments(comments, engagement, page, viewer).await?;
    Ok(build_comment_tree(views))
}

/// Attach derived counts and viewer flags to a batch of comments.
///
/// Counts and flags come from batched lookups so a page costs a fixed number
/// of queries regardless of its size. Without a viewer the flags stay false;
/// no placeholder identity is ever consulted.
async fn enrich_comments(
    comments: &dyn CommentStore,
    engagement: &dyn EngagementStore,
    page: Vec<Comment>,
    viewer: Option<Uuid>,
) -> Result<Vec<CommentView>> {
    if page.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = page.iter().map(|c| c.id).collect();
    let like_counts = engagement.count_batch(Relation::CommentLike, &ids).await?;
    let reply_counts = comments.count_replies_batch(&ids).await?;

    let (liked, reported): (HashSet<i64>, HashSet<i64>) = match viewer {
        Some(user_id) => (
            engagement
                .contains_batch(Relation::CommentLike, user_id, &ids)
                .await?,
            engagement
                .contains_batch(Relation::CommentReport, user_id, &ids)
                .await?,
        ),
        None => (HashSet::new(), HashSet::new()),
    };

    let views = page
        .into_iter()
        .map(|c| {
            let mut view = CommentView::from(c);
            view.like_count = like_counts.get(&view.id).copied().unwrap_or(0);
            view.reply_count = reply_counts.get(&view.id).copied().unwrap_or(0);
            view.is_liked = liked.contains(&view.id);
            view.is_reported = reported.contains(&view.id);
            view
        })
        .collect();

    Ok(views)
}
