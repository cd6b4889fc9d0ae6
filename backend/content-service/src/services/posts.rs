/// Post service - post view composition and owner-scoped mutations
///
/// Composes the outward post representation from the post store, the comment
/// store, and the engagement ledger. Reads tolerate skew between the
/// individual store calls; engagement verbs are explicit (like vs unlike),
/// never a read-then-invert toggle.
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::db::{CommentStore, EngagementStore, PostStore, Relation};
use crate::error::{AppError, Result};
use crate::models::{
    CreatePostRequest, NewPost, Post, PostEngagement, PostRecord, PostView, UpdatePostRequest,
};
use crate::services::comments::load_thread;
use crate::services::{clamp_page, clamp_page_size, MAX_PAGE_SIZE};

pub struct PostService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    engagement: Arc<dyn EngagementStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        engagement: Arc<dyn EngagementStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            engagement,
        }
    }

    pub async fn create_post(&self, user_id: Uuid, req: CreatePostRequest) -> Result<PostView> {
        req.validate()?;

        let new_post = NewPost {
            user_id,
            title: req.title,
            content: req.content,
            image_url: req.image_url,
            link_url: req.link_url,
        };
        let post = self.posts.create(&new_post).await?;

        if !req.tags.is_empty() {
            self.posts.replace_tags(post.id, &req.tags).await?;
        }

        self.get_post(post.id, Some(user_id)).await
    }

    /// Full post view: tags, derived counts, the first page of comments
    /// assembled into threads, and viewer flags when a viewer is known.
    pub async fn get_post(&self, post_id: i64, viewer: Option<Uuid>) -> Result<PostView> {
        let post = self.require_post(post_id).await?;

        let tags = self.posts.tags(post_id).await?;
        let like_count = self.engagement.count(Relation::PostLike, post_id).await?;
        let comment_count = self.comments.count_by_post(post_id).await?;
        let engagement = self.viewer_flags(post_id, viewer).await?;
        let comments = load_thread(
            self.comments.as_ref(),
            self.engagement.as_ref(),
            post_id,
            MAX_PAGE_SIZE,
            0,
            viewer,
        )
        .await?;

        Ok(assemble_view(
            PostRecord {
                post,
                like_count,
                comment_count,
                engagement: Some(engagement),
            },
            tags,
            comments,
        ))
    }

    /// Newest-first page of posts. Out-of-range pagination input is clamped,
    /// never rejected.
    pub async fn list_posts(
        &self,
        page: i64,
        page_size: i64,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostView>> {
        let page = clamp_page(page);
        let page_size = clamp_page_size(page_size);
        let offset = (page - 1) * page_size;

        let records = self.posts.list(page_size, offset, viewer).await?;
        self.compose_list(records, viewer).await
    }

    pub async fn get_user_posts(
        &self,
        user_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostView>> {
        let posts = self.posts.find_by_user(user_id).await?;
        self.compose_posts(posts, viewer).await
    }

    pub async fn get_saved_posts(&self, user_id: Uuid) -> Result<Vec<PostView>> {
        let posts = self.posts.find_saved_by_user(user_id).await?;
        self.compose_posts(posts, Some(user_id)).await
    }

    /// Partial update: absent or empty fields keep their stored values.
    pub async fn update_post(
        &self,
        user_id: Uuid,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostView> {
        let req = req.normalized();
        req.validate()?;

        let mut post = self.require_post(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Unauthorized(
                "not the owner of this post".to_string(),
            ));
        }

        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(image_url) = req.image_url {
            post.image_url = Some(image_url);
        }
        if let Some(link_url) = req.link_url {
            post.link_url = Some(link_url);
        }

        if !self.posts.update(&post).await? {
            return Err(AppError::NotFound(format!("post {} not found", post_id)));
        }

        if let Some(tags) = req.tags {
            self.posts.replace_tags(post_id, &tags).await?;
        }

        self.get_post(post_id, Some(user_id)).await
    }

    pub async fn delete_post(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        let post = self.require_post(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Unauthorized(
                "not the owner of this post".to_string(),
            ));
        }

        if !self.posts.delete(post_id).await? {
            return Err(AppError::NotFound(format!("post {} not found", post_id)));
        }

        Ok(())
    }

    pub async fn like(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .add(Relation::PostLike, post_id, user_id)
            .await
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .remove(Relation::PostLike, post_id, user_id)
            .await
    }

    pub async fn save(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .add(Relation::PostSave, post_id, user_id)
            .await
    }

    pub async fn unsave(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .remove(Relation::PostSave, post_id, user_id)
            .await
    }

    pub async fn report(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .add(Relation::PostReport, post_id, user_id)
            .await
    }

    pub async fn unreport(&self, user_id: Uuid, post_id: i64) -> Result<()> {
        self.require_post(post_id).await?;
        self.engagement
            .remove(Relation::PostReport, post_id, user_id)
            .await
    }

    async fn require_post(&self, post_id: i64) -> Result<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))
    }

    async fn viewer_flags(&self, post_id: i64, viewer: Option<Uuid>) -> Result<PostEngagement> {
        let Some(user_id) = viewer else {
            return Ok(PostEngagement::default());
        };

        Ok(PostEngagement {
            is_liked: self
                .engagement
                .contains(Relation::PostLike, post_id, user_id)
                .await?,
            is_saved: self
                .engagement
                .contains(Relation::PostSave, post_id, user_id)
                .await?,
            is_reported: self
                .engagement
                .contains(Relation::PostReport, post_id, user_id)
                .await?,
        })
    }

    /// Derive counts for bare post rows, then compose views.
    async fn compose_posts(&self, posts: Vec<Post>, viewer: Option<Uuid>) -> Result<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let like_counts = self.engagement.count_batch(Relation::PostLike, &ids).await?;
        let comment_counts = self.comments.count_by_post_batch(&ids).await?;

        let records = posts
            .into_iter()
            .map(|post| {
                let id = post.id;
                PostRecord {
                    post,
                    like_count: like_counts.get(&id).copied().unwrap_or(0),
                    comment_count: comment_counts.get(&id).copied().unwrap_or(0),
                    engagement: None,
                }
            })
            .collect();

        self.compose_list(records, viewer).await
    }

    /// Attach tags and viewer flags to a page of records. Flags embedded by
    /// the store are used as-is; otherwise they are back-filled from the
    /// ledger, which must produce identical results.
    async fn compose_list(
        &self,
        records: Vec<PostRecord>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostView>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = records.iter().map(|r| r.post.id).collect();
        let mut tags = self.posts.tags_batch(&ids).await?;

        let backfill = match viewer {
            Some(user_id) if records.iter().any(|r| r.engagement.is_none()) => Some((
                self.engagement
                    .contains_batch(Relation::PostLike, user_id, &ids)
                    .await?,
                self.engagement
                    .contains_batch(Relation::PostSave, user_id, &ids)
                    .await?,
                self.engagement
                    .contains_batch(Relation::PostReport, user_id, &ids)
                    .await?,
            )),
            _ => None,
        };

        let mut views = Vec::with_capacity(records.len());
        for mut record in records {
            let id = record.post.id;

            if record.engagement.is_none() {
                record.engagement = Some(match &backfill {
                    Some((liked, saved, reported)) => PostEngagement {
                        is_liked: liked.contains(&id),
                        is_saved: saved.contains(&id),
                        is_reported: reported.contains(&id),
                    },
                    None => PostEngagement::default(),
                });
            }

            let post_tags = tags.remove(&id).unwrap_or_default();
            views.push(assemble_view(record, post_tags, Vec::new()));
        }

        Ok(views)
    }
}

fn assemble_view(
    record: PostRecord,
    tags: Vec<String>,
    comments: Vec<crate::models::CommentView>,
) -> PostView {
    let flags = record.engagement.unwrap_or_default();
    let post = record.post;

    PostView {
        id: post.id,
        user_id: post.user_id,
        title: post.title,
        content: post.content,
        image_url: post.image_url,
        link_url: post.link_url,
        tags,
        like_count: record.like_count,
        comment_count: record.comment_count,
        is_liked: flags.is_liked,
        is_saved: flags.is_saved,
        is_reported: flags.is_reported,
        comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
