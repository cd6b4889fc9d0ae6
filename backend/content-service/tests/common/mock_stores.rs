//! In-memory store implementations for integration tests
//!
//! Behave like the Postgres stores over plain collections: newest-first
//! pages, owner-scoped updates, idempotent engagement membership, and
//! cascade of dependent rows on delete. No database required.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use content_service::db::{CommentStore, EngagementStore, PostStore, Relation};
use content_service::error::Result;
use content_service::models::{Comment, NewPost, Post, PostRecord};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryEngagementStore {
    rows: Mutex<HashSet<(Relation, i64, Uuid)>>,
}

impl InMemoryEngagementStore {
    /// Subject ids the user is a member of, ascending.
    pub fn subjects_for_user(&self, relation: Relation, user_id: Uuid) -> Vec<i64> {
        let rows = self.rows.lock().unwrap();
        let mut ids: Vec<i64> = rows
            .iter()
            .filter(|(r, _, u)| *r == relation && *u == user_id)
            .map(|(_, subject_id, _)| *subject_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Drop every row for a subject, as the FK cascade would.
    pub fn remove_subject(&self, relations: &[Relation], subject_id: i64) {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|(r, s, _)| *s != subject_id || !relations.contains(r));
    }
}

#[async_trait]
impl EngagementStore for InMemoryEngagementStore {
    async fn add(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .insert((relation, subject_id, user_id));
        Ok(())
    }

    async fn remove(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&(relation, subject_id, user_id));
        Ok(())
    }

    async fn contains(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .contains(&(relation, subject_id, user_id)))
    }

    async fn count(&self, relation: Relation, subject_id: i64) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(r, s, _)| *r == relation && *s == subject_id)
            .count() as i64)
    }

    async fn contains_batch(
        &self,
        relation: Relation,
        user_id: Uuid,
        subject_ids: &[i64],
    ) -> Result<HashSet<i64>> {
        let rows = self.rows.lock().unwrap();
        Ok(subject_ids
            .iter()
            .copied()
            .filter(|id| rows.contains(&(relation, *id, user_id)))
            .collect())
    }

    async fn count_batch(
        &self,
        relation: Relation,
        subject_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        let rows = self.rows.lock().unwrap();
        let mut counts = HashMap::new();
        for (r, s, _) in rows.iter() {
            if *r == relation && subject_ids.contains(s) {
                *counts.entry(*s).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryCommentStore {
    rows: Mutex<Vec<Comment>>,
    next_id: AtomicI64,
}

impl InMemoryCommentStore {
    pub fn remove_by_post(&self, post_id: i64) {
        self.rows.lock().unwrap().retain(|c| c.post_id != post_id);
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn create(
        &self,
        post_id: i64,
        user_id: Uuid,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            post_id,
            user_id,
            content: content.to_string(),
            parent_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, comment_id: i64) -> Result<Option<Comment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == comment_id)
            .cloned())
    }

    async fn list_by_post(&self, post_id: i64, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        let rows = self.rows.lock().unwrap();
        let mut comments: Vec<Comment> = rows
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        // Ids are assigned in creation order, so id desc == newest first.
        comments.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(comments
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_replies(&self, comment_id: i64) -> Result<Vec<Comment>> {
        let rows = self.rows.lock().unwrap();
        let mut replies: Vec<Comment> = rows
            .iter()
            .filter(|c| c.parent_id == Some(comment_id))
            .cloned()
            .collect();
        replies.sort_by_key(|c| c.id);
        Ok(replies)
    }

    async fn update(&self, comment_id: i64, user_id: Uuid, content: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|c| c.id == comment_id && c.user_id == user_id)
        {
            Some(comment) => {
                comment.content = content.to_string();
                comment.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, comment_id: i64) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != comment_id);
        Ok(rows.len() < before)
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|c| c.post_id == post_id).count() as i64)
    }

    async fn count_by_post_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        let rows = self.rows.lock().unwrap();
        let mut counts = HashMap::new();
        for comment in rows.iter() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_replies_batch(&self, comment_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        let rows = self.rows.lock().unwrap();
        let mut counts = HashMap::new();
        for comment in rows.iter() {
            if let Some(parent_id) = comment.parent_id {
                if comment_ids.contains(&parent_id) {
                    *counts.entry(parent_id).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }
}

pub struct InMemoryPostStore {
    rows: Mutex<Vec<Post>>,
    tags: Mutex<HashMap<i64, Vec<String>>>,
    next_id: AtomicI64,
    engagement: Arc<InMemoryEngagementStore>,
    comments: Arc<InMemoryCommentStore>,
}

impl InMemoryPostStore {
    pub fn new(
        engagement: Arc<InMemoryEngagementStore>,
        comments: Arc<InMemoryCommentStore>,
    ) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            tags: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(0),
            engagement,
            comments,
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: new_post.user_id,
            title: new_post.title.clone(),
            content: new_post.content.clone(),
            image_url: new_post.image_url.clone(),
            link_url: new_post.link_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned())
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        _viewer: Option<Uuid>,
    ) -> Result<Vec<PostRecord>> {
        let mut posts: Vec<Post> = self.rows.lock().unwrap().clone();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        let page: Vec<Post> = posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        // Flags are never embedded here; the service back-fills them from
        // the engagement store and must produce identical results.
        let mut records = Vec::with_capacity(page.len());
        for post in page {
            let like_count = self.engagement.count(Relation::PostLike, post.id).await?;
            let comment_count = self.comments.count_by_post(post.id).await?;
            records.push(PostRecord {
                post,
                like_count,
                comment_count,
                engagement: None,
            });
        }
        Ok(records)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(posts)
    }

    async fn find_saved_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let saved = self
            .engagement
            .subjects_for_user(Relation::PostSave, user_id);
        let rows = self.rows.lock().unwrap();
        let mut posts: Vec<Post> = rows
            .iter()
            .filter(|p| saved.contains(&p.id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(posts)
    }

    async fn update(&self, post: &Post) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|p| p.id == post.id && p.user_id == post.user_id)
        {
            Some(stored) => {
                stored.title = post.title.clone();
                stored.content = post.content.clone();
                stored.image_url = post.image_url.clone();
                stored.link_url = post.link_url.clone();
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, post_id: i64) -> Result<bool> {
        let removed = {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != post_id);
            rows.len() < before
        };

        if removed {
            self.tags.lock().unwrap().remove(&post_id);
            self.engagement.remove_subject(
                &[Relation::PostLike, Relation::PostSave, Relation::PostReport],
                post_id,
            );
            self.comments.remove_by_post(post_id);
        }

        Ok(removed)
    }

    async fn replace_tags(&self, post_id: i64, tags: &[String]) -> Result<()> {
        let mut unique = Vec::new();
        for tag in tags {
            if !unique.contains(tag) {
                unique.push(tag.clone());
            }
        }
        self.tags.lock().unwrap().insert(post_id, unique);
        Ok(())
    }

    async fn tags(&self, post_id: i64) -> Result<Vec<String>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .get(&post_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn tags_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
        let tags = self.tags.lock().unwrap();
        Ok(post_ids
            .iter()
            .filter_map(|id| tags.get(id).map(|t| (*id, t.clone())))
            .collect())
    }
}
