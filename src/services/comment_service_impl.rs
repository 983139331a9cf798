//! `SeaORM` implementation of the `CommentService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::Store;
use crate::domain::validation::validate_comment;
use crate::services::media::MediaService;
use crate::services::post_service::{CommentService, CommentView, PostError};
use crate::services::post_service_impl::comment_views;

pub struct SeaOrmCommentService {
    store: Store,
    media: Arc<MediaService>,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store, media: Arc<MediaService>) -> Self {
        Self { store, media }
    }

    async fn ensure_post(&self, post_id: i32) -> Result<crate::db::Post, PostError> {
        self.store
            .post_repo()
            .get(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))
    }
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn list(&self, post_id: i32) -> Result<Vec<CommentView>, PostError> {
        self.ensure_post(post_id).await?;
        let comments = self.store.comment_repo().list_for_post(post_id).await?;
        comment_views(&self.store, &self.media, comments).await
    }

    async fn add(&self, post_id: i32, user_id: i32, text: &str) -> Result<CommentView, PostError> {
        let text = validate_comment(text)?;
        self.ensure_post(post_id).await?;

        let comment = self.store.comment_repo().add(post_id, user_id, &text).await?;
        let comment_id = comment.id;

        comment_views(&self.store, &self.media, vec![comment])
            .await?
            .pop()
            .ok_or(PostError::CommentNotFound(comment_id))
    }

    async fn delete(&self, post_id: i32, comment_id: i32, user_id: i32) -> Result<(), PostError> {
        let post = self.ensure_post(post_id).await?;

        let comments = self.store.comment_repo();
        let comment = comments
            .get(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or(PostError::CommentNotFound(comment_id))?;

        if comment.user_id != user_id && post.user_id != user_id {
            return Err(PostError::Forbidden(
                "Only the comment author or the post owner can delete this comment".to_string(),
            ));
        }

        comments.delete(comment_id).await?;
        Ok(())
    }
}
