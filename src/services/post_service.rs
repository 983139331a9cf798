//! Domain service for posts, likes, comments and the home feed.

use serde::Serialize;
use thiserror::Error;

use crate::domain::validation::FieldError;
use crate::domain::{Paged, Pagination};
use crate::services::media::MediaError;
use crate::services::user_service::UserSummary;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post {0} not found")]
    NotFound(i32),

    #[error("Comment {0} not found")]
    CommentNotFound(i32),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Media(MediaError),
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<FieldError> for PostError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

impl From<MediaError> for PostError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => Self::Validation(msg),
            MediaError::Forbidden(msg) => Self::Forbidden(msg),
            other @ MediaError::Storage(_) => Self::Media(other),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub post_id: i32,
    pub author: UserSummary,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i32,
    pub author: UserSummary,
    pub caption: String,
    /// Presigned view URL
    pub image_url: String,
    pub likes_count: u64,
    pub liked: bool,
    pub comments_count: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u64,
}

#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    /// Publishes a post for an image uploaded under the author's `posts/` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Forbidden`] when the image key belongs to someone else.
    async fn create(
        &self,
        user_id: i32,
        caption: &str,
        image_key: &str,
    ) -> Result<PostView, PostError>;

    /// Post with its full comment list.
    async fn get(&self, post_id: i32, viewer: Option<i32>) -> Result<PostView, PostError>;

    /// Owner only.
    async fn update_caption(
        &self,
        post_id: i32,
        user_id: i32,
        caption: &str,
    ) -> Result<PostView, PostError>;

    /// Owner only. Removes likes and comments, then the stored image in the background.
    async fn delete(&self, post_id: i32, user_id: i32) -> Result<(), PostError>;

    /// Every post, newest first.
    async fn explore(
        &self,
        viewer: Option<i32>,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError>;

    async fn user_posts(
        &self,
        username: &str,
        viewer: Option<i32>,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError>;

    /// Posts by the viewer and everyone they follow, newest first.
    async fn feed(&self, user_id: i32, pagination: Pagination)
    -> Result<Paged<PostView>, PostError>;

    async fn toggle_like(&self, post_id: i32, user_id: i32) -> Result<LikeState, PostError>;

    async fn likers(
        &self,
        post_id: i32,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, PostError>;
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Oldest first.
    async fn list(&self, post_id: i32) -> Result<Vec<CommentView>, PostError>;

    async fn add(&self, post_id: i32, user_id: i32, text: &str) -> Result<CommentView, PostError>;

    /// Allowed for the comment author and the post owner.
    async fn delete(&self, post_id: i32, comment_id: i32, user_id: i32) -> Result<(), PostError>;
}
