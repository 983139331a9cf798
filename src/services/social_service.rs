//! Domain service for the follow graph.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Paged, Pagination};
use crate::services::user_service::UserSummary;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SocialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowState {
    pub following: bool,
    pub followers_count: u64,
}

#[async_trait::async_trait]
pub trait SocialService: Send + Sync {
    /// Follows `username`. Following someone twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SocialError::SelfFollow`] when the target is the follower.
    async fn follow(&self, follower_id: i32, username: &str) -> Result<FollowState, SocialError>;

    /// Unfollows `username`; idempotent.
    async fn unfollow(&self, follower_id: i32, username: &str)
    -> Result<FollowState, SocialError>;

    async fn followers(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, SocialError>;

    async fn following(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, SocialError>;
}
