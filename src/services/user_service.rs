//! Domain service for user profiles and search.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::validation::FieldError;
use crate::services::media::{MediaError, MediaService};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Media(MediaError),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<FieldError> for UserError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

impl From<MediaError> for UserError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => Self::Validation(msg),
            MediaError::Forbidden(msg) => Self::Forbidden(msg),
            other @ MediaError::Storage(_) => Self::Media(other),
        }
    }
}

/// Author and list entry representation.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub image: Option<String>,
}

/// The signed-in user's own view, including the email address.
#[derive(Debug, Clone, Serialize)]
pub struct PrivateUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub has_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub is_following: bool,
    pub is_self: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image_key: Option<String>,
}

/// Avatar URL for display: signed when the avatar is a stored object.
pub async fn avatar_url(media: &MediaService, user: &User) -> Option<String> {
    let image = user.image.as_deref()?;
    Some(media.display_url(image, user.image_key.as_deref()).await)
}

pub async fn summarize(media: &MediaService, user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name.clone(),
        username: user.username.clone(),
        image: avatar_url(media, user).await,
    }
}

pub async fn private_view(media: &MediaService, user: &User) -> PrivateUser {
    PrivateUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        image: avatar_url(media, user).await,
        bio: user.bio.clone(),
        has_password: user.has_password,
        created_at: user.created_at.clone(),
        updated_at: user.updated_at.clone(),
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn me(&self, user_id: i32) -> Result<PrivateUser, UserError>;

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::UsernameTaken`] when another user owns the
    /// requested username and [`UserError::Forbidden`] for avatar keys issued
    /// to someone else.
    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<PrivateUser, UserError>;

    async fn profile(&self, username: &str, viewer: Option<i32>)
    -> Result<PublicProfile, UserError>;

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<UserSummary>, UserError>;
}
