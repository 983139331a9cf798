//! Domain service for authentication.
//!
//! Handles credential registration and login, password changes and signing in
//! through an OAuth provider profile.

use thiserror::Error;

use crate::clients::oauth::OAuthProfile;
use crate::db::User;
use crate::domain::validation::FieldError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<FieldError> for AuthError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

/// Credentials registration input. `username` is only set by the CLI; the
/// API always generates one.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a credentials user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed input and
    /// [`AuthError::EmailTaken`] when the email is registered already.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Verifies email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails, including for
    /// accounts that only sign in through OAuth.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn current_user(&self, user_id: i32) -> Result<User, AuthError>;

    /// Changes a user's password. Users without a password (OAuth-only) may
    /// set one with an empty `current_password`.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Resolves the local user for a provider profile: an existing account
    /// link, then a user with the same email (linked on the way), else a new
    /// user.
    async fn oauth_sign_in(&self, provider: &str, profile: OAuthProfile)
    -> Result<User, AuthError>;
}
