//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::clients::oauth::OAuthProfile;
use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{NewUser, Store, User};
use crate::domain::AppEvent;
use crate::domain::validation::{
    NAME_MAX_CHARS, validate_email, validate_name, validate_password, validate_username,
};
use crate::services::auth_service::{AuthError, AuthService, Registration};
use crate::services::username::generate_unique_username;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    event_bus: broadcast::Sender<AppEvent>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        security: SecurityConfig,
        event_bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            store,
            security,
            event_bus,
        }
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let config = self.security.clone();
        tokio::task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Inserts the user, reporting a lost race on a unique column as
    /// `EmailTaken` or `UsernameTaken`.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let users = self.store.user_repo();
        let email = new_user.email.clone();
        let username = new_user.username.clone();

        match users.create(new_user).await {
            Ok(user) => {
                let _ = self.event_bus.send(AppEvent::UserRegistered {
                    user_id: user.id,
                    username: user.username.clone().unwrap_or_default(),
                });
                Ok(user)
            }
            Err(e) => {
                if users.get_by_email(&email).await?.is_some() {
                    return Err(AuthError::EmailTaken);
                }
                if users.username_exists(&username).await? {
                    return Err(AuthError::UsernameTaken);
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let name = validate_name(&registration.name)?;
        let email = validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        let users = self.store.user_repo();

        if users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let username = match registration.username {
            Some(requested) => {
                let username = validate_username(&requested)?;
                if users.username_exists(&username).await? {
                    return Err(AuthError::UsernameTaken);
                }
                username
            }
            None => generate_unique_username(&users, Some(&email), &name).await?,
        };

        let password_hash = self.hash(&registration.password).await?;

        let user = self
            .insert_user(NewUser {
                name,
                email,
                password_hash: Some(password_hash),
                username,
                image: None,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .user_repo()
            .verify_password(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn current_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)
            .map_err(|e| AuthError::Validation(format!("New {}", e.0.to_lowercase())))?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let users = self.store.user_repo();
        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.has_password {
            let is_valid = users
                .verify_password_for_id(user_id, current_password)
                .await?;
            if !is_valid {
                return Err(AuthError::Validation(
                    "Current password is incorrect".to_string(),
                ));
            }
        }

        users
            .update_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn oauth_sign_in(
        &self,
        provider: &str,
        profile: OAuthProfile,
    ) -> Result<User, AuthError> {
        let accounts = self.store.account_repo();
        let users = self.store.user_repo();

        if let Some(user_id) = accounts
            .find_user_id(provider, &profile.provider_account_id)
            .await?
        {
            return users
                .get_by_id(user_id)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        let email = validate_email(&profile.email)?;

        let user = if let Some(existing) = users.get_by_email(&email).await? {
            existing
        } else {
            let local_part = email.split('@').next().unwrap_or_default();
            let name: String = profile
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(local_part)
                .chars()
                .take(NAME_MAX_CHARS)
                .collect();
            let username = generate_unique_username(&users, Some(&email), &name).await?;

            self.insert_user(NewUser {
                name,
                email,
                password_hash: None,
                username,
                image: profile.image,
            })
            .await?
        };

        accounts
            .link(user.id, provider, &profile.provider_account_id)
            .await?;

        info!(user_id = user.id, provider, "OAuth sign-in");
        Ok(user)
    }
}
