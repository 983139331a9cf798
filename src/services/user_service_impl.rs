//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::{ProfileChanges, Store};
use crate::domain::validation::{validate_bio, validate_name, validate_username};
use crate::services::media::{MediaKind, MediaService};
use crate::services::user_service::{
    PrivateUser, ProfileUpdate, PublicProfile, UserError, UserService, UserSummary, avatar_url,
    private_view, summarize,
};

pub struct SeaOrmUserService {
    store: Store,
    media: Arc<MediaService>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, media: Arc<MediaService>) -> Self {
        Self { store, media }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn me(&self, user_id: i32) -> Result<PrivateUser, UserError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;

        Ok(private_view(&self.media, &user).await)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<PrivateUser, UserError> {
        let users = self.store.user_repo();
        let current = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;

        let mut changes = ProfileChanges::default();

        if let Some(name) = update.name {
            changes.name = Some(validate_name(&name)?);
        }

        if let Some(username) = update.username {
            let username = validate_username(&username)?;
            if current.username.as_deref() != Some(username.as_str()) {
                if users.username_exists(&username).await? {
                    return Err(UserError::UsernameTaken);
                }
                changes.username = Some(username);
            }
        }

        if let Some(bio) = update.bio {
            changes.bio = Some(validate_bio(&bio)?);
        }

        if let Some(key) = update.image_key {
            let key = key.trim().to_string();
            self.media.ensure_owned(user_id, MediaKind::Avatar, &key)?;
            changes.image = Some((self.media.object_url(&key), key));
        }

        let replaced_avatar = changes
            .image
            .as_ref()
            .and_then(|(_, new_key)| current.image_key.clone().filter(|old| old != new_key));

        let updated = users.update_profile(user_id, changes).await?;

        if let Some(old_key) = replaced_avatar {
            self.media.schedule_delete(old_key);
        }

        Ok(private_view(&self.media, &updated).await)
    }

    async fn profile(
        &self,
        username: &str,
        viewer: Option<i32>,
    ) -> Result<PublicProfile, UserError> {
        let user = self
            .store
            .user_repo()
            .get_by_username(&username.to_lowercase())
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        let follows = self.store.follow_repo();
        let posts_count = self.store.post_repo().count_by_user(user.id).await?;
        let followers_count = follows.count_followers(user.id).await?;
        let following_count = follows.count_following(user.id).await?;

        let is_self = viewer == Some(user.id);
        let is_following = match viewer {
            Some(viewer_id) if !is_self => follows.is_following(viewer_id, user.id).await?,
            _ => false,
        };

        Ok(PublicProfile {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            image: avatar_url(&self.media, &user).await,
            bio: user.bio.clone(),
            created_at: user.created_at.clone(),
            posts_count,
            followers_count,
            following_count,
            is_following,
            is_self,
        })
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<UserSummary>, UserError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(UserError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let users = self.store.user_repo().search(query, limit).await?;

        let mut results = Vec::with_capacity(users.len());
        for user in &users {
            results.push(summarize(&self.media, user).await);
        }
        Ok(results)
    }
}
