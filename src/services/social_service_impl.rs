//! `SeaORM` implementation of the `SocialService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::db::{Store, User};
use crate::domain::{AppEvent, Paged, Pagination};
use crate::services::media::MediaService;
use crate::services::social_service::{FollowState, SocialError, SocialService};
use crate::services::user_service::{UserSummary, summarize};

pub struct SeaOrmSocialService {
    store: Store,
    media: Arc<MediaService>,
    event_bus: broadcast::Sender<AppEvent>,
}

impl SeaOrmSocialService {
    #[must_use]
    pub const fn new(
        store: Store,
        media: Arc<MediaService>,
        event_bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            store,
            media,
            event_bus,
        }
    }

    async fn resolve(&self, username: &str) -> Result<User, SocialError> {
        self.store
            .user_repo()
            .get_by_username(&username.to_lowercase())
            .await?
            .ok_or_else(|| SocialError::UserNotFound(username.to_string()))
    }

    /// Loads summaries for `ids`, keeping their order.
    async fn summaries(&self, ids: Vec<i32>) -> Result<Vec<UserSummary>, SocialError> {
        let users: HashMap<i32, User> = self
            .store
            .user_repo()
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = users.get(&id) {
                summaries.push(summarize(&self.media, user).await);
            }
        }
        Ok(summaries)
    }

    async fn page_of(
        &self,
        rows: Vec<i32>,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, SocialError> {
        let page = Paged::from_overfetch(rows, pagination);
        let items = self.summaries(page.items).await?;
        Ok(Paged {
            items,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        })
    }
}

#[async_trait]
impl SocialService for SeaOrmSocialService {
    async fn follow(&self, follower_id: i32, username: &str) -> Result<FollowState, SocialError> {
        let target = self.resolve(username).await?;
        if target.id == follower_id {
            return Err(SocialError::SelfFollow);
        }

        let follows = self.store.follow_repo();
        follows.follow(follower_id, target.id).await?;

        let _ = self.event_bus.send(AppEvent::Followed {
            follower_id,
            following_id: target.id,
        });

        Ok(FollowState {
            following: true,
            followers_count: follows.count_followers(target.id).await?,
        })
    }

    async fn unfollow(
        &self,
        follower_id: i32,
        username: &str,
    ) -> Result<FollowState, SocialError> {
        let target = self.resolve(username).await?;

        let follows = self.store.follow_repo();
        follows.unfollow(follower_id, target.id).await?;

        Ok(FollowState {
            following: false,
            followers_count: follows.count_followers(target.id).await?,
        })
    }

    async fn followers(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, SocialError> {
        let user = self.resolve(username).await?;
        let rows = self.store.follow_repo().followers(user.id, pagination).await?;
        self.page_of(rows, pagination).await
    }

    async fn following(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, SocialError> {
        let user = self.resolve(username).await?;
        let rows = self.store.follow_repo().following(user.id, pagination).await?;
        self.page_of(rows, pagination).await
    }
}
