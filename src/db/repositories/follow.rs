use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::Pagination;
use crate::entities::{follows, prelude::*};

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the edge. An existing edge (including one inserted concurrently)
    /// is left as is.
    pub async fn follow(&self, follower_id: i32, following_id: i32) -> Result<()> {
        let active = follows::ActiveModel {
            follower_id: Set(follower_id),
            following_id: Set(following_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        Follows::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    follows::Column::FollowerId,
                    follows::Column::FollowingId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await
            .context("Failed to insert follow")?;

        Ok(())
    }

    pub async fn unfollow(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        let result = Follows::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn is_following(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        let count = Follows::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .count(&self.conn)
            .await
            .context("Failed to query follow")?;

        Ok(count > 0)
    }

    /// Every user `follower_id` follows. Used to assemble the feed.
    pub async fn following_ids(&self, follower_id: i32) -> Result<Vec<i32>> {
        Follows::find()
            .select_only()
            .column(follows::Column::FollowingId)
            .filter(follows::Column::FollowerId.eq(follower_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query followed users")
    }

    /// Followers of `user_id`, newest edge first, over-fetching one row.
    pub async fn followers(&self, user_id: i32, pagination: Pagination) -> Result<Vec<i32>> {
        Follows::find()
            .select_only()
            .column(follows::Column::FollowerId)
            .filter(follows::Column::FollowingId.eq(user_id))
            .order_by_desc(follows::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit + 1)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query followers")
    }

    /// Users followed by `user_id`, newest edge first, over-fetching one row.
    pub async fn following(&self, user_id: i32, pagination: Pagination) -> Result<Vec<i32>> {
        Follows::find()
            .select_only()
            .column(follows::Column::FollowingId)
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_desc(follows::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit + 1)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query following")
    }

    pub async fn count_followers(&self, user_id: i32) -> Result<u64> {
        Follows::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")
    }

    pub async fn count_following(&self, user_id: i32) -> Result<u64> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count following")
    }
}
