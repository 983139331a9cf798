use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::{HashMap, HashSet};

use crate::domain::Pagination;
use crate::entities::{post_likes, prelude::*};

pub struct LikeRepository {
    conn: DatabaseConnection,
}

impl LikeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Flips the like state and returns whether the post is now liked.
    pub async fn toggle(&self, post_id: i32, user_id: i32) -> Result<bool> {
        let removed = PostLikes::delete_many()
            .filter(post_likes::Column::PostId.eq(post_id))
            .filter(post_likes::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove like")?;

        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let active = post_likes::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        // A concurrent like from the same user is absorbed by the unique index
        PostLikes::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    post_likes::Column::PostId,
                    post_likes::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await
            .context("Failed to insert like")?;

        Ok(true)
    }

    pub async fn count(&self, post_id: i32) -> Result<u64> {
        PostLikes::find()
            .filter(post_likes::Column::PostId.eq(post_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes")
    }

    pub async fn counts_for(&self, post_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = PostLikes::find()
            .select_only()
            .column(post_likes::Column::PostId)
            .column_as(post_likes::Column::Id.count(), "count")
            .filter(post_likes::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(post_likes::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count likes per post")?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    /// Subset of `post_ids` liked by `user_id`.
    pub async fn liked_by(&self, user_id: i32, post_ids: &[i32]) -> Result<HashSet<i32>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<i32> = PostLikes::find()
            .select_only()
            .column(post_likes::Column::PostId)
            .filter(post_likes::Column::UserId.eq(user_id))
            .filter(post_likes::Column::PostId.is_in(post_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query liked posts")?;

        Ok(rows.into_iter().collect())
    }

    /// IDs of users who liked the post, most recent first, over-fetching one row.
    pub async fn likers(&self, post_id: i32, pagination: Pagination) -> Result<Vec<i32>> {
        PostLikes::find()
            .select_only()
            .column(post_likes::Column::UserId)
            .filter(post_likes::Column::PostId.eq(post_id))
            .order_by_desc(post_likes::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit + 1)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query likers")
    }
}
