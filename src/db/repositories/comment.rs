use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;

use crate::entities::{comments, prelude::*};

pub use crate::entities::comments::Model as Comment;

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, post_id: i32, user_id: i32, text: &str) -> Result<Comment> {
        let active = comments::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert comment")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Comment>> {
        Comments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;
        Ok(result.rows_affected > 0)
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: i32) -> Result<Vec<Comment>> {
        Comments::find()
            .filter(comments::Column::PostId.eq(post_id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")
    }

    pub async fn counts_for(&self, post_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = Comments::find()
            .select_only()
            .column(comments::Column::PostId)
            .column_as(comments::Column::Id.count(), "count")
            .filter(comments::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(comments::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count comments per post")?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}
