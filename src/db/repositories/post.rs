use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::domain::Pagination;
use crate::entities::{comments, post_likes, posts, prelude::*};

pub use crate::entities::posts::Model as Post;

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        caption: &str,
        image_url: &str,
        image_key: &str,
    ) -> Result<Post> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = posts::ActiveModel {
            user_id: Set(user_id),
            caption: Set(caption.to_string()),
            image_url: Set(image_url.to_string()),
            image_key: Set(image_key.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert post")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        Posts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post")
    }

    pub async fn update_caption(&self, id: i32, caption: &str) -> Result<Option<Post>> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: posts::ActiveModel = post.into();
        active.caption = Set(caption.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update post caption")?;

        Ok(Some(model))
    }

    /// Deletes the post with its likes and comments in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        PostLikes::delete_many()
            .filter(post_likes::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        Comments::delete_many()
            .filter(comments::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        let result = Posts::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Posts by any of `author_ids`, newest first. Fetches `limit + 1` rows so
    /// the caller can tell whether another page exists.
    pub async fn list_by_authors(
        &self,
        author_ids: &[i32],
        pagination: Pagination,
    ) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        Posts::find()
            .filter(posts::Column::UserId.is_in(author_ids.iter().copied()))
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit + 1)
            .all(&self.conn)
            .await
            .context("Failed to query posts by authors")
    }

    /// All posts, newest first, over-fetching one row.
    pub async fn list_recent(&self, pagination: Pagination) -> Result<Vec<Post>> {
        Posts::find()
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit + 1)
            .all(&self.conn)
            .await
            .context("Failed to query recent posts")
    }

    pub async fn count_by_user(&self, user_id: i32) -> Result<u64> {
        Posts::find()
            .filter(posts::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count posts")
    }
}
