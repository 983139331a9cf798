use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::system_logs::Model as SystemLog;
pub use repositories::comment::Comment;
pub use repositories::post::Post;
pub use repositories::user::{NewUser, ProfileChanges, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        if !path_str.starts_with(":memory:") {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Underlying sqlx pool, shared with the session store.
    #[must_use]
    pub fn sqlite_pool(&self) -> sea_orm::sqlx::SqlitePool {
        self.conn.get_sqlite_connection_pool().clone()
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn like_repo(&self) -> repositories::like::LikeRepository {
        repositories::like::LikeRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn logs_repo(&self) -> repositories::logs::LogRepository {
        repositories::logs::LogRepository::new(self.conn.clone())
    }

    // ========== System Log Methods ==========

    pub async fn add_log(
        &self,
        category: &str,
        severity: &str,
        message: &str,
        details: Option<String>,
    ) -> Result<()> {
        self.logs_repo()
            .add(category, severity, message, details)
            .await
    }

    pub async fn recent_logs(
        &self,
        limit: u64,
        category_filter: Option<String>,
    ) -> Result<Vec<SystemLog>> {
        self.logs_repo().recent(limit, category_filter).await
    }

    pub async fn prune_logs(&self, older_than_days: i64) -> Result<u64> {
        self.logs_repo().prune(older_than_days).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pagination;

    async fn test_store(name: &str) -> (Store, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "picfeed-store-{name}-{}.db",
            uuid::Uuid::new_v4()
        ));
        let url = format!("sqlite:{}?mode=rwc", path.display());
        let store = Store::with_pool_options(&url, 2, 1).await.unwrap();
        (store, path)
    }

    async fn seed_user(store: &Store, handle: &str) -> User {
        store
            .user_repo()
            .create(NewUser {
                name: handle.to_string(),
                email: format!("{handle}@example.com"),
                password_hash: None,
                username: handle.to_string(),
                image: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_like_toggle_and_counts() {
        let (store, path) = test_store("likes").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let post = store
            .post_repo()
            .create(alice.id, "hello", "https://img/x.jpg", "posts/1/x.jpg")
            .await
            .unwrap();

        let likes = store.like_repo();
        assert!(likes.toggle(post.id, bob.id).await.unwrap());
        assert!(likes.toggle(post.id, alice.id).await.unwrap());
        assert_eq!(likes.count(post.id).await.unwrap(), 2);

        assert!(!likes.toggle(post.id, bob.id).await.unwrap());
        assert_eq!(likes.count(post.id).await.unwrap(), 1);

        let counts = likes.counts_for(&[post.id]).await.unwrap();
        assert_eq!(counts.get(&post.id), Some(&1));
        let liked = likes.liked_by(alice.id, &[post.id]).await.unwrap();
        assert!(liked.contains(&post.id));

        drop(store);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let (store, path) = test_store("follows").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;

        let follows = store.follow_repo();
        follows.follow(alice.id, bob.id).await.unwrap();
        follows.follow(alice.id, bob.id).await.unwrap();

        assert_eq!(follows.count_followers(bob.id).await.unwrap(), 1);
        assert_eq!(follows.count_following(alice.id).await.unwrap(), 1);
        assert!(follows.is_following(alice.id, bob.id).await.unwrap());
        assert!(!follows.is_following(bob.id, alice.id).await.unwrap());

        assert!(follows.unfollow(alice.id, bob.id).await.unwrap());
        assert!(!follows.unfollow(alice.id, bob.id).await.unwrap());

        drop(store);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_delete_post_removes_likes_and_comments() {
        let (store, path) = test_store("delete").await;
        let alice = seed_user(&store, "alice").await;
        let post = store
            .post_repo()
            .create(alice.id, "", "https://img/y.jpg", "posts/1/y.jpg")
            .await
            .unwrap();
        store.like_repo().toggle(post.id, alice.id).await.unwrap();
        store
            .comment_repo()
            .add(post.id, alice.id, "first")
            .await
            .unwrap();

        assert!(store.post_repo().delete(post.id).await.unwrap());
        assert!(store.post_repo().get(post.id).await.unwrap().is_none());
        assert_eq!(store.like_repo().count(post.id).await.unwrap(), 0);
        assert!(
            store
                .comment_repo()
                .list_for_post(post.id)
                .await
                .unwrap()
                .is_empty()
        );

        drop(store);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_list_by_authors_overfetches() {
        let (store, path) = test_store("feed").await;
        let alice = seed_user(&store, "alice").await;
        for i in 0..3 {
            store
                .post_repo()
                .create(alice.id, &format!("post {i}"), "u", &format!("posts/1/{i}.jpg"))
                .await
                .unwrap();
        }

        let rows = store
            .post_repo()
            .list_by_authors(&[alice.id], Pagination::new(1, 2))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].caption, "post 2");

        let rows = store
            .post_repo()
            .list_by_authors(&[], Pagination::new(1, 2))
            .await
            .unwrap();
        assert!(rows.is_empty());

        drop(store);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_logs_roundtrip_and_prune() {
        let (store, path) = test_store("logs").await;
        store
            .add_log("DATABASE", "HIGH", "[DATABASE/HIGH] boom", None)
            .await
            .unwrap();
        store
            .add_log("S3_STORAGE", "CRITICAL", "[S3_STORAGE/CRITICAL] gone", None)
            .await
            .unwrap();

        let all = store.recent_logs(10, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let db_only = store
            .recent_logs(10, Some("DATABASE".to_string()))
            .await
            .unwrap();
        assert_eq!(db_only.len(), 1);

        assert_eq!(store.prune_logs(1).await.unwrap(), 0);

        drop(store);
        let _ = std::fs::remove_file(path);
    }
}
