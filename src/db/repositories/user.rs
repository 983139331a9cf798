use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, LikeExpr},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

/// `LIKE` pattern matching `query` literally anywhere in the column.
fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub image: Option<String>,
    pub image_key: Option<String>,
    pub bio: Option<String>,
    pub has_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            username: model.username,
            image: model.image,
            image_key: model.image_key,
            bio: model.bio,
            has_password: model.password_hash.is_some(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub username: String,
    pub image: Option<String>,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    /// `Some(None)` clears the bio
    pub bio: Option<Option<String>>,
    /// New avatar as `(image_url, image_key)`
    pub image: Option<(String, String)>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Users::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username availability")?;

        Ok(count > 0)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            image: Set(new_user.image),
            image_key: Set(None),
            username: Set(Some(new_user.username)),
            bio: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<User> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(username) = changes.username {
            active.username = Set(Some(username));
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some((image, image_key)) = changes.image {
            active.image = Set(Some(image));
            active.image_key = Set(Some(image_key));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(User::from(model))
    }

    /// Case-insensitive substring match on username or display name.
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<User>> {
        let pattern = contains_pattern(query);
        let matches = |column: users::Column| {
            Expr::col(column).like(LikeExpr::new(pattern.as_str()).escape('\\'))
        };
        let rows = Users::find()
            .filter(
                Condition::any()
                    .add(matches(users::Column::Username))
                    .add(matches(users::Column::Name)),
            )
            .order_by_asc(users::Column::Username)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to search users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Verify a password for the account registered with `email`.
    /// Returns `None` for unknown emails, OAuth-only accounts and wrong passwords.
    /// Runs Argon2 in `spawn_blocking` since it is CPU-intensive.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let Some(password_hash) = user.password_hash.clone() else {
            return Ok(None);
        };

        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Verify the current password of a user identified by ID.
    pub async fn verify_password_for_id(&self, id: i32, password: &str) -> Result<bool> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(password_hash) = user.and_then(|u| u.password_hash) else {
            return Ok(false);
        };

        let password = password.to_string();
        task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")?
    }

    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(Some(new_hash));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Params are read from the PHC string, so hashes made with any config verify.
pub fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse", Some(&cheap_config())).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_hash("correct horse", &hash).unwrap());
        assert!(!verify_password_hash("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ada"), "%ada%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same", Some(&cheap_config())).unwrap();
        let b = hash_password("same", Some(&cheap_config())).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password_hash("pw", "not-a-phc-string").is_err());
    }
}
