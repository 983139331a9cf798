//! Fallback usernames for new accounts.

use anyhow::Result;
use rand::Rng;

use crate::db::repositories::user::UserRepository;
use crate::domain::validation::{USERNAME_MIN_CHARS, is_username_char};

const BASE_MAX_CHARS: usize = 20;
const SUFFIX_ATTEMPTS: usize = 5;

/// Derives the candidate username from the email local part, or the display
/// name when there is no email.
#[must_use]
pub fn username_base(email: Option<&str>, name: &str) -> String {
    let source = email
        .and_then(|e| e.split('@').next())
        .filter(|local| !local.is_empty())
        .unwrap_or(name);

    let mut base: String = source
        .to_lowercase()
        .chars()
        .filter(|c| is_username_char(*c))
        .take(BASE_MAX_CHARS)
        .collect();

    if base.chars().count() < USERNAME_MIN_CHARS {
        base.push_str("user");
    }
    base
}

#[must_use]
pub fn with_suffix(base: &str, suffix: u16) -> String {
    format!("{base}{suffix:04}")
}

#[must_use]
pub fn random_fallback() -> String {
    let value: u32 = rand::rng().random();
    format!("user_{value:08x}")
}

/// Picks the first free username: the base, then up to five random 4-digit
/// suffixes, then a random `user_` handle.
pub async fn generate_unique_username(
    users: &UserRepository,
    email: Option<&str>,
    name: &str,
) -> Result<String> {
    let base = username_base(email, name);
    if !users.username_exists(&base).await? {
        return Ok(base);
    }

    for _ in 0..SUFFIX_ATTEMPTS {
        let suffix = rand::rng().random_range(0..10_000u16);
        let candidate = with_suffix(&base, suffix);
        if !users.username_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Ok(random_fallback())
}
