//! Field rules shared by the services and the CLI.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 30;
pub const BIO_MAX_CHARS: usize = 150;
pub const CAPTION_MAX_CHARS: usize = 2200;
pub const COMMENT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FieldError(pub String);

impl FieldError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub fn validate_name(name: &str) -> Result<String, FieldError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("Name cannot be empty"));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(FieldError::new(format!(
            "Name must be {NAME_MAX_CHARS} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Returns the normalized (trimmed, lowercased) address.
pub fn validate_email(email: &str) -> Result<String, FieldError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid regex"));

    let normalized = email.trim().to_lowercase();
    if !re.is_match(&normalized) {
        return Err(FieldError::new("Invalid email address"));
    }
    Ok(normalized)
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(FieldError::new(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    Ok(())
}

#[must_use]
pub fn is_username_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.'
}

/// Returns the lowercased username.
pub fn validate_username(username: &str) -> Result<String, FieldError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[a-z0-9_.]+$").expect("Invalid regex"));

    let normalized = username.trim().to_lowercase();
    let len = normalized.chars().count();

    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(FieldError::new(format!(
            "Username must be between {USERNAME_MIN_CHARS} and {USERNAME_MAX_CHARS} characters"
        )));
    }
    if !re.is_match(&normalized) {
        return Err(FieldError::new(
            "Username can only contain lowercase letters, numbers, underscores and periods",
        ));
    }
    Ok(normalized)
}

/// An empty bio clears it.
pub fn validate_bio(bio: &str) -> Result<Option<String>, FieldError> {
    let trimmed = bio.trim();
    if trimmed.chars().count() > BIO_MAX_CHARS {
        return Err(FieldError::new(format!(
            "Bio must be {BIO_MAX_CHARS} characters or less"
        )));
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

pub fn validate_caption(caption: &str) -> Result<String, FieldError> {
    let trimmed = caption.trim();
    if trimmed.chars().count() > CAPTION_MAX_CHARS {
        return Err(FieldError::new(format!(
            "Caption must be {CAPTION_MAX_CHARS} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_comment(text: &str) -> Result<String, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("Comment cannot be empty"));
    }
    if trimmed.chars().count() > COMMENT_MAX_CHARS {
        return Err(FieldError::new(format!(
            "Comment must be {COMMENT_MAX_CHARS} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" Alice ").unwrap(), "Alice");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
        assert!(validate_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("Alice_01").unwrap(), "alice_01");
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("no-dashes").is_err());
        assert!(validate_username("dots.are.ok").is_ok());
    }

    #[test]
    fn test_validate_bio() {
        assert_eq!(validate_bio("").unwrap(), None);
        assert_eq!(validate_bio(" hi ").unwrap(), Some("hi".to_string()));
        assert!(validate_bio(&"b".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_caption_and_comment() {
        assert_eq!(validate_caption("").unwrap(), "");
        assert!(validate_caption(&"c".repeat(2201)).is_err());
        assert!(validate_comment("  ").is_err());
        assert!(validate_comment(&"c".repeat(501)).is_err());
        assert_eq!(validate_comment(" nice ").unwrap(), "nice");
    }
}
