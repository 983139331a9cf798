//! Application events published on the internal event bus.

use serde::Serialize;

use super::errors::{ErrorCategory, Severity};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum AppEvent {
    UserRegistered {
        user_id: i32,
        username: String,
    },
    PostCreated {
        post_id: i32,
        user_id: i32,
    },
    PostDeleted {
        post_id: i32,
        user_id: i32,
    },
    Followed {
        follower_id: i32,
        following_id: i32,
    },
    Error {
        category: ErrorCategory,
        severity: Severity,
        message: String,
        details: Option<String>,
    },
}
