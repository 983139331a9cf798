use serde::{Deserialize, Serialize};

use crate::domain::Paged;
use crate::services::{MediaKind, PostView, UserSummary};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub key: String,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub content_type: String,
    pub kind: MediaKind,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image_key: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub page: u64,
    pub limit: u64,
    pub has_more: bool,
}

impl From<Paged<PostView>> for PostPage {
    fn from(page: Paged<PostView>) -> Self {
        Self {
            posts: page.items,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    pub page: u64,
    pub limit: u64,
    pub has_more: bool,
}

impl From<Paged<UserSummary>> for UserPage {
    fn from(page: Paged<UserSummary>) -> Self {
        Self {
            users: page.items,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
