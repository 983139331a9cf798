use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::oauth::OAuthError;
use crate::domain::{ErrorCategory, ErrorReport, Severity};
use crate::services::{AuthError, MediaError, PostError, SocialError, UserError};

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    Conflict(String),

    DatabaseError(String),

    StorageError(String),

    ExternalApiError { service: String, message: String },

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::StorageError(msg) => write!(f, "Storage error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StorageError(_) | Self::ExternalApiError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError(_) | Self::Conflict(_) => ErrorCategory::Validation,
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorCategory::Auth,
            Self::NotFound(_) => ErrorCategory::Client,
            Self::DatabaseError(_) => ErrorCategory::Database,
            Self::StorageError(_) => ErrorCategory::S3Storage,
            Self::ExternalApiError { .. } | Self::InternalError(_) => ErrorCategory::Api,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ValidationError(_)
            | Self::Unauthorized(_)
            | Self::NotFound(_)
            | Self::Conflict(_) => Severity::Low,
            Self::Forbidden(_) | Self::ExternalApiError { .. } => Severity::Medium,
            Self::DatabaseError(_) | Self::StorageError(_) => Severity::High,
            Self::InternalError(_) => Severity::Critical,
        }
    }

    /// Message returned to the client. Server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            Self::ValidationError(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::DatabaseError(_) => "A database error occurred".to_string(),
            Self::StorageError(_) => "Storage service is unavailable".to_string(),
            Self::ExternalApiError { service, .. } => format!("{service} service is unavailable"),
            Self::InternalError(_) => "An internal error occurred".to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<()>::error(self.public_message());

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorReport {
            category: self.category(),
            severity: self.severity(),
            message: self.to_string(),
        });
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::InternalError(format!("Session error: {err}"))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::EmailTaken | AuthError::UsernameTaken => Self::Conflict(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::UsernameTaken => Self::Conflict(err.to_string()),
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::Forbidden(msg) => Self::Forbidden(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Media(e) => e.into(),
        }
    }
}

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::UserNotFound(_) => Self::NotFound(err.to_string()),
            SocialError::SelfFollow => Self::ValidationError(err.to_string()),
            SocialError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(_) | PostError::CommentNotFound(_) | PostError::UserNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PostError::Forbidden(msg) => Self::Forbidden(msg),
            PostError::Validation(msg) => Self::ValidationError(msg),
            PostError::Database(msg) => Self::DatabaseError(msg),
            PostError::Media(e) => e.into(),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => Self::ValidationError(msg),
            MediaError::Forbidden(msg) => Self::Forbidden(msg),
            MediaError::Storage(msg) => Self::StorageError(msg),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Config(msg) => Self::InternalError(msg),
            OAuthError::Provider(msg) => Self::ExternalApiError {
                service: "OAuth provider".to_string(),
                message: msg,
            },
            OAuthError::InvalidProfile(msg) => Self::ValidationError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        let cases = [
            (ApiError::validation("x"), 400, ErrorCategory::Validation, Severity::Low),
            (ApiError::unauthorized("x"), 401, ErrorCategory::Auth, Severity::Low),
            (ApiError::forbidden("x"), 403, ErrorCategory::Auth, Severity::Medium),
            (ApiError::not_found("Post", 1), 404, ErrorCategory::Client, Severity::Low),
            (ApiError::Conflict("x".into()), 409, ErrorCategory::Validation, Severity::Low),
            (ApiError::DatabaseError("x".into()), 500, ErrorCategory::Database, Severity::High),
            (ApiError::StorageError("x".into()), 502, ErrorCategory::S3Storage, Severity::High),
            (
                ApiError::ExternalApiError {
                    service: "OAuth provider".into(),
                    message: "x".into(),
                },
                502,
                ErrorCategory::Api,
                Severity::Medium,
            ),
            (ApiError::internal("x"), 500, ErrorCategory::Api, Severity::Critical),
        ];

        for (err, status, category, severity) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
            assert_eq!(err.category(), category, "{err}");
            assert_eq!(err.severity(), severity, "{err}");
        }
    }

    #[test]
    fn test_server_errors_are_masked() {
        let err = ApiError::DatabaseError("UNIQUE constraint failed: users.email".into());
        assert_eq!(err.public_message(), "A database error occurred");

        let err = ApiError::validation("Caption too long");
        assert_eq!(err.public_message(), "Caption too long");
    }

    #[test]
    fn test_response_carries_error_report() {
        let response = ApiError::StorageError("bucket gone".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.category, ErrorCategory::S3Storage);
        assert_eq!(report.severity, Severity::High);
        assert!(report.message.contains("bucket gone"));
    }

    #[test]
    fn test_domain_error_conversion() {
        assert_eq!(
            ApiError::from(AuthError::EmailTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(SocialError::SelfFollow).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PostError::Forbidden("nope".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(OAuthError::Provider("timeout".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
