use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::extract::{ApiJson, CurrentUser, start_session};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::Registration;
use crate::services::user_service::{PrivateUser, private_view};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    pub new_password: String,
}

/// POST /auth/register
/// Create a credentials account and sign it in
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<ApiResponse<PrivateUser>>, ApiError> {
    let user = state
        .auth_service()
        .register(Registration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            username: None,
        })
        .await?;

    start_session(&session, user.id).await?;

    Ok(Json(ApiResponse::success(
        private_view(state.media(), &user).await,
    )))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<PrivateUser>>, ApiError> {
    let user = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    start_session(&session, user.id).await?;

    Ok(Json(ApiResponse::success(
        private_view(state.media(), &user).await,
    )))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<PrivateUser>>, ApiError> {
    let user = state.auth_service().current_user(user_id).await?;
    Ok(Json(ApiResponse::success(
        private_view(state.media(), &user).await,
    )))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password changed successfully".to_string(),
    })))
}
