use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiPath, ApiQuery, CurrentUser};
use super::validation::validate_pagination;
use super::{ApiError, ApiResponse, AppState, PageQuery, UserPage};
use crate::services::FollowState;

/// POST /users/{username}/follow
pub async fn follow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<ApiResponse<FollowState>>, ApiError> {
    let result = state.social_service().follow(user_id, &username).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// DELETE /users/{username}/follow
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<ApiResponse<FollowState>>, ApiError> {
    let result = state.social_service().unfollow(user_id, &username).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /users/{username}/followers
pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<UserPage>>, ApiError> {
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state
        .social_service()
        .followers(&username, pagination)
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

/// GET /users/{username}/following
pub async fn list_following(
    State(state): State<Arc<AppState>>,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<UserPage>>, ApiError> {
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state
        .social_service()
        .following(&username, pagination)
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}
