use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser};
use super::validation::{validate_id, validate_pagination};
use super::{
    ApiError, ApiResponse, AppState, CreatePostRequest, MessageResponse, PageQuery, PostPage,
    UpdatePostRequest, UserPage,
};
use crate::services::{LikeState, PostView};

/// POST /posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let post = state
        .post_service()
        .create(user_id, &payload.caption, &payload.image_key)
        .await?;
    Ok(Json(ApiResponse::success(post)))
}

/// GET /posts?page=&limit=
/// Explore: every post, newest first
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<PostPage>>, ApiError> {
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state.post_service().explore(viewer, pagination).await?;
    Ok(Json(ApiResponse::success(page.into())))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let id = validate_id(id, "post")?;
    let post = state.post_service().get(id, viewer).await?;
    Ok(Json(ApiResponse::success(post)))
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let id = validate_id(id, "post")?;
    let post = state
        .post_service()
        .update_caption(id, user_id, &payload.caption)
        .await?;
    Ok(Json(ApiResponse::success(post)))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "post")?;
    state.post_service().delete(id, user_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Post deleted".to_string(),
    })))
}

/// POST /posts/{id}/like
/// Toggles the like
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<LikeState>>, ApiError> {
    let id = validate_id(id, "post")?;
    let result = state.post_service().toggle_like(id, user_id).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /posts/{id}/likes
pub async fn list_likes(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<UserPage>>, ApiError> {
    let id = validate_id(id, "post")?;
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state.post_service().likers(id, pagination).await?;
    Ok(Json(ApiResponse::success(page.into())))
}
