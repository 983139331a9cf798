use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, CurrentUser};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, CreateCommentRequest, MessageResponse};
use crate::services::CommentView;

/// GET /posts/{id}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<ApiResponse<Vec<CommentView>>>, ApiError> {
    let post_id = validate_id(post_id, "post")?;
    let comments = state.comment_service().list(post_id).await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// POST /posts/{id}/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(post_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentView>>, ApiError> {
    let post_id = validate_id(post_id, "post")?;
    let comment = state
        .comment_service()
        .add(post_id, user_id, &payload.text)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// DELETE /posts/{id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((post_id, comment_id)): ApiPath<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let post_id = validate_id(post_id, "post")?;
    let comment_id = validate_id(comment_id, "comment")?;

    state
        .comment_service()
        .delete(post_id, comment_id, user_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Comment deleted".to_string(),
    })))
}
