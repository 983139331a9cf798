use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiQuery, CurrentUser};
use super::validation::validate_pagination;
use super::{ApiError, ApiResponse, AppState, PageQuery, PostPage};

/// GET /feed?page=&limit=
/// Posts by the current user and everyone they follow, newest first
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<PostPage>>, ApiError> {
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state.post_service().feed(user_id, pagination).await?;
    Ok(Json(ApiResponse::success(page.into())))
}
