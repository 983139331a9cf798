use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiQuery, CurrentUser};
use super::{ApiError, ApiResponse, AppState, UploadRequest, ViewQuery, ViewUrlResponse};
use crate::services::UploadTicket;

/// POST /upload
/// Issue a presigned PUT URL under the caller's key prefix
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<UploadRequest>,
) -> Result<Json<ApiResponse<UploadTicket>>, ApiError> {
    let ticket = state
        .media()
        .new_upload(user_id, payload.kind, &payload.content_type, payload.size)
        .await?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// GET /upload/view?key=
pub async fn view_url(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user_id): CurrentUser,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> Result<Json<ApiResponse<ViewUrlResponse>>, ApiError> {
    let url = state.media().view_url(&query.key).await?;
    Ok(Json(ApiResponse::success(ViewUrlResponse {
        url,
        expires_in: state.config().storage.view_expiry_secs,
    })))
}
