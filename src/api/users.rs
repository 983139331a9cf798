use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser};
use super::validation::{
    SEARCH_DEFAULT_LIMIT, validate_limit, validate_pagination, validate_search_query,
};
use super::{
    ApiError, ApiResponse, AppState, PageQuery, PostPage, SearchQuery, UpdateProfileRequest,
};
use crate::services::{PrivateUser, ProfileUpdate, PublicProfile, UserSummary};

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<PrivateUser>>, ApiError> {
    let user = state.user_service().me(user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<PrivateUser>>, ApiError> {
    let user = state
        .user_service()
        .update_profile(
            user_id,
            ProfileUpdate {
                name: payload.name,
                username: payload.username,
                bio: payload.bio,
                image_key: payload.image_key,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// GET /users/search?q=&limit=
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let limit = validate_limit(
        query.limit.unwrap_or(SEARCH_DEFAULT_LIMIT),
        state.config().feed.max_page_size,
    )?;

    let users = state.user_service().search(q, limit).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{username}
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let profile = state.user_service().profile(&username, viewer).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// GET /users/{username}/posts
pub async fn get_user_posts(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<PostPage>>, ApiError> {
    let pagination = validate_pagination(&query, &state.config().feed)?;
    let page = state
        .post_service()
        .user_posts(&username, viewer, pagination)
        .await?;

    Ok(Json(ApiResponse::success(page.into())))
}
