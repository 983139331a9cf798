//! Request extractors that reject with the JSON envelope.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use super::ApiError;

pub const SESSION_USER_KEY: &str = "user_id";
pub const OAUTH_STATE_KEY: &str = "oauth_state";

async fn session_from_parts<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Session, ApiError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::internal(msg))
}

/// Stores the signed-in user, rotating the session id first.
pub async fn start_session(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user_id).await?;
    Ok(())
}

/// The signed-in user's id. Rejects with 401 when there is no session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i32);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;

        match session.get::<i32>(SESSION_USER_KEY).await? {
            Some(user_id) => {
                tracing::Span::current().record("user_id", user_id);
                Ok(Self(user_id))
            }
            None => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}

/// The signed-in user's id when there is one.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<i32>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let user_id = session.get::<i32>(SESSION_USER_KEY).await?;
        if let Some(id) = user_id {
            tracing::Span::current().record("user_id", id);
        }
        Ok(Self(user_id))
    }
}

pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}
