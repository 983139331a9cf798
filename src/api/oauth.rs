use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::warn;

use super::extract::{ApiPath, ApiQuery, OAUTH_STATE_KEY, start_session};
use super::{ApiError, AppState};
use crate::clients::oauth::OAuthClient;

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct PendingAuthorization {
    provider: String,
    state: String,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn redirect_uri(public_url: &str, provider: &str) -> String {
    format!(
        "{}/api/auth/oauth/{provider}/callback",
        public_url.trim_end_matches('/')
    )
}

/// GET /auth/oauth/{provider}
/// Redirect to the provider's consent screen
pub async fn start(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiPath(provider): ApiPath<String>,
) -> Result<Response, ApiError> {
    let config = state.config();
    let provider_config = config
        .find_oauth_provider(&provider)
        .ok_or_else(|| ApiError::not_found("OAuth provider", &provider))?;

    let csrf_state = uuid::Uuid::new_v4().simple().to_string();
    let url = OAuthClient::authorize_url(
        provider_config,
        &redirect_uri(&config.server.public_url, &provider),
        &csrf_state,
    )?;

    session
        .insert(
            OAUTH_STATE_KEY,
            PendingAuthorization {
                provider,
                state: csrf_state,
            },
        )
        .await?;

    Ok(found(url.as_str()))
}

/// GET /auth/oauth/{provider}/callback
pub async fn callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiPath(provider): ApiPath<String>,
    ApiQuery(query): ApiQuery<CallbackQuery>,
) -> Result<Response, ApiError> {
    let config = state.config();
    let provider_config = config
        .find_oauth_provider(&provider)
        .ok_or_else(|| ApiError::not_found("OAuth provider", &provider))?;

    let pending = session
        .remove::<PendingAuthorization>(OAUTH_STATE_KEY)
        .await?;

    if let Some(error) = query.error {
        warn!(provider = %provider, error = %error, "OAuth provider returned an error");
        return Err(ApiError::unauthorized("OAuth sign-in was not completed"));
    }

    let state_matches = matches!(
        (&pending, &query.state),
        (Some(p), Some(s)) if p.provider == provider && &p.state == s
    );
    if !state_matches {
        return Err(ApiError::unauthorized("Invalid OAuth state"));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation("Missing authorization code"))?;

    let redirect = redirect_uri(&config.server.public_url, &provider);
    let access_token = state
        .shared
        .oauth
        .exchange_code(provider_config, &code, &redirect)
        .await?;
    let profile = state
        .shared
        .oauth
        .fetch_profile(provider_config, &access_token)
        .await?;

    let user = state
        .auth_service()
        .oauth_sign_in(&provider, profile)
        .await?;

    start_session(&session, user.id).await?;

    Ok(found("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_uri() {
        assert_eq!(
            redirect_uri("http://localhost:3000/", "github"),
            "http://localhost:3000/api/auth/oauth/github/callback"
        );
    }
}
