use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, ExpiredDeletion, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::services::{
    AuthService, CommentService, MediaService, PostService, SocialService, UserService,
};
use crate::state::SharedState;

pub mod auth;
mod comments;
pub mod extract;
mod error;
mod feed;
mod follows;
mod oauth;
mod observability;
mod posts;
mod system;
mod types;
mod upload;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn media(&self) -> &MediaService {
        &self.shared.media
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn social_service(&self) -> &Arc<dyn SocialService> {
        &self.shared.social_service
    }

    #[must_use]
    pub fn post_service(&self) -> &Arc<dyn PostService> {
        &self.shared.post_service
    }

    #[must_use]
    pub fn comment_service(&self) -> &Arc<dyn CommentService> {
        &self.shared.comment_service
    }
}

/// Wraps the shared state and starts the log persistence listener.
#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    shared.log_service.clone().start_listener();

    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let (cors_origins, secure_cookies, inactivity_minutes) = {
        let config = state.config();
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
        )
    };

    let session_store = SqliteStore::new(state.store().sqlite_pool());
    session_store.migrate().await?;

    tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(3600)),
    );

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_http_only(true)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    let api_router = create_api_router()
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentialed CORS cannot use wildcards
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    Ok(Router::new()
        .nest("/api", api_router)
        .layer(cors_layer)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state,
            observability::logging_middleware,
        )))
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::get_session))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/oauth/{provider}", get(oauth::start))
        .route("/auth/oauth/{provider}/callback", get(oauth::callback))
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route("/users/search", get(users::search_users))
        .route("/users/{username}", get(users::get_profile))
        .route("/users/{username}/posts", get(users::get_user_posts))
        .route(
            "/users/{username}/follow",
            post(follows::follow).delete(follows::unfollow),
        )
        .route("/users/{username}/followers", get(follows::list_followers))
        .route("/users/{username}/following", get(follows::list_following))
        .route("/upload", post(upload::create_upload))
        .route("/upload/view", get(upload::view_url))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/like", post(posts::toggle_like))
        .route("/posts/{id}/likes", get(posts::list_likes))
        .route(
            "/posts/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/posts/{id}/comments/{comment_id}",
            delete(comments::delete_comment),
        )
        .route("/feed", get(feed::get_feed))
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
}
