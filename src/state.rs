use std::sync::Arc;
use tokio::sync::broadcast;

use crate::clients::oauth::OAuthClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::AppEvent;
use crate::services::{
    AuthService, CommentService, LogService, MediaService, ObjectStore, PostService,
    S3ObjectStore, SeaOrmAuthService, SeaOrmCommentService, SeaOrmPostService,
    SeaOrmSocialService, SeaOrmUserService, SocialService, UserService,
};

/// Shared HTTP client for OAuth provider calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Picfeed/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub event_bus: broadcast::Sender<AppEvent>,

    pub log_service: Arc<LogService>,

    pub media: Arc<MediaService>,

    pub oauth: Arc<OAuthClient>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub social_service: Arc<dyn SocialService>,

    pub post_service: Arc<dyn PostService>,

    pub comment_service: Arc<dyn CommentService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let objects: Arc<dyn ObjectStore> =
            Arc::new(S3ObjectStore::from_config(&config.storage).await);
        Self::with_object_store(config, objects).await
    }

    pub async fn with_object_store(
        config: Config,
        objects: Arc<dyn ObjectStore>,
    ) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(15)?;
        let oauth = Arc::new(OAuthClient::new(http_client));

        let log_service = Arc::new(LogService::new(store.clone(), event_bus.clone()));
        let media = Arc::new(MediaService::new(
            objects,
            config.storage.clone(),
            event_bus.clone(),
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            event_bus.clone(),
        ));
        let user_service: Arc<dyn UserService> =
            Arc::new(SeaOrmUserService::new(store.clone(), media.clone()));
        let social_service: Arc<dyn SocialService> = Arc::new(SeaOrmSocialService::new(
            store.clone(),
            media.clone(),
            event_bus.clone(),
        ));
        let post_service: Arc<dyn PostService> = Arc::new(SeaOrmPostService::new(
            store.clone(),
            media.clone(),
            event_bus.clone(),
        ));
        let comment_service: Arc<dyn CommentService> =
            Arc::new(SeaOrmCommentService::new(store.clone(), media.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            event_bus,
            log_service,
            media,
            oauth,
            auth_service,
            user_service,
            social_service,
            post_service,
            comment_service,
        })
    }
}
