use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub storage: StorageConfig,

    pub feed: FeedConfig,

    #[serde(default)]
    pub oauth: Vec<OAuthProviderConfig>,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    /// Emit logs as JSON lines instead of the human readable format
    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "picfeed".to_string());

        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,

    /// Base URL the OAuth callbacks are served from, e.g. `https://picfeed.example`.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60 * 24 * 30,
            public_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/picfeed.db".to_string(),
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

/// S3-compatible object storage used for post images and avatars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,

    pub region: String,

    /// Custom endpoint for S3-compatible storage such as MinIO
    pub endpoint: Option<String>,

    /// Use path-style URLs (`{endpoint}/{bucket}/{key}`)
    pub force_path_style: bool,

    /// Static credentials. When unset the default AWS credential chain is used.
    pub access_key_id: Option<String>,

    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,

    /// Public base URL (CDN) used for persisted object URLs
    pub public_base_url: Option<String>,

    pub upload_expiry_secs: u64,

    pub view_expiry_secs: u64,

    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "picfeed-media".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            upload_expiry_secs: 60,
            view_expiry_secs: 3600,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub default_page_size: u64,

    pub max_page_size: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
        }
    }
}

/// A generic OAuth2 authorization-code provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProviderConfig {
    /// Route name, e.g. `google` for `/api/auth/oauth/google`
    pub name: String,

    pub client_id: String,

    #[serde(default, skip_serializing)]
    pub client_secret: String,

    pub authorize_url: String,

    pub token_url: String,

    pub userinfo_url: String,

    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            feed: FeedConfig::default(),
            oauth: Vec::new(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets are usually supplied through the environment rather than `config.toml`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PICFEED_DATABASE_URL") {
            self.general.database_path = url;
        }
        if let Some(key) = lookup("PICFEED_S3_ACCESS_KEY_ID") {
            self.storage.access_key_id = Some(key);
        }
        if let Some(secret) = lookup("PICFEED_S3_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = Some(secret);
        }
        if let Some(bucket) = lookup("PICFEED_S3_BUCKET") {
            self.storage.bucket = bucket;
        }
        for provider in &mut self.oauth {
            let var = format!(
                "PICFEED_OAUTH_{}_CLIENT_SECRET",
                provider.name.to_ascii_uppercase()
            );
            if let Some(secret) = lookup(&var) {
                provider.client_secret = secret;
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("picfeed").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".picfeed").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            anyhow::bail!("storage.bucket cannot be empty");
        }

        if self.storage.upload_expiry_secs == 0 || self.storage.view_expiry_secs == 0 {
            anyhow::bail!("Presigned URL expiry must be > 0 seconds");
        }

        if self.feed.default_page_size == 0 || self.feed.max_page_size == 0 {
            anyhow::bail!("Feed page sizes must be > 0");
        }

        if self.feed.default_page_size > self.feed.max_page_size {
            anyhow::bail!("feed.default_page_size cannot exceed feed.max_page_size");
        }

        for provider in &self.oauth {
            if provider.name.is_empty() {
                anyhow::bail!("OAuth provider name cannot be empty");
            }
            if provider.authorize_url.is_empty()
                || provider.token_url.is_empty()
                || provider.userinfo_url.is_empty()
            {
                anyhow::bail!("OAuth provider '{}' is missing an endpoint URL", provider.name);
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn find_oauth_provider(&self, name: &str) -> Option<&OAuthProviderConfig> {
        self.oauth.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.default_page_size, 10);
        assert_eq!(config.feed.max_page_size, 50);
        assert_eq!(config.storage.upload_expiry_secs, 60);
        assert!(config.oauth.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[feed]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [storage]
            bucket = "photos"
            endpoint = "http://localhost:9000"
            force_path_style = true

            [[oauth]]
            name = "github"
            client_id = "abc"
            authorize_url = "https://github.com/login/oauth/authorize"
            token_url = "https://github.com/login/oauth/access_token"
            userinfo_url = "https://api.github.com/user"
            scopes = ["read:user", "user:email"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.bucket, "photos");
        assert!(config.storage.force_path_style);
        assert_eq!(config.storage.view_expiry_secs, 3600);
        assert!(config.find_oauth_provider("github").is_some());
        assert!(config.find_oauth_provider("google").is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.oauth.push(OAuthProviderConfig {
            name: "google".to_string(),
            client_id: "id".to_string(),
            client_secret: String::new(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scopes: vec![],
        });

        config.apply_env_overrides(|key| match key {
            "PICFEED_S3_SECRET_ACCESS_KEY" => Some("s3cret".to_string()),
            "PICFEED_OAUTH_GOOGLE_CLIENT_SECRET" => Some("oauth-secret".to_string()),
            _ => None,
        });

        assert_eq!(config.storage.secret_access_key.as_deref(), Some("s3cret"));
        assert_eq!(config.oauth[0].client_secret, "oauth-secret");
        assert_eq!(config.general.database_path, "sqlite:data/picfeed.db");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.feed.default_page_size = 100;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.bucket = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.oauth.push(OAuthProviderConfig {
            name: "broken".to_string(),
            client_id: "id".to_string(),
            client_secret: String::new(),
            authorize_url: String::new(),
            token_url: String::new(),
            userinfo_url: String::new(),
            scopes: vec![],
        });
        assert!(config.validate().is_err());
    }
}
