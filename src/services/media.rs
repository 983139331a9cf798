//! Presigned object storage access for post images and avatars.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::StorageConfig;
use crate::domain::{AppEvent, ErrorCategory, Severity};
use crate::services::logs::log_error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Post,
    Avatar,
}

impl MediaKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Avatar => "avatars",
        }
    }

    /// Key prefix reserved for one user's objects of this kind.
    #[must_use]
    pub fn user_prefix(self, user_id: i32) -> String {
        format!("{}/{user_id}/", self.prefix())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
    pub expires_in: u64,
}

#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[must_use]
pub fn generate_key(kind: MediaKind, user_id: i32, ext: &str) -> String {
    format!("{}{}.{ext}", kind.user_prefix(user_id), uuid::Uuid::new_v4())
}

/// Keys handed out for viewing must live under a media prefix and stay there.
pub fn validate_view_key(key: &str) -> Result<(), MediaError> {
    let key = key.trim();
    let known_prefix = [MediaKind::Post, MediaKind::Avatar]
        .iter()
        .any(|kind| key.starts_with(&format!("{}/", kind.prefix())));

    if key.is_empty() || !known_prefix || key.contains("..") || key.contains('\\') {
        return Err(MediaError::Validation("Invalid media key".to_string()));
    }
    Ok(())
}

/// Storage backend. Presigning is local; only `delete` talks to the network.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, MediaError>;

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, MediaError>;

    async fn delete(&self, key: &str) -> Result<(), MediaError>;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Static credentials from config take precedence over the default AWS chain.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "picfeed-config");
                let mut builder = aws_sdk_s3::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(credentials)
                    .force_path_style(config.force_path_style);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .load()
                    .await;
                let mut builder = aws_sdk_s3::config::Builder::from(&shared)
                    .force_path_style(config.force_path_style);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            }
        };

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

fn presigning(expires_in: Duration) -> Result<PresigningConfig, MediaError> {
    PresigningConfig::expires_in(expires_in)
        .map_err(|e| MediaError::Storage(format!("Failed to create presigning config: {e}")))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, MediaError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| MediaError::Storage(format!("Failed to presign upload: {e}")))?;

        Ok(request.uri().to_string())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, MediaError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| MediaError::Storage(format!("Failed to presign download: {e}")))?;

        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), MediaError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MediaError::Storage(format!("Failed to delete object {key}: {e}")))?;

        Ok(())
    }
}

pub struct MediaService {
    objects: Arc<dyn ObjectStore>,
    config: StorageConfig,
    event_bus: broadcast::Sender<AppEvent>,
}

impl MediaService {
    #[must_use]
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        config: StorageConfig,
        event_bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            objects,
            config,
            event_bus,
        }
    }

    pub async fn new_upload(
        &self,
        user_id: i32,
        kind: MediaKind,
        content_type: &str,
        size: Option<u64>,
    ) -> Result<UploadTicket, MediaError> {
        let ext = extension_for(content_type).ok_or_else(|| {
            MediaError::Validation(
                "Unsupported content type. Allowed: image/jpeg, image/png, image/webp, image/gif"
                    .to_string(),
            )
        })?;

        if size.is_some_and(|size| size > self.config.max_upload_bytes) {
            return Err(MediaError::Validation(format!(
                "File size must not exceed {} bytes",
                self.config.max_upload_bytes
            )));
        }

        let key = generate_key(kind, user_id, ext);
        let upload_url = self
            .objects
            .presign_put(
                &key,
                content_type.trim(),
                Duration::from_secs(self.config.upload_expiry_secs),
            )
            .await?;

        Ok(UploadTicket {
            upload_url,
            key,
            expires_in: self.config.upload_expiry_secs,
        })
    }

    pub async fn view_url(&self, key: &str) -> Result<String, MediaError> {
        validate_view_key(key)?;
        self.objects
            .presign_get(key.trim(), Duration::from_secs(self.config.view_expiry_secs))
            .await
    }

    /// Presigned view URL for a stored key, falling back to the persisted URL
    /// when signing fails.
    pub async fn display_url(&self, stored_url: &str, key: Option<&str>) -> String {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return stored_url.to_string();
        };

        match self.view_url(key).await {
            Ok(url) => url,
            Err(e) => {
                log_error(
                    &self.event_bus,
                    ErrorCategory::S3Storage,
                    Severity::Medium,
                    "Failed to presign view URL",
                    Some(e.to_string()),
                );
                stored_url.to_string()
            }
        }
    }

    /// Checks that `key` was issued to `user_id` for `kind`.
    pub fn ensure_owned(&self, user_id: i32, kind: MediaKind, key: &str) -> Result<(), MediaError> {
        validate_view_key(key)?;
        if !key.trim().starts_with(&kind.user_prefix(user_id)) {
            return Err(MediaError::Forbidden(
                "Media key does not belong to the current user".to_string(),
            ));
        }
        Ok(())
    }

    /// Permanent (unsigned) URL stored alongside the key.
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.config.public_base_url {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }
        match &self.config.endpoint {
            Some(endpoint) if self.config.force_path_style => {
                format!(
                    "{}/{}/{key}",
                    endpoint.trim_end_matches('/'),
                    self.config.bucket
                )
            }
            _ => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.config.bucket, self.config.region
            ),
        }
    }

    /// Deletes the object in the background. Failures are logged only.
    pub fn schedule_delete(&self, key: String) {
        let objects = self.objects.clone();
        let event_bus = self.event_bus.clone();

        tokio::spawn(async move {
            if let Err(e) = objects.delete(&key).await {
                log_error(
                    &event_bus,
                    ErrorCategory::S3Storage,
                    Severity::Medium,
                    &format!("Failed to delete object {key}"),
                    Some(e.to_string()),
                );
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeObjectStore {
        pub deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStore for FakeObjectStore {
        async fn presign_put(
            &self,
            key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> Result<String, MediaError> {
            Ok(format!(
                "https://fake/{key}?put&type={content_type}&exp={}",
                expires_in.as_secs()
            ))
        }

        async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, MediaError> {
            Ok(format!("https://fake/{key}?get&exp={}", expires_in.as_secs()))
        }

        async fn delete(&self, key: &str) -> Result<(), MediaError> {
            self.deleted
                .lock()
                .unwrap()
                .push(key.to_string());
            Ok(())
        }
    }

    fn service(objects: Arc<FakeObjectStore>, config: StorageConfig) -> MediaService {
        let (tx, _) = broadcast::channel(4);
        MediaService::new(objects, config, tx)
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpg"), None);
        assert_eq!(extension_for("IMAGE/PNG"), None);
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), Some("gif"));
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn test_generate_key_is_namespaced() {
        let key = generate_key(MediaKind::Avatar, 42, "png");
        assert!(key.starts_with("avatars/42/"));
        assert!(key.ends_with(".png"));
        assert_ne!(key, generate_key(MediaKind::Avatar, 42, "png"));
    }

    #[test]
    fn test_validate_view_key() {
        assert!(validate_view_key("posts/1/a.jpg").is_ok());
        assert!(validate_view_key("avatars/1/a.jpg").is_ok());
        assert!(validate_view_key("secrets/config.toml").is_err());
        assert!(validate_view_key("posts/../secrets").is_err());
        assert!(validate_view_key("").is_err());
    }

    #[tokio::test]
    async fn test_new_upload() {
        let svc = service(Arc::new(FakeObjectStore::default()), StorageConfig::default());

        let ticket = svc
            .new_upload(7, MediaKind::Post, "image/jpeg", Some(1024))
            .await
            .unwrap();
        assert!(ticket.key.starts_with("posts/7/"));
        assert!(ticket.key.ends_with(".jpg"));
        assert_eq!(ticket.expires_in, 60);
        assert!(ticket.upload_url.contains("exp=60"));

        let err = svc
            .new_upload(7, MediaKind::Post, "text/html", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));

        let err = svc
            .new_upload(7, MediaKind::Post, "image/png", Some(u64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));

        let max = StorageConfig::default().max_upload_bytes;
        for size in [0, max] {
            assert!(
                svc.new_upload(7, MediaKind::Avatar, "image/webp", Some(size))
                    .await
                    .is_ok(),
                "size {size}"
            );
        }
    }

    #[test]
    fn test_ensure_owned() {
        let svc = service(Arc::new(FakeObjectStore::default()), StorageConfig::default());
        assert!(svc.ensure_owned(3, MediaKind::Post, "posts/3/x.jpg").is_ok());
        assert!(matches!(
            svc.ensure_owned(3, MediaKind::Post, "posts/4/x.jpg"),
            Err(MediaError::Forbidden(_))
        ));
        assert!(matches!(
            svc.ensure_owned(3, MediaKind::Post, "avatars/3/x.jpg"),
            Err(MediaError::Forbidden(_))
        ));
        // A numeric prefix of another user id must not match
        assert!(svc.ensure_owned(3, MediaKind::Post, "posts/33/x.jpg").is_err());
    }

    #[test]
    fn test_object_url() {
        let mut config = StorageConfig {
            bucket: "media".to_string(),
            region: "eu-west-1".to_string(),
            ..StorageConfig::default()
        };
        config.endpoint = None;
        config.public_base_url = None;
        let svc = service(Arc::new(FakeObjectStore::default()), config.clone());
        assert_eq!(
            svc.object_url("posts/1/a.jpg"),
            "https://media.s3.eu-west-1.amazonaws.com/posts/1/a.jpg"
        );

        config.endpoint = Some("http://localhost:9000/".to_string());
        config.force_path_style = true;
        let svc = service(Arc::new(FakeObjectStore::default()), config.clone());
        assert_eq!(
            svc.object_url("posts/1/a.jpg"),
            "http://localhost:9000/media/posts/1/a.jpg"
        );

        config.public_base_url = Some("https://cdn.example.com".to_string());
        let svc = service(Arc::new(FakeObjectStore::default()), config);
        assert_eq!(
            svc.object_url("posts/1/a.jpg"),
            "https://cdn.example.com/posts/1/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_schedule_delete_runs_in_background() {
        let objects = Arc::new(FakeObjectStore::default());
        let svc = service(objects.clone(), StorageConfig::default());

        svc.schedule_delete("posts/1/old.jpg".to_string());

        for _ in 0..50 {
            if !objects.deleted.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            objects.deleted.lock().unwrap().as_slice(),
            ["posts/1/old.jpg".to_string()]
        );
    }
}
