use crate::db::Store;
use crate::domain::{AppEvent, ErrorCategory, Severity, format_error};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Emits a tracing event for the error and, for high and critical severities,
/// publishes it on the event bus so the log listener persists it.
pub fn log_error(
    event_bus: &broadcast::Sender<AppEvent>,
    category: ErrorCategory,
    severity: Severity,
    message: &str,
    details: Option<String>,
) {
    let line = format_error(category, severity, message);
    let details_ref = details.as_deref().unwrap_or("");

    match severity {
        Severity::Low => {
            debug!(category = %category, severity = %severity, details = details_ref, "{line}");
        }
        Severity::Medium => {
            warn!(category = %category, severity = %severity, details = details_ref, "{line}");
        }
        Severity::High | Severity::Critical => {
            error!(category = %category, severity = %severity, details = details_ref, "{line}");
        }
    }

    if severity.is_persisted() {
        // No receivers is fine (CLI commands, tests)
        let _ = event_bus.send(AppEvent::Error {
            category,
            severity,
            message: message.to_string(),
            details,
        });
    }
}

pub struct LogService {
    store: Store,
    event_bus: broadcast::Sender<AppEvent>,
}

impl LogService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<AppEvent>) -> Self {
        Self { store, event_bus }
    }

    pub fn report(
        &self,
        category: ErrorCategory,
        severity: Severity,
        message: &str,
        details: Option<String>,
    ) {
        log_error(&self.event_bus, category, severity, message, details);
    }

    pub fn start_listener(self: Arc<Self>) {
        let mut rx = self.event_bus.subscribe();
        let service = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = service.handle_event(event).await {
                            error!(error = %e, "Failed to save log");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        error!(count, "Log listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Log listener event bus closed");
                        break;
                    }
                }
            }
        });
    }

    async fn handle_event(&self, event: AppEvent) -> anyhow::Result<()> {
        let AppEvent::Error {
            category,
            severity,
            message,
            details,
        } = event
        else {
            return Ok(());
        };

        self.store
            .add_log(
                category.as_str(),
                severity.as_str(),
                &format_error(category, severity, &message),
                details,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_high_severities_are_published() {
        let (tx, mut rx) = broadcast::channel(8);

        log_error(&tx, ErrorCategory::Validation, Severity::Low, "bad input", None);
        log_error(&tx, ErrorCategory::Api, Severity::Medium, "slow provider", None);
        log_error(
            &tx,
            ErrorCategory::Database,
            Severity::High,
            "query failed",
            Some("timeout".to_string()),
        );

        match rx.try_recv().unwrap() {
            AppEvent::Error {
                category,
                severity,
                message,
                details,
            } => {
                assert_eq!(category, ErrorCategory::Database);
                assert_eq!(severity, Severity::High);
                assert_eq!(message, "query failed");
                assert_eq!(details.as_deref(), Some("timeout"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_listener_persists_errors() {
        let path = std::env::temp_dir().join(format!("picfeed-logs-{}.db", uuid::Uuid::new_v4()));
        let store = Store::with_pool_options(&format!("sqlite:{}?mode=rwc", path.display()), 2, 1)
            .await
            .unwrap();
        let (tx, _) = broadcast::channel(8);
        let service = Arc::new(LogService::new(store.clone(), tx));
        service.clone().start_listener();

        service.report(
            ErrorCategory::S3Storage,
            Severity::Critical,
            "bucket unreachable",
            None,
        );

        let mut persisted = Vec::new();
        for _ in 0..50 {
            persisted = store.recent_logs(10, None).await.unwrap();
            if !persisted.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].category, "S3_STORAGE");
        assert_eq!(persisted[0].message, "[S3_STORAGE/CRITICAL] bucket unreachable");

        drop(store);
        let _ = std::fs::remove_file(path);
    }
}
