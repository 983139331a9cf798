use std::str::FromStr;

use crate::config::Config;
use crate::db::Store;
use crate::domain::{ErrorCategory, Severity, format_error};

pub async fn cmd_logs(config: &Config, limit: u64, category: Option<&str>) -> anyhow::Result<()> {
    let category = category
        .map(ErrorCategory::from_str)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let store = Store::new(&config.general.database_path).await?;
    let logs = store
        .recent_logs(limit, category.map(|c| c.as_str().to_string()))
        .await?;

    if logs.is_empty() {
        println!("No logged errors.");
        return Ok(());
    }

    println!("Recent errors (last {}):", logs.len());
    println!("{:-<70}", "");

    for log in logs {
        let line = match (
            ErrorCategory::from_str(&log.category),
            Severity::from_str(&log.severity),
        ) {
            (Ok(category), Ok(severity)) => format_error(category, severity, &log.message),
            _ => format!("[{}/{}] {}", log.category, log.severity, log.message),
        };
        println!("{} {}", log.created_at, line);
        if let Some(details) = log.details {
            println!("  {details}");
        }
    }

    Ok(())
}

pub async fn cmd_prune_logs(config: &Config, days: i64) -> anyhow::Result<()> {
    if days < 0 {
        anyhow::bail!("--days must not be negative");
    }

    let store = Store::new(&config.general.database_path).await?;
    let removed = store.prune_logs(days).await?;
    println!("Removed {removed} log entries older than {days} days.");
    Ok(())
}
