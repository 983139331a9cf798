use crate::entities::{prelude::*, system_logs};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

pub struct LogRepository {
    conn: DatabaseConnection,
}

impl LogRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        category: &str,
        severity: &str,
        message: &str,
        details: Option<String>,
    ) -> Result<()> {
        let active_model = system_logs::ActiveModel {
            category: Set(category.to_string()),
            severity: Set(severity.to_string()),
            message: Set(message.to_string()),
            details: Set(details),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        SystemLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(
        &self,
        limit: u64,
        category_filter: Option<String>,
    ) -> Result<Vec<system_logs::Model>> {
        let mut query = SystemLogs::find()
            .order_by_desc(system_logs::Column::CreatedAt)
            .order_by_desc(system_logs::Column::Id);

        if let Some(category) = category_filter {
            query = query.filter(system_logs::Column::Category.eq(category));
        }

        Ok(query.limit(limit).all(&self.conn).await?)
    }

    /// Deletes entries older than the given number of days.
    pub async fn prune(&self, older_than_days: i64) -> Result<u64> {
        // RFC 3339 UTC strings compare chronologically
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(older_than_days)).to_rfc3339();

        let result = SystemLogs::delete_many()
            .filter(system_logs::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
