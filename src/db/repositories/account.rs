use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{accounts, prelude::*};

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Local user linked to a provider identity, if any.
    pub async fn find_user_id(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<i32>> {
        let account = Accounts::find()
            .filter(accounts::Column::Provider.eq(provider))
            .filter(accounts::Column::ProviderAccountId.eq(provider_account_id))
            .one(&self.conn)
            .await
            .context("Failed to query OAuth account")?;

        Ok(account.map(|a| a.user_id))
    }

    pub async fn link(&self, user_id: i32, provider: &str, provider_account_id: &str) -> Result<()> {
        let active = accounts::ActiveModel {
            user_id: Set(user_id),
            provider: Set(provider.to_string()),
            provider_account_id: Set(provider_account_id.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        Accounts::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    accounts::Column::Provider,
                    accounts::Column::ProviderAccountId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await
            .context("Failed to link OAuth account")?;

        Ok(())
    }
}
