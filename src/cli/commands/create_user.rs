//! Create user command handler

use tokio::sync::broadcast;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, Registration, SeaOrmAuthService};

pub async fn cmd_create_user(
    config: &Config,
    email: &str,
    password: &str,
    name: &str,
    username: Option<String>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
    let auth = SeaOrmAuthService::new(store, config.security.clone(), event_bus);

    let user = auth
        .register(Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            username,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Could not create user: {e}"))?;

    println!("Created user #{}", user.id);
    println!("  Email:    {}", user.email);
    println!(
        "  Username: {}",
        user.username.as_deref().unwrap_or("(none)")
    );

    Ok(())
}
