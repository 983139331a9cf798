use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!("Set storage credentials through PICFEED_S3_ACCESS_KEY_ID and PICFEED_S3_SECRET_ACCESS_KEY.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}
