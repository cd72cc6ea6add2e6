use super::{AppContext, PocketmarkCommand};
use crate::fetch_ui::wait_for_authorization;
use crate::prompt::prompt_consumer_key;
use pocketmark::config::Config;
use pocketmark::error::Result;
use pocketmark::pocket::{authorize_url, PocketClient};
use pocketmark::browser;
use std::path::Path;
use std::time::Duration;

pub struct AuthCommand {
    pub consumer_key: Option<String>,
}

impl PocketmarkCommand for AuthCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let consumer_key = match &self.consumer_key {
            Some(key) => key.clone(),
            None => consumer_key(ctx.config)?,
        };
        let access_token = authorize(ctx.config, &consumer_key)?;
        remember(ctx.config, ctx.config_path, &consumer_key, &access_token)?;
        eprintln!("✓ Access token saved to {}", ctx.config_path.display());
        Ok(())
    }
}

/// Consumer key from the config, prompting when it is missing
pub fn consumer_key(config: &Config) -> Result<String> {
    match &config.consumer_key {
        Some(key) if !key.trim().is_empty() => Ok(key.clone()),
        _ => prompt_consumer_key(),
    }
}

/// Run the OAuth flow in the user's browser and return the access token
pub fn authorize(config: &Config, consumer_key: &str) -> Result<String> {
    let client = PocketClient::new(consumer_key, &config.user_agent)?;
    let code = client.request_token()?;
    let url = authorize_url(&code)?;

    eprintln!("Please authorize pocketmark in your browser:");
    eprintln!("  {}", url);
    if let Err(e) = browser::open_url(&url) {
        log::warn!("{}", e);
        eprintln!("Open the address above manually.");
    }

    wait_for_authorization(
        &client,
        &code,
        Duration::from_secs(config.auth_timeout_secs),
    )
}

/// Store the key and token so later runs skip authorization
pub fn remember(
    config: &Config,
    config_path: &Path,
    consumer_key: &str,
    access_token: &str,
) -> Result<()> {
    let updated = with_credentials(config, consumer_key, access_token);
    updated.save_to_path(config_path)?;
    log::debug!("Saved Pocket credentials to {:?}", config_path);
    Ok(())
}

fn with_credentials(config: &Config, consumer_key: &str, access_token: &str) -> Config {
    Config {
        consumer_key: Some(consumer_key.to_string()),
        access_token: Some(access_token.to_string()),
        ..config.clone()
    }
}
