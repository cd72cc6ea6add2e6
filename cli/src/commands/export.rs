use super::auth::{authorize, consumer_key, remember};
use super::{AppContext, PocketmarkCommand};
use crate::fetch_ui::fetch_with_spinner;
use crate::output::print_report;
use crate::prompt::prompt_browser;
use pocketmark::config::Config;
use pocketmark::error::Result;
use pocketmark::export::{run_export, ExportOptions};
use pocketmark::models::SourceItem;
use pocketmark::pocket::{load_items_file, PocketClient};
use pocketmark::store::{Browser, HomeDirs, Os, ProfileLocator};
use std::path::{Path, PathBuf};

pub struct ExportCommand {
    pub browser: Option<Browser>,
    pub items: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub firefox_profile: Option<String>,
    pub backup_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl ExportCommand {
    /// Combine flags with the config; flags win
    fn options(&self, config: &Config, os: Os, browser: Browser) -> ExportOptions {
        ExportOptions {
            os,
            browser,
            firefox_profile: self
                .firefox_profile
                .clone()
                .or_else(|| config.firefox_profile.clone()),
            store_path: self.store.clone(),
            backup_dir: self.backup_dir.clone().or_else(|| config.backup_dir.clone()),
            dry_run: self.dry_run,
        }
    }
}

impl PocketmarkCommand for ExportCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let os = Os::current();
        let browser = match self.browser.or(ctx.config.browser) {
            Some(browser) => browser,
            None => prompt_browser(Browser::default_for(os))?,
        };

        let items = match &self.items {
            Some(path) => load_items_file(path)?,
            None => fetch_items(ctx.config, ctx.config_path)?,
        };

        eprintln!(
            "Make sure {} is closed; it may overwrite the bookmarks otherwise.",
            browser.display_name()
        );

        let locator = ProfileLocator::new(HomeDirs::from_env()?);
        let report = run_export(&locator, &self.options(ctx.config, os, browser), &items)?;
        print_report(&report, ctx.no_color);

        if !report.dry_run {
            eprintln!(
                "Restart {} to see the {} folder.",
                browser.display_name(),
                pocketmark::merge::EXPORT_FOLDER_NAME
            );
        }
        Ok(())
    }
}

/// Download every saved item, authorizing first when no token is stored
fn fetch_items(config: &Config, config_path: &Path) -> Result<Vec<SourceItem>> {
    let consumer_key = consumer_key(config)?;
    let access_token = match &config.access_token {
        Some(token) if !token.trim().is_empty() => token.clone(),
        _ => {
            let token = authorize(config, &consumer_key)?;
            remember(config, config_path, &consumer_key, &token)?;
            token
        }
    };

    let client = PocketClient::new(&consumer_key, &config.user_agent)?;
    fetch_with_spinner(&client, &access_token, config.page_size)
}
