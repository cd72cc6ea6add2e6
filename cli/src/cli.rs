use crate::commands::auth::AuthCommand;
use crate::commands::export::ExportCommand;
use crate::commands::locate::LocateCommand;
use crate::commands::CommandEnum;
use clap::{Parser, Subcommand};
use pocketmark::store::Browser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Export Pocket saves into browser bookmarks", long_about = None)]
pub struct Cli {
    /// Optional custom configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true)]
    pub nc: bool,

    /// Show debug information
    #[arg(short = 'g', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export Pocket items into the browser's Pocket-Export bookmark folder
    Export {
        /// Target browser (edge, chrome, firefox); prompted when omitted
        #[arg(short, long, value_parser = parse_browser)]
        browser: Option<Browser>,

        /// Read items from a saved Pocket response instead of the API
        #[arg(long)]
        items: Option<PathBuf>,

        /// Bookmark store file to use instead of locating it
        #[arg(long)]
        store: Option<PathBuf>,

        /// Firefox profile directory name or absolute path
        #[arg(long)]
        firefox_profile: Option<String>,

        /// Directory for the store backup
        #[arg(long)]
        backup_dir: Option<PathBuf>,

        /// Merge without backing up or writing the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the bookmark store path of a browser
    Locate {
        #[arg(short, long, value_parser = parse_browser)]
        browser: Option<Browser>,

        #[arg(long)]
        firefox_profile: Option<String>,
    },

    /// Authorize with Pocket and remember the access token
    Auth {
        /// Pocket consumer key; prompted when missing from the config
        #[arg(long)]
        consumer_key: Option<String>,
    },
}

fn parse_browser(s: &str) -> Result<Browser, String> {
    Browser::from_string(s)
        .ok_or_else(|| format!("unknown browser '{}' (expected edge, chrome or firefox)", s))
}

impl Cli {
    pub fn into_command(self) -> CommandEnum {
        match self.command {
            Commands::Export {
                browser,
                items,
                store,
                firefox_profile,
                backup_dir,
                dry_run,
            } => CommandEnum::Export(ExportCommand {
                browser,
                items,
                store,
                firefox_profile,
                backup_dir,
                dry_run,
            }),
            Commands::Locate {
                browser,
                firefox_profile,
            } => CommandEnum::Locate(LocateCommand {
                browser,
                firefox_profile,
            }),
            Commands::Auth { consumer_key } => CommandEnum::Auth(AuthCommand { consumer_key }),
        }
    }
}
