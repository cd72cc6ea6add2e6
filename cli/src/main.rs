mod cli;
mod commands;
mod fetch_ui;
mod output;
mod prompt;

use clap::Parser;
use commands::AppContext;
use pocketmark::config::Config;
use pocketmark::error::Result;

fn run() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logger; RUST_LOG wins over --debug
    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load configuration
    let (config, config_path) = match &args.config {
        Some(path) => {
            let config = if path.exists() {
                Config::load_from_path(path)?
            } else {
                Config::default()
            };
            (config, path.clone())
        }
        None => (Config::load(), Config::default_path()),
    };

    let ctx = AppContext {
        config: &config,
        config_path: &config_path,
        no_color: args.nc,
    };
    args.into_command().execute(&ctx)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error [{}]: {}", e.stage(), e);
        std::process::exit(1);
    }
}
