use pocketmark::config::Config;
use pocketmark::error::Result;
use std::path::Path;

pub struct AppContext<'a> {
    pub config: &'a Config,
    /// Where `auth` stores the token
    pub config_path: &'a Path,
    pub no_color: bool,
}

pub mod auth;
pub mod export;
pub mod locate;

pub trait PocketmarkCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()>;
}

/// Enum-based dispatch for commands (avoids Box<dyn PocketmarkCommand>)
pub enum CommandEnum {
    Export(export::ExportCommand),
    Locate(locate::LocateCommand),
    Auth(auth::AuthCommand),
}

impl CommandEnum {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            Self::Export(cmd) => cmd.execute(ctx),
            Self::Locate(cmd) => cmd.execute(ctx),
            Self::Auth(cmd) => cmd.execute(ctx),
        }
    }
}
