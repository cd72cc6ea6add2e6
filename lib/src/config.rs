use crate::error::{PocketmarkError, Result};
use crate::store::{writer, Browser};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Pocket application consumer key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,

    /// Access token from a previous `auth` run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Browser to export into when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,

    /// Firefox profile directory name or absolute path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firefox_profile: Option<String>,

    /// Where store backups go instead of beside the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Items requested per Pocket API call
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Seconds to wait for the user to authorize the app
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,

    /// Custom user-agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_key: None,
            access_token: None,
            browser: None,
            firefox_profile: None,
            backup_dir: None,
            page_size: default_page_size(),
            auth_timeout_secs: default_auth_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_page_size() -> usize {
    30
}

fn default_auth_timeout_secs() -> u64 {
    300
}

fn default_user_agent() -> String {
    concat!("pocketmark/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Config {
    /// Default config file location (~/.config/pocketmark/config.yml)
    pub fn default_path() -> PathBuf {
        crate::utils::get_config_dir().join("config.yml")
    }

    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PocketmarkError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default location
    /// Falls back to default config if the file is missing or unreadable
    pub fn load() -> Self {
        let config_path = Self::default_path();

        if config_path.exists() {
            match Self::load_from_path(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to load config from {:?}: {}", config_path, e);
                    log::warn!("Using default configuration");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file path
    ///
    /// The file holds the access token, so it is replaced atomically and
    /// kept readable by the owner only.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        writer::write(path, yaml.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::default_path())
    }
}
