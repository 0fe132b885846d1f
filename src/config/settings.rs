//! User configuration settings
//!
//! Layered configuration: defaults → config file → environment variables

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Name of the directory holding project files, below the config root
pub const PROJECTS_DIR_NAME: &str = "tmuxspace";

/// Prefix for environment variable overrides (`TMUXSPACE_TMUX_PROGRAM`, ...)
pub const ENV_PREFIX: &str = "TMUXSPACE_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tmux binary to invoke
    pub tmux_program: String,

    /// tmux server socket name (`tmux -L`). Unset uses the default server.
    pub tmux_socket: Option<String>,

    /// Directory holding project files (default: `$XDG_CONFIG_HOME/tmuxspace`,
    /// else `$HOME/tmuxspace`)
    pub projects_dir: Option<PathBuf>,

    /// Timeout for a single tmux command in seconds. Unset means wait forever.
    pub command_timeout_secs: Option<u64>,

    /// Whether `new-project` may replace an existing project file
    pub overwrite_existing: bool,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path (if set, logs to file instead of stderr)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmux_program: "tmux".to_string(),
            tmux_socket: None,
            projects_dir: None,
            command_timeout_secs: None,
            overwrite_existing: false,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file and the environment.
    /// A missing file only contributes nothing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (TMUXSPACE_TMUX_PROGRAM, etc.)
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "tmuxspace", "tmuxspace").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Directory holding the project files
    pub fn projects_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.projects_dir {
            return Ok(dir.clone());
        }

        let root = projects_root(
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
        )
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })?;

        Ok(root.join(PROJECTS_DIR_NAME))
    }

    /// Per-command timeout, if any
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(parent.to_path_buf()))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        std::fs::write(config_path, toml)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }
}

/// Pick the config root: `XDG_CONFIG_HOME` when set, otherwise `HOME`.
/// Empty values count as unset.
pub fn projects_root(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|v| !v.is_empty())
        .or_else(|| home.filter(|v| !v.is_empty()))
        .map(PathBuf::from)
}
