//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags and environment (not handled here)
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$DEPOTCTL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/depotctl/config.toml`
//! 3. `~/.depotctl/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use depotctl::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! if let Some(host) = config.host() {
//!     println!("Host: {}", host);
//! }
//! println!("Description: {}", config.changelist_description());
//! ```

pub mod schema;

pub use schema::{ChangelistDefaults, ConnectionDefaults, GlobalConfig, P4Config};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::client::DEFAULT_CHANGELIST_DESCRIPTION;
use crate::depot::p4::DEFAULT_PROGRAM;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "connection.host",
    "connection.client",
    "connection.user",
    "connection.charset",
    "changelist.description",
    "p4.program",
];

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path the configuration was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<Config, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        Ok(Config {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// First existing config file in search order.
    fn locate() -> Option<PathBuf> {
        // 1. Check $DEPOTCTL_CONFIG
        if let Ok(path) = std::env::var("DEPOTCTL_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/depotctl/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("depotctl/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.depotctl/config.toml
        dirs::home_dir()
            .map(|home| home.join(".depotctl/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `$DEPOTCTL_CONFIG` when set, otherwise
    /// `~/.depotctl/config.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("DEPOTCTL_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".depotctl/config.toml"))
    }

    /// Write config atomically to the canonical location.
    pub fn write(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        Self::write_to(&path, config)?;
        Ok(path)
    }

    /// Write config atomically to `path`.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory and renames it over the target.
    pub fn write_to(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    fn connection(&self) -> Option<&ConnectionDefaults> {
        self.global.connection.as_ref()
    }

    /// Default host address, if configured.
    pub fn host(&self) -> Option<&str> {
        self.connection().and_then(|c| c.host.as_deref())
    }

    /// Default client workspace, if configured.
    pub fn client(&self) -> Option<&str> {
        self.connection().and_then(|c| c.client.as_deref())
    }

    /// Default user, if configured.
    pub fn user(&self) -> Option<&str> {
        self.connection().and_then(|c| c.user.as_deref())
    }

    /// Default charset, if configured.
    pub fn charset(&self) -> Option<&str> {
        self.connection().and_then(|c| c.charset.as_deref())
    }

    /// Description for new changelists.
    ///
    /// Defaults to "Artifactory release plugin".
    pub fn changelist_description(&self) -> &str {
        self.global
            .changelist
            .as_ref()
            .and_then(|c| c.description.as_deref())
            .unwrap_or(DEFAULT_CHANGELIST_DESCRIPTION)
    }

    /// The `p4` executable.
    ///
    /// Defaults to "p4".
    pub fn p4_program(&self) -> &str {
        self.global
            .p4
            .as_ref()
            .and_then(|p| p.program.as_deref())
            .unwrap_or(DEFAULT_PROGRAM)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Effective value of a dotted key, with defaults applied.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "connection.host" => self.host(),
            "connection.client" => self.client(),
            "connection.user" => self.user(),
            "connection.charset" => self.charset(),
            "changelist.description" => Some(self.changelist_description()),
            "p4.program" => Some(self.p4_program()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value.map(str::to_string))
    }

    /// Set a dotted key on the global config.
    ///
    /// The result is validated; the config is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut global = self.global.clone();
        let value = Some(value.to_string());
        match key {
            "connection.host" => global.connection.get_or_insert_with(Default::default).host = value,
            "connection.client" => {
                global.connection.get_or_insert_with(Default::default).client = value
            }
            "connection.user" => global.connection.get_or_insert_with(Default::default).user = value,
            "connection.charset" => {
                global.connection.get_or_insert_with(Default::default).charset = value
            }
            "changelist.description" => {
                global.changelist.get_or_insert_with(Default::default).description = value
            }
            "p4.program" => global.p4.get_or_insert_with(Default::default).program = value,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        global.validate()?;
        self.global = global;
        Ok(())
    }
}
