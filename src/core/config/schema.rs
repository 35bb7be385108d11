//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$DEPOTCTL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/depotctl/config.toml`
//! 3. `~/.depotctl/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Values are validated after parsing (e.g., the host address must parse
//! and the charset must be one the depot knows).
//!
//! Passwords are deliberately absent from the schema; `deny_unknown_fields`
//! rejects a file that tries to set one.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::depot::{is_supported_charset, ServerAddress};

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [connection]
/// host = "ssl:depot.example.org:1666"
/// client = "ci-client"
/// user = "svc"
/// charset = "utf8"
///
/// [changelist]
/// description = "Release automation"
///
/// [p4]
/// program = "/usr/local/bin/p4"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Connection defaults
    pub connection: Option<ConnectionDefaults>,

    /// Changelist defaults
    pub changelist: Option<ChangelistDefaults>,

    /// `p4` executable settings
    pub p4: Option<P4Config>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(connection) = &self.connection {
            connection.validate()?;
        }
        if let Some(p4) = &self.p4 {
            p4.validate()?;
        }
        Ok(())
    }
}

/// Default connection parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionDefaults {
    /// Host address, `host:port` or `ssl:host:port`
    pub host: Option<String>,

    /// Client workspace name
    pub client: Option<String>,

    /// Depot user
    pub user: Option<String>,

    /// Character set
    pub charset: Option<String>,
}

impl ConnectionDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = &self.host {
            ServerAddress::parse(host)
                .map_err(|e| ConfigError::InvalidValue(format!("connection.host: {e}")))?;
        }

        if let Some(client) = &self.client {
            if client.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "connection.client cannot be empty".to_string(),
                ));
            }
        }

        // unknown charsets are replaced with "none" at connect time, but a
        // value in the config file is a typo worth reporting
        if let Some(charset) = &self.charset {
            if !charset.trim().is_empty() && !is_supported_charset(charset.trim()) {
                return Err(ConfigError::InvalidValue(format!(
                    "connection.charset: unsupported charset '{}'",
                    charset
                )));
            }
        }

        Ok(())
    }
}

/// Changelist defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ChangelistDefaults {
    /// Description given to newly created changelists
    pub description: Option<String>,
}

/// `p4` executable settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct P4Config {
    /// Path to the `p4` executable (default: `p4` on `PATH`)
    pub program: Option<String>,
}

impl P4Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(program) = &self.program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "p4.program cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
