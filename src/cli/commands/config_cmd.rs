//! config command - Show, get, or set configuration values

use super::Context;
use crate::core::config::{Config, KEYS};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Show the effective configuration.
///
/// Passwords are never part of the configuration and never shown.
pub fn show(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => output::print(format!("# {}", path.display()), ctx.verbosity),
        None => output::print("# (no config file, defaults)", ctx.verbosity),
    }

    for key in KEYS {
        let value = ctx.config.get(key)?;
        output::value(format!(
            "{} = {}",
            key,
            value.as_deref().unwrap_or("(not set)")
        ));
    }
    Ok(())
}

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    // key exists but has no value: print nothing
    if let Some(value) = ctx.config.get(key)? {
        output::value(value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    config.set(key, value)?;

    let path = match ctx.config.loaded_from() {
        Some(path) => {
            Config::write_to(path, &config.global).context("Failed to write config")?;
            path.to_path_buf()
        }
        None => Config::write(&config.global).context("Failed to write config")?,
    };

    output::print(
        format!("Set {} = {} in {}", key, value, path.display()),
        ctx.verbosity,
    );
    Ok(())
}
