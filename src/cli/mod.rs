//! cli
//!
//! Command-line interface layer for depotctl.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Merge flags with the config file into connection settings
//! - Delegate to the client layer and display results
//!
//! # Architecture
//!
//! The CLI layer is thin. Depot work happens in [`crate::client`]; command
//! handlers only open a session, call one workflow, and print the result.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_tracing(verbosity);

    let config = Config::load().context("Failed to load config")?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let ctx = commands::Context {
        verbosity,
        config,
        connection: cli.connection,
        p4_program: cli.p4_program,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| verbosity.log_filter().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
