//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--host`, `--client`, `--user`, `--charset`: connection settings
//!   (also read from `P4PORT`, `P4CLIENT`, `P4USER`, `P4CHARSET`)
//! - `--password-stdin` / `--prompt-password`: password source
//!   (otherwise `P4PASSWD`, otherwise no login)
//! - `--p4 <path>`: `p4` executable to run
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Flags override the config file; the config file overrides defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::ChangelistId;

/// depotctl - Drive changelists and labels on a Perforce depot
#[derive(Parser, Debug)]
#[command(name = "depotctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// `p4` executable to run
    #[arg(long = "p4", global = true, value_name = "PATH")]
    pub p4_program: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Connection settings shared by every depot command.
///
/// `Debug` output never includes the password.
#[derive(Args, Clone, Default)]
pub struct ConnectionArgs {
    /// Host address, `host:port` or `ssl:host:port`
    #[arg(long, global = true, env = "P4PORT", value_name = "ADDRESS")]
    pub host: Option<String>,

    /// Client workspace name
    #[arg(long, global = true, env = "P4CLIENT", value_name = "NAME")]
    pub client: Option<String>,

    /// Depot user
    #[arg(long, global = true, env = "P4USER", value_name = "USER")]
    pub user: Option<String>,

    /// Character set (falls back to `none` if the depot does not know it)
    #[arg(long, global = true, env = "P4CHARSET", value_name = "CHARSET")]
    pub charset: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long, global = true, conflicts_with = "prompt_password")]
    pub password_stdin: bool,

    /// Prompt for the password without echo
    #[arg(long, global = true)]
    pub prompt_password: bool,

    /// Password from `P4PASSWD`; there is no command-line flag for it
    #[arg(skip = std::env::var("P4PASSWD").ok())]
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("host", &self.host)
            .field("client", &self.client)
            .field("user", &self.user)
            .field("charset", &self.charset)
            .field("password_stdin", &self.password_stdin)
            .field("prompt_password", &self.prompt_password)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect, show the bound workspace, and disconnect
    #[command(
        name = "check",
        long_about = "Connect to the depot and show the bound workspace.\n\n\
            Runs the full negotiation (trust, charset, login, workspace binding) \
            and disconnects. Use it to verify connection settings.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Verify settings from the config file
    depotctl check

    # Verify an SSL server with a password from the environment
    P4PASSWD=secret depotctl --host ssl:depot.example.org:1666 --client ci-client check"
    )]
    Check,

    /// Create, edit, commit, revert, or delete changelists
    #[command(name = "change", visible_alias = "cl")]
    Change {
        #[command(subcommand)]
        action: ChangeAction,
    },

    /// Create or delete labels
    #[command(name = "label")]
    Label {
        #[command(subcommand)]
        action: LabelAction,
    },

    /// Show, get, or set configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    depotctl completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    depotctl completion zsh >> ~/.zshrc

    # Fish
    depotctl completion fish > ~/.config/fish/completions/depotctl.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Changelist subcommands.
#[derive(Subcommand, Debug)]
pub enum ChangeAction {
    /// Create a pending changelist and print its number
    Create,

    /// Open files for edit in a changelist
    Edit {
        /// Changelist number, or `default`
        change: ChangelistId,

        /// Files to open
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Set the description and submit a changelist
    #[command(
        after_help = "\
Files whose content matches the depot are reverted and left out of the submit."
    )]
    Commit {
        /// Changelist number
        change: ChangelistId,

        /// Changelist description
        #[arg(short, long)]
        message: String,
    },

    /// Revert every open file in a changelist and delete it
    Revert {
        /// Changelist number
        change: ChangelistId,
    },

    /// Delete a pending changelist (no-op if submitted or default)
    Delete {
        /// Changelist number
        change: ChangelistId,
    },

    /// Print the default changelist identifier
    Default,
}

/// Label subcommands.
#[derive(Subcommand, Debug)]
pub enum LabelAction {
    /// Create a label pinned to a changelist
    Create {
        /// Label name
        name: String,

        /// Changelist the label pins
        #[arg(long)]
        change: ChangelistId,

        /// Label description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a label
    Delete {
        /// Label name
        name: String,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., connection.host)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
