//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each depot command handler:
//! 1. Builds a [`Connector`] from flags and config ([`Context::connector`])
//! 2. Runs one workflow inside a scoped session ([`Context::with_session`])
//! 3. Formats and displays output
//!
//! The session is disconnected on every exit path.

mod change;
mod check;
mod completion;
mod config_cmd;
mod label;

pub use change::{
    change_commit, change_create, change_default, change_delete, change_edit, change_revert,
};
pub use check::check;
pub use completion::completion;
pub use config_cmd::{get as config_get, set as config_set, show as config_show};
pub use label::{label_create, label_delete};

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::cli::args::{ChangeAction, Command, ConfigAction, ConnectionArgs, LabelAction};
use crate::client::{ClientBuilder, ClientError, Connector, Session};
use crate::core::config::Config;
use crate::depot::P4CliFactory;
use crate::ui::output::Verbosity;

/// Execution context shared by command handlers.
#[derive(Debug)]
pub struct Context {
    pub verbosity: Verbosity,
    pub config: Config,
    pub connection: ConnectionArgs,
    pub p4_program: Option<PathBuf>,
}

impl Context {
    /// Merge flags over config and validate.
    ///
    /// Fails before any depot I/O if the client or host is missing.
    pub fn connector(&self) -> Result<Connector> {
        let args = &self.connection;
        let mut builder = ClientBuilder::new()
            .changelist_description(self.config.changelist_description());

        if let Some(host) = args.host.as_deref().or(self.config.host()) {
            builder = builder.host_address(host);
        }
        if let Some(client) = args.client.as_deref().or(self.config.client()) {
            builder = builder.client(client);
        }
        if let Some(user) = args.user.as_deref().or(self.config.user()) {
            builder = builder.username(user);
        }
        if let Some(charset) = args.charset.as_deref().or(self.config.charset()) {
            builder = builder.charset(charset);
        }

        // settings are validated before any password is read or prompted for
        builder
            .clone()
            .build()
            .context("Invalid connection settings")?;

        if let Some(password) = self.password()? {
            builder = builder.password(password);
        }
        builder.build().context("Invalid connection settings")
    }

    /// The `p4` executable: `--p4`, then config, then `p4` on `PATH`.
    pub fn factory(&self) -> P4CliFactory {
        let program = self
            .p4_program
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.config.p4_program()));
        P4CliFactory::new(program)
    }

    /// Run `f` on a session that is released afterwards.
    pub fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T, ClientError>,
    {
        let connector = self.connector()?;
        let value = connector.with_session_using(&self.factory(), f)?;
        Ok(value)
    }

    fn password(&self) -> Result<Option<String>> {
        let args = &self.connection;
        if args.password_stdin {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            let password = line.trim_end_matches(['\r', '\n']).to_string();
            if password.is_empty() {
                bail!("Password cannot be empty.");
            }
            return Ok(Some(password));
        }

        if args.prompt_password {
            eprint!("Password: ");
            std::io::stderr().flush()?;
            let password = rpassword::read_password().context("Failed to read password")?;
            if password.is_empty() {
                bail!("Password cannot be empty.");
            }
            return Ok(Some(password));
        }

        Ok(args.password.clone().filter(|p| !p.is_empty()))
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Check => check::check(ctx),

        Command::Change { action } => match action {
            ChangeAction::Create => change::change_create(ctx),
            ChangeAction::Edit { change, paths } => change::change_edit(ctx, change, &paths),
            ChangeAction::Commit { change, message } => {
                change::change_commit(ctx, change, &message)
            }
            ChangeAction::Revert { change } => change::change_revert(ctx, change),
            ChangeAction::Delete { change } => change::change_delete(ctx, change),
            ChangeAction::Default => change::change_default(ctx),
        },

        Command::Label { action } => match action {
            LabelAction::Create {
                name,
                change,
                description,
            } => label::label_create(ctx, &name, &description, change),
            LabelAction::Delete { name } => label::label_delete(ctx, &name),
        },

        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
        },

        Command::Completion { shell } => completion::completion(shell),
    }
}
