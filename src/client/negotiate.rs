//! client::negotiate
//!
//! Connection negotiation: from validated parameters to a bound session.
//!
//! # Steps
//!
//! 1. Parse the host address and pick the transport (`ssl:` prefix selects
//!    the secure one).
//! 2. Open the server. On the secure transport, trust the server's
//!    fingerprint automatically.
//! 3. Apply the charset, falling back to `none` when the depot does not
//!    know it.
//! 4. Connect, set the user, and log in if a password was given.
//! 5. Fetch the client workspace and bind it as current.
//!
//! Every failure is a connection-kind [`ClientError`]. A failure after the
//! transport connected disconnects it before returning.

use tracing::{debug, info, warn};

use super::builder::ConnectionConfig;
use super::error::{ClientError, DepotResultExt, ErrorKind};
use super::session::Session;
use crate::core::types::Workspace;
use crate::depot::{
    DepotError, DepotServer, P4CliFactory, ServerAddress, ServerFactory, TrustOptions,
};

/// Charset applied when the configured one is unknown to the depot.
pub const FALLBACK_CHARSET: &str = "none";

/// Opens sessions for one set of connection parameters.
///
/// Produced by [`super::ClientBuilder::build`].
#[derive(Debug, Clone)]
pub struct Connector {
    config: ConnectionConfig,
}

impl Connector {
    pub(crate) fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Connect through the `p4` executable on `PATH`.
    pub fn connect(&self) -> Result<Session, ClientError> {
        self.connect_with(&P4CliFactory::default())
    }

    /// Connect through servers opened by `factory`.
    pub fn connect_with(&self, factory: &dyn ServerFactory) -> Result<Session, ClientError> {
        let address =
            ServerAddress::parse(&self.config.host_address).translate(ErrorKind::Connection)?;
        debug!(uri = %address, client = %self.config.client, "opening depot server");

        let mut server = factory.open(&address).translate(ErrorKind::Connection)?;

        if address.is_secure() {
            warn!(
                host = address.host_port(),
                "accepting server fingerprint without verification"
            );
            server
                .add_trust(&TrustOptions::auto_accept())
                .translate(ErrorKind::Connection)?;
        }

        self.apply_charset(server.as_mut())
            .translate(ErrorKind::Connection)?;

        server.connect().translate(ErrorKind::Connection)?;

        match self.authenticate_and_bind(server.as_mut()) {
            Ok(workspace) => {
                info!(
                    uri = %address,
                    client = %workspace.name,
                    user = server.user_name().unwrap_or(""),
                    "connected"
                );
                Ok(Session::new(
                    server,
                    workspace,
                    self.config.changelist_description.clone(),
                ))
            }
            Err(err) => {
                if let Err(e) = server.disconnect() {
                    warn!(error = %e, "disconnect after failed negotiation");
                }
                Err(err)
            }
        }
    }

    /// Run `f` on a session from the default factory, releasing it afterwards.
    pub fn with_session<T, F>(&self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce(&mut Session) -> Result<T, ClientError>,
    {
        self.with_session_using(&P4CliFactory::default(), f)
    }

    /// Run `f` on a session from `factory`, releasing it afterwards.
    ///
    /// The session is disconnected whether or not `f` succeeds. An error
    /// from `f` takes precedence over a disconnect error.
    pub fn with_session_using<T, F>(
        &self,
        factory: &dyn ServerFactory,
        f: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce(&mut Session) -> Result<T, ClientError>,
    {
        let mut session = self.connect_with(factory)?;
        match f(&mut session) {
            Ok(value) => {
                session.disconnect()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = session.disconnect() {
                    warn!(error = %e, "disconnect after failed operation");
                }
                Err(err)
            }
        }
    }

    fn apply_charset(&self, server: &mut dyn DepotServer) -> Result<(), DepotError> {
        let Some(charset) = self
            .config
            .charset
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            return Ok(());
        };

        if server.supports_charset(charset) {
            server.set_charset(charset)
        } else {
            debug!(charset, fallback = FALLBACK_CHARSET, "unsupported charset");
            server.set_charset(FALLBACK_CHARSET)
        }
    }

    fn authenticate_and_bind(
        &self,
        server: &mut dyn DepotServer,
    ) -> Result<Workspace, ClientError> {
        server.set_user_name(self.config.username.as_deref());

        match self.config.password.as_deref() {
            Some(password) if !password.is_empty() => {
                server.login(password).translate(ErrorKind::Connection)?;
                debug!("logged in");
            }
            _ => debug!("no password; skipping login"),
        }

        let workspace = server
            .get_client(&self.config.client)
            .translate(ErrorKind::Connection)?
            .ok_or_else(|| {
                ClientError::from_depot(
                    ErrorKind::Connection,
                    DepotError::NotFound(format!(
                        "client workspace '{}' does not exist",
                        self.config.client
                    )),
                )
            })?;

        server
            .set_current_client(&workspace)
            .translate(ErrorKind::Connection)?;
        Ok(workspace)
    }
}
