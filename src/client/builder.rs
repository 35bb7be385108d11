//! client::builder
//!
//! Collects connection parameters and validates them before any I/O.

use super::error::ClientError;
use super::negotiate::Connector;

/// Description given to changelists created without an explicit one.
pub const DEFAULT_CHANGELIST_DESCRIPTION: &str = "Artifactory release plugin";

/// Validated connection parameters.
///
/// `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host_address: String,
    pub client: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub charset: Option<String>,
    pub changelist_description: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host_address", &self.host_address)
            .field("client", &self.client)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("charset", &self.charset)
            .field("changelist_description", &self.changelist_description)
            .finish()
    }
}

/// Builder for a [`Connector`].
///
/// # Example
///
/// ```
/// use depotctl::client::{ClientBuilder, ErrorKind};
///
/// let err = ClientBuilder::new()
///     .host_address("ssl:depot.example.org:1666")
///     .build()
///     .unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Configuration);
///
/// let connector = ClientBuilder::new()
///     .host_address("ssl:depot.example.org:1666")
///     .client("ci-client")
///     .username("svc")
///     .build()
///     .unwrap();
/// assert_eq!(connector.config().client, "ci-client");
/// ```
#[derive(Clone, Default)]
pub struct ClientBuilder {
    host_address: Option<String>,
    client: Option<String>,
    username: Option<String>,
    password: Option<String>,
    charset: Option<String>,
    changelist_description: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host address, `host[:port]` with an optional `ssl:` prefix. Required.
    pub fn host_address(mut self, host_address: impl Into<String>) -> Self {
        self.host_address = Some(host_address.into());
        self
    }

    /// Client workspace name. Required.
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Password for `login`. Without one the session relies on an
    /// existing ticket or an unauthenticated server.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Description for changelists created by the session.
    pub fn changelist_description(mut self, description: impl Into<String>) -> Self {
        self.changelist_description = Some(description.into());
        self
    }

    /// Validate and produce a [`Connector`].
    ///
    /// # Errors
    ///
    /// Configuration-kind error if the client or the host address is
    /// blank. The client is checked first.
    pub fn build(self) -> Result<Connector, ClientError> {
        let client = required(self.client, "client")?;
        let host_address = required(self.host_address, "host address")?;

        Ok(Connector::new(ConnectionConfig {
            host_address,
            client,
            username: self.username,
            password: self.password,
            charset: self.charset,
            changelist_description: self
                .changelist_description
                .unwrap_or_else(|| DEFAULT_CHANGELIST_DESCRIPTION.to_string()),
        }))
    }
}

fn required(value: Option<String>, what: &str) -> Result<String, ClientError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ClientError::configuration(format!("{what} is required"))),
    }
}
