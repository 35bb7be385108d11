//! depot::address
//!
//! Host address parsing and transport selection.
//!
//! A host address is `host[:port]` with an optional `ssl:` prefix. The text
//! up to the first colon, compared case-insensitively, decides the
//! transport: `ssl` selects the secure one and the prefix is removed from
//! the connection target.
//!
//! # Example
//!
//! ```
//! use depotctl::depot::{Protocol, ServerAddress};
//!
//! let addr = ServerAddress::parse("ssl:depot.example.org:1666").unwrap();
//! assert_eq!(addr.protocol(), Protocol::Ssl);
//! assert_eq!(addr.host_port(), "depot.example.org:1666");
//! assert_eq!(addr.uri(), "p4ssl://depot.example.org:1666");
//! ```

use super::traits::DepotError;

/// Transport variant for a depot connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain TCP
    Plain,
    /// TLS with fingerprint trust
    Ssl,
}

impl Protocol {
    /// URI scheme for this transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Plain => "p4",
            Protocol::Ssl => "p4ssl",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Protocol::Ssl)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.scheme())
    }
}

/// A parsed depot server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    protocol: Protocol,
    host_port: String,
}

impl ServerAddress {
    /// Build an address from already-separated parts.
    pub fn new(protocol: Protocol, host_port: impl Into<String>) -> Self {
        Self {
            protocol,
            host_port: host_port.into(),
        }
    }

    /// Parse a host address.
    ///
    /// An address without a colon has no transport prefix and is plain.
    ///
    /// # Errors
    ///
    /// Returns `DepotError::InvalidAddress` if the address is blank, contains
    /// whitespace, or is only an `ssl:` prefix.
    pub fn parse(host_address: &str) -> Result<Self, DepotError> {
        let trimmed = host_address.trim();
        if trimmed.is_empty() {
            return Err(DepotError::InvalidAddress(
                "host address cannot be empty".into(),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DepotError::InvalidAddress(format!(
                "'{trimmed}' contains whitespace"
            )));
        }

        let secure = trimmed
            .split_once(':')
            .is_some_and(|(prefix, _)| prefix.eq_ignore_ascii_case("ssl"));

        let (protocol, host_port) = if secure {
            // prefix is ASCII, so byte 4 is a char boundary
            (Protocol::Ssl, &trimmed[4..])
        } else {
            (Protocol::Plain, trimmed)
        };

        if host_port.is_empty() {
            return Err(DepotError::InvalidAddress(format!(
                "'{trimmed}' has no host"
            )));
        }

        Ok(Self {
            protocol,
            host_port: host_port.to_string(),
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn is_secure(&self) -> bool {
        self.protocol.is_secure()
    }

    /// `host[:port]` without any transport prefix.
    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    /// Connection URI, e.g. `p4ssl://host:1666`.
    pub fn uri(&self) -> String {
        format!("{}://{}", self.protocol.scheme(), self.host_port)
    }

    /// The address as the `p4` command line expects it in `P4PORT`.
    pub fn p4port(&self) -> String {
        match self.protocol {
            Protocol::Plain => self.host_port.clone(),
            Protocol::Ssl => format!("ssl:{}", self.host_port),
        }
    }
}

impl std::fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}
