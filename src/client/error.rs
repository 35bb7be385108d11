//! client::error
//!
//! The single failure type of the client layer.
//!
//! # Design
//!
//! Every depot call made by the client is funneled through
//! [`DepotResultExt::translate`], which turns a [`DepotError`] into a
//! [`ClientError`] of the caller-chosen [`ErrorKind`]. Callers branch on
//! the kind (if at all), never on transport-specific error variants. The
//! original `DepotError` stays reachable through `source()`.
//!
//! # Example
//!
//! ```
//! use depotctl::client::{ClientError, ErrorKind};
//! use depotctl::depot::DepotError;
//!
//! let err = ClientError::from_depot(
//!     ErrorKind::Connection,
//!     DepotError::ConnectionFailed("refused".into()),
//! );
//! assert_eq!(err.kind(), ErrorKind::Connection);
//! assert_eq!(
//!     err.to_string(),
//!     "depot execution failed: 'connection failed: refused'"
//! );
//!
//! let io: std::io::Error = err.into();
//! assert_eq!(io.kind(), std::io::ErrorKind::Other);
//! ```

use thiserror::Error;

use crate::depot::DepotError;

/// Category of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required parameters missing; raised before any network I/O.
    Configuration,
    /// Address, transport, trust, login, or workspace binding failed.
    Connection,
    /// The depot rejected a request on an established session.
    Operation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connection => "connection",
            ErrorKind::Operation => "operation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure of a client operation: kind, message, and optional cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<DepotError>,
}

impl ClientError {
    /// A failure with no underlying depot error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Operation, message)
    }

    /// Translate a depot failure.
    pub fn from_depot(kind: ErrorKind, cause: DepotError) -> Self {
        Self {
            kind,
            message: format!("depot execution failed: '{}'", cause),
            source: Some(cause),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The depot error this failure was translated from, if any.
    pub fn depot_error(&self) -> Option<&DepotError> {
        self.source.as_ref()
    }
}

impl From<ClientError> for std::io::Error {
    fn from(err: ClientError) -> Self {
        std::io::Error::other(err)
    }
}

/// Translation of depot results into client results.
pub trait DepotResultExt<T> {
    /// Map any `DepotError` to a `ClientError` of `kind`.
    fn translate(self, kind: ErrorKind) -> Result<T, ClientError>;
}

impl<T> DepotResultExt<T> for Result<T, DepotError> {
    fn translate(self, kind: ErrorKind) -> Result<T, ClientError> {
        self.map_err(|e| ClientError::from_depot(kind, e))
    }
}
