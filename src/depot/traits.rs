//! depot::traits
//!
//! The `DepotServer` trait: the surface of the external depot SDK.
//!
//! # Design
//!
//! The trait is synchronous; every method is one (or a few) blocking round
//! trips to the depot server. It is object-safe so sessions can hold a
//! `Box<dyn DepotServer>` regardless of transport.
//!
//! Implementations report failures as [`DepotError`]. Callers above this
//! layer never see `DepotError` directly: the client translates it into a
//! single [`crate::client::ClientError`].
//!
//! # Example
//!
//! ```ignore
//! use depotctl::depot::{DepotServer, ServerAddress, TrustOptions};
//!
//! fn open(server: &mut dyn DepotServer) -> Result<(), DepotError> {
//!     server.add_trust(&TrustOptions::auto_accept())?;
//!     server.connect()?;
//!     server.set_user_name(Some("svc"));
//!     server.login("secret")?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::address::ServerAddress;
use crate::core::types::{Changelist, ChangelistId, FileSpec, Label, Workspace};

/// Errors reported by a depot transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepotError {
    /// The host address cannot be used to build a connection target.
    #[error("invalid host address: {0}")]
    InvalidAddress(String),

    /// The server could not be reached or the transport failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The session is not connected.
    #[error("not connected")]
    NotConnected,

    /// Login or trust negotiation failed.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A named object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The server reply could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local I/O failure while talking to the transport.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DepotError {
    fn from(err: std::io::Error) -> Self {
        DepotError::Io(err.to_string())
    }
}

/// How the session should treat the server's identity fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrustOptions {
    /// Accept the fingerprint without asking
    pub auto_accept: bool,
    /// Replace a previously stored fingerprint
    pub force: bool,
}

impl TrustOptions {
    /// Accept and store whatever fingerprint the server presents.
    pub fn auto_accept() -> Self {
        Self {
            auto_accept: true,
            force: true,
        }
    }
}

/// Options for submitting a changelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitOptions {
    /// Force the submit
    pub force: bool,
    /// Revert files whose content did not change instead of submitting them
    pub revert_unchanged: bool,
}

impl SubmitOptions {
    /// `-f revertunchanged`: force, and drop unchanged files from the submit.
    pub fn force_revert_unchanged() -> Self {
        Self {
            force: true,
            revert_unchanged: true,
        }
    }
}

/// Request to create a changelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelistSummary {
    /// Always [`ChangelistId::UNKNOWN`] for new changelists
    pub id: ChangelistId,
    /// Owning workspace
    pub client: String,
    /// Owning user
    pub user: Option<String>,
    pub created_at: DateTime<Utc>,
    pub description: String,
}

/// Character sets the depot understands.
pub const SUPPORTED_CHARSETS: &[&str] = &[
    "none",
    "auto",
    "utf8",
    "utf8-bom",
    "utf8unchecked",
    "utf8unchecked-bom",
    "utf16",
    "utf16-nobom",
    "utf16le",
    "utf16le-bom",
    "utf16be",
    "utf16be-bom",
    "utf32",
    "utf32-nobom",
    "utf32le",
    "utf32le-bom",
    "utf32be",
    "utf32be-bom",
    "iso8859-1",
    "iso8859-5",
    "iso8859-7",
    "iso8859-15",
    "shiftjis",
    "eucjp",
    "winansi",
    "winoem",
    "macosroman",
    "cp850",
    "cp858",
    "cp866",
    "cp936",
    "cp949",
    "cp950",
    "cp1250",
    "cp1251",
    "cp1253",
    "koi8-r",
];

/// Whether `charset` is a character set name the depot recognizes.
pub fn is_supported_charset(charset: &str) -> bool {
    SUPPORTED_CHARSETS.contains(&charset)
}

/// A server-side depot session.
///
/// Implementations must be `Send` so a session can move between threads;
/// a single session is never driven concurrently.
///
/// # Errors
///
/// Every fallible method returns [`DepotError`]. Request-level rejections of
/// individual files are not errors: they come back as [`FileSpec`] entries
/// with a failing status.
pub trait DepotServer: Send {
    /// Transport name (e.g., "p4", "mock").
    fn name(&self) -> &'static str;

    /// The address this server was opened for.
    fn address(&self) -> &ServerAddress;

    /// Establish trust in the server's identity (secure transports only).
    fn add_trust(&mut self, options: &TrustOptions) -> Result<(), DepotError>;

    /// Whether the depot recognizes `charset`.
    fn supports_charset(&self, charset: &str) -> bool {
        is_supported_charset(charset)
    }

    /// Set the character set used for the session.
    fn set_charset(&mut self, charset: &str) -> Result<(), DepotError>;

    /// Open the transport.
    fn connect(&mut self) -> Result<(), DepotError>;

    /// Close the transport.
    fn disconnect(&mut self) -> Result<(), DepotError>;

    fn is_connected(&self) -> bool;

    /// Set the user subsequent requests run as.
    fn set_user_name(&mut self, user: Option<&str>);

    fn user_name(&self) -> Option<&str>;

    /// Authenticate the current user with a password.
    fn login(&mut self, password: &str) -> Result<(), DepotError>;

    /// Fetch a workspace by name. `None` if it does not exist.
    fn get_client(&mut self, name: &str) -> Result<Option<Workspace>, DepotError>;

    /// Bind `workspace` as the current client for file requests.
    fn set_current_client(&mut self, workspace: &Workspace) -> Result<(), DepotError>;

    /// Create a changelist; returns it with the server-assigned id.
    fn create_changelist(&mut self, summary: &ChangelistSummary)
        -> Result<Changelist, DepotError>;

    /// Fetch a changelist by id.
    fn get_changelist(&mut self, id: ChangelistId) -> Result<Changelist, DepotError>;

    /// Store a changed changelist description.
    fn update_changelist(&mut self, changelist: &Changelist) -> Result<(), DepotError>;

    /// Files currently open in a changelist.
    ///
    /// `refresh` forces the server to recompute the list instead of
    /// returning a cached one.
    fn changelist_files(
        &mut self,
        id: ChangelistId,
        refresh: bool,
    ) -> Result<Vec<FileSpec>, DepotError>;

    /// Open files for edit in a changelist.
    fn edit_files(
        &mut self,
        paths: &[String],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError>;

    /// Submit a pending changelist.
    fn submit_changelist(
        &mut self,
        id: ChangelistId,
        options: &SubmitOptions,
    ) -> Result<Vec<FileSpec>, DepotError>;

    /// Revert files open in a changelist.
    fn revert_files(
        &mut self,
        files: &[FileSpec],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError>;

    /// Delete a pending changelist.
    fn delete_pending_changelist(&mut self, id: ChangelistId) -> Result<(), DepotError>;

    /// Fetch a label by name. `None` if it does not exist.
    fn get_label(&mut self, name: &str) -> Result<Option<Label>, DepotError>;

    fn create_label(&mut self, label: &Label) -> Result<(), DepotError>;

    /// Delete a label. `force` also deletes locked labels.
    fn delete_label(&mut self, name: &str, force: bool) -> Result<(), DepotError>;
}

/// Opens [`DepotServer`] instances for parsed addresses.
pub trait ServerFactory {
    /// Open (but do not connect) a server for `address`.
    fn open(&self, address: &ServerAddress) -> Result<Box<dyn DepotServer>, DepotError>;
}
