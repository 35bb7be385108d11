//! core::types
//!
//! Strong types for depot domain concepts.
//!
//! # Types
//!
//! - [`ChangelistId`] - Changelist number, including the default sentinel
//! - [`ChangelistStatus`] - Lifecycle state of a changelist
//! - [`LabelName`] - Validated label name
//! - [`FileSpec`] / [`FileOpStatus`] - Per-file result of a depot request
//! - [`ViewMapping`] - Ordered depot/client path rules
//! - [`Workspace`], [`Changelist`], [`Label`] - Depot records
//!
//! # Examples
//!
//! ```
//! use depotctl::core::types::{ChangelistId, LabelName};
//!
//! let id: ChangelistId = "1234".parse().unwrap();
//! assert_eq!(id.value(), 1234);
//! assert!(ChangelistId::DEFAULT.is_default());
//!
//! assert!(LabelName::new("release-1.0").is_ok());
//! assert!(LabelName::new("12345").is_err());
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid changelist id: {0}")]
    InvalidChangelistId(String),

    #[error("invalid label name: {0}")]
    InvalidLabelName(String),

    #[error("invalid changelist status: {0}")]
    InvalidStatus(String),
}

/// A changelist number.
///
/// Two values are reserved: [`ChangelistId::DEFAULT`] names the workspace's
/// implicit default changelist, and [`ChangelistId::UNKNOWN`] marks a
/// changelist the server has not numbered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangelistId(i64);

impl ChangelistId {
    /// The workspace's implicit default changelist.
    pub const DEFAULT: ChangelistId = ChangelistId(0);

    /// Placeholder id for a changelist that has not been created yet.
    pub const UNKNOWN: ChangelistId = ChangelistId(-1);

    /// Wrap a raw changelist number.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw changelist number.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this is the default-changelist sentinel.
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Whether the server has assigned a real number.
    pub fn is_assigned(&self) -> bool {
        self.0 > 0
    }

    /// Revision spec pinning depot state to this changelist (`@<id>`).
    pub fn revision_spec(&self) -> String {
        format!("@{}", self.0)
    }
}

impl FromStr for ChangelistId {
    type Err = TypeError;

    /// Parses a changelist number; `default` yields the sentinel.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(Self::DEFAULT);
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidChangelistId(s.to_string()))
    }
}

impl std::fmt::Display for ChangelistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default() {
            write!(f, "default")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Lifecycle state of a changelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangelistStatus {
    /// Not yet known to the server
    New,
    /// Created and open for files
    Pending,
    /// Submitted; immutable
    Submitted,
}

impl ChangelistStatus {
    /// The depot's name for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangelistStatus::New => "new",
            ChangelistStatus::Pending => "pending",
            ChangelistStatus::Submitted => "submitted",
        }
    }
}

impl FromStr for ChangelistStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ChangelistStatus::New),
            "pending" => Ok(ChangelistStatus::Pending),
            "submitted" => Ok(ChangelistStatus::Submitted),
            other => Err(TypeError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for ChangelistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated label name.
///
/// Label names must:
/// - Not be empty or contain whitespace
/// - Not be purely numeric (those read as changelist numbers)
/// - Not contain revision or wildcard characters (`@`, `#`, `%`, `*`, `...`)
/// - Not start with `-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelName(String);

impl LabelName {
    /// Create a new validated label name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidLabelName` if the name is not usable.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidLabelName(
                "label name cannot be empty".into(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidLabelName(format!(
                "'{name}' contains whitespace or control characters"
            )));
        }
        if name.chars().all(|c| c.is_ascii_digit()) {
            return Err(TypeError::InvalidLabelName(format!(
                "'{name}' is purely numeric"
            )));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidLabelName(format!(
                "'{name}' cannot start with '-'"
            )));
        }
        for c in ['@', '#', '%', '*'] {
            if name.contains(c) {
                return Err(TypeError::InvalidLabelName(format!(
                    "'{name}' cannot contain '{c}'"
                )));
            }
        }
        if name.contains("...") {
            return Err(TypeError::InvalidLabelName(format!(
                "'{name}' cannot contain '...'"
            )));
        }
        Ok(())
    }

    /// Get the label name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LabelName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LabelName> for String {
    fn from(name: LabelName) -> Self {
        name.0
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LabelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a depot request for a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOpStatus {
    /// The request succeeded for this file
    Valid,
    /// Informational message; not a failure
    Info,
    /// The server rejected the request for this file
    Error,
    /// The client side could not process this file
    ClientError,
    /// Status could not be determined
    Unknown,
}

impl FileOpStatus {
    /// Whether the status counts as success.
    pub fn is_success(&self) -> bool {
        matches!(self, FileOpStatus::Valid | FileOpStatus::Info)
    }
}

/// A file path and the status of the last request made for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// Depot or local path
    pub path: String,
    /// Outcome of the request
    pub status: FileOpStatus,
    /// Server-provided status text, if any
    pub message: Option<String>,
}

impl FileSpec {
    /// A successfully processed file.
    pub fn valid(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileOpStatus::Valid,
            message: None,
        }
    }

    /// A file the server rejected, with its status message.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileOpStatus::Error,
            message: Some(message.into()),
        }
    }

    /// The status message, or an empty string when the server sent none.
    pub fn status_message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// One path-mapping rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEntry {
    /// Depot-side path
    pub depot: String,
    /// Client-side path
    pub client: String,
}

impl ViewEntry {
    /// Create a mapping entry.
    pub fn new(depot: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            depot: depot.into(),
            client: client.into(),
        }
    }
}

/// Ordered set of depot/client path rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMapping {
    entries: Vec<ViewEntry>,
}

impl ViewMapping {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping order.
    pub fn push(&mut self, entry: ViewEntry) {
        self.entries.push(entry);
    }

    /// Entries in order.
    pub fn entries(&self) -> &[ViewEntry] {
        &self.entries
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ViewEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ViewEntry> for ViewMapping {
    fn from_iter<I: IntoIterator<Item = ViewEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ViewMapping {
    type Item = &'a ViewEntry;
    type IntoIter = std::slice::Iter<'a, ViewEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A client workspace as known to the depot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Workspace (client) name
    pub name: String,
    /// Owning user
    pub owner: String,
    /// Local root directory, if the server reports one
    pub root: Option<String>,
    /// Client view rules
    pub view: ViewMapping,
}

/// A changelist record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelist {
    pub id: ChangelistId,
    pub status: ChangelistStatus,
    /// Workspace the changelist belongs to
    pub client: String,
    /// User that owns the changelist
    pub user: Option<String>,
    /// Last modification time, if reported
    pub date: Option<DateTime<Utc>>,
    pub description: String,
}

/// A label record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: LabelName,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: String,
    /// Depot state the label points at, e.g. `@1234`
    pub revision_spec: String,
    pub view: ViewMapping,
    pub locked: bool,
}
