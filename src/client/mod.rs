//! client
//!
//! Session orchestration over a depot server.
//!
//! # Architecture
//!
//! ```text
//! ClientBuilder --build--> Connector --connect--> Session
//!                                                   |-- changelist workflows
//!                                                   `-- label workflows
//! ```
//!
//! - `builder`: parameter validation, before any I/O
//! - `negotiate`: address parsing, trust, charset, login, workspace binding
//! - `session`: the bound session and its release
//! - `changelist`, `label`: workflows implemented on [`Session`]
//! - `error`: the single [`ClientError`] every depot failure becomes
//!
//! # Example
//!
//! ```no_run
//! use depotctl::client::ClientBuilder;
//!
//! let connector = ClientBuilder::new()
//!     .host_address("ssl:depot.example.org:1666")
//!     .client("ci-client")
//!     .username("svc")
//!     .password("secret")
//!     .build()?;
//!
//! connector.with_session(|session| {
//!     let change = session.create_changelist()?;
//!     session.edit_file(change, "//depot/app/version.txt")?;
//!     session.commit(change, "Release 1.0")?;
//!     session.create_label("rel-1.0", "Release 1.0", change)
//! })?;
//! # Ok::<(), depotctl::client::ClientError>(())
//! ```

mod builder;
mod changelist;
mod error;
mod label;
mod negotiate;
mod session;

pub use builder::{ClientBuilder, ConnectionConfig, DEFAULT_CHANGELIST_DESCRIPTION};
pub use error::{ClientError, DepotResultExt, ErrorKind};
pub use negotiate::{Connector, FALLBACK_CHARSET};
pub use session::Session;
