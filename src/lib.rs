//! depotctl - Changelist and label automation for Perforce depots
//!
//! depotctl negotiates a session against a Perforce-style depot (optionally
//! over SSL), binds a client workspace, and drives changelists and labels
//! through their lifecycles.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to client)
//! - [`client`] - Builder, connection negotiation, session, and workflows
//! - [`depot`] - The `DepotServer` seam, the `p4` adapter, and a mock
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Output formatting
//!
//! # Failure model
//!
//! Every depot failure surfaces as a single [`client::ClientError`] with a
//! kind (configuration, connection, operation). Nothing is retried and
//! nothing is rolled back.

pub mod cli;
pub mod client;
pub mod core;
pub mod depot;
pub mod ui;
