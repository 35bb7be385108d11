//! depot
//!
//! Abstraction over the depot server SDK.
//!
//! # Architecture
//!
//! The `DepotServer` trait is the only surface the client layer talks to.
//! Servers are opened through a [`ServerFactory`] so tests can substitute
//! [`mock::MockDepot`] for the real transport.
//!
//! # Modules
//!
//! - `address`: host address parsing and transport selection
//! - `traits`: the `DepotServer` trait and its request types
//! - [`p4`]: implementation that drives the `p4` command-line client
//! - [`mock`]: in-memory implementation for deterministic testing

mod address;
pub mod mock;
pub mod p4;
mod traits;

pub use address::{Protocol, ServerAddress};
pub use p4::{P4CliFactory, P4CliServer};
pub use traits::*;
