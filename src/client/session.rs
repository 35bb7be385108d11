//! client::session
//!
//! The connected (server, workspace) pair every workflow runs against.
//!
//! # Lifetime
//!
//! A `Session` owns its server exclusively and is driven through `&mut self`,
//! so one session is never used by two callers at once. Release it with
//! [`Session::disconnect`] to observe disconnect errors; a session dropped
//! while still connected disconnects itself and logs any failure.
//!
//! Changelist and label workflows are implemented on `Session` in
//! [`super::changelist`] and [`super::label`].

use tracing::{debug, warn};

use super::error::{ClientError, DepotResultExt, ErrorKind};
use crate::core::types::Workspace;
use crate::depot::{DepotServer, ServerAddress};

/// A negotiated depot session bound to one client workspace.
pub struct Session {
    pub(super) server: Box<dyn DepotServer>,
    pub(super) workspace: Workspace,
    pub(super) description: String,
    connected: bool,
}

impl Session {
    pub(super) fn new(
        server: Box<dyn DepotServer>,
        workspace: Workspace,
        description: String,
    ) -> Self {
        Self {
            server,
            workspace,
            description,
            connected: true,
        }
    }

    /// The bound client workspace.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// User the session runs as, if one was set.
    pub fn username(&self) -> Option<&str> {
        self.server.user_name()
    }

    pub fn is_connected(&self) -> bool {
        self.connected && self.server.is_connected()
    }

    pub fn address(&self) -> &ServerAddress {
        self.server.address()
    }

    /// Description given to changelists this session creates.
    pub fn changelist_description(&self) -> &str {
        &self.description
    }

    /// Disconnect and release the session.
    ///
    /// # Errors
    ///
    /// Connection-kind error if the transport fails to close. The session
    /// is consumed either way.
    pub fn disconnect(mut self) -> Result<(), ClientError> {
        self.connected = false;
        debug!(client = %self.workspace.name, "disconnecting");
        self.server.disconnect().translate(ErrorKind::Connection)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        if let Err(e) = self.server.disconnect() {
            warn!(client = %self.workspace.name, error = %e, "disconnect on drop failed");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("server", &self.server.name())
            .field("address", self.server.address())
            .field("workspace", &self.workspace.name)
            .field("connected", &self.connected)
            .finish()
    }
}
