//! client::label
//!
//! Label workflows on a [`Session`].
//!
//! A label pins depot state as of one changelist (`@<id>`). Its view is
//! taken from the bound workspace at creation time, with each rule's depot
//! path used for both sides of the entry.
//!
//! The existence check in [`Session::create_label`] and the create request
//! that follows are separate round trips; a concurrent creator can win in
//! between, in which case the server's own error is returned.

use chrono::Utc;
use tracing::info;

use super::error::{ClientError, DepotResultExt, ErrorKind};
use super::session::Session;
use crate::core::types::{ChangelistId, Label, LabelName, ViewEntry, ViewMapping};

impl Session {
    /// Create label `name` at `change`.
    ///
    /// # Errors
    ///
    /// Operation-kind error if the name is invalid or a label with that
    /// name already exists; no create request is sent in either case.
    pub fn create_label(
        &mut self,
        name: &str,
        description: &str,
        change: ChangelistId,
    ) -> Result<(), ClientError> {
        let name = LabelName::new(name).map_err(|e| ClientError::operation(e.to_string()))?;

        let existing = self
            .server
            .get_label(name.as_str())
            .translate(ErrorKind::Operation)?;
        if existing.is_some() {
            return Err(ClientError::operation(format!(
                "label already exists: {name}"
            )));
        }

        let view: ViewMapping = self
            .workspace
            .view
            .iter()
            .map(|rule| ViewEntry::new(rule.depot.clone(), rule.depot.clone()))
            .collect();

        let now = Utc::now();
        let label = Label {
            name,
            owner: self.workspace.owner.clone(),
            created_at: now,
            updated_at: now,
            description: description.to_string(),
            revision_spec: change.revision_spec(),
            view,
            locked: false,
        };

        self.server
            .create_label(&label)
            .translate(ErrorKind::Operation)?;
        info!(label = %label.name, revision = %label.revision_spec, "created label");
        Ok(())
    }

    /// Delete label `name`.
    pub fn delete_label(&mut self, name: &str) -> Result<(), ClientError> {
        self.server
            .delete_label(name, false)
            .translate(ErrorKind::Operation)?;
        info!(label = name, "deleted label");
        Ok(())
    }
}
