//! client::changelist
//!
//! Changelist workflows on a [`Session`].
//!
//! # Lifecycle
//!
//! ```text
//! new --create--> pending --commit--> submitted
//!                    |
//!                    +--revert (revert files, then delete)--> deleted
//! ```
//!
//! None of the workflows retry or roll back. A multi-step workflow that
//! fails part way leaves whatever the depot already accepted; the caller
//! compensates (e.g., with [`Session::revert`]).

use chrono::Utc;
use tracing::{debug, info};

use super::error::{ClientError, DepotResultExt, ErrorKind};
use super::session::Session;
use crate::core::types::{ChangelistId, ChangelistStatus, FileSpec};
use crate::depot::{ChangelistSummary, SubmitOptions};

impl Session {
    /// Create a pending changelist owned by the bound workspace.
    ///
    /// Returns the server-assigned id.
    pub fn create_changelist(&mut self) -> Result<ChangelistId, ClientError> {
        let summary = ChangelistSummary {
            id: ChangelistId::UNKNOWN,
            client: self.workspace.name.clone(),
            user: self.server.user_name().map(str::to_string),
            created_at: Utc::now(),
            description: self.description.clone(),
        };

        let created = self
            .server
            .create_changelist(&summary)
            .translate(ErrorKind::Operation)?;
        let refreshed = self
            .server
            .get_changelist(created.id)
            .translate(ErrorKind::Operation)?;

        info!(change = %refreshed.id, client = %self.workspace.name, "created changelist");
        Ok(refreshed.id)
    }

    /// Open one file for edit in `change`.
    pub fn edit_file(&mut self, change: ChangelistId, path: &str) -> Result<(), ClientError> {
        self.edit_files(change, &[path])
    }

    /// Open files for edit in `change`.
    ///
    /// # Errors
    ///
    /// Operation-kind error carrying the server's message for the first
    /// file whose status is neither valid nor info. Files opened earlier in
    /// the same request stay open.
    pub fn edit_files<S: AsRef<str>>(
        &mut self,
        change: ChangelistId,
        paths: &[S],
    ) -> Result<(), ClientError> {
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        let results = self
            .server
            .edit_files(&paths, change)
            .translate(ErrorKind::Operation)?;

        if let Some(failed) = results.iter().find(|f| !f.status.is_success()) {
            return Err(ClientError::operation(failed.status_message()));
        }

        debug!(change = %change, count = paths.len(), "opened for edit");
        Ok(())
    }

    /// Set the description and submit `change`.
    ///
    /// Files whose content matches the depot are reverted by the server and
    /// left out of the submit. Returns the submitted files.
    pub fn commit(
        &mut self,
        change: ChangelistId,
        message: &str,
    ) -> Result<Vec<FileSpec>, ClientError> {
        let mut changelist = self
            .server
            .get_changelist(change)
            .translate(ErrorKind::Operation)?;
        changelist.description = message.to_string();
        self.server
            .update_changelist(&changelist)
            .translate(ErrorKind::Operation)?;

        self.server
            .changelist_files(change, true)
            .translate(ErrorKind::Operation)?;

        let submitted = self
            .server
            .submit_changelist(change, &SubmitOptions::force_revert_unchanged())
            .translate(ErrorKind::Operation)?;

        info!(change = %change, files = submitted.len(), "submitted changelist");
        Ok(submitted)
    }

    /// Revert every file open in `change`, then delete it.
    pub fn revert(&mut self, change: ChangelistId) -> Result<(), ClientError> {
        let files = self
            .server
            .changelist_files(change, true)
            .translate(ErrorKind::Operation)?;
        self.server
            .revert_files(&files, change)
            .translate(ErrorKind::Operation)?;
        debug!(change = %change, count = files.len(), "reverted files");

        self.delete_changelist(change)
    }

    /// The workspace's implicit default changelist.
    pub fn default_changelist_id(&self) -> ChangelistId {
        ChangelistId::DEFAULT
    }

    /// Delete a pending changelist.
    ///
    /// Does nothing for the default changelist or one already submitted.
    pub fn delete_changelist(&mut self, change: ChangelistId) -> Result<(), ClientError> {
        if change.is_default() {
            debug!("default changelist is never deleted");
            return Ok(());
        }

        let changelist = self
            .server
            .get_changelist(change)
            .translate(ErrorKind::Operation)?;
        if changelist.status == ChangelistStatus::Submitted {
            debug!(change = %change, "changelist already submitted");
            return Ok(());
        }

        self.server
            .delete_pending_changelist(change)
            .translate(ErrorKind::Operation)?;
        info!(change = %change, "deleted changelist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{ClientBuilder, ErrorKind, Session};
    use crate::core::types::{ChangelistId, ChangelistStatus};
    use crate::depot::mock::{FailOn, MockDepot, MockOperation};
    use crate::depot::{DepotError, SubmitOptions};

    fn depot() -> MockDepot {
        MockDepot::new().with_workspace("ci-client", &["//depot/app/..."])
    }

    fn session(depot: &MockDepot) -> Session {
        let session = ClientBuilder::new()
            .host_address("perforce:1666")
            .client("ci-client")
            .username("svc")
            .build()
            .unwrap()
            .connect_with(depot)
            .unwrap();
        depot.clear_operations();
        session
    }

    #[test]
    fn create_changelist_returns_server_id() {
        let depot = depot().with_changelist(41, ChangelistStatus::Submitted, &[]);
        let mut session = session(&depot);

        let id = session.create_changelist().unwrap();

        assert_eq!(id, ChangelistId::new(42));
        assert_eq!(
            depot.operations(),
            vec![
                MockOperation::CreateChangelist {
                    client: "ci-client".into(),
                    user: Some("svc".into()),
                    description: "Artifactory release plugin".into(),
                },
                MockOperation::GetChangelist { id },
            ]
        );
        assert_eq!(
            depot.changelist(42).unwrap().status,
            ChangelistStatus::Pending
        );
    }

    #[test]
    fn create_changelist_uses_configured_description() {
        let depot = depot();
        let mut session = ClientBuilder::new()
            .host_address("perforce:1666")
            .client("ci-client")
            .changelist_description("Nightly build")
            .build()
            .unwrap()
            .connect_with(&depot)
            .unwrap();

        let id = session.create_changelist().unwrap();
        assert_eq!(
            depot.changelist(id.value()).unwrap().description,
            "Nightly build"
        );
    }

    #[test]
    fn create_changelist_failure_translated() {
        let depot = depot().fail_on(FailOn::CreateChangelist(DepotError::Rejected(
            "no permission".into(),
        )));
        let mut session = session(&depot);

        let err = session.create_changelist().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        assert_eq!(
            err.message(),
            "depot execution failed: 'request rejected: no permission'"
        );
    }

    #[test]
    fn edit_file_opens_in_change() {
        let depot = depot().with_changelist(5, ChangelistStatus::Pending, &[]);
        let mut session = session(&depot);

        session
            .edit_file(ChangelistId::new(5), "//depot/app/version.txt")
            .unwrap();

        assert_eq!(depot.open_files(5), vec!["//depot/app/version.txt"]);
    }

    #[test]
    fn edit_info_status_is_success() {
        let depot = depot()
            .with_changelist(5, ChangelistStatus::Pending, &[])
            .info_edit("//depot/app/a.txt", "//depot/app/a.txt - also opened by bob");
        let mut session = session(&depot);

        assert!(session
            .edit_file(ChangelistId::new(5), "//depot/app/a.txt")
            .is_ok());
    }

    #[test]
    fn edit_error_carries_server_message() {
        let depot = depot()
            .with_changelist(5, ChangelistStatus::Pending, &[])
            .reject_edit("/work/b.txt", "/work/b.txt - file(s) not on client.");
        let mut session = session(&depot);

        let err = session
            .edit_files(ChangelistId::new(5), &["//depot/app/a.txt", "/work/b.txt"])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Operation);
        assert_eq!(err.message(), "/work/b.txt - file(s) not on client.");
        // no rollback of files opened before the failure
        assert_eq!(depot.open_files(5), vec!["//depot/app/a.txt"]);
    }

    #[test]
    fn commit_sets_description_and_submits() {
        let depot = depot()
            .with_changelist(7, ChangelistStatus::Pending, &["//depot/app/a.txt"]);
        let mut session = session(&depot);

        let submitted = session
            .commit(ChangelistId::new(7), "Release 1.0")
            .unwrap();

        let id = ChangelistId::new(7);
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            depot.operations(),
            vec![
                MockOperation::GetChangelist { id },
                MockOperation::UpdateChangelist {
                    id,
                    description: "Release 1.0".into()
                },
                MockOperation::ChangelistFiles { id, refresh: true },
                MockOperation::Submit {
                    id,
                    options: SubmitOptions::force_revert_unchanged()
                },
            ]
        );
        let change = depot.changelist(7).unwrap();
        assert_eq!(change.status, ChangelistStatus::Submitted);
        assert_eq!(change.description, "Release 1.0");
    }

    #[test]
    fn commit_drops_unchanged_files() {
        let depot = depot()
            .with_changelist(
                7,
                ChangelistStatus::Pending,
                &["//depot/app/a.txt", "//depot/app/b.txt"],
            )
            .mark_unchanged("//depot/app/b.txt");
        let mut session = session(&depot);

        let submitted = session.commit(ChangelistId::new(7), "Release").unwrap();

        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].path, "//depot/app/a.txt");
    }

    #[test]
    fn commit_rejection_translated() {
        let depot = depot().with_changelist(7, ChangelistStatus::Pending, &[]);
        let mut session = session(&depot);

        let err = session.commit(ChangelistId::new(7), "Empty").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        assert!(err.message().contains("No files to submit."));
    }

    #[test]
    fn revert_reverts_then_deletes() {
        let depot = depot().with_changelist(
            9,
            ChangelistStatus::Pending,
            &["//depot/app/a.txt", "//depot/app/b.txt"],
        );
        let mut session = session(&depot);

        session.revert(ChangelistId::new(9)).unwrap();

        let id = ChangelistId::new(9);
        assert_eq!(
            depot.operations(),
            vec![
                MockOperation::ChangelistFiles { id, refresh: true },
                MockOperation::RevertFiles {
                    paths: vec!["//depot/app/a.txt".into(), "//depot/app/b.txt".into()],
                    change: id,
                },
                MockOperation::GetChangelist { id },
                MockOperation::DeleteChangelist { id },
            ]
        );
        assert!(depot.changelist(9).is_none());
    }

    #[test]
    fn revert_empty_changelist_still_deletes() {
        let depot = depot().with_changelist(9, ChangelistStatus::Pending, &[]);
        let mut session = session(&depot);

        session.revert(ChangelistId::new(9)).unwrap();
        assert!(depot.changelist(9).is_none());
    }

    #[test]
    fn default_changelist_id_is_local() {
        let depot = depot();
        let session = session(&depot);

        assert_eq!(session.default_changelist_id(), ChangelistId::DEFAULT);
        assert!(depot.operations().is_empty());
    }

    #[test]
    fn delete_default_is_noop() {
        let depot = depot();
        let mut session = session(&depot);

        session.delete_changelist(ChangelistId::DEFAULT).unwrap();
        assert!(depot.operations().is_empty());
    }

    #[test]
    fn delete_submitted_is_noop() {
        let depot = depot().with_changelist(3, ChangelistStatus::Submitted, &["//depot/a"]);
        let mut session = session(&depot);

        session.delete_changelist(ChangelistId::new(3)).unwrap();

        assert!(!depot
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::DeleteChangelist { .. })));
        assert!(depot.changelist(3).is_some());
    }

    #[test]
    fn delete_pending() {
        let depot = depot().with_changelist(4, ChangelistStatus::Pending, &[]);
        let mut session = session(&depot);

        session.delete_changelist(ChangelistId::new(4)).unwrap();
        assert!(depot.changelist(4).is_none());
    }

    #[test]
    fn delete_unknown_translated() {
        let depot = depot();
        let mut session = session(&depot);

        let err = session.delete_changelist(ChangelistId::new(99)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        assert!(err.message().contains("Change 99 unknown."));
    }
}
