//! depot::mock
//!
//! Mock depot implementation for deterministic testing.
//!
//! # Design
//!
//! The mock depot keeps workspaces, changelists, and labels in memory and
//! records every request so tests can assert on call order. State is shared
//! across clones, so a test can hand a clone to the connection negotiator
//! (via [`ServerFactory`]) and inspect the original afterwards.
//!
//! # Example
//!
//! ```
//! use depotctl::depot::mock::{MockDepot, MockOperation};
//! use depotctl::depot::DepotServer;
//!
//! let mut depot = MockDepot::new().with_workspace("ci-client", &["//depot/app/..."]);
//! depot.connect().unwrap();
//!
//! let ws = depot.get_client("ci-client").unwrap().unwrap();
//! assert_eq!(ws.name, "ci-client");
//! assert!(matches!(depot.operations()[0], MockOperation::Connect));
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::address::{Protocol, ServerAddress};
use super::traits::{
    ChangelistSummary, DepotError, DepotServer, ServerFactory, SubmitOptions, TrustOptions,
};
use crate::core::types::{
    Changelist, ChangelistId, ChangelistStatus, FileOpStatus, FileSpec, Label, ViewEntry,
    ViewMapping, Workspace,
};

/// Mock depot for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockDepot {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockDepotInner>>,
    /// Address this handle was opened for.
    address: ServerAddress,
    /// User set on this handle.
    user: Option<String>,
}

/// A changelist plus the files open in it.
#[derive(Debug, Clone)]
struct MockChange {
    changelist: Changelist,
    files: Vec<String>,
}

#[derive(Debug)]
struct MockDepotInner {
    connected: bool,
    /// Password `login` accepts; `None` accepts any.
    password: Option<String>,
    workspaces: HashMap<String, Workspace>,
    current_client: Option<String>,
    changes: BTreeMap<i64, MockChange>,
    next_change: i64,
    labels: HashMap<String, Label>,
    /// Paths whose edit request the server rejects, with the message.
    rejected_edits: HashMap<String, String>,
    /// Paths whose edit request yields an informational status.
    info_edits: HashMap<String, String>,
    /// Paths whose content matches the depot.
    unchanged: HashSet<String>,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    AddTrust(DepotError),
    Connect(DepotError),
    Login(DepotError),
    GetClient(DepotError),
    CreateChangelist(DepotError),
    GetChangelist(DepotError),
    EditFiles(DepotError),
    Submit(DepotError),
    RevertFiles(DepotError),
    DeleteChangelist(DepotError),
    GetLabel(DepotError),
    CreateLabel(DepotError),
    DeleteLabel(DepotError),
    Disconnect(DepotError),
}

/// Recorded operation for test verification.
///
/// Passwords are never recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Open { uri: String },
    AddTrust { auto_accept: bool, force: bool },
    SetCharset { charset: String },
    Connect,
    Disconnect,
    SetUserName { user: Option<String> },
    Login,
    GetClient { name: String },
    SetCurrentClient { name: String },
    CreateChangelist { client: String, user: Option<String>, description: String },
    GetChangelist { id: ChangelistId },
    UpdateChangelist { id: ChangelistId, description: String },
    ChangelistFiles { id: ChangelistId, refresh: bool },
    EditFiles { paths: Vec<String>, change: ChangelistId },
    Submit { id: ChangelistId, options: SubmitOptions },
    RevertFiles { paths: Vec<String>, change: ChangelistId },
    DeleteChangelist { id: ChangelistId },
    GetLabel { name: String },
    CreateLabel { label: Box<Label> },
    DeleteLabel { name: String, force: bool },
}

impl MockDepot {
    /// Create a new empty mock depot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockDepotInner {
                connected: false,
                password: None,
                workspaces: HashMap::new(),
                current_client: None,
                changes: BTreeMap::new(),
                next_change: 1,
                labels: HashMap::new(),
                rejected_edits: HashMap::new(),
                info_edits: HashMap::new(),
                unchanged: HashSet::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
            address: ServerAddress::new(Protocol::Plain, "localhost:1666"),
            user: None,
        }
    }

    /// Add a workspace whose view maps each depot path to a client path.
    ///
    /// Client paths are derived as `//<name>/<rest>`.
    pub fn with_workspace(self, name: &str, depot_paths: &[&str]) -> Self {
        let view: ViewMapping = depot_paths
            .iter()
            .map(|depot| {
                let rest = depot.trim_start_matches("//");
                let rest = rest.split_once('/').map(|(_, r)| r).unwrap_or(rest);
                ViewEntry::new(*depot, format!("//{name}/{rest}"))
            })
            .collect();
        self.with_workspace_record(Workspace {
            name: name.to_string(),
            owner: format!("{name}-owner"),
            root: Some(format!("/work/{name}")),
            view,
        })
    }

    /// Add a fully specified workspace.
    pub fn with_workspace_record(self, workspace: Workspace) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.workspaces.insert(workspace.name.clone(), workspace);
        }
        self
    }

    /// Require `password` for login.
    pub fn with_password(self, password: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.password = Some(password.to_string());
        }
        self
    }

    /// Add an existing label.
    pub fn with_label(self, label: Label) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.labels.insert(label.name.to_string(), label);
        }
        self
    }

    /// Add an existing changelist with the given status and open files.
    pub fn with_changelist(self, id: i64, status: ChangelistStatus, files: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.changes.insert(
                id,
                MockChange {
                    changelist: Changelist {
                        id: ChangelistId::new(id),
                        status,
                        client: String::new(),
                        user: None,
                        date: Some(Utc::now()),
                        description: String::new(),
                    },
                    files: files.iter().map(|f| f.to_string()).collect(),
                },
            );
            inner.next_change = inner.next_change.max(id + 1);
        }
        self
    }

    /// Make edit requests for `path` come back as errors with `message`.
    pub fn reject_edit(self, path: &str, message: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .rejected_edits
                .insert(path.to_string(), message.to_string());
        }
        self
    }

    /// Make edit requests for `path` come back as informational.
    pub fn info_edit(self, path: &str, message: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.info_edits.insert(path.to_string(), message.to_string());
        }
        self
    }

    /// Mark `path` as identical to its depot revision.
    pub fn mark_unchanged(self, path: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.unchanged.insert(path.to_string());
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Whether any handle on this depot is connected.
    pub fn connected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.connected
    }

    /// The workspace bound as current, if any.
    pub fn current_client(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.current_client.clone()
    }

    /// Get a changelist by id (for test verification).
    pub fn changelist(&self, id: i64) -> Option<Changelist> {
        let inner = self.inner.lock().unwrap();
        inner.changes.get(&id).map(|c| c.changelist.clone())
    }

    /// Files open in a changelist (for test verification).
    pub fn open_files(&self, id: i64) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .changes
            .get(&id)
            .map(|c| c.files.clone())
            .unwrap_or_default()
    }

    /// Get a label by name (for test verification).
    pub fn label(&self, name: &str) -> Option<Label> {
        let inner = self.inner.lock().unwrap();
        inner.labels.get(name).cloned()
    }

    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), DepotError> {
        let inner = self.inner.lock().unwrap();
        let err = match &inner.fail_on {
            Some(FailOn::AddTrust(e)) if expected == "add_trust" => e,
            Some(FailOn::Connect(e)) if expected == "connect" => e,
            Some(FailOn::Login(e)) if expected == "login" => e,
            Some(FailOn::GetClient(e)) if expected == "get_client" => e,
            Some(FailOn::CreateChangelist(e)) if expected == "create_changelist" => e,
            Some(FailOn::GetChangelist(e)) if expected == "get_changelist" => e,
            Some(FailOn::EditFiles(e)) if expected == "edit_files" => e,
            Some(FailOn::Submit(e)) if expected == "submit" => e,
            Some(FailOn::RevertFiles(e)) if expected == "revert_files" => e,
            Some(FailOn::DeleteChangelist(e)) if expected == "delete_changelist" => e,
            Some(FailOn::GetLabel(e)) if expected == "get_label" => e,
            Some(FailOn::CreateLabel(e)) if expected == "create_label" => e,
            Some(FailOn::DeleteLabel(e)) if expected == "delete_label" => e,
            Some(FailOn::Disconnect(e)) if expected == "disconnect" => e,
            _ => return Ok(()),
        };
        Err(err.clone())
    }

    fn require_connected(&self) -> Result<(), DepotError> {
        if self.connected() {
            Ok(())
        } else {
            Err(DepotError::NotConnected)
        }
    }

    /// The implicit default changelist of the current client.
    fn default_changelist(inner: &MockDepotInner) -> Changelist {
        Changelist {
            id: ChangelistId::DEFAULT,
            status: ChangelistStatus::New,
            client: inner.current_client.clone().unwrap_or_default(),
            user: None,
            date: None,
            description: String::new(),
        }
    }
}

impl Default for MockDepot {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerFactory for MockDepot {
    fn open(&self, address: &ServerAddress) -> Result<Box<dyn DepotServer>, DepotError> {
        self.record(MockOperation::Open { uri: address.uri() });
        Ok(Box::new(MockDepot {
            inner: Arc::clone(&self.inner),
            address: address.clone(),
            user: None,
        }))
    }
}

impl DepotServer for MockDepot {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn address(&self) -> &ServerAddress {
        &self.address
    }

    fn add_trust(&mut self, options: &TrustOptions) -> Result<(), DepotError> {
        self.record(MockOperation::AddTrust {
            auto_accept: options.auto_accept,
            force: options.force,
        });
        self.check_fail("add_trust")
    }

    fn set_charset(&mut self, charset: &str) -> Result<(), DepotError> {
        self.record(MockOperation::SetCharset {
            charset: charset.to_string(),
        });
        Ok(())
    }

    fn connect(&mut self) -> Result<(), DepotError> {
        self.record(MockOperation::Connect);
        self.check_fail("connect")?;
        let mut inner = self.inner.lock().unwrap();
        inner.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DepotError> {
        self.record(MockOperation::Disconnect);
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        drop(inner);
        self.check_fail("disconnect")
    }

    fn is_connected(&self) -> bool {
        self.connected()
    }

    fn set_user_name(&mut self, user: Option<&str>) {
        self.record(MockOperation::SetUserName {
            user: user.map(str::to_string),
        });
        self.user = user.map(str::to_string);
    }

    fn user_name(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn login(&mut self, password: &str) -> Result<(), DepotError> {
        self.record(MockOperation::Login);
        self.check_fail("login")?;
        self.require_connected()?;
        let inner = self.inner.lock().unwrap();
        match &inner.password {
            Some(expected) if expected != password => Err(DepotError::AuthFailed(
                "Perforce password (P4PASSWD) invalid or unset.".into(),
            )),
            _ => Ok(()),
        }
    }

    fn get_client(&mut self, name: &str) -> Result<Option<Workspace>, DepotError> {
        self.record(MockOperation::GetClient {
            name: name.to_string(),
        });
        self.check_fail("get_client")?;
        self.require_connected()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.workspaces.get(name).cloned())
    }

    fn set_current_client(&mut self, workspace: &Workspace) -> Result<(), DepotError> {
        self.record(MockOperation::SetCurrentClient {
            name: workspace.name.clone(),
        });
        let mut inner = self.inner.lock().unwrap();
        inner.current_client = Some(workspace.name.clone());
        Ok(())
    }

    fn create_changelist(
        &mut self,
        summary: &ChangelistSummary,
    ) -> Result<Changelist, DepotError> {
        self.record(MockOperation::CreateChangelist {
            client: summary.client.clone(),
            user: summary.user.clone(),
            description: summary.description.clone(),
        });
        self.check_fail("create_changelist")?;
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_change;
        inner.next_change += 1;
        let changelist = Changelist {
            id: ChangelistId::new(id),
            status: ChangelistStatus::Pending,
            client: summary.client.clone(),
            user: summary.user.clone(),
            date: Some(summary.created_at),
            description: summary.description.clone(),
        };
        inner.changes.insert(
            id,
            MockChange {
                changelist: changelist.clone(),
                files: Vec::new(),
            },
        );
        Ok(changelist)
    }

    fn get_changelist(&mut self, id: ChangelistId) -> Result<Changelist, DepotError> {
        self.record(MockOperation::GetChangelist { id });
        self.check_fail("get_changelist")?;
        self.require_connected()?;

        let inner = self.inner.lock().unwrap();
        if id.is_default() {
            return Ok(Self::default_changelist(&inner));
        }
        inner
            .changes
            .get(&id.value())
            .map(|c| c.changelist.clone())
            .ok_or_else(|| DepotError::NotFound(format!("Change {id} unknown.")))
    }

    fn update_changelist(&mut self, changelist: &Changelist) -> Result<(), DepotError> {
        self.record(MockOperation::UpdateChangelist {
            id: changelist.id,
            description: changelist.description.clone(),
        });
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        let change = inner
            .changes
            .get_mut(&changelist.id.value())
            .ok_or_else(|| DepotError::NotFound(format!("Change {} unknown.", changelist.id)))?;
        change.changelist.description = changelist.description.clone();
        Ok(())
    }

    fn changelist_files(
        &mut self,
        id: ChangelistId,
        refresh: bool,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.record(MockOperation::ChangelistFiles { id, refresh });
        self.require_connected()?;

        let inner = self.inner.lock().unwrap();
        let change = inner
            .changes
            .get(&id.value())
            .ok_or_else(|| DepotError::NotFound(format!("Change {id} unknown.")))?;
        Ok(change.files.iter().map(FileSpec::valid).collect())
    }

    fn edit_files(
        &mut self,
        paths: &[String],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.record(MockOperation::EditFiles {
            paths: paths.to_vec(),
            change,
        });
        self.check_fail("edit_files")?;
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        if !change.is_default() && !inner.changes.contains_key(&change.value()) {
            return Err(DepotError::NotFound(format!("Change {change} unknown.")));
        }

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(message) = inner.rejected_edits.get(path) {
                results.push(FileSpec::error(path.clone(), message.clone()));
                continue;
            }
            let status = match inner.info_edits.get(path) {
                Some(message) => FileSpec {
                    path: path.clone(),
                    status: FileOpStatus::Info,
                    message: Some(message.clone()),
                },
                None => FileSpec::valid(path.clone()),
            };
            if let Some(entry) = inner.changes.get_mut(&change.value()) {
                if !entry.files.contains(path) {
                    entry.files.push(path.clone());
                }
            }
            results.push(status);
        }
        Ok(results)
    }

    fn submit_changelist(
        &mut self,
        id: ChangelistId,
        options: &SubmitOptions,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.record(MockOperation::Submit { id, options: *options });
        self.check_fail("submit")?;
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        let unchanged = inner.unchanged.clone();
        let change = inner
            .changes
            .get_mut(&id.value())
            .ok_or_else(|| DepotError::NotFound(format!("Change {id} unknown.")))?;
        if change.changelist.status != ChangelistStatus::Pending {
            return Err(DepotError::Rejected(format!(
                "Change {id} is already committed."
            )));
        }
        if options.revert_unchanged {
            change.files.retain(|f| !unchanged.contains(f));
        }
        if change.files.is_empty() {
            return Err(DepotError::Rejected("No files to submit.".into()));
        }
        change.changelist.status = ChangelistStatus::Submitted;
        Ok(change.files.iter().map(FileSpec::valid).collect())
    }

    fn revert_files(
        &mut self,
        files: &[FileSpec],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.record(MockOperation::RevertFiles {
            paths: files.iter().map(|f| f.path.clone()).collect(),
            change,
        });
        self.check_fail("revert_files")?;
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.changes.get_mut(&change.value()) {
            entry
                .files
                .retain(|open| !files.iter().any(|f| &f.path == open));
        }
        Ok(files.iter().map(|f| FileSpec::valid(f.path.clone())).collect())
    }

    fn delete_pending_changelist(&mut self, id: ChangelistId) -> Result<(), DepotError> {
        self.record(MockOperation::DeleteChangelist { id });
        self.check_fail("delete_changelist")?;
        self.require_connected()?;

        let mut inner = self.inner.lock().unwrap();
        let change = inner
            .changes
            .get(&id.value())
            .ok_or_else(|| DepotError::NotFound(format!("Change {id} unknown.")))?;
        if change.changelist.status == ChangelistStatus::Submitted {
            return Err(DepotError::Rejected(format!(
                "Change {id} has been submitted and cannot be deleted."
            )));
        }
        if !change.files.is_empty() {
            return Err(DepotError::Rejected(format!(
                "Change {id} has {} open file(s) associated with it and can't be deleted.",
                change.files.len()
            )));
        }
        inner.changes.remove(&id.value());
        Ok(())
    }

    fn get_label(&mut self, name: &str) -> Result<Option<Label>, DepotError> {
        self.record(MockOperation::GetLabel {
            name: name.to_string(),
        });
        self.check_fail("get_label")?;
        self.require_connected()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.labels.get(name).cloned())
    }

    fn create_label(&mut self, label: &Label) -> Result<(), DepotError> {
        self.record(MockOperation::CreateLabel {
            label: Box::new(label.clone()),
        });
        self.check_fail("create_label")?;
        self.require_connected()?;
        let mut inner = self.inner.lock().unwrap();
        inner.labels.insert(label.name.to_string(), label.clone());
        Ok(())
    }

    fn delete_label(&mut self, name: &str, force: bool) -> Result<(), DepotError> {
        self.record(MockOperation::DeleteLabel {
            name: name.to_string(),
            force,
        });
        self.check_fail("delete_label")?;
        self.require_connected()?;
        let mut inner = self.inner.lock().unwrap();
        let locked = match inner.labels.get(name) {
            Some(label) => label.locked,
            None => return Err(DepotError::NotFound(format!("Label '{name}' doesn't exist."))),
        };
        if locked && !force {
            return Err(DepotError::Rejected(format!(
                "Locked label '{name}' can only be deleted by its owner."
            )));
        }
        inner.labels.remove(name);
        Ok(())
    }
}
