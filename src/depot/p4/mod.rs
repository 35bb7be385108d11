//! depot::p4
//!
//! `DepotServer` implementation that drives the `p4` command-line client.
//!
//! # Design
//!
//! Each request is one `p4` invocation with the connection settings passed
//! as global options (`-p`, `-u`, `-c`, `-C`), so nothing is read from or
//! written to the user's `P4CONFIG`/`P4ENVIRO` state except the ticket file
//! that `p4 login` maintains. Output is read in one of two modes:
//!
//! - `-ztag` for records (changelists, workspaces, labels, opened files)
//! - `-s` for per-file results (edit, revert, submit)
//!
//! Changelists and labels are created by piping a spec form to `-i`.
//!
//! The `p4` client keeps no connection open between invocations;
//! `connect` verifies the server answers and `disconnect` only clears the
//! local flag.

mod form;
mod tagged;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use super::address::ServerAddress;
use super::traits::{
    ChangelistSummary, DepotError, DepotServer, ServerFactory, SubmitOptions, TrustOptions,
};
use crate::core::types::{
    Changelist, ChangelistId, ChangelistStatus, FileSpec, Label, LabelName, ViewEntry,
    ViewMapping, Workspace,
};

pub use form::Form;
pub use tagged::{parse_status, parse_tagged, Record, Severity, StatusLine};

/// Default name of the `p4` executable.
pub const DEFAULT_PROGRAM: &str = "p4";

/// Opens [`P4CliServer`] instances.
#[derive(Debug, Clone)]
pub struct P4CliFactory {
    program: PathBuf,
}

impl P4CliFactory {
    /// Use the given `p4` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for P4CliFactory {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ServerFactory for P4CliFactory {
    fn open(&self, address: &ServerAddress) -> Result<Box<dyn DepotServer>, DepotError> {
        Ok(Box::new(P4CliServer::new(&self.program, address.clone())))
    }
}

/// A depot session backed by the `p4` executable.
#[derive(Debug)]
pub struct P4CliServer {
    program: PathBuf,
    address: ServerAddress,
    charset: Option<String>,
    user: Option<String>,
    client: Option<String>,
    connected: bool,
}

impl P4CliServer {
    pub fn new(program: &Path, address: ServerAddress) -> Self {
        Self {
            program: program.to_path_buf(),
            address,
            charset: None,
            user: None,
            client: None,
            connected: false,
        }
    }

    /// Global options placed before every command.
    fn global_args(&self) -> Vec<String> {
        let mut args = vec!["-p".to_string(), self.address.p4port()];
        if let Some(user) = &self.user {
            args.push("-u".into());
            args.push(user.clone());
        }
        if let Some(client) = &self.client {
            args.push("-c".into());
            args.push(client.clone());
        }
        if let Some(charset) = &self.charset {
            args.push("-C".into());
            args.push(charset.clone());
        }
        args
    }

    /// Spawn `p4 <mode> <args>`, feed `input` on stdin, and wait for it.
    fn execute(
        &self,
        mode: &[&str],
        args: &[&str],
        input: Option<&str>,
    ) -> Result<Output, DepotError> {
        let mut command = Command::new(&self.program);
        command
            .args(self.global_args())
            .args(mode)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(program = %self.program.display(), ?mode, ?args, "running p4");

        let mut child = command.spawn().map_err(|e| {
            DepotError::Io(format!(
                "failed to run '{}': {}",
                self.program.display(),
                e
            ))
        })?;

        if let Some(text) = input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
        }

        Ok(child.wait_with_output()?)
    }

    /// Run `p4 <mode> <args>` and return stdout.
    ///
    /// A non-zero exit is classified from stderr.
    fn run(&self, mode: &[&str], args: &[&str], input: Option<&str>) -> Result<String, DepotError> {
        let output = self.execute(mode, args, input)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(classify(&failure_text(&output)))
        }
    }

    fn run_tagged(&self, args: &[&str]) -> Result<Vec<Record>, DepotError> {
        let out = self.run(&["-ztag"], args, None)?;
        Ok(parse_tagged(&out))
    }

    /// Run a `-s` command and return its status lines.
    ///
    /// `p4 -s` exits non-zero as soon as one file fails, so the exit code
    /// only decides the outcome when no status lines were printed.
    fn run_status(&self, args: &[&str]) -> Result<Vec<StatusLine>, DepotError> {
        let output = self.execute(&["-s"], args, None)?;
        let lines = parse_status(&String::from_utf8_lossy(&output.stdout));
        let has_results = lines
            .iter()
            .any(|line| !matches!(line.severity, Severity::Exit(_)));
        if output.status.success() || has_results {
            Ok(lines)
        } else {
            Err(classify(&failure_text(&output)))
        }
    }

    fn ensure_connected(&self) -> Result<(), DepotError> {
        if self.connected {
            Ok(())
        } else {
            Err(DepotError::NotConnected)
        }
    }

    fn change_arg(id: ChangelistId) -> String {
        if id.is_default() {
            "default".to_string()
        } else {
            id.value().to_string()
        }
    }
}

/// Stderr of a failed run, or stdout when stderr is empty.
fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    }
}

/// Map `p4` error text to a `DepotError`.
fn classify(message: &str) -> DepotError {
    let lower = message.to_ascii_lowercase();
    // `Change 12 unknown.`; not `Unknown command.`
    let unknown_change = lower.lines().any(|line| {
        let line = line.trim();
        line.starts_with("change ") && line.ends_with(" unknown.")
    });

    if lower.contains("connect to server failed") || lower.contains("tcp connect") {
        DepotError::ConnectionFailed(message.to_string())
    } else if lower.contains("password") || lower.contains("session has expired") {
        DepotError::AuthFailed(message.to_string())
    } else if lower.contains("doesn't exist") || unknown_change {
        DepotError::NotFound(message.to_string())
    } else {
        DepotError::Rejected(message.to_string())
    }
}

/// Fail if any `-s` line is an error or warning.
fn reject_on_failure(lines: &[StatusLine]) -> Result<(), DepotError> {
    let failures = tagged::failures(lines);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(DepotError::Rejected(failures.join("; ")))
    }
}

fn field<'a>(record: &'a Record, key: &str) -> Result<&'a str, DepotError> {
    record
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DepotError::Protocol(format!("missing field '{key}'")))
}

/// Parse a `Date` field (`2024/10/16 12:34:56`).
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y/%m/%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse an epoch-seconds field (`Update`, `Access`).
fn parse_epoch(value: Option<&String>) -> DateTime<Utc> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

/// Extract the number from `Change 123 created.`
fn parse_created_change(output: &str) -> Result<ChangelistId, DepotError> {
    output
        .lines()
        .find_map(|line| {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("Change"), Some(number)) => number.parse::<i64>().ok(),
                _ => None,
            }
        })
        .map(ChangelistId::new)
        .ok_or_else(|| DepotError::Protocol(format!("unexpected change output: {}", output.trim())))
}

fn changelist_from_record(record: &Record) -> Result<Changelist, DepotError> {
    let change = field(record, "Change")?;
    let id = if change == "new" {
        ChangelistId::DEFAULT
    } else {
        change
            .parse::<ChangelistId>()
            .map_err(|e| DepotError::Protocol(e.to_string()))?
    };
    let status = field(record, "Status")?
        .parse::<ChangelistStatus>()
        .map_err(|e| DepotError::Protocol(e.to_string()))?;

    Ok(Changelist {
        id,
        status,
        client: record.get("Client").cloned().unwrap_or_default(),
        user: record.get("User").cloned(),
        date: record.get("Date").and_then(|d| parse_date(d)),
        description: record
            .get("Description")
            .map(|d| d.trim_end().to_string())
            .unwrap_or_default(),
    })
}

fn workspace_from_record(record: &Record) -> Result<Workspace, DepotError> {
    let mut view = ViewMapping::new();
    for index in 0.. {
        let Some(line) = record.get(&format!("View{index}")) else {
            break;
        };
        let parts = form::split_view_line(line);
        match parts.as_slice() {
            [depot, client] => view.push(ViewEntry::new(depot.clone(), client.clone())),
            _ => {
                return Err(DepotError::Protocol(format!(
                    "malformed view line: {line}"
                )))
            }
        }
    }

    Ok(Workspace {
        name: field(record, "Client")?.to_string(),
        owner: record.get("Owner").cloned().unwrap_or_default(),
        root: record.get("Root").filter(|r| !r.is_empty()).cloned(),
        view,
    })
}

fn label_from_record(record: &Record) -> Result<Label, DepotError> {
    let name = LabelName::new(field(record, "label")?)
        .map_err(|e| DepotError::Protocol(e.to_string()))?;
    let options = record.get("Options").map(String::as_str).unwrap_or("");

    Ok(Label {
        name,
        owner: record.get("Owner").cloned().unwrap_or_default(),
        created_at: parse_epoch(record.get("Access")),
        updated_at: parse_epoch(record.get("Update")),
        description: record
            .get("Description")
            .map(|d| d.trim_end().to_string())
            .unwrap_or_default(),
        revision_spec: record.get("Revision").cloned().unwrap_or_default(),
        view: ViewMapping::new(),
        locked: options.split_whitespace().any(|o| o == "locked"),
    })
}

fn changelist_form(summary: &ChangelistSummary) -> String {
    let mut form = Form::new();
    form.set("Change", "new").set("Client", summary.client.as_str());
    if let Some(user) = &summary.user {
        form.set("User", user.as_str());
    }
    form.set("Status", "new")
        .set_text("Description", &summary.description);
    form.render()
}

/// Label views have a single column; the depot side of each entry is used.
fn label_form(label: &Label) -> String {
    let mut form = Form::new();
    form.set("Label", label.name.as_str())
        .set("Owner", label.owner.as_str())
        .set_text("Description", &label.description)
        .set("Options", if label.locked { "locked" } else { "unlocked" })
        .set("Revision", label.revision_spec.as_str());
    if !label.view.is_empty() {
        form.set_lines(
            "View",
            label.view.iter().map(|e| form::quote_path(&e.depot)).collect(),
        );
    }
    form.render()
}

impl DepotServer for P4CliServer {
    fn name(&self) -> &'static str {
        "p4"
    }

    fn address(&self) -> &ServerAddress {
        &self.address
    }

    fn add_trust(&mut self, options: &TrustOptions) -> Result<(), DepotError> {
        if !options.auto_accept {
            // existing trust entries are used as-is
            return Ok(());
        }
        let mut args = vec!["-y"];
        if options.force {
            args.push("-f");
        }
        self.run(&["trust"], &args, None)
            .map(|_| ())
            .map_err(|e| DepotError::AuthFailed(e.to_string()))
    }

    fn set_charset(&mut self, charset: &str) -> Result<(), DepotError> {
        self.charset = Some(charset.to_string());
        Ok(())
    }

    fn connect(&mut self) -> Result<(), DepotError> {
        self.run(&["info"], &["-s"], None).map_err(|e| match e {
            DepotError::Io(_) => e,
            other => DepotError::ConnectionFailed(other.to_string()),
        })?;
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DepotError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_user_name(&mut self, user: Option<&str>) {
        self.user = user.map(str::to_string);
    }

    fn user_name(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn login(&mut self, password: &str) -> Result<(), DepotError> {
        self.ensure_connected()?;
        let input = format!("{password}\n");
        self.run(&["login"], &[], Some(&input))
            .map(|_| ())
            .map_err(|e| match e {
                DepotError::Io(_) => e,
                other => DepotError::AuthFailed(other.to_string()),
            })
    }

    fn get_client(&mut self, name: &str) -> Result<Option<Workspace>, DepotError> {
        self.ensure_connected()?;
        if self.run_tagged(&["clients", "-e", name])?.is_empty() {
            return Ok(None);
        }
        let records = self.run_tagged(&["client", "-o", name])?;
        let record = records
            .first()
            .ok_or_else(|| DepotError::Protocol(format!("empty client spec for '{name}'")))?;
        workspace_from_record(record).map(Some)
    }

    fn set_current_client(&mut self, workspace: &Workspace) -> Result<(), DepotError> {
        self.client = Some(workspace.name.clone());
        Ok(())
    }

    fn create_changelist(
        &mut self,
        summary: &ChangelistSummary,
    ) -> Result<Changelist, DepotError> {
        self.ensure_connected()?;
        let out = self.run(&["change"], &["-i"], Some(&changelist_form(summary)))?;
        let id = parse_created_change(&out)?;
        Ok(Changelist {
            id,
            status: ChangelistStatus::Pending,
            client: summary.client.clone(),
            user: summary.user.clone(),
            date: Some(summary.created_at),
            description: summary.description.clone(),
        })
    }

    fn get_changelist(&mut self, id: ChangelistId) -> Result<Changelist, DepotError> {
        self.ensure_connected()?;
        let records = if id.is_default() {
            self.run_tagged(&["change", "-o"])?
        } else {
            self.run_tagged(&["change", "-o", &id.value().to_string()])?
        };
        let record = records
            .first()
            .ok_or_else(|| DepotError::NotFound(format!("Change {id} unknown.")))?;
        changelist_from_record(record)
    }

    fn update_changelist(&mut self, changelist: &Changelist) -> Result<(), DepotError> {
        self.ensure_connected()?;
        let id = changelist.id.value().to_string();
        let current = self.run(&["change"], &["-o", &id], None)?;
        let mut form = Form::parse(&current);
        form.set_text("Description", &changelist.description);
        self.run(&["change"], &["-i"], Some(&form.render()))?;
        Ok(())
    }

    fn changelist_files(
        &mut self,
        id: ChangelistId,
        _refresh: bool,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.ensure_connected()?;
        let change = Self::change_arg(id);
        let records = match self.run_tagged(&["opened", "-c", &change]) {
            Ok(records) => records,
            Err(DepotError::Rejected(message)) if message.contains("not opened") => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(records
            .iter()
            .filter_map(|r| r.get("depotFile"))
            .map(FileSpec::valid)
            .collect())
    }

    fn edit_files(
        &mut self,
        paths: &[String],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.ensure_connected()?;
        let change = Self::change_arg(change);
        let mut args = vec!["edit", "-c", change.as_str()];
        args.extend(paths.iter().map(String::as_str));
        let lines = self.run_status(&args)?;
        Ok(tagged::file_results(&lines))
    }

    fn submit_changelist(
        &mut self,
        id: ChangelistId,
        options: &SubmitOptions,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.ensure_connected()?;
        let change = Self::change_arg(id);
        let mut args = vec!["submit"];
        if options.revert_unchanged {
            args.extend(["-f", "revertunchanged"]);
        } else if options.force {
            args.extend(["-f", "submitunchanged"]);
        }
        args.extend(["-c", change.as_str()]);

        let lines = self.run_status(&args)?;
        reject_on_failure(&lines)?;
        // unchanged files come back as `//path#rev - unchanged, reverted`
        Ok(tagged::file_results(&lines)
            .into_iter()
            .filter(|f| f.path.starts_with("//") && !f.status_message().contains("reverted"))
            .collect())
    }

    fn revert_files(
        &mut self,
        files: &[FileSpec],
        change: ChangelistId,
    ) -> Result<Vec<FileSpec>, DepotError> {
        self.ensure_connected()?;
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let change = Self::change_arg(change);
        let mut args = vec!["revert", "-c", change.as_str()];
        args.extend(files.iter().map(|f| f.path.as_str()));
        let lines = self.run_status(&args)?;
        Ok(tagged::file_results(&lines))
    }

    fn delete_pending_changelist(&mut self, id: ChangelistId) -> Result<(), DepotError> {
        self.ensure_connected()?;
        self.run(&["change"], &["-d", &id.value().to_string()], None)?;
        Ok(())
    }

    fn get_label(&mut self, name: &str) -> Result<Option<Label>, DepotError> {
        self.ensure_connected()?;
        let records = self.run_tagged(&["labels", "-e", name])?;
        records.first().map(label_from_record).transpose()
    }

    fn create_label(&mut self, label: &Label) -> Result<(), DepotError> {
        self.ensure_connected()?;
        self.run(&["label"], &["-i"], Some(&label_form(label)))?;
        Ok(())
    }

    fn delete_label(&mut self, name: &str, force: bool) -> Result<(), DepotError> {
        self.ensure_connected()?;
        let mut args = vec!["-d"];
        if force {
            args.push("-f");
        }
        args.push(name);
        self.run(&["label"], &args, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depot::address::Protocol;

    fn server() -> P4CliServer {
        P4CliServer::new(
            Path::new("p4"),
            ServerAddress::new(Protocol::Ssl, "depot.example.org:1666"),
        )
    }

    #[test]
    fn global_args_carry_session_settings() {
        let mut server = server();
        assert_eq!(server.global_args(), vec!["-p", "ssl:depot.example.org:1666"]);

        server.set_user_name(Some("svc"));
        server.set_charset("utf8").unwrap();
        server.client = Some("ci-client".into());
        assert_eq!(
            server.global_args(),
            vec![
                "-p",
                "ssl:depot.example.org:1666",
                "-u",
                "svc",
                "-c",
                "ci-client",
                "-C",
                "utf8"
            ]
        );
    }

    #[test]
    fn requests_require_connect() {
        let mut server = server();
        assert_eq!(
            server.get_label("rel").unwrap_err(),
            DepotError::NotConnected
        );
        assert_eq!(
            server.login("secret").unwrap_err(),
            DepotError::NotConnected
        );
    }

    #[test]
    fn missing_program_is_io_error() {
        let mut server = P4CliServer::new(
            Path::new("/nonexistent/depotctl-test/p4"),
            ServerAddress::new(Protocol::Plain, "localhost:1666"),
        );
        assert!(matches!(server.connect(), Err(DepotError::Io(_))));
        assert!(!server.is_connected());
    }

    #[test]
    fn classifies_error_text() {
        assert!(matches!(
            classify("Perforce client error:\n\tConnect to server failed; check $P4PORT."),
            DepotError::ConnectionFailed(_)
        ));
        assert!(matches!(
            classify("Perforce password (P4PASSWD) invalid or unset."),
            DepotError::AuthFailed(_)
        ));
        assert!(matches!(
            classify("Label 'rel' doesn't exist."),
            DepotError::NotFound(_)
        ));
        assert!(matches!(
            classify("Change 5 has 2 open file(s) associated with it and can't be deleted."),
            DepotError::Rejected(_)
        ));
        assert!(matches!(
            classify("Change 99 unknown."),
            DepotError::NotFound(_)
        ));
        assert!(matches!(
            classify("Unknown command.  Try 'p4 help' for info."),
            DepotError::Rejected(_)
        ));
        assert!(matches!(
            classify("Unknown field name 'Bogus'."),
            DepotError::Rejected(_)
        ));
    }

    #[test]
    fn parses_created_change_number() {
        assert_eq!(
            parse_created_change("Change 1234 created.\n").unwrap(),
            ChangelistId::new(1234)
        );
        assert!(matches!(
            parse_created_change("garbage"),
            Err(DepotError::Protocol(_))
        ));
    }

    #[test]
    fn changelist_record() {
        let records = parse_tagged(
            "... Change 77\n... Date 2024/10/16 09:30:00\n... Client ci-client\n\
             ... User svc\n... Status submitted\n... Description Release 1.0\n\n",
        );
        let change = changelist_from_record(&records[0]).unwrap();
        assert_eq!(change.id, ChangelistId::new(77));
        assert_eq!(change.status, ChangelistStatus::Submitted);
        assert_eq!(change.user.as_deref(), Some("svc"));
        assert_eq!(
            change.date.unwrap().to_rfc3339(),
            "2024-10-16T09:30:00+00:00"
        );
        assert_eq!(change.description, "Release 1.0");
    }

    #[test]
    fn default_changelist_record() {
        let records = parse_tagged("... Change new\n... Client ws\n... Status new\n");
        let change = changelist_from_record(&records[0]).unwrap();
        assert_eq!(change.id, ChangelistId::DEFAULT);
        assert_eq!(change.status, ChangelistStatus::New);
    }

    #[test]
    fn workspace_record() {
        let records = parse_tagged(
            "... Client ci-client\n... Owner svc\n... Root /work/ci\n\
             ... View0 //depot/app/... //ci-client/app/...\n\
             ... View1 \"//depot/my docs/...\" \"//ci-client/my docs/...\"\n",
        );
        let ws = workspace_from_record(&records[0]).unwrap();
        assert_eq!(ws.name, "ci-client");
        assert_eq!(ws.owner, "svc");
        assert_eq!(ws.root.as_deref(), Some("/work/ci"));
        assert_eq!(ws.view.len(), 2);
        assert_eq!(ws.view.entries()[1].depot, "//depot/my docs/...");
        assert_eq!(ws.view.entries()[1].client, "//ci-client/my docs/...");
    }

    #[test]
    fn label_record() {
        let records = parse_tagged(
            "... label rel-1\n... Update 1700000000\n... Access 1700000000\n\
             ... Owner svc\n... Options locked noautoreload\n... Revision @12\n\
             ... Description Release\n",
        );
        let label = label_from_record(&records[0]).unwrap();
        assert_eq!(label.name.as_str(), "rel-1");
        assert!(label.locked);
        assert_eq!(label.revision_spec, "@12");
        assert_eq!(label.updated_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn renders_changelist_form() {
        let form = changelist_form(&ChangelistSummary {
            id: ChangelistId::UNKNOWN,
            client: "ci-client".into(),
            user: Some("svc".into()),
            created_at: Utc::now(),
            description: "Artifactory release plugin".into(),
        });
        assert_eq!(
            form,
            "Change:\tnew\n\nClient:\tci-client\n\nUser:\tsvc\n\nStatus:\tnew\n\n\
             Description:\n\tArtifactory release plugin\n\n"
        );
    }

    #[test]
    fn renders_label_form_with_depot_side_view() {
        let now = Utc::now();
        let label = Label {
            name: LabelName::new("rel-1").unwrap(),
            owner: "svc".into(),
            created_at: now,
            updated_at: now,
            description: "Release 1".into(),
            revision_spec: "@42".into(),
            view: vec![ViewEntry::new("//depot/my app/...", "//depot/my app/...")]
                .into_iter()
                .collect(),
            locked: false,
        };
        let form = label_form(&label);
        assert!(form.contains("Label:\trel-1\n"));
        assert!(form.contains("Options:\tunlocked\n"));
        assert!(form.contains("Revision:\t@42\n"));
        assert!(form.contains("View:\n\t\"//depot/my app/...\"\n"));
    }

    /// Runs against a shell script standing in for `p4`.
    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use crate::core::types::FileOpStatus;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// A `p4` stand-in that logs its arguments and answers from `case` arms.
        struct FakeP4 {
            dir: TempDir,
        }

        impl FakeP4 {
            fn new(arms: &str) -> Self {
                let dir = TempDir::new().unwrap();
                let script = format!(
                    "#!/bin/sh\n\
                     echo \"$*\" >> '{log}'\n\
                     case \"$*\" in\n\
                     {arms}\n\
                     *\" info -s\") echo 'Server address: localhost:1666' ;;\n\
                     *) echo \"unexpected: $*\" >&2; exit 1 ;;\n\
                     esac\n",
                    log = dir.path().join("calls.log").display(),
                );
                let path = dir.path().join("p4");
                fs::write(&path, script).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
                Self { dir }
            }

            fn server(&self) -> P4CliServer {
                let mut server = P4CliServer::new(
                    &self.dir.path().join("p4"),
                    ServerAddress::new(Protocol::Plain, "localhost:1666"),
                );
                server.connect().unwrap();
                server.client = Some("ci-client".into());
                server
            }

            fn calls(&self) -> Vec<String> {
                fs::read_to_string(self.dir.path().join("calls.log"))
                    .unwrap_or_default()
                    .lines()
                    .map(str::to_string)
                    .collect()
            }
        }

        #[test]
        fn edit_reports_rejected_file_despite_exit_status() {
            let p4 = FakeP4::new(
                r#"*"-s edit -c 5 "*)
                    echo 'info: //depot/app/a.txt#3 - opened for edit'
                    echo 'error: /work/b.txt - file(s) not on client.'
                    echo 'exit: 1'
                    exit 1 ;;"#,
            );
            let mut server = p4.server();

            let results = server
                .edit_files(
                    &["//depot/app/a.txt".to_string(), "/work/b.txt".to_string()],
                    ChangelistId::new(5),
                )
                .unwrap();

            assert_eq!(results.len(), 2);
            assert_eq!(results[0].path, "//depot/app/a.txt");
            assert_eq!(results[0].status, FileOpStatus::Valid);
            assert_eq!(results[1].status, FileOpStatus::Error);
            assert_eq!(
                results[1].status_message(),
                "/work/b.txt - file(s) not on client."
            );
        }

        #[test]
        fn status_command_without_lines_uses_stderr() {
            let p4 = FakeP4::new(
                r#"*"-s revert -c 8 "*)
                    echo 'Perforce client error: Connect to server failed; check $P4PORT.' >&2
                    exit 1 ;;"#,
            );
            let mut server = p4.server();

            let err = server
                .revert_files(&[FileSpec::valid("//depot/app/a.txt")], ChangelistId::new(8))
                .unwrap_err();
            assert!(matches!(err, DepotError::ConnectionFailed(_)));
        }

        #[test]
        fn revert_of_empty_changelist_skips_revert() {
            let p4 = FakeP4::new(
                r#"*"-ztag opened -c 7")
                    echo 'File(s) not opened on this client.' >&2
                    exit 1 ;;
                *"change -d 7")
                    echo 'Change 7 deleted.' ;;"#,
            );
            let mut server = p4.server();

            let files = server.changelist_files(ChangelistId::new(7), true).unwrap();
            assert!(files.is_empty());
            assert!(server
                .revert_files(&files, ChangelistId::new(7))
                .unwrap()
                .is_empty());
            server
                .delete_pending_changelist(ChangelistId::new(7))
                .unwrap();

            let calls = p4.calls();
            assert!(!calls.iter().any(|c| c.contains("revert")));
            assert!(calls.last().unwrap().ends_with("change -d 7"));
        }

        #[test]
        fn submit_revert_unchanged_returns_submitted_files() {
            let p4 = FakeP4::new(
                r#"*"-s submit -f revertunchanged -c 5")
                    echo 'info: Submitting change 5.'
                    echo 'info: Locking 2 files ...'
                    echo 'info: edit //depot/app/version.txt#4'
                    echo 'info: //depot/app/same.txt#3 - unchanged, reverted'
                    echo 'info: Change 5 submitted.'
                    echo 'exit: 0' ;;"#,
            );
            let mut server = p4.server();

            let submitted = server
                .submit_changelist(ChangelistId::new(5), &SubmitOptions::force_revert_unchanged())
                .unwrap();

            assert_eq!(submitted.len(), 1);
            assert_eq!(submitted[0].path, "//depot/app/version.txt");
            assert!(p4
                .calls()
                .iter()
                .any(|c| c.ends_with("-s submit -f revertunchanged -c 5")));
        }

        #[test]
        fn submit_failure_carries_server_message() {
            let p4 = FakeP4::new(
                r#"*"-s submit -f revertunchanged -c 6")
                    echo 'error: No files to submit.'
                    echo 'exit: 1'
                    exit 1 ;;"#,
            );
            let mut server = p4.server();

            let err = server
                .submit_changelist(ChangelistId::new(6), &SubmitOptions::force_revert_unchanged())
                .unwrap_err();
            assert_eq!(err, DepotError::Rejected("No files to submit.".into()));
        }
    }
}
