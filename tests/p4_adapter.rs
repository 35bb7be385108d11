//! Session workflows through the `p4` adapter.
//!
//! A shell script stands in for the `p4` executable; it answers the
//! commands the adapter issues and logs each invocation.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

use depotctl::client::{ClientBuilder, Connector, ErrorKind};
use depotctl::core::types::ChangelistId;
use depotctl::depot::P4CliFactory;

/// Replies shared by every script: server info and the bound workspace.
const WORKSPACE_ARMS: &str = r#"
*" info -s") echo 'Server address: localhost:1666' ;;
*"-ztag clients -e ci-client") echo '... client ci-client' ;;
*"-ztag client -o ci-client")
    echo '... Client ci-client'
    echo '... Owner svc'
    echo '... Root /work'
    echo '... View0 //depot/app/... //ci-client/app/...' ;;
"#;

struct FakeP4 {
    dir: TempDir,
}

impl FakeP4 {
    fn new(arms: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("calls.log");
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in\n{}{}\n*) echo \"unexpected: $*\" >&2; exit 1 ;;\nesac\n",
            log.display(),
            arms,
            WORKSPACE_ARMS,
        );
        let program = dir.path().join("p4");
        fs::write(&program, script).unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    fn factory(&self) -> P4CliFactory {
        P4CliFactory::new(self.program())
    }

    fn program(&self) -> PathBuf {
        self.dir.path().join("p4")
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn connector() -> Connector {
    ClientBuilder::new()
        .host_address("localhost:1666")
        .client("ci-client")
        .build()
        .unwrap()
}

#[test]
fn session_binds_workspace_from_client_spec() {
    let p4 = FakeP4::new("");

    let root = connector()
        .with_session_using(&p4.factory(), |session| {
            Ok(session.workspace().root.clone())
        })
        .unwrap();

    assert_eq!(root.as_deref(), Some("/work"));
    assert!(p4
        .calls()
        .iter()
        .all(|call| call.starts_with("-p localhost:1666")));
}

#[test]
fn edit_surfaces_message_of_rejected_file() {
    let p4 = FakeP4::new(
        r#"*"-s edit -c 5 //depot/app/a.txt /work/b.txt")
    echo 'info: //depot/app/a.txt#3 - opened for edit'
    echo 'error: /work/b.txt - file(s) not on client.'
    echo 'exit: 1'
    exit 1 ;;"#,
    );

    let err = connector()
        .with_session_using(&p4.factory(), |session| {
            session.edit_files(ChangelistId::new(5), &["//depot/app/a.txt", "/work/b.txt"])
        })
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.message(), "/work/b.txt - file(s) not on client.");
    assert!(p4
        .calls()
        .iter()
        .any(|call| call.ends_with("-c ci-client -s edit -c 5 //depot/app/a.txt /work/b.txt")));
}

#[test]
fn edit_of_known_files_succeeds() {
    let p4 = FakeP4::new(
        r#"*"-s edit -c 5 //depot/app/a.txt")
    echo 'info: //depot/app/a.txt#3 - opened for edit'
    echo 'exit: 0' ;;"#,
    );

    connector()
        .with_session_using(&p4.factory(), |session| {
            session.edit_files(ChangelistId::new(5), &["//depot/app/a.txt"])
        })
        .unwrap();
}
