//! Integration tests for the depotctl binary.
//!
//! These run the compiled CLI with an isolated environment: no `P4*`
//! variables and a config path inside a temp directory.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A depotctl command isolated from the caller's depot settings.
fn depotctl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depotctl").unwrap();
    cmd.env_remove("P4PORT")
        .env_remove("P4CLIENT")
        .env_remove("P4USER")
        .env_remove("P4CHARSET")
        .env_remove("P4PASSWD")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("DEPOTCTL_CONFIG", home.join("config.toml"));
    cmd
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("depotctl"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("change"))
        .stdout(predicate::str::contains("label"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn change_default_needs_no_connection() {
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .args(["change", "default"])
        .assert()
        .success()
        .stdout("default\n");
}

#[test]
fn cl_alias_works() {
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .args(["cl", "default"])
        .assert()
        .success()
        .stdout("default\n");
}

#[test]
fn deleting_default_change_needs_no_connection() {
    // no host or client configured: any session attempt would fail
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .args(["change", "delete", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted").not())
        .stderr(predicate::str::contains("never deleted"));
}

#[test]
fn completion_bash() {
    let home = TempDir::new().unwrap();
    depotctl(home.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("depotctl"));
}

mod connection_settings {
    use super::*;

    #[test]
    fn missing_client_fails_before_connecting() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["--host", "perforce:1666", "--p4", "/nonexistent/p4", "check"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("client is required"))
            .stderr(predicate::str::contains("depot execution failed").not());
    }

    #[test]
    fn blank_client_counts_as_missing() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["--host", "perforce:1666", "--client", "   ", "change", "create"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("client is required"));
    }

    #[test]
    fn missing_host_fails() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["--client", "ci-client", "label", "delete", "rel-1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("host address is required"));
    }

    #[test]
    fn environment_supplies_settings() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .env("P4PORT", "perforce:1666")
            .args(["--p4", "/nonexistent/p4", "check"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("client is required"));
    }

    #[test]
    fn unavailable_program_is_connection_error() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args([
                "--host",
                "perforce:1666",
                "--client",
                "ci-client",
                "--p4",
                "/nonexistent/p4",
                "check",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("depot execution failed"));
    }

    #[test]
    fn password_never_echoed_on_failure() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .env("P4PASSWD", "hunter2-secret")
            .args([
                "--host",
                "perforce:1666",
                "--client",
                "ci-client",
                "--p4",
                "/nonexistent/p4",
                "--debug",
                "check",
            ])
            .assert()
            .failure()
            .stdout(predicate::str::contains("hunter2-secret").not())
            .stderr(predicate::str::contains("hunter2-secret").not());
    }
}

mod config {
    use super::*;

    #[test]
    fn show_without_file_uses_defaults() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no config file"))
            .stdout(predicate::str::contains("connection.host = (not set)"))
            .stdout(predicate::str::contains(
                "changelist.description = Artifactory release plugin",
            ));
    }

    #[test]
    fn show_reads_config_file() {
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[connection]\nhost = \"ssl:depot.example.org:1666\"\nclient = \"ci-client\"\n",
        )
        .unwrap();

        depotctl(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "connection.host = ssl:depot.example.org:1666",
            ))
            .stdout(predicate::str::contains("connection.client = ci-client"));
    }

    #[test]
    fn set_then_get() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["config", "set", "connection.client", "ci-client"])
            .assert()
            .success();

        assert!(home.path().join("config.toml").exists());

        depotctl(home.path())
            .args(["config", "get", "connection.client"])
            .assert()
            .success()
            .stdout("ci-client\n");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["config", "set", "connection.password", "secret"])
            .assert()
            .failure();

        assert!(!home.path().join("config.toml").exists());
    }

    #[test]
    fn set_rejects_invalid_host() {
        let home = TempDir::new().unwrap();
        depotctl(home.path())
            .args(["config", "set", "connection.host", "ssl:"])
            .assert()
            .failure();
    }

    #[test]
    fn invalid_config_file_is_reported() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.toml"), "[connection\n").unwrap();

        depotctl(home.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config"));
    }

    #[test]
    fn config_supplies_connection_settings() {
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[connection]\nhost = \"perforce:1666\"\n",
        )
        .unwrap();

        // host comes from the file, so only the client is reported missing
        depotctl(home.path())
            .args(["check"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("client is required"));
    }
}
