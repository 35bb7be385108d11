//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout and respect the quiet flag; errors and warnings go
//! to stderr. Diagnostic logging is handled by `tracing`, not here.

use std::fmt::Display;

use crate::core::types::{FileSpec, Workspace};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default `tracing` filter directive for this verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "depotctl=debug,warn",
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a value that scripts consume (always shown).
pub fn value(message: impl Display) {
    println!("{}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a file result as `path` or `path (message)`.
pub fn format_file(file: &FileSpec) -> String {
    match &file.message {
        Some(message) if message != &file.path => format!("{} ({})", file.path, message),
        _ => file.path.clone(),
    }
}

/// Format a workspace and its view.
pub fn format_workspace(workspace: &Workspace) -> String {
    let mut lines = vec![
        format!("Client: {}", workspace.name),
        format!("Owner:  {}", workspace.owner),
    ];
    if let Some(root) = &workspace.root {
        lines.push(format!("Root:   {}", root));
    }
    if !workspace.view.is_empty() {
        lines.push("View:".to_string());
        lines.push(format_list(
            &workspace
                .view
                .iter()
                .map(|e| format!("{} {}", e.depot, e.client))
                .collect::<Vec<_>>(),
            "  ",
        ));
    }
    lines.join("\n")
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ViewEntry, ViewMapping};

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn log_filters() {
        assert_eq!(Verbosity::Quiet.log_filter(), "error");
        assert!(Verbosity::Debug.log_filter().contains("depotctl=debug"));
    }

    #[test]
    fn file_formatting() {
        assert_eq!(format_file(&FileSpec::valid("//depot/a")), "//depot/a");
        assert_eq!(
            format_file(&FileSpec::error("//depot/b", "locked by bob")),
            "//depot/b (locked by bob)"
        );
    }

    #[test]
    fn workspace_formatting() {
        let ws = Workspace {
            name: "ci-client".into(),
            owner: "svc".into(),
            root: None,
            view: [ViewEntry::new("//depot/app/...", "//ci-client/app/...")]
                .into_iter()
                .collect::<ViewMapping>(),
        };
        let text = format_workspace(&ws);
        assert!(text.starts_with("Client: ci-client\nOwner:  svc\nView:\n"));
        assert!(text.ends_with("  //depot/app/... //ci-client/app/..."));
    }
}
