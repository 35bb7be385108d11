//! depot::p4::tagged
//!
//! Parsers for the two machine-readable output modes of `p4`.
//!
//! - `-ztag` prints records as `... key value` lines separated by blank lines.
//!   Values that span lines continue without the `... ` marker.
//! - `-s` prefixes every line with its severity: `info:`, `info1:`,
//!   `warning:`, `error:`, `text:`, `exit:`.

use std::collections::BTreeMap;

use crate::core::types::{FileOpStatus, FileSpec};

/// One `-ztag` record.
pub type Record = BTreeMap<String, String>;

/// Parse `-ztag` output into records.
pub fn parse_tagged(output: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();
    let mut last_key: Option<String> = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("... ") {
            // nested fields ("... ... key") are not used by any caller
            if rest.starts_with("... ") {
                continue;
            }
            let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
            if current.contains_key(key) {
                records.push(std::mem::take(&mut current));
            }
            current.insert(key.to_string(), value.to_string());
            last_key = Some(key.to_string());
        } else if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            last_key = None;
        } else if let Some(key) = &last_key {
            if let Some(value) = current.get_mut(key) {
                value.push('\n');
                value.push_str(line);
            }
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Severity of a `-s` output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    /// `info:` - a result line
    Info,
    /// `info1:`, `info2:`, ... - nested informational lines
    Detail,
    Warning,
    Error,
    /// `text:` or an unprefixed line
    Text,
    /// `exit: <code>`
    Exit(i32),
}

/// One line of `-s` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub message: String,
}

/// Parse `-s` output into status lines.
pub fn parse_status(output: &str) -> Vec<StatusLine> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let Some((prefix, message)) = line.split_once(": ") else {
                return StatusLine {
                    severity: Severity::Text,
                    message: line.to_string(),
                };
            };
            let severity = match prefix {
                "info" => Severity::Info,
                p if p.starts_with("info") && p[4..].chars().all(|c| c.is_ascii_digit()) => {
                    Severity::Detail
                }
                "warning" => Severity::Warning,
                "error" => Severity::Error,
                "text" => Severity::Text,
                "exit" => Severity::Exit(message.trim().parse().unwrap_or(-1)),
                _ => {
                    return StatusLine {
                        severity: Severity::Text,
                        message: line.to_string(),
                    }
                }
            };
            StatusLine {
                severity,
                message: message.to_string(),
            }
        })
        .collect()
}

/// Error and warning messages, in order.
pub fn failures(lines: &[StatusLine]) -> Vec<&str> {
    lines
        .iter()
        .filter(|l| matches!(l.severity, Severity::Error | Severity::Warning))
        .map(|l| l.message.as_str())
        .collect()
}

/// Map per-file `-s` lines to file specs.
///
/// `info` lines are results for a file; nested info lines are
/// informational; warnings and errors are failures. Text and exit lines
/// carry no file.
pub fn file_results(lines: &[StatusLine]) -> Vec<FileSpec> {
    lines
        .iter()
        .filter_map(|line| {
            let status = match line.severity {
                Severity::Info => FileOpStatus::Valid,
                Severity::Detail => FileOpStatus::Info,
                Severity::Warning | Severity::Error => FileOpStatus::Error,
                Severity::Text | Severity::Exit(_) => return None,
            };
            Some(FileSpec {
                path: path_of(&line.message),
                status,
                message: Some(line.message.clone()),
            })
        })
        .collect()
}

/// Extract the file path from a message like `//depot/a.txt#3 - opened for edit`.
///
/// Prefers the first `//` token; otherwise the text before ` - `.
fn path_of(message: &str) -> String {
    let candidate = message
        .split_whitespace()
        .find(|token| token.starts_with("//"))
        .unwrap_or_else(|| message.split(" - ").next().unwrap_or(message).trim());
    candidate
        .split('#')
        .next()
        .unwrap_or(candidate)
        .to_string()
}
