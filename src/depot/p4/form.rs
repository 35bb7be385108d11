//! depot::p4::form
//!
//! Spec forms, the text format `p4 change -i` and `p4 label -i` read.
//!
//! A form is a sequence of fields. A field starts at an unindented
//! `Name:` line; its value is the rest of that line, or the tab-indented
//! lines that follow. `#` comments and blank lines are ignored.

/// An ordered spec form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, Vec<String>)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse form text as printed by `p4 <spec> -o`.
    pub fn parse(text: &str) -> Self {
        let mut form = Form::new();
        for line in text.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if line.starts_with('\t') || line.starts_with(' ') {
                if let Some((_, values)) = form.fields.last_mut() {
                    values.push(line.trim_start_matches('\t').to_string());
                }
                continue;
            }
            if let Some((name, rest)) = line.split_once(':') {
                let rest = rest.trim();
                let values = if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![rest.to_string()]
                };
                form.fields.push((name.to_string(), values));
            }
        }
        form
    }

    /// Lines of a field, if present.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Set a field to a single-line value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.set_lines(name, vec![value.into()])
    }

    /// Set a field to a block of lines, replacing it in place if present.
    pub fn set_lines(&mut self, name: &str, lines: Vec<String>) -> &mut Self {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => *values = lines,
            None => self.fields.push((name.to_string(), lines)),
        }
        self
    }

    /// Set a free-text field, one form line per text line.
    pub fn set_text(&mut self, name: &str, text: &str) -> &mut Self {
        let lines = text.lines().map(str::to_string).collect();
        self.set_lines(name, lines)
    }

    /// Render the form for `-i` input.
    ///
    /// Single values render inline; `Description` and `View`-like fields
    /// (more than one line, or any field known to be a block) render as
    /// tab-indented blocks.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, values) in &self.fields {
            if values.len() == 1 && !is_block_field(name) {
                out.push_str(&format!("{name}:\t{}\n", values[0]));
            } else {
                out.push_str(&format!("{name}:\n"));
                for value in values {
                    out.push_str(&format!("\t{value}\n"));
                }
            }
            out.push('\n');
        }
        out
    }
}

fn is_block_field(name: &str) -> bool {
    matches!(name, "Description" | "View" | "Files")
}

/// Quote a path for a view line if it contains spaces.
pub fn quote_path(path: &str) -> String {
    if path.contains(' ') {
        format!("\"{path}\"")
    } else {
        path.to_string()
    }
}

/// Split a view line into its (possibly quoted) paths.
pub fn split_view_line(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.trim().chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANGE_FORM: &str = "\
# A Perforce Change Specification.
#
#  Change:      The change number.

Change:\t123

Client:\tci-client

Status:\tpending

Description:
\tArtifactory release plugin

Files:
\t//depot/app/version.txt\t# edit
";

    #[test]
    fn parses_fields() {
        let form = Form::parse(CHANGE_FORM);
        assert_eq!(form.get("Change"), Some(&["123".to_string()][..]));
        assert_eq!(
            form.get("Description"),
            Some(&["Artifactory release plugin".to_string()][..])
        );
        assert_eq!(
            form.get("Files"),
            Some(&["//depot/app/version.txt\t# edit".to_string()][..])
        );
        assert!(form.get("Jobs").is_none());
    }

    #[test]
    fn replacing_description_keeps_files() {
        let mut form = Form::parse(CHANGE_FORM);
        form.set_text("Description", "Release 1.2\n\nBumped version");
        let rendered = form.render();

        assert!(rendered.contains("Description:\n\tRelease 1.2\n\t\n\tBumped version\n"));
        assert!(rendered.contains("Files:\n\t//depot/app/version.txt"));
        assert!(!rendered.contains("Artifactory release plugin"));
    }

    #[test]
    fn renders_inline_and_block_fields() {
        let mut form = Form::new();
        form.set("Label", "rel-1")
            .set("Options", "unlocked")
            .set_text("Description", "one line")
            .set_lines("View", vec!["//depot/a/...".into(), "//depot/b/...".into()]);

        assert_eq!(
            form.render(),
            "Label:\trel-1\n\n\
             Options:\tunlocked\n\n\
             Description:\n\tone line\n\n\
             View:\n\t//depot/a/...\n\t//depot/b/...\n\n"
        );
    }

    #[test]
    fn view_lines_split_with_quotes() {
        assert_eq!(
            split_view_line("//depot/app/... //ws/app/..."),
            vec!["//depot/app/...", "//ws/app/..."]
        );
        assert_eq!(
            split_view_line("\"//depot/my app/...\" \"//ws/my app/...\""),
            vec!["//depot/my app/...", "//ws/my app/..."]
        );
    }

    #[test]
    fn quote_only_when_needed() {
        assert_eq!(quote_path("//depot/a/..."), "//depot/a/...");
        assert_eq!(quote_path("//depot/a b/..."), "\"//depot/a b/...\"");
    }
}
