use crate::models::statement::{LibraryDefinition, LibraryMapInclude};
use camino::Utf8PathBuf;
use std::fmt;

/// A library definition whose target failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryIssue {
    pub definition: LibraryDefinition,
    /// `None` when the path could not be resolved at all.
    pub resolved_path: Option<Utf8PathBuf>,
    pub reason: String,
}

/// An include that contributed nothing because its target was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeIssue {
    pub include: LibraryMapInclude,
    pub resolved_path: Option<Utf8PathBuf>,
    pub reason: String,
}

/// An include that points back at a map already being expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularInclude {
    pub include: LibraryMapInclude,
    pub resolved_path: Utf8PathBuf,
    /// Maps being expanded when the cycle was hit, outermost first.
    pub chain: Vec<Utf8PathBuf>,
}

/// Non-fatal problems collected while resolving a library map.
///
/// Entries keep the order in which resolution met them and are never
/// deduplicated: the same definition text in two different maps can point
/// at two different files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issues {
    pub failed_libraries: Vec<LibraryIssue>,
    pub failed_includes: Vec<IncludeIssue>,
    pub circular_includes: Vec<CircularInclude>,
}

impl Issues {
    pub fn is_empty(&self) -> bool {
        self.failed_libraries.is_empty()
            && self.failed_includes.is_empty()
            && self.circular_includes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failed_libraries.len() + self.failed_includes.len() + self.circular_includes.len()
    }

    /// Append everything from `other`, keeping its order.
    pub fn merge(&mut self, other: Issues) {
        self.failed_libraries.extend(other.failed_libraries);
        self.failed_includes.extend(other.failed_includes);
        self.circular_includes.extend(other.circular_includes);
    }

    /// Reason recorded for the first failure of `definition`, if any.
    pub fn library_reason(&self, definition: &LibraryDefinition) -> Option<&str> {
        self.failed_libraries
            .iter()
            .find(|issue| &issue.definition == definition)
            .map(|issue| issue.reason.as_str())
    }

    pub fn include_reason(&self, include: &LibraryMapInclude) -> Option<&str> {
        self.failed_includes
            .iter()
            .find(|issue| &issue.include == include)
            .map(|issue| issue.reason.as_str())
    }

    pub(crate) fn push_library(
        &mut self,
        definition: &LibraryDefinition,
        resolved_path: Option<Utf8PathBuf>,
        reason: impl Into<String>,
    ) {
        self.failed_libraries.push(LibraryIssue {
            definition: definition.clone(),
            resolved_path,
            reason: reason.into(),
        });
    }

    pub(crate) fn push_include(
        &mut self,
        include: &LibraryMapInclude,
        resolved_path: Option<Utf8PathBuf>,
        reason: impl Into<String>,
    ) {
        self.failed_includes.push(IncludeIssue {
            include: include.clone(),
            resolved_path,
            reason: reason.into(),
        });
    }

    /// Plain-text report. Empty sections are left out; an empty report is an empty string.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.failed_libraries.is_empty() {
            out.push_str("Libraries that could not be loaded:\n");
            for issue in &self.failed_libraries {
                out.push_str(&format!(
                    "  - {} ({}): {}\n",
                    issue.definition.lib_name,
                    display_path(&issue.definition.lib_path, issue.resolved_path.as_ref()),
                    issue.reason
                ));
            }
        }

        if !self.failed_includes.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("Includes that could not be read:\n");
            for issue in &self.failed_includes {
                out.push_str(&format!(
                    "  - {}: {}\n",
                    display_path(&issue.include.include_path, issue.resolved_path.as_ref()),
                    issue.reason
                ));
            }
        }

        if !self.circular_includes.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("Circular includes (skipped):\n");
            for issue in &self.circular_includes {
                let chain: Vec<&str> = issue.chain.iter().map(|p| p.as_str()).collect();
                out.push_str(&format!(
                    "  - {} via {}\n",
                    issue.resolved_path,
                    chain.join(" -> ")
                ));
            }
        }

        out
    }

    /// Rich-text report for message boxes. Paths go into `<pre>` blocks.
    pub fn render_html(&self) -> String {
        let mut out = String::new();

        if !self.failed_libraries.is_empty() {
            out.push_str("<p>Libraries that could not be loaded:</p>\n<ul>\n");
            for issue in &self.failed_libraries {
                out.push_str(&format!(
                    "<li><b>{}</b>: {}<pre>{}</pre></li>\n",
                    escape_html(&issue.definition.lib_name),
                    escape_html(&issue.reason),
                    escape_html(&display_path(
                        &issue.definition.lib_path,
                        issue.resolved_path.as_ref()
                    ))
                ));
            }
            out.push_str("</ul>\n");
        }

        if !self.failed_includes.is_empty() {
            out.push_str("<p>Includes that could not be read:</p>\n<ul>\n");
            for issue in &self.failed_includes {
                out.push_str(&format!(
                    "<li>{}<pre>{}</pre></li>\n",
                    escape_html(&issue.reason),
                    escape_html(&display_path(
                        &issue.include.include_path,
                        issue.resolved_path.as_ref()
                    ))
                ));
            }
            out.push_str("</ul>\n");
        }

        if !self.circular_includes.is_empty() {
            out.push_str("<p>Circular includes (skipped):</p>\n<ul>\n");
            for issue in &self.circular_includes {
                out.push_str(&format!(
                    "<li><pre>{}</pre></li>\n",
                    escape_html(issue.resolved_path.as_str())
                ));
            }
            out.push_str("</ul>\n");
        }

        out
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

fn display_path(written: &camino::Utf8Path, resolved: Option<&Utf8PathBuf>) -> String {
    match resolved {
        Some(resolved) if resolved.as_path() != written => format!("{} -> {}", written, resolved),
        _ => written.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
