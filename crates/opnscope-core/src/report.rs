//! Report composer: a single intermediate tree of sections and tables,
//! rendered to Markdown, JSON, or YAML.
//!
//! The tree is built once from the [`Document`] (plus an optional audit
//! appendix) and every surface form is generated from it, so the three
//! outputs can never drift structurally. Field order in JSON/YAML is the
//! declared order of the tree structs, not map iteration order.
mod compose;

#[cfg(test)]
mod tests;

pub use compose::{ReportError, ReportOptions, compose_report};

use serde::Serialize;

/// Maximum length, in runes, of a rendered description cell.
pub const MAX_DESCRIPTION_LENGTH: usize = 80;

/// The intermediate report tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTree {
    /// Document title (rendered as the `#` heading).
    pub title: String,
    /// Top-level sections in order.
    pub sections: Vec<ReportSection>,
}

/// One section of the report; may nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ReportSection {
    /// Heading text, without the `#` markers.
    pub heading: String,
    /// Heading level (2 = `##`, 3 = `###`, ...).
    pub level: u8,
    /// Paragraphs, rendered in order before the tables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<String>,
    /// Tables, rendered after the paragraphs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<ReportTable>,
    /// Nested subsections.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportSection>,
}

impl ReportSection {
    /// Creates an empty section with the given heading and level.
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
            ..Self::default()
        }
    }
}

/// A GFM table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows; each row has one cell per header.
    pub rows: Vec<Vec<String>>,
}

/// Escapes table cell content for GFM: every `|` becomes `\|`.
pub fn escape_pipes(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Truncates a string to at most `max` runes, the final three occupied by
/// `...` when truncation occurred. Never splits a multi-byte character.
///
/// For `max < 3` the result is just `...` cut to `max` runes — degenerate,
/// but total.
pub fn truncate_runes(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    for _ in 0..(max - keep) {
        out.push('.');
    }
    out
}

/// Renders the tree as CommonMark with GFM tables.
///
/// `wrap_width` wraps paragraph text at the given column; `None` disables
/// wrapping. Headings and table rows are never wrapped.
pub fn render_markdown(tree: &ReportTree, wrap_width: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str("# ");
    out.push_str(&tree.title);
    out.push('\n');
    for section in &tree.sections {
        render_section(&mut out, section, wrap_width);
    }
    out
}

fn render_section(out: &mut String, section: &ReportSection, wrap_width: Option<usize>) {
    out.push('\n');
    for _ in 0..section.level {
        out.push('#');
    }
    out.push(' ');
    out.push_str(&section.heading);
    out.push('\n');

    for paragraph in &section.paragraphs {
        out.push('\n');
        match wrap_width {
            Some(width) => out.push_str(&wrap_text(paragraph, width)),
            None => out.push_str(paragraph),
        }
        out.push('\n');
    }

    for table in &section.tables {
        out.push('\n');
        render_table(out, table);
    }

    for child in &section.children {
        render_section(out, child, wrap_width);
    }
}

fn render_table(out: &mut String, table: &ReportTable) {
    out.push('|');
    for header in &table.headers {
        out.push(' ');
        out.push_str(&escape_pipes(header));
        out.push_str(" |");
    }
    out.push('\n');
    out.push('|');
    for _ in &table.headers {
        out.push_str(" --- |");
    }
    out.push('\n');
    for row in &table.rows {
        out.push('|');
        for cell in row {
            out.push(' ');
            out.push_str(&escape_pipes(cell));
            out.push_str(" |");
        }
        out.push('\n');
    }
}

/// Greedy word wrap at `width` columns; words longer than the width stand
/// on their own line.
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_owned();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_owned();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Renders the tree as pretty JSON (2-space indent, stable field order).
pub fn render_json(tree: &ReportTree) -> String {
    serde_json::to_string_pretty(tree).unwrap_or_default()
}

/// Renders the tree as block-style YAML without anchors.
pub fn render_yaml(tree: &ReportTree) -> String {
    serde_yaml::to_string(tree).unwrap_or_default()
}
