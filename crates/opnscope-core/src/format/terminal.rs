//! Terminal rendering: unified and side-by-side layouts with ANSI color by
//! impact.
use crate::diff::{Change, DiffResult};
use crate::enums::{ChangeKind, Impact};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

/// Rendering options derived from CLI flags and environment.
#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    /// Emit ANSI color codes.
    pub color: bool,
    /// Total terminal width, used by the side-by-side layout.
    pub width: usize,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            color: false,
            width: 100,
        }
    }
}

fn impact_color(impact: Impact) -> &'static str {
    match impact {
        Impact::High => ANSI_RED,
        Impact::Medium => ANSI_YELLOW,
        Impact::Low => ANSI_CYAN,
        Impact::None => ANSI_DIM,
    }
}

fn symbol(kind: ChangeKind) -> char {
    match kind {
        ChangeKind::Added => '+',
        ChangeKind::Removed => '-',
        ChangeKind::Modified | ChangeKind::Reordered => '~',
    }
}

fn change_line(change: &Change) -> String {
    let mut line = format!(
        "{} [{}] {}",
        symbol(change.kind),
        change.section,
        change.entity_key
    );
    match change.kind {
        ChangeKind::Modified => {
            line.push_str(&format!(
                " {}: {} -> {}",
                change.field_path.as_deref().unwrap_or("?"),
                change.old_value.as_deref().unwrap_or(""),
                change.new_value.as_deref().unwrap_or(""),
            ));
        }
        ChangeKind::Added => {
            if let Some(summary) = &change.new_value {
                line.push_str(&format!(": {summary}"));
            }
        }
        ChangeKind::Removed => {
            if let Some(summary) = &change.old_value {
                line.push_str(&format!(": {summary}"));
            }
        }
        ChangeKind::Reordered => {
            line.push_str(" (moved)");
        }
    }
    line.push_str(&format!("  ({}) {}", change.impact, change.rationale));
    line
}

/// Renders the unified layout: one line per change, `+`/`-`/`~` prefixed,
/// colored by impact, followed by notes and a summary line.
pub fn render_unified(result: &DiffResult, options: &TerminalOptions) -> String {
    let mut out = String::new();
    for change in &result.changes {
        let line = change_line(change);
        if options.color {
            out.push_str(&format!(
                "{}{}{}\n",
                impact_color(change.impact),
                line,
                ANSI_RESET
            ));
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }
    for note in &result.notes {
        out.push_str(&format!("note: {note}\n"));
    }
    out.push_str(&summary_line(result));
    out
}

/// Renders the side-by-side layout: old values left, new values right.
///
/// Only valid for terminal output; the command layer rejects the
/// combination of this layout with any non-terminal format.
pub fn render_side_by_side(result: &DiffResult, options: &TerminalOptions) -> String {
    let column = options.width.saturating_sub(3).max(20) / 2;
    let mut out = String::new();
    out.push_str(&format!(
        "{:<column$} | {:<column$}\n",
        result.metadata.old_file, result.metadata.new_file
    ));
    out.push_str(&format!("{:-<column$}-+-{:-<column$}\n", "", ""));
    for change in &result.changes {
        let label = format!(
            "{} [{}] {}{}",
            symbol(change.kind),
            change.section,
            change.entity_key,
            change
                .field_path
                .as_deref()
                .map(|path| format!(" {path}"))
                .unwrap_or_default()
        );
        let left = clip(change.old_value.as_deref().unwrap_or(""), column);
        let right = clip(change.new_value.as_deref().unwrap_or(""), column);
        let line = format!("{left:<column$} | {right:<column$}");
        if options.color {
            out.push_str(&format!(
                "{}{label}{}\n",
                impact_color(change.impact),
                ANSI_RESET
            ));
        } else {
            out.push_str(&label);
            out.push('\n');
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&summary_line(result));
    out
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_owned()
    } else {
        let keep = width.saturating_sub(1);
        let mut out: String = value.chars().take(keep).collect();
        out.push('…');
        out
    }
}

fn summary_line(result: &DiffResult) -> String {
    let impacts = result.counts.by_impact;
    let kinds = result.counts.by_kind;
    let total = kinds.added + kinds.removed + kinds.modified + kinds.reordered;
    format!(
        "{total} change(s): {} high, {} medium, {} low ({} added, {} removed, {} modified, {} reordered)\n",
        impacts.high,
        impacts.medium,
        impacts.low,
        kinds.added,
        kinds.removed,
        kinds.modified,
        kinds.reordered,
    )
}
