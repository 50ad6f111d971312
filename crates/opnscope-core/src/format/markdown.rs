//! Markdown rendering of a diff result: one change table per section plus
//! a summary table.
use crate::diff::DiffResult;
use crate::report::escape_pipes;

/// Renders the result as CommonMark with GFM tables.
pub fn render(result: &DiffResult) -> String {
    let mut out = String::new();
    out.push_str("# Configuration Diff\n\n");
    out.push_str(&format!(
        "Comparing `{}` (old) against `{}` (new), generated {}.\n",
        result.metadata.old_file, result.metadata.new_file, result.metadata.generated_at
    ));

    out.push_str("\n## Summary\n\n");
    out.push_str("| Impact | Count |\n");
    out.push_str("| --- | --- |\n");
    let impacts = result.counts.by_impact;
    out.push_str(&format!("| high | {} |\n", impacts.high));
    out.push_str(&format!("| medium | {} |\n", impacts.medium));
    out.push_str(&format!("| low | {} |\n", impacts.low));
    out.push_str(&format!("| none | {} |\n", impacts.none));

    for entry in &result.counts.by_section {
        let section_changes: Vec<_> = result
            .changes
            .iter()
            .filter(|change| change.section == entry.section)
            .collect();
        if section_changes.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {}\n\n", entry.section));
        out.push_str("| Kind | Entity | Field | Old | New | Impact | Rationale |\n");
        out.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
        for change in section_changes {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                change.kind,
                escape_pipes(&change.entity_key),
                escape_pipes(change.field_path.as_deref().unwrap_or("")),
                escape_pipes(change.old_value.as_deref().unwrap_or("")),
                escape_pipes(change.new_value.as_deref().unwrap_or("")),
                change.impact,
                escape_pipes(&change.rationale),
            ));
        }
    }

    if !result.notes.is_empty() {
        out.push_str("\n## Notes\n\n");
        for note in &result.notes {
            out.push_str(&format!("- {note}\n"));
        }
    }

    out
}
