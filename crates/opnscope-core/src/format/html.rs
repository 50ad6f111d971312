//! Self-contained HTML rendering: inline CSS, no external resources, one
//! change per table row with the impact as a CSS class.
use crate::diff::DiffResult;

const STYLE: &str = "\
body { font-family: ui-monospace, monospace; margin: 2em; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }\n\
tr.high td { background: #fde8e8; }\n\
tr.medium td { background: #fdf6e3; }\n\
tr.low td { background: #e8f4fd; }\n\
tr.none td { color: #888; }\n\
caption { text-align: left; font-weight: bold; padding: 8px 0; }\n";

/// Escapes text for HTML element content.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the result as a standalone HTML document.
pub fn render(result: &DiffResult) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Configuration Diff: {} vs {}</title>\n",
        escape(&result.metadata.old_file),
        escape(&result.metadata.new_file)
    ));
    out.push_str(&format!("<style>\n{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!(
        "<h1>Configuration Diff</h1>\n<p>Comparing <code>{}</code> against <code>{}</code>, generated {}.</p>\n",
        escape(&result.metadata.old_file),
        escape(&result.metadata.new_file),
        escape(&result.metadata.generated_at)
    ));

    let impacts = result.counts.by_impact;
    out.push_str(&format!(
        "<p>{} high, {} medium, {} low, {} none.</p>\n",
        impacts.high, impacts.medium, impacts.low, impacts.none
    ));

    out.push_str("<table>\n<caption>Changes</caption>\n");
    out.push_str(
        "<tr><th>Section</th><th>Kind</th><th>Entity</th><th>Field</th>\
         <th>Old</th><th>New</th><th>Impact</th><th>Rationale</th></tr>\n",
    );
    for change in &result.changes {
        out.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            change.impact,
            change.section,
            change.kind,
            escape(&change.entity_key),
            escape(change.field_path.as_deref().unwrap_or("")),
            escape(change.old_value.as_deref().unwrap_or("")),
            escape(change.new_value.as_deref().unwrap_or("")),
            change.impact,
            escape(&change.rationale),
        ));
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Change, DiffCounts, DiffMetadata};
    use crate::enums::{ChangeKind, Impact, Section};

    fn sample() -> DiffResult {
        DiffResult {
            metadata: DiffMetadata {
                old_file: "a.xml".to_owned(),
                new_file: "b.xml".to_owned(),
                generated_at: "t".to_owned(),
            },
            changes: vec![Change {
                section: Section::Firewall,
                kind: ChangeKind::Modified,
                entity_key: "r1".to_owned(),
                field_path: Some("firewall.rules[r1].source".to_owned()),
                old_value: Some("<lan>".to_owned()),
                new_value: Some("any".to_owned()),
                impact: Impact::High,
                rationale: "[FW-ANY-ANY] source widened to any".to_owned(),
            }],
            counts: DiffCounts::default(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn document_is_self_contained() {
        let out = render(&sample());
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<style>"), "inline css present");
        assert!(!out.contains("href="), "no external resources");
        assert!(!out.contains("src="), "no external resources");
    }

    #[test]
    fn impact_becomes_the_row_class() {
        let out = render(&sample());
        assert!(out.contains("<tr class=\"high\">"), "out: {out}");
    }

    #[test]
    fn values_are_html_escaped() {
        let out = render(&sample());
        assert!(out.contains("&lt;lan&gt;"), "out: {out}");
        assert!(!out.contains("<td><lan></td>"), "out: {out}");
    }
}
