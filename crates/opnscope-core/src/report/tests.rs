#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use super::*;
use crate::audit::{AuditMetadata, AuditReport, Finding, PluginReport, PluginSummary};
use crate::enums::{AuditMode, FindingSeverity};
use crate::model::{Document, SystemSection, Tunable};

fn sample_document() -> Document {
    Document {
        system: SystemSection {
            hostname: "fw01".to_owned(),
            domain: "example.com".to_owned(),
            timezone: "Etc/UTC".to_owned(),
            ..SystemSection::default()
        },
        tunables: vec![Tunable {
            name: "net.inet.ip.random_id".to_owned(),
            value: "1".to_owned(),
            descr: String::new(),
        }],
        ..Document::default()
    }
}

fn stig_finding(severity: FindingSeverity, title: &str, description: &str) -> Finding {
    Finding {
        plugin: "stig".to_owned(),
        severity,
        title: title.to_owned(),
        description: description.to_owned(),
        component: None,
        recommendation: None,
    }
}

fn audit_with(findings: Vec<Finding>, own: Vec<Finding>) -> AuditReport {
    let summary = PluginSummary::from_findings(&findings);
    let mut compliance = BTreeMap::new();
    compliance.insert("stig".to_owned(), PluginReport { findings, summary });
    AuditReport {
        mode: AuditMode::Blue,
        blackhat_mode: false,
        comprehensive: false,
        findings: own,
        compliance,
        metadata: AuditMetadata {
            hostname: "fw01".to_owned(),
            generated_at: "2026-08-01T00:00:00Z".to_owned(),
            plugins_run: vec!["stig".to_owned()],
        },
        warnings: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// escaping and truncation
// ---------------------------------------------------------------------------

#[test]
fn pipes_in_cells_are_escaped() {
    assert_eq!(escape_pipes("a|b|c"), "a\\|b\\|c");
    assert_eq!(escape_pipes("no pipes"), "no pipes");
}

#[test]
fn rendered_table_never_contains_an_unescaped_pipe_inside_a_cell() {
    let tree = ReportTree {
        title: "t".to_owned(),
        sections: vec![ReportSection {
            heading: "S".to_owned(),
            level: 2,
            tables: vec![ReportTable {
                headers: vec!["H".to_owned()],
                rows: vec![vec!["value | with pipes || inside".to_owned()]],
            }],
            ..ReportSection::default()
        }],
    };
    let markdown = render_markdown(&tree, None);
    let row = markdown
        .lines()
        .find(|line| line.contains("value"))
        .expect("row rendered");
    // Strip the escaped pipes; what remains must only be the delimiters.
    let without_escaped = row.replace("\\|", "");
    assert_eq!(
        without_escaped.matches('|').count(),
        2,
        "row: {row}"
    );
}

#[test]
fn truncation_caps_at_the_rune_budget_with_ellipsis() {
    let long = "x".repeat(500);
    let truncated = truncate_runes(&long, MAX_DESCRIPTION_LENGTH);
    assert_eq!(truncated.chars().count(), MAX_DESCRIPTION_LENGTH);
    assert!(truncated.ends_with("..."));
}

#[test]
fn short_strings_pass_untruncated() {
    assert_eq!(truncate_runes("short", 80), "short");
    let exactly = "y".repeat(80);
    assert_eq!(truncate_runes(&exactly, 80), exactly);
}

#[test]
fn truncation_is_rune_aware_and_never_splits_emoji() {
    let input = "Hello 🌍🌎🌏 World";
    let truncated = truncate_runes(input, 10);
    assert_eq!(truncated.chars().count(), 10);
    assert!(truncated.ends_with("..."));
    assert!(truncated.starts_with("Hello 🌍"), "truncated: {truncated}");
    assert!(String::from_utf8(truncated.into_bytes()).is_ok());
}

// ---------------------------------------------------------------------------
// base report
// ---------------------------------------------------------------------------

#[test]
fn base_report_titles_with_the_hostname() {
    let tree =
        compose_report(&sample_document(), &ReportOptions::default(), None).expect("compose");
    assert_eq!(tree.title, "OPNsense Configuration Report: fw01.example.com");
    let markdown = render_markdown(&tree, None);
    assert!(markdown.starts_with("# OPNsense Configuration Report"));
}

#[test]
fn empty_sections_are_skipped_unless_comprehensive() {
    let document = sample_document();
    let default_tree =
        compose_report(&document, &ReportOptions::default(), None).expect("compose");
    assert!(
        !default_tree.sections.iter().any(|s| s.heading == "Firewall Rules"),
        "empty firewall section should be skipped"
    );

    let comprehensive = compose_report(
        &document,
        &ReportOptions {
            comprehensive: true,
            ..ReportOptions::default()
        },
        None,
    )
    .expect("compose");
    assert!(
        comprehensive.sections.iter().any(|s| s.heading == "Firewall Rules"),
        "comprehensive report includes empty sections"
    );
}

#[test]
fn tunables_render_only_when_requested() {
    let document = sample_document();
    let without = compose_report(&document, &ReportOptions::default(), None).expect("compose");
    assert!(!without.sections.iter().any(|s| s.heading == "Tunables"));

    let with = compose_report(
        &document,
        &ReportOptions {
            include_tunables: true,
            ..ReportOptions::default()
        },
        None,
    )
    .expect("compose");
    let tunables = with
        .sections
        .iter()
        .find(|s| s.heading == "Tunables")
        .expect("tunables section");
    assert_eq!(tunables.tables[0].rows[0][0], "net.inet.ip.random_id");
}

#[test]
fn reserved_section_request_fails() {
    let err = compose_report(
        &sample_document(),
        &ReportOptions {
            sections: vec!["vpn".to_owned()],
            ..ReportOptions::default()
        },
        None,
    )
    .expect_err("vpn is reserved");
    assert!(err.to_string().contains("not yet implemented"));
}

// ---------------------------------------------------------------------------
// audit appendix
// ---------------------------------------------------------------------------

#[test]
fn appendix_follows_the_heading_hierarchy() {
    let audit = audit_with(
        vec![stig_finding(
            FindingSeverity::High,
            "SSH idle timeout not configured",
            "No timeout.",
        )],
        vec![Finding {
            plugin: "audit".to_owned(),
            severity: FindingSeverity::Critical,
            title: "Open firewall".to_owned(),
            description: "d".to_owned(),
            component: None,
            recommendation: None,
        }],
    );
    let tree = compose_report(&sample_document(), &ReportOptions::default(), Some(&audit))
        .expect("compose");
    let markdown = render_markdown(&tree, None);

    let positions: Vec<usize> = [
        "## Compliance Audit Summary",
        "### Plugin Compliance Results",
        "#### stig",
        "### stig Plugin Findings",
        "### Security Findings",
        "### Audit Metadata",
    ]
    .iter()
    .map(|needle| markdown.find(needle).unwrap_or_else(|| panic!("missing '{needle}' in:\n{markdown}")))
    .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "headings out of order:\n{markdown}");
}

/// Scenario: blue audit with a stig high finding renders `#### stig` and
/// `High: 1`.
#[test]
fn plugin_summary_renders_severity_counters() {
    let audit = audit_with(
        vec![stig_finding(
            FindingSeverity::High,
            "SSH idle timeout not configured",
            "No timeout.",
        )],
        Vec::new(),
    );
    let tree = compose_report(&sample_document(), &ReportOptions::default(), Some(&audit))
        .expect("compose");
    let markdown = render_markdown(&tree, None);
    assert!(markdown.contains("#### stig"), "markdown:\n{markdown}");
    assert!(markdown.contains("High: 1"), "markdown:\n{markdown}");
}

#[test]
fn zero_findings_omit_the_security_findings_block() {
    let audit = audit_with(Vec::new(), Vec::new());
    let tree = compose_report(&sample_document(), &ReportOptions::default(), Some(&audit))
        .expect("compose");
    let markdown = render_markdown(&tree, None);
    assert!(
        !markdown.contains("### Security Findings"),
        "markdown:\n{markdown}"
    );
}

/// Scenario: a 500-character description renders as a cell of at most 80
/// runes ending in `...`, with no unescaped pipes leaking from the tail.
#[test]
fn long_finding_description_is_truncated_in_the_cell() {
    let description = "A|B".repeat(200);
    let audit = audit_with(
        vec![stig_finding(FindingSeverity::Low, "Long", &description)],
        Vec::new(),
    );
    let tree = compose_report(&sample_document(), &ReportOptions::default(), Some(&audit))
        .expect("compose");
    let markdown = render_markdown(&tree, None);
    let row = markdown
        .lines()
        .find(|line| line.contains("Long"))
        .expect("finding row");
    let cells: Vec<&str> = row.split('|').collect();
    let description_cell = cells
        .iter()
        .find(|cell| cell.contains("..."))
        .expect("truncated cell");
    // The raw (unescaped) cell content respects the rune budget.
    let unescaped = description_cell.trim().replace("\\|", "|");
    assert!(
        unescaped.chars().count() <= MAX_DESCRIPTION_LENGTH,
        "cell: {description_cell}"
    );
    assert!(unescaped.ends_with("..."));
}

#[test]
fn blackhat_phrasing_changes_rendering_only() {
    let finding = stig_finding(FindingSeverity::High, "Weak spot", "An opening.");
    let mut audit = audit_with(vec![finding], Vec::new());
    audit.mode = AuditMode::Red;
    audit.blackhat_mode = true;
    let tree = compose_report(&sample_document(), &ReportOptions::default(), Some(&audit))
        .expect("compose");
    let markdown = render_markdown(&tree, None);
    assert!(
        markdown.contains("Exploitable surface: An opening."),
        "markdown:\n{markdown}"
    );
    // The underlying report still carries the neutral description.
    assert_eq!(
        audit.compliance["stig"].findings[0].description,
        "An opening."
    );
}

// ---------------------------------------------------------------------------
// surface forms
// ---------------------------------------------------------------------------

#[test]
fn json_and_yaml_mirror_the_tree() {
    let tree = compose_report(&sample_document(), &ReportOptions::default(), None)
        .expect("compose");
    let json = render_json(&tree);
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["title"], tree.title);
    assert!(value["sections"].is_array());

    let yaml = render_yaml(&tree);
    assert!(yaml.contains("title:"), "yaml:\n{yaml}");
    assert!(!yaml.contains('&'), "yaml must not use anchors:\n{yaml}");
}

#[test]
fn json_uses_two_space_indent() {
    let tree = compose_report(&sample_document(), &ReportOptions::default(), None)
        .expect("compose");
    let json = render_json(&tree);
    assert!(json.contains("\n  \"title\""), "json:\n{json}");
}

// ---------------------------------------------------------------------------
// wrapping
// ---------------------------------------------------------------------------

#[test]
fn paragraphs_wrap_at_the_requested_width() {
    let tree = ReportTree {
        title: "t".to_owned(),
        sections: vec![ReportSection {
            heading: "S".to_owned(),
            level: 2,
            paragraphs: vec!["one two three four five six seven eight nine ten".to_owned()],
            ..ReportSection::default()
        }],
    };
    let wrapped = render_markdown(&tree, Some(20));
    let long_lines: Vec<&str> = wrapped
        .lines()
        .filter(|line| !line.starts_with('#') && line.chars().count() > 20)
        .collect();
    assert!(long_lines.is_empty(), "unwrapped lines: {long_lines:?}");

    let unwrapped = render_markdown(&tree, None);
    assert!(unwrapped.contains("one two three four five six seven eight nine ten"));
}
