//! Integration tests for `opnscope diff`.
#![allow(clippy::expect_used)]

mod common;

use common::{fixture_arg, run, stderr, stdout};

// ---------------------------------------------------------------------------
// identical files
// ---------------------------------------------------------------------------

#[test]
fn diff_identical_files_exits_0_with_zero_changes() {
    let base = fixture_arg("diff-base.xml");
    let out = run(&["diff", &base, &base]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(
        text.contains("0 change(s)"),
        "summary should show zero changes; stdout: {text}"
    );
}

// ---------------------------------------------------------------------------
// modified files
// ---------------------------------------------------------------------------

#[test]
fn diff_modified_files_reports_the_widened_source_as_high() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains('~'), "modified marker missing: {text}");
    assert!(
        text.contains("firewall.rules[r1].source"),
        "field path missing: {text}"
    );
    assert!(
        text.contains("source widened to any"),
        "rationale missing: {text}"
    );
    assert!(text.contains("(high)"), "impact missing: {text}");
}

#[test]
fn diff_modified_files_reports_the_added_user() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
    ]);
    let text = stdout(&out);
    assert!(text.contains("+ [users] auditor"), "stdout: {text}");
}

#[test]
fn diff_json_format_is_machine_readable() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--format",
        "json",
    ]);
    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&out)).expect("stdout should be JSON");
    assert!(value["changes"].is_array());
    assert_eq!(value["counts"]["by_impact"]["high"], 1);
}

#[test]
fn diff_security_only_hides_none_impact_changes() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--security",
        "--format",
        "json",
    ]);
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&out)).expect("stdout should be JSON");
    let changes = value["changes"].as_array().expect("changes array");
    assert!(
        changes.iter().all(|c| c["impact"] != "none"),
        "none-impact changes leaked: {changes:?}"
    );
}

// ---------------------------------------------------------------------------
// argument validation
// ---------------------------------------------------------------------------

#[test]
fn diff_side_by_side_with_markdown_is_rejected() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--mode",
        "side-by-side",
        "--format",
        "markdown",
    ]);
    assert_eq!(out.status.code(), Some(1), "stdout: {}", stdout(&out));
    assert!(
        stderr(&out).contains("side-by-side"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn diff_reserved_section_names_the_implemented_ones() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--section",
        "dns",
    ]);
    assert_eq!(out.status.code(), Some(1));
    let text = stderr(&out);
    assert!(text.contains("not yet implemented"), "stderr: {text}");
    assert!(text.contains("firewall"), "stderr: {text}");
}

#[test]
fn diff_parse_error_exits_2() {
    let out = run(&[
        "diff",
        &fixture_arg("invalid-syntax.xml"),
        &fixture_arg("diff-base.xml"),
    ]);
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
}

#[test]
fn diff_missing_file_exits_4() {
    let out = run(&["diff", "/no/such/file.xml", &fixture_arg("diff-base.xml")]);
    assert_eq!(out.status.code(), Some(4), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// side-by-side and html
// ---------------------------------------------------------------------------

#[test]
fn diff_side_by_side_renders_two_columns() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--mode",
        "side-by-side",
    ]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains(" | "), "stdout: {}", stdout(&out));
}

#[test]
fn diff_html_is_self_contained() {
    let out = run(&[
        "diff",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--format",
        "html",
    ]);
    let text = stdout(&out);
    assert!(text.starts_with("<!DOCTYPE html>"), "stdout: {text}");
    assert!(text.contains("class=\"high\""), "stdout: {text}");
}
