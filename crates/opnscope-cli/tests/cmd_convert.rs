//! Integration tests for `opnscope convert`.
#![allow(clippy::expect_used)]

mod common;

use common::{fixture_arg, run, stderr, stdout};

// ---------------------------------------------------------------------------
// markdown output
// ---------------------------------------------------------------------------

#[test]
fn convert_renders_a_markdown_report() {
    let out = run(&["convert", &fixture_arg("diff-base.xml")]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(
        text.starts_with("# OPNsense Configuration Report: fw01.example.com"),
        "stdout: {text}"
    );
    assert!(text.contains("## Firewall Rules"), "stdout: {text}");
    assert!(text.contains("| pass | lan |"), "stdout: {text}");
}

#[test]
fn convert_json_and_yaml_mirror_the_report() {
    let json_out = run(&["convert", &fixture_arg("diff-base.xml"), "--format", "json"]);
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&json_out)).expect("stdout should be JSON");
    assert!(
        value["title"]
            .as_str()
            .is_some_and(|t| t.contains("fw01.example.com")),
        "json: {value}"
    );

    let yaml_out = run(&["convert", &fixture_arg("diff-base.xml"), "--format", "yaml"]);
    assert!(stdout(&yaml_out).contains("title:"), "yaml: {}", stdout(&yaml_out));
}

#[test]
fn convert_section_filter_limits_the_report() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--section",
        "system",
    ]);
    let text = stdout(&out);
    assert!(text.contains("## System"), "stdout: {text}");
    assert!(!text.contains("## Firewall Rules"), "stdout: {text}");
}

// ---------------------------------------------------------------------------
// wrap flags
// ---------------------------------------------------------------------------

#[test]
fn convert_wrap_and_no_wrap_conflict_with_exit_1() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--wrap",
        "80",
        "--no-wrap",
    ]);
    assert_eq!(out.status.code(), Some(1), "stdout: {}", stdout(&out));
    assert!(
        stderr(&out).contains("mutually exclusive"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn convert_wrap_below_minus_one_is_rejected() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--wrap",
        "-2",
    ]);
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// audit appendix
// ---------------------------------------------------------------------------

/// Blue-mode audit of a document without an SSH idle timeout: the stig
/// plugin reports at least one high finding and the appendix carries the
/// plugin heading and counters.
#[test]
fn convert_blue_audit_appends_stig_findings() {
    let out = run(&[
        "convert",
        &fixture_arg("sanitize-sample.xml"),
        "--audit-mode",
        "blue",
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("## Compliance Audit Summary"), "stdout: {text}");
    assert!(text.contains("#### stig"), "stdout: {text}");
    assert!(text.contains("High:"), "stdout: {text}");
}

#[test]
fn convert_base_fixture_audit_counts_ssh_timeout_as_configured() {
    // diff-base.xml sets an SSH idle timeout, so stig must not flag it.
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--audit-mode",
        "blue",
    ]);
    let text = stdout(&out);
    assert!(
        !text.contains("SSH idle timeout not configured"),
        "stdout: {text}"
    );
}

#[test]
fn convert_unknown_audit_plugin_is_rejected() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--audit-mode",
        "blue",
        "--audit-plugins",
        "cis",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("unknown audit plugin"),
        "stderr: {}",
        stderr(&out)
    );
}

// ---------------------------------------------------------------------------
// file output and overwrite protocol
// ---------------------------------------------------------------------------

#[test]
fn convert_writes_the_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("report.md");
    let target_arg = target.display().to_string();
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--output",
        &target_arg,
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("wrote "), "stdout: {}", stdout(&out));
    let written = std::fs::read_to_string(&target).expect("output file exists");
    assert!(written.starts_with("# OPNsense Configuration Report"));
}

#[test]
fn convert_existing_output_without_force_prompts_and_cancels_on_empty_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("report.md");
    std::fs::write(&target, "old content").expect("seed file");
    let target_arg = target.display().to_string();

    let out = std::process::Command::new(common::opnscope_bin())
        .args([
            "convert",
            &fixture_arg("diff-base.xml"),
            "--output",
            &target_arg,
        ])
        .stdin(std::process::Stdio::null())
        .output()
        .expect("run opnscope");

    assert_eq!(out.status.code(), Some(1), "stdout: {}", stdout(&out));
    let err_text = stderr(&out);
    assert!(
        err_text.contains("already exists. Overwrite? (y/N):"),
        "stderr: {err_text}"
    );
    assert!(err_text.contains("operation cancelled"), "stderr: {err_text}");
    assert_eq!(
        std::fs::read_to_string(&target).expect("file intact"),
        "old content",
        "declined overwrite must not touch the file"
    );
}

#[test]
fn convert_force_overwrites_without_prompting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("report.md");
    std::fs::write(&target, "old content").expect("seed file");
    let target_arg = target.display().to_string();
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        "--output",
        &target_arg,
        "--force",
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let written = std::fs::read_to_string(&target).expect("output file");
    assert!(written.starts_with("# OPNsense Configuration Report"));
}

// ---------------------------------------------------------------------------
// multiple inputs
// ---------------------------------------------------------------------------

#[test]
fn convert_multiple_inputs_render_in_order() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert_eq!(
        text.matches("# OPNsense Configuration Report").count(),
        2,
        "stdout: {text}"
    );
}

#[test]
fn convert_multiple_inputs_with_output_is_rejected() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("diff-modified.xml"),
        "--output",
        "/tmp/never-written.md",
    ]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn convert_mixed_success_and_failure_exits_with_the_highest_code() {
    let out = run(&[
        "convert",
        &fixture_arg("diff-base.xml"),
        &fixture_arg("invalid-syntax.xml"),
    ]);
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
    // The good file still rendered.
    assert!(
        stdout(&out).contains("# OPNsense Configuration Report"),
        "stdout: {}",
        stdout(&out)
    );
}

// ---------------------------------------------------------------------------
// environment configuration
// ---------------------------------------------------------------------------

#[test]
fn unknown_opnscope_env_key_exits_5() {
    let out = std::process::Command::new(common::opnscope_bin())
        .args(["convert", &fixture_arg("diff-base.xml")])
        .env("OPNSCOPE_FROBNICATE", "1")
        .output()
        .expect("run opnscope");
    assert_eq!(out.status.code(), Some(5), "stderr: {}", stderr(&out));
    assert!(
        stderr(&out).contains("OPNSCOPE_FROBNICATE"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn malformed_opnscope_env_value_exits_5() {
    let out = std::process::Command::new(common::opnscope_bin())
        .args(["convert", &fixture_arg("diff-base.xml")])
        .env("OPNSCOPE_MAX_FILE_SIZE", "lots")
        .output()
        .expect("run opnscope");
    assert_eq!(out.status.code(), Some(5), "stderr: {}", stderr(&out));
}
