//! Implementation of `opnscope convert`.
//!
//! Converts one or more configuration files into Markdown, JSON, or YAML
//! reports, optionally appending a compliance audit. Multiple inputs are
//! processed concurrently, one worker per file; workers share no mutable
//! state and rendering results are emitted in input order after all
//! workers finish. Errors are collected across workers and reported
//! together; the exit code is the highest per-file code.
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use rayon::prelude::*;

use opnscope_core::audit::AuditOptions;
use opnscope_core::enums::AuditMode;
use opnscope_core::report::{ReportOptions, compose_report};
use opnscope_core::{Deadline, render_json, render_markdown, render_yaml, run_audit};

use crate::cli::{AuditModeArg, ConvertFormat, PathOrStdin};
use crate::error::CliError;
use crate::format::{terminal_width, warn};
use crate::io;

/// All inputs of one `convert` invocation.
pub struct ConvertParams<'a> {
    pub files: &'a [PathOrStdin],
    pub format: ConvertFormat,
    pub output: Option<&'a Path>,
    pub force: bool,
    pub sections: &'a [String],
    pub wrap: Option<i64>,
    pub no_wrap: bool,
    pub comprehensive: bool,
    pub include_tunables: bool,
    pub audit_mode: Option<AuditModeArg>,
    pub audit_blackhat: bool,
    pub audit_plugins: &'a [String],
    pub max_file_size: u64,
    pub timeout_secs: u64,
    pub quiet: bool,
}

/// Runs the `convert` command.
///
/// # Errors
///
/// - [`CliError::InvalidArgument`] for flag conflicts (`--wrap` with
///   `--no-wrap`), out-of-range wrap values, more than one stdin input, or
///   `--output` with multiple inputs.
/// - Per-file parse, audit, and I/O errors; with multiple inputs these are
///   printed individually and folded into [`CliError::Aggregate`].
pub fn run(params: &ConvertParams<'_>) -> Result<(), CliError> {
    let wrap_width = resolve_wrap(params.wrap, params.no_wrap)?;
    check_stdin_count(params.files)?;

    if params.output.is_some() && params.files.len() > 1 {
        return Err(CliError::InvalidArgument {
            detail: "'--output' cannot be combined with multiple input files".to_owned(),
        });
    }

    let audit_requested = params.audit_mode.is_some() || !params.audit_plugins.is_empty();
    let audit_options = AuditOptions {
        mode: match params.audit_mode {
            Some(AuditModeArg::Standard) | None => AuditMode::Standard,
            Some(AuditModeArg::Blue) => AuditMode::Blue,
            Some(AuditModeArg::Red) => AuditMode::Red,
        },
        blackhat: params.audit_blackhat,
        comprehensive: params.comprehensive,
        selected_plugins: params.audit_plugins.to_vec(),
    };
    let report_options = ReportOptions {
        sections: params.sections.to_vec(),
        comprehensive: params.comprehensive,
        include_tunables: params.include_tunables,
    };

    // One timestamp per invocation so every rendered report agrees.
    let generated_at = chrono::Utc::now().to_rfc3339();

    let results: Vec<(String, Result<Rendered, CliError>)> = params
        .files
        .par_iter()
        .map(|source| {
            let label = source.label();
            let rendered = convert_one(
                source,
                params,
                &audit_options,
                audit_requested,
                &report_options,
                wrap_width,
                &generated_at,
            );
            (label, rendered)
        })
        .collect();

    emit_results(params, results)
}

/// One worker's output: the rendered report plus deferred warnings.
struct Rendered {
    text: String,
    warnings: Vec<String>,
}

fn convert_one(
    source: &PathOrStdin,
    params: &ConvertParams<'_>,
    audit_options: &AuditOptions,
    audit_requested: bool,
    report_options: &ReportOptions,
    wrap_width: Option<usize>,
    generated_at: &str,
) -> Result<Rendered, CliError> {
    let deadline = make_deadline(params.timeout_secs);
    let label = source.label();

    let content = io::read_input(source, params.max_file_size)?;
    deadline
        .check()
        .map_err(|e| CliError::OperationCancelled {
            reason: e.to_string(),
        })?;

    let document = opnscope_core::parse(&content).map_err(|e| CliError::ParseFailed {
        source: label.clone(),
        line: e.line,
        detail: e.message,
    })?;

    let mut warnings = Vec::new();
    let audit = if audit_requested {
        let report = run_audit(&document, audit_options, generated_at, &deadline).map_err(
            |e| match e {
                opnscope_core::AuditError::Cancelled(c) => CliError::OperationCancelled {
                    reason: c.to_string(),
                },
                unknown @ opnscope_core::AuditError::UnknownPlugin { .. } => {
                    CliError::InvalidArgument {
                        detail: unknown.to_string(),
                    }
                }
            },
        )?;
        warnings.extend(report.warnings.iter().cloned());
        Some(report)
    } else {
        None
    };

    deadline
        .check()
        .map_err(|e| CliError::OperationCancelled {
            reason: e.to_string(),
        })?;

    let tree = compose_report(&document, report_options, audit.as_ref()).map_err(|e| {
        CliError::InvalidArgument {
            detail: e.to_string(),
        }
    })?;

    let text = match params.format {
        ConvertFormat::Markdown => render_markdown(&tree, wrap_width),
        ConvertFormat::Json => render_json(&tree),
        ConvertFormat::Yaml => render_yaml(&tree),
    };

    Ok(Rendered { text, warnings })
}

/// Emits rendered reports in input order and folds failures.
fn emit_results(
    params: &ConvertParams<'_>,
    results: Vec<(String, Result<Rendered, CliError>)>,
) -> Result<(), CliError> {
    let single_input = results.len() == 1;
    let mut failed = 0usize;
    let mut highest = 0i32;
    let mut first_error: Option<CliError> = None;

    for (label, result) in results {
        match result {
            Ok(rendered) => {
                for warning in &rendered.warnings {
                    warn(warning, params.quiet);
                }
                match params.output {
                    Some(path) => {
                        io::write_output(path, rendered.text.as_bytes(), params.force)?;
                        let stdout = std::io::stdout();
                        let mut out = stdout.lock();
                        writeln!(out, "wrote {}", path.display()).map_err(|e| {
                            CliError::IoError {
                                source: "stdout".to_owned(),
                                detail: e.to_string(),
                            }
                        })?;
                    }
                    None => {
                        let stdout = std::io::stdout();
                        let mut out = stdout.lock();
                        out.write_all(rendered.text.as_bytes()).map_err(|e| {
                            CliError::IoError {
                                source: "stdout".to_owned(),
                                detail: e.to_string(),
                            }
                        })?;
                    }
                }
            }
            Err(e) => {
                failed += 1;
                highest = highest.max(e.exit_code());
                if single_input {
                    first_error = Some(e);
                } else {
                    eprintln!("{}: {}", label, e.message());
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    if failed > 0 {
        return Err(CliError::Aggregate { failed, highest });
    }
    Ok(())
}

/// Resolves `--wrap` / `--no-wrap` into an effective width.
///
/// `None` means no wrapping; `-1` selects the terminal width.
fn resolve_wrap(wrap: Option<i64>, no_wrap: bool) -> Result<Option<usize>, CliError> {
    if no_wrap {
        if wrap.is_some() {
            return Err(CliError::InvalidArgument {
                detail: "'--wrap' and '--no-wrap' are mutually exclusive".to_owned(),
            });
        }
        return Ok(None);
    }
    match wrap {
        None | Some(0) => Ok(None),
        Some(-1) => Ok(Some(terminal_width())),
        Some(n) if n < -1 => Err(CliError::InvalidArgument {
            detail: format!("'--wrap' must be -1 or greater, got {n}"),
        }),
        Some(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
    }
}

/// At most one input may be stdin.
fn check_stdin_count(files: &[PathOrStdin]) -> Result<(), CliError> {
    let stdin_count = files
        .iter()
        .filter(|f| matches!(f, PathOrStdin::Stdin))
        .count();
    if stdin_count > 1 {
        return Err(CliError::InvalidArgument {
            detail: "at most one input may be '-' (stdin)".to_owned(),
        });
    }
    Ok(())
}

fn make_deadline(timeout_secs: u64) -> Deadline {
    if timeout_secs == 0 {
        Deadline::none()
    } else {
        Deadline::after(Duration::from_secs(timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn wrap_and_no_wrap_are_mutually_exclusive() {
        let err = resolve_wrap(Some(80), true).expect_err("must conflict");
        assert!(
            err.message().contains("mutually exclusive"),
            "message: {}",
            err.message()
        );
    }

    #[test]
    fn wrap_zero_disables_wrapping() {
        assert_eq!(resolve_wrap(Some(0), false).expect("valid"), None);
    }

    #[test]
    fn wrap_default_is_no_wrapping() {
        assert_eq!(resolve_wrap(None, false).expect("valid"), None);
    }

    #[test]
    fn wrap_minus_one_selects_auto_width() {
        let width = resolve_wrap(Some(-1), false).expect("valid");
        assert!(width.is_some_and(|w| w >= 20));
    }

    #[test]
    fn wrap_below_minus_one_is_rejected() {
        let err = resolve_wrap(Some(-2), false).expect_err("must fail");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn positive_wrap_is_passed_through() {
        assert_eq!(resolve_wrap(Some(72), false).expect("valid"), Some(72));
    }

    #[test]
    fn two_stdin_inputs_are_rejected() {
        let files = vec![PathOrStdin::Stdin, PathOrStdin::Stdin];
        assert!(check_stdin_count(&files).is_err());
    }

    #[test]
    fn one_stdin_input_is_fine() {
        let files = vec![PathOrStdin::Stdin];
        assert!(check_stdin_count(&files).is_ok());
    }
}
