//! Implementation of `opnscope diff`.
//!
//! Parses two configurations, runs the semantic diff engine, and renders
//! the result in the requested format. Differences are not errors: the
//! command exits 0 whenever the comparison itself succeeds.
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use opnscope_core::diff::{DiffMetadata, DiffOptions};
use opnscope_core::format::TerminalOptions;
use opnscope_core::format::{html, json, markdown, terminal};
use opnscope_core::{Deadline, DiffError};

use crate::cli::{DiffFormat, DiffLayout, PathOrStdin};
use crate::error::CliError;
use crate::format::{colors_enabled, terminal_width, verbose};
use crate::io;

/// All inputs of one `diff` invocation.
pub struct DiffParams<'a> {
    pub old: &'a PathOrStdin,
    pub new: &'a PathOrStdin,
    pub format: DiffFormat,
    pub layout: DiffLayout,
    pub sections: &'a [String],
    pub security_only: bool,
    pub normalize: bool,
    pub detect_order: bool,
    pub output: Option<&'a Path>,
    pub max_file_size: u64,
    pub timeout_secs: u64,
    pub no_color: bool,
    pub verbose: bool,
}

/// Runs the `diff` command.
///
/// # Errors
///
/// - [`CliError::InvalidArgument`] for the side-by-side layout with a
///   non-terminal format, two stdin inputs, or a reserved/unknown section.
/// - [`CliError::ParseFailed`] when either input is not well-formed.
/// - [`CliError::EngineError`] when the engine reports an invariant break.
pub fn run(params: &DiffParams<'_>) -> Result<(), CliError> {
    if params.layout == DiffLayout::SideBySide && params.format != DiffFormat::Terminal {
        return Err(CliError::InvalidArgument {
            detail: "'--mode side-by-side' requires '--format terminal'".to_owned(),
        });
    }
    if matches!(params.old, PathOrStdin::Stdin) && matches!(params.new, PathOrStdin::Stdin) {
        return Err(CliError::InvalidArgument {
            detail: "only one of the two inputs may be '-' (stdin)".to_owned(),
        });
    }

    let deadline = if params.timeout_secs == 0 {
        Deadline::none()
    } else {
        Deadline::after(Duration::from_secs(params.timeout_secs))
    };

    let old_label = params.old.label();
    let new_label = params.new.label();

    let old_content = io::read_input(params.old, params.max_file_size)?;
    let new_content = io::read_input(params.new, params.max_file_size)?;

    let old_doc = opnscope_core::parse(&old_content).map_err(|e| CliError::ParseFailed {
        source: old_label.clone(),
        line: e.line,
        detail: e.message,
    })?;
    let new_doc = opnscope_core::parse(&new_content).map_err(|e| CliError::ParseFailed {
        source: new_label.clone(),
        line: e.line,
        detail: e.message,
    })?;

    let options = DiffOptions {
        sections: params.sections.to_vec(),
        security_only: params.security_only,
        normalize: params.normalize,
        detect_order: params.detect_order,
    };
    let metadata = DiffMetadata {
        old_file: old_label,
        new_file: new_label,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    let result =
        opnscope_core::diff(&old_doc, &new_doc, &options, metadata, &deadline).map_err(
            |e| match e {
                DiffError::Section(section) => CliError::InvalidArgument {
                    detail: section.to_string(),
                },
                DiffError::Cancelled(cancelled) => CliError::OperationCancelled {
                    reason: cancelled.to_string(),
                },
                duplicate @ DiffError::DuplicateKey { .. } => CliError::EngineError {
                    detail: duplicate.to_string(),
                },
            },
        )?;

    verbose(
        &format!(
            "compared {} section(s): {} change(s), {} note(s)",
            result.counts.by_section.len(),
            result.changes.len(),
            result.notes.len()
        ),
        params.verbose,
    );

    let rendered = match params.format {
        DiffFormat::Terminal => {
            let terminal_options = TerminalOptions {
                color: params.output.is_none() && colors_enabled(params.no_color),
                width: terminal_width(),
            };
            match params.layout {
                DiffLayout::Unified => terminal::render_unified(&result, &terminal_options),
                DiffLayout::SideBySide => {
                    terminal::render_side_by_side(&result, &terminal_options)
                }
            }
        }
        DiffFormat::Markdown => markdown::render(&result),
        DiffFormat::Json => json::render(&result),
        DiffFormat::Html => html::render(&result),
    };

    match params.output {
        Some(path) => {
            io::write_output(path, rendered.as_bytes(), false)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "wrote {}", path.display()).map_err(|e| CliError::IoError {
                source: "stdout".to_owned(),
                detail: e.to_string(),
            })?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(rendered.as_bytes())
                .map_err(|e| CliError::IoError {
                    source: "stdout".to_owned(),
                    detail: e.to_string(),
                })?;
        }
    }

    Ok(())
}
