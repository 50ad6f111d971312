//! Implementation of `opnscope sanitize`.
//!
//! Streams the input through the sanitizer into the output target. The
//! output file is staged next to the target and only renamed into place
//! after the XML pass succeeded and the bytes are fsynced; the mapping
//! file is written only after that. Summary counters go to stderr.
use std::io::{BufReader, BufWriter, Read as _, Write as _};

use std::path::{Path, PathBuf};
use std::time::Duration;

use opnscope_core::enums::SanitizeMode;
use opnscope_core::sanitize::{SanitizeError, SanitizeOptions, SanitizeOutcome, sanitize};
use opnscope_core::Deadline;

use crate::cli::{PathOrStdin, SanitizeModeArg};
use crate::error::CliError;
use crate::io;

/// All inputs of one `sanitize` invocation.
pub struct SanitizeParams<'a> {
    pub file: &'a PathOrStdin,
    pub mode: SanitizeModeArg,
    pub output: Option<&'a Path>,
    pub mapping: Option<&'a Path>,
    pub seed: Option<u64>,
    pub force: bool,
    pub max_file_size: u64,
    pub timeout_secs: u64,
    pub quiet: bool,
}

/// Runs the `sanitize` command.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] when the input is not well-formed XML.
/// - [`CliError::OperationCancelled`] on a declined overwrite or expired
///   deadline.
/// - File I/O variants for unreadable input or unwritable output.
pub fn run(params: &SanitizeParams<'_>) -> Result<(), CliError> {
    let mode = match params.mode {
        SanitizeModeArg::Aggressive => SanitizeMode::Aggressive,
        SanitizeModeArg::Moderate => SanitizeMode::Moderate,
        SanitizeModeArg::Minimal => SanitizeMode::Minimal,
    };
    let options = SanitizeOptions {
        mode,
        seed: params.seed,
    };
    let deadline = if params.timeout_secs == 0 {
        Deadline::none()
    } else {
        Deadline::after(Duration::from_secs(params.timeout_secs))
    };
    let label = params.file.label();

    // Overwrite prompts happen before any streaming starts.
    if let Some(path) = params.output {
        if path.exists() && !params.force {
            io::confirm_overwrite(path)?;
        }
    }
    if let Some(path) = params.mapping {
        if path.exists() && !params.force {
            io::confirm_overwrite(path)?;
        }
    }

    let outcome = match (params.file, params.output) {
        (PathOrStdin::Path(input), Some(output)) => {
            let reader = open_input(input, params.max_file_size)?;
            stream_to_file(reader, output, &options, &deadline, &label)?
        }
        (PathOrStdin::Path(input), None) => {
            let reader = open_input(input, params.max_file_size)?;
            stream_to_stdout(reader, &options, &deadline, &label)?
        }
        (PathOrStdin::Stdin, Some(output)) => {
            let stdin = std::io::stdin();
            let reader = BufReader::new(stdin.lock().take(params.max_file_size));
            stream_to_file(reader, output, &options, &deadline, &label)?
        }
        (PathOrStdin::Stdin, None) => {
            let stdin = std::io::stdin();
            let reader = BufReader::new(stdin.lock().take(params.max_file_size));
            stream_to_stdout(reader, &options, &deadline, &label)?
        }
    };

    // The mapping file is written only after the XML pass succeeded.
    if let Some(path) = params.mapping {
        let json = outcome.mapper.to_json_string();
        // The prompt already ran above; force through.
        io::write_output(path, json.as_bytes(), true)?;
    }

    if !params.quiet {
        let stats = outcome.stats;
        eprintln!(
            "sanitized {label}: total_fields={} redacted_fields={} skipped_fields={}",
            stats.total_fields, stats.redacted_fields, stats.skipped_fields
        );
    }

    Ok(())
}

/// Opens a disk input with the size cap enforced up front.
fn open_input(path: &Path, max_size: u64) -> Result<BufReader<std::fs::File>, CliError> {
    let size = std::fs::metadata(path)
        .map_err(|e| map_open_error(&e, path))?
        .len();
    if size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(size),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| map_open_error(&e, path))?;
    Ok(BufReader::new(file))
}

fn map_open_error(e: &std::io::Error, path: &Path) -> CliError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied {
            path: path.to_path_buf(),
        },
        #[allow(clippy::wildcard_enum_match_arm)]
        _ => CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        },
    }
}

/// Streams into a sibling temp file; fsyncs and renames only on success.
fn stream_to_file<R: std::io::BufRead>(
    reader: R,
    output: &Path,
    options: &SanitizeOptions,
    deadline: &Deadline,
    label: &str,
) -> Result<SanitizeOutcome, CliError> {
    let mut temp = output.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let file = std::fs::File::create(&temp).map_err(|e| CliError::WriteFailed {
        path: output.to_path_buf(),
        detail: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    match sanitize(reader, &mut writer, options, deadline) {
        Ok(outcome) => {
            let finish = writer
                .flush()
                .and_then(|()| writer.get_ref().sync_all())
                .and_then(|()| std::fs::rename(&temp, output));
            if let Err(e) = finish {
                let _removed = std::fs::remove_file(&temp);
                return Err(CliError::WriteFailed {
                    path: output.to_path_buf(),
                    detail: e.to_string(),
                });
            }
            Ok(outcome)
        }
        Err(e) => {
            // A partly written staging file is never promoted.
            drop(writer);
            let _removed = std::fs::remove_file(&temp);
            Err(map_sanitize_error(e, label))
        }
    }
}

fn stream_to_stdout<R: std::io::BufRead>(
    reader: R,
    options: &SanitizeOptions,
    deadline: &Deadline,
    label: &str,
) -> Result<SanitizeOutcome, CliError> {
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let outcome =
        sanitize(reader, &mut writer, options, deadline).map_err(|e| map_sanitize_error(e, label))?;
    writer.flush().map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;
    Ok(outcome)
}

fn map_sanitize_error(e: SanitizeError, label: &str) -> CliError {
    match e {
        SanitizeError::Parse(parse) => CliError::ParseFailed {
            source: label.to_owned(),
            line: parse.line,
            detail: parse.message,
        },
        SanitizeError::Io { detail } => CliError::IoError {
            source: label.to_owned(),
            detail,
        },
        SanitizeError::Cancelled(cancelled) => CliError::OperationCancelled {
            reason: cancelled.to_string(),
        },
        SanitizeError::Pattern(pattern) => CliError::EngineError {
            detail: pattern.to_string(),
        },
    }
}
