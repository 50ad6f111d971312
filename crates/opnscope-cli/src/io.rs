/// File and stdin reading plus the durable-write protocol.
///
/// This module is the single entry point for all file I/O in the
/// `opnscope` binary; `opnscope-core` never touches the filesystem.
///
/// Key behaviours:
/// - Disk files: size checked via `std::fs::metadata` before any read.
/// - Stdin: buffered with a `Read::take` cap so allocation is bounded.
/// - Writes: staged into a sibling temp file, fsynced, then renamed — an
///   output path is only ever replaced by a fully written file.
/// - Overwrite protocol: without `--force`, an existing output file
///   triggers a y/N prompt on stderr; anything but `y`/`Y` cancels.
use std::io::{BufRead as _, Read as _, Write as _};
use std::path::{Path, PathBuf};

use crate::cli::PathOrStdin;
use crate::error::CliError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads the entire contents of `source` into a `String`.
///
/// # Errors
///
/// Returns a [`CliError`] with exit code 4 for missing files, permission
/// problems, oversized inputs, other I/O failures, and invalid UTF-8.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

fn read_file(path: &PathBuf, max_size: u64) -> Result<String, CliError> {
    let file_size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return Err(io_error_to_cli(&e, path)),
    };

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| io_error_to_cli(&e, path))?;
    bytes_to_string(&bytes, &path.display().to_string())
}

/// Maps a filesystem `io::Error` to the matching [`CliError`] variant.
fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
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

fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let handle = stdin.lock();

    let mut limited = handle.take(max_size);
    let mut buf: Vec<u8> = Vec::new();
    limited
        .read_to_end(&mut buf)
        .map_err(|e| CliError::IoError {
            source: "stdin".to_owned(),
            detail: e.to_string(),
        })?;

    // At exactly the cap, probe one extra byte to detect overflow.
    if buf.len() as u64 == max_size {
        let stdin2 = std::io::stdin();
        let mut handle2 = stdin2.lock();
        let mut probe = [0u8; 1];
        let extra = handle2.read(&mut probe).map_err(|e| CliError::IoError {
            source: "stdin".to_owned(),
            detail: e.to_string(),
        })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }

    bytes_to_string(&buf, "-")
}

fn bytes_to_string(bytes: &[u8], source_label: &str) -> Result<String, CliError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => Err(CliError::InvalidUtf8 {
            source: source_label.to_owned(),
            byte_offset: e.valid_up_to(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `content` to `path` under the durable-write protocol.
///
/// When `path` exists and `force` is false, the user is prompted on
/// stderr (`File '{path}' already exists. Overwrite? (y/N):`); any answer
/// other than `y` or `Y` cancels. The content is staged into a sibling
/// `.tmp` file, fsynced, and renamed over the target, so the target is
/// only ever replaced by a complete file.
///
/// # Errors
///
/// - [`CliError::OperationCancelled`] when the prompt is declined.
/// - [`CliError::WriteFailed`] / [`CliError::PermissionDenied`] for
///   filesystem failures.
pub fn write_output(path: &Path, content: &[u8], force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        confirm_overwrite(path)?;
    }
    write_durable(path, content)
}

/// Prompts on stderr and reads one line from stdin.
///
/// # Errors
///
/// [`CliError::OperationCancelled`] unless the answer is `y` or `Y`.
pub(crate) fn confirm_overwrite(path: &Path) -> Result<(), CliError> {
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    write!(
        err_out,
        "File '{}' already exists. Overwrite? (y/N): ",
        path.display()
    )
    .and_then(|()| err_out.flush())
    .map_err(|e| CliError::IoError {
        source: "stderr".to_owned(),
        detail: e.to_string(),
    })?;

    let stdin = std::io::stdin();
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(|e| CliError::IoError {
            source: "stdin".to_owned(),
            detail: e.to_string(),
        })?;

    match answer.trim() {
        "y" | "Y" => Ok(()),
        _ => Err(CliError::OperationCancelled {
            reason: format!("overwrite of '{}' declined", path.display()),
        }),
    }
}

/// Stages, fsyncs, and renames. The temp file sits next to the target so
/// the rename stays on one filesystem.
fn write_durable(path: &Path, content: &[u8]) -> Result<(), CliError> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&temp)?;
        file.write_all(content)?;
        file.sync_all()?;
        std::fs::rename(&temp, path)?;
        Ok(())
    })();

    if let Err(e) = result {
        // Best effort: do not leave the staging file behind.
        let _removed = std::fs::remove_file(&temp);
        return Err(match e.kind() {
            std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied {
                path: path.to_path_buf(),
            },
            #[allow(clippy::wildcard_enum_match_arm)]
            _ => CliError::WriteFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            },
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
