/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `opnscope` binary.
/// Every variant maps to a stable exit code via [`CliError::exit_code`]:
///
/// - **0** — success (never an error variant).
/// - **1** — general failure: invalid arguments, unsupported format
///   combinations, cancelled operations, engine invariant breaks.
/// - **2** — parse failure: the input is not well-formed XML.
/// - **3** — validation failure: well-formed but semantically invalid.
/// - **4** — file I/O failure: missing, unreadable, or unwritable files.
/// - **5** — configuration-validation failure: unknown or malformed
///   `OPNSCOPE_*` configuration keys.
use std::fmt;
use std::path::PathBuf;

/// All error conditions the `opnscope` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: parse failures ---
    /// The input is not well-formed XML.
    ParseFailed {
        /// Label of the input (`-` for stdin, or the path).
        source: String,
        /// 1-based line of the fault, best effort.
        line: usize,
        /// Short description of the fault.
        detail: String,
    },

    // --- Exit code 3: validation failures ---
    /// The input parsed but violates semantic constraints.
    ValidationFailed {
        /// Label of the input.
        source: String,
        /// One `field_path: reason` string per violation.
        errors: Vec<String>,
    },

    // --- Exit code 4: file I/O failures ---
    /// A file argument could not be found.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },
    /// The process lacks permission to read or write a file.
    PermissionDenied {
        /// The affected path.
        path: PathBuf,
    },
    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// Label of the input.
        source: String,
        /// The configured limit in bytes.
        limit: u64,
        /// The actual size, if known (`None` for stdin).
        actual: Option<u64>,
    },
    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// Label of the input.
        source: String,
        /// Byte offset of the first invalid sequence.
        byte_offset: usize,
    },
    /// Writing an output file failed.
    WriteFailed {
        /// The path being written.
        path: PathBuf,
        /// The underlying error message.
        detail: String,
    },
    /// A generic I/O failure not covered above.
    IoError {
        /// Label of the affected stream or file.
        source: String,
        /// The underlying error message.
        detail: String,
    },

    // --- Exit code 5: configuration-validation failures ---
    /// An `OPNSCOPE_*` configuration key is unknown or malformed.
    ConfigValidation {
        /// Description of the offending key.
        detail: String,
    },

    // --- Exit code 1: general failures ---
    /// Mutually exclusive flags, out-of-range values, or invalid enum
    /// values.
    InvalidArgument {
        /// What was wrong.
        detail: String,
    },
    /// A format is not supported for the requested operation.
    UnsupportedFormat {
        /// What was requested.
        detail: String,
    },
    /// The user declined an overwrite prompt or a deadline expired.
    OperationCancelled {
        /// Why the operation was cancelled.
        reason: String,
    },
    /// An engine reported an invariant break (e.g. duplicate identity keys
    /// on both sides of a diff).
    EngineError {
        /// The engine's message.
        detail: String,
    },
    /// Several inputs failed; the individual failures were already
    /// reported. Carries the highest exit code encountered.
    Aggregate {
        /// Number of failed inputs.
        failed: usize,
        /// The highest per-file exit code.
        highest: i32,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ParseFailed { .. } => 2,
            Self::ValidationFailed { .. } => 3,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::WriteFailed { .. }
            | Self::IoError { .. } => 4,
            Self::ConfigValidation { .. } => 5,
            Self::InvalidArgument { .. }
            | Self::UnsupportedFormat { .. }
            | Self::OperationCancelled { .. }
            | Self::EngineError { .. } => 1,
            Self::Aggregate { highest, .. } => *highest,
        }
    }

    /// Returns a human-readable message suitable for stderr.
    pub fn message(&self) -> String {
        match self {
            Self::ParseFailed {
                source,
                line,
                detail,
            } => {
                format!("error: {source}: parse error at line {line}: {detail}")
            }
            Self::ValidationFailed { source, errors } => {
                let mut msg = format!(
                    "error: {source}: validation failed with {} error(s)",
                    errors.len()
                );
                for error in errors {
                    msg.push_str("\n  ");
                    msg.push_str(error);
                }
                msg
            }
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::WriteFailed { path, detail } => {
                format!("error: failed to write {}: {detail}", path.display())
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::ConfigValidation { detail } => {
                format!("error: invalid configuration: {detail}")
            }
            Self::InvalidArgument { detail } => {
                format!("error: invalid argument: {detail}")
            }
            Self::UnsupportedFormat { detail } => {
                format!("error: unsupported format: {detail}")
            }
            Self::OperationCancelled { reason } => {
                format!("error: operation cancelled: {reason}")
            }
            Self::EngineError { detail } => {
                format!("error: {detail}")
            }
            Self::Aggregate { failed, .. } => {
                format!("error: {failed} input(s) failed")
            }
        }
    }

    /// Machine-readable error type tag, used by `--json-output`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::ParseFailed { .. } => "parse",
            Self::ValidationFailed { .. } => "validation",
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::WriteFailed { .. }
            | Self::IoError { .. } => "file",
            Self::ConfigValidation { .. } => "config",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::OperationCancelled { .. } => "cancelled",
            Self::EngineError { .. } | Self::Aggregate { .. } => "general",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parse_failure_is_exit_2() {
        let e = CliError::ParseFailed {
            source: "a.xml".to_owned(),
            line: 3,
            detail: "unclosed element".to_owned(),
        };
        assert_eq!(e.exit_code(), 2);
        assert!(e.message().contains("line 3"));
    }

    #[test]
    fn validation_failure_is_exit_3() {
        let e = CliError::ValidationFailed {
            source: "a.xml".to_owned(),
            errors: vec!["system.hostname: hostname must not be empty".to_owned()],
        };
        assert_eq!(e.exit_code(), 3);
        assert!(e.message().contains("system.hostname"));
    }

    #[test]
    fn file_errors_are_exit_4() {
        let errors = [
            CliError::FileNotFound {
                path: PathBuf::from("x.xml"),
            },
            CliError::PermissionDenied {
                path: PathBuf::from("x.xml"),
            },
            CliError::FileTooLarge {
                source: "x.xml".to_owned(),
                limit: 10,
                actual: Some(20),
            },
            CliError::InvalidUtf8 {
                source: "x.xml".to_owned(),
                byte_offset: 0,
            },
            CliError::WriteFailed {
                path: PathBuf::from("out.md"),
                detail: "disk full".to_owned(),
            },
            CliError::IoError {
                source: "stdin".to_owned(),
                detail: "broken pipe".to_owned(),
            },
        ];
        for e in errors {
            assert_eq!(e.exit_code(), 4, "error: {e:?}");
        }
    }

    #[test]
    fn config_validation_is_exit_5() {
        let e = CliError::ConfigValidation {
            detail: "unknown configuration key 'OPNSCOPE_FROBNICATE'".to_owned(),
        };
        assert_eq!(e.exit_code(), 5);
    }

    #[test]
    fn general_failures_are_exit_1() {
        let errors = [
            CliError::InvalidArgument {
                detail: "'--wrap' and '--no-wrap' are mutually exclusive".to_owned(),
            },
            CliError::UnsupportedFormat {
                detail: "side-by-side requires terminal format".to_owned(),
            },
            CliError::OperationCancelled {
                reason: "overwrite declined".to_owned(),
            },
            CliError::EngineError {
                detail: "duplicate identity key".to_owned(),
            },
        ];
        for e in errors {
            assert_eq!(e.exit_code(), 1, "error: {e:?}");
        }
    }

    #[test]
    fn aggregate_carries_the_highest_code() {
        let e = CliError::Aggregate {
            failed: 2,
            highest: 3,
        };
        assert_eq!(e.exit_code(), 3);
        assert!(e.message().contains("2 input(s)"));
    }

    #[test]
    fn cancelled_message_contains_the_phrase() {
        let e = CliError::OperationCancelled {
            reason: "overwrite declined".to_owned(),
        };
        assert!(e.message().contains("operation cancelled"));
    }

    #[test]
    fn type_tags_are_stable() {
        assert_eq!(
            CliError::ParseFailed {
                source: String::new(),
                line: 1,
                detail: String::new()
            }
            .type_tag(),
            "parse"
        );
        assert_eq!(
            CliError::ValidationFailed {
                source: String::new(),
                errors: Vec::new()
            }
            .type_tag(),
            "validation"
        );
    }

    #[test]
    fn display_matches_message() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("x.xml"),
        };
        assert_eq!(format!("{e}"), e.message());
    }
}
