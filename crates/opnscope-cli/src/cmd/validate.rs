//! Implementation of `opnscope validate`.
//!
//! Checks each input structurally (well-formed XML, `opnsense` root) and
//! semantically (field constraints). Per-file failures are printed as they
//! are found — human one-liners, or JSON objects with `--json-output` —
//! and the process exits with the highest-severity category encountered.
use opnscope_core::DocumentError;

use crate::cli::PathOrStdin;
use crate::error::CliError;
use crate::io;

/// All inputs of one `validate` invocation.
pub struct ValidateParams<'a> {
    pub files: &'a [PathOrStdin],
    pub json_output: bool,
    pub max_file_size: u64,
    pub quiet: bool,
}

/// Runs the `validate` command.
///
/// # Errors
///
/// Returns [`CliError::Aggregate`] carrying the highest per-file exit code
/// when any input fails; the individual failures have already been
/// reported on stderr.
pub fn run(params: &ValidateParams<'_>) -> Result<(), CliError> {
    let mut failed = 0usize;
    let mut highest = 0i32;

    for source in params.files {
        let label = source.label();
        match validate_one(source, params.max_file_size) {
            Ok(()) => {
                if !params.quiet {
                    println!("{label}: OK");
                }
            }
            Err(e) => {
                failed += 1;
                highest = highest.max(e.exit_code());
                report_failure(&label, &e, params.json_output);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Aggregate { failed, highest });
    }
    Ok(())
}

fn validate_one(source: &PathOrStdin, max_file_size: u64) -> Result<(), CliError> {
    let label = source.label();
    let content = io::read_input(source, max_file_size)?;
    match opnscope_core::parse_and_validate(&content) {
        Ok(_) => Ok(()),
        Err(DocumentError::Parse(e)) => Err(CliError::ParseFailed {
            source: label,
            line: e.line,
            detail: e.message,
        }),
        Err(DocumentError::Validation(errors)) => Err(CliError::ValidationFailed {
            source: label,
            errors: errors.iter().map(ToString::to_string).collect(),
        }),
    }
}

/// Prints one failure to stderr: a human one-liner, or a JSON object of
/// the form `{error, code, type, file, details?}` with `--json-output`.
fn report_failure(label: &str, error: &CliError, json_output: bool) {
    if !json_output {
        eprintln!("{}", error.message());
        return;
    }

    let mut object = serde_json::Map::new();
    object.insert(
        "error".to_owned(),
        serde_json::Value::String(error.message()),
    );
    object.insert(
        "code".to_owned(),
        serde_json::Value::Number(error.exit_code().into()),
    );
    object.insert(
        "type".to_owned(),
        serde_json::Value::String(error.type_tag().to_owned()),
    );
    object.insert(
        "file".to_owned(),
        serde_json::Value::String(label.to_owned()),
    );
    if let CliError::ValidationFailed { errors, .. } = error {
        object.insert(
            "details".to_owned(),
            serde_json::Value::Array(
                errors
                    .iter()
                    .map(|e| serde_json::Value::String(e.clone()))
                    .collect(),
            ),
        );
    }
    eprintln!("{}", serde_json::Value::Object(object));
}
