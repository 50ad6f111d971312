pub mod cli;
pub mod cmd;
pub mod error;
pub mod format;
pub mod io;

pub use cli::{Cli, Command, ConvertFormat, DiffFormat, DiffLayout, PathOrStdin};

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    if let Err(e) = validate_environment() {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }

    let cli = Cli::parse();

    if let Err(e) = dispatch(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or an [`error::CliError`] on failure. The
/// caller prints the message and exits with the error's code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Convert {
            files,
            format,
            output,
            force,
            section,
            wrap,
            no_wrap,
            comprehensive,
            include_tunables,
            audit_mode,
            audit_blackhat,
            audit_plugins,
        } => cmd::convert::run(&cmd::convert::ConvertParams {
            files,
            format: *format,
            output: output.as_deref(),
            force: *force,
            sections: section,
            wrap: *wrap,
            no_wrap: *no_wrap,
            comprehensive: *comprehensive,
            include_tunables: *include_tunables,
            audit_mode: *audit_mode,
            audit_blackhat: *audit_blackhat,
            audit_plugins,
            max_file_size: cli.max_file_size,
            timeout_secs: cli.timeout,
            quiet: cli.quiet,
        }),

        Command::Diff {
            old,
            new,
            format,
            mode,
            section,
            security,
            normalize,
            detect_order,
            output,
        } => cmd::diff::run(&cmd::diff::DiffParams {
            old,
            new,
            format: *format,
            layout: *mode,
            sections: section,
            security_only: *security,
            normalize: *normalize,
            detect_order: *detect_order,
            output: output.as_deref(),
            max_file_size: cli.max_file_size,
            timeout_secs: cli.timeout,
            no_color: cli.no_color,
            verbose: cli.verbose,
        }),

        Command::Sanitize {
            file,
            mode,
            output,
            mapping,
            seed,
            force,
        } => cmd::sanitize::run(&cmd::sanitize::SanitizeParams {
            file,
            mode: *mode,
            output: output.as_deref(),
            mapping: mapping.as_deref(),
            seed: *seed,
            force: *force,
            max_file_size: cli.max_file_size,
            timeout_secs: cli.timeout,
            quiet: cli.quiet,
        }),

        Command::Validate { files, json_output } => {
            cmd::validate::run(&cmd::validate::ValidateParams {
                files,
                json_output: *json_output,
                max_file_size: cli.max_file_size,
                quiet: cli.quiet,
            })
        }
    }
}

/// Configuration keys recognised in the environment, checked before clap
/// runs so a malformed or unknown `OPNSCOPE_*` key exits 5 instead of
/// surfacing as a generic argument error.
const KNOWN_ENV_KEYS: [&str; 2] = ["OPNSCOPE_MAX_FILE_SIZE", "OPNSCOPE_TIMEOUT"];

fn validate_environment() -> Result<(), error::CliError> {
    for (key, value) in std::env::vars() {
        if !key.starts_with("OPNSCOPE_") {
            continue;
        }
        if !KNOWN_ENV_KEYS.contains(&key.as_str()) {
            return Err(error::CliError::ConfigValidation {
                detail: format!(
                    "unknown configuration key '{key}'; known keys: {}",
                    KNOWN_ENV_KEYS.join(", ")
                ),
            });
        }
        if value.parse::<u64>().is_err() {
            return Err(error::CliError::ConfigValidation {
                detail: format!("configuration key '{key}' must be a non-negative integer, got '{value}'"),
            });
        }
    }
    Ok(())
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `opnscope convert file.xml | head`) to
/// receive an `Err(BrokenPipe)` from a write call rather than being
/// terminated silently. Restoring the default disposition lets the kernel
/// terminate the process the way standard Unix tools behave.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a
    // valid handler for SIGPIPE. The return value (previous handler) is
    // discarded.
    //
    // The workspace denies `unsafe_code` globally; this is the minimal
    // unavoidable use of libc required for SIGPIPE handling on Unix.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_env_keys_cover_the_documented_overrides() {
        assert!(KNOWN_ENV_KEYS.contains(&"OPNSCOPE_MAX_FILE_SIZE"));
        assert!(KNOWN_ENV_KEYS.contains(&"OPNSCOPE_TIMEOUT"));
    }
}
