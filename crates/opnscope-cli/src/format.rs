/// Terminal capability detection and stderr diagnostics.
///
/// Styling is disabled when any of the following hold: the `--no-color`
/// flag, a `NO_COLOR` environment variable (per <https://no-color.org>),
/// `TERM=dumb`, or a non-TTY stdout.
use std::io::IsTerminal as _;

/// Returns `true` if ANSI color codes should be emitted to stdout.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("TERM").is_some_and(|term| term == "dumb") {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Terminal width for auto-wrapping: `COLUMNS` when set and sane,
/// otherwise 100.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|columns| columns.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(100)
}

/// Prints a warning line to stderr unless quiet.
pub fn warn(message: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("warning: {message}");
}

/// Prints a verbose diagnostic line to stderr when verbose is on.
pub fn verbose(message: &str, enabled: bool) {
    if !enabled {
        return;
    }
    eprintln!("{message}");
}
