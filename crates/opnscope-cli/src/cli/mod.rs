//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel
/// `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl PathOrStdin {
    /// Human-readable label: the path, or `-` for stdin.
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "-".to_owned(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output surface for the `convert` subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConvertFormat {
    /// CommonMark with GFM tables (default).
    Markdown,
    /// Pretty JSON with stable key order.
    Json,
    /// Block-style YAML without anchors.
    Yaml,
}

/// Output format for the `diff` subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiffFormat {
    /// Colored terminal output (default).
    Terminal,
    /// Markdown change tables.
    Markdown,
    /// Direct JSON serialization of the result.
    Json,
    /// Self-contained HTML document.
    Html,
}

/// Terminal layout for the `diff` subcommand.
///
/// `side-by-side` is only valid together with the terminal format; the
/// command layer rejects other combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiffLayout {
    /// One line per change (default).
    Unified,
    /// Old values left, new values right.
    #[value(name = "side-by-side")]
    SideBySide,
}

/// Redaction strength for the `sanitize` subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SanitizeModeArg {
    /// Redact every category.
    Aggressive,
    /// Redact credentials, public IPs, MACs, and emails (default).
    Moderate,
    /// Redact credentials and key material only.
    Minimal,
}

/// Audit posture for the `convert` subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuditModeArg {
    /// Neutral documentation.
    Standard,
    /// Defensive review: all plugins run.
    Blue,
    /// Attacker-oriented commentary.
    Red,
}

/// All top-level subcommands exposed by the `opnscope` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Convert configuration files into Markdown, JSON, or YAML reports.
    Convert {
        /// One or more config.xml paths, or `-` for stdin (at most once).
        #[arg(value_name = "FILE", num_args = 1.., required = true)]
        files: Vec<PathOrStdin>,
        /// Output surface form.
        #[arg(long, short = 'f', default_value = "markdown", value_enum)]
        format: ConvertFormat,
        /// Write to this file instead of stdout (single input only).
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
        /// Overwrite an existing output file without prompting.
        #[arg(long)]
        force: bool,
        /// Sections to include (comma-separated; default: all).
        #[arg(long, value_name = "s1,s2,...", value_delimiter = ',')]
        section: Vec<String>,
        /// Wrap paragraph text at N columns; -1 = auto width, 0 = no wrap.
        ///
        /// Mutually exclusive with `--no-wrap`.
        #[arg(long, value_name = "N", allow_hyphen_values = true)]
        wrap: Option<i64>,
        /// Disable paragraph wrapping entirely.
        #[arg(long)]
        no_wrap: bool,
        /// Include empty sections and per-entity detail columns.
        #[arg(long)]
        comprehensive: bool,
        /// Render the sysctl tunables table.
        #[arg(long)]
        include_tunables: bool,
        /// Run a compliance audit in this mode and append the results.
        #[arg(long, value_enum, value_name = "MODE")]
        audit_mode: Option<AuditModeArg>,
        /// Enable adversarial phrasing in the rendered audit (red mode).
        #[arg(long)]
        audit_blackhat: bool,
        /// Audit plugins to run (comma-separated: stig,sans,firewall).
        #[arg(long, value_name = "p1,p2,...", value_delimiter = ',')]
        audit_plugins: Vec<String>,
    },

    /// Compare two configuration files semantically.
    Diff {
        /// Path to the old configuration, or `-` for stdin.
        #[arg(value_name = "OLD")]
        old: PathOrStdin,
        /// Path to the new configuration (cannot also be `-`).
        #[arg(value_name = "NEW")]
        new: PathOrStdin,
        /// Output format.
        #[arg(long, short = 'f', default_value = "terminal", value_enum)]
        format: DiffFormat,
        /// Terminal layout (side-by-side only with terminal format).
        #[arg(long, default_value = "unified", value_enum)]
        mode: DiffLayout,
        /// Sections to compare (comma-separated; default: all).
        #[arg(long, value_name = "s1,s2,...", value_delimiter = ',')]
        section: Vec<String>,
        /// Suppress changes with no security impact.
        #[arg(long)]
        security: bool,
        /// Canonicalize values before comparison.
        #[arg(long)]
        normalize: bool,
        /// Detect entities that moved without content change.
        #[arg(long)]
        detect_order: bool,
        /// Write to this file instead of stdout.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Produce a redacted copy of a configuration safe for sharing.
    Sanitize {
        /// Path to a config.xml, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Redaction strength.
        #[arg(long, default_value = "moderate", value_enum)]
        mode: SanitizeModeArg,
        /// Write the sanitized XML to this file instead of stdout.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
        /// Write the original→redacted mapping to this JSON file.
        #[arg(long, value_name = "FILE")]
        mapping: Option<PathBuf>,
        /// Seed for the replacement generators (recorded in the mapping).
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
        /// Overwrite existing output files without prompting.
        #[arg(long)]
        force: bool,
    },

    /// Check configuration files structurally and semantically.
    Validate {
        /// One or more config.xml paths, or `-` for stdin (at most once).
        #[arg(value_name = "FILE", num_args = 1.., required = true)]
        files: Vec<PathOrStdin>,
        /// Emit errors as JSON objects on stderr.
        #[arg(long)]
        json_output: bool,
    },
}

/// Root CLI struct for the `opnscope` binary.
///
/// Global flags are marked `global = true` so clap propagates them to
/// every subcommand.
#[derive(Parser)]
#[command(
    name = "opnscope",
    version,
    about = "OPNsense configuration toolkit",
    long_about = "Inspects OPNsense config.xml files: converts them into readable\n\
                  reports, compares two revisions semantically with security\n\
                  scoring, audits them against compliance rule sets, and produces\n\
                  redacted copies safe for external sharing."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all stderr output except errors (incompatible with
    /// `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable ANSI color codes.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org> and `TERM=dumb`.
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new(),
        num_args = 0,
        default_missing_value = "true"
    )]
    pub no_color: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via `OPNSCOPE_MAX_FILE_SIZE`; the flag wins.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "OPNSCOPE_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Per-file processing deadline in seconds; 0 disables it.
    ///
    /// Can also be set via `OPNSCOPE_TIMEOUT`; the flag wins.
    #[arg(long, global = true, env = "OPNSCOPE_TIMEOUT", default_value = "0")]
    pub timeout: u64,
}
