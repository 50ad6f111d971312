#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Core library for `opnscope`: parsing, diffing, auditing, sanitizing,
//! and reporting on OPNsense firewall configurations.

pub mod audit;
pub mod deadline;
pub mod diff;
pub mod enums;
pub mod format;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod report;
pub mod sanitize;
pub mod scoring;
pub mod validation;

pub use audit::{
    AuditError, AuditMetadata, AuditOptions, AuditReport, CompliancePlugin, Finding,
    PluginReport, PluginSummary, build_registry, run_audit,
};
pub use deadline::{Deadline, DeadlineExceeded};
pub use diff::{
    Change, DiffCounts, DiffError, DiffMetadata, DiffOptions, DiffResult, diff,
};
pub use enums::{
    AuditMode, Category, ChangeKind, FindingSeverity, Impact, SanitizeMode, Section, SectionError,
};
pub use model::Document;
pub use parse::{DocumentError, ParseError, XmlElement, parse, parse_and_validate, parse_tree};
pub use report::{
    MAX_DESCRIPTION_LENGTH, ReportError, ReportOptions, ReportSection, ReportTable, ReportTree,
    compose_report, escape_pipes, render_json, render_markdown, render_yaml, truncate_runes,
};
pub use sanitize::{
    Mapper, REDACTED, SanitizeError, SanitizeOptions, SanitizeOutcome, SanitizeStats, sanitize,
};
pub use scoring::{Score, ScoreContext, score};
pub use validation::{ValidationError, validate_document};

/// Returns the current version of the opnscope-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
