//! Public types of the diff engine.
use std::fmt;

use serde::Serialize;

use crate::deadline::DeadlineExceeded;
use crate::enums::{ChangeKind, Impact, Section, SectionError};

/// Options controlling one comparison.
///
/// Populated once by the command wiring and passed by reference; no engine
/// reads process-wide state.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Section names to compare. Empty means every implemented section.
    /// Reserved or unknown names surface as [`DiffError::Section`].
    pub sections: Vec<String>,
    /// Suppress changes whose impact is `none` from the change list.
    pub security_only: bool,
    /// Canonicalize values before comparison (IP forms, booleans, port
    /// ranges, whitespace).
    pub normalize: bool,
    /// Detect entities that moved within their section without content
    /// change.
    pub detect_order: bool,
}

/// A single atomic difference between the two configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Section the change belongs to.
    pub section: Section,
    /// Added, removed, modified, or reordered.
    pub kind: ChangeKind,
    /// Stable identity of the affected entity.
    pub entity_key: String,
    /// Dotted field path; present only for `Modified` changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
    /// Previous value (`Modified`), or a one-line summary of the removed
    /// entity (`Removed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// New value (`Modified`), or a one-line summary of the added entity
    /// (`Added`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Security impact, assigned by the scorer and never mutated afterwards.
    pub impact: Impact,
    /// Short human rationale referencing the matched pattern id.
    pub rationale: String,
}

impl Change {
    /// Sort key implementing the stable output order: section in the fixed
    /// enumeration, then kind, then entity key, then field path.
    pub(super) fn sort_key(&self) -> (Section, ChangeKind, &str, &str) {
        (
            self.section,
            self.kind,
            self.entity_key.as_str(),
            self.field_path.as_deref().unwrap_or(""),
        )
    }
}

/// Provenance of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DiffMetadata {
    /// Label of the baseline input (file path or `-`).
    pub old_file: String,
    /// Label of the target input.
    pub new_file: String,
    /// Timestamp supplied by the caller; the engine never reads the clock,
    /// keeping its output byte-identical across runs.
    pub generated_at: String,
}

/// Change totals per impact level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ImpactCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

/// Change totals per change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct KindCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub reordered: usize,
}

/// Change total for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    /// The section.
    pub section: Section,
    /// Number of detected changes, including any suppressed by
    /// `security_only`.
    pub changes: usize,
}

/// All counters of a [`DiffResult`].
///
/// Counts cover every *detected* change: a change suppressed from the list
/// by `security_only` still counts here, so summaries stay accurate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DiffCounts {
    /// Per-impact totals.
    pub by_impact: ImpactCounts,
    /// Per-section totals, in the fixed section order. Sections with zero
    /// changes are included so consumers can iterate a stable shape.
    pub by_section: Vec<SectionCount>,
    /// Per-kind totals.
    pub by_kind: KindCounts,
}

/// The complete result of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// Provenance of the comparison.
    pub metadata: DiffMetadata,
    /// Ordered changes; see [`Change::sort_key`] for the order.
    pub changes: Vec<Change>,
    /// Counters over all detected changes.
    pub counts: DiffCounts,
    /// Diagnostic notes (e.g. rules matched by composite key because the
    /// UUID was missing). At most one note per cause per input pair.
    pub notes: Vec<String>,
}

impl DiffResult {
    /// Returns `true` if no changes were detected at all.
    pub fn is_empty(&self) -> bool {
        let kinds = &self.counts.by_kind;
        kinds.added == 0 && kinds.removed == 0 && kinds.modified == 0 && kinds.reordered == 0
    }
}

/// Failure of the diff engine.
///
/// Content differences are never errors — they are changes. Errors cover
/// invalid section requests, identity invariant breaks, and cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A requested section name is reserved or unknown.
    Section(SectionError),
    /// The same identity key is duplicated in both inputs simultaneously,
    /// so matching would be ambiguous on both sides.
    DuplicateKey {
        /// Section the collision occurred in.
        section: Section,
        /// The colliding key.
        key: String,
    },
    /// The per-invocation deadline expired.
    Cancelled(DeadlineExceeded),
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(e) => e.fmt(f),
            Self::DuplicateKey { section, key } => write!(
                f,
                "duplicate identity key '{key}' in section '{section}' on both sides"
            ),
            Self::Cancelled(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for DiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Section(e) => Some(e),
            Self::Cancelled(e) => Some(e),
            Self::DuplicateKey { .. } => None,
        }
    }
}

impl From<SectionError> for DiffError {
    fn from(e: SectionError) -> Self {
        Self::Section(e)
    }
}

impl From<DeadlineExceeded> for DiffError {
    fn from(e: DeadlineExceeded) -> Self {
        Self::Cancelled(e)
    }
}
