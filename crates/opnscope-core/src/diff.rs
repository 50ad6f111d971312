//! Semantic diff engine: content-aware comparison of two parsed
//! configurations with stable identity matching, per-section field deltas,
//! reorder detection, and security-impact scoring.
mod engine;
mod fields;
mod lcs;
mod types;

#[cfg(test)]
mod tests;

pub use engine::diff;
pub use types::{
    Change, DiffCounts, DiffError, DiffMetadata, DiffOptions, DiffResult, ImpactCounts,
    KindCounts, SectionCount,
};
