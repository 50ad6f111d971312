//! The comparison algorithm.
use std::collections::{HashMap, HashSet};

use crate::deadline::Deadline;
use crate::enums::{ChangeKind, Impact, Section};
use crate::model::Document;
use crate::normalize::normalize_leaf;
use crate::scoring::{ScoreContext, score};

use super::fields::{Entity, SectionEntities, extract, field_path};
use super::lcs::stable_keys;
use super::types::{
    Change, DiffCounts, DiffError, DiffMetadata, DiffOptions, DiffResult, SectionCount,
};

/// Compares two parsed configurations and returns the ordered change set.
///
/// `old` is the baseline ("before"); `new` is the target ("after").
/// `metadata` is supplied by the caller — the engine never reads the clock
/// or the filesystem, which keeps its output byte-identical for identical
/// inputs and options.
///
/// # Algorithm
///
/// Per section, in the fixed enumeration order:
///
/// 1. Extract entities with their identity keys.
/// 2. Partition into added (new only), removed (old only), and common keys.
/// 3. For each common entity walk the fixed field list in declared order and
///    emit one `Modified` change per differing field (values are normalized
///    first when the `normalize` option is set).
/// 4. With `detect_order`, emit `Reordered` for common keys outside the
///    longest common subsequence of the two key orderings, unless the key
///    already has a `Modified` change (the modification subsumes the move).
/// 5. Score every change; sort by `(section, kind, entity key, field path)`.
///
/// The deadline is checked once per section boundary.
///
/// # Errors
///
/// - [`DiffError::Section`] when a requested section name is reserved
///   (`dns`, `vpn`, `certificates`) or unknown.
/// - [`DiffError::DuplicateKey`] when the same identity key is duplicated
///   in both inputs simultaneously.
/// - [`DiffError::Cancelled`] when the deadline expires.
pub fn diff(
    old: &Document,
    new: &Document,
    options: &DiffOptions,
    metadata: DiffMetadata,
    deadline: &Deadline,
) -> Result<DiffResult, DiffError> {
    let sections = resolve_sections(&options.sections)?;

    let mut changes: Vec<Change> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    let mut by_section: Vec<SectionCount> = Vec::new();

    for section in sections {
        deadline.check()?;
        let section_changes = diff_section(old, new, section, options, &mut notes)?;
        by_section.push(SectionCount {
            section,
            changes: section_changes.len(),
        });
        changes.extend(section_changes);
    }

    changes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut counts = DiffCounts {
        by_section,
        ..DiffCounts::default()
    };
    for change in &changes {
        match change.impact {
            Impact::High => counts.by_impact.high += 1,
            Impact::Medium => counts.by_impact.medium += 1,
            Impact::Low => counts.by_impact.low += 1,
            Impact::None => counts.by_impact.none += 1,
        }
        match change.kind {
            ChangeKind::Added => counts.by_kind.added += 1,
            ChangeKind::Removed => counts.by_kind.removed += 1,
            ChangeKind::Modified => counts.by_kind.modified += 1,
            ChangeKind::Reordered => counts.by_kind.reordered += 1,
        }
    }

    if options.security_only {
        changes.retain(|change| change.impact != Impact::None);
    }

    Ok(DiffResult {
        metadata,
        changes,
        counts,
        notes,
    })
}

/// Resolves requested section names, or defaults to every implemented
/// section in the fixed order.
fn resolve_sections(requested: &[String]) -> Result<Vec<Section>, DiffError> {
    if requested.is_empty() {
        return Ok(Section::ALL.to_vec());
    }
    let mut resolved: Vec<Section> = Vec::with_capacity(requested.len());
    for name in requested {
        let section = Section::resolve(name)?;
        if !resolved.contains(&section) {
            resolved.push(section);
        }
    }
    // Comparison always runs in the fixed enumeration order regardless of
    // the order the sections were requested in.
    resolved.sort();
    Ok(resolved)
}

/// Index of a section's entities: key → position, last occurrence winning.
///
/// Returns the keyed map, the key order (deduplicated, document order), and
/// the keys of entities that lost a collision (first occurrences).
struct KeyedEntities<'a> {
    by_key: HashMap<&'a str, &'a Entity>,
    order: Vec<String>,
    shadowed: Vec<&'a Entity>,
    duplicated: HashSet<String>,
}

fn key_entities(section_entities: &SectionEntities) -> KeyedEntities<'_> {
    let mut by_key: HashMap<&str, &Entity> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut shadowed: Vec<&Entity> = Vec::new();
    let mut duplicated: HashSet<String> = HashSet::new();
    for entity in &section_entities.entities {
        if let Some(previous) = by_key.insert(entity.key.as_str(), entity) {
            duplicated.insert(entity.key.clone());
            shadowed.push(previous);
        } else {
            order.push(entity.key.clone());
        }
    }
    KeyedEntities {
        by_key,
        order,
        shadowed,
        duplicated,
    }
}

fn diff_section(
    old: &Document,
    new: &Document,
    section: Section,
    options: &DiffOptions,
    notes: &mut Vec<String>,
) -> Result<Vec<Change>, DiffError> {
    let old_entities = extract(old, section);
    let new_entities = extract(new, section);

    for note in old_entities.notes.iter().chain(&new_entities.notes) {
        if !notes.contains(note) {
            notes.push(note.clone());
        }
    }

    let old_keyed = key_entities(&old_entities);
    let new_keyed = key_entities(&new_entities);

    // A key duplicated on both sides at once makes matching ambiguous in
    // both directions; that is an invariant break, not a content change.
    if let Some(key) = old_keyed
        .duplicated
        .intersection(&new_keyed.duplicated)
        .min()
    {
        return Err(DiffError::DuplicateKey {
            section,
            key: key.clone(),
        });
    }

    let mut changes: Vec<Change> = Vec::new();

    // Within `new`, the second entity wins its key; the shadowed first
    // occurrence is recorded as removed so it does not vanish silently.
    for entity in &new_keyed.shadowed {
        changes.push(make_entity_change(section, ChangeKind::Removed, entity));
    }
    for entity in &old_keyed.shadowed {
        changes.push(make_entity_change(section, ChangeKind::Removed, entity));
    }

    let mut modified_keys: HashSet<&str> = HashSet::new();

    for key in &new_keyed.order {
        if old_keyed.by_key.contains_key(key.as_str()) {
            continue;
        }
        let entity = new_keyed.by_key[key.as_str()];
        changes.push(make_entity_change(section, ChangeKind::Added, entity));
    }
    for key in &old_keyed.order {
        if new_keyed.by_key.contains_key(key.as_str()) {
            continue;
        }
        let entity = old_keyed.by_key[key.as_str()];
        changes.push(make_entity_change(section, ChangeKind::Removed, entity));
    }

    for key in &new_keyed.order {
        let Some(old_entity) = old_keyed.by_key.get(key.as_str()) else {
            continue;
        };
        let new_entity = new_keyed.by_key[key.as_str()];
        for &(field, ref new_value) in &new_entity.fields {
            let old_value = old_entity.field(field).unwrap_or("");
            let differs = if options.normalize {
                normalize_leaf(old_value) != normalize_leaf(new_value)
            } else {
                old_value != new_value
            };
            if !differs {
                continue;
            }
            modified_keys.insert(key.as_str());
            let scored = score(&ScoreContext {
                section,
                kind: ChangeKind::Modified,
                entity_key: key,
                field: Some(field),
                old_value: Some(old_value),
                new_value: Some(new_value),
                entity_summary: Some(&new_entity.summary),
            });
            changes.push(Change {
                section,
                kind: ChangeKind::Modified,
                entity_key: key.clone(),
                field_path: Some(field_path(section, key, field)),
                old_value: Some(old_value.to_owned()),
                new_value: Some(new_value.clone()),
                impact: scored.impact,
                rationale: scored.rationale,
            });
        }
    }

    if options.detect_order {
        let common_old: Vec<String> = old_keyed
            .order
            .iter()
            .filter(|key| new_keyed.by_key.contains_key(key.as_str()))
            .cloned()
            .collect();
        let common_new: Vec<String> = new_keyed
            .order
            .iter()
            .filter(|key| old_keyed.by_key.contains_key(key.as_str()))
            .cloned()
            .collect();
        let stable = stable_keys(&common_old, &common_new);
        for key in &common_new {
            if stable.contains(key) || modified_keys.contains(key.as_str()) {
                continue;
            }
            let entity = new_keyed.by_key[key.as_str()];
            let scored = score(&ScoreContext {
                section,
                kind: ChangeKind::Reordered,
                entity_key: key,
                field: None,
                old_value: None,
                new_value: None,
                entity_summary: Some(&entity.summary),
            });
            changes.push(Change {
                section,
                kind: ChangeKind::Reordered,
                entity_key: key.clone(),
                field_path: None,
                old_value: None,
                new_value: None,
                impact: scored.impact,
                rationale: scored.rationale,
            });
        }
    }

    Ok(changes)
}

/// Builds an entity-level (`Added`/`Removed`) change.
///
/// The entity summary travels in `new_value` for additions and `old_value`
/// for removals so formatters and the scorer can describe the entity
/// without access to the documents.
fn make_entity_change(section: Section, kind: ChangeKind, entity: &Entity) -> Change {
    let (old_value, new_value) = match kind {
        ChangeKind::Added => (None, Some(entity.summary.clone())),
        ChangeKind::Removed => (Some(entity.summary.clone()), None),
        ChangeKind::Modified | ChangeKind::Reordered => (None, None),
    };
    let scored = score(&ScoreContext {
        section,
        kind,
        entity_key: &entity.key,
        field: None,
        old_value: old_value.as_deref(),
        new_value: new_value.as_deref(),
        entity_summary: Some(&entity.summary),
    });
    Change {
        section,
        kind,
        entity_key: entity.key.clone(),
        field_path: None,
        old_value,
        new_value,
        impact: scored.impact,
        rationale: scored.rationale,
    }
}
