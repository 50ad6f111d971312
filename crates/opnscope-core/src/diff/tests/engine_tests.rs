use super::super::engine::diff;
use super::super::types::{DiffError, DiffOptions};
use super::{doc_with_rules, metadata, named_user, no_deadline, options, rule};
use crate::enums::{ChangeKind, Impact, Section};
use crate::model::{Document, Interface};

// ---------------------------------------------------------------------------
// identity diff
// ---------------------------------------------------------------------------

#[test]
fn identical_documents_produce_an_empty_result() {
    let doc = doc_with_rules(vec![rule("r1", "10.0.0.0/24", "443")]);
    let result = diff(&doc, &doc, &options(), metadata(), &no_deadline()).expect("diff");
    assert!(result.is_empty(), "changes: {:?}", result.changes);
    assert_eq!(result.counts.by_impact.high, 0);
    assert_eq!(result.counts.by_impact.medium, 0);
    assert_eq!(result.counts.by_impact.low, 0);
    assert_eq!(result.counts.by_impact.none, 0);
}

#[test]
fn by_section_always_covers_requested_sections() {
    let doc = Document::default();
    let result = diff(&doc, &doc, &options(), metadata(), &no_deadline()).expect("diff");
    assert_eq!(result.counts.by_section.len(), Section::ALL.len());
    assert!(result.counts.by_section.iter().all(|s| s.changes == 0));
}

#[test]
fn diff_is_deterministic_across_runs() {
    let old = doc_with_rules(vec![rule("r1", "10.0.0.0/24", "443"), rule("r2", "any", "80")]);
    let mut new = old.clone();
    new.firewall_rules[0].source.net = "any".to_owned();
    new.users = vec![named_user("eve")];

    let first = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let second = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// added / removed / modified
// ---------------------------------------------------------------------------

#[test]
fn added_entity_carries_summary_in_new_value() {
    let old = Document::default();
    let new = doc_with_rules(vec![rule("r1", "10.0.0.0/24", "443")]);
    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let change = result
        .changes
        .iter()
        .find(|c| c.kind == ChangeKind::Added)
        .expect("one added change");
    assert_eq!(change.entity_key, "r1");
    assert!(change.field_path.is_none());
    assert!(change.old_value.is_none());
    assert!(
        change.new_value.as_deref().is_some_and(|v| v.contains("pass")),
        "summary: {:?}",
        change.new_value
    );
}

#[test]
fn empty_section_on_one_side_emits_one_removed_per_entity() {
    let old = doc_with_rules(vec![rule("r1", "a", "1"), rule("r2", "b", "2")]);
    let new = Document::default();
    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let removed: Vec<_> = result
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Removed)
        .collect();
    assert_eq!(removed.len(), 2);
    assert!(removed.iter().all(|c| c.field_path.is_none()));
}

/// Scenario: rule r1's source widens from a /24 to `any`.
#[test]
fn rule_widening_scores_high_with_field_path() {
    let old = doc_with_rules(vec![rule("r1", "10.0.0.0/24", "443")]);
    let mut new = old.clone();
    new.firewall_rules[0].source.net = "any".to_owned();

    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
    let change = &result.changes[0];
    assert_eq!(change.kind, ChangeKind::Modified);
    assert_eq!(
        change.field_path.as_deref(),
        Some("firewall.rules[r1].source")
    );
    assert_eq!(change.old_value.as_deref(), Some("10.0.0.0/24"));
    assert_eq!(change.new_value.as_deref(), Some("any"));
    assert_eq!(change.impact, Impact::High);
    assert!(
        change.rationale.contains("source widened to any"),
        "rationale: {}",
        change.rationale
    );
}

#[test]
fn modified_changes_walk_fields_in_declared_order() {
    let old = doc_with_rules(vec![rule("r1", "10.0.0.0/24", "443")]);
    let mut new = old.clone();
    new.firewall_rules[0].protocol = "udp".to_owned();
    new.firewall_rules[0].descr = "changed".to_owned();

    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let paths: Vec<&str> = result
        .changes
        .iter()
        .filter_map(|c| c.field_path.as_deref())
        .collect();
    assert_eq!(
        paths,
        vec!["firewall.rules[r1].descr", "firewall.rules[r1].protocol"],
        "field paths sort within the entity"
    );
}

// ---------------------------------------------------------------------------
// normalization
// ---------------------------------------------------------------------------

#[test]
fn equal_after_normalization_is_not_emitted() {
    let mut old = Document::default();
    old.interfaces = vec![Interface {
        name: "lan".to_owned(),
        ipaddr: "192.168.001.001".to_owned(),
        ..Interface::default()
    }];
    let mut new = old.clone();
    new.interfaces[0].ipaddr = "192.168.1.1".to_owned();

    let strict = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    assert_eq!(strict.counts.by_kind.modified, 1, "without normalization");

    let normalized = diff(
        &old,
        &new,
        &DiffOptions {
            normalize: true,
            ..DiffOptions::default()
        },
        metadata(),
        &no_deadline(),
    )
    .expect("diff");
    assert!(normalized.is_empty(), "changes: {:?}", normalized.changes);
}

// ---------------------------------------------------------------------------
// security_only
// ---------------------------------------------------------------------------

#[test]
fn security_only_suppresses_none_but_keeps_counts() {
    let mut old = Document::default();
    old.system.hostname = "fw01".to_owned();
    old.system.next_uid = "2000".to_owned();
    let mut new = old.clone();
    new.system.next_uid = "2001".to_owned();

    let result = diff(
        &old,
        &new,
        &DiffOptions {
            security_only: true,
            ..DiffOptions::default()
        },
        metadata(),
        &no_deadline(),
    )
    .expect("diff");

    assert!(result.changes.is_empty(), "changes: {:?}", result.changes);
    let system_count = result
        .counts
        .by_section
        .iter()
        .find(|s| s.section == Section::System)
        .expect("system section count");
    assert_eq!(system_count.changes, 1, "suppressed change still counted");
    assert_eq!(result.counts.by_impact.none, 1);
}

// ---------------------------------------------------------------------------
// section selection
// ---------------------------------------------------------------------------

#[test]
fn reserved_section_returns_not_implemented_error() {
    let doc = Document::default();
    let err = diff(
        &doc,
        &doc,
        &DiffOptions {
            sections: vec!["dns".to_owned()],
            ..DiffOptions::default()
        },
        metadata(),
        &no_deadline(),
    )
    .expect_err("dns must be rejected");
    let msg = err.to_string();
    assert!(msg.contains("not yet implemented"), "message: {msg}");
    assert!(msg.contains("firewall"), "message: {msg}");
}

#[test]
fn unknown_section_returns_error() {
    let doc = Document::default();
    let err = diff(
        &doc,
        &doc,
        &DiffOptions {
            sections: vec!["wireless".to_owned()],
            ..DiffOptions::default()
        },
        metadata(),
        &no_deadline(),
    )
    .expect_err("unknown section must be rejected");
    assert!(matches!(err, DiffError::Section(_)));
}

#[test]
fn section_filter_limits_comparison() {
    let mut old = Document::default();
    old.users = vec![named_user("alice")];
    let mut new = Document::default();
    new.users = vec![named_user("bob")];
    new.firewall_rules = vec![rule("r1", "any", "80")];

    let result = diff(
        &old,
        &new,
        &DiffOptions {
            sections: vec!["users".to_owned()],
            ..DiffOptions::default()
        },
        metadata(),
        &no_deadline(),
    )
    .expect("diff");
    assert!(
        result.changes.iter().all(|c| c.section == Section::Users),
        "changes: {:?}",
        result.changes
    );
    assert_eq!(result.counts.by_section.len(), 1);
}

// ---------------------------------------------------------------------------
// identity collisions
// ---------------------------------------------------------------------------

#[test]
fn duplicate_key_in_new_second_wins_first_recorded_removed() {
    let old = Document::default();
    let mut first = rule("r1", "10.0.0.0/24", "443");
    first.descr = "first".to_owned();
    let mut second = rule("r1", "any", "80");
    second.descr = "second".to_owned();
    let new = doc_with_rules(vec![first, second]);

    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let added: Vec<_> = result
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Added)
        .collect();
    let removed: Vec<_> = result
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Removed)
        .collect();
    assert_eq!(added.len(), 1);
    assert!(
        added[0].new_value.as_deref().is_some_and(|v| v.contains("any")),
        "second occurrence wins: {:?}",
        added[0].new_value
    );
    assert_eq!(removed.len(), 1, "first occurrence recorded as removed");
}

#[test]
fn duplicate_keys_on_both_sides_is_an_error() {
    let doc = doc_with_rules(vec![rule("r1", "a", "1"), rule("r1", "b", "2")]);
    let err = diff(&doc, &doc, &options(), metadata(), &no_deadline())
        .expect_err("both-side duplicate must fail");
    match err {
        DiffError::DuplicateKey { section, key } => {
            assert_eq!(section, Section::Firewall);
            assert_eq!(key, "r1");
        }
        other => panic!("expected DuplicateKey, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// composite key fallback
// ---------------------------------------------------------------------------

#[test]
fn missing_uuid_falls_back_to_composite_key_with_note() {
    let mut bare = rule("unused", "10.0.0.0/24", "443");
    bare.uuid = None;
    let old = doc_with_rules(vec![bare.clone()]);
    let mut changed = bare;
    changed.descr = "edited".to_owned();
    let new = doc_with_rules(vec![changed]);

    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    assert_eq!(result.counts.by_kind.modified, 1);
    assert_eq!(
        result.notes.len(),
        1,
        "composite-key note emitted once: {:?}",
        result.notes
    );
    assert!(result.notes[0].contains("composite key"));
    let change = &result.changes[0];
    assert!(
        change.entity_key.contains('|'),
        "composite key: {}",
        change.entity_key
    );
}

// ---------------------------------------------------------------------------
// ordering
// ---------------------------------------------------------------------------

#[test]
fn changes_sort_by_section_kind_key_field() {
    let mut old = Document::default();
    old.system.hostname = "fw01".to_owned();
    old.users = vec![named_user("alice")];
    old.firewall_rules = vec![rule("r1", "10.0.0.0/24", "443")];

    let mut new = old.clone();
    new.system.hostname = "fw02".to_owned();
    new.users = vec![named_user("bob")];
    new.firewall_rules[0].source.net = "any".to_owned();
    new.firewall_rules.push(rule("r2", "b", "2"));

    let result = diff(&old, &new, &options(), metadata(), &no_deadline()).expect("diff");
    let keys: Vec<(Section, ChangeKind, &str)> = result
        .changes
        .iter()
        .map(|c| (c.section, c.kind, c.entity_key.as_str()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "changes must already be sorted");

    // System precedes firewall, which precedes users, per the fixed order.
    assert_eq!(keys.first().map(|k| k.0), Some(Section::System));
    assert_eq!(keys.last().map(|k| k.0), Some(Section::Users));
}
