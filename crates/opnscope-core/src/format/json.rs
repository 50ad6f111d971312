//! JSON rendering: a direct serialization of the diff result.
use crate::diff::DiffResult;

/// Serializes the result as pretty JSON (2-space indent, stable field
/// order from the struct declarations).
pub fn render(result: &DiffResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::diff::{Change, DiffCounts, DiffMetadata};
    use crate::enums::{ChangeKind, Impact, Section};

    #[test]
    fn serializes_changes_with_stable_fields() {
        let result = DiffResult {
            metadata: DiffMetadata {
                old_file: "a.xml".to_owned(),
                new_file: "b.xml".to_owned(),
                generated_at: "2026-08-01T00:00:00Z".to_owned(),
            },
            changes: vec![Change {
                section: Section::Users,
                kind: ChangeKind::Added,
                entity_key: "eve".to_owned(),
                field_path: None,
                old_value: None,
                new_value: Some("user eve (groups: )".to_owned()),
                impact: Impact::Medium,
                rationale: "[USER-CHANGE] user account added".to_owned(),
            }],
            counts: DiffCounts::default(),
            notes: Vec::new(),
        };
        let json = render(&result);
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["metadata"]["old_file"], "a.xml");
        assert_eq!(value["changes"][0]["section"], "users");
        assert_eq!(value["changes"][0]["kind"], "added");
        assert_eq!(value["changes"][0]["impact"], "medium");
        assert!(
            value["changes"][0].get("field_path").is_none(),
            "absent optionals are omitted: {json}"
        );
    }
}
