//! Security-impact scoring for diff changes.
//!
//! A finite, ordered pattern library maps a [`ScoreContext`] (one change,
//! fully described — the scorer never rereads the documents) to an
//! [`Impact`] and a short rationale referencing the matched pattern id.
//! Evaluation stops at the first matching pattern; the library is ordered
//! most severe first, with the ignore list in front so noise never
//! escalates.
use crate::enums::{ChangeKind, Impact, Section};

/// Everything the scorer may look at for one change.
///
/// Entity-level changes (add/remove/reorder) carry no field, but do carry a
/// one-line `entity_summary` so the pattern library can still reason about
/// what the entity is (a disabled block rule, a permissive pass rule, ...).
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// Section the change belongs to.
    pub section: Section,
    /// The change kind.
    pub kind: ChangeKind,
    /// Stable identity of the entity.
    pub entity_key: &'a str,
    /// Bare field name for `Modified` changes.
    pub field: Option<&'a str>,
    /// Old value, when present.
    pub old_value: Option<&'a str>,
    /// New value, when present.
    pub new_value: Option<&'a str>,
    /// One-line summary of the affected entity.
    pub entity_summary: Option<&'a str>,
}

/// The scorer's verdict for one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Assigned impact; never mutated after scoring.
    pub impact: Impact,
    /// Identifier of the matched pattern.
    pub pattern_id: &'static str,
    /// Short human rationale referencing the pattern.
    pub rationale: String,
}

impl Score {
    fn new(impact: Impact, pattern_id: &'static str, rationale: impl Into<String>) -> Self {
        Self {
            impact,
            pattern_id,
            rationale: rationale.into(),
        }
    }
}

/// Fields whose changes are pure noise: allocation counters and timestamps.
const IGNORED_FIELDS: [&str; 3] = ["nextuid", "nextgid", "revision.time"];

/// Protocols considered encrypted for downgrade detection.
const ENCRYPTED: [&str; 4] = ["https", "ssh", "tls", "ftps"];
/// Plaintext counterparts.
const PLAINTEXT: [&str; 4] = ["http", "telnet", "ftp", "rsh"];

/// Scores one change.
///
/// Pure: same context, same score. The pattern id lands in the rationale so
/// report readers can trace why a change was rated the way it was.
pub fn score(ctx: &ScoreContext<'_>) -> Score {
    // Ignore list first so counters and timestamps never escalate.
    if let Some(field) = ctx.field {
        if IGNORED_FIELDS.contains(&field) {
            return Score::new(
                Impact::None,
                "IGN-NOISE",
                format!("[IGN-NOISE] {field} is an ignorable counter or timestamp"),
            );
        }
    }

    if let Some(high) = score_high(ctx) {
        return high;
    }
    if let Some(medium) = score_medium(ctx) {
        return medium;
    }
    score_low(ctx)
}

fn summary_is_block(ctx: &ScoreContext<'_>) -> bool {
    ctx.entity_summary
        .is_some_and(|s| s.starts_with("block") || s.starts_with("reject"))
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("1") | Some("yes") | Some("on"))
}

fn score_high(ctx: &ScoreContext<'_>) -> Option<Score> {
    // FW-ANY-ANY: a pass rule matching any source and any destination.
    if ctx.section == Section::Firewall {
        if ctx.kind == ChangeKind::Added {
            if let Some(summary) = ctx.entity_summary {
                if summary.starts_with("pass") && summary.contains("any -> any") {
                    return Some(Score::new(
                        Impact::High,
                        "FW-ANY-ANY",
                        "[FW-ANY-ANY] pass rule matches any source and any destination",
                    ));
                }
            }
        }
        if ctx.kind == ChangeKind::Modified {
            // Widening either endpoint to `any`.
            if matches!(ctx.field, Some("source") | Some("destination"))
                && ctx.new_value == Some("any")
                && ctx.old_value != Some("any")
            {
                let field = ctx.field.unwrap_or_default();
                return Some(Score::new(
                    Impact::High,
                    "FW-ANY-ANY",
                    format!("[FW-ANY-ANY] {field} widened to any"),
                ));
            }
            // FW-BLOCK-WEAKENED: a block rule disabled, or retyped to pass.
            if ctx.field == Some("disabled") && is_truthy(ctx.new_value) && summary_is_block(ctx)
            {
                return Some(Score::new(
                    Impact::High,
                    "FW-BLOCK-WEAKENED",
                    "[FW-BLOCK-WEAKENED] block rule was disabled",
                ));
            }
            if ctx.field == Some("type")
                && matches!(ctx.old_value, Some("block") | Some("reject"))
                && ctx.new_value == Some("pass")
            {
                return Some(Score::new(
                    Impact::High,
                    "FW-BLOCK-WEAKENED",
                    "[FW-BLOCK-WEAKENED] block rule retyped to pass",
                ));
            }
        }
        // Removing a block rule removes a control.
        if ctx.kind == ChangeKind::Removed && summary_is_block(ctx) {
            return Some(Score::new(
                Impact::High,
                "FW-BLOCK-WEAKENED",
                "[FW-BLOCK-WEAKENED] block rule removed",
            ));
        }
    }

    // PROTO-DOWNGRADE: encrypted service changed to a plaintext one.
    if ctx.kind == ChangeKind::Modified {
        let old = ctx.old_value.unwrap_or_default().to_ascii_lowercase();
        let new = ctx.new_value.unwrap_or_default().to_ascii_lowercase();
        if ENCRYPTED.contains(&old.as_str()) && PLAINTEXT.contains(&new.as_str()) {
            return Some(Score::new(
                Impact::High,
                "PROTO-DOWNGRADE",
                format!("[PROTO-DOWNGRADE] protocol downgraded from {old} to {new}"),
            ));
        }
    }

    // CERT-REMOVED: certificate or key material cleared or deleted.
    if let Some(field) = ctx.field {
        let cert_field = field.contains("cert") || field.contains("crt") || field == "authorizedkeys";
        if cert_field
            && ctx.old_value.is_some_and(|v| !v.is_empty())
            && ctx.new_value.is_none_or(str::is_empty)
        {
            return Some(Score::new(
                Impact::High,
                "CERT-REMOVED",
                format!("[CERT-REMOVED] {field} material was removed"),
            ));
        }
        // MFA-REMOVED: a user's second factor was unenrolled.
        if field == "otp_seed"
            && ctx.old_value.is_some_and(|v| !v.is_empty())
            && ctx.new_value.is_none_or(str::is_empty)
        {
            return Some(Score::new(
                Impact::High,
                "MFA-REMOVED",
                "[MFA-REMOVED] one-time-password seed removed; MFA no longer required",
            ));
        }
    }

    None
}

fn score_medium(ctx: &ScoreContext<'_>) -> Option<Score> {
    // USER-CHANGE: accounts appearing or disappearing.
    if ctx.section == Section::Users
        && matches!(ctx.kind, ChangeKind::Added | ChangeKind::Removed)
    {
        let verb = if ctx.kind == ChangeKind::Added {
            "added"
        } else {
            "removed"
        };
        return Some(Score::new(
            Impact::Medium,
            "USER-CHANGE",
            format!("[USER-CHANGE] user account {verb}"),
        ));
    }

    // NAT-CHANGE: exposure surface altered.
    if ctx.section == Section::Nat
        && matches!(ctx.kind, ChangeKind::Added | ChangeKind::Modified)
    {
        return Some(Score::new(
            Impact::Medium,
            "NAT-CHANGE",
            "[NAT-CHANGE] NAT entry added or modified",
        ));
    }

    // IPFAM-CHANGE: address family flipped.
    if ctx.kind == ChangeKind::Modified && ctx.field == Some("ipprotocol") {
        return Some(Score::new(
            Impact::Medium,
            "IPFAM-CHANGE",
            "[IPFAM-CHANGE] IP family changed",
        ));
    }

    // SCOPE-WIDEN: port range growth or network mask shortening.
    if ctx.kind == ChangeKind::Modified {
        if let (Some(field), Some(old), Some(new)) = (ctx.field, ctx.old_value, ctx.new_value) {
            if field.ends_with("port") && port_span(new) > port_span(old) {
                return Some(Score::new(
                    Impact::Medium,
                    "SCOPE-WIDEN",
                    format!("[SCOPE-WIDEN] port scope grew from {old} to {new}"),
                ));
            }
            if matches!(field, "source" | "destination" | "network") {
                if let (Some(old_prefix), Some(new_prefix)) = (cidr_prefix(old), cidr_prefix(new))
                {
                    if new_prefix < old_prefix {
                        return Some(Score::new(
                            Impact::Medium,
                            "SCOPE-WIDEN",
                            format!(
                                "[SCOPE-WIDEN] network mask shortened from /{old_prefix} to /{new_prefix}"
                            ),
                        ));
                    }
                }
            }
        }
    }

    // DHCP-RETARGET: a reservation now points somewhere else.
    if ctx.section == Section::Dhcp
        && ctx.kind == ChangeKind::Modified
        && matches!(ctx.field, Some("ipaddr") | Some("hostname"))
    {
        return Some(Score::new(
            Impact::Medium,
            "DHCP-RETARGET",
            "[DHCP-RETARGET] static reservation retargeted",
        ));
    }

    // FW-ORDER: rule evaluation is first-match, so moves matter.
    if ctx.kind == ChangeKind::Reordered
        && matches!(ctx.section, Section::Firewall | Section::Nat)
    {
        return Some(Score::new(
            Impact::Medium,
            "FW-ORDER",
            "[FW-ORDER] rule evaluation order changed",
        ));
    }

    // FW-MATCH-CHANGE: the matching predicate of a filter rule changed in a
    // way no higher pattern claimed.
    if ctx.section == Section::Firewall
        && ctx.kind == ChangeKind::Modified
        && matches!(
            ctx.field,
            Some("type")
                | Some("interface")
                | Some("protocol")
                | Some("source")
                | Some("source.port")
                | Some("destination")
                | Some("destination.port")
                | Some("disabled")
        )
    {
        return Some(Score::new(
            Impact::Medium,
            "FW-MATCH-CHANGE",
            "[FW-MATCH-CHANGE] rule match criteria changed",
        ));
    }

    None
}

fn score_low(ctx: &ScoreContext<'_>) -> Score {
    if matches!(ctx.field, Some("descr") | Some("description") | Some("comment")) {
        return Score::new(
            Impact::Low,
            "META-DESC",
            "[META-DESC] description or label change",
        );
    }
    Score::new(Impact::Low, "GEN-CHANGE", "[GEN-CHANGE] configuration change")
}

/// Number of ports covered by a port expression, for widening detection.
///
/// `""` and non-numeric aliases count as a single port so unknown forms
/// never register as widening.
fn port_span(value: &str) -> u32 {
    if value == "any" {
        return 65_536;
    }
    match value.split_once('-') {
        Some((lo, hi)) => {
            let lo = lo.trim().parse::<u32>().unwrap_or(0);
            let hi = hi.trim().parse::<u32>().unwrap_or(0);
            if hi >= lo && hi <= 65_535 {
                hi - lo + 1
            } else {
                1
            }
        }
        None => 1,
    }
}

/// Extracts the prefix length from a CIDR expression.
fn cidr_prefix(value: &str) -> Option<u8> {
    let (_, prefix) = value.split_once('/')?;
    prefix.parse::<u8>().ok().filter(|p| *p <= 128)
}
