#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod engine_tests;

use crate::deadline::Deadline;
use crate::model::{Document, FirewallRule, RuleEndpoint, User};

use super::types::{DiffMetadata, DiffOptions};

/// Builds a pass rule with the given uuid, source network, and port.
pub(super) fn rule(uuid: &str, source: &str, port: &str) -> FirewallRule {
    FirewallRule {
        uuid: Some(uuid.to_owned()),
        action: "pass".to_owned(),
        interface: "wan".to_owned(),
        ip_protocol: "inet".to_owned(),
        protocol: "tcp".to_owned(),
        source: RuleEndpoint {
            net: source.to_owned(),
            port: String::new(),
        },
        destination: RuleEndpoint {
            net: "192.168.1.10".to_owned(),
            port: port.to_owned(),
        },
        descr: format!("rule {uuid}"),
        ..FirewallRule::default()
    }
}

pub(super) fn doc_with_rules(rules: Vec<FirewallRule>) -> Document {
    Document {
        firewall_rules: rules,
        ..Document::default()
    }
}

pub(super) fn named_user(name: &str) -> User {
    User {
        name: name.to_owned(),
        uid: "2000".to_owned(),
        ..User::default()
    }
}

pub(super) fn options() -> DiffOptions {
    DiffOptions::default()
}

pub(super) fn metadata() -> DiffMetadata {
    DiffMetadata {
        old_file: "old.xml".to_owned(),
        new_file: "new.xml".to_owned(),
        generated_at: "2026-08-01T00:00:00Z".to_owned(),
    }
}

pub(super) fn no_deadline() -> Deadline {
    Deadline::none()
}
