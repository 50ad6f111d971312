//! Semantic validation of a parsed [`Document`].
//!
//! Runs only on the validate path ([`parse_and_validate`]
//! (crate::parse::parse_and_validate)); the display and diff paths accept
//! documents that would fail these checks. The validator collects every
//! violation rather than failing fast.
use std::collections::HashSet;
use std::fmt;

use crate::model::Document;
use crate::normalize::{canonical_ip, canonical_ipv4, canonical_mac};

/// A single semantic violation, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the field (e.g. `firewall.rules[r1].type`).
    pub field_path: String,
    /// Why the value is invalid.
    pub reason: String,
}

impl ValidationError {
    fn new(field_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_path, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a document, returning every violation found.
///
/// An empty vector means the document is semantically sound.
pub fn validate_document(document: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_system(document, &mut errors);
    check_interfaces(document, &mut errors);
    check_firewall(document, &mut errors);
    check_nat(document, &mut errors);
    check_vlans(document, &mut errors);
    check_dhcp(document, &mut errors);
    check_users(document, &mut errors);
    check_routing(document, &mut errors);
    errors
}

fn check_system(document: &Document, errors: &mut Vec<ValidationError>) {
    let system = &document.system;
    if system.hostname.is_empty() {
        errors.push(ValidationError::new(
            "system.hostname",
            "hostname must not be empty",
        ));
    }
    if system.domain.is_empty() {
        errors.push(ValidationError::new(
            "system.domain",
            "domain must not be empty",
        ));
    }
    if !system.web_gui.protocol.is_empty()
        && system.web_gui.protocol != "http"
        && system.web_gui.protocol != "https"
    {
        errors.push(ValidationError::new(
            "system.webgui.protocol",
            format!(
                "unknown protocol '{}': expected http or https",
                system.web_gui.protocol
            ),
        ));
    }
    for (index, server) in system.dns_servers.iter().enumerate() {
        if canonical_ip(server).is_none() {
            errors.push(ValidationError::new(
                format!("system.dnsserver[{index}]"),
                format!("'{server}' is not an IP address"),
            ));
        }
    }
}

fn check_interfaces(document: &Document, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for interface in &document.interfaces {
        let path = format!("interfaces.{}", interface.name);
        if !seen.insert(interface.name.clone()) {
            errors.push(ValidationError::new(
                path.clone(),
                "duplicate interface name",
            ));
        }
        // Keywords (dhcp, track6, ...) are fine; a literal address must parse.
        let addr = interface.ipaddr.as_str();
        if !addr.is_empty()
            && !addr.chars().all(|c| c.is_ascii_alphabetic())
            && canonical_ip(addr).is_none()
        {
            errors.push(ValidationError::new(
                format!("{path}.ipaddr"),
                format!("'{addr}' is neither an address nor a keyword"),
            ));
        }
        if !interface.subnet.is_empty()
            && interface.subnet.parse::<u8>().map_or(true, |n| n > 32)
        {
            errors.push(ValidationError::new(
                format!("{path}.subnet"),
                format!("'{}' is not a valid IPv4 prefix length", interface.subnet),
            ));
        }
    }
}

fn check_firewall(document: &Document, errors: &mut Vec<ValidationError>) {
    for (index, rule) in document.firewall_rules.iter().enumerate() {
        let key = rule
            .uuid
            .clone()
            .unwrap_or_else(|| format!("#{index}"));
        let path = format!("firewall.rules[{key}]");
        if !matches!(rule.action.as_str(), "pass" | "block" | "reject") {
            errors.push(ValidationError::new(
                format!("{path}.type"),
                format!(
                    "unknown action '{}': expected pass, block, or reject",
                    rule.action
                ),
            ));
        }
        if rule.interface.is_empty() {
            errors.push(ValidationError::new(
                format!("{path}.interface"),
                "rule is not attached to an interface",
            ));
        }
    }
}

fn check_nat(document: &Document, errors: &mut Vec<ValidationError>) {
    for (index, entry) in document.nat_rules.iter().enumerate() {
        let key = entry
            .uuid
            .clone()
            .unwrap_or_else(|| format!("#{index}"));
        if entry.interface.is_empty() {
            errors.push(ValidationError::new(
                format!("nat.rules[{key}].interface"),
                "NAT entry is not attached to an interface",
            ));
        }
    }
}

fn check_vlans(document: &Document, errors: &mut Vec<ValidationError>) {
    for vlan in &document.vlans {
        let path = format!("vlans[{}.{}]", vlan.parent_if, vlan.tag);
        if vlan.parent_if.is_empty() {
            errors.push(ValidationError::new(
                format!("{path}.if"),
                "VLAN has no parent interface",
            ));
        }
        match vlan.tag.parse::<u16>() {
            Ok(tag) if (1..=4094).contains(&tag) => {}
            _ => errors.push(ValidationError::new(
                format!("{path}.tag"),
                format!("'{}' is not a VLAN tag in 1..=4094", vlan.tag),
            )),
        }
    }
}

fn check_dhcp(document: &Document, errors: &mut Vec<ValidationError>) {
    for scope in &document.dhcp {
        for (index, reservation) in scope.static_maps.iter().enumerate() {
            let path = format!("dhcpd.{}.staticmap[{index}]", scope.interface);
            if canonical_mac(&reservation.mac).is_none() {
                errors.push(ValidationError::new(
                    format!("{path}.mac"),
                    format!("'{}' is not a MAC address", reservation.mac),
                ));
            }
            if !reservation.ipaddr.is_empty() && canonical_ipv4(&reservation.ipaddr).is_none() {
                errors.push(ValidationError::new(
                    format!("{path}.ipaddr"),
                    format!("'{}' is not an IPv4 address", reservation.ipaddr),
                ));
            }
        }
    }
}

fn check_users(document: &Document, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (index, user) in document.users.iter().enumerate() {
        if user.name.is_empty() {
            errors.push(ValidationError::new(
                format!("system.user[{index}].name"),
                "user has no name",
            ));
            continue;
        }
        if !seen.insert(user.name.clone()) {
            errors.push(ValidationError::new(
                format!("system.user[{}]", user.name),
                "duplicate user name",
            ));
        }
    }
}

fn check_routing(document: &Document, errors: &mut Vec<ValidationError>) {
    for route in &document.routes {
        let path = format!("staticroutes[{}]", route.network);
        match route.network.split_once('/') {
            Some((addr, prefix)) => {
                let prefix_ok = prefix.parse::<u8>().is_ok_and(|n| n <= 128);
                if canonical_ip(addr).is_none() || !prefix_ok {
                    errors.push(ValidationError::new(
                        format!("{path}.network"),
                        format!("'{}' is not a network in CIDR form", route.network),
                    ));
                }
            }
            None => errors.push(ValidationError::new(
                format!("{path}.network"),
                format!("'{}' is not a network in CIDR form", route.network),
            )),
        }
        if route.gateway.is_empty() {
            errors.push(ValidationError::new(
                format!("{path}.gateway"),
                "route has no gateway",
            ));
        }
    }
}
