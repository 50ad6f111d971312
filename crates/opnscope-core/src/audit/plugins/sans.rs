//! SANS-style perimeter hygiene checks.
use regex::Regex;

use crate::audit::{CompliancePlugin, Finding};
use crate::enums::FindingSeverity;
use crate::model::Document;

/// SANS rule set.
pub struct SansPlugin {
    rfc1918: Regex,
}

impl SansPlugin {
    /// Compiles the plugin's patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error; the registry excludes the
    /// plugin and records a warning in that case.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            rfc1918: Regex::new(r"^(10\.|172\.(1[6-9]|2\d|3[01])\.|192\.168\.)")?,
        })
    }

    fn finding(
        severity: FindingSeverity,
        title: &str,
        description: String,
        component: Option<String>,
        recommendation: &str,
    ) -> Finding {
        Finding {
            plugin: "sans".to_owned(),
            severity,
            title: title.to_owned(),
            description,
            component,
            recommendation: Some(recommendation.to_owned()),
        }
    }
}

impl CompliancePlugin for SansPlugin {
    fn id(&self) -> &'static str {
        "sans"
    }

    fn evaluate(&self, document: &Document) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (index, rule) in document.firewall_rules.iter().enumerate() {
            let key = rule
                .uuid
                .clone()
                .unwrap_or_else(|| format!("#{index}"));

            if rule.action == "pass"
                && !rule.disabled
                && rule.source.is_any()
                && rule.destination.is_any()
            {
                findings.push(Self::finding(
                    FindingSeverity::Critical,
                    "Unrestricted pass rule",
                    format!(
                        "Rule '{key}' passes any source to any destination on '{}'.",
                        rule.interface
                    ),
                    Some(format!("firewall.rules[{key}]")),
                    "Scope the rule to the networks and services that need it.",
                ));
            }

            if matches!(rule.action.as_str(), "block" | "reject") && !rule.disabled && !rule.log {
                findings.push(Self::finding(
                    FindingSeverity::Medium,
                    "Block rule does not log",
                    format!(
                        "Rule '{key}' drops traffic silently; denied traffic is a \
                         primary detection signal."
                    ),
                    Some(format!("firewall.rules[{key}]")),
                    "Enable logging on block and reject rules.",
                ));
            }
        }

        // Perimeter interfaces should carry an explicit final deny.
        let wan_has_block = document.firewall_rules.iter().any(|rule| {
            rule.interface == "wan"
                && matches!(rule.action.as_str(), "block" | "reject")
                && !rule.disabled
        });
        let wan_exists = document.interfaces.iter().any(|i| i.name == "wan");
        if wan_exists && !wan_has_block {
            findings.push(Self::finding(
                FindingSeverity::High,
                "No explicit deny rule on the WAN interface",
                "The WAN interface has no enabled block or reject rule; the policy \
                 relies entirely on the implicit default."
                    .to_owned(),
                Some("firewall".to_owned()),
                "Add an explicit, logging default-deny rule on WAN.",
            ));
        }

        if document.system.ntp_servers.is_empty() {
            findings.push(Self::finding(
                FindingSeverity::Medium,
                "No NTP servers configured",
                "Unsynchronized clocks corrupt log correlation and certificate \
                 validation."
                    .to_owned(),
                Some("system.timeservers".to_owned()),
                "Configure at least two NTP servers.",
            ));
        }

        if document.system.dns_servers.is_empty() {
            findings.push(Self::finding(
                FindingSeverity::Low,
                "No DNS resolvers configured",
                "The firewall resolves through whatever the upstream hands out, which \
                 is outside policy control."
                    .to_owned(),
                Some("system.dnsserver".to_owned()),
                "Pin the resolvers the security policy expects.",
            ));
        }

        for scope in &document.dhcp {
            if scope.enabled && (scope.range_from.is_empty() || scope.range_to.is_empty()) {
                findings.push(Self::finding(
                    FindingSeverity::Low,
                    "DHCP scope enabled without a range",
                    format!(
                        "Scope '{}' is enabled but its dynamic range is incomplete.",
                        scope.interface
                    ),
                    Some(format!("dhcp[scope:{}]", scope.interface)),
                    "Define the full dynamic range or disable the scope.",
                ));
            }
        }

        // Port forwards into RFC 1918 space from `any` deserve review.
        for (index, entry) in document.nat_rules.iter().enumerate() {
            let key = entry
                .uuid
                .clone()
                .unwrap_or_else(|| format!("#{index}"));
            if !entry.disabled
                && entry.source == "any"
                && self.rfc1918.is_match(&entry.target)
            {
                findings.push(Self::finding(
                    FindingSeverity::Medium,
                    "Port forward exposes an internal host to any source",
                    format!(
                        "NAT entry '{key}' forwards from any source to internal host {}.",
                        entry.target
                    ),
                    Some(format!("nat.rules[{key}]")),
                    "Restrict the forward's source, or front the service properly.",
                ));
            }
        }

        findings
    }
}
