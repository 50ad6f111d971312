//! Firewall-hygiene checks: rule-set quality rather than outright
//! vulnerabilities.
use std::collections::HashMap;

use crate::audit::{CompliancePlugin, Finding};
use crate::enums::FindingSeverity;
use crate::model::Document;

/// Firewall hygiene rule set.
#[derive(Default)]
pub struct FirewallPlugin;

impl FirewallPlugin {
    /// Creates the plugin. Infallible — this rule set compiles no patterns.
    pub fn new() -> Self {
        Self
    }

    fn finding(
        severity: FindingSeverity,
        title: &str,
        description: String,
        component: Option<String>,
        recommendation: &str,
    ) -> Finding {
        Finding {
            plugin: "firewall".to_owned(),
            severity,
            title: title.to_owned(),
            description,
            component,
            recommendation: Some(recommendation.to_owned()),
        }
    }
}

impl CompliancePlugin for FirewallPlugin {
    fn id(&self) -> &'static str {
        "firewall"
    }

    fn evaluate(&self, document: &Document) -> Vec<Finding> {
        let mut findings = Vec::new();

        let undescribed = document
            .firewall_rules
            .iter()
            .filter(|rule| rule.descr.is_empty())
            .count();
        if undescribed > 0 {
            findings.push(Self::finding(
                FindingSeverity::Low,
                "Rules without a description",
                format!(
                    "{undescribed} rule(s) carry no description; intent is lost and \
                     cleanup becomes guesswork."
                ),
                Some("firewall".to_owned()),
                "Describe every rule with its purpose and owner.",
            ));
        }

        let disabled = document
            .firewall_rules
            .iter()
            .filter(|rule| rule.disabled)
            .count();
        if disabled > 0 {
            findings.push(Self::finding(
                FindingSeverity::Info,
                "Disabled rules lingering in the rule set",
                format!(
                    "{disabled} disabled rule(s) remain in the configuration; stale \
                     rules get re-enabled by accident."
                ),
                Some("firewall".to_owned()),
                "Delete rules that have been disabled for more than one cycle.",
            ));
        }

        // Duplicate match predicates: same traffic matched twice.
        let mut predicates: HashMap<String, usize> = HashMap::new();
        for rule in &document.firewall_rules {
            let predicate = format!(
                "{}|{}|{}|{}|{}|{}",
                rule.interface,
                rule.action,
                rule.protocol,
                rule.source.net,
                rule.destination.net,
                rule.destination.port
            );
            *predicates.entry(predicate).or_insert(0) += 1;
        }
        let mut duplicates: Vec<(&String, &usize)> =
            predicates.iter().filter(|(_, n)| **n > 1).collect();
        duplicates.sort();
        for (predicate, count) in duplicates {
            findings.push(Self::finding(
                FindingSeverity::Medium,
                "Duplicate rule predicate",
                format!("{count} rules share the match predicate '{predicate}'."),
                Some("firewall".to_owned()),
                "Collapse duplicate rules into one.",
            ));
        }

        // Interfaces that never appear in a rule.
        for interface in &document.interfaces {
            if !interface.enabled {
                continue;
            }
            let referenced = document
                .firewall_rules
                .iter()
                .any(|rule| rule.interface == interface.name);
            if !referenced {
                findings.push(Self::finding(
                    FindingSeverity::Info,
                    "Interface without filter rules",
                    format!(
                        "Interface '{}' is enabled but no filter rule references it.",
                        interface.name
                    ),
                    Some(format!("interfaces.{}", interface.name)),
                    "Confirm the interface is covered by group or floating rules.",
                ));
            }
        }

        // Ingress hygiene on the perimeter.
        for interface in &document.interfaces {
            if interface.name != "wan" || !interface.enabled {
                continue;
            }
            if !interface.block_bogons {
                findings.push(Self::finding(
                    FindingSeverity::Medium,
                    "Bogon filtering disabled on WAN",
                    "Traffic from unallocated address space reaches the rule set."
                        .to_owned(),
                    Some("interfaces.wan.blockbogons".to_owned()),
                    "Enable bogon blocking on the WAN interface.",
                ));
            }
            if !interface.block_private {
                findings.push(Self::finding(
                    FindingSeverity::Medium,
                    "Private-network filtering disabled on WAN",
                    "RFC 1918 sources arriving on WAN are spoofed or misrouted and \
                     should be dropped at ingress."
                        .to_owned(),
                    Some("interfaces.wan.blockpriv".to_owned()),
                    "Enable private-network blocking on the WAN interface.",
                ));
            }
        }

        findings
    }
}
