//! Building the report tree from a document and an optional audit report.
use std::fmt;

use crate::audit::{AuditReport, Finding};
use crate::enums::{AuditMode, Section, SectionError};
use crate::model::Document;

use super::{MAX_DESCRIPTION_LENGTH, ReportSection, ReportTable, ReportTree, truncate_runes};

/// Options controlling report composition.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Section names to include; empty means all implemented sections.
    pub sections: Vec<String>,
    /// Include empty sections and per-entity detail columns.
    pub comprehensive: bool,
    /// Render the sysctl tunables table.
    pub include_tunables: bool,
}

/// Failure of report composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A requested section name is reserved or unknown.
    Section(SectionError),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<SectionError> for ReportError {
    fn from(e: SectionError) -> Self {
        Self::Section(e)
    }
}

/// Composes the base report tree, appending the audit appendix when an
/// audit ran.
///
/// # Errors
///
/// [`ReportError::Section`] when a requested section name is reserved or
/// unknown.
pub fn compose_report(
    document: &Document,
    options: &ReportOptions,
    audit: Option<&AuditReport>,
) -> Result<ReportTree, ReportError> {
    let sections = resolve_sections(&options.sections)?;

    let mut tree = ReportTree {
        title: format!(
            "OPNsense Configuration Report: {}",
            hostname_label(document)
        ),
        sections: Vec::new(),
    };

    for section in sections {
        if !options.comprehensive && document.section_is_empty(section) {
            continue;
        }
        tree.sections.push(compose_section(document, section, options));
    }

    if options.include_tunables {
        tree.sections.push(tunables_section(document));
    }

    if let Some(audit) = audit {
        tree.sections.push(audit_appendix(audit));
    }

    Ok(tree)
}

fn resolve_sections(requested: &[String]) -> Result<Vec<Section>, ReportError> {
    if requested.is_empty() {
        return Ok(Section::ALL.to_vec());
    }
    let mut resolved = Vec::with_capacity(requested.len());
    for name in requested {
        let section = Section::resolve(name)?;
        if !resolved.contains(&section) {
            resolved.push(section);
        }
    }
    resolved.sort();
    Ok(resolved)
}

fn hostname_label(document: &Document) -> String {
    let system = &document.system;
    if system.hostname.is_empty() {
        "unnamed".to_owned()
    } else if system.domain.is_empty() {
        system.hostname.clone()
    } else {
        format!("{}.{}", system.hostname, system.domain)
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_owned()
}

fn compose_section(document: &Document, section: Section, options: &ReportOptions) -> ReportSection {
    match section {
        Section::System => system_section(document),
        Section::Interfaces => interfaces_section(document),
        Section::Firewall => firewall_section(document, options),
        Section::Nat => nat_section(document),
        Section::Vlans => vlans_section(document),
        Section::Dhcp => dhcp_section(document),
        Section::Users => users_section(document),
        Section::Routing => routing_section(document),
    }
}

fn system_section(document: &Document) -> ReportSection {
    let system = &document.system;
    let mut section = ReportSection::new("System", 2);
    section.tables.push(ReportTable {
        headers: vec!["Setting".to_owned(), "Value".to_owned()],
        rows: vec![
            vec!["Hostname".to_owned(), system.hostname.clone()],
            vec!["Domain".to_owned(), system.domain.clone()],
            vec!["Timezone".to_owned(), system.timezone.clone()],
            vec!["DNS servers".to_owned(), system.dns_servers.join(", ")],
            vec!["NTP servers".to_owned(), system.ntp_servers.join(", ")],
            vec![
                "Web GUI".to_owned(),
                format!(
                    "{}{}",
                    system.web_gui.protocol,
                    if system.web_gui.port.is_empty() {
                        String::new()
                    } else {
                        format!(":{}", system.web_gui.port)
                    }
                ),
            ],
            vec!["SSH enabled".to_owned(), yes_no(system.ssh.enabled)],
            vec![
                "SSH root login".to_owned(),
                yes_no(system.ssh.permit_root_logon),
            ],
        ],
    });
    section
}

fn interfaces_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("Interfaces", 2);
    section.tables.push(ReportTable {
        headers: ["Name", "Device", "Enabled", "IPv4", "IPv6", "Gateway", "Description"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .interfaces
            .iter()
            .map(|interface| {
                vec![
                    interface.name.clone(),
                    interface.device.clone(),
                    yes_no(interface.enabled),
                    join_addr(&interface.ipaddr, &interface.subnet),
                    join_addr(&interface.ipaddrv6, &interface.subnetv6),
                    interface.gateway.clone(),
                    interface.descr.clone(),
                ]
            })
            .collect(),
    });
    section
}

fn join_addr(addr: &str, prefix: &str) -> String {
    if addr.is_empty() || prefix.is_empty() {
        addr.to_owned()
    } else {
        format!("{addr}/{prefix}")
    }
}

fn firewall_section(document: &Document, options: &ReportOptions) -> ReportSection {
    let mut section = ReportSection::new("Firewall Rules", 2);
    let mut headers = vec![
        "#".to_owned(),
        "Action".to_owned(),
        "Interface".to_owned(),
        "Proto".to_owned(),
        "Source".to_owned(),
        "Destination".to_owned(),
        "Description".to_owned(),
    ];
    if options.comprehensive {
        headers.extend(["Disabled".to_owned(), "Log".to_owned(), "Quick".to_owned()]);
    }
    let rows = document
        .firewall_rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let mut row = vec![
                (index + 1).to_string(),
                rule.action.clone(),
                rule.interface.clone(),
                rule.protocol.clone(),
                endpoint_cell(&rule.source.net, &rule.source.port),
                endpoint_cell(&rule.destination.net, &rule.destination.port),
                rule.descr.clone(),
            ];
            if options.comprehensive {
                row.extend([
                    yes_no(rule.disabled),
                    yes_no(rule.log),
                    yes_no(rule.quick),
                ]);
            }
            row
        })
        .collect();
    section.tables.push(ReportTable { headers, rows });
    section
}

fn endpoint_cell(net: &str, port: &str) -> String {
    let net = if net.is_empty() { "any" } else { net };
    if port.is_empty() {
        net.to_owned()
    } else {
        format!("{net}:{port}")
    }
}

fn nat_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("NAT", 2);
    section.tables.push(ReportTable {
        headers: ["Interface", "Proto", "Source", "Destination", "Target", "Description"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .nat_rules
            .iter()
            .map(|entry| {
                vec![
                    entry.interface.clone(),
                    entry.protocol.clone(),
                    endpoint_cell(&entry.source, &entry.source_port),
                    endpoint_cell(&entry.destination, &entry.destination_port),
                    endpoint_cell(&entry.target, &entry.local_port),
                    entry.descr.clone(),
                ]
            })
            .collect(),
    });
    section
}

fn vlans_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("VLANs", 2);
    section.tables.push(ReportTable {
        headers: ["Parent", "Tag", "Device", "Description"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .vlans
            .iter()
            .map(|vlan| {
                vec![
                    vlan.parent_if.clone(),
                    vlan.tag.clone(),
                    vlan.vlan_if.clone(),
                    vlan.descr.clone(),
                ]
            })
            .collect(),
    });
    section
}

fn dhcp_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("DHCP", 2);
    section.tables.push(ReportTable {
        headers: ["Interface", "Enabled", "Range", "Reservations"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .dhcp
            .iter()
            .map(|scope| {
                vec![
                    scope.interface.clone(),
                    yes_no(scope.enabled),
                    format!("{} - {}", scope.range_from, scope.range_to),
                    scope.static_maps.len().to_string(),
                ]
            })
            .collect(),
    });
    let reservations: Vec<Vec<String>> = document
        .dhcp
        .iter()
        .flat_map(|scope| {
            scope.static_maps.iter().map(|map| {
                vec![
                    scope.interface.clone(),
                    map.mac.clone(),
                    map.ipaddr.clone(),
                    map.hostname.clone(),
                ]
            })
        })
        .collect();
    if !reservations.is_empty() {
        section.tables.push(ReportTable {
            headers: ["Interface", "MAC", "Address", "Hostname"]
                .map(str::to_owned)
                .to_vec(),
            rows: reservations,
        });
    }
    section
}

fn users_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("Users", 2);
    section.tables.push(ReportTable {
        headers: ["Name", "UID", "Groups", "Disabled", "MFA", "Description"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .users
            .iter()
            .map(|user| {
                vec![
                    user.name.clone(),
                    user.uid.clone(),
                    user.groups.clone(),
                    yes_no(user.disabled),
                    yes_no(!user.otp_seed.is_empty()),
                    user.descr.clone(),
                ]
            })
            .collect(),
    });
    section
}

fn routing_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("Routing", 2);
    section.tables.push(ReportTable {
        headers: ["Gateway", "Interface", "Address", "Default"]
            .map(str::to_owned)
            .to_vec(),
        rows: document
            .gateways
            .iter()
            .map(|gateway| {
                vec![
                    gateway.name.clone(),
                    gateway.interface.clone(),
                    gateway.gateway.clone(),
                    yes_no(gateway.default_gw),
                ]
            })
            .collect(),
    });
    if !document.routes.is_empty() {
        section.tables.push(ReportTable {
            headers: ["Network", "Gateway", "Disabled", "Description"]
                .map(str::to_owned)
                .to_vec(),
            rows: document
                .routes
                .iter()
                .map(|route| {
                    vec![
                        route.network.clone(),
                        route.gateway.clone(),
                        yes_no(route.disabled),
                        route.descr.clone(),
                    ]
                })
                .collect(),
        });
    }
    section
}

fn tunables_section(document: &Document) -> ReportSection {
    let mut section = ReportSection::new("Tunables", 2);
    section.tables.push(ReportTable {
        headers: ["Tunable", "Value"].map(str::to_owned).to_vec(),
        rows: document
            .tunables
            .iter()
            .map(|tunable| vec![tunable.name.clone(), tunable.value.clone()])
            .collect(),
    });
    section
}

// ---------------------------------------------------------------------------
// Audit appendix
// ---------------------------------------------------------------------------

/// Builds the audit appendix with the fixed heading hierarchy:
///
/// `## Compliance Audit Summary` > `### Plugin Compliance Results` >
/// `#### {pluginID}` > `### {pluginID} Plugin Findings` >
/// `### Security Findings` > `### Audit Metadata`.
///
/// The `### Security Findings` block is omitted when the controller found
/// nothing.
fn audit_appendix(audit: &AuditReport) -> ReportSection {
    let adversarial = audit.blackhat_mode && audit.mode == AuditMode::Red;
    let mut appendix = ReportSection::new("Compliance Audit Summary", 2);

    appendix.paragraphs.push(if adversarial {
        format!(
            "Reconnaissance summary for target '{}': {} finding(s) of interest.",
            audit.metadata.hostname,
            audit.total_findings()
        )
    } else {
        format!(
            "Audit mode: {}. Total findings: {}.",
            audit.mode,
            audit.total_findings()
        )
    });

    let mut plugin_results = ReportSection::new("Plugin Compliance Results", 3);
    for (plugin_id, report) in &audit.compliance {
        let mut plugin_section = ReportSection::new(plugin_id.clone(), 4);
        let summary = report.summary;
        plugin_section.paragraphs.push(format!("Total: {}", summary.total));
        plugin_section
            .paragraphs
            .push(format!("Critical: {}", summary.critical));
        plugin_section.paragraphs.push(format!("High: {}", summary.high));
        plugin_section
            .paragraphs
            .push(format!("Medium: {}", summary.medium));
        plugin_section.paragraphs.push(format!("Low: {}", summary.low));
        plugin_results.children.push(plugin_section);
    }
    appendix.children.push(plugin_results);

    for (plugin_id, report) in &audit.compliance {
        if report.findings.is_empty() {
            continue;
        }
        let mut findings_section =
            ReportSection::new(format!("{plugin_id} Plugin Findings"), 3);
        findings_section
            .tables
            .push(findings_table(&report.findings, adversarial));
        appendix.children.push(findings_section);
    }

    if !audit.findings.is_empty() {
        let mut security = ReportSection::new("Security Findings", 3);
        security
            .tables
            .push(findings_table(&audit.findings, adversarial));
        appendix.children.push(security);
    }

    let mut metadata = ReportSection::new("Audit Metadata", 3);
    metadata
        .paragraphs
        .push(format!("Host: {}", audit.metadata.hostname));
    metadata
        .paragraphs
        .push(format!("Generated: {}", audit.metadata.generated_at));
    metadata.paragraphs.push(format!(
        "Plugins run: {}",
        if audit.metadata.plugins_run.is_empty() {
            "none".to_owned()
        } else {
            audit.metadata.plugins_run.join(", ")
        }
    ));
    appendix.children.push(metadata);

    appendix
}

/// Renders findings into a table, truncating descriptions to the rune
/// budget. Adversarial phrasing only changes the rendered text — the
/// finding data itself is never altered.
fn findings_table(findings: &[Finding], adversarial: bool) -> ReportTable {
    ReportTable {
        headers: ["Severity", "Title", "Description", "Component", "Recommendation"]
            .map(str::to_owned)
            .to_vec(),
        rows: findings
            .iter()
            .map(|finding| {
                let description = if adversarial {
                    format!("Exploitable surface: {}", finding.description)
                } else {
                    finding.description.clone()
                };
                vec![
                    finding.severity.to_string(),
                    finding.title.clone(),
                    truncate_runes(&description, MAX_DESCRIPTION_LENGTH),
                    finding.component.clone().unwrap_or_default(),
                    finding.recommendation.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    }
}
