//! Compliance audit engine: plugin registry, mode controller, and finding
//! aggregation.
//!
//! Plugins are pure and independent: each inspects the [`Document`] and
//! returns findings; the controller selects which plugins run for the
//! chosen mode, evaluates them sequentially (finding order must be
//! deterministic), and aggregates the results into an [`AuditReport`].
pub mod plugins;


use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::deadline::{Deadline, DeadlineExceeded};
use crate::enums::{AuditMode, FindingSeverity};
use crate::model::Document;

/// A compliance violation or observation emitted by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Id of the plugin that produced the finding (`audit` for the
    /// controller's own rules).
    pub plugin: String,
    /// Severity class.
    pub severity: FindingSeverity,
    /// Short title.
    pub title: String,
    /// Longer explanation; may be truncated by the report composer.
    pub description: String,
    /// Affected component (rule key, interface name, user), if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Suggested remediation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Finding {
    /// Sort key for deterministic rendering: severity (critical first),
    /// then plugin id, then title.
    pub fn sort_key(&self) -> (FindingSeverity, &str, &str) {
        (self.severity, self.plugin.as_str(), self.title.as_str())
    }
}

/// Per-plugin finding counters.
///
/// `total` counts every finding including `info`; the named buckets cover
/// the four actionable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct PluginSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PluginSummary {
    /// Counts findings into a summary.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self {
            total: findings.len(),
            ..Self::default()
        };
        for finding in findings {
            match finding.severity {
                FindingSeverity::Critical => summary.critical += 1,
                FindingSeverity::High => summary.high += 1,
                FindingSeverity::Medium => summary.medium += 1,
                FindingSeverity::Low => summary.low += 1,
                FindingSeverity::Info => {}
            }
        }
        summary
    }
}

/// One plugin's contribution to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginReport {
    /// Findings in the plugin's deterministic order.
    pub findings: Vec<Finding>,
    /// Counters over `findings`.
    pub summary: PluginSummary,
}

/// A single compliance rule set.
///
/// Implementations are stateless after construction and must produce
/// findings in a deterministic order for a given document.
pub trait CompliancePlugin {
    /// Stable plugin id (`stig`, `sans`, `firewall`).
    fn id(&self) -> &'static str;

    /// Inspects the document and returns findings.
    fn evaluate(&self, document: &Document) -> Vec<Finding>;
}

/// Builds the plugin registry.
///
/// Initialization is synchronous and deterministic. A plugin whose
/// constructor fails is excluded and a warning recorded; the audit
/// continues with the remaining plugins.
pub fn build_registry() -> (Vec<Box<dyn CompliancePlugin>>, Vec<String>) {
    let mut registry: Vec<Box<dyn CompliancePlugin>> = Vec::new();
    let mut warnings = Vec::new();

    match plugins::stig::StigPlugin::new() {
        Ok(plugin) => registry.push(Box::new(plugin)),
        Err(e) => warnings.push(format!("plugin 'stig' failed to initialize: {e}")),
    }
    match plugins::sans::SansPlugin::new() {
        Ok(plugin) => registry.push(Box::new(plugin)),
        Err(e) => warnings.push(format!("plugin 'sans' failed to initialize: {e}")),
    }
    registry.push(Box::new(plugins::firewall::FirewallPlugin::new()));

    (registry, warnings)
}

/// Options for one audit run, populated once by the command wiring.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Report posture.
    pub mode: AuditMode,
    /// Enable adversarial phrasing in rendered output. Never alters the
    /// underlying finding data.
    pub blackhat: bool,
    /// Include exhaustive detail in the composed report.
    pub comprehensive: bool,
    /// Plugin ids to run. Meaning depends on the mode: in `standard` mode
    /// this is the complete selection (empty = no plugins); in `blue` and
    /// `red` modes a non-empty list narrows the registry.
    pub selected_plugins: Vec<String>,
}

/// Audit provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AuditMetadata {
    /// Hostname of the audited configuration.
    pub hostname: String,
    /// Timestamp supplied by the caller.
    pub generated_at: String,
    /// Plugin ids that actually ran, in execution order.
    pub plugins_run: Vec<String>,
}

/// The aggregated audit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Report posture the audit ran under.
    pub mode: AuditMode,
    /// Whether adversarial phrasing was requested.
    pub blackhat_mode: bool,
    /// Whether comprehensive detail was requested.
    pub comprehensive: bool,
    /// The controller's own findings, ordered by
    /// `(severity, plugin, title)`.
    pub findings: Vec<Finding>,
    /// Per-plugin results, keyed by plugin id (sorted, stable).
    pub compliance: BTreeMap<String, PluginReport>,
    /// Provenance.
    pub metadata: AuditMetadata,
    /// Plugin initialization warnings. Rendering is the caller's job.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AuditReport {
    /// Total findings across the controller and every plugin.
    pub fn total_findings(&self) -> usize {
        self.findings.len()
            + self
                .compliance
                .values()
                .map(|report| report.findings.len())
                .sum::<usize>()
    }
}

/// Failure of the audit controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A selected plugin id is not in the registry.
    UnknownPlugin {
        /// The unknown id.
        name: String,
        /// Ids that are registered.
        registered: Vec<String>,
    },
    /// The per-invocation deadline expired.
    Cancelled(DeadlineExceeded),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlugin { name, registered } => write!(
                f,
                "unknown audit plugin '{name}'; registered plugins: {}",
                registered.join(", ")
            ),
            Self::Cancelled(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for AuditError {}

impl From<DeadlineExceeded> for AuditError {
    fn from(e: DeadlineExceeded) -> Self {
        Self::Cancelled(e)
    }
}

/// Runs an audit for the chosen mode and returns the aggregated report.
///
/// Mode selection:
/// - `standard`: only explicitly selected plugins run (none by default).
/// - `blue` / `red`: every registered plugin runs unless
///   `selected_plugins` narrows the set.
///
/// Plugins are evaluated sequentially so finding order stays deterministic;
/// the deadline is checked before each plugin.
///
/// # Errors
///
/// - [`AuditError::UnknownPlugin`] when a selected id is not registered.
/// - [`AuditError::Cancelled`] when the deadline expires.
pub fn run_audit(
    document: &Document,
    options: &AuditOptions,
    generated_at: &str,
    deadline: &Deadline,
) -> Result<AuditReport, AuditError> {
    let (registry, warnings) = build_registry();
    let registered: Vec<String> = registry.iter().map(|p| p.id().to_owned()).collect();

    for name in &options.selected_plugins {
        if !registered.iter().any(|id| id == name) {
            return Err(AuditError::UnknownPlugin {
                name: name.clone(),
                registered,
            });
        }
    }

    let selected: Vec<&dyn CompliancePlugin> = registry
        .iter()
        .map(|plugin| &**plugin)
        .filter(|plugin| match options.mode {
            AuditMode::Standard => options.selected_plugins.iter().any(|s| s == plugin.id()),
            AuditMode::Blue | AuditMode::Red => {
                options.selected_plugins.is_empty()
                    || options.selected_plugins.iter().any(|s| s == plugin.id())
            }
        })
        .collect();

    let mut compliance = BTreeMap::new();
    let mut plugins_run = Vec::new();
    for plugin in selected {
        deadline.check()?;
        let mut findings = plugin.evaluate(document);
        findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let summary = PluginSummary::from_findings(&findings);
        plugins_run.push(plugin.id().to_owned());
        compliance.insert(plugin.id().to_owned(), PluginReport { findings, summary });
    }

    deadline.check()?;
    let mut own_findings = controller_findings(document);
    own_findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    Ok(AuditReport {
        mode: options.mode,
        blackhat_mode: options.blackhat,
        comprehensive: options.comprehensive,
        findings: own_findings,
        compliance,
        metadata: AuditMetadata {
            hostname: document.system.hostname.clone(),
            generated_at: generated_at.to_owned(),
            plugins_run,
        },
        warnings,
    })
}

/// The controller's own rules: a small set of cross-cutting posture checks
/// that run in every mode, independent of plugin selection.
fn controller_findings(document: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    if document.system.web_gui.protocol == "http" {
        findings.push(Finding {
            plugin: "audit".to_owned(),
            severity: FindingSeverity::High,
            title: "Management interface served over plaintext HTTP".to_owned(),
            description: "The web GUI listener is configured for http, exposing \
                          administrator credentials to on-path observers."
                .to_owned(),
            component: Some("system.webgui".to_owned()),
            recommendation: Some("Switch the web GUI protocol to https.".to_owned()),
        });
    }

    if document.system.ssh.enabled && document.system.ssh.permit_root_logon {
        findings.push(Finding {
            plugin: "audit".to_owned(),
            severity: FindingSeverity::High,
            title: "Direct root login over SSH is permitted".to_owned(),
            description: "permitrootlogin is set; a compromised root credential grants \
                          immediate full control with no audit trail of the operator."
                .to_owned(),
            component: Some("system.ssh".to_owned()),
            recommendation: Some(
                "Disable root login and use per-operator accounts with sudo.".to_owned(),
            ),
        });
    }

    for rule in &document.firewall_rules {
        if rule.action == "pass"
            && !rule.disabled
            && rule.source.is_any()
            && rule.destination.is_any()
        {
            let key = rule.uuid.clone().unwrap_or_else(|| rule.interface.clone());
            findings.push(Finding {
                plugin: "audit".to_owned(),
                severity: FindingSeverity::Critical,
                title: "Pass rule matches any source and any destination".to_owned(),
                description: format!(
                    "Rule '{key}' on interface '{}' passes all traffic unconditionally.",
                    rule.interface
                ),
                component: Some(format!("firewall.rules[{key}]")),
                recommendation: Some(
                    "Constrain the rule to the required networks and ports.".to_owned(),
                ),
            });
        }
    }

    findings
}
