//! STIG-derived hardening checks.
//!
//! Checks adapted from the network-device STIG families that map onto an
//! OPNsense configuration: remote administration, credential storage, and
//! management-plane transport.
use regex::Regex;

use crate::audit::{CompliancePlugin, Finding};
use crate::enums::FindingSeverity;
use crate::model::Document;

/// STIG rule set.
pub struct StigPlugin {
    bcrypt_hash: Regex,
}

impl StigPlugin {
    /// Compiles the plugin's patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error; the registry excludes the
    /// plugin and records a warning in that case.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bcrypt_hash: Regex::new(r"^\$2[aby]\$\d{2}\$")?,
        })
    }

    fn finding(
        severity: FindingSeverity,
        title: &str,
        description: String,
        component: &str,
        recommendation: &str,
    ) -> Finding {
        Finding {
            plugin: "stig".to_owned(),
            severity,
            title: title.to_owned(),
            description,
            component: Some(component.to_owned()),
            recommendation: Some(recommendation.to_owned()),
        }
    }
}

impl CompliancePlugin for StigPlugin {
    fn id(&self) -> &'static str {
        "stig"
    }

    fn evaluate(&self, document: &Document) -> Vec<Finding> {
        let mut findings = Vec::new();
        let system = &document.system;

        if system.ssh.enabled && system.ssh.idle_timeout.is_empty() {
            findings.push(Self::finding(
                FindingSeverity::High,
                "SSH idle timeout not configured",
                "The SSH daemon has no idle timeout; abandoned administrative sessions \
                 remain authenticated indefinitely."
                    .to_owned(),
                "system.ssh.idletimeout",
                "Set an SSH idle timeout of at most 10 minutes.",
            ));
        }

        if system.ssh.enabled && system.ssh.permit_root_logon {
            findings.push(Self::finding(
                FindingSeverity::High,
                "SSH permits direct root login",
                "Remote root login removes individual accountability and widens the \
                 blast radius of a leaked credential."
                    .to_owned(),
                "system.ssh.permitrootlogin",
                "Require operators to log in with named accounts.",
            ));
        }

        if system.ssh.enabled && system.ssh.password_auth {
            findings.push(Self::finding(
                FindingSeverity::Medium,
                "SSH allows password authentication",
                "Password authentication is enabled for SSH; keys resist online \
                 guessing and credential replay."
                    .to_owned(),
                "system.ssh.passwordauth",
                "Disable password authentication and distribute SSH keys.",
            ));
        }

        if system.web_gui.protocol != "https" {
            findings.push(Self::finding(
                FindingSeverity::High,
                "Management web GUI does not require TLS",
                format!(
                    "The web GUI protocol is '{}'; management traffic must be encrypted.",
                    if system.web_gui.protocol.is_empty() {
                        "unset"
                    } else {
                        &system.web_gui.protocol
                    }
                ),
                "system.webgui.protocol",
                "Serve the web GUI over https with a valid certificate.",
            ));
        }

        for user in &document.users {
            if !user.password_hash.is_empty() && !self.bcrypt_hash.is_match(&user.password_hash) {
                findings.push(Self::finding(
                    FindingSeverity::Medium,
                    "User password stored with a weak hash",
                    format!(
                        "Account '{}' stores its password with a non-bcrypt hash.",
                        user.name
                    ),
                    &format!("users[{}].password", user.name),
                    "Re-hash the password with bcrypt by resetting it.",
                ));
            }
            if user.disabled && !user.authorized_keys.is_empty() {
                findings.push(Self::finding(
                    FindingSeverity::Low,
                    "Disabled account retains authorized SSH keys",
                    format!(
                        "Account '{}' is disabled but still carries authorized keys; \
                         re-enabling it restores old access paths.",
                        user.name
                    ),
                    &format!("users[{}].authorizedkeys", user.name),
                    "Remove authorized keys from disabled accounts.",
                ));
            }
        }

        if system.timezone.is_empty() {
            findings.push(Self::finding(
                FindingSeverity::Low,
                "No timezone configured",
                "Audit trails on devices without an explicit timezone are hard to \
                 correlate across the estate."
                    .to_owned(),
                "system.timezone",
                "Set an explicit timezone, preferably Etc/UTC.",
            ));
        }

        findings
    }
}
