//! Core enumerations shared across the diff, audit, and sanitizer engines.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A configuration section addressable by name.
///
/// The variant order is the fixed enumeration order used when sorting
/// [`Change`](crate::diff::Change) values; it matches the order the sections
/// appear in an OPNsense `config.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Host-level settings: hostname, domain, DNS, SSH, web GUI.
    System,
    /// Physical and logical interface assignments.
    Interfaces,
    /// Filter rules.
    Firewall,
    /// Outbound and port-forward NAT entries.
    Nat,
    /// 802.1Q VLAN definitions.
    Vlans,
    /// DHCP ranges and static reservations.
    Dhcp,
    /// Local user accounts.
    Users,
    /// Static routes and gateways.
    Routing,
}

impl Section {
    /// All implemented sections, in the fixed enumeration order.
    pub const ALL: [Section; 8] = [
        Section::System,
        Section::Interfaces,
        Section::Firewall,
        Section::Nat,
        Section::Vlans,
        Section::Dhcp,
        Section::Users,
        Section::Routing,
    ];

    /// Section names that are reserved for future use.
    ///
    /// Requesting one of these produces a not-implemented error rather than a
    /// silent skip, so callers can distinguish a typo from a known gap.
    pub const RESERVED: [&'static str; 3] = ["dns", "vpn", "certificates"];

    /// Returns the lowercase section name used on the CLI and in output.
    pub fn name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Interfaces => "interfaces",
            Self::Firewall => "firewall",
            Self::Nat => "nat",
            Self::Vlans => "vlans",
            Self::Dhcp => "dhcp",
            Self::Users => "users",
            Self::Routing => "routing",
        }
    }

    /// Resolves a section name to a [`Section`].
    ///
    /// # Errors
    ///
    /// - [`SectionError::Reserved`] for `dns`, `vpn`, and `certificates`:
    ///   names the implemented sections so the message is actionable.
    /// - [`SectionError::Unknown`] for anything else.
    pub fn resolve(name: &str) -> Result<Self, SectionError> {
        match name {
            "system" => Ok(Self::System),
            "interfaces" => Ok(Self::Interfaces),
            "firewall" => Ok(Self::Firewall),
            "nat" => Ok(Self::Nat),
            "vlans" => Ok(Self::Vlans),
            "dhcp" => Ok(Self::Dhcp),
            "users" => Ok(Self::Users),
            "routing" => Ok(Self::Routing),
            reserved if Self::RESERVED.contains(&reserved) => Err(SectionError::Reserved {
                name: reserved.to_owned(),
            }),
            other => Err(SectionError::Unknown {
                name: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to resolve a section name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// The name is reserved but not yet implemented.
    Reserved {
        /// The reserved name that was requested.
        name: String,
    },
    /// The name is not a known section at all.
    Unknown {
        /// The unrecognised name.
        name: String,
    },
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved { name } => write!(
                f,
                "section '{name}' is not yet implemented; implemented sections: {}",
                implemented_section_list()
            ),
            Self::Unknown { name } => write!(
                f,
                "unknown section '{name}'; implemented sections: {}",
                implemented_section_list()
            ),
        }
    }
}

impl std::error::Error for SectionError {}

/// Comma-separated list of implemented section names for error messages.
fn implemented_section_list() -> String {
    Section::ALL
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The kind of a single configuration change.
///
/// The variant order is the tie-break order within a section:
/// `Added` < `Removed` < `Modified` < `Reordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Entity present in the new configuration only.
    Added,
    /// Entity present in the old configuration only.
    Removed,
    /// Entity present in both with at least one differing field.
    Modified,
    /// Entity moved within its section without content change.
    Reordered,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Removed => f.write_str("removed"),
            Self::Modified => f.write_str("modified"),
            Self::Reordered => f.write_str("reordered"),
        }
    }
}

/// Security impact assigned to a change by the scorer.
///
/// Ordered most severe first so that sorting by `Impact` ascending yields
/// high-impact changes at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Directly weakens the security posture.
    High,
    /// Changes the attack surface or trust relationships.
    Medium,
    /// Cosmetic or documentation-level change.
    Low,
    /// Ignorable noise (revision counters, timestamps).
    None,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Report posture for a compliance audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Neutral documentation; plugins run only when explicitly selected.
    Standard,
    /// Defensive review; all registered plugins run unless narrowed.
    Blue,
    /// Attacker-oriented reconnaissance commentary.
    Red,
}

impl Default for AuditMode {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Blue => f.write_str("blue"),
            Self::Red => f.write_str("red"),
        }
    }
}

/// Redaction strength for the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizeMode {
    /// Redact every category.
    Aggressive,
    /// Redact credentials, public IPs, MACs, and emails; preserve private
    /// IPs, hostnames, domains, and usernames.
    Moderate,
    /// Redact credentials and key material only.
    Minimal,
}

impl SanitizeMode {
    /// Returns `true` if this mode redacts values of the given category.
    pub fn redacts(self, category: Category) -> bool {
        match self {
            Self::Aggressive => true,
            Self::Moderate => matches!(
                category,
                Category::Password
                    | Category::Secret
                    | Category::PrivateKey
                    | Category::Certificate
                    | Category::PublicIp
                    | Category::Mac
                    | Category::Email
            ),
            Self::Minimal => category.is_credential(),
        }
    }
}

impl fmt::Display for SanitizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggressive => f.write_str("aggressive"),
            Self::Moderate => f.write_str("moderate"),
            Self::Minimal => f.write_str("minimal"),
        }
    }
}

/// Severity of a compliance finding, most severe first.
///
/// The `Ord` impl gives `Critical < High < ... < Info`, so an ascending sort
/// puts the most severe findings first — the rendering order the audit
/// aggregator requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Exploitable as-is; fix immediately.
    Critical,
    /// Significant weakness.
    High,
    /// Hardening gap.
    Medium,
    /// Minor deviation from best practice.
    Low,
    /// Observation only.
    Info,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => f.write_str("critical"),
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
            Self::Info => f.write_str("info"),
        }
    }
}

/// A sensitive-value category recognised by the sanitizer.
///
/// The variant order is the stable key order used when serializing the
/// [`Mapper`](crate::sanitize::Mapper) to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Account passwords and password hashes.
    Password,
    /// Shared secrets, PSKs, API keys.
    Secret,
    /// PEM or base64 private key material.
    PrivateKey,
    /// X.509 certificate bodies.
    Certificate,
    /// Globally routable IP addresses.
    PublicIp,
    /// RFC 1918 / ULA addresses.
    PrivateIp,
    /// Hardware MAC addresses.
    Mac,
    /// Email addresses.
    Email,
    /// Bare host names.
    Hostname,
    /// DNS domain names.
    Domain,
    /// Login names.
    Username,
}

impl Category {
    /// All categories, in the stable serialization order.
    pub const ALL: [Category; 11] = [
        Category::Password,
        Category::Secret,
        Category::PrivateKey,
        Category::Certificate,
        Category::PublicIp,
        Category::PrivateIp,
        Category::Mac,
        Category::Email,
        Category::Hostname,
        Category::Domain,
        Category::Username,
    ];

    /// Returns the snake_case key used in Mapper JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Secret => "secret",
            Self::PrivateKey => "private_key",
            Self::Certificate => "certificate",
            Self::PublicIp => "public_ip",
            Self::PrivateIp => "private_ip",
            Self::Mac => "mac",
            Self::Email => "email",
            Self::Hostname => "hostname",
            Self::Domain => "domain",
            Self::Username => "username",
        }
    }

    /// Returns `true` for the credential bucket: categories whose values all
    /// collapse to the fixed literal `REDACTED` and are never mapped 1-to-1.
    pub fn is_credential(self) -> bool {
        matches!(
            self,
            Self::Password | Self::Secret | Self::PrivateKey | Self::Certificate
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
