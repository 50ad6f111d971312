//! Per-section entity structs.
//!
//! Every struct here is a plain data carrier: string leaves hold the
//! original document text (the normalizer canonicalizes on demand; the model
//! never rewrites what the appliance produced).

/// Host-level settings from the `<system>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemSection {
    /// Host name without the domain part.
    pub hostname: String,
    /// DNS domain of the firewall itself.
    pub domain: String,
    /// Olson timezone name (e.g. `Etc/UTC`).
    pub timezone: String,
    /// Configured DNS resolvers, in document order.
    pub dns_servers: Vec<String>,
    /// NTP time servers, in document order.
    pub ntp_servers: Vec<String>,
    /// Web GUI listener settings.
    pub web_gui: WebGui,
    /// SSH daemon settings.
    pub ssh: SshSettings,
    /// Value of `<nextuid>` — an allocation counter, ignorable in diffs.
    pub next_uid: String,
    /// Value of `<nextgid>` — an allocation counter, ignorable in diffs.
    pub next_gid: String,
    /// Timestamp of the last configuration revision, ignorable in diffs.
    pub revision_time: String,
}

/// Web GUI listener settings from `<system><webgui>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebGui {
    /// `http` or `https`.
    pub protocol: String,
    /// Listener port; empty means the protocol default.
    pub port: String,
}

/// SSH daemon settings from `<system><ssh>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SshSettings {
    /// Whether the daemon is enabled at all.
    pub enabled: bool,
    /// Listener port; empty means 22.
    pub port: String,
    /// Whether root may log in directly.
    pub permit_root_logon: bool,
    /// Whether password authentication is allowed (vs. keys only).
    pub password_auth: bool,
    /// Idle timeout in minutes; empty means no timeout is enforced.
    pub idle_timeout: String,
}

/// One interface assignment (`<interfaces><wan>`, `<lan>`, `<optN>`).
///
/// Identity key: `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    /// Logical name: `wan`, `lan`, `opt0`, ...
    pub name: String,
    /// Physical device (`em0`, `igb1`, `vlan0.100`).
    pub device: String,
    /// Whether the interface is enabled.
    pub enabled: bool,
    /// Operator description.
    pub descr: String,
    /// IPv4 address, or a keyword such as `dhcp`.
    pub ipaddr: String,
    /// IPv4 prefix length as text.
    pub subnet: String,
    /// IPv6 address, or a keyword such as `dhcp6` / `track6`.
    pub ipaddrv6: String,
    /// IPv6 prefix length as text.
    pub subnetv6: String,
    /// Upstream gateway name, if any.
    pub gateway: String,
    /// MAC address override, if set.
    pub spoof_mac: String,
    /// Whether RFC 1918 sources are blocked on ingress.
    pub block_private: bool,
    /// Whether bogon sources are blocked on ingress.
    pub block_bogons: bool,
}

/// One endpoint (source or destination) of a filter or NAT rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleEndpoint {
    /// `any`, a network in CIDR form, a single address, or an alias name.
    pub net: String,
    /// Port or port range as text; empty means any port.
    pub port: String,
}

impl RuleEndpoint {
    /// Returns `true` if the endpoint matches any address.
    pub fn is_any(&self) -> bool {
        self.net == "any" || self.net.is_empty()
    }
}

/// One filter rule from `<filter><rule>`.
///
/// Identity key: `uuid` when present; otherwise the composite
/// `(interface, action, protocol, source, destination, port)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirewallRule {
    /// Rule UUID from the `uuid` attribute; absent on configurations
    /// exported by very old firmware.
    pub uuid: Option<String>,
    /// `pass`, `block`, or `reject`.
    pub action: String,
    /// Interface the rule is attached to.
    pub interface: String,
    /// `inet`, `inet6`, or `inet46`.
    pub ip_protocol: String,
    /// Transport protocol (`tcp`, `udp`, `icmp`, ...); empty means any.
    pub protocol: String,
    /// Traffic source.
    pub source: RuleEndpoint,
    /// Traffic destination.
    pub destination: RuleEndpoint,
    /// Whether the rule is disabled.
    pub disabled: bool,
    /// Whether matching packets are logged.
    pub log: bool,
    /// Whether rule evaluation stops on match.
    pub quick: bool,
    /// Operator description.
    pub descr: String,
}

/// One NAT entry from `<nat><rule>` or `<nat><outbound><rule>`.
///
/// Identity key: `uuid` when present; otherwise the composite
/// `(interface, proto, src, dst, dst_port)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NatEntry {
    /// Entry UUID from the `uuid` attribute, if present.
    pub uuid: Option<String>,
    /// Interface the entry applies to.
    pub interface: String,
    /// Transport protocol.
    pub protocol: String,
    /// Source match.
    pub source: String,
    /// Source port match; empty means any.
    pub source_port: String,
    /// Destination match.
    pub destination: String,
    /// Destination port match; empty means any.
    pub destination_port: String,
    /// Redirect target address (port forwards) or translation address.
    pub target: String,
    /// Redirect target port.
    pub local_port: String,
    /// Whether the entry is disabled.
    pub disabled: bool,
    /// Operator description.
    pub descr: String,
}

/// One 802.1Q VLAN from `<vlans><vlan>`.
///
/// Identity key: `(parent_if, tag)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vlan {
    /// Parent physical interface.
    pub parent_if: String,
    /// VLAN tag (1–4094) as text.
    pub tag: String,
    /// Priority code point, if set.
    pub pcp: String,
    /// Device name of the VLAN interface (`vlan0.100`).
    pub vlan_if: String,
    /// Operator description.
    pub descr: String,
}

/// DHCP settings for one interface from `<dhcpd><lan>` etc.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DhcpScope {
    /// Interface the scope serves.
    pub interface: String,
    /// Whether the scope is enabled.
    pub enabled: bool,
    /// First address of the dynamic range.
    pub range_from: String,
    /// Last address of the dynamic range.
    pub range_to: String,
    /// Static reservations, in document order.
    pub static_maps: Vec<DhcpStatic>,
}

/// One static DHCP reservation.
///
/// Identity key: `mac`, normalized to lowercase colon-separated form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DhcpStatic {
    /// Hardware address, lowercase colon-separated.
    pub mac: String,
    /// Reserved IPv4 address.
    pub ipaddr: String,
    /// Host name handed out with the lease.
    pub hostname: String,
    /// Operator description.
    pub descr: String,
}

/// One local user account from `<system><user>`.
///
/// Identity key: `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Login name.
    pub name: String,
    /// Numeric uid as text.
    pub uid: String,
    /// Group memberships, comma-joined in document order.
    pub groups: String,
    /// Full name / description.
    pub descr: String,
    /// Login shell.
    pub shell: String,
    /// Whether the account is disabled.
    pub disabled: bool,
    /// Password hash as stored in the document.
    pub password_hash: String,
    /// Authorized SSH public keys (base64 blob).
    pub authorized_keys: String,
    /// TOTP seed; empty when no second factor is enrolled.
    pub otp_seed: String,
}

/// One static route from `<staticroutes><route>`.
///
/// Identity key: `(network, gateway)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticRoute {
    /// Destination network in CIDR form.
    pub network: String,
    /// Gateway name or address.
    pub gateway: String,
    /// Whether the route is disabled.
    pub disabled: bool,
    /// Operator description.
    pub descr: String,
}

/// One gateway definition from `<gateways><gateway_item>`.
///
/// Identity key: `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gateway {
    /// Gateway name.
    pub name: String,
    /// Interface the gateway is reached through.
    pub interface: String,
    /// Gateway address.
    pub gateway: String,
    /// `inet` or `inet6`.
    pub ip_protocol: String,
    /// Whether this is the default gateway.
    pub default_gw: bool,
    /// Operator description.
    pub descr: String,
}

/// One sysctl tunable from `<sysctl><item>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tunable {
    /// Sysctl OID name.
    pub name: String,
    /// Configured value (`default` when unset).
    pub value: String,
    /// Description shipped with the tunable.
    pub descr: String,
}
