//! Typed view of one OPNsense configuration document.
//!
//! A [`Document`] is an immutable snapshot created by the parser and read by
//! every downstream engine (diff, audit, report). Leaf nodes keep the
//! original string values from the XML; identity attributes (rule UUIDs,
//! interface names, reservation MACs) are hoisted to typed fields so the
//! diff engine can match entities across revisions without re-walking XML.
pub mod sections;


pub use sections::{
    DhcpScope, DhcpStatic, FirewallRule, Gateway, Interface, NatEntry, RuleEndpoint, SshSettings,
    StaticRoute, SystemSection, Tunable, User, Vlan, WebGui,
};

use crate::enums::Section;

/// An immutable snapshot of one parsed OPNsense configuration.
///
/// Created by [`parse`](crate::parse::parse); never mutated afterwards.
/// Collection order matches document order in the source XML — the diff
/// engine relies on that for reorder detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Host-level settings.
    pub system: SystemSection,
    /// Interface assignments, in document order.
    pub interfaces: Vec<Interface>,
    /// Filter rules, in evaluation order.
    pub firewall_rules: Vec<FirewallRule>,
    /// NAT entries (port forwards and outbound), in document order.
    pub nat_rules: Vec<NatEntry>,
    /// 802.1Q VLAN definitions.
    pub vlans: Vec<Vlan>,
    /// DHCP scopes keyed by interface, each with its static reservations.
    pub dhcp: Vec<DhcpScope>,
    /// Local user accounts.
    pub users: Vec<User>,
    /// Static routes.
    pub routes: Vec<StaticRoute>,
    /// Gateway definitions.
    pub gateways: Vec<Gateway>,
    /// Sysctl tunables.
    pub tunables: Vec<Tunable>,
}

impl Document {
    /// Returns `true` if the given section holds no entities in this document.
    ///
    /// The system section always counts as populated — it exists even in a
    /// factory-default configuration.
    pub fn section_is_empty(&self, section: Section) -> bool {
        match section {
            Section::System => false,
            Section::Interfaces => self.interfaces.is_empty(),
            Section::Firewall => self.firewall_rules.is_empty(),
            Section::Nat => self.nat_rules.is_empty(),
            Section::Vlans => self.vlans.is_empty(),
            Section::Dhcp => self.dhcp.is_empty(),
            Section::Users => self.users.is_empty(),
            Section::Routing => self.routes.is_empty() && self.gateways.is_empty(),
        }
    }

    /// Total number of static DHCP reservations across all scopes.
    pub fn dhcp_static_count(&self) -> usize {
        self.dhcp.iter().map(|scope| scope.static_maps.len()).sum()
    }
}
