//! Per-section entity extraction for the diff engine.
//!
//! Each section is flattened into a list of [`Entity`] values: a stable
//! identity key plus an ordered, fixed field list. The engine only ever
//! compares these flat entities, so the per-section knowledge (which element
//! is the key, which fields exist, how composite keys are built) lives
//! entirely here.
use crate::enums::Section;
use crate::model::{Document, FirewallRule, NatEntry};

/// One diffable entity: identity key plus ordered `(field, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Entity {
    /// Stable identity key, unique within the section.
    pub key: String,
    /// Fields in the fixed declared order for the section.
    pub fields: Vec<(&'static str, String)>,
    /// One-line summary used for entity-level (add/remove) changes and as
    /// scoring context.
    pub summary: String,
}

impl Entity {
    /// Returns the value of the named field, if the section declares it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Extraction output for one section of one document.
#[derive(Debug, Default)]
pub(super) struct SectionEntities {
    /// Entities in document order.
    pub entities: Vec<Entity>,
    /// Diagnostic notes (emitted at most once per cause).
    pub notes: Vec<String>,
}

/// Formats the field path for a `Modified` change.
///
/// The system section is a singleton, so its paths have no key bracket
/// (`system.hostname`); keyed sections use `section[...]` or the
/// collection-style `firewall.rules[...]` / `nat.rules[...]` paths.
pub(super) fn field_path(section: Section, key: &str, field: &str) -> String {
    match section {
        Section::System => format!("system.{field}"),
        Section::Firewall => format!("firewall.rules[{key}].{field}"),
        Section::Nat => format!("nat.rules[{key}].{field}"),
        Section::Interfaces => format!("interfaces.{key}.{field}"),
        Section::Vlans => format!("vlans[{key}].{field}"),
        Section::Dhcp => format!("dhcp[{key}].{field}"),
        Section::Users => format!("users[{key}].{field}"),
        Section::Routing => format!("routing[{key}].{field}"),
    }
}

/// Extracts the entities of one section from a document.
pub(super) fn extract(document: &Document, section: Section) -> SectionEntities {
    match section {
        Section::System => extract_system(document),
        Section::Interfaces => extract_interfaces(document),
        Section::Firewall => extract_firewall(document),
        Section::Nat => extract_nat(document),
        Section::Vlans => extract_vlans(document),
        Section::Dhcp => extract_dhcp(document),
        Section::Users => extract_users(document),
        Section::Routing => extract_routing(document),
    }
}

fn bool_str(value: bool) -> String {
    if value { "true" } else { "false" }.to_owned()
}

fn extract_system(document: &Document) -> SectionEntities {
    let system = &document.system;
    let entity = Entity {
        key: "system".to_owned(),
        fields: vec![
            ("hostname", system.hostname.clone()),
            ("domain", system.domain.clone()),
            ("timezone", system.timezone.clone()),
            ("dnsserver", system.dns_servers.join(",")),
            ("timeservers", system.ntp_servers.join(" ")),
            ("webgui.protocol", system.web_gui.protocol.clone()),
            ("webgui.port", system.web_gui.port.clone()),
            ("ssh.enabled", bool_str(system.ssh.enabled)),
            ("ssh.port", system.ssh.port.clone()),
            ("ssh.permitrootlogin", bool_str(system.ssh.permit_root_logon)),
            ("ssh.passwordauth", bool_str(system.ssh.password_auth)),
            ("ssh.idletimeout", system.ssh.idle_timeout.clone()),
            ("nextuid", system.next_uid.clone()),
            ("nextgid", system.next_gid.clone()),
            ("revision.time", system.revision_time.clone()),
        ],
        summary: format!("{}.{}", system.hostname, system.domain),
    };
    SectionEntities {
        entities: vec![entity],
        notes: Vec::new(),
    }
}

fn extract_interfaces(document: &Document) -> SectionEntities {
    let entities = document
        .interfaces
        .iter()
        .map(|interface| Entity {
            key: interface.name.clone(),
            fields: vec![
                ("enable", bool_str(interface.enabled)),
                ("descr", interface.descr.clone()),
                ("if", interface.device.clone()),
                ("ipaddr", interface.ipaddr.clone()),
                ("subnet", interface.subnet.clone()),
                ("ipaddrv6", interface.ipaddrv6.clone()),
                ("subnetv6", interface.subnetv6.clone()),
                ("gateway", interface.gateway.clone()),
                ("spoofmac", interface.spoof_mac.clone()),
                ("blockpriv", bool_str(interface.block_private)),
                ("blockbogons", bool_str(interface.block_bogons)),
            ],
            summary: format!(
                "{} on {} ({})",
                interface.name,
                interface.device,
                if interface.ipaddr.is_empty() {
                    "unassigned"
                } else {
                    &interface.ipaddr
                }
            ),
        })
        .collect();
    SectionEntities {
        entities,
        notes: Vec::new(),
    }
}

/// Builds the composite fallback key for a rule without a UUID.
fn firewall_composite_key(rule: &FirewallRule) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        rule.interface,
        rule.action,
        rule.protocol,
        rule.source.net,
        rule.destination.net,
        rule.destination.port
    )
}

fn firewall_summary(rule: &FirewallRule) -> String {
    let mut summary = format!(
        "{} {} {} -> {}",
        rule.action,
        if rule.protocol.is_empty() {
            "any"
        } else {
            &rule.protocol
        },
        endpoint_str(&rule.source.net, &rule.source.port),
        endpoint_str(&rule.destination.net, &rule.destination.port),
    );
    if rule.disabled {
        summary.push_str(" [disabled]");
    }
    summary
}

fn endpoint_str(net: &str, port: &str) -> String {
    let net = if net.is_empty() { "any" } else { net };
    if port.is_empty() {
        net.to_owned()
    } else {
        format!("{net}:{port}")
    }
}

fn extract_firewall(document: &Document) -> SectionEntities {
    let mut entities = Vec::with_capacity(document.firewall_rules.len());
    let mut missing_uuid = 0usize;
    for rule in &document.firewall_rules {
        let key = match &rule.uuid {
            Some(uuid) => uuid.clone(),
            None => {
                missing_uuid += 1;
                firewall_composite_key(rule)
            }
        };
        entities.push(Entity {
            key,
            fields: vec![
                ("type", rule.action.clone()),
                ("interface", rule.interface.clone()),
                ("ipprotocol", rule.ip_protocol.clone()),
                ("protocol", rule.protocol.clone()),
                ("source", rule.source.net.clone()),
                ("source.port", rule.source.port.clone()),
                ("destination", rule.destination.net.clone()),
                ("destination.port", rule.destination.port.clone()),
                ("disabled", bool_str(rule.disabled)),
                ("log", bool_str(rule.log)),
                ("quick", bool_str(rule.quick)),
                ("descr", rule.descr.clone()),
            ],
            summary: firewall_summary(rule),
        });
    }
    let mut notes = Vec::new();
    if missing_uuid > 0 {
        notes.push(format!(
            "firewall: {missing_uuid} rule(s) without uuid matched by composite key"
        ));
    }
    SectionEntities { entities, notes }
}

fn nat_composite_key(entry: &NatEntry) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        entry.interface, entry.protocol, entry.source, entry.destination, entry.destination_port
    )
}

fn extract_nat(document: &Document) -> SectionEntities {
    let mut entities = Vec::with_capacity(document.nat_rules.len());
    let mut missing_uuid = 0usize;
    for entry in &document.nat_rules {
        let key = match &entry.uuid {
            Some(uuid) => uuid.clone(),
            None => {
                missing_uuid += 1;
                nat_composite_key(entry)
            }
        };
        entities.push(Entity {
            key,
            fields: vec![
                ("interface", entry.interface.clone()),
                ("protocol", entry.protocol.clone()),
                ("source", entry.source.clone()),
                ("source.port", entry.source_port.clone()),
                ("destination", entry.destination.clone()),
                ("destination.port", entry.destination_port.clone()),
                ("target", entry.target.clone()),
                ("local-port", entry.local_port.clone()),
                ("disabled", bool_str(entry.disabled)),
                ("descr", entry.descr.clone()),
            ],
            summary: format!(
                "{} {} -> {}",
                endpoint_str(&entry.destination, &entry.destination_port),
                entry.interface,
                endpoint_str(&entry.target, &entry.local_port),
            ),
        });
    }
    let mut notes = Vec::new();
    if missing_uuid > 0 {
        notes.push(format!(
            "nat: {missing_uuid} entrie(s) without uuid matched by composite key"
        ));
    }
    SectionEntities { entities, notes }
}

fn extract_vlans(document: &Document) -> SectionEntities {
    let entities = document
        .vlans
        .iter()
        .map(|vlan| Entity {
            key: format!("{}.{}", vlan.parent_if, vlan.tag),
            fields: vec![
                ("pcp", vlan.pcp.clone()),
                ("vlanif", vlan.vlan_if.clone()),
                ("descr", vlan.descr.clone()),
            ],
            summary: format!("vlan {} on {}", vlan.tag, vlan.parent_if),
        })
        .collect();
    SectionEntities {
        entities,
        notes: Vec::new(),
    }
}

fn extract_dhcp(document: &Document) -> SectionEntities {
    let mut entities = Vec::new();
    for scope in &document.dhcp {
        entities.push(Entity {
            key: format!("scope:{}", scope.interface),
            fields: vec![
                ("enable", bool_str(scope.enabled)),
                ("range.from", scope.range_from.clone()),
                ("range.to", scope.range_to.clone()),
            ],
            summary: format!(
                "dhcp scope {} ({}-{})",
                scope.interface, scope.range_from, scope.range_to
            ),
        });
        for reservation in &scope.static_maps {
            entities.push(Entity {
                key: reservation.mac.clone(),
                fields: vec![
                    ("ipaddr", reservation.ipaddr.clone()),
                    ("hostname", reservation.hostname.clone()),
                    ("descr", reservation.descr.clone()),
                ],
                summary: format!(
                    "reservation {} -> {} ({})",
                    reservation.mac, reservation.ipaddr, reservation.hostname
                ),
            });
        }
    }
    SectionEntities {
        entities,
        notes: Vec::new(),
    }
}

fn extract_users(document: &Document) -> SectionEntities {
    let entities = document
        .users
        .iter()
        .map(|user| Entity {
            key: user.name.clone(),
            fields: vec![
                ("uid", user.uid.clone()),
                ("groupname", user.groups.clone()),
                ("descr", user.descr.clone()),
                ("shell", user.shell.clone()),
                ("disabled", bool_str(user.disabled)),
                ("password", user.password_hash.clone()),
                ("authorizedkeys", user.authorized_keys.clone()),
                ("otp_seed", user.otp_seed.clone()),
            ],
            summary: format!("user {} (groups: {})", user.name, user.groups),
        })
        .collect();
    SectionEntities {
        entities,
        notes: Vec::new(),
    }
}

fn extract_routing(document: &Document) -> SectionEntities {
    let mut entities = Vec::new();
    for gateway in &document.gateways {
        entities.push(Entity {
            key: format!("gateway:{}", gateway.name),
            fields: vec![
                ("interface", gateway.interface.clone()),
                ("gateway", gateway.gateway.clone()),
                ("ipprotocol", gateway.ip_protocol.clone()),
                ("defaultgw", bool_str(gateway.default_gw)),
                ("descr", gateway.descr.clone()),
            ],
            summary: format!("gateway {} via {}", gateway.name, gateway.gateway),
        });
    }
    for route in &document.routes {
        entities.push(Entity {
            key: format!("route:{}|{}", route.network, route.gateway),
            fields: vec![
                ("disabled", bool_str(route.disabled)),
                ("descr", route.descr.clone()),
            ],
            summary: format!("route {} via {}", route.network, route.gateway),
        });
    }
    SectionEntities {
        entities,
        notes: Vec::new(),
    }
}
