//! Binding from the element tree to the typed [`Document`].
//!
//! Binding is total: missing elements become defaults and nothing here
//! fails. Semantic problems (bad MAC, duplicate user, out-of-range VLAN
//! tag) are the validator's job, not the binder's.
use crate::model::{
    DhcpScope, DhcpStatic, Document, FirewallRule, Gateway, Interface, NatEntry, RuleEndpoint,
    SshSettings, StaticRoute, SystemSection, Tunable, User, Vlan, WebGui,
};
use crate::normalize::{normalize_mac, parse_flag};

use super::XmlElement;

/// Binds a parsed `opnsense` element tree into a [`Document`].
pub(super) fn bind_document(root: &XmlElement) -> Document {
    let system_el = root.child("system");
    let mut system = system_el.map(bind_system).unwrap_or_default();
    // <revision> lives under the root, not under <system>.
    system.revision_time = root
        .child("revision")
        .and_then(|r| r.text_of("time"))
        .unwrap_or("")
        .to_owned();
    Document {
        system,
        interfaces: root.child("interfaces").map_or_else(Vec::new, |el| {
            el.children.iter().map(bind_interface).collect()
        }),
        firewall_rules: root.child("filter").map_or_else(Vec::new, |el| {
            el.children_named("rule").map(bind_firewall_rule).collect()
        }),
        nat_rules: root.child("nat").map_or_else(Vec::new, bind_nat),
        vlans: root.child("vlans").map_or_else(Vec::new, |el| {
            el.children_named("vlan").map(bind_vlan).collect()
        }),
        dhcp: root.child("dhcpd").map_or_else(Vec::new, |el| {
            el.children.iter().map(bind_dhcp_scope).collect()
        }),
        users: system_el.map_or_else(Vec::new, |el| {
            el.children_named("user").map(bind_user).collect()
        }),
        routes: root.child("staticroutes").map_or_else(Vec::new, |el| {
            el.children_named("route").map(bind_route).collect()
        }),
        gateways: root.child("gateways").map_or_else(Vec::new, |el| {
            el.children_named("gateway_item").map(bind_gateway).collect()
        }),
        tunables: root.child("sysctl").map_or_else(Vec::new, |el| {
            el.children_named("item").map(bind_tunable).collect()
        }),
    }
}

fn text_or_empty(el: &XmlElement, name: &str) -> String {
    el.text_of(name).unwrap_or("").to_owned()
}

fn flag(el: &XmlElement, name: &str) -> bool {
    parse_flag(el.text_of(name))
}

fn bind_system(el: &XmlElement) -> SystemSection {
    let webgui = el.child("webgui");
    let ssh = el.child("ssh");
    SystemSection {
        hostname: text_or_empty(el, "hostname"),
        domain: text_or_empty(el, "domain"),
        timezone: text_or_empty(el, "timezone"),
        dns_servers: el
            .children_named("dnsserver")
            .map(|c| c.text.clone())
            .filter(|t| !t.is_empty())
            .collect(),
        // One space-separated element, unlike the repeated <dnsserver>.
        ntp_servers: el
            .text_of("timeservers")
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_owned)
            .collect(),
        web_gui: webgui
            .map(|w| WebGui {
                protocol: text_or_empty(w, "protocol"),
                port: text_or_empty(w, "port"),
            })
            .unwrap_or_default(),
        ssh: ssh.map(bind_ssh).unwrap_or_default(),
        next_uid: text_or_empty(el, "nextuid"),
        next_gid: text_or_empty(el, "nextgid"),
        revision_time: String::new(),
    }
}

fn bind_ssh(el: &XmlElement) -> SshSettings {
    // The appliance writes <enabled>enabled</enabled> rather than a flag.
    let enabled = el
        .text_of("enabled")
        .is_some_and(|v| v == "enabled" || parse_flag(Some(v)));
    SshSettings {
        enabled,
        port: text_or_empty(el, "port"),
        permit_root_logon: flag(el, "permitrootlogin"),
        password_auth: flag(el, "passwordauth"),
        idle_timeout: text_or_empty(el, "idletimeout"),
    }
}

fn bind_interface(el: &XmlElement) -> Interface {
    Interface {
        name: el.name.clone(),
        device: text_or_empty(el, "if"),
        enabled: flag(el, "enable"),
        descr: text_or_empty(el, "descr"),
        ipaddr: text_or_empty(el, "ipaddr"),
        subnet: text_or_empty(el, "subnet"),
        ipaddrv6: text_or_empty(el, "ipaddrv6"),
        subnetv6: text_or_empty(el, "subnetv6"),
        gateway: text_or_empty(el, "gateway"),
        spoof_mac: text_or_empty(el, "spoofmac"),
        block_private: flag(el, "blockpriv"),
        block_bogons: flag(el, "blockbogons"),
    }
}

/// Binds a `<source>` or `<destination>` endpoint element.
///
/// `<any/>` wins over `<network>`/`<address>`; the element also carries the
/// optional `<port>`.
fn bind_endpoint(el: Option<&XmlElement>) -> RuleEndpoint {
    let Some(el) = el else {
        return RuleEndpoint::default();
    };
    let net = if el.child("any").is_some() {
        "any".to_owned()
    } else if let Some(network) = el.text_of("network") {
        network.to_owned()
    } else {
        text_or_empty(el, "address")
    };
    RuleEndpoint {
        net,
        port: text_or_empty(el, "port"),
    }
}

fn bind_firewall_rule(el: &XmlElement) -> FirewallRule {
    FirewallRule {
        uuid: el.attr("uuid").map(str::to_owned),
        action: text_or_empty(el, "type"),
        interface: text_or_empty(el, "interface"),
        ip_protocol: text_or_empty(el, "ipprotocol"),
        protocol: text_or_empty(el, "protocol"),
        source: bind_endpoint(el.child("source")),
        destination: bind_endpoint(el.child("destination")),
        disabled: flag(el, "disabled"),
        log: flag(el, "log"),
        quick: flag(el, "quick"),
        descr: text_or_empty(el, "descr"),
    }
}

/// Binds the `<nat>` section: port-forward rules directly under `<nat>`,
/// outbound rules under `<nat><outbound>`.
fn bind_nat(el: &XmlElement) -> Vec<NatEntry> {
    let mut entries: Vec<NatEntry> = el.children_named("rule").map(bind_nat_rule).collect();
    if let Some(outbound) = el.child("outbound") {
        entries.extend(outbound.children_named("rule").map(bind_nat_rule));
    }
    entries
}

fn bind_nat_rule(el: &XmlElement) -> NatEntry {
    let source = bind_endpoint(el.child("source"));
    let destination = bind_endpoint(el.child("destination"));
    NatEntry {
        uuid: el.attr("uuid").map(str::to_owned),
        interface: text_or_empty(el, "interface"),
        protocol: text_or_empty(el, "protocol"),
        source: source.net,
        source_port: source.port,
        destination: destination.net,
        destination_port: destination.port,
        target: text_or_empty(el, "target"),
        local_port: text_or_empty(el, "local-port"),
        disabled: flag(el, "disabled"),
        descr: text_or_empty(el, "descr"),
    }
}

fn bind_vlan(el: &XmlElement) -> Vlan {
    Vlan {
        parent_if: text_or_empty(el, "if"),
        tag: text_or_empty(el, "tag"),
        pcp: text_or_empty(el, "pcp"),
        vlan_if: text_or_empty(el, "vlanif"),
        descr: text_or_empty(el, "descr"),
    }
}

fn bind_dhcp_scope(el: &XmlElement) -> DhcpScope {
    let range = el.child("range");
    DhcpScope {
        interface: el.name.clone(),
        enabled: flag(el, "enable"),
        range_from: range.map_or_else(String::new, |r| text_or_empty(r, "from")),
        range_to: range.map_or_else(String::new, |r| text_or_empty(r, "to")),
        static_maps: el
            .children_named("staticmap")
            .map(bind_dhcp_static)
            .collect(),
    }
}

fn bind_dhcp_static(el: &XmlElement) -> DhcpStatic {
    DhcpStatic {
        // Identity key — hoisted in canonical form so revisions match.
        mac: normalize_mac(el.text_of("mac").unwrap_or("")),
        ipaddr: text_or_empty(el, "ipaddr"),
        hostname: text_or_empty(el, "hostname"),
        descr: text_or_empty(el, "descr"),
    }
}

fn bind_user(el: &XmlElement) -> User {
    User {
        name: text_or_empty(el, "name"),
        uid: text_or_empty(el, "uid"),
        groups: el
            .children_named("groupname")
            .map(|g| g.text.clone())
            .collect::<Vec<_>>()
            .join(","),
        descr: text_or_empty(el, "descr"),
        shell: text_or_empty(el, "shell"),
        disabled: flag(el, "disabled"),
        password_hash: text_or_empty(el, "password"),
        authorized_keys: text_or_empty(el, "authorizedkeys"),
        otp_seed: text_or_empty(el, "otp_seed"),
    }
}

fn bind_route(el: &XmlElement) -> StaticRoute {
    StaticRoute {
        network: text_or_empty(el, "network"),
        gateway: text_or_empty(el, "gateway"),
        disabled: flag(el, "disabled"),
        descr: text_or_empty(el, "descr"),
    }
}

fn bind_gateway(el: &XmlElement) -> Gateway {
    Gateway {
        name: text_or_empty(el, "name"),
        interface: text_or_empty(el, "interface"),
        gateway: text_or_empty(el, "gateway"),
        ip_protocol: text_or_empty(el, "ipprotocol"),
        default_gw: flag(el, "defaultgw"),
        descr: text_or_empty(el, "descr"),
    }
}

fn bind_tunable(el: &XmlElement) -> Tunable {
    Tunable {
        name: text_or_empty(el, "tunable"),
        value: text_or_empty(el, "value"),
        descr: text_or_empty(el, "descr"),
    }
}
