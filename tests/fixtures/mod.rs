// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for topology-assistant
//!
//! Deterministic inventories describing one small River system.
//!
//! # Layout
//! - Cabinet `x3000` with one management node, one compute node and one leaf
//!   switch (`sw-leaf-bmc-001`, already holding `.2` on the HMN)
//! - Fabric networks HMN, NMN, MTL, CMN, each with a `network_hardware` subnet
//! - Cabinet networks HMN_RVR and NMN_RVR, empty
//! - External networks CAN and CHN, each with a `bootstrap_dhcp` subnet
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use topology_assistant::domain::{
    CabinetNetwork, CabinetProperties, HardwareClass, HardwareKind, HardwareProperties,
    HardwareRecord, InventoryState, IpReservation, Ipv4Cidr, NetworkDetail, NetworkRecord,
    NodeProperties, Subnet, SwitchProperties, VlanId, Xname, FIXME_PLACEHOLDER,
};

pub const CABINET: &str = "x3000";
pub const MANAGEMENT_NODE: &str = "x3000c0s1b0n0";
pub const COMPUTE_NODE: &str = "x3000c0s9b0n0";
pub const LEAF_SWITCH: &str = "x3000c0w14";
pub const LEAF_SWITCH_ALIAS: &str = "sw-leaf-bmc-001";

pub fn xname(s: &str) -> Xname {
    Xname::new(s).expect("Invalid xname in test fixture")
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().expect("Invalid IP in test fixture")
}

pub fn cidr(s: &str) -> Ipv4Cidr {
    Ipv4Cidr::new(s).expect("Invalid CIDR in test fixture")
}

pub fn vlan(id: u16) -> VlanId {
    VlanId::new(id).expect("Invalid VLAN in test fixture")
}

// ============================================================================
// Networks
// ============================================================================

pub fn subnet(name: &str, block: &str, gateway: &str) -> Subnet {
    Subnet {
        name: name.to_string(),
        full_name: String::new(),
        cidr: cidr(block),
        vlan_id: None,
        gateway: ip(gateway),
        dhcp_start: None,
        dhcp_end: None,
        ip_reservations: Vec::new(),
        extra: BTreeMap::new(),
    }
}

pub fn dhcp_subnet(name: &str, block: &str, gateway: &str, start: &str, end: &str) -> Subnet {
    Subnet {
        dhcp_start: Some(ip(start)),
        dhcp_end: Some(ip(end)),
        ..subnet(name, block, gateway)
    }
}

pub fn reservation(address: &str, name: &str, owner: &str) -> IpReservation {
    IpReservation::new(ip(address), name, &xname(owner))
}

pub fn network(name: &str, block: &str, subnets: Vec<Subnet>) -> NetworkRecord {
    let mut detail = NetworkDetail::new(cidr(block));
    detail.subnets = subnets;
    NetworkRecord::new(name, detail)
}

pub fn hmn() -> NetworkRecord {
    let mut hardware = subnet("network_hardware", "10.254.0.0/24", "10.254.0.1");
    hardware
        .ip_reservations
        .push(reservation("10.254.0.2", LEAF_SWITCH_ALIAS, LEAF_SWITCH));
    network("HMN", "10.254.0.0/17", vec![hardware])
}

pub fn nmn() -> NetworkRecord {
    network(
        "NMN",
        "10.252.0.0/17",
        vec![subnet("network_hardware", "10.252.0.0/24", "10.252.0.1")],
    )
}

pub fn mtl() -> NetworkRecord {
    network(
        "MTL",
        "10.1.0.0/16",
        vec![subnet("network_hardware", "10.1.0.0/24", "10.1.0.1")],
    )
}

pub fn cmn() -> NetworkRecord {
    network(
        "CMN",
        "10.103.6.0/24",
        vec![subnet("network_hardware", "10.103.6.0/25", "10.103.6.1")],
    )
}

pub fn hmn_rvr() -> NetworkRecord {
    network("HMN_RVR", "10.107.0.0/17", vec![])
}

pub fn nmn_rvr() -> NetworkRecord {
    network("NMN_RVR", "10.106.0.0/17", vec![])
}

/// CAN with one free static address (.3) below a DHCP pool starting at .4
pub fn can() -> NetworkRecord {
    let mut bootstrap =
        dhcp_subnet("bootstrap_dhcp", "10.102.4.0/25", "10.102.4.1", "10.102.4.4", "10.102.4.100");
    bootstrap
        .ip_reservations
        .push(reservation("10.102.4.2", "uan00", "x3000c0s25b0n0"));
    network("CAN", "10.102.4.0/24", vec![bootstrap])
}

pub fn chn() -> NetworkRecord {
    network(
        "CHN",
        "10.103.9.0/24",
        vec![dhcp_subnet(
            "bootstrap_dhcp",
            "10.103.9.0/25",
            "10.103.9.1",
            "10.103.9.50",
            "10.103.9.120",
        )],
    )
}

pub fn all_networks() -> Vec<NetworkRecord> {
    vec![hmn(), nmn(), mtl(), cmn(), hmn_rvr(), nmn_rvr(), can(), chn()]
}

// ============================================================================
// Hardware
// ============================================================================

pub fn cabinet(x: &str, class: HardwareClass) -> HardwareRecord {
    HardwareRecord::new(
        xname(x),
        HardwareKind::Cabinet,
        class,
        HardwareProperties::Cabinet(CabinetProperties::default()),
    )
    .expect("Invalid cabinet fixture")
}

/// Cabinet whose payload already declares compute-network VLANs
pub fn cabinet_with_vlans(x: &str, hmn_vlan: u16, nmn_vlan: u16) -> HardwareRecord {
    let mut record = cabinet(x, HardwareClass::River);
    let properties = record.cabinet_mut().expect("Cabinet payload");
    let mut group = BTreeMap::new();
    group.insert(
        "HMN".to_string(),
        CabinetNetwork {
            cidr: cidr("0.0.0.0/22"),
            gateway: ip("0.0.0.1"),
            vlan: vlan(hmn_vlan),
        },
    );
    group.insert(
        "NMN".to_string(),
        CabinetNetwork {
            cidr: cidr("0.0.0.0/22"),
            gateway: ip("0.0.0.1"),
            vlan: vlan(nmn_vlan),
        },
    );
    properties
        .networks
        .insert(CabinetProperties::COMPUTE_NETWORKS.to_string(), group);
    record
}

pub fn switch(x: &str, kind: HardwareKind, aliases: &[&str]) -> HardwareRecord {
    let properties = SwitchProperties {
        ip4addr: None,
        brand: Some("Aruba".to_string()),
        model: None,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        extra: BTreeMap::new(),
    };
    HardwareRecord::new(
        xname(x),
        kind,
        HardwareClass::River,
        HardwareProperties::Switch(properties),
    )
    .expect("Invalid switch fixture")
}

pub fn leaf_switch(x: &str, alias: &str) -> HardwareRecord {
    switch(x, HardwareKind::MgmtSwitch, &[alias])
}

pub fn node_with(
    x: &str,
    class: HardwareClass,
    role: &str,
    sub_role: Option<&str>,
    nid: Option<u32>,
    aliases: &[&str],
) -> HardwareRecord {
    let properties = NodeProperties {
        nid,
        role: role.to_string(),
        sub_role: sub_role.map(str::to_string),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        extra: BTreeMap::new(),
    };
    HardwareRecord::new(xname(x), HardwareKind::Node, class, HardwareProperties::Node(properties))
        .expect("Invalid node fixture")
}

pub fn compute_node(x: &str, nid: u32) -> HardwareRecord {
    let alias = format!("nid{:06}", nid);
    node_with(
        x,
        HardwareClass::River,
        NodeProperties::ROLE_COMPUTE,
        None,
        Some(nid),
        &[alias.as_str()],
    )
}

pub fn management_node(x: &str, alias: &str) -> HardwareRecord {
    node_with(
        x,
        HardwareClass::River,
        NodeProperties::ROLE_MANAGEMENT,
        Some("Master"),
        None,
        &[alias],
    )
}

pub fn uan(x: &str, alias: &str) -> HardwareRecord {
    node_with(
        x,
        HardwareClass::River,
        NodeProperties::ROLE_APPLICATION,
        Some("UAN"),
        None,
        &[alias],
    )
}

pub fn uan_with_placeholders(x: &str) -> HardwareRecord {
    node_with(
        x,
        HardwareClass::River,
        NodeProperties::ROLE_APPLICATION,
        Some(FIXME_PLACEHOLDER),
        None,
        &[FIXME_PLACEHOLDER],
    )
}

pub fn chassis_bmc(x: &str) -> HardwareRecord {
    HardwareRecord::new(
        xname(x),
        HardwareKind::ChassisBmc,
        HardwareClass::Mountain,
        HardwareProperties::empty(),
    )
    .expect("Invalid chassis BMC fixture")
}

// ============================================================================
// Inventories
// ============================================================================

pub fn base_hardware() -> Vec<HardwareRecord> {
    vec![
        cabinet(CABINET, HardwareClass::River),
        management_node(MANAGEMENT_NODE, "ncn-m001"),
        compute_node(COMPUTE_NODE, 1),
        leaf_switch(LEAF_SWITCH, LEAF_SWITCH_ALIAS),
    ]
}

/// The recorded inventory: base hardware plus every network
pub fn current_state() -> InventoryState {
    InventoryState::from_hardware(base_hardware())
        .and_then(|state| state.with_networks(all_networks()))
        .expect("Invalid current state fixture")
}

/// Recorded inventory with only the given networks
pub fn current_state_with_networks(networks: Vec<NetworkRecord>) -> InventoryState {
    InventoryState::from_hardware(base_hardware())
        .and_then(|state| state.with_networks(networks))
        .expect("Invalid current state fixture")
}

/// Base hardware plus `extra`, with no networks
pub fn expected_state_with(extra: Vec<HardwareRecord>) -> InventoryState {
    InventoryState::from_hardware(base_hardware().into_iter().chain(extra))
        .expect("Invalid expected state fixture")
}

/// Expected inventory built from an arbitrary hardware list
pub fn expected_state(hardware: Vec<HardwareRecord>) -> InventoryState {
    InventoryState::from_hardware(hardware).expect("Invalid expected state fixture")
}
