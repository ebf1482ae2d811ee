// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Reconciliation Engine
//!
//! Compares the inventory recorded by the inventory service with the inventory
//! a topology description says should exist, and works out what to add.
//!
//! # Pass
//!
//! ```text
//! current ─┐
//!          ├─ scope filter ─ diff ─ guard rails ─ expansion ─ TopologyChanges
//! expected ┘
//! ```
//!
//! 1. Preconditions: the current inventory has networks; expected application
//!    nodes carry no placeholder metadata and no shared aliases.
//! 2. Scope filter: only River hardware that is not a management node.
//! 3. Diff into removed / added / identical / differing.
//! 4. Guard rails: anything removed or differing aborts the pass.
//! 5. Expansion over `added` in identifier order: cabinet subnets, then
//!    management switch addresses, then user access node addresses.
//!
//! A pass works on copies of the networks it touches and either returns a
//! complete change-set or an error; there is no partial result.

pub mod builder;
pub mod changes;

pub use builder::{build_expected_state, HardwareBuilder};
pub use changes::{IpReservationEvent, SubnetEvent, TopologyChanges};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::diff::HardwareComparison;
use crate::domain::{
    CabinetNetwork, CabinetProperties, HardwareClass, HardwareKind, HardwareRecord,
    InventoryState, NetworkDetail, NetworkRecord, Xname,
};
use crate::errors::{TopologyError, TopologyResult};
use crate::ipam::{allocate_cabinet_subnet, allocate_ip, ensure_static_capacity, CabinetSubnetRequest};

/// Hardware this engine reconciles: River class, not a management node
pub fn in_scope(record: &HardwareRecord) -> bool {
    record.class == HardwareClass::River && !record.is_management_node()
}

/// Runs reconciliation passes
#[derive(Debug, Clone, Default)]
pub struct TopologyEngine {
    config: EngineConfig,
}

impl TopologyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the expected inventory with `builder`, then reconcile against it
    pub fn determine_changes_from<B: HardwareBuilder>(
        &self,
        current: &InventoryState,
        builder: &B,
        nodes: &[B::TopologyNode],
    ) -> TopologyResult<TopologyChanges> {
        let expected = build_expected_state(builder, nodes)?;
        self.determine_changes(current, &expected)
    }

    /// Work out the additive change-set that takes `current` to `expected`
    ///
    /// Neither input is modified.
    pub fn determine_changes(
        &self,
        current: &InventoryState,
        expected: &InventoryState,
    ) -> TopologyResult<TopologyChanges> {
        info!(
            current = current.hardware_count(),
            expected = expected.hardware_count(),
            networks = current.networks().len(),
            "Determining topology changes"
        );

        if current.networks().is_empty() {
            return Err(TopologyError::NoNetworks);
        }
        check_application_nodes(current, expected)?;

        let current_scoped = current.filter_hardware(in_scope);
        let expected_scoped = expected.filter_hardware(in_scope);

        let comparison = HardwareComparison::between(&current_scoped, &expected_scoped);
        comparison.log_report();

        if !comparison.is_additive() {
            return Err(TopologyError::GuardRailViolation {
                removed: comparison
                    .removed
                    .iter()
                    .map(|record| record.xname().to_string())
                    .collect(),
                differing: comparison
                    .differing
                    .iter()
                    .map(|pair| pair.current.xname().to_string())
                    .collect(),
            });
        }

        let mut pass = Pass::new(&self.config, current, comparison.added.iter().copied());
        pass.allocate_cabinet_subnets()?;
        pass.allocate_switch_addresses()?;
        pass.allocate_uan_addresses()?;

        let changes = pass.finish();
        info!(
            hardware_added = changes.hardware_added.len(),
            modified_networks = changes.modified_networks.len(),
            subnets_added = changes.subnets_added.len(),
            ip_reservations_added = changes.ip_reservations_added.len(),
            "Topology changes determined"
        );
        Ok(changes)
    }
}

/// Refuse expected application nodes that still need operator input
fn check_application_nodes(current: &InventoryState, expected: &InventoryState) -> TopologyResult<()> {
    for (alias, xnames) in current.application_node_aliases() {
        if xnames.len() > 1 {
            warn!(
                alias = %alias,
                xnames = ?xnames,
                "Alias is used by multiple application nodes in the current inventory"
            );
        }
    }

    let placeholders: Vec<String> = expected
        .hardware()
        .filter(|record| {
            record
                .node()
                .is_some_and(|node| node.is_application() && node.has_placeholders())
        })
        .map(|record| record.xname().to_string())
        .collect();
    if !placeholders.is_empty() {
        for xname in &placeholders {
            warn!(xname = %xname, "Application node has placeholder metadata");
        }
        return Err(TopologyError::Placeholders(placeholders));
    }

    if let Some((alias, xnames)) = expected
        .application_node_aliases()
        .into_iter()
        .find(|(_, xnames)| xnames.len() > 1)
    {
        return Err(TopologyError::DuplicateAlias {
            alias,
            xnames: xnames.iter().map(Xname::to_string).collect(),
        });
    }

    Ok(())
}

fn network_detail_mut<'n>(
    networks: &'n mut BTreeMap<String, NetworkRecord>,
    name: &str,
) -> TopologyResult<&'n mut NetworkDetail> {
    networks
        .get_mut(name)
        .map(|network| &mut network.detail)
        .ok_or_else(|| TopologyError::MissingNetwork(name.to_string()))
}

/// State of one reconciliation pass
struct Pass<'a> {
    config: &'a EngineConfig,
    /// Working copies of every current network
    networks: BTreeMap<String, NetworkRecord>,
    modified: BTreeSet<String>,
    /// New hardware, possibly stamped with allocation results
    added: BTreeMap<Xname, HardwareRecord>,
    subnets_added: Vec<SubnetEvent>,
    ip_reservations_added: Vec<IpReservationEvent>,
}

impl<'a> Pass<'a> {
    fn new<'h>(
        config: &'a EngineConfig,
        current: &InventoryState,
        added: impl Iterator<Item = &'h HardwareRecord>,
    ) -> Self {
        Self {
            config,
            networks: current.networks().clone(),
            modified: BTreeSet::new(),
            added: added
                .map(|record| (record.xname().clone(), record.clone()))
                .collect(),
            subnets_added: Vec::new(),
            ip_reservations_added: Vec::new(),
        }
    }

    fn added_of_kind(&self, keep: impl Fn(&HardwareKind) -> bool) -> Vec<&HardwareRecord> {
        self.added
            .values()
            .filter(|record| keep(record.kind()))
            .collect()
    }

    /// One subnet per cabinet network family, stamped back onto the cabinet
    fn allocate_cabinet_subnets(&mut self) -> TopologyResult<()> {
        let config = self.config;
        let cabinets: Vec<(Xname, HardwareClass)> = self
            .added_of_kind(|kind| *kind == HardwareKind::Cabinet)
            .into_iter()
            .map(|record| (record.xname().clone(), record.class))
            .collect();

        for (xname, class) in cabinets {
            for family in &config.cabinet_network_families {
                let network_name = EngineConfig::cabinet_network_name(family, class);

                let declared = self
                    .added
                    .get(&xname)
                    .and_then(HardwareRecord::cabinet)
                    .and_then(|cabinet| cabinet.declared_vlan(family));
                let vlan = config.vlan_override(&xname, family).or(declared);

                let request = CabinetSubnetRequest::new(xname.clone(), vlan)
                    .with_prefix_length(config.cabinet_prefix_length)
                    .with_dhcp_start_offset(config.dhcp_start_offset);

                let detail = network_detail_mut(&mut self.networks, &network_name)?;
                let subnet = allocate_cabinet_subnet(detail, &request)
                    .map_err(|e| TopologyError::allocation(&network_name, e))?;
                detail.subnets.push(subnet.clone());
                self.modified.insert(network_name.clone());

                info!(
                    cabinet = %xname,
                    network = %network_name,
                    subnet = %subnet.name,
                    cidr = %subnet.cidr,
                    "Allocated cabinet subnet"
                );

                let cabinet = self
                    .added
                    .get_mut(&xname)
                    .and_then(HardwareRecord::cabinet_mut)
                    .ok_or_else(|| TopologyError::MalformedInput {
                        record: xname.to_string(),
                        reason: "cabinet without cabinet properties".to_string(),
                    })?;
                if let Some(vlan) = subnet.vlan_id {
                    cabinet
                        .networks
                        .entry(CabinetProperties::COMPUTE_NETWORKS.to_string())
                        .or_default()
                        .insert(
                            family.clone(),
                            CabinetNetwork {
                                cidr: subnet.cidr,
                                gateway: subnet.gateway,
                                vlan,
                            },
                        );
                }

                self.subnets_added.push(SubnetEvent {
                    network_name,
                    subnet_name: subnet.name.clone(),
                    subnet,
                    causing_xname: xname.clone(),
                });
            }
        }

        Ok(())
    }

    /// One address per fabric network for each management switch
    fn allocate_switch_addresses(&mut self) -> TopologyResult<()> {
        let config = self.config;

        let mut switches = Vec::new();
        for record in self.added_of_kind(|kind| kind.is_management_switch()) {
            let alias = match record.switch().map(|switch| switch.aliases.as_slice()) {
                Some([alias]) => alias.clone(),
                _ => {
                    return Err(TopologyError::MalformedInput {
                        record: record.xname().to_string(),
                        reason: "management switch must have exactly one alias".to_string(),
                    })
                }
            };
            switches.push((record.xname().clone(), record.kind().clone(), alias));
        }
        if switches.is_empty() {
            return Ok(());
        }

        let fabric: Vec<&String> = config
            .fabric_networks
            .iter()
            .filter(|name| {
                let present = self.networks.contains_key(name.as_str());
                if !present {
                    warn!(network = %name, "Fabric network does not exist, skipping switch allocations");
                }
                present
            })
            .collect();

        for (xname, kind, alias) in switches {
            for network_name in &fabric {
                let subnet_name = &config.network_hardware_subnet;
                let subnet = network_detail_mut(&mut self.networks, network_name)?
                    .lookup_subnet_mut(subnet_name)
                    .ok_or_else(|| TopologyError::MissingSubnet {
                        network: network_name.to_string(),
                        subnet: subnet_name.clone(),
                    })?;

                let reservation = allocate_ip(subnet, &xname, &alias)
                    .map_err(|e| TopologyError::allocation(network_name.as_str(), e))?;
                subnet.ip_reservations.push(reservation.clone());
                self.modified.insert(network_name.to_string());

                info!(
                    switch = %xname,
                    network = %network_name,
                    ip = %reservation.address,
                    alias = %alias,
                    "Allocated switch IP"
                );

                if kind == HardwareKind::MgmtSwitch
                    && network_name.as_str() == config.leaf_address_network
                {
                    if let Some(switch) = self.added.get_mut(&xname).and_then(HardwareRecord::switch_mut) {
                        switch.ip4addr = Some(reservation.address);
                    }
                }

                self.ip_reservations_added.push(IpReservationEvent {
                    network_name: network_name.to_string(),
                    subnet_name: subnet_name.clone(),
                    reservation,
                    causing_xname: xname.clone(),
                });
            }
        }

        Ok(())
    }

    /// External-access addresses for new user access nodes
    fn allocate_uan_addresses(&mut self) -> TopologyResult<()> {
        let config = self.config;

        let mut uans = Vec::new();
        for record in self.added.values() {
            let Some(node) = record.node() else {
                continue;
            };
            if !node.is_application() || !node.has_sub_role(&config.uan_sub_role) {
                continue;
            }
            let alias = node.primary_alias().ok_or_else(|| TopologyError::MalformedInput {
                record: record.xname().to_string(),
                reason: "user access node without an alias".to_string(),
            })?;
            uans.push((alias.to_string(), record.xname().clone()));
        }
        if uans.is_empty() {
            return Ok(());
        }
        uans.sort();

        let external: Vec<&String> = config
            .external_networks
            .iter()
            .filter(|name| self.networks.contains_key(name.as_str()))
            .collect();
        if external.is_empty() {
            return Err(TopologyError::MissingExternalNetworks(
                config.external_networks.join(", "),
            ));
        }

        let needed = u32::try_from(uans.len()).unwrap_or(u32::MAX);
        for network_name in external {
            let subnet_name = &config.bootstrap_dhcp_subnet;
            let subnet = network_detail_mut(&mut self.networks, network_name)?
                .lookup_subnet_mut(subnet_name)
                .ok_or_else(|| TopologyError::MissingSubnet {
                    network: network_name.clone(),
                    subnet: subnet_name.clone(),
                })?;

            let expanded = ensure_static_capacity(subnet, needed)
                .map_err(|e| TopologyError::allocation(network_name.as_str(), e))?;
            if expanded > 0 {
                info!(
                    network = %network_name,
                    subnet = %subnet_name,
                    by = expanded,
                    "Expanded static IP range"
                );
            }

            for (alias, xname) in &uans {
                let reservation = allocate_ip(subnet, xname, alias)
                    .map_err(|e| TopologyError::allocation(network_name.as_str(), e))?;
                subnet.ip_reservations.push(reservation.clone());

                info!(
                    node = %xname,
                    network = %network_name,
                    ip = %reservation.address,
                    alias = %alias,
                    "Allocated UAN IP"
                );

                self.ip_reservations_added.push(IpReservationEvent {
                    network_name: network_name.clone(),
                    subnet_name: subnet_name.clone(),
                    reservation,
                    causing_xname: xname.clone(),
                });
            }
            self.modified.insert(network_name.clone());
        }

        Ok(())
    }

    fn finish(self) -> TopologyChanges {
        let mut networks = self.networks;
        let modified_networks = self
            .modified
            .into_iter()
            .filter_map(|name| networks.remove(&name).map(|network| (name, network)))
            .collect();

        debug!(unchanged = networks.len(), "Networks left untouched");

        TopologyChanges {
            hardware_added: self.added.into_values().collect(),
            modified_networks,
            subnets_added: self.subnets_added,
            ip_reservations_added: self.ip_reservations_added,
        }
    }
}
