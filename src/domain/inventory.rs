// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory State
//!
//! Identifier-keyed hardware plus name-keyed networks. Both maps are ordered so
//! iteration is deterministic without extra sorting.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use super::{HardwareRecord, NetworkRecord, Xname};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Found duplicate xname {0}")]
    DuplicateHardware(Xname),

    #[error("Found duplicate network {0}")]
    DuplicateNetwork(String),
}

/// Snapshot of a cluster's hardware and network records
///
/// Serializes in the inventory service's dump layout; decoding goes through
/// [`crate::adapters::sls::SlsState`] so errors can name the offending record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryState {
    #[serde(rename = "Hardware")]
    hardware: BTreeMap<Xname, HardwareRecord>,

    #[serde(rename = "Networks")]
    networks: BTreeMap<String, NetworkRecord>,
}

impl InventoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hardware record; a second record with the same identifier is an error
    pub fn insert_hardware(&mut self, hardware: HardwareRecord) -> Result<(), InventoryError> {
        let xname = hardware.xname().clone();
        if self.hardware.contains_key(&xname) {
            return Err(InventoryError::DuplicateHardware(xname));
        }
        self.hardware.insert(xname, hardware);
        Ok(())
    }

    pub fn insert_network(&mut self, network: NetworkRecord) -> Result<(), InventoryError> {
        if self.networks.contains_key(&network.name) {
            return Err(InventoryError::DuplicateNetwork(network.name));
        }
        self.networks.insert(network.name.clone(), network);
        Ok(())
    }

    /// Build from hardware records, rejecting duplicate identifiers
    pub fn from_hardware(
        hardware: impl IntoIterator<Item = HardwareRecord>,
    ) -> Result<Self, InventoryError> {
        let mut state = Self::new();
        for record in hardware {
            state.insert_hardware(record)?;
        }
        Ok(state)
    }

    pub fn with_networks(
        mut self,
        networks: impl IntoIterator<Item = NetworkRecord>,
    ) -> Result<Self, InventoryError> {
        for network in networks {
            self.insert_network(network)?;
        }
        Ok(self)
    }

    pub fn hardware(&self) -> impl Iterator<Item = &HardwareRecord> {
        self.hardware.values()
    }

    pub fn get_hardware(&self, xname: &Xname) -> Option<&HardwareRecord> {
        self.hardware.get(xname)
    }

    pub fn contains_hardware(&self, xname: &Xname) -> bool {
        self.hardware.contains_key(xname)
    }

    pub fn hardware_count(&self) -> usize {
        self.hardware.len()
    }

    pub fn networks(&self) -> &BTreeMap<String, NetworkRecord> {
        &self.networks
    }

    pub fn network(&self, name: &str) -> Option<&NetworkRecord> {
        self.networks.get(name)
    }

    /// Copy of this state keeping only the hardware `keep` accepts
    ///
    /// Networks are carried over unchanged.
    pub fn filter_hardware(&self, keep: impl Fn(&HardwareRecord) -> bool) -> Self {
        Self {
            hardware: self
                .hardware
                .iter()
                .filter(|(_, record)| keep(record))
                .map(|(xname, record)| (xname.clone(), record.clone()))
                .collect(),
            networks: self.networks.clone(),
        }
    }

    /// Application-node aliases mapped to the sorted identifiers using them
    pub fn application_node_aliases(&self) -> BTreeMap<String, Vec<Xname>> {
        let mut aliases: BTreeMap<String, Vec<Xname>> = BTreeMap::new();
        for record in self.hardware.values() {
            let Some(node) = record.node().filter(|node| node.is_application()) else {
                continue;
            };
            for alias in &node.aliases {
                aliases
                    .entry(alias.clone())
                    .or_default()
                    .push(record.xname().clone());
            }
        }
        // Hardware iterates in identifier order, so each list is already sorted.
        aliases
    }

    /// Merge an additive change-set: new hardware is inserted, modified
    /// networks replace their previous versions
    pub fn apply_changes(&mut self, changes: &crate::engine::TopologyChanges) {
        for (name, network) in &changes.modified_networks {
            self.networks.insert(name.clone(), network.clone());
        }
        for hardware in &changes.hardware_added {
            self.hardware
                .insert(hardware.xname().clone(), hardware.clone());
        }
    }
}
