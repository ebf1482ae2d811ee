// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration
//!
//! Which networks count as fabric versus external-access, the conventional
//! subnet names, and the cabinet subnet geometry are decided at the
//! integration boundary. Defaults match a standard cluster layout.
//!
//! # Example
//!
//! ```yaml
//! cabinet_prefix_length: 22
//! external_networks: [CAN, CHN]
//! cabinet_vlans:
//!   x3000:
//!     HMN: 1513
//!     NMN: 1770
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{HardwareClass, VlanId, Xname};
use crate::errors::{TopologyError, TopologyResult};
use crate::ipam::{
    DEFAULT_CABINET_PREFIX_LENGTH, DEFAULT_DHCP_START_OFFSET, MAX_SPLIT_PREFIX_LENGTH,
    MIN_SPLIT_PREFIX_LENGTH,
};

/// Configuration for a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix length of each cabinet's per-network subnet
    #[serde(default = "default_cabinet_prefix_length")]
    pub cabinet_prefix_length: u8,

    /// Offset of the first DHCP address from a new cabinet subnet's base
    #[serde(default = "default_dhcp_start_offset")]
    pub dhcp_start_offset: u32,

    /// Network families that get a subnet per cabinet
    #[serde(default = "default_cabinet_network_families")]
    pub cabinet_network_families: Vec<String>,

    /// Networks on which every management switch gets an address
    #[serde(default = "default_fabric_networks")]
    pub fabric_networks: Vec<String>,

    /// Fabric network whose address is copied onto leaf switches
    #[serde(default = "default_leaf_address_network")]
    pub leaf_address_network: String,

    /// External-access networks for user access nodes
    #[serde(default = "default_external_networks")]
    pub external_networks: Vec<String>,

    #[serde(default = "default_network_hardware_subnet")]
    pub network_hardware_subnet: String,

    #[serde(default = "default_bootstrap_dhcp_subnet")]
    pub bootstrap_dhcp_subnet: String,

    /// Application sub-role marking a user access node
    #[serde(default = "default_uan_sub_role")]
    pub uan_sub_role: String,

    /// Per-cabinet VLANs, keyed by cabinet then network family
    #[serde(default)]
    pub cabinet_vlans: BTreeMap<Xname, BTreeMap<String, VlanId>>,
}

fn default_cabinet_prefix_length() -> u8 {
    DEFAULT_CABINET_PREFIX_LENGTH
}

fn default_dhcp_start_offset() -> u32 {
    DEFAULT_DHCP_START_OFFSET
}

fn default_cabinet_network_families() -> Vec<String> {
    vec!["HMN".to_string(), "NMN".to_string()]
}

fn default_fabric_networks() -> Vec<String> {
    ["HMN", "NMN", "MTL", "CMN"].iter().map(|s| s.to_string()).collect()
}

fn default_leaf_address_network() -> String {
    "HMN".to_string()
}

fn default_external_networks() -> Vec<String> {
    vec!["CAN".to_string(), "CHN".to_string()]
}

fn default_network_hardware_subnet() -> String {
    "network_hardware".to_string()
}

fn default_bootstrap_dhcp_subnet() -> String {
    "bootstrap_dhcp".to_string()
}

fn default_uan_sub_role() -> String {
    "UAN".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cabinet_prefix_length: default_cabinet_prefix_length(),
            dhcp_start_offset: default_dhcp_start_offset(),
            cabinet_network_families: default_cabinet_network_families(),
            fabric_networks: default_fabric_networks(),
            leaf_address_network: default_leaf_address_network(),
            external_networks: default_external_networks(),
            network_hardware_subnet: default_network_hardware_subnet(),
            bootstrap_dhcp_subnet: default_bootstrap_dhcp_subnet(),
            uan_sub_role: default_uan_sub_role(),
            cabinet_vlans: BTreeMap::new(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> TopologyResult<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| TopologyError::Configuration(format!("{} is not valid: {}", name, value))),
        Err(_) => Ok(default),
    }
}

fn list_env(name: &str, default: Vec<String>) -> Vec<String> {
    std::env::var(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or(default)
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Per-cabinet VLANs can only be given through a file.
    pub fn from_env() -> TopologyResult<Self> {
        let config = Self {
            cabinet_prefix_length: parse_env(
                "TOPOLOGY_CABINET_PREFIX_LENGTH",
                default_cabinet_prefix_length(),
            )?,
            dhcp_start_offset: parse_env(
                "TOPOLOGY_DHCP_START_OFFSET",
                default_dhcp_start_offset(),
            )?,
            cabinet_network_families: list_env(
                "TOPOLOGY_CABINET_NETWORKS",
                default_cabinet_network_families(),
            ),
            fabric_networks: list_env("TOPOLOGY_FABRIC_NETWORKS", default_fabric_networks()),
            leaf_address_network: std::env::var("TOPOLOGY_LEAF_ADDRESS_NETWORK")
                .unwrap_or_else(|_| default_leaf_address_network()),
            external_networks: list_env("TOPOLOGY_EXTERNAL_NETWORKS", default_external_networks()),
            network_hardware_subnet: std::env::var("TOPOLOGY_NETWORK_HARDWARE_SUBNET")
                .unwrap_or_else(|_| default_network_hardware_subnet()),
            bootstrap_dhcp_subnet: std::env::var("TOPOLOGY_BOOTSTRAP_DHCP_SUBNET")
                .unwrap_or_else(|_| default_bootstrap_dhcp_subnet()),
            uan_sub_role: std::env::var("TOPOLOGY_UAN_SUB_ROLE")
                .unwrap_or_else(|_| default_uan_sub_role()),
            cabinet_vlans: BTreeMap::new(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> TopologyResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TopologyError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> TopologyResult<()> {
        if !(MIN_SPLIT_PREFIX_LENGTH..=MAX_SPLIT_PREFIX_LENGTH).contains(&self.cabinet_prefix_length) {
            return Err(TopologyError::Configuration(format!(
                "cabinet_prefix_length /{} must be between /{} and /{}",
                self.cabinet_prefix_length, MIN_SPLIT_PREFIX_LENGTH, MAX_SPLIT_PREFIX_LENGTH
            )));
        }

        // Gateway takes the first host; the DHCP pool needs at least one address.
        let block_size = 1u64 << (32 - u32::from(self.cabinet_prefix_length));
        let offset = u64::from(self.dhcp_start_offset);
        if offset < 2 || offset >= block_size - 2 {
            return Err(TopologyError::Configuration(format!(
                "dhcp_start_offset {} does not fit a /{} subnet",
                self.dhcp_start_offset, self.cabinet_prefix_length
            )));
        }

        if self.cabinet_network_families.is_empty() {
            return Err(TopologyError::Configuration(
                "cabinet_network_families must not be empty".to_string(),
            ));
        }

        if self.external_networks.is_empty() {
            return Err(TopologyError::Configuration(
                "external_networks must not be empty".to_string(),
            ));
        }

        for cabinet in self.cabinet_vlans.keys() {
            if !cabinet.is_cabinet() {
                return Err(TopologyError::Configuration(format!(
                    "cabinet_vlans key {} is not a cabinet",
                    cabinet
                )));
            }
        }

        Ok(())
    }

    /// Configured VLAN for one of a cabinet's network families
    pub fn vlan_override(&self, cabinet: &Xname, family: &str) -> Option<VlanId> {
        self.cabinet_vlans
            .get(cabinet)
            .and_then(|families| families.get(family))
            .copied()
    }

    /// Network carrying `family` for cabinets of `class`, e.g. `HMN_RVR`
    pub fn cabinet_network_name(family: &str, class: HardwareClass) -> String {
        match class {
            HardwareClass::River => format!("{}_RVR", family),
            HardwareClass::Hill | HardwareClass::Mountain => format!("{}_MTN", family),
        }
    }
}
