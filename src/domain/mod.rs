// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Models
//!
//! Typed model of a cluster inventory: hardware records keyed by hierarchical
//! identifier, and networks with their subnets and address reservations.
//!
//! # Value Objects with Invariants
//!
//! - [`Xname`] - hierarchical hardware identifier
//! - [`Ipv4Cidr`] - IPv4 network in CIDR notation
//! - [`VlanId`] - IEEE 802.1Q VLAN ID (0 untagged, 1-4094)
//! - [`Mtu`] - Maximum Transmission Unit (68-9000 bytes)
//!
//! # Records
//!
//! - [`HardwareRecord`] - a component with its kind-specific [`HardwareProperties`]
//! - [`NetworkRecord`] - a network with its typed [`NetworkDetail`]
//! - [`InventoryState`] - both, keyed for lookup

pub mod hardware;
pub mod inventory;
pub mod network;
pub mod xname;

pub use hardware::{
    dense_chassis_bmc_ordinal, CabinetNetwork, CabinetProperties, HardwareClass, HardwareError,
    HardwareKind, HardwareProperties, HardwareRecord, NodeProperties, SwitchConnectorProperties,
    SwitchProperties, FIXME_PLACEHOLDER,
};
pub use inventory::{InventoryError, InventoryState};
pub use network::{
    IpReservation, Ipv4Cidr, Mtu, NetworkDetail, NetworkError, NetworkRecord, Subnet, VlanId,
};
pub use xname::{Xname, XnameError};
