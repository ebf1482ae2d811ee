//! Topology reconciliation and IPv4 address management for cluster inventories
//!
//! This crate compares a recorded hardware inventory against the inventory a
//! topology description calls for, refuses anything that is not a pure
//! addition, and allocates subnets and host addresses for the new hardware.

pub mod adapters;
pub mod config;
pub mod diff;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod ipam;

// Re-export commonly used types
pub use config::EngineConfig;
pub use diff::{hardware_subtract, hardware_union, HardwareComparison, HardwarePair, HardwareUnion};
pub use domain::{HardwareRecord, InventoryState, NetworkRecord, Xname};
pub use engine::{HardwareBuilder, TopologyChanges, TopologyEngine};
pub use errors::{ErrorKind, TopologyError, TopologyResult};
pub use ipam::IpamError;
