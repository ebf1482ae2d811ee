// Copyright (c) 2025 - Cowboy AI, Inc.
//! IPv4 Address Management
//!
//! Pure functions over [`Subnet`](crate::domain::Subnet) and
//! [`NetworkDetail`](crate::domain::NetworkDetail) values. Nothing here keeps
//! state between calls; callers own the records and decide when a returned
//! subnet or reservation is written back.
//!
//! # Allocation rules
//!
//! - Host addresses are handed out lowest-first, skipping the network address,
//!   the gateway, existing reservations and the broadcast address.
//! - Subnet blocks are carved from the network's CIDR in fixed-size steps from
//!   its base address; the first block overlapping no existing subnet wins.
//! - When a subnet has a DHCP pool, static allocations must land strictly below
//!   `dhcp_start`. The boundary only ever moves up, trading dynamic capacity
//!   for static capacity.

pub mod address;
pub mod subnet;

pub use address::{
    advance_ip, allocate_ip, ensure_static_capacity, expand_subnet_static_range,
    find_next_available_ip, free_ips_in_static_range,
};
pub use subnet::{
    allocate_cabinet_subnet, cabinet_subnet_name, find_next_available_subnet, split_network,
    CabinetSubnetRequest, DEFAULT_CABINET_PREFIX_LENGTH, DEFAULT_DHCP_START_OFFSET,
    MAX_SPLIT_PREFIX_LENGTH, MIN_SPLIT_PREFIX_LENGTH,
};

use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

use crate::domain::{Ipv4Cidr, Xname};

/// Which reservation attribute collided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationField {
    Alias,
    Owner,
}

impl fmt::Display for ReservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias => write!(f, "name"),
            Self::Owner => write!(f, "xname"),
        }
    }
}

/// Allocator failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpamError {
    #[error("Subnet {cidr} has no available IPs")]
    AddressSpaceExhausted { cidr: Ipv4Cidr },

    #[error("Network space {cidr} has been exhausted for /{prefix_length} subnets")]
    SubnetSpaceExhausted { cidr: Ipv4Cidr, prefix_length: u8 },

    #[error("Invalid subnet mask provided /{0} (must be /16 to /30)")]
    InvalidPrefixLength(u8),

    #[error("Advancing {ip} by {count} leaves the IPv4 address space")]
    AddressOverflow { ip: Ipv4Addr, count: u32 },

    #[error("IP reservation with {field} ({value}) already exists in subnet {subnet}")]
    DuplicateReservation {
        subnet: String,
        field: ReservationField,
        value: String,
    },

    #[error("IP reservation for {owner} with IP {ip} is outside the static IP address range of subnet {subnet}, starting DHCP IP is {dhcp_start}")]
    OutsideStaticRange {
        subnet: String,
        owner: Xname,
        ip: Ipv4Addr,
        dhcp_start: Ipv4Addr,
    },

    #[error("Invalid DHCP range for subnet {subnet}: {reason}")]
    InvalidRange { subnet: String, reason: String },

    #[error("Subnet ({0}) already exists")]
    SubnetAlreadyExists(String),

    #[error("No VLAN supplied for cabinet {0} and VLAN inference is not supported")]
    MissingVlan(Xname),

    #[error("{0} is not a cabinet")]
    NotACabinet(Xname),
}

/// Result type for allocator operations
pub type IpamResult<T> = Result<T, IpamError>;
