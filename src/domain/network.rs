// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects and the Typed Network Model
//!
//! Value objects (`Ipv4Cidr`, `VlanId`, `Mtu`) validate on construction. The
//! network model (`NetworkRecord`, `NetworkDetail`, `Subnet`, `IpReservation`)
//! is the typed form of an inventory network's extra-properties payload; its
//! serde field names follow the inventory service wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

use super::Xname;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Invalid VLAN ID: {0} (must be 0-4094)")]
    InvalidVlanId(u16),

    #[error("Invalid MTU: {0} (must be 68-9000)")]
    InvalidMtu(u32),
}

/// IPv4 network in CIDR notation
///
/// Invariants:
/// - Valid IPv4 address
/// - Prefix length 0-32
///
/// The address is kept as written; [`Ipv4Cidr::network`] masks off host bits.
///
/// # Examples
///
/// ```rust
/// use topology_assistant::domain::Ipv4Cidr;
///
/// let cidr = Ipv4Cidr::new("10.1.0.0/22").unwrap();
/// assert_eq!(cidr.prefix_length(), 22);
/// assert_eq!(cidr.broadcast().to_string(), "10.1.3.255");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// Parse `a.b.c.d/n` notation
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from separate address and prefix
    pub fn from_parts(address: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    fn mask(&self) -> u32 {
        if self.prefix_length == 0 {
            0
        } else {
            u32::MAX << (32 - self.prefix_length)
        }
    }

    /// First address of the block (network address)
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) & self.mask())
    }

    /// Last address of the block (broadcast address)
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) | !self.mask())
    }

    /// Whether `ip` falls anywhere in the block, network and broadcast included
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.network())
    }

    /// Whether `ip` is a usable host address (excludes network and broadcast)
    pub fn contains_host(&self, ip: Ipv4Addr) -> bool {
        self.contains(ip) && ip != self.network() && ip != self.broadcast()
    }

    /// Whether two blocks share at least one address
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        let (a_start, a_end) = (u32::from(self.network()), u32::from(self.broadcast()));
        let (b_start, b_end) = (u32::from(other.network()), u32::from(other.broadcast()));
        a_start <= b_end && b_start <= a_end
    }

    /// Get as CIDR notation string
    pub fn as_cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_length)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ipv4Cidr> for String {
    fn from(value: Ipv4Cidr) -> Self {
        value.as_cidr()
    }
}

/// VLAN ID value object
///
/// Invariants:
/// - 0-4094; 0 is how the inventory records an untagged subnet
/// - 4095 is reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Maximum valid VLAN ID
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, NetworkError> {
        if id > Self::MAX {
            return Err(NetworkError::InvalidVlanId(id));
        }

        Ok(Self(id))
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = NetworkError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(value: VlanId) -> Self {
        value.0
    }
}

/// MTU (Maximum Transmission Unit) value object
///
/// Invariants:
/// - 68 (IPv4 minimum) to 9000 (jumbo frames)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Mtu(u32);

impl Mtu {
    pub const MIN: u32 = 68;

    pub const MAX: u32 = 9000;

    pub fn new(size: u32) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&size) {
            return Err(NetworkError::InvalidMtu(size));
        }

        Ok(Self(size))
    }
}

impl TryFrom<u32> for Mtu {
    type Error = NetworkError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mtu> for u32 {
    fn from(value: Mtu) -> Self {
        value.0
    }
}

/// A single address handed out from a subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpReservation {
    #[serde(rename = "IPAddress")]
    pub address: Ipv4Addr,

    /// Alias of the owning hardware, unique within the subnet
    #[serde(rename = "Name")]
    pub name: String,

    /// Identifier of the hardware that caused the reservation
    #[serde(rename = "Comment", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(rename = "Aliases", default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl IpReservation {
    pub fn new(address: Ipv4Addr, name: impl Into<String>, owner: &Xname) -> Self {
        Self {
            address,
            name: name.into(),
            owner: Some(owner.to_string()),
            aliases: Vec::new(),
        }
    }
}

/// One subnet of a network
///
/// Addresses below `dhcp_start` form the static range; `dhcp_start..=dhcp_end`
/// is the dynamic pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "FullName", default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,

    #[serde(rename = "CIDR")]
    pub cidr: Ipv4Cidr,

    #[serde(rename = "VlanID", default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<VlanId>,

    #[serde(rename = "Gateway")]
    pub gateway: Ipv4Addr,

    #[serde(rename = "DHCPStart", default, skip_serializing_if = "Option::is_none")]
    pub dhcp_start: Option<Ipv4Addr>,

    #[serde(rename = "DHCPEnd", default, skip_serializing_if = "Option::is_none")]
    pub dhcp_end: Option<Ipv4Addr>,

    #[serde(rename = "IPReservations", default, skip_serializing_if = "Vec::is_empty")]
    pub ip_reservations: Vec<IpReservation>,

    /// Payload keys this model does not interpret, carried through unchanged
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Subnet {
    /// Gateway plus every reserved address
    pub fn in_use_addresses(&self) -> BTreeSet<Ipv4Addr> {
        std::iter::once(self.gateway)
            .chain(self.ip_reservations.iter().map(|r| r.address))
            .collect()
    }

    pub fn reservation_by_name(&self, name: &str) -> Option<&IpReservation> {
        self.ip_reservations.iter().find(|r| r.name == name)
    }

    pub fn reservation_by_owner(&self, owner: &Xname) -> Option<&IpReservation> {
        self.ip_reservations
            .iter()
            .find(|r| r.owner.as_deref() == Some(owner.as_str()))
    }
}

/// Typed extra-properties payload of a network record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetail {
    #[serde(rename = "CIDR")]
    pub cidr: Ipv4Cidr,

    #[serde(rename = "MTU", default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<Mtu>,

    #[serde(rename = "Subnets", default)]
    pub subnets: Vec<Subnet>,

    #[serde(rename = "VlanRange", default, skip_serializing_if = "Vec::is_empty")]
    pub vlan_range: Vec<u16>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NetworkDetail {
    pub fn new(cidr: Ipv4Cidr) -> Self {
        Self {
            cidr,
            mtu: None,
            subnets: Vec::new(),
            vlan_range: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn lookup_subnet(&self, name: &str) -> Option<&Subnet> {
        self.subnets.iter().find(|s| s.name == name)
    }

    pub fn lookup_subnet_mut(&mut self, name: &str) -> Option<&mut Subnet> {
        self.subnets.iter_mut().find(|s| s.name == name)
    }
}

/// One routed network (HMN, NMN, CAN, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "FullName", default)]
    pub full_name: String,

    #[serde(rename = "IPRanges", default)]
    pub ip_ranges: Vec<String>,

    #[serde(rename = "Type", default)]
    pub network_type: String,

    #[serde(rename = "ExtraProperties")]
    pub detail: NetworkDetail,
}

impl NetworkRecord {
    pub fn new(name: impl Into<String>, detail: NetworkDetail) -> Self {
        let ip_ranges = vec![detail.cidr.as_cidr()];
        Self {
            name: name.into(),
            full_name: String::new(),
            ip_ranges,
            network_type: "ethernet".to_string(),
            detail,
        }
    }
}
