// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subnet carving

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use super::{advance_ip, IpamError, IpamResult};
use crate::domain::{Ipv4Cidr, NetworkDetail, Subnet, VlanId, Xname};

/// Smallest prefix [`split_network`] accepts
pub const MIN_SPLIT_PREFIX_LENGTH: u8 = 16;

/// Largest prefix [`split_network`] accepts
pub const MAX_SPLIT_PREFIX_LENGTH: u8 = 30;

/// Size of a cabinet's per-network subnet
pub const DEFAULT_CABINET_PREFIX_LENGTH: u8 = 22;

/// Distance from the subnet base to the first DHCP address
pub const DEFAULT_DHCP_START_OFFSET: u32 = 10;

/// Carve `cidr` into consecutive `/prefix_length` blocks from its base address
///
/// Blocks that would extend past the end of `cidr` are not produced, so a
/// prefix shorter than the parent's yields nothing.
pub fn split_network(cidr: &Ipv4Cidr, prefix_length: u8) -> IpamResult<Vec<Ipv4Cidr>> {
    if !(MIN_SPLIT_PREFIX_LENGTH..=MAX_SPLIT_PREFIX_LENGTH).contains(&prefix_length) {
        return Err(IpamError::InvalidPrefixLength(prefix_length));
    }

    let step = 1u32 << (32 - u32::from(prefix_length));
    let end = u32::from(cidr.broadcast());

    let mut blocks = Vec::new();
    let mut start = u32::from(cidr.network());
    loop {
        // Inclusive last address of this block; overflow means it cannot fit.
        let Some(last) = start.checked_add(step - 1) else {
            break;
        };
        if last > end {
            break;
        }

        blocks.push(
            Ipv4Cidr::from_parts(Ipv4Addr::from(start), prefix_length)
                .map_err(|_| IpamError::InvalidPrefixLength(prefix_length))?,
        );

        match start.checked_add(step) {
            Some(next) if next <= end => start = next,
            _ => break,
        }
    }

    Ok(blocks)
}

/// First `/prefix_length` block of the network not already taken by a subnet
///
/// Existing subnets need not be the nominal size, so a block counts as taken
/// when any existing subnet shares an address with it, not only on an exact
/// CIDR match.
pub fn find_next_available_subnet(
    network: &NetworkDetail,
    prefix_length: u8,
) -> IpamResult<Ipv4Cidr> {
    split_network(&network.cidr, prefix_length)?
        .into_iter()
        .find(|block| {
            !network
                .subnets
                .iter()
                .any(|existing| existing.cidr.overlaps(block))
        })
        .ok_or(IpamError::SubnetSpaceExhausted {
            cidr: network.cidr,
            prefix_length,
        })
}

/// Subnet name for a cabinet: `cabinet_<ordinal>`
pub fn cabinet_subnet_name(cabinet: &Xname) -> IpamResult<String> {
    match cabinet.cabinet_ordinal() {
        Some(ordinal) if cabinet.is_cabinet() => Ok(format!("cabinet_{}", ordinal)),
        _ => Err(IpamError::NotACabinet(cabinet.clone())),
    }
}

/// Parameters for carving a cabinet's subnet out of one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinetSubnetRequest {
    pub cabinet: Xname,
    pub vlan: Option<VlanId>,
    pub prefix_length: u8,
    pub dhcp_start_offset: u32,
}

impl CabinetSubnetRequest {
    pub fn new(cabinet: Xname, vlan: Option<VlanId>) -> Self {
        Self {
            cabinet,
            vlan,
            prefix_length: DEFAULT_CABINET_PREFIX_LENGTH,
            dhcp_start_offset: DEFAULT_DHCP_START_OFFSET,
        }
    }

    pub fn with_prefix_length(mut self, prefix_length: u8) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_dhcp_start_offset(mut self, offset: u32) -> Self {
        self.dhcp_start_offset = offset;
        self
    }
}

/// Build (but do not insert) the next free cabinet subnet of `network`
///
/// Gateway is the block's first host, the DHCP pool runs from
/// `dhcp_start_offset` past the base to the last host.
pub fn allocate_cabinet_subnet(
    network: &NetworkDetail,
    request: &CabinetSubnetRequest,
) -> IpamResult<Subnet> {
    let name = cabinet_subnet_name(&request.cabinet)?;
    if network.lookup_subnet(&name).is_some() {
        return Err(IpamError::SubnetAlreadyExists(name));
    }

    let vlan = request
        .vlan
        .ok_or_else(|| IpamError::MissingVlan(request.cabinet.clone()))?;

    let cidr = find_next_available_subnet(network, request.prefix_length)?;
    let base = cidr.network();
    let gateway = advance_ip(base, 1)?;
    let dhcp_start = advance_ip(base, request.dhcp_start_offset)?;
    let dhcp_end = Ipv4Addr::from(u32::from(cidr.broadcast()) - 1);

    if dhcp_start <= gateway || dhcp_start >= dhcp_end {
        return Err(IpamError::InvalidRange {
            subnet: name,
            reason: format!(
                "DHCP start offset {} does not fit a /{} block",
                request.dhcp_start_offset, request.prefix_length
            ),
        });
    }

    Ok(Subnet {
        name,
        full_name: String::new(),
        cidr,
        vlan_id: Some(vlan),
        gateway,
        dhcp_start: Some(dhcp_start),
        dhcp_end: Some(dhcp_end),
        ip_reservations: Vec::new(),
        extra: BTreeMap::new(),
    })
}
