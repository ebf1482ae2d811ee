// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host address allocation and the static/DHCP boundary

use std::net::Ipv4Addr;
use tracing::debug;

use super::{IpamError, IpamResult, ReservationField};
use crate::domain::{IpReservation, Subnet, Xname};

/// Advance `ip` by `count` addresses using unsigned 32-bit arithmetic
pub fn advance_ip(ip: Ipv4Addr, count: u32) -> IpamResult<Ipv4Addr> {
    u32::from(ip)
        .checked_add(count)
        .map(Ipv4Addr::from)
        .ok_or(IpamError::AddressOverflow { ip, count })
}

/// Usable host addresses of the subnet as a half-open `u32` range
fn host_range(subnet: &Subnet) -> std::ops::Range<u32> {
    let network = u32::from(subnet.cidr.network());
    let broadcast = u32::from(subnet.cidr.broadcast());
    // /32 has no hosts; network + 1 would pass the broadcast address.
    match network.checked_add(1) {
        Some(first) if first < broadcast => first..broadcast,
        _ => 0..0,
    }
}

/// Lowest host address not used by the gateway or an existing reservation
///
/// Reads only; calling it twice on an unchanged subnet returns the same address.
pub fn find_next_available_ip(subnet: &Subnet) -> IpamResult<Ipv4Addr> {
    let in_use = subnet.in_use_addresses();

    host_range(subnet)
        .map(Ipv4Addr::from)
        .find(|ip| !in_use.contains(ip))
        .ok_or(IpamError::AddressSpaceExhausted { cidr: subnet.cidr })
}

/// Pick an address for `owner` under `alias` in the subnet's static range
///
/// The reservation is returned, not recorded; the caller appends it.
pub fn allocate_ip(subnet: &Subnet, owner: &Xname, alias: &str) -> IpamResult<IpReservation> {
    let ip = find_next_available_ip(subnet)?;

    if subnet.reservation_by_name(alias).is_some() {
        return Err(IpamError::DuplicateReservation {
            subnet: subnet.name.clone(),
            field: ReservationField::Alias,
            value: alias.to_string(),
        });
    }

    if subnet.reservation_by_owner(owner).is_some() {
        return Err(IpamError::DuplicateReservation {
            subnet: subnet.name.clone(),
            field: ReservationField::Owner,
            value: owner.to_string(),
        });
    }

    if let Some(dhcp_start) = subnet.dhcp_start {
        if ip >= dhcp_start {
            return Err(IpamError::OutsideStaticRange {
                subnet: subnet.name.clone(),
                owner: owner.clone(),
                ip,
                dhcp_start,
            });
        }
    }

    Ok(IpReservation::new(ip, alias, owner))
}

/// Unused host addresses strictly below `dhcp_start`
///
/// Without a DHCP pool the whole host range is static.
pub fn free_ips_in_static_range(subnet: &Subnet) -> u32 {
    let in_use = subnet.in_use_addresses();
    let hosts = host_range(subnet);
    let end = match subnet.dhcp_start {
        Some(dhcp_start) => hosts.end.min(u32::from(dhcp_start)),
        None => hosts.end,
    };

    (hosts.start..end.max(hosts.start))
        .map(Ipv4Addr::from)
        .filter(|ip| !in_use.contains(ip))
        .count() as u32
}

/// Move `dhcp_start` up by `count` addresses
///
/// `dhcp_end` is never touched; the new start must stay strictly below it.
pub fn expand_subnet_static_range(subnet: &mut Subnet, count: u32) -> IpamResult<()> {
    let (Some(dhcp_start), Some(dhcp_end)) = (subnet.dhcp_start, subnet.dhcp_end) else {
        return Err(IpamError::InvalidRange {
            subnet: subnet.name.clone(),
            reason: "subnet does not have a DHCP range".to_string(),
        });
    };

    let new_start = advance_ip(dhcp_start, count)?;
    if new_start >= dhcp_end {
        return Err(IpamError::InvalidRange {
            subnet: subnet.name.clone(),
            reason: format!(
                "new DHCP start address {} is equal to or larger than the DHCP end address {}",
                new_start, dhcp_end
            ),
        });
    }

    debug!(
        subnet = %subnet.name,
        from = %dhcp_start,
        to = %new_start,
        "Expanding static IP range"
    );
    subnet.dhcp_start = Some(new_start);
    Ok(())
}

/// Grow the static range until it has room for `needed` more reservations
///
/// Addresses at the head of the DHCP pool may already be reserved, so the
/// free count is taken again after every step. Returns how far `dhcp_start`
/// moved (0 when there was already room). On failure the subnet is left as
/// it was.
pub fn ensure_static_capacity(subnet: &mut Subnet, needed: u32) -> IpamResult<u32> {
    let original_start = subnet.dhcp_start;
    let mut moved = 0u32;

    loop {
        let free = free_ips_in_static_range(subnet);
        if free >= needed {
            return Ok(moved);
        }

        let shortfall = needed - free;
        if let Err(err) = expand_subnet_static_range(subnet, shortfall) {
            subnet.dhcp_start = original_start;
            return Err(err);
        }
        moved += shortfall;
    }
}
