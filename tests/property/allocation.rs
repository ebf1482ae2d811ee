// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Address Allocator
//!
//! Host allocation never hands out a used or reserved address, cabinet
//! subnets never overlap, and the static/DHCP boundary only moves safely.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use topology_assistant::domain::{
    IpReservation, Ipv4Cidr, NetworkDetail, Subnet, VlanId, Xname,
};
use topology_assistant::ipam::{
    allocate_cabinet_subnet, allocate_ip, ensure_static_capacity, expand_subnet_static_range,
    find_next_available_ip, free_ips_in_static_range, CabinetSubnetRequest,
};
use topology_assistant::IpamError;

// ============================================================================
// Property Test Strategies
// ============================================================================

const BASE: u32 = 0x0A00_0000; // 10.0.0.0

fn host(offset: u32) -> Ipv4Addr {
    Ipv4Addr::from(BASE + offset)
}

/// Host offsets (2..=254) already reserved in a /24 whose gateway is .1
fn reserved_offsets() -> impl Strategy<Value = BTreeSet<u32>> {
    prop_oneof![
        prop::collection::vec(any::<bool>(), 253).prop_map(|mask| {
            (2u32..255)
                .zip(mask)
                .filter(|(_, taken)| *taken)
                .map(|(offset, _)| offset)
                .collect::<BTreeSet<u32>>()
        }),
        Just((2u32..255).collect::<BTreeSet<u32>>()),
    ]
}

/// DHCP pool as (start, end) offsets with start < end
fn dhcp_pool() -> impl Strategy<Value = (u32, u32)> {
    (2u32..253).prop_flat_map(|start| (Just(start), (start + 1)..255))
}

fn owner(offset: u32) -> Xname {
    Xname::new(format!("x3000c0s{}b0n0", offset)).unwrap()
}

fn subnet_with(reserved: &BTreeSet<u32>, pool: Option<(u32, u32)>) -> Subnet {
    Subnet {
        name: "bootstrap_dhcp".to_string(),
        full_name: String::new(),
        cidr: Ipv4Cidr::new("10.0.0.0/24").unwrap(),
        vlan_id: None,
        gateway: host(1),
        dhcp_start: pool.map(|(start, _)| host(start)),
        dhcp_end: pool.map(|(_, end)| host(end)),
        ip_reservations: reserved
            .iter()
            .map(|offset| IpReservation::new(host(*offset), format!("host{}", offset), &owner(*offset)))
            .collect(),
        extra: BTreeMap::new(),
    }
}

// ============================================================================
// Host Address Properties
// ============================================================================

proptest! {
    /// Property: the next address is the lowest unused host address
    #[test]
    fn prop_next_ip_is_lowest_free_host(reserved in reserved_offsets()) {
        let subnet = subnet_with(&reserved, None);
        let in_use = subnet.in_use_addresses();

        match find_next_available_ip(&subnet) {
            Ok(ip) => {
                prop_assert!(subnet.cidr.contains_host(ip));
                prop_assert!(!in_use.contains(&ip));
                for below in (BASE + 1)..u32::from(ip) {
                    prop_assert!(in_use.contains(&Ipv4Addr::from(below)));
                }
            }
            Err(IpamError::AddressSpaceExhausted { .. }) => {
                prop_assert_eq!(reserved.len(), 253);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Property: looking for the next address changes nothing
    #[test]
    fn prop_next_ip_is_idempotent(reserved in reserved_offsets()) {
        let subnet = subnet_with(&reserved, None);
        let before = subnet.clone();

        let first = find_next_available_ip(&subnet);
        let second = find_next_available_ip(&subnet);

        prop_assert_eq!(first, second);
        prop_assert_eq!(subnet, before);
    }

    /// Property: with a DHCP pool, a successful allocation lands strictly below it
    #[test]
    fn prop_allocation_stays_in_static_range(
        reserved in reserved_offsets(),
        pool in dhcp_pool(),
    ) {
        let subnet = subnet_with(&reserved, Some(pool));
        let new_owner = Xname::new("x3001c0s1b0n0").unwrap();

        match allocate_ip(&subnet, &new_owner, "uan99") {
            Ok(reservation) => {
                prop_assert!(reservation.address < host(pool.0));
                prop_assert!(!subnet.in_use_addresses().contains(&reservation.address));
                prop_assert!(free_ips_in_static_range(&subnet) > 0);
            }
            Err(IpamError::OutsideStaticRange { ip, dhcp_start, .. }) => {
                prop_assert!(ip >= dhcp_start);
                prop_assert_eq!(free_ips_in_static_range(&subnet), 0);
            }
            Err(IpamError::AddressSpaceExhausted { .. }) => {
                prop_assert_eq!(reserved.len(), 253);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Property: expansion either fails without touching the subnet or keeps start < end
    #[test]
    fn prop_expansion_is_safe(
        reserved in reserved_offsets(),
        pool in dhcp_pool(),
        count in 0u32..300,
    ) {
        let mut subnet = subnet_with(&reserved, Some(pool));
        let before = subnet.clone();

        match expand_subnet_static_range(&mut subnet, count) {
            Ok(()) => {
                let start = subnet.dhcp_start.unwrap();
                let end = subnet.dhcp_end.unwrap();
                prop_assert_eq!(start, host(pool.0 + count));
                prop_assert!(start < end);
                prop_assert_eq!(end, host(pool.1));
                prop_assert_eq!(&subnet.ip_reservations, &before.ip_reservations);
            }
            Err(IpamError::InvalidRange { .. }) => {
                prop_assert!(pool.0 + count >= pool.1);
                prop_assert_eq!(subnet, before);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Property: once capacity is ensured, every pending node fits below the pool
    #[test]
    fn prop_ensured_capacity_is_real(
        reserved in reserved_offsets(),
        pool in dhcp_pool(),
        needed in 0u32..20,
    ) {
        let mut subnet = subnet_with(&reserved, Some(pool));
        let before = subnet.clone();

        match ensure_static_capacity(&mut subnet, needed) {
            Ok(moved) => {
                prop_assert!(free_ips_in_static_range(&subnet) >= needed);
                prop_assert_eq!(subnet.dhcp_start, Some(host(pool.0 + moved)));
                prop_assert_eq!(subnet.dhcp_end, before.dhcp_end);

                for n in 0..needed {
                    let owner = Xname::new(format!("x3001c0s{}b0n0", n)).unwrap();
                    let reservation = allocate_ip(&subnet, &owner, &format!("uan{}", n)).unwrap();
                    subnet.ip_reservations.push(reservation);
                }
            }
            Err(IpamError::InvalidRange { .. }) => {
                prop_assert_eq!(subnet, before);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

// ============================================================================
// Cabinet Subnet Properties
// ============================================================================

fn cabinet(ordinal: u32) -> Xname {
    Xname::new(format!("x{}", 1000 + ordinal)).unwrap()
}

proptest! {
    /// Property: repeated cabinet allocations stay inside the network and never overlap
    #[test]
    fn prop_cabinet_subnets_never_overlap(
        prefix_length in 22u8..=26,
        cabinets in 1u32..40,
    ) {
        let mut network = NetworkDetail::new(Ipv4Cidr::new("10.100.0.0/18").unwrap());
        let vlan = VlanId::new(1513).unwrap();

        for ordinal in 0..cabinets {
            let request = CabinetSubnetRequest::new(cabinet(ordinal), Some(vlan))
                .with_prefix_length(prefix_length);
            match allocate_cabinet_subnet(&network, &request) {
                Ok(subnet) => network.subnets.push(subnet),
                Err(IpamError::SubnetSpaceExhausted { .. }) => break,
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        let capacity = 1usize << (prefix_length - 18);
        prop_assert_eq!(network.subnets.len(), (cabinets as usize).min(capacity));

        for (i, a) in network.subnets.iter().enumerate() {
            prop_assert!(network.cidr.contains(a.cidr.network()));
            prop_assert!(network.cidr.contains(a.cidr.broadcast()));
            prop_assert!(a.gateway < a.dhcp_start.unwrap());
            prop_assert!(a.dhcp_start.unwrap() < a.dhcp_end.unwrap());
            for b in &network.subnets[i + 1..] {
                prop_assert!(!a.cidr.overlaps(&b.cidr), "{} overlaps {}", a.cidr, b.cidr);
            }
        }
    }

    /// Property: a block partly covered by an odd-sized subnet is never handed out
    #[test]
    fn prop_cabinet_subnet_avoids_existing_blocks(
        existing_offset in 0u32..64,
        existing_prefix in 20u8..=28,
    ) {
        let mut network = NetworkDetail::new(Ipv4Cidr::new("10.100.0.0/18").unwrap());
        let start = Ipv4Addr::from(0x0A64_0000u32 + existing_offset * 256);
        let existing = Ipv4Cidr::from_parts(start, existing_prefix).unwrap();
        network.subnets.push(Subnet {
            name: "network_hardware".to_string(),
            full_name: String::new(),
            cidr: existing,
            vlan_id: None,
            gateway: Ipv4Addr::from(u32::from(existing.network()) + 1),
            dhcp_start: None,
            dhcp_end: None,
            ip_reservations: Vec::new(),
            extra: BTreeMap::new(),
        });

        let request = CabinetSubnetRequest::new(cabinet(0), Some(VlanId::new(1513).unwrap()));
        let subnet = allocate_cabinet_subnet(&network, &request).unwrap();
        prop_assert!(!subnet.cidr.overlaps(&existing));
    }
}
