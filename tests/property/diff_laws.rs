// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Inventory Diffing
//!
//! The four diff outputs partition the union of both sides' identifiers, and
//! every output is sorted by identifier.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use topology_assistant::domain::{
    HardwareClass, HardwareKind, HardwareProperties, HardwareRecord, InventoryState, Xname,
};
use topology_assistant::{hardware_subtract, hardware_union, HardwareComparison};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Where one slot's BMC appears, and with which class on each side
#[derive(Debug, Clone, Copy)]
struct Placement {
    in_a: bool,
    in_b: bool,
    a_is_river: bool,
    b_is_river: bool,
}

fn placement() -> impl Strategy<Value = Placement> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(in_a, in_b, a_is_river, b_is_river)| Placement {
            in_a,
            in_b,
            a_is_river,
            b_is_river,
        },
    )
}

/// Slot number → placement
fn layout() -> impl Strategy<Value = BTreeMap<u32, Placement>> {
    prop::collection::btree_map(0u32..64, placement(), 0..40)
}

fn bmc(slot: u32, river: bool) -> HardwareRecord {
    let class = if river {
        HardwareClass::River
    } else {
        HardwareClass::Hill
    };
    HardwareRecord::new(
        Xname::new(format!("x3000c0s{}b0", slot)).unwrap(),
        HardwareKind::NodeBmc,
        class,
        HardwareProperties::empty(),
    )
    .unwrap()
}

fn build(layout: &BTreeMap<u32, Placement>) -> (InventoryState, InventoryState) {
    let a = layout
        .iter()
        .filter(|(_, p)| p.in_a)
        .map(|(slot, p)| bmc(*slot, p.a_is_river));
    let b = layout
        .iter()
        .filter(|(_, p)| p.in_b)
        .map(|(slot, p)| bmc(*slot, p.b_is_river));
    (
        InventoryState::from_hardware(a).unwrap(),
        InventoryState::from_hardware(b).unwrap(),
    )
}

fn ids(state: &InventoryState) -> BTreeSet<Xname> {
    state.hardware().map(|r| r.xname().clone()).collect()
}

fn is_sorted(xnames: &[&Xname]) -> bool {
    xnames.windows(2).all(|w| w[0] < w[1])
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: subtract both ways plus union covers every identifier once
    #[test]
    fn prop_diff_partitions_identifiers(layout in layout()) {
        let (a, b) = build(&layout);

        let only_a = hardware_subtract(&a, &b);
        let only_b = hardware_subtract(&b, &a);
        let union = hardware_union(&a, &b);

        let all: BTreeSet<Xname> = ids(&a).union(&ids(&b)).cloned().collect();
        prop_assert_eq!(
            only_a.len() + only_b.len() + union.identical.len() + union.differing.len(),
            all.len()
        );

        let mut seen = BTreeSet::new();
        for record in only_a.iter().chain(only_b.iter()) {
            prop_assert!(seen.insert(record.xname().clone()), "identifier reported twice");
        }
        for pair in union.identical.iter().chain(union.differing.iter()) {
            prop_assert!(seen.insert(pair.current.xname().clone()), "identifier reported twice");
        }
        prop_assert_eq!(seen, all);
    }

    /// Property: every diff output is in ascending identifier order
    #[test]
    fn prop_diff_outputs_are_sorted(layout in layout()) {
        let (a, b) = build(&layout);

        let only_a: Vec<&Xname> = hardware_subtract(&a, &b).iter().map(|r| r.xname()).collect();
        prop_assert!(is_sorted(&only_a));

        let union = hardware_union(&a, &b);
        let identical: Vec<&Xname> = union.identical.iter().map(|p| p.current.xname()).collect();
        let differing: Vec<&Xname> = union.differing.iter().map(|p| p.current.xname()).collect();
        prop_assert!(is_sorted(&identical));
        prop_assert!(is_sorted(&differing));
    }

    /// Property: a pair differs exactly when the two sides' classes differ
    #[test]
    fn prop_union_compares_whole_records(layout in layout()) {
        let (a, b) = build(&layout);
        let union = hardware_union(&a, &b);

        for pair in &union.identical {
            prop_assert_eq!(pair.current.class, pair.expected.class);
        }
        for pair in &union.differing {
            prop_assert_ne!(pair.current.class, pair.expected.class);
        }
    }

    /// Property: the comparison report agrees with the primitive operations
    #[test]
    fn prop_comparison_matches_primitives(layout in layout()) {
        let (current, expected) = build(&layout);
        let comparison = HardwareComparison::between(&current, &expected);

        prop_assert_eq!(comparison.removed, hardware_subtract(&current, &expected));
        prop_assert_eq!(comparison.added, hardware_subtract(&expected, &current));

        let union = hardware_union(&current, &expected);
        prop_assert_eq!(comparison.identical, union.identical);
        prop_assert_eq!(comparison.differing, union.differing);
    }
}
