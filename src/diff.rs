// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory diffing
//!
//! Set algebra over two hardware collections keyed by identifier. Both sides
//! are already ordered by identifier, so every operation is a single merge
//! walk and every result comes out sorted.
//!
//! For any two inventories `a` and `b`:
//!
//! ```text
//! |subtract(a, b)| + |subtract(b, a)| + |identical| + |differing|
//!     == |ids(a) ∪ ids(b)|
//! ```

use std::cmp::Ordering;
use std::fmt;
use tracing::{info, warn};

use crate::domain::{HardwareRecord, InventoryState};

/// The same identifier as it appears on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwarePair<'a> {
    pub current: &'a HardwareRecord,
    pub expected: &'a HardwareRecord,
}

/// Identifiers present on both sides, split by whether the records match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareUnion<'a> {
    pub identical: Vec<HardwarePair<'a>>,
    pub differing: Vec<HardwarePair<'a>>,
}

/// Walk both sides in identifier order, yielding aligned entries
fn merge_walk<'a>(
    a: &'a InventoryState,
    b: &'a InventoryState,
    mut visit: impl FnMut(Option<&'a HardwareRecord>, Option<&'a HardwareRecord>),
) {
    let mut left = a.hardware().peekable();
    let mut right = b.hardware().peekable();

    loop {
        let order = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.xname().cmp(r.xname()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        match order {
            Ordering::Less => visit(left.next(), None),
            Ordering::Greater => visit(None, right.next()),
            Ordering::Equal => visit(left.next(), right.next()),
        }
    }
}

/// Records of `a` whose identifier does not appear in `b`
pub fn hardware_subtract<'a>(a: &'a InventoryState, b: &'a InventoryState) -> Vec<&'a HardwareRecord> {
    let mut only_a = Vec::new();
    merge_walk(a, b, |left, right| {
        if let (Some(record), None) = (left, right) {
            only_a.push(record);
        }
    });
    only_a
}

/// Identifiers present in both, paired and classified
///
/// A pair is identical only when the records are fully equal: class, kind and
/// every payload field, including ones an allocator stamped.
pub fn hardware_union<'a>(current: &'a InventoryState, expected: &'a InventoryState) -> HardwareUnion<'a> {
    let mut union = HardwareUnion::default();
    merge_walk(current, expected, |left, right| {
        if let (Some(current), Some(expected)) = (left, right) {
            let pair = HardwarePair { current, expected };
            if current == expected {
                union.identical.push(pair);
            } else {
                union.differing.push(pair);
            }
        }
    });
    union
}

/// Everything that separates two inventories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareComparison<'a> {
    /// In `current` only
    pub removed: Vec<&'a HardwareRecord>,
    /// In `expected` only
    pub added: Vec<&'a HardwareRecord>,
    pub identical: Vec<HardwarePair<'a>>,
    pub differing: Vec<HardwarePair<'a>>,
}

impl<'a> HardwareComparison<'a> {
    pub fn between(current: &'a InventoryState, expected: &'a InventoryState) -> Self {
        let HardwareUnion {
            identical,
            differing,
        } = hardware_union(current, expected);

        Self {
            removed: hardware_subtract(current, expected),
            added: hardware_subtract(expected, current),
            identical,
            differing,
        }
    }

    /// Only additions separate the two sides
    pub fn is_additive(&self) -> bool {
        self.removed.is_empty() && self.differing.is_empty()
    }

    /// Emit the report through `tracing`
    pub fn log_report(&self) {
        info!(
            identical = self.identical.len(),
            differing = self.differing.len(),
            added = self.added.len(),
            removed = self.removed.len(),
            "Hardware comparison"
        );
        for pair in &self.differing {
            warn!(xname = %pair.current.xname(), "Hardware differs between inventories");
        }
        for record in &self.removed {
            warn!(xname = %record.xname(), "Hardware missing from expected inventory");
        }
        for record in &self.added {
            info!(xname = %record.xname(), kind = %record.kind(), "Hardware added");
        }
    }
}

impl fmt::Display for HardwareComparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Identical hardware: {}", self.identical.len())?;

        writeln!(f, "Differing hardware: {}", self.differing.len())?;
        for pair in &self.differing {
            writeln!(f, "  {} ({})", pair.current.xname(), pair.current.kind())?;
            if pair.current.class != pair.expected.class {
                writeln!(f, "    class: {} -> {}", pair.current.class, pair.expected.class)?;
            }
            if pair.current.kind() != pair.expected.kind() {
                writeln!(f, "    type: {} -> {}", pair.current.kind(), pair.expected.kind())?;
            }
            if pair.current.properties != pair.expected.properties {
                writeln!(f, "    extra properties differ")?;
            }
        }

        writeln!(f, "Hardware added: {}", self.added.len())?;
        for record in &self.added {
            writeln!(f, "  {} ({})", record.xname(), record.kind())?;
        }

        writeln!(f, "Hardware removed: {}", self.removed.len())?;
        for record in &self.removed {
            writeln!(f, "  {} ({})", record.xname(), record.kind())?;
        }
        Ok(())
    }
}
