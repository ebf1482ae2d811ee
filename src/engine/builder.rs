// Copyright (c) 2025 - Cowboy AI, Inc.

//! Hardware Builder - topology description → inventory records
//!
//! Mapping a vendor cabling survey onto inventory records is a large,
//! architecture-keyed table that lives outside this crate. The reconciler only
//! needs a single entry point per topology node, which is what
//! [`HardwareBuilder`] provides.
//!
//! # Example Implementation
//!
//! ```rust
//! use topology_assistant::domain::{
//!     HardwareClass, HardwareKind, HardwareProperties, HardwareRecord, Xname,
//! };
//! use topology_assistant::engine::{build_expected_state, HardwareBuilder};
//!
//! struct Pdus;
//!
//! impl HardwareBuilder for Pdus {
//!     type TopologyNode = u32;
//!     type Error = topology_assistant::domain::XnameError;
//!
//!     fn node_name(&self, cabinet: &u32) -> String {
//!         format!("pdu-x{}", cabinet)
//!     }
//!
//!     fn build_hardware(&self, cabinet: &u32) -> Result<Option<HardwareRecord>, Self::Error> {
//!         let xname = Xname::new(format!("x{}m0", cabinet))?;
//!         Ok(HardwareRecord::new(
//!             xname,
//!             HardwareKind::CabinetPduController,
//!             HardwareClass::River,
//!             HardwareProperties::empty(),
//!         )
//!         .ok())
//!     }
//! }
//!
//! let expected = build_expected_state(&Pdus, &[3000, 3001]).unwrap();
//! assert_eq!(expected.hardware_count(), 2);
//! ```

use tracing::debug;

use crate::domain::{HardwareRecord, InventoryState};
use crate::errors::{TopologyError, TopologyResult};

/// Translates one topology node into at most one inventory record
pub trait HardwareBuilder {
    /// One entry of the topology description
    type TopologyNode;

    type Error: std::error::Error;

    /// Human-readable name of a node, used in error messages
    fn node_name(&self, node: &Self::TopologyNode) -> String;

    /// Build the record for `node`
    ///
    /// `None` means the node has no inventory representation (patch panels,
    /// unmanaged devices) and is skipped.
    fn build_hardware(
        &self,
        node: &Self::TopologyNode,
    ) -> Result<Option<HardwareRecord>, Self::Error>;
}

/// Run the builder over every node and collect the expected inventory
///
/// Two nodes producing the same identifier is an error. The result carries no
/// networks; the reconciler only reads networks from the current inventory.
pub fn build_expected_state<B: HardwareBuilder>(
    builder: &B,
    nodes: &[B::TopologyNode],
) -> TopologyResult<InventoryState> {
    let mut state = InventoryState::new();

    for node in nodes {
        let record = builder
            .build_hardware(node)
            .map_err(|e| TopologyError::Builder {
                node: builder.node_name(node),
                reason: e.to_string(),
            })?;

        let Some(record) = record else {
            debug!(node = %builder.node_name(node), "Node has no inventory record");
            continue;
        };

        state.insert_hardware(record)?;
    }

    Ok(state)
}
