// Copyright (c) 2025 - Cowboy AI, Inc.
//! System Layout Service (SLS) wire codec
//!
//! The inventory service stores hardware and networks as JSON documents whose
//! `ExtraProperties` payload is loosely typed. This adapter is the one place
//! that payload is decoded; everything past it works on the typed model in
//! [`crate::domain`].
//!
//! A dump looks like:
//!
//! ```json
//! {
//!   "Hardware": { "x3000": { "Parent": "s0", "Xname": "x3000", "Type": "comptype_cabinet",
//!                            "Class": "River", "TypeString": "Cabinet" } },
//!   "Networks": { "HMN": { "Name": "HMN", "IPRanges": ["10.254.0.0/17"], "Type": "ethernet",
//!                          "ExtraProperties": { "CIDR": "10.254.0.0/17", "Subnets": [] } } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{
    HardwareClass, HardwareKind, HardwareProperties, HardwareRecord, InventoryState,
    NetworkDetail, NetworkRecord, Xname,
};
use crate::errors::{TopologyError, TopologyResult};

fn malformed(record: impl Into<String>, reason: impl ToString) -> TopologyError {
    TopologyError::MalformedInput {
        record: record.into(),
        reason: reason.to_string(),
    }
}

/// Hardware document as stored by the inventory service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlsHardware {
    #[serde(rename = "Parent", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(rename = "Xname")]
    pub xname: String,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub comptype: Option<String>,

    #[serde(rename = "Class")]
    pub class: String,

    #[serde(rename = "TypeString")]
    pub type_string: String,

    #[serde(rename = "ExtraProperties", default, skip_serializing_if = "Option::is_none")]
    pub extra_properties: Option<Value>,
}

impl TryFrom<SlsHardware> for HardwareRecord {
    type Error = TopologyError;

    fn try_from(raw: SlsHardware) -> Result<Self, Self::Error> {
        let xname = Xname::new(&raw.xname).map_err(|e| malformed(&raw.xname, e))?;
        let kind = HardwareKind::from_wire(&raw.type_string, raw.comptype.as_deref())
            .map_err(|e| malformed(&raw.xname, e))?;
        let class = HardwareClass::parse(&raw.class).map_err(|e| malformed(&raw.xname, e))?;

        if !kind.is_known() {
            debug!(xname = %xname, type_string = %kind, "Carrying hardware of unrecognized type");
        }

        if let (Some(comptype), Some(expected)) = (raw.comptype.as_deref(), kind.comptype()) {
            if comptype != expected {
                debug!(
                    xname = %xname,
                    comptype,
                    expected,
                    "Component type disagrees with type string; using type string"
                );
            }
        }

        let properties = HardwareProperties::from_payload(&kind, raw.extra_properties)
            .map_err(|e| malformed(&raw.xname, format!("ExtraProperties: {}", e)))?;

        HardwareRecord::new(xname, kind, class, properties).map_err(|e| malformed(&raw.xname, e))
    }
}

/// Network document as stored by the inventory service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlsNetwork {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "FullName", default)]
    pub full_name: String,

    #[serde(rename = "IPRanges", default)]
    pub ip_ranges: Vec<String>,

    #[serde(rename = "Type", default)]
    pub network_type: String,

    #[serde(rename = "ExtraProperties", default)]
    pub extra_properties: Option<Value>,
}

/// Decode a network's `ExtraProperties` payload into the typed model
pub fn decode_network_detail(network: &str, payload: Value) -> TopologyResult<NetworkDetail> {
    serde_json::from_value(payload).map_err(|e| malformed(network, e))
}

/// Encode a typed network payload back into its wire form
///
/// Keys the typed model does not interpret come back out unchanged.
pub fn encode_network_detail(detail: &NetworkDetail) -> TopologyResult<Value> {
    Ok(serde_json::to_value(detail)?)
}

impl TryFrom<SlsNetwork> for NetworkRecord {
    type Error = TopologyError;

    fn try_from(raw: SlsNetwork) -> Result<Self, Self::Error> {
        let payload = raw
            .extra_properties
            .ok_or_else(|| malformed(&raw.name, "missing ExtraProperties"))?;
        let detail = decode_network_detail(&raw.name, payload)?;

        Ok(NetworkRecord {
            name: raw.name,
            full_name: raw.full_name,
            ip_ranges: raw.ip_ranges,
            network_type: raw.network_type,
            detail,
        })
    }
}

/// Full inventory dump: hardware keyed by identifier, networks keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlsState {
    #[serde(rename = "Hardware", default)]
    pub hardware: BTreeMap<String, SlsHardware>,

    #[serde(rename = "Networks", default)]
    pub networks: BTreeMap<String, SlsNetwork>,
}

impl SlsState {
    /// Parse a JSON dump
    pub fn from_json(json: &str) -> TopologyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode into the typed inventory
    ///
    /// Fails on the first record that cannot be decoded, naming it. A map key
    /// that disagrees with the record inside it is malformed input.
    pub fn into_inventory(self) -> TopologyResult<InventoryState> {
        let mut state = InventoryState::new();

        for (key, raw) in self.hardware {
            let record = HardwareRecord::try_from(raw)?;
            if record.xname().as_str() != key.trim().to_ascii_lowercase() {
                return Err(malformed(
                    key,
                    format!("keyed under a different identifier than {}", record.xname()),
                ));
            }
            state.insert_hardware(record)?;
        }

        for (key, raw) in self.networks {
            let record = NetworkRecord::try_from(raw)?;
            if record.name != key {
                return Err(malformed(
                    key,
                    format!("keyed under a different name than {}", record.name),
                ));
            }
            state.insert_network(record)?;
        }

        Ok(state)
    }
}

/// Parse a JSON dump straight into the typed inventory
pub fn decode_state(json: &str) -> TopologyResult<InventoryState> {
    SlsState::from_json(json)?.into_inventory()
}

/// Render the typed inventory in the dump layout
pub fn encode_state(state: &InventoryState) -> TopologyResult<String> {
    Ok(serde_json::to_string_pretty(state)?)
}
