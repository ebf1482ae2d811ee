// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change-set produced by a reconciliation pass

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{HardwareRecord, IpReservation, NetworkRecord, Subnet, Xname};

/// A subnet carved out during the pass, and the hardware that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetEvent {
    #[serde(rename = "NetworkName")]
    pub network_name: String,

    #[serde(rename = "SubnetName")]
    pub subnet_name: String,

    #[serde(rename = "Subnet")]
    pub subnet: Subnet,

    #[serde(rename = "Xname")]
    pub causing_xname: Xname,
}

/// An address reserved during the pass, and the hardware that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpReservationEvent {
    #[serde(rename = "NetworkName")]
    pub network_name: String,

    #[serde(rename = "SubnetName")]
    pub subnet_name: String,

    #[serde(rename = "IPReservation")]
    pub reservation: IpReservation,

    #[serde(rename = "Xname")]
    pub causing_xname: Xname,
}

/// Everything one pass wants added to the inventory
///
/// Purely additive: new hardware, and replacement records for the networks
/// that gained subnets or reservations. The two event lists are an audit trail
/// and carry nothing the other fields do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologyChanges {
    /// Sorted by identifier
    #[serde(rename = "HardwareAdded")]
    pub hardware_added: Vec<HardwareRecord>,

    /// Only networks that were actually touched
    #[serde(rename = "ModifiedNetworks")]
    pub modified_networks: BTreeMap<String, NetworkRecord>,

    #[serde(rename = "SubnetsAdded")]
    pub subnets_added: Vec<SubnetEvent>,

    #[serde(rename = "IPReservationsAdded")]
    pub ip_reservations_added: Vec<IpReservationEvent>,
}

impl TopologyChanges {
    pub fn is_empty(&self) -> bool {
        self.hardware_added.is_empty() && self.modified_networks.is_empty()
    }
}
