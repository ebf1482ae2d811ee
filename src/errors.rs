// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology reconciliation

use std::fmt;
use thiserror::Error;

use crate::domain::{HardwareError, InventoryError, NetworkError, XnameError};
use crate::ipam::IpamError;

/// Coarse classification of a [`TopologyError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AddressSpaceExhausted,
    SubnetSpaceExhausted,
    DuplicateReservation,
    OutsideStaticRange,
    InvalidRange,
    GuardRailViolation,
    MalformedInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddressSpaceExhausted => "address space exhausted",
            Self::SubnetSpaceExhausted => "subnet space exhausted",
            Self::DuplicateReservation => "duplicate reservation",
            Self::OutsideStaticRange => "outside static range",
            Self::InvalidRange => "invalid range",
            Self::GuardRailViolation => "guard rail violation",
            Self::MalformedInput => "malformed input",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur during a reconciliation pass
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Hardware was removed or changed between the two inventories
    #[error("Refusing to continue: {} hardware removed ({}), {} hardware changed ({})", removed.len(), removed.join(", "), differing.len(), differing.join(", "))]
    GuardRailViolation {
        removed: Vec<String>,
        differing: Vec<String>,
    },

    /// A record could not be decoded into the typed model
    #[error("Malformed record {record}: {reason}")]
    MalformedInput { record: String, reason: String },

    #[error("Unable to find network {0}")]
    MissingNetwork(String),

    #[error("Unable to find {subnet} subnet in the {network} network")]
    MissingSubnet { network: String, subnet: String },

    #[error("Network {network} allocation failed: {source}")]
    Allocation {
        network: String,
        #[source]
        source: IpamError,
    },

    /// Neither external access network exists
    #[error("Neither of the external access networks ({0}) exist")]
    MissingExternalNetworks(String),

    #[error("Current inventory has no networks defined")]
    NoNetworks,

    #[error("Application node alias {alias} is used by multiple nodes: {}", xnames.join(", "))]
    DuplicateAlias { alias: String, xnames: Vec<String> },

    #[error("Application nodes still carry placeholder metadata: {}", .0.join(", "))]
    Placeholders(Vec<String>),

    #[error("Hardware builder failed for {node}: {reason}")]
    Builder { node: String, reason: String },

    #[error(transparent)]
    Ipam(#[from] IpamError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Xname(#[from] XnameError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TopologyError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GuardRailViolation { .. } => ErrorKind::GuardRailViolation,
            Self::Ipam(err) | Self::Allocation { source: err, .. } => match err {
                IpamError::AddressSpaceExhausted { .. } => ErrorKind::AddressSpaceExhausted,
                IpamError::SubnetSpaceExhausted { .. } => ErrorKind::SubnetSpaceExhausted,
                IpamError::DuplicateReservation { .. } => ErrorKind::DuplicateReservation,
                IpamError::OutsideStaticRange { .. } => ErrorKind::OutsideStaticRange,
                IpamError::InvalidRange { .. }
                | IpamError::InvalidPrefixLength(_)
                | IpamError::AddressOverflow { .. } => ErrorKind::InvalidRange,
                IpamError::SubnetAlreadyExists(_)
                | IpamError::MissingVlan(_)
                | IpamError::NotACabinet(_) => ErrorKind::MalformedInput,
            },
            Self::DuplicateAlias { .. } => ErrorKind::DuplicateReservation,
            _ => ErrorKind::MalformedInput,
        }
    }

    /// Attach the network being modified to an allocator failure
    pub fn allocation(network: impl Into<String>, source: IpamError) -> Self {
        Self::Allocation {
            network: network.into(),
            source,
        }
    }
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(err.to_string())
    }
}
