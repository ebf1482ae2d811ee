// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hardware Records and Their Typed Payloads
//!
//! Every inventory record carries a kind-specific payload. Instead of an
//! open-ended map, the payload is one of a closed set of variants selected by
//! the record's [`HardwareKind`]; kinds whose payload the reconciler never
//! reads keep it as an opaque map.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

use super::network::{Ipv4Cidr, VlanId};
use super::Xname;

/// Placeholder the topology tooling writes when an operator must supply a value
pub const FIXME_PLACEHOLDER: &str = "~~FIXME~~";

/// Hardware record validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HardwareError {
    #[error("Unknown hardware class: {0}")]
    UnknownClass(String),

    #[error("Unknown hardware type: {0}")]
    UnknownKind(String),

    #[error("Payload for {xname} does not match its hardware type {kind}")]
    PropertiesMismatch { xname: String, kind: HardwareKind },

    #[error("Cannot derive BMC ordinal from NID 0")]
    ZeroNid,
}

/// Cooling/architecture class of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HardwareClass {
    /// Air-cooled, standard racks
    River,
    /// Liquid-cooled, standard racks
    Hill,
    /// Liquid-cooled, dense cabinets
    Mountain,
}

impl HardwareClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::River => "River",
            Self::Hill => "Hill",
            Self::Mountain => "Mountain",
        }
    }

    pub fn parse(s: &str) -> Result<Self, HardwareError> {
        match s {
            "River" => Ok(Self::River),
            "Hill" => Ok(Self::Hill),
            "Mountain" => Ok(Self::Mountain),
            other => Err(HardwareError::UnknownClass(other.to_string())),
        }
    }
}

impl fmt::Display for HardwareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hardware type taxonomy
///
/// The component types the reconciler knows, each with a canonical type
/// string and a component-type string used on the wire. Any other type is
/// carried as [`HardwareKind::Other`] with both strings kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum HardwareKind {
    Cabinet,
    #[serde(rename = "CabinetPDUController")]
    CabinetPduController,
    #[serde(rename = "CDU")]
    Cdu,
    #[serde(rename = "CDUMgmtSwitch")]
    CduMgmtSwitch,
    Chassis,
    #[serde(rename = "ChassisBMC")]
    ChassisBmc,
    ComputeModule,
    #[serde(rename = "HSNBoard")]
    HsnBoard,
    MgmtSwitch,
    MgmtSwitchConnector,
    #[serde(rename = "MgmtHLSwitch")]
    MgmtHlSwitch,
    Node,
    #[serde(rename = "NodeBMC")]
    NodeBmc,
    #[serde(rename = "RouterBMC")]
    RouterBmc,
    RouterModule,
    #[serde(skip)]
    Other {
        type_string: String,
        comptype: Option<String>,
    },
}

impl HardwareKind {
    /// Canonical type string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cabinet => "Cabinet",
            Self::CabinetPduController => "CabinetPDUController",
            Self::Cdu => "CDU",
            Self::CduMgmtSwitch => "CDUMgmtSwitch",
            Self::Chassis => "Chassis",
            Self::ChassisBmc => "ChassisBMC",
            Self::ComputeModule => "ComputeModule",
            Self::HsnBoard => "HSNBoard",
            Self::MgmtSwitch => "MgmtSwitch",
            Self::MgmtSwitchConnector => "MgmtSwitchConnector",
            Self::MgmtHlSwitch => "MgmtHLSwitch",
            Self::Node => "Node",
            Self::NodeBmc => "NodeBMC",
            Self::RouterBmc => "RouterBMC",
            Self::RouterModule => "RouterModule",
            Self::Other { type_string, .. } => type_string.as_str(),
        }
    }

    /// Component type string
    pub fn comptype(&self) -> Option<&str> {
        let comptype = match self {
            Self::Cabinet => "comptype_cabinet",
            Self::CabinetPduController => "comptype_cab_pdu_controller",
            Self::Cdu => "comptype_cdu",
            Self::CduMgmtSwitch => "comptype_cdu_mgmt_switch",
            Self::Chassis => "comptype_chassis",
            Self::ChassisBmc => "comptype_chassis_bmc",
            Self::ComputeModule => "comptype_compmod",
            Self::HsnBoard => "comptype_hsn_board",
            Self::MgmtSwitch => "comptype_mgmt_switch",
            Self::MgmtSwitchConnector => "comptype_mgmt_switch_connector",
            Self::MgmtHlSwitch => "comptype_hl_switch",
            Self::Node => "comptype_node",
            Self::NodeBmc => "comptype_ncard",
            Self::RouterBmc => "comptype_rtr_bmc",
            Self::RouterModule => "comptype_rtrmod",
            Self::Other { comptype, .. } => return comptype.as_deref(),
        };
        Some(comptype)
    }

    pub fn parse(s: &str) -> Result<Self, HardwareError> {
        serde_json::from_value(Value::String(s.to_string()))
            .map_err(|_| HardwareError::UnknownKind(s.to_string()))
    }

    /// Kind for a wire record: a known type, or [`HardwareKind::Other`]
    pub fn from_wire(type_string: &str, comptype: Option<&str>) -> Result<Self, HardwareError> {
        if type_string.is_empty() {
            return Err(HardwareError::UnknownKind(String::new()));
        }

        Ok(Self::parse(type_string).unwrap_or_else(|_| Self::Other {
            type_string: type_string.to_string(),
            comptype: comptype.map(str::to_string),
        }))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other { .. })
    }

    /// Switches that receive an address on every fabric network
    pub fn is_management_switch(&self) -> bool {
        matches!(
            self,
            Self::MgmtSwitch | Self::MgmtHlSwitch | Self::CduMgmtSwitch
        )
    }
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a `Node`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperties {
    #[serde(rename = "NID", default, skip_serializing_if = "Option::is_none")]
    pub nid: Option<u32>,

    #[serde(rename = "Role")]
    pub role: String,

    #[serde(rename = "SubRole", default, skip_serializing_if = "Option::is_none")]
    pub sub_role: Option<String>,

    #[serde(rename = "Aliases", default)]
    pub aliases: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NodeProperties {
    pub const ROLE_MANAGEMENT: &'static str = "Management";
    pub const ROLE_APPLICATION: &'static str = "Application";
    pub const ROLE_COMPUTE: &'static str = "Compute";

    pub fn is_management(&self) -> bool {
        self.role == Self::ROLE_MANAGEMENT
    }

    pub fn is_application(&self) -> bool {
        self.role == Self::ROLE_APPLICATION
    }

    pub fn has_sub_role(&self, sub_role: &str) -> bool {
        self.sub_role.as_deref() == Some(sub_role)
    }

    /// First alias, used as the reservation name on external networks
    pub fn primary_alias(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }

    /// Whether an operator still has to fill in sub-role or aliases
    pub fn has_placeholders(&self) -> bool {
        self.sub_role.as_deref() == Some(FIXME_PLACEHOLDER)
            || self.aliases.iter().any(|alias| alias == FIXME_PLACEHOLDER)
    }
}

/// BMC ordinal of a node in a dense four-node chassis, derived from its NID
///
/// NIDs are assigned serially starting at 1, four per chassis, so NID 1..=4
/// map to BMC 1..=4, NID 5 wraps back to BMC 1, and so on.
pub fn dense_chassis_bmc_ordinal(nid: u32) -> Result<u32, HardwareError> {
    if nid == 0 {
        return Err(HardwareError::ZeroNid);
    }
    Ok(((nid - 1) % 4) + 1)
}

/// Payload shared by the three management switch kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchProperties {
    #[serde(rename = "IP4addr", default, skip_serializing_if = "Option::is_none")]
    pub ip4addr: Option<Ipv4Addr>,

    #[serde(rename = "Brand", default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(rename = "Aliases", default)]
    pub aliases: Vec<String>,

    /// SNMP credential pointers and anything else carried verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Network parameters recorded on a cabinet for one of its networks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetNetwork {
    #[serde(rename = "CIDR")]
    pub cidr: Ipv4Cidr,

    #[serde(rename = "Gateway")]
    pub gateway: Ipv4Addr,

    #[serde(rename = "VLan")]
    pub vlan: VlanId,
}

/// Payload of a `Cabinet`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetProperties {
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Keyed by network group (`cn`, `ncn`) then network family (`HMN`, `NMN`)
    #[serde(rename = "Networks", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, BTreeMap<String, CabinetNetwork>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CabinetProperties {
    /// Network group under which compute-facing subnets are recorded
    pub const COMPUTE_NETWORKS: &'static str = "cn";

    /// VLAN declared for a network family in the compute group, if any
    pub fn declared_vlan(&self, family: &str) -> Option<VlanId> {
        self.networks
            .get(Self::COMPUTE_NETWORKS)
            .and_then(|group| group.get(family))
            .map(|network| network.vlan)
    }
}

/// Payload of a `MgmtSwitchConnector`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConnectorProperties {
    #[serde(rename = "NodeNics", default)]
    pub node_nics: Vec<String>,

    #[serde(rename = "VendorName", default)]
    pub vendor_name: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Kind-specific payload of a hardware record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HardwareProperties {
    Node(NodeProperties),
    Switch(SwitchProperties),
    Cabinet(CabinetProperties),
    SwitchConnector(SwitchConnectorProperties),
    /// Payload of kinds the reconciler never interprets
    Opaque(BTreeMap<String, Value>),
}

impl HardwareProperties {
    pub fn empty() -> Self {
        Self::Opaque(BTreeMap::new())
    }

    /// Decode a raw payload according to the record's kind
    pub fn from_payload(kind: &HardwareKind, payload: Option<Value>) -> serde_json::Result<Self> {
        let payload = match payload {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(value) => value,
        };

        Ok(match kind {
            HardwareKind::Node => Self::Node(serde_json::from_value(payload)?),
            HardwareKind::MgmtSwitch | HardwareKind::MgmtHlSwitch | HardwareKind::CduMgmtSwitch => {
                Self::Switch(serde_json::from_value(payload)?)
            }
            HardwareKind::Cabinet => Self::Cabinet(serde_json::from_value(payload)?),
            HardwareKind::MgmtSwitchConnector => {
                Self::SwitchConnector(serde_json::from_value(payload)?)
            }
            _ => Self::Opaque(serde_json::from_value(payload)?),
        })
    }

    /// Whether this payload variant is the one `kind` carries
    pub fn matches(&self, kind: &HardwareKind) -> bool {
        match self {
            Self::Node(_) => *kind == HardwareKind::Node,
            Self::Switch(_) => kind.is_management_switch(),
            Self::Cabinet(_) => *kind == HardwareKind::Cabinet,
            Self::SwitchConnector(_) => *kind == HardwareKind::MgmtSwitchConnector,
            Self::Opaque(_) => !matches!(
                kind,
                HardwareKind::Node
                    | HardwareKind::MgmtSwitch
                    | HardwareKind::MgmtHlSwitch
                    | HardwareKind::CduMgmtSwitch
                    | HardwareKind::Cabinet
                    | HardwareKind::MgmtSwitchConnector
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Opaque(map) if map.is_empty())
    }
}

/// A physical or logical component in the inventory
///
/// # Invariants
/// - `parent` is derived from `xname`
/// - `properties` is the variant `kind` carries
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "crate::adapters::sls::SlsHardware")]
pub struct HardwareRecord {
    xname: Xname,
    parent: Xname,
    pub class: HardwareClass,
    kind: HardwareKind,
    pub properties: HardwareProperties,
}

impl HardwareRecord {
    pub fn new(
        xname: Xname,
        kind: HardwareKind,
        class: HardwareClass,
        properties: HardwareProperties,
    ) -> Result<Self, HardwareError> {
        if !properties.matches(&kind) {
            return Err(HardwareError::PropertiesMismatch {
                xname: xname.to_string(),
                kind,
            });
        }

        Ok(Self {
            parent: xname.parent(),
            xname,
            class,
            kind,
            properties,
        })
    }

    pub fn xname(&self) -> &Xname {
        &self.xname
    }

    pub fn parent(&self) -> &Xname {
        &self.parent
    }

    pub fn kind(&self) -> &HardwareKind {
        &self.kind
    }

    pub fn node(&self) -> Option<&NodeProperties> {
        match &self.properties {
            HardwareProperties::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn switch(&self) -> Option<&SwitchProperties> {
        match &self.properties {
            HardwareProperties::Switch(switch) => Some(switch),
            _ => None,
        }
    }

    pub fn switch_mut(&mut self) -> Option<&mut SwitchProperties> {
        match &mut self.properties {
            HardwareProperties::Switch(switch) => Some(switch),
            _ => None,
        }
    }

    pub fn cabinet(&self) -> Option<&CabinetProperties> {
        match &self.properties {
            HardwareProperties::Cabinet(cabinet) => Some(cabinet),
            _ => None,
        }
    }

    pub fn cabinet_mut(&mut self) -> Option<&mut CabinetProperties> {
        match &mut self.properties {
            HardwareProperties::Cabinet(cabinet) => Some(cabinet),
            _ => None,
        }
    }

    /// Management-role node
    pub fn is_management_node(&self) -> bool {
        self.node().is_some_and(NodeProperties::is_management)
    }
}

impl Serialize for HardwareRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "Parent")]
            parent: &'a Xname,
            #[serde(rename = "Xname")]
            xname: &'a Xname,
            #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
            comptype: Option<&'a str>,
            #[serde(rename = "Class")]
            class: HardwareClass,
            #[serde(rename = "TypeString")]
            type_string: &'a str,
            #[serde(rename = "ExtraProperties", skip_serializing_if = "Option::is_none")]
            properties: Option<&'a HardwareProperties>,
        }

        Wire {
            parent: &self.parent,
            xname: &self.xname,
            comptype: self.kind.comptype(),
            class: self.class,
            type_string: self.kind.as_str(),
            properties: (!self.properties.is_empty()).then_some(&self.properties),
        }
        .serialize(serializer)
    }
}
