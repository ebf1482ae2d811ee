// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hardware Identifier (xname) Value Object
//!
//! An xname encodes a component's physical lineage as a run of
//! `<letters><ordinal>` segments, e.g. `x3000c0s17b0n0` is node 0 on BMC 0 in
//! slot 17 of chassis 0 in cabinet 3000. CDU hardware is rooted at `d<n>`
//! instead of `x<n>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XnameError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier must start with 'x' (cabinet), 'd' (CDU) or be the system root 's0': {0}")]
    InvalidRoot(String),

    #[error("Malformed identifier segment in {xname}: {reason}")]
    MalformedSegment { xname: String, reason: String },

    #[error("Identifier {0} is not rooted at a cabinet")]
    NotInCabinet(String),
}

/// Parent of every cabinet and CDU
pub const SYSTEM_XNAME: &str = "s0";

/// Hierarchical hardware identifier
///
/// Invariants:
/// - Non-empty, lowercase
/// - Alternating letter prefix / decimal ordinal segments
/// - Rooted at a cabinet (`x`), a CDU (`d`) or the system (`s0`)
///
/// Ordering is lexical on the canonical string, which is the order every
/// sorted sequence in this crate uses.
///
/// # Examples
///
/// ```rust
/// use topology_assistant::domain::Xname;
///
/// let node = Xname::new("x3000c0s17b0n0").unwrap();
/// assert_eq!(node.parent().as_str(), "x3000c0s17b0");
/// assert_eq!(node.cabinet_ordinal(), Some(3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Xname(String);

impl Xname {
    pub fn new(xname: impl Into<String>) -> Result<Self, XnameError> {
        let xname = xname.into().trim().to_ascii_lowercase();

        if xname.is_empty() {
            return Err(XnameError::Empty);
        }

        if xname != SYSTEM_XNAME && !xname.starts_with('x') && !xname.starts_with('d') {
            return Err(XnameError::InvalidRoot(xname));
        }

        Self::segments_of(&xname)?;
        Ok(Self(xname))
    }

    /// The system root, parent of cabinets and CDUs
    pub fn system() -> Self {
        Self(SYSTEM_XNAME.to_string())
    }

    /// Split into `(prefix, ordinal)` pairs, validating as we go
    fn segments_of(xname: &str) -> Result<Vec<(&str, u32)>, XnameError> {
        let malformed = |reason: &str| XnameError::MalformedSegment {
            xname: xname.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = xname;
        while !rest.is_empty() {
            let letters = rest
                .find(|c: char| !c.is_ascii_lowercase())
                .ok_or_else(|| malformed("prefix without ordinal"))?;
            if letters == 0 {
                return Err(malformed("ordinal without prefix"));
            }

            let (prefix, tail) = rest.split_at(letters);
            let digits = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
            if digits == 0 {
                return Err(malformed("prefix without ordinal"));
            }

            let (ordinal, tail) = tail.split_at(digits);
            let ordinal = ordinal
                .parse::<u32>()
                .map_err(|_| malformed("ordinal out of range"))?;

            segments.push((prefix, ordinal));
            rest = tail;
        }

        Ok(segments)
    }

    fn segments(&self) -> Vec<(&str, u32)> {
        // Validated at construction.
        Self::segments_of(&self.0).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Immediate structural parent: the identifier minus its last segment
    ///
    /// Cabinets and CDUs are parented by the system root; the root is its own
    /// parent.
    pub fn parent(&self) -> Xname {
        let parent = self
            .0
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .trim_end_matches(|c: char| c.is_ascii_lowercase());

        if parent.is_empty() {
            return Self::system();
        }
        Self(parent.to_string())
    }

    /// Ordinal of the last segment
    pub fn ordinal(&self) -> u32 {
        self.segments().last().map(|(_, n)| *n).unwrap_or_default()
    }

    /// Cabinet ordinal if the identifier is rooted at a cabinet
    pub fn cabinet_ordinal(&self) -> Option<u32> {
        match self.segments().first() {
            Some(("x", ordinal)) => Some(*ordinal),
            _ => None,
        }
    }

    /// Cabinet this identifier lives in
    pub fn cabinet(&self) -> Result<Xname, XnameError> {
        self.cabinet_ordinal()
            .map(|ordinal| Self(format!("x{}", ordinal)))
            .ok_or_else(|| XnameError::NotInCabinet(self.0.clone()))
    }

    /// Whether this identifier names a cabinet itself
    pub fn is_cabinet(&self) -> bool {
        self.segments().len() == 1 && self.cabinet_ordinal().is_some()
    }
}

impl fmt::Display for Xname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Xname {
    type Err = XnameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Xname {
    type Error = XnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Xname> for String {
    fn from(value: Xname) -> Self {
        value.0
    }
}

impl AsRef<str> for Xname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
