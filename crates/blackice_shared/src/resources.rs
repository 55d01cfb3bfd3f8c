//! # Resource & Item Kinds
//!
//! Closed enums for everything that can be owned, harvested or traded.
//! String codecs match the identifiers used on the JSON surface.

use serde::{Deserialize, Serialize};

/// Harvestable resource kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Bulk stolen data, the baseline trade good.
    DataPackets,
    /// Compute time harvested from cracked processing nodes.
    CpuCycles,
    /// Link capacity siphoned from backbone taps.
    Bandwidth,
    /// Weaponizable vulnerabilities, the rarest drop.
    ZeroDays,
}

impl ResourceKind {
    /// All resource kinds, in display order.
    pub const ALL: [Self; 4] = [
        Self::DataPackets,
        Self::CpuCycles,
        Self::Bandwidth,
        Self::ZeroDays,
    ];

    /// Returns the wire identifier for this resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataPackets => "data_packets",
            Self::CpuCycles => "cpu_cycles",
            Self::Bandwidth => "bandwidth",
            Self::ZeroDays => "zero_days",
        }
    }

    /// Parses a wire identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "data_packets" => Some(Self::DataPackets),
            "cpu_cycles" => Some(Self::CpuCycles),
            "bandwidth" => Some(Self::Bandwidth),
            "zero_days" => Some(Self::ZeroDays),
            _ => None,
        }
    }
}

/// Category of a tradeable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A harvestable resource (see [`ResourceKind`]).
    Resource,
    /// A complete computer rig.
    Computer,
    /// A rig module (upgrade slot item).
    Module,
}

impl ItemType {
    /// Returns the wire identifier for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Computer => "computer",
            Self::Module => "module",
        }
    }

    /// Parses a wire identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "resource" => Some(Self::Resource),
            "computer" => Some(Self::Computer),
            "module" => Some(Self::Module),
            _ => None,
        }
    }
}
