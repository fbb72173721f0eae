//! Enumerated configuration values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit of measurement for all lengths and speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    In,
}

impl Unit {
    pub const VALUES: &'static [&'static str] = &["mm", "in"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::In => "in",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" => Ok(Unit::Mm),
            "in" => Ok(Unit::In),
            other => Err(format!("invalid unit '{}': expected one of mm, in", other)),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the machine's coordinate origin sits on the bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineOrigin {
    BottomLeft,
    Center,
    TopLeft,
}

impl MachineOrigin {
    pub const VALUES: &'static [&'static str] = &["bottom-left", "center", "top-left"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineOrigin::BottomLeft => "bottom-left",
            MachineOrigin::Center => "center",
            MachineOrigin::TopLeft => "top-left",
        }
    }
}

impl FromStr for MachineOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-left" => Ok(MachineOrigin::BottomLeft),
            "center" => Ok(MachineOrigin::Center),
            "top-left" => Ok(MachineOrigin::TopLeft),
            other => Err(format!(
                "invalid machine origin '{}': expected one of bottom-left, center, top-left",
                other
            )),
        }
    }
}

impl fmt::Display for MachineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two passes a drawing is split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Engrave,
    Cut,
}

impl LayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerRole::Engrave => "engrave",
            LayerRole::Cut => "cut",
        }
    }
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
