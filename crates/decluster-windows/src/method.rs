// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::gardner_knopoff::GardnerKnopoffWindow;
use crate::gruenthal::GruenthalWindow;
use crate::model::{SpaceTimeWindow, WindowModel};
use crate::uhrhammer::UhrhammerWindow;
use decluster_core::DeclusterError;
use std::fmt;
use std::str::FromStr;

/// Closed set of built-in window models, selectable by name.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowMethod {
    #[default]
    GardnerKnopoff,
    Gruenthal,
    Uhrhammer,
}

impl WindowMethod {
    pub const ALL: [Self; 3] = [Self::GardnerKnopoff, Self::Gruenthal, Self::Uhrhammer];

    /// Resolves a user-facing method name. Matching ignores ASCII case.
    pub fn parse(raw: &str) -> Result<Self, DeclusterError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gardner_knopoff" | "gardner-knopoff" | "gardnerknopoff" | "gk" => {
                Ok(Self::GardnerKnopoff)
            }
            "gruenthal" => Ok(Self::Gruenthal),
            "uhrhammer" => Ok(Self::Uhrhammer),
            _ => Err(DeclusterError::invalid_configuration(format!(
                "unsupported window method '{raw}'; expected one of: 'gardner_knopoff', 'gruenthal', 'uhrhammer'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GardnerKnopoff => "gardner_knopoff",
            Self::Gruenthal => "gruenthal",
            Self::Uhrhammer => "uhrhammer",
        }
    }
}

impl WindowModel for WindowMethod {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn window(&self, magnitude: f64) -> SpaceTimeWindow {
        match self {
            Self::GardnerKnopoff => GardnerKnopoffWindow.window(magnitude),
            Self::Gruenthal => GruenthalWindow.window(magnitude),
            Self::Uhrhammer => UhrhammerWindow.window(magnitude),
        }
    }
}

impl FromStr for WindowMethod {
    type Err = DeclusterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for WindowMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
