// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::gardner_knopoff::{GardnerKnopoffConfig, GardnerKnopoffType1};
use decluster_core::DeclusterError;
use decluster_windows::WindowMethod;

/// Name-addressable run description: window method plus engine settings.
///
/// With the `serde` feature every field is optional in JSON and falls back to
/// its default.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Clone, Debug, PartialEq)]
pub struct DeclusterSpec {
    pub window: WindowMethod,
    pub fs_time_prop: f64,
    pub time_cutoff: Option<f64>,
}

impl Default for DeclusterSpec {
    fn default() -> Self {
        Self::new(WindowMethod::default(), GardnerKnopoffConfig::default())
    }
}

impl DeclusterSpec {
    pub fn new(window: WindowMethod, config: GardnerKnopoffConfig) -> Self {
        Self {
            window,
            fs_time_prop: config.fs_time_prop,
            time_cutoff: config.time_cutoff,
        }
    }

    pub fn config(&self) -> GardnerKnopoffConfig {
        GardnerKnopoffConfig {
            fs_time_prop: self.fs_time_prop,
            time_cutoff: self.time_cutoff,
        }
    }

    /// Validates the settings and builds the engine.
    pub fn build(&self) -> Result<GardnerKnopoffType1<WindowMethod>, DeclusterError> {
        GardnerKnopoffType1::new(self.window, self.config())
    }
}
