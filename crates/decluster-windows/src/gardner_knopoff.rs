// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::{SpaceTimeWindow, WindowModel};

/// Magnitude at which the time window switches to the shallow large-event law.
pub const GK_TIME_BRANCH_MAGNITUDE: f64 = 6.5;

/// Gardner & Knopoff (1974) windows.
///
/// - space: `10^(0.1238 M + 0.983)` km
/// - time: `10^(0.5409 M - 0.547)` days for `M < 6.5`, else `10^(0.032 M + 2.7389)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GardnerKnopoffWindow;

impl GardnerKnopoffWindow {
    pub const fn new() -> Self {
        Self
    }
}

impl WindowModel for GardnerKnopoffWindow {
    fn name(&self) -> &'static str {
        "gardner_knopoff"
    }

    fn window(&self, magnitude: f64) -> SpaceTimeWindow {
        let space_km = 10f64.powf(0.1238 * magnitude + 0.983);
        let time_days = if magnitude < GK_TIME_BRANCH_MAGNITUDE {
            10f64.powf(0.5409 * magnitude - 0.547)
        } else {
            10f64.powf(0.032 * magnitude + 2.7389)
        };
        SpaceTimeWindow {
            space_km,
            time_days,
        }
    }
}
