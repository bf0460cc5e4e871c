// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::{SpaceTimeWindow, WindowModel};

/// Uhrhammer (1986) windows: `exp(-1.024 + 0.804 M)` km and
/// `exp(-2.87 + 1.235 M)` days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UhrhammerWindow;

impl UhrhammerWindow {
    pub const fn new() -> Self {
        Self
    }
}

impl WindowModel for UhrhammerWindow {
    fn name(&self) -> &'static str {
        "uhrhammer"
    }

    fn window(&self, magnitude: f64) -> SpaceTimeWindow {
        SpaceTimeWindow {
            space_km: (-1.024 + 0.804 * magnitude).exp(),
            time_days: (-2.87 + 1.235 * magnitude).exp(),
        }
    }
}
