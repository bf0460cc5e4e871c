// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::{SpaceTimeWindow, WindowModel};

pub const GRUENTHAL_TIME_BRANCH_MAGNITUDE: f64 = 6.5;

/// Gruenthal (1985) windows as tabulated by van Stiphout et al. (2012).
///
/// - space: `exp(1.77 + sqrt(0.037 + 1.02 M))` km
/// - time: `|exp(-3.95 + sqrt(0.62 + 17.32 M))|` days for `M < 6.5`,
///   else `10^(2.8 + 0.024 M)`
///
/// The space square root turns negative below roughly `M = -0.036`; the
/// resulting NaN makes [`crate::compute_windows`] store an empty window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GruenthalWindow;

impl GruenthalWindow {
    pub const fn new() -> Self {
        Self
    }
}

impl WindowModel for GruenthalWindow {
    fn name(&self) -> &'static str {
        "gruenthal"
    }

    fn window(&self, magnitude: f64) -> SpaceTimeWindow {
        let space_km = (1.77 + (0.037 + 1.02 * magnitude).sqrt()).exp();
        let time_days = if magnitude < GRUENTHAL_TIME_BRANCH_MAGNITUDE {
            (-3.95 + (0.62 + 17.32 * magnitude).sqrt()).exp().abs()
        } else {
            10f64.powf(2.8 + 0.024 * magnitude)
        };
        SpaceTimeWindow {
            space_km,
            time_days,
        }
    }
}
