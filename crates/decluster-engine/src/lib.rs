// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod gardner_knopoff;
pub mod spec;

pub use gardner_knopoff::{GardnerKnopoffConfig, GardnerKnopoffType1, descending_magnitude_order};
pub use spec::DeclusterSpec;

/// Declustering engine namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = (decluster_core::crate_name(), decluster_windows::crate_name());
    "decluster-engine"
}
