// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod gardner_knopoff;
pub mod gruenthal;
pub mod method;
pub mod model;
pub mod uhrhammer;

pub use gardner_knopoff::GardnerKnopoffWindow;
pub use gruenthal::GruenthalWindow;
pub use method::WindowMethod;
pub use model::{SpaceTimeWindow, WindowModel, Windows, compute_windows, validate_time_cutoff};
pub use uhrhammer::UhrhammerWindow;

/// Built-in window model namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = decluster_core::crate_name();
    "decluster-windows"
}
