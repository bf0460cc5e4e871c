// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod catalog;
pub mod declusterer;
pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod geo;
pub mod observability;
pub mod results;
pub mod time;

pub use catalog::{CatalogColumns, CatalogView, EventTimes, TimeSource};
pub use declusterer::Declusterer;
pub use diagnostics::{ClusteringStats, DIAGNOSTICS_SCHEMA_VERSION, Diagnostics};
pub use error::DeclusterError;
pub use execution_context::ExecutionContext;
pub use geo::{EARTH_RADIUS_KM, haversine_km, haversine_many_km};
pub use observability::{ProgressSink, TelemetrySink};
pub use results::{DeclusterResult, ShockType, validate_assignments};
pub use time::{
    DAYS_PER_YEAR, days_to_years, decimal_year, decimal_year_from_timestamp, decimal_years,
};

/// Core shared types and primitives for catalog declustering.
pub fn crate_name() -> &'static str {
    "decluster-core"
}
