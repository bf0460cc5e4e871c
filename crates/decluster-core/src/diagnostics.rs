// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::catalog::TimeSource;
use std::borrow::Cow;

/// Diagnostics schema version for declustering run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Counters collected during the clustering pass.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusteringStats {
    /// Sorted positions that were still unclustered when visited.
    pub seeds_considered: usize,
    /// Events that passed the time-window test, summed over seeds.
    pub time_candidates: usize,
    pub distance_evaluations: usize,
    pub clusters_formed: usize,
    pub clustered_events: usize,
}

/// Structured diagnostics captured from a declustering run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub n: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub algorithm: Cow<'static, str>,
    pub window_model: Cow<'static, str>,
    pub time_source: Option<TimeSource>,
    #[cfg(feature = "serde")]
    pub params_json: Option<serde_json::Value>,
    pub clustering_stats: Option<ClusteringStats>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            notes: vec![],
            warnings: vec![],
            algorithm: Cow::Borrowed(""),
            window_model: Cow::Borrowed(""),
            time_source: None,
            #[cfg(feature = "serde")]
            params_json: None,
            clustering_stats: None,
        }
    }
}
