// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

#[cfg(feature = "rayon")]
use decluster_core::haversine_km;
use decluster_core::{
    CatalogView, ClusteringStats, DeclusterError, DeclusterResult, Declusterer, Diagnostics,
    ExecutionContext, ShockType, days_to_years, haversine_many_km,
};
use decluster_windows::{
    WindowMethod, WindowModel, Windows, compute_windows, validate_time_cutoff,
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::borrow::Cow;
use std::time::Instant;
use tracing::debug;

const DEFAULT_FS_TIME_PROP: f64 = 1.0;
#[cfg(feature = "rayon")]
const PARALLEL_MIN_CANDIDATES: usize = 4096;

/// Configuration for [`GardnerKnopoffType1`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct GardnerKnopoffConfig {
    /// Foreshock window as a fraction of the aftershock window, in `[0, 1]`.
    pub fs_time_prop: f64,
    /// Upper bound on every time window, in days.
    pub time_cutoff: Option<f64>,
}

impl Default for GardnerKnopoffConfig {
    fn default() -> Self {
        Self {
            fs_time_prop: DEFAULT_FS_TIME_PROP,
            time_cutoff: None,
        }
    }
}

impl GardnerKnopoffConfig {
    pub fn validate(&self) -> Result<(), DeclusterError> {
        if !self.fs_time_prop.is_finite() || !(0.0..=1.0).contains(&self.fs_time_prop) {
            return Err(DeclusterError::invalid_configuration(format!(
                "GardnerKnopoffConfig.fs_time_prop must be finite and within [0, 1]; got {}",
                self.fs_time_prop
            )));
        }
        validate_time_cutoff(self.time_cutoff)
    }
}

/// Gardner & Knopoff (1974) window declustering, type 1.
///
/// Events are visited from the largest magnitude down. Each still unclustered
/// event opens a search window; every unclustered event inside it (time first,
/// then great-circle distance) joins the new cluster, with the visiting event
/// as its mainshock. Events that end up in no cluster are background.
#[derive(Clone, Debug)]
pub struct GardnerKnopoffType1<W: WindowModel = WindowMethod> {
    window_model: W,
    config: GardnerKnopoffConfig,
}

impl<W: WindowModel> GardnerKnopoffType1<W> {
    pub fn new(window_model: W, config: GardnerKnopoffConfig) -> Result<Self, DeclusterError> {
        config.validate()?;
        Ok(Self {
            window_model,
            config,
        })
    }

    pub fn window_model(&self) -> &W {
        &self.window_model
    }

    pub fn config(&self) -> &GardnerKnopoffConfig {
        &self.config
    }
}

impl GardnerKnopoffType1<WindowMethod> {
    /// Gardner-Knopoff windows with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            window_model: WindowMethod::default(),
            config: GardnerKnopoffConfig::default(),
        }
    }
}

/// Event attributes permuted into visiting order.
struct SortedEvents {
    original_index: Vec<usize>,
    longitude: Vec<f64>,
    latitude: Vec<f64>,
    year_dec: Vec<f64>,
    space_km: Vec<f64>,
    time_years: Vec<f64>,
    /// Window admits nothing, so the event can join a cluster but not seed one.
    empty_window: Vec<bool>,
}

fn checked_counter_increment(counter: &mut usize, name: &str) -> Result<(), DeclusterError> {
    checked_counter_add(counter, 1, name)
}

fn checked_counter_add(counter: &mut usize, delta: usize, name: &str) -> Result<(), DeclusterError> {
    *counter = counter
        .checked_add(delta)
        .ok_or_else(|| DeclusterError::numerical_issue(format!("{name} counter overflow")))?;
    Ok(())
}

/// Descending magnitude order: stable ascending sort, then reversed.
///
/// Equal magnitudes therefore visit the later row first.
pub fn descending_magnitude_order(magnitude: &[f64]) -> Vec<usize> {
    let mut order = (0..magnitude.len()).collect::<Vec<_>>();
    // `+ 0.0` folds -0.0 into 0.0 so signed zeros tie.
    order.sort_by(|&a, &b| (magnitude[a] + 0.0).total_cmp(&(magnitude[b] + 0.0)));
    order.reverse();
    order
}

fn sort_events(catalog: &CatalogView<'_>, year_dec: &[f64], windows: &Windows) -> SortedEvents {
    let original_index = descending_magnitude_order(catalog.magnitude);
    let gather = |values: &[f64]| original_index.iter().map(|&idx| values[idx]).collect();
    SortedEvents {
        longitude: gather(catalog.longitude),
        latitude: gather(catalog.latitude),
        year_dec: gather(year_dec),
        space_km: gather(&windows.space_km),
        time_years: original_index
            .iter()
            .map(|&idx| days_to_years(windows.time_days[idx]))
            .collect(),
        empty_window: original_index
            .iter()
            .map(|&idx| windows.get(idx).is_none_or(|window| window.is_empty()))
            .collect(),
        original_index,
    }
}

#[cfg(feature = "rayon")]
fn can_use_parallel(n_candidates: usize) -> bool {
    n_candidates >= PARALLEL_MIN_CANDIDATES
}

#[cfg(not(feature = "rayon"))]
fn can_use_parallel(_n_candidates: usize) -> bool {
    false
}

/// Great-circle distance from the seed to every time candidate.
fn candidate_distances(
    events: &SortedEvents,
    candidates: &[usize],
    seed: usize,
) -> Result<Vec<f64>, DeclusterError> {
    let ref_lon = events.longitude[seed];
    let ref_lat = events.latitude[seed];

    if can_use_parallel(candidates.len()) {
        #[cfg(feature = "rayon")]
        return Ok(candidates
            .par_iter()
            .map(|&j| haversine_km(events.longitude[j], events.latitude[j], ref_lon, ref_lat))
            .collect());
    }

    let lons = candidates
        .iter()
        .map(|&j| events.longitude[j])
        .collect::<Vec<_>>();
    let lats = candidates
        .iter()
        .map(|&j| events.latitude[j])
        .collect::<Vec<_>>();
    haversine_many_km(&lons, &lats, ref_lon, ref_lat)
}

impl<W: WindowModel> Declusterer for GardnerKnopoffType1<W> {
    fn decluster(
        &self,
        catalog: &CatalogView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<DeclusterResult, DeclusterError> {
        self.config.validate()?;

        let started_at = Instant::now();
        let n = catalog.len();
        let mut notes = vec![format!(
            "window_model={}, fs_time_prop={}, time_cutoff={}",
            self.window_model.name(),
            self.config.fs_time_prop,
            self.config
                .time_cutoff
                .map_or_else(|| "none".to_string(), |cutoff| format!("{cutoff}d")),
        )];
        let mut warnings = vec![];

        if catalog.shadowed_time_column {
            let message = "catalogue has both year/month/day and time columns; using year/month/day";
            ctx.warn(message);
            warnings.push(message.to_string());
        }

        let year_dec = catalog.decimal_years()?;
        let windows = compute_windows(
            &self.window_model,
            catalog.magnitude,
            self.config.time_cutoff,
        )?;
        let empty_windows = windows.empty_count();
        if empty_windows > 0 {
            let message = format!(
                "{empty_windows} event(s) have an empty {} window and cannot seed a cluster",
                self.window_model.name()
            );
            ctx.warn(&message);
            warnings.push(message);
        }
        let events = sort_events(catalog, &year_dec, &windows);

        let mut sorted_ids = vec![0usize; n];
        let mut sorted_shocks = vec![ShockType::Mainshock; n];
        let mut stats = ClusteringStats::default();
        let mut next_id = 0usize;
        let mut candidates = Vec::with_capacity(n);
        let mut members = Vec::with_capacity(n);

        for i in 0..n.saturating_sub(1) {
            if ctx.is_progress_step(i) {
                ctx.report_progress(i as f32 / n as f32);
            }
            if sorted_ids[i] != 0 || events.empty_window[i] {
                continue;
            }
            checked_counter_increment(&mut stats.seeds_considered, "seeds_considered")?;

            let seed_time = events.year_dec[i];
            let after = events.time_years[i];
            let before = -(after * self.config.fs_time_prop);

            candidates.clear();
            candidates.extend((0..n).filter(|&j| {
                let dt = events.year_dec[j] - seed_time;
                sorted_ids[j] == 0 && dt >= before && dt <= after
            }));
            checked_counter_add(&mut stats.time_candidates, candidates.len(), "time_candidates")?;
            checked_counter_add(
                &mut stats.distance_evaluations,
                candidates.len(),
                "distance_evaluations",
            )?;

            let distances = candidate_distances(&events, &candidates, i)?;
            let radius = events.space_km[i];
            members.clear();
            members.extend(
                candidates
                    .iter()
                    .zip(&distances)
                    .filter(|&(_, &distance)| distance <= radius)
                    .map(|(&j, _)| j),
            );

            if !members.iter().any(|&j| j != i) {
                continue;
            }

            checked_counter_increment(&mut next_id, "cluster_id")?;
            let mut foreshocks = 0usize;
            for &j in &members {
                sorted_ids[j] = next_id;
                sorted_shocks[j] = if j != i && events.year_dec[j] - seed_time < 0.0 {
                    foreshocks += 1;
                    ShockType::Foreshock
                } else {
                    ShockType::Aftershock
                };
            }
            sorted_ids[i] = next_id;
            sorted_shocks[i] = ShockType::Mainshock;

            let seed_row = events.original_index[i];
            debug!(
                cluster_id = next_id,
                mainshock = seed_row,
                magnitude = catalog.magnitude[seed_row],
                members = members.len(),
                foreshocks,
                "cluster formed"
            );
            stats.clusters_formed = next_id;
            checked_counter_add(&mut stats.clustered_events, members.len(), "clustered_events")?;
        }

        let mut cluster_ids = vec![0usize; n];
        let mut shock_types = vec![ShockType::Mainshock; n];
        for (sorted_pos, &row) in events.original_index.iter().enumerate() {
            cluster_ids[row] = sorted_ids[sorted_pos];
            shock_types[row] = sorted_shocks[sorted_pos];
        }

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        ctx.record_scalar(
            "engine.gardner_knopoff.seeds_considered",
            stats.seeds_considered as f64,
        );
        ctx.record_scalar(
            "engine.gardner_knopoff.time_candidates",
            stats.time_candidates as f64,
        );
        ctx.record_scalar(
            "engine.gardner_knopoff.clusters_formed",
            stats.clusters_formed as f64,
        );
        ctx.record_scalar(
            "engine.gardner_knopoff.clustered_events",
            stats.clustered_events as f64,
        );
        ctx.record_scalar("engine.gardner_knopoff.runtime_ms", runtime_ms as f64);
        ctx.report_progress(1.0);

        debug!(
            n,
            clusters = stats.clusters_formed,
            clustered_events = stats.clustered_events,
            runtime_ms,
            "gardner-knopoff declustering finished"
        );
        notes.push(format!(
            "clusters_formed={}, clustered_events={}, seeds_considered={}, time_candidates={}, empty_windows={}",
            stats.clusters_formed,
            stats.clustered_events,
            stats.seeds_considered,
            stats.time_candidates,
            empty_windows
        ));

        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(runtime_ms),
            notes,
            warnings,
            algorithm: Cow::Borrowed("gardner_knopoff_type1"),
            window_model: Cow::Borrowed(self.window_model.name()),
            time_source: Some(catalog.time_source()),
            #[cfg(feature = "serde")]
            params_json: Some(serde_json::json!({
                "window": self.window_model.name(),
                "fs_time_prop": self.config.fs_time_prop,
                "time_cutoff": self.config.time_cutoff,
            })),
            clustering_stats: Some(stats),
            ..Diagnostics::default()
        };

        DeclusterResult::new(cluster_ids, shock_types, diagnostics)
    }
}
