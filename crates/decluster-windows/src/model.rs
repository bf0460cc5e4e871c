// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::TimeDelta;
use decluster_core::DeclusterError;
use tracing::trace;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Uncapped neighbourhood searched around one event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceTimeWindow {
    pub space_km: f64,
    pub time_days: f64,
}

impl SpaceTimeWindow {
    /// A window that admits no event, not even one at zero distance and time.
    pub const EMPTY: Self = Self {
        space_km: f64::NAN,
        time_days: f64::NAN,
    };

    /// True when no event can fall inside this window.
    ///
    /// A NaN or negative extent leaves nothing to search: the time range
    /// `[-fs * t, t]` is empty for `t < 0` and no distance is below a negative
    /// radius.
    pub fn is_empty(&self) -> bool {
        let inadmissible = |extent: f64| extent.is_nan() || extent < 0.0;
        inadmissible(self.space_km) || inadmissible(self.time_days)
    }
}

/// Closed-form magnitude to window mapping.
///
/// Implementations are pure: the same magnitude always yields the same window,
/// independent of any other event. The optional time cutoff is applied by
/// [`compute_windows`], never by the model itself.
pub trait WindowModel {
    fn name(&self) -> &'static str;

    fn window(&self, magnitude: f64) -> SpaceTimeWindow;
}

impl<M: WindowModel + ?Sized> WindowModel for &M {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn window(&self, magnitude: f64) -> SpaceTimeWindow {
        (**self).window(magnitude)
    }
}

/// Per-event windows, index-aligned with the magnitudes they came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Windows {
    pub space_km: Vec<f64>,
    pub time_days: Vec<f64>,
}

impl Windows {
    pub fn len(&self) -> usize {
        self.space_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.space_km.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<SpaceTimeWindow> {
        Some(SpaceTimeWindow {
            space_km: *self.space_km.get(idx)?,
            time_days: *self.time_days.get(idx)?,
        })
    }

    /// Number of events whose window admits nothing.
    pub fn empty_count(&self) -> usize {
        (0..self.len())
            .filter(|&idx| self.get(idx).is_some_and(|window| window.is_empty()))
            .count()
    }

    /// Time window of event `idx` as a duration, at millisecond resolution.
    ///
    /// `None` for empty windows and for durations chrono cannot represent.
    pub fn time_delta(&self, idx: usize) -> Option<TimeDelta> {
        let millis = (self.time_days.get(idx)? * MILLIS_PER_DAY).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        TimeDelta::try_milliseconds(millis as i64)
    }
}

/// Validates an optional time cutoff in days.
pub fn validate_time_cutoff(time_cutoff: Option<f64>) -> Result<(), DeclusterError> {
    if let Some(cutoff) = time_cutoff
        && (!cutoff.is_finite() || cutoff < 0.0)
    {
        return Err(DeclusterError::invalid_configuration(format!(
            "time_cutoff must be finite and >= 0 days; got {cutoff}"
        )));
    }
    Ok(())
}

/// Evaluates `model` for every magnitude and applies the optional cutoff.
///
/// With a cutoff configured each time window becomes `min(window, cutoff)`;
/// without one the model output is returned as is. Space windows are never
/// clamped. A model output with a NaN or negative extent (Gruenthal below
/// about M -0.036) is stored as [`SpaceTimeWindow::EMPTY`] and left uncapped:
/// such an event can still be absorbed by a larger one but never seeds a
/// cluster.
pub fn compute_windows<M: WindowModel + ?Sized>(
    model: &M,
    magnitudes: &[f64],
    time_cutoff: Option<f64>,
) -> Result<Windows, DeclusterError> {
    validate_time_cutoff(time_cutoff)?;

    let mut space_km = Vec::with_capacity(magnitudes.len());
    let mut time_days = Vec::with_capacity(magnitudes.len());

    for (idx, &magnitude) in magnitudes.iter().enumerate() {
        let window = model.window(magnitude);
        if window.is_empty() {
            trace!(
                model = model.name(),
                event = idx,
                magnitude,
                space_km = window.space_km,
                time_days = window.time_days,
                "window admits no events"
            );
            space_km.push(SpaceTimeWindow::EMPTY.space_km);
            time_days.push(SpaceTimeWindow::EMPTY.time_days);
            continue;
        }

        space_km.push(window.space_km);
        time_days.push(match time_cutoff {
            Some(cutoff) => window.time_days.min(cutoff),
            None => window.time_days,
        });
    }

    Ok(Windows {
        space_km,
        time_days,
    })
}
