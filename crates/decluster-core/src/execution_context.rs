// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::observability::{ProgressSink, TelemetrySink};

const DEFAULT_PROGRESS_EVERY: usize = 1000;

/// Per-call settings threaded through every `decluster` invocation.
///
/// Holds what would otherwise be process-wide options (the warnings switch)
/// together with optional observability hooks.
pub struct ExecutionContext<'a> {
    pub warnings: bool,
    pub progress_every: usize,
    pub progress: Option<&'a dyn ProgressSink>,
    pub telemetry: Option<&'a dyn TelemetrySink>,
}

impl Default for ExecutionContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with warnings enabled and no hooks.
    pub fn new() -> Self {
        Self {
            warnings: true,
            progress_every: DEFAULT_PROGRESS_EVERY,
            progress: None,
            telemetry: None,
        }
    }

    /// Enables or disables emission of warnings through `tracing`.
    pub fn with_warnings(mut self, warnings: bool) -> Self {
        self.warnings = warnings;
        self
    }

    /// Sets how many seed iterations pass between progress reports.
    ///
    /// Zero is treated as one.
    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    pub fn with_progress_sink(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Emits a warning event when warnings are enabled.
    ///
    /// Callers still record the message in their diagnostics either way.
    pub fn warn(&self, message: &str) {
        if self.warnings {
            tracing::warn!(target: "decluster", "{message}");
        }
    }

    /// Returns true when iteration `iteration` falls on the progress cadence.
    pub fn is_progress_step(&self, iteration: usize) -> bool {
        iteration.is_multiple_of(self.progress_every.max(1))
    }

    /// Emits clamped progress to the sink, if configured.
    pub fn report_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }

        if let Some(sink) = self.progress {
            sink.on_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Emits a scalar telemetry value to the sink, if configured.
    pub fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }
}
