// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use chrono::{DateTime, Utc};
use decluster_core::{CatalogColumns, CatalogView, Declusterer, ExecutionContext};
use decluster_engine::{GardnerKnopoffConfig, GardnerKnopoffType1};
use decluster_windows::{WindowMethod, compute_windows};
use libfuzzer_sys::fuzz_target;

fn build_method(seed: u8) -> WindowMethod {
    WindowMethod::ALL[usize::from(seed) % WindowMethod::ALL.len()]
}

fn build_fs_time_prop(mode_seed: u8, value_seed: u8) -> f64 {
    match mode_seed % 6 {
        0 => 0.0,
        1 => 1.0,
        2 => f64::from(value_seed) / 255.0,
        3 => 1.0 + f64::from(value_seed) / 16.0,
        4 => -f64::from(value_seed),
        _ => f64::NAN,
    }
}

fn build_time_cutoff(mode_seed: u8, value_seed: i16) -> Option<f64> {
    match mode_seed % 6 {
        0 => None,
        1 => Some(0.0),
        2 => Some(f64::from(value_seed).abs()),
        3 => Some(f64::from(value_seed)),
        4 => Some(f64::INFINITY),
        _ => Some(f64::NAN),
    }
}

fn build_magnitude(base: f64, mode_seed: u8, raw_seed: i16) -> f64 {
    match mode_seed % 6 {
        0 | 1 => f64::from(raw_seed.rem_euclid(90)) / 10.0,
        2 => base,
        3 => -f64::from(raw_seed.rem_euclid(30)) / 10.0,
        4 => f64::NAN,
        _ => f64::INFINITY,
    }
}

fn build_coordinate(base: f64, mode_seed: u8, raw_seed: i16, limit: f64) -> f64 {
    match mode_seed % 5 {
        0 | 1 | 2 => (f64::from(raw_seed) / 256.0).clamp(-limit, limit),
        3 => base,
        _ => f64::NAN,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let method = build_method(cursor.next_u8());
    let config = GardnerKnopoffConfig {
        fs_time_prop: build_fs_time_prop(cursor.next_u8(), cursor.next_u8()),
        time_cutoff: build_time_cutoff(cursor.next_u8(), cursor.next_i16()),
    };

    let payload_len = common::bounded(cursor.next_u8(), 0, 64).saturating_mul(8);
    let mut values = common::decode_f64_chunks(&cursor.take_padded(payload_len), 64);
    if values.is_empty() {
        values.push(0.0);
    }

    let n = common::bounded(cursor.next_u8(), 0, 96);
    let mut magnitude = Vec::with_capacity(n);
    let mut longitude = Vec::with_capacity(n);
    let mut latitude = Vec::with_capacity(n);
    let mut year = Vec::with_capacity(n);
    let mut month = Vec::with_capacity(n);
    let mut day = Vec::with_capacity(n);
    let mut time = Vec::<DateTime<Utc>>::with_capacity(n);

    for idx in 0..n {
        let base = values[idx % values.len()];
        magnitude.push(build_magnitude(base, cursor.next_u8(), cursor.next_i16()));
        longitude.push(build_coordinate(base, cursor.next_u8(), cursor.next_i16(), 540.0));
        latitude.push(build_coordinate(base, cursor.next_u8(), cursor.next_i16(), 95.0));
        year.push(1900 + i32::from(cursor.next_u8()));
        month.push(u32::from(cursor.next_u8() % 14));
        day.push(u32::from(cursor.next_u8() % 33));
        let seconds = i64::from(cursor.next_i16()) * 86_400;
        if let Some(stamp) = DateTime::<Utc>::from_timestamp(seconds, 0) {
            time.push(stamp);
        }
    }

    // Drop columns to exercise schema resolution.
    let layout = cursor.next_u8();
    let columns = CatalogColumns {
        magnitude: &magnitude,
        longitude: &longitude,
        latitude: &latitude,
        year: (layout & 1 == 0).then_some(year.as_slice()),
        month: (layout & 2 == 0).then_some(month.as_slice()),
        day: (layout & 4 == 0).then_some(day.as_slice()),
        time: (layout & 8 == 0).then_some(time.as_slice()),
    };

    let _ = compute_windows(&method, &magnitude, config.time_cutoff);

    let Ok(view) = CatalogView::from_columns(columns) else {
        return;
    };
    let Ok(engine) = GardnerKnopoffType1::new(method, config) else {
        return;
    };

    if let Ok(result) = engine.decluster(&view, &ExecutionContext::new()) {
        assert_eq!(result.cluster_ids.len(), view.len());
        assert_eq!(result.shock_types.len(), view.len());
    }
});
