// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::DeclusterError;
use crate::catalog::EventTimes;
use chrono::{DateTime, Datelike, Utc};

/// Fixed year length used for decimal years. Leap days are not modelled.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Days elapsed before the first of each month in a non-leap year.
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Converts a calendar date into a fractional year.
///
/// `day_count = days_before_month + day - 1`, so 1 January maps to exactly
/// `year`. The result is only meant to be subtracted from other decimal years.
pub fn decimal_year(year: i32, month: u32, day: u32) -> Result<f64, DeclusterError> {
    if !(1..=12).contains(&month) {
        return Err(DeclusterError::invalid_catalogue(format!(
            "month must be in 1..=12; got {month}"
        )));
    }
    if !(1..=31).contains(&day) {
        return Err(DeclusterError::invalid_catalogue(format!(
            "day must be in 1..=31; got {day}"
        )));
    }

    let day_count = DAYS_BEFORE_MONTH[(month - 1) as usize] + day - 1;
    Ok(f64::from(year) + f64::from(day_count) / DAYS_PER_YEAR)
}

/// Decimal year of a timestamp at day granularity: `year + ordinal / 365`.
///
/// The ordinal is 1-based and counts leap days; time of day is ignored.
pub fn decimal_year_from_timestamp(timestamp: &DateTime<Utc>) -> f64 {
    f64::from(timestamp.year()) + f64::from(timestamp.ordinal()) / DAYS_PER_YEAR
}

/// Computes one decimal year per event.
pub fn decimal_years(times: &EventTimes<'_>) -> Result<Vec<f64>, DeclusterError> {
    match *times {
        EventTimes::YearMonthDay { year, month, day } => year
            .iter()
            .zip(month)
            .zip(day)
            .enumerate()
            .map(|(idx, ((&y, &m), &d))| {
                decimal_year(y, m, d).map_err(|err| match err {
                    DeclusterError::InvalidCatalogue(msg) => {
                        DeclusterError::invalid_catalogue(format!("event {idx}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect(),
        EventTimes::Timestamps(timestamps) => {
            Ok(timestamps.iter().map(decimal_year_from_timestamp).collect())
        }
    }
}

/// Converts a duration in days into decimal-year units.
pub fn days_to_years(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}
