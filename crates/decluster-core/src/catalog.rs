// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::DeclusterError;
use crate::time::decimal_years;
use chrono::{DateTime, Utc};

/// Per-event time information, in one of the two accepted conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventTimes<'a> {
    YearMonthDay {
        year: &'a [i32],
        month: &'a [u32],
        day: &'a [u32],
    },
    Timestamps(&'a [DateTime<Utc>]),
}

impl EventTimes<'_> {
    pub fn source(&self) -> TimeSource {
        match self {
            Self::YearMonthDay { .. } => TimeSource::YearMonthDay,
            Self::Timestamps(_) => TimeSource::Timestamp,
        }
    }
}

/// Which time convention a catalog resolved to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSource {
    YearMonthDay,
    Timestamp,
}

impl TimeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YearMonthDay => "year_month_day",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Raw tabular columns before schema resolution. Every time column is optional.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogColumns<'a> {
    pub magnitude: &'a [f64],
    pub longitude: &'a [f64],
    pub latitude: &'a [f64],
    pub year: Option<&'a [i32]>,
    pub month: Option<&'a [u32]>,
    pub day: Option<&'a [u32]>,
    pub time: Option<&'a [DateTime<Utc>]>,
}

/// Validated zero-copy view over an earthquake catalog.
///
/// Row order is the event identity: every output of the engine is aligned to
/// it.
#[derive(Clone, Copy, Debug)]
pub struct CatalogView<'a> {
    pub magnitude: &'a [f64],
    pub longitude: &'a [f64],
    pub latitude: &'a [f64],
    pub times: EventTimes<'a>,
    /// Set when a timestamp column was present but the calendar triple won.
    pub shadowed_time_column: bool,
}

impl<'a> CatalogView<'a> {
    /// Constructs a validated `CatalogView`.
    pub fn new(
        magnitude: &'a [f64],
        longitude: &'a [f64],
        latitude: &'a [f64],
        times: EventTimes<'a>,
    ) -> Result<Self, DeclusterError> {
        let n = magnitude.len();
        check_len("longitude", longitude.len(), n)?;
        check_len("latitude", latitude.len(), n)?;
        match times {
            EventTimes::YearMonthDay { year, month, day } => {
                check_len("year", year.len(), n)?;
                check_len("month", month.len(), n)?;
                check_len("day", day.len(), n)?;
            }
            EventTimes::Timestamps(timestamps) => check_len("time", timestamps.len(), n)?,
        }

        if let Some((idx, value)) = first_non_finite(magnitude) {
            return Err(DeclusterError::invalid_catalogue(format!(
                "magnitude must be finite: event {idx} has {value}"
            )));
        }
        if let Some((idx, value)) = first_non_finite(longitude) {
            return Err(DeclusterError::invalid_catalogue(format!(
                "longitude must be finite: event {idx} has {value}"
            )));
        }
        if let Some((idx, value)) = first_non_finite(latitude) {
            return Err(DeclusterError::invalid_catalogue(format!(
                "latitude must be finite: event {idx} has {value}"
            )));
        }
        if let Some((idx, value)) = latitude
            .iter()
            .copied()
            .enumerate()
            .find(|(_, lat)| !(-90.0..=90.0).contains(lat))
        {
            return Err(DeclusterError::invalid_catalogue(format!(
                "latitude must be within [-90, 90]: event {idx} has {value}"
            )));
        }

        Ok(Self {
            magnitude,
            longitude,
            latitude,
            times,
            shadowed_time_column: false,
        })
    }

    /// Resolves the time convention and validates the columns.
    ///
    /// A complete year/month/day triple takes precedence over `time`; an
    /// incomplete triple falls back to `time`. With neither, the catalog is
    /// rejected with [`DeclusterError::InvalidCatalogueSchema`].
    pub fn from_columns(columns: CatalogColumns<'a>) -> Result<Self, DeclusterError> {
        let times = match (columns.year, columns.month, columns.day, columns.time) {
            (Some(year), Some(month), Some(day), _) => EventTimes::YearMonthDay { year, month, day },
            (_, _, _, Some(time)) => EventTimes::Timestamps(time),
            (year, month, day, None) => {
                let missing = [
                    ("year", year.is_none()),
                    ("month", month.is_none()),
                    ("day", day.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect::<Vec<_>>();
                return Err(DeclusterError::invalid_schema(format!(
                    "catalogue must contain either year, month, day columns or a time column; missing {} and time",
                    missing.join(", ")
                )));
            }
        };

        let mut view = Self::new(columns.magnitude, columns.longitude, columns.latitude, times)?;
        view.shadowed_time_column =
            matches!(times, EventTimes::YearMonthDay { .. }) && columns.time.is_some();
        Ok(view)
    }

    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn time_source(&self) -> TimeSource {
        self.times.source()
    }

    /// Decimal-year time coordinate for every event, in row order.
    pub fn decimal_years(&self) -> Result<Vec<f64>, DeclusterError> {
        decimal_years(&self.times)
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> Result<(), DeclusterError> {
    if got != expected {
        return Err(DeclusterError::invalid_catalogue(format!(
            "{name} length mismatch: got {got}, expected {expected} (magnitude length)"
        )));
    }
    Ok(())
}

fn first_non_finite(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{CatalogColumns, CatalogView, EventTimes, TimeSource};
    use crate::DeclusterError;
    use chrono::{TimeZone, Utc};

    const MAG: [f64; 3] = [4.0, 3.0, 2.5];
    const LON: [f64; 3] = [8.5, 8.6, 8.7];
    const LAT: [f64; 3] = [46.5, 46.4, 46.3];
    const YEAR: [i32; 3] = [2001, 2001, 2001];
    const MONTH: [u32; 3] = [3, 3, 4];
    const DAY: [u32; 3] = [10, 12, 1];

    fn base_columns() -> CatalogColumns<'static> {
        CatalogColumns {
            magnitude: &MAG,
            longitude: &LON,
            latitude: &LAT,
            ..CatalogColumns::default()
        }
    }

    #[test]
    fn resolves_year_month_day_triple() {
        let view = CatalogView::from_columns(CatalogColumns {
            year: Some(&YEAR),
            month: Some(&MONTH),
            day: Some(&DAY),
            ..base_columns()
        })
        .expect("triple should resolve");

        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
        assert_eq!(view.time_source(), TimeSource::YearMonthDay);
        assert!(!view.shadowed_time_column);
    }

    #[test]
    fn resolves_time_column() {
        let times = [
            Utc.with_ymd_and_hms(2001, 3, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2001, 3, 12, 6, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2001, 4, 1, 12, 0, 0).unwrap(),
        ];
        let view = CatalogView::from_columns(CatalogColumns {
            time: Some(&times),
            ..base_columns()
        })
        .expect("time column should resolve");
        assert_eq!(view.time_source(), TimeSource::Timestamp);
        assert_eq!(view.decimal_years().expect("valid times").len(), 3);
    }

    #[test]
    fn full_triple_wins_over_time_column() {
        let times = [Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(); 3];
        let view = CatalogView::from_columns(CatalogColumns {
            year: Some(&YEAR),
            month: Some(&MONTH),
            day: Some(&DAY),
            time: Some(&times),
            ..base_columns()
        })
        .expect("both conventions should resolve");
        assert_eq!(view.time_source(), TimeSource::YearMonthDay);
        assert!(view.shadowed_time_column);
    }

    #[test]
    fn partial_triple_falls_back_to_time_column() {
        let times = [Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(); 3];
        let view = CatalogView::from_columns(CatalogColumns {
            year: Some(&YEAR),
            time: Some(&times),
            ..base_columns()
        })
        .expect("time column should be used");
        assert_eq!(view.time_source(), TimeSource::Timestamp);
    }

    #[test]
    fn missing_time_fields_is_schema_error() {
        let err = CatalogView::from_columns(CatalogColumns {
            year: Some(&YEAR),
            month: Some(&MONTH),
            ..base_columns()
        })
        .expect_err("incomplete triple without time must fail");
        assert!(matches!(err, DeclusterError::InvalidCatalogueSchema(_)));
        assert!(err.to_string().contains("missing day and time"));

        let err = CatalogView::from_columns(base_columns()).expect_err("no time must fail");
        assert!(matches!(err, DeclusterError::InvalidCatalogueSchema(_)));
        assert!(err.to_string().contains("missing year, month, day and time"));
    }

    #[test]
    fn rejects_column_length_mismatch() {
        let short_day = [1_u32, 2];
        let err = CatalogView::from_columns(CatalogColumns {
            year: Some(&YEAR),
            month: Some(&MONTH),
            day: Some(&short_day),
            ..base_columns()
        })
        .expect_err("short day column must fail");
        assert!(err.to_string().contains("day length mismatch"));

        let short_lat = [46.5, 46.4];
        let err = CatalogView::new(
            &MAG,
            &LON,
            &short_lat,
            EventTimes::YearMonthDay {
                year: &YEAR,
                month: &MONTH,
                day: &DAY,
            },
        )
        .expect_err("short latitude must fail");
        assert!(err.to_string().contains("latitude length mismatch"));
    }

    #[test]
    fn rejects_non_finite_values_and_bad_latitude() {
        let times = EventTimes::YearMonthDay {
            year: &YEAR,
            month: &MONTH,
            day: &DAY,
        };

        let nan_mag = [4.0, f64::NAN, 2.5];
        let err = CatalogView::new(&nan_mag, &LON, &LAT, times).expect_err("NaN must fail");
        assert!(err.to_string().contains("magnitude must be finite: event 1"));

        let inf_lon = [8.5, 8.6, f64::INFINITY];
        let err = CatalogView::new(&MAG, &inf_lon, &LAT, times).expect_err("inf must fail");
        assert!(err.to_string().contains("longitude must be finite: event 2"));

        let polar = [46.5, 91.0, 46.3];
        let err = CatalogView::new(&MAG, &LON, &polar, times).expect_err("lat > 90 must fail");
        assert!(err.to_string().contains("within [-90, 90]"));
    }

    #[test]
    fn empty_catalog_is_valid() {
        let view = CatalogView::new(
            &[],
            &[],
            &[],
            EventTimes::YearMonthDay {
                year: &[],
                month: &[],
                day: &[],
            },
        )
        .expect("empty catalog is valid");
        assert!(view.is_empty());
        assert!(view.decimal_years().expect("no events").is_empty());
    }
}
