// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use decluster_core::{
    CatalogColumns, CatalogView, DeclusterError, DeclusterResult, Declusterer, ExecutionContext,
};
use decluster_engine::DeclusterSpec;
use std::str::FromStr;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Owned catalog columns, as read from a file.
///
/// Time columns that were absent from the input stay `None`; the precedence
/// between the calendar triple and `time` is resolved by [`Self::as_view`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedCatalog {
    pub magnitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub year: Option<Vec<i32>>,
    pub month: Option<Vec<u32>>,
    pub day: Option<Vec<u32>>,
    pub time: Option<Vec<DateTime<Utc>>>,
}

impl LoadedCatalog {
    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Borrows the columns as a validated [`CatalogView`].
    pub fn as_view(&self) -> Result<CatalogView<'_>, DeclusterError> {
        CatalogView::from_columns(CatalogColumns {
            magnitude: &self.magnitude,
            longitude: &self.longitude,
            latitude: &self.latitude,
            year: self.year.as_deref(),
            month: self.month.as_deref(),
            day: self.day.as_deref(),
            time: self.time.as_deref(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Magnitude,
    Longitude,
    Latitude,
    Year,
    Month,
    Day,
    Time,
}

impl Column {
    fn from_header(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "magnitude" => Some(Self::Magnitude),
            "longitude" => Some(Self::Longitude),
            "latitude" => Some(Self::Latitude),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Magnitude => "magnitude",
            Self::Longitude => "longitude",
            Self::Latitude => "latitude",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Time => "time",
        }
    }
}

fn unquote(cell: &str) -> &str {
    let cell = cell.trim();
    cell.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(cell)
}

fn parse_cell<T: FromStr>(cell: &str, column: Column, row: usize) -> Result<T, DeclusterError> {
    cell.parse::<T>().map_err(|_| {
        DeclusterError::invalid_catalogue(format!(
            "CSV row {row}: column '{}' has invalid value '{cell}'",
            column.name()
        ))
    })
}

/// Parses an event time: RFC 3339, or a naive `YYYY-MM-DD[ HH:MM[:SS]]`
/// taken as UTC.
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Parses a comma-separated catalog with a mandatory header row.
///
/// Header names are matched case-insensitively and unknown columns are
/// skipped. `magnitude`, `longitude` and `latitude` are required; time columns
/// are optional here and checked when the catalog is viewed.
pub fn parse_catalog_csv(raw: &str) -> Result<LoadedCatalog, DeclusterError> {
    let mut rows = raw
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, header)) = rows.next() else {
        return Err(DeclusterError::invalid_schema(
            "CSV input is empty; expected a header row",
        ));
    };

    let mut layout = Vec::<Option<Column>>::new();
    for name in header.split(',').map(unquote) {
        let column = Column::from_header(name);
        if let Some(column) = column
            && layout.contains(&Some(column))
        {
            return Err(DeclusterError::invalid_schema(format!(
                "duplicate column '{}' in CSV header",
                column.name()
            )));
        }
        layout.push(column);
    }

    let missing = [Column::Magnitude, Column::Longitude, Column::Latitude]
        .into_iter()
        .filter(|column| !layout.contains(&Some(*column)))
        .map(Column::name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(DeclusterError::invalid_schema(format!(
            "CSV header is missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let has = |column: Column| layout.contains(&Some(column));
    let mut catalog = LoadedCatalog {
        year: has(Column::Year).then(Vec::new),
        month: has(Column::Month).then(Vec::new),
        day: has(Column::Day).then(Vec::new),
        time: has(Column::Time).then(Vec::new),
        ..LoadedCatalog::default()
    };

    for (row, line) in rows {
        let cells = line.split(',').map(unquote).collect::<Vec<_>>();
        if cells.len() != layout.len() {
            return Err(DeclusterError::invalid_catalogue(format!(
                "CSV row {row} has {} cells, expected {} from the header",
                cells.len(),
                layout.len()
            )));
        }

        for (&column, &cell) in layout.iter().zip(&cells) {
            let Some(column) = column else {
                continue;
            };
            match column {
                Column::Magnitude => catalog.magnitude.push(parse_cell(cell, column, row)?),
                Column::Longitude => catalog.longitude.push(parse_cell(cell, column, row)?),
                Column::Latitude => catalog.latitude.push(parse_cell(cell, column, row)?),
                Column::Year => {
                    let value = parse_cell(cell, column, row)?;
                    catalog.year.get_or_insert_with(Vec::new).push(value);
                }
                Column::Month => {
                    let value = parse_cell(cell, column, row)?;
                    catalog.month.get_or_insert_with(Vec::new).push(value);
                }
                Column::Day => {
                    let value = parse_cell(cell, column, row)?;
                    catalog.day.get_or_insert_with(Vec::new).push(value);
                }
                Column::Time => {
                    let value = parse_event_time(cell).ok_or_else(|| {
                        DeclusterError::invalid_catalogue(format!(
                            "CSV row {row}: column 'time' has invalid value '{cell}'; expected RFC 3339 or YYYY-MM-DD[ HH:MM:SS]"
                        ))
                    })?;
                    catalog.time.get_or_insert_with(Vec::new).push(value);
                }
            }
        }
    }

    Ok(catalog)
}

/// Builds the engine described by `spec` and runs it over `catalog`.
pub fn run_decluster(
    catalog: &CatalogView<'_>,
    spec: &DeclusterSpec,
    ctx: &ExecutionContext<'_>,
) -> Result<DeclusterResult, DeclusterError> {
    spec.build()?.decluster(catalog, ctx)
}

/// Parses a JSON run spec and runs it over `catalog`.
pub fn run_decluster_json(
    catalog: &CatalogView<'_>,
    spec_json: &str,
    ctx: &ExecutionContext<'_>,
) -> Result<DeclusterResult, DeclusterError> {
    let spec: DeclusterSpec = serde_json::from_str(spec_json)
        .map_err(|err| DeclusterError::invalid_configuration(format!("invalid spec JSON: {err}")))?;
    run_decluster(catalog, &spec, ctx)
}

/// CLI namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = (
        decluster_core::crate_name(),
        decluster_engine::crate_name(),
    );
    "decluster-cli"
}
