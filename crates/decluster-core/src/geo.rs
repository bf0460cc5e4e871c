// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::DeclusterError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.227;

/// Great-circle distance in km between a point and a reference point, both in
/// degrees, using the haversine formula.
pub fn haversine_km(lon: f64, lat: f64, ref_lon: f64, ref_lat: f64) -> f64 {
    let lat = lat.to_radians();
    let ref_lat = ref_lat.to_radians();
    let dlat = lat - ref_lat;
    let dlon = lon.to_radians() - ref_lon.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat.cos() * ref_lat.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distances from every candidate to one reference point, in candidate order.
pub fn haversine_many_km(
    lons: &[f64],
    lats: &[f64],
    ref_lon: f64,
    ref_lat: f64,
) -> Result<Vec<f64>, DeclusterError> {
    if lons.len() != lats.len() {
        return Err(DeclusterError::invalid_catalogue(format!(
            "longitude/latitude length mismatch: {} vs {}",
            lons.len(),
            lats.len()
        )));
    }

    Ok(lons
        .iter()
        .zip(lats)
        .map(|(&lon, &lat)| haversine_km(lon, lat, ref_lon, ref_lat))
        .collect())
}
