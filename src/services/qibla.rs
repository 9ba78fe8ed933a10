// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Qibla direction and distance calculations.
//!
//! Great-circle math toward the Kaaba. All functions are pure and total
//! over valid latitude/longitude ranges; out-of-range input is rejected at
//! the HTTP boundary, not here.

/// Kaaba coordinates in Mecca, Saudi Arabia.
pub const KAABA_LATITUDE: f64 = 21.4225;
pub const KAABA_LONGITUDE: f64 = 39.8262;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

const CARDINAL_DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Initial great-circle bearing from a location to the Kaaba.
///
/// Returns degrees in `[0, 360)`, where 0 is North and 90 is East.
pub fn qibla_bearing(latitude: f64, longitude: f64) -> f64 {
    let lat1 = latitude.to_radians();
    let lon1 = longitude.to_radians();
    let lat2 = KAABA_LATITUDE.to_radians();
    let lon2 = KAABA_LONGITUDE.to_radians();

    let d_lon = lon2 - lon1;

    // θ = atan2(sin Δλ · cos φ2, cos φ1 · sin φ2 − sin φ1 · cos φ2 · cos Δλ)
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Haversine great-circle distance from a location to the Kaaba, in km.
pub fn distance_to_kaaba(latitude: f64, longitude: f64) -> f64 {
    let lat1 = latitude.to_radians();
    let lon1 = longitude.to_radians();
    let lat2 = KAABA_LATITUDE.to_radians();
    let lon2 = KAABA_LONGITUDE.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Nearest of the 8 compass points for a bearing in degrees.
pub fn cardinal_direction(bearing: f64) -> &'static str {
    let index = ((bearing / 45.0).round() as usize) % 8;
    CARDINAL_DIRECTIONS[index]
}

/// Format a distance for display: meters below 1 km, one decimal below
/// 10 km, whole kilometers otherwise.
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round() as i64)
    } else if distance_km < 10.0 {
        format!("{:.1} km", distance_km)
    } else {
        format!("{} km", distance_km.round() as i64)
    }
}
