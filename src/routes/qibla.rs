// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Qibla direction route.
//!
//! Pure computation over the caller's coordinates; no user data is read,
//! so the route is public.

use crate::error::{AppError, Result};
use crate::services::qibla;
use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/qibla", get(get_qibla))
}

#[derive(Deserialize, Validate)]
struct QiblaQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    lon: f64,
}

#[derive(Serialize)]
pub struct QiblaResponse {
    /// Initial great-circle bearing toward the Kaaba, degrees in [0, 360)
    pub bearing: f64,
    /// Nearest 8-point compass label for the bearing
    pub cardinal: String,
    pub distance_km: f64,
    pub distance_display: String,
}

/// Compute the qibla direction and distance for a coordinate.
async fn get_qibla(Query(params): Query<QiblaQuery>) -> Result<Json<QiblaResponse>> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let bearing = qibla::qibla_bearing(params.lat, params.lon);
    let distance_km = qibla::distance_to_kaaba(params.lat, params.lon);

    Ok(Json(QiblaResponse {
        bearing,
        cardinal: qibla::cardinal_direction(bearing).to_string(),
        distance_km,
        distance_display: qibla::format_distance(distance_km),
    }))
}
