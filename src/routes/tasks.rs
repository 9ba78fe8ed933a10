// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for the scheduled rollover.
//!
//! Called by an external cron at the daily boundary (Fajr time in the
//! ledger's reference zone), not directly by users. Guarded by a shared
//! secret rather than user JWTs.

use crate::error::AppError;
use crate::services::StatsService;
use crate::time_utils::parse_date_key;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ROLLOVER_TOKEN_HEADER: &str = "x-rollover-token";

/// Task handler routes (called by the scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/rollover", post(rollover))
}

#[derive(Deserialize)]
struct RolloverQuery {
    /// Date to roll over (`YYYY-MM-DD`); defaults to yesterday
    date: Option<String>,
}

#[derive(Serialize)]
pub struct RolloverResponse {
    pub archived: usize,
    pub streaks_extended: usize,
}

/// Archive yesterday's ledgers and reset live counters.
async fn rollover(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(params): Query<RolloverQuery>,
) -> Result<Json<RolloverResponse>, AppError> {
    // Security check: only the scheduler knows the shared secret
    let token_matches = headers
        .get(ROLLOVER_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|token| token == state.config.rollover_token)
        .unwrap_or(false);

    if !token_matches {
        tracing::warn!("Blocked unauthorized access to rollover endpoint");
        return Err(AppError::Unauthorized);
    }

    let date = params
        .date
        .as_deref()
        .map(|raw| {
            parse_date_key(raw).ok_or_else(|| {
                AppError::BadRequest("Invalid 'date' parameter: must be YYYY-MM-DD".to_string())
            })
        })
        .transpose()?;

    let summary = StatsService::new(state.db.clone(), state.config.ledger_utc_offset_minutes)
        .rollover(date, chrono::Utc::now())
        .await?;

    Ok(Json(RolloverResponse {
        archived: summary.archived,
        streaks_extended: summary.streaks_extended,
    }))
}
