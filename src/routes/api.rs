// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{DailyScoreRecord, LeaderboardEntry, Prayer, UserStatsSummary};
use crate::services::{FriendService, LeaderboardService, ScoreService, StatsService};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/prayers/{prayer}/complete", post(complete_prayer))
        .route("/api/scores/daily", get(get_daily_score))
        .route("/api/stats", get(get_stats))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/leaderboard/friends", get(get_friends_leaderboard))
        .route("/api/friends", get(get_friends))
        .route(
            "/api/friends/requests",
            get(get_pending_requests).post(send_friend_request),
        )
        .route(
            "/api/friends/requests/{request_id}/accept",
            post(accept_friend_request),
        )
        .route(
            "/api/friends/requests/{request_id}/reject",
            post(reject_friend_request),
        )
}

fn score_service(state: &AppState) -> ScoreService {
    ScoreService::new(state.db.clone(), state.config.ledger_utc_offset_minutes)
}

fn stats_service(state: &AppState) -> StatsService {
    StatsService::new(state.db.clone(), state.config.ledger_utc_offset_minutes)
}

fn leaderboard_service(state: &AppState) -> LeaderboardService {
    LeaderboardService::new(state.db.clone(), state.config.ledger_utc_offset_minutes)
}

// ─── Prayer Completion ───────────────────────────────────────

/// Points awarded for a completed prayer.
#[derive(Serialize)]
pub struct CompletePrayerResponse {
    pub prayer: String,
    pub base: u32,
    pub speed_bonus: u32,
    pub total: u32,
    pub daily_total: u32,
}

/// Record a prayer completion for the current user.
async fn complete_prayer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(prayer): Path<String>,
) -> Result<Json<CompletePrayerResponse>> {
    let prayer = Prayer::parse(&prayer)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown prayer: {}", prayer)))?;

    let outcome = score_service(&state)
        .complete_prayer(&user.user_id, prayer, chrono::Utc::now())
        .await?;

    Ok(Json(CompletePrayerResponse {
        prayer: prayer.as_str().to_string(),
        base: outcome.awarded.base,
        speed_bonus: outcome.awarded.speed_bonus,
        total: outcome.awarded.total,
        daily_total: outcome.daily_total,
    }))
}

// ─── Daily Score ─────────────────────────────────────────────

#[derive(Deserialize)]
struct DailyScoreQuery {
    /// Ledger date key (`YYYY-MM-DD`); defaults to today
    date: Option<String>,
}

/// Get the current user's daily score (today or a given date).
async fn get_daily_score(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DailyScoreQuery>,
) -> Result<Json<DailyScoreRecord>> {
    let record = score_service(&state)
        .daily_score(&user.user_id, params.date.as_deref(), chrono::Utc::now())
        .await?;

    Ok(Json(record))
}

// ─── User Stats ──────────────────────────────────────────────

/// Get derived statistics for the current user.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserStatsSummary>> {
    let stats = stats_service(&state)
        .user_stats(&user.user_id, chrono::Utc::now())
        .await?;

    Ok(Json(stats))
}

// ─── Leaderboards ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    #[validate(range(min = 1, max = 100))]
    limit: u32,
}

fn default_leaderboard_limit() -> u32 {
    50
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

/// Get today's global leaderboard.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let entries = leaderboard_service(&state)
        .global_leaderboard(params.limit, chrono::Utc::now())
        .await?;

    Ok(Json(LeaderboardResponse { entries }))
}

/// Get today's leaderboard for the current user and their friends.
async fn get_friends_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LeaderboardResponse>> {
    let entries = leaderboard_service(&state)
        .friends_leaderboard(&user.user_id, chrono::Utc::now())
        .await?;

    Ok(Json(LeaderboardResponse { entries }))
}

// ─── Friends ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct SendRequestBody {
    /// Recipient user ID
    #[validate(length(min = 1, max = 128))]
    to: String,
}

#[derive(Serialize)]
pub struct FriendRequestResponse {
    pub request_id: String,
    pub from: String,
    pub to: String,
    pub status: String,
}

/// Send a friend request.
async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SendRequestBody>,
) -> Result<Json<FriendRequestResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = FriendService::new(state.db.clone())
        .send_request(&user.user_id, &body.to, chrono::Utc::now())
        .await?;

    Ok(Json(FriendRequestResponse {
        request_id: request.request_id,
        from: request.from,
        to: request.to,
        status: "pending".to_string(),
    }))
}

#[derive(Serialize)]
pub struct AcceptResponse {
    pub success: bool,
    pub friend_id: String,
}

/// Accept a pending friend request addressed to the current user.
async fn accept_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(request_id): Path<String>,
) -> Result<Json<AcceptResponse>> {
    let edge = FriendService::new(state.db.clone())
        .accept_request(&request_id, &user.user_id, chrono::Utc::now())
        .await?;

    let friend_id = edge.other(&user.user_id).unwrap_or_default().to_string();

    Ok(Json(AcceptResponse {
        success: true,
        friend_id,
    }))
}

#[derive(Serialize)]
pub struct RejectResponse {
    pub success: bool,
}

/// Reject a pending friend request addressed to the current user.
async fn reject_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(request_id): Path<String>,
) -> Result<Json<RejectResponse>> {
    FriendService::new(state.db.clone())
        .reject_request(&request_id, &user.user_id, chrono::Utc::now())
        .await?;

    Ok(Json(RejectResponse { success: true }))
}

#[derive(Serialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<FriendRequestResponse>,
}

/// List pending friend requests addressed to the current user.
async fn get_pending_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PendingRequestsResponse>> {
    let requests = FriendService::new(state.db.clone())
        .pending_requests(&user.user_id)
        .await?;

    Ok(Json(PendingRequestsResponse {
        requests: requests
            .into_iter()
            .map(|r| FriendRequestResponse {
                request_id: r.request_id,
                from: r.from,
                to: r.to,
                status: "pending".to_string(),
            })
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<String>,
}

/// List the current user's friends.
async fn get_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FriendsResponse>> {
    let friends = FriendService::new(state.db.clone())
        .friends(&user.user_id)
        .await?;

    Ok(Json(FriendsResponse { friends }))
}
