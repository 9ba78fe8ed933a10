// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (scoring mirror fields)
//! - Daily score ledgers (one per user per day)
//! - Historical score archives (immutable after rollover)
//! - Friend requests and friendships
//!
//! All multi-document mutations (prayer completion, rollover, request
//! acceptance) go through Firestore transactions so a crash never leaves a
//! partially-updated profile or ledger.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    DailyScoreRecord, FriendRequest, Friendship, HistoricalScoreRecord, Prayer, PrayerPoints,
    RequestStatus, UserProfile,
};
use crate::time_utils::format_utc_rfc3339;
use futures_util::{stream, FutureExt, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Result of an atomic prayer completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOutcome {
    pub awarded: PrayerPoints,
    pub daily_total: u32,
}

/// Result of a rollover run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolloverSummary {
    /// Ledgers archived in this run
    pub archived: usize,
    /// Users whose streak was incremented (yesterday had points)
    pub streaks_extended: usize,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Map a Firestore error, surfacing store-level authorization failures as
/// their own variant so read paths can degrade gracefully.
fn map_db_err<E: std::fmt::Display>(e: E) -> AppError {
    let msg = e.to_string();
    if msg.contains("PermissionDenied") || msg.contains("permission denied") {
        AppError::PermissionDenied
    } else {
        AppError::Database(msg)
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Profile Operations ─────────────────────────────────

    /// Get a user profile by ID.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(map_db_err)
    }

    /// Create or update a user profile.
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    // ─── Daily Score Operations ──────────────────────────────────

    /// Get a user's daily score ledger for a date key, if it exists.
    pub async fn get_daily_score(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<DailyScoreRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_SCORES)
            .obj()
            .one(&DailyScoreRecord::doc_id(user_id, date))
            .await
            .map_err(map_db_err)
    }

    /// Get all daily score ledgers for a date, best score first.
    ///
    /// Tries the composite-index query (date filter + descending order)
    /// first; if the index is not ready, falls back to an unordered filter
    /// query and lets the caller sort in memory.
    pub async fn get_daily_scores_for_date(
        &self,
        date: &str,
        limit: u32,
    ) -> Result<Vec<DailyScoreRecord>, AppError> {
        let client = self.get_client()?;

        let date_owned = date.to_string();
        let ordered = client
            .fluent()
            .select()
            .from(collections::DAILY_SCORES)
            .filter(move |q| q.for_all([q.field("date").eq(date_owned.clone())]))
            .order_by([(
                "total_points",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await;

        match ordered {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    date,
                    error = %e,
                    "Ordered leaderboard query failed, falling back to unordered"
                );
                let date_owned = date.to_string();
                client
                    .fluent()
                    .select()
                    .from(collections::DAILY_SCORES)
                    .filter(move |q| q.for_all([q.field("date").eq(date_owned.clone())]))
                    .limit(limit)
                    .obj()
                    .query()
                    .await
                    .map_err(map_db_err)
            }
        }
    }

    /// Fetch daily ledgers for several users on one date, preserving the
    /// input order (callers rely on it for stable tie-breaking).
    pub async fn get_daily_scores_for_users(
        &self,
        user_ids: &[String],
        date: &str,
    ) -> Result<Vec<Option<DailyScoreRecord>>, AppError> {
        stream::iter(user_ids.to_vec())
            .map(|user_id| {
                let date = date.to_string();
                async move { self.get_daily_score(&user_id, &date).await }
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<DailyScoreRecord>, AppError>>>()
            .await
            .into_iter()
            .collect()
    }

    /// Fetch profiles for several users, preserving the input order.
    pub async fn get_profiles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<Option<UserProfile>>, AppError> {
        stream::iter(user_ids.to_vec())
            .map(|user_id| async move { self.get_profile(&user_id).await })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<UserProfile>, AppError>>>()
            .await
            .into_iter()
            .collect()
    }

    // ─── Atomic Prayer Completion ────────────────────────────────

    /// Atomically record a prayer completion: update the daily ledger and
    /// mirror the new total (and a possibly raised best score) onto the
    /// profile.
    ///
    /// Runs inside `run_transaction`: the ledger and profile reads go
    /// through the transaction-bound client, so they are part of the
    /// commit's read-set and two concurrent completions for the same
    /// (user, date) cannot both commit against the same snapshot. A commit
    /// that loses the conflict check is retried with fresh data, which is
    /// how the at-most-once check holds under concurrency.
    ///
    /// Fails with `AlreadyCompleted` if the prayer is already in today's
    /// ledger; nothing is written in that case.
    pub async fn complete_prayer_atomic(
        &self,
        user_id: &str,
        prayer: Prayer,
        points: PrayerPoints,
        date: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<CompletionOutcome, AppError> {
        let now_str = format_utc_rfc3339(now);
        let doc_id = DailyScoreRecord::doc_id(user_id, date);
        let user_id_owned = user_id.to_string();
        let date_owned = date.to_string();

        // The closure may run more than once (conflict retry), so every
        // attempt re-reads and re-applies from scratch.
        let daily_total: Option<u32> = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id_owned.clone();
                let date = date_owned.clone();
                let doc_id = doc_id.clone();
                let now_str = now_str.clone();

                async move {
                    // 1. Read the current ledger through the transaction
                    let current: Option<DailyScoreRecord> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::DAILY_SCORES)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    let mut record =
                        current.unwrap_or_else(|| DailyScoreRecord::empty(&user_id, &date));

                    // 2. At-most-once check: each prayer scores once per day
                    if !record.apply_completion(prayer, points, &now_str) {
                        return Ok(None);
                    }

                    // 3. Mirror the new total onto the profile, also read
                    //    through the transaction
                    let profile: Option<UserProfile> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let mut profile =
                        profile.unwrap_or_else(|| UserProfile::new(&user_id, &now_str));
                    profile.record_daily_total(
                        record.total_points,
                        &date,
                        prayer.as_str(),
                        &now_str,
                    );

                    // 4. Stage both writes
                    db.fluent()
                        .update()
                        .in_col(collections::DAILY_SCORES)
                        .document_id(&doc_id)
                        .object(&record)
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user_id)
                        .object(&profile)
                        .add_to_transaction(transaction)?;

                    Ok(Some(record.total_points))
                }
                .boxed()
            })
            .await
            .map_err(map_db_err)?;

        let Some(daily_total) = daily_total else {
            tracing::debug!(user_id, prayer = %prayer, date, "Prayer already completed (no award)");
            return Err(AppError::AlreadyCompleted(prayer.as_str().to_string()));
        };

        tracing::info!(
            user_id,
            prayer = %prayer,
            awarded = points.total,
            daily_total,
            "Prayer completion recorded"
        );

        Ok(CompletionOutcome {
            awarded: points,
            daily_total,
        })
    }

    // ─── Rollover Operations ─────────────────────────────────────

    /// Archive and reset all daily ledgers for a date.
    ///
    /// Each user's three mutations (archive upsert, profile reset, ledger
    /// delete) commit as one `run_transaction`, with the ledger and profile
    /// re-read through the transaction. A prayer completion racing the
    /// rollover therefore conflicts instead of being clobbered by a stale
    /// profile, and the loser retries against fresh data. Re-running the
    /// rollover is a no-op for already-processed users: the in-transaction
    /// re-read finds no live ledger and skips them.
    pub async fn rollover_day(
        &self,
        date: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RolloverSummary, AppError> {
        let now_str = format_utc_rfc3339(now);

        let date_owned = date.to_string();
        let ledgers: Vec<DailyScoreRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_SCORES)
            .filter(move |q| q.for_all([q.field("date").eq(date_owned.clone())]))
            .obj()
            .query()
            .await
            .map_err(map_db_err)?;

        let mut summary = RolloverSummary::default();

        for candidate in &ledgers {
            let user_id = candidate.user_id.clone();
            let ledger_id = DailyScoreRecord::doc_id(&candidate.user_id, &candidate.date);
            let archive_id = HistoricalScoreRecord::doc_id(&candidate.user_id, &candidate.date);

            // `Some(had_points)` if this run archived the ledger, `None` if
            // another run got there first.
            let archived: Option<bool> = self
                .get_client()?
                .run_transaction(|db, transaction| {
                    let user_id = user_id.clone();
                    let ledger_id = ledger_id.clone();
                    let archive_id = archive_id.clone();
                    let now_str = now_str.clone();

                    async move {
                        // Re-read the ledger through the transaction; the
                        // query result above may be stale
                        let current: Option<DailyScoreRecord> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::DAILY_SCORES)
                            .obj()
                            .one(&ledger_id)
                            .await?;

                        let Some(current) = current else {
                            return Ok(None);
                        };

                        let had_points = current.total_points > 0;
                        let archive = HistoricalScoreRecord::from_daily(&current, &now_str);

                        let profile: Option<UserProfile> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::USERS)
                            .obj()
                            .one(&user_id)
                            .await?;
                        let mut profile =
                            profile.unwrap_or_else(|| UserProfile::new(&user_id, &now_str));
                        profile.reset_for_new_day(had_points, &now_str);

                        db.fluent()
                            .update()
                            .in_col(collections::HISTORICAL_SCORES)
                            .document_id(&archive_id)
                            .object(&archive)
                            .add_to_transaction(transaction)?;

                        db.fluent()
                            .update()
                            .in_col(collections::USERS)
                            .document_id(&user_id)
                            .object(&profile)
                            .add_to_transaction(transaction)?;

                        db.fluent()
                            .delete()
                            .from(collections::DAILY_SCORES)
                            .document_id(&ledger_id)
                            .add_to_transaction(transaction)?;

                        Ok(Some(had_points))
                    }
                    .boxed()
                })
                .await
                .map_err(map_db_err)?;

            if let Some(had_points) = archived {
                summary.archived += 1;
                if had_points {
                    summary.streaks_extended += 1;
                }
            }
        }

        tracing::info!(
            date,
            archived = summary.archived,
            streaks_extended = summary.streaks_extended,
            "Daily rollover complete"
        );

        Ok(summary)
    }

    // ─── Historical Score Operations ─────────────────────────────

    /// Get a user's archived daily scores, most recent first.
    ///
    /// Index-not-ready errors degrade to an empty history rather than
    /// failing the read path; the streak simply ends where data is absent.
    pub async fn get_historical_scores(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalScoreRecord>, AppError> {
        let user_owned = user_id.to_string();
        let result = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::HISTORICAL_SCORES)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_owned.clone())]))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await;

        match result {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Historical score query failed, treating history as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    // ─── Friend Operations ───────────────────────────────────────

    /// Get a friend request by its (pair-derived) ID.
    pub async fn get_friend_request(
        &self,
        request_id: &str,
    ) -> Result<Option<FriendRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FRIEND_REQUESTS)
            .obj()
            .one(request_id)
            .await
            .map_err(map_db_err)
    }

    /// Create or overwrite a friend request document.
    pub async fn upsert_friend_request(&self, request: &FriendRequest) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIEND_REQUESTS)
            .document_id(&request.request_id)
            .object(request)
            .execute()
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Get the friendship edge between two users, if any.
    pub async fn get_friendship(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FRIENDSHIPS)
            .obj()
            .one(&crate::models::friend::pair_id(a, b))
            .await
            .map_err(map_db_err)
    }

    /// Atomically mark a request accepted and create the friendship edge.
    ///
    /// An accepted request without an edge (or vice versa) is an
    /// inconsistent state, so both writes go through one transaction.
    pub async fn accept_friend_request_atomic(
        &self,
        request: &FriendRequest,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Friendship, AppError> {
        let now_str = format_utc_rfc3339(now);

        let mut accepted = request.clone();
        accepted.status = RequestStatus::Accepted;
        accepted.updated_at = Some(now_str.clone());

        let edge = Friendship::new(&request.from, &request.to, &now_str);

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIEND_REQUESTS)
            .document_id(&accepted.request_id)
            .object(&accepted)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add request to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIENDSHIPS)
            .document_id(edge.doc_id())
            .object(&edge)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add friendship to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Accept-request commit failed: {}", e)))?;

        tracing::info!(
            from = %request.from,
            to = %request.to,
            "Friend request accepted"
        );

        Ok(edge)
    }

    /// Get pending requests addressed to a user.
    pub async fn get_pending_requests_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequest>, AppError> {
        let user_owned = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("to").eq(user_owned.clone()),
                    q.field("status").eq("pending"),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(map_db_err)
    }

    /// Get all friend IDs for a user (union of edges in either direction).
    pub async fn get_friend_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let client = self.get_client()?;

        let user_owned = user_id.to_string();
        let as_first: Vec<Friendship> = client
            .fluent()
            .select()
            .from(collections::FRIENDSHIPS)
            .filter(move |q| q.for_all([q.field("user1").eq(user_owned.clone())]))
            .obj()
            .query()
            .await
            .map_err(map_db_err)?;

        let user_owned = user_id.to_string();
        let as_second: Vec<Friendship> = client
            .fluent()
            .select()
            .from(collections::FRIENDSHIPS)
            .filter(move |q| q.for_all([q.field("user2").eq(user_owned.clone())]))
            .obj()
            .query()
            .await
            .map_err(map_db_err)?;

        let mut friend_ids: Vec<String> = as_first
            .iter()
            .chain(as_second.iter())
            .filter_map(|edge| edge.other(user_id).map(String::from))
            .collect();
        friend_ids.sort();
        friend_ids.dedup();

        Ok(friend_ids)
    }
}
