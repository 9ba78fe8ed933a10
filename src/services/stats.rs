// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak derivation, user statistics, and daily rollover.
//!
//! The streak is derived on read from archived history rather than trusted
//! from the stored counter: walk backward day by day from yesterday and
//! count consecutive days with points. Missing history (lookback
//! truncation, index not ready) ends the streak instead of erroring.

use crate::db::firestore::RolloverSummary;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{HistoricalScoreRecord, UserStatsSummary};
use crate::time_utils;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};

/// How many days of history the streak walk inspects.
pub const STREAK_LOOKBACK_DAYS: u32 = 30;

/// Count consecutive days with points immediately preceding `as_of`.
///
/// Walks from `as_of - 1` backward through the lookback window; a day with
/// no record or zero points ends the count.
pub fn compute_streak(history: &[HistoricalScoreRecord], as_of: NaiveDate) -> u32 {
    let mut streak = 0;

    for days_back in 1..=STREAK_LOOKBACK_DAYS {
        let Some(day) = as_of.checked_sub_days(Days::new(days_back as u64)) else {
            break;
        };
        let key = day.format("%Y-%m-%d").to_string();

        match history.iter().find(|record| record.date == key) {
            Some(record) if record.total_points > 0 => streak += 1,
            _ => break,
        }
    }

    streak
}

/// Service for user statistics and the daily rollover.
pub struct StatsService {
    db: FirestoreDb,
    ledger_offset: FixedOffset,
}

impl StatsService {
    pub fn new(db: FirestoreDb, offset_minutes: i32) -> Self {
        Self {
            db,
            ledger_offset: time_utils::ledger_offset(offset_minutes),
        }
    }

    /// Derived statistics for a user as of `now`.
    ///
    /// Absent profiles and permission-denied reads degrade to zero-valued
    /// stats so the UI can render something rather than erroring.
    pub async fn user_stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserStatsSummary> {
        let profile = match self.db.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(AppError::PermissionDenied) => {
                tracing::warn!(user_id, "Profile read denied, returning empty stats");
                return Ok(UserStatsSummary::empty());
            }
            Err(e) => return Err(e),
        };

        let history = self
            .db
            .get_historical_scores(user_id, STREAK_LOOKBACK_DAYS)
            .await?;

        let as_of = time_utils::local_date(now, self.ledger_offset);
        let current_streak = compute_streak(&history, as_of);

        let total_prayers_completed: u32 = history
            .iter()
            .map(|record| record.prayers_completed.len() as u32)
            .sum();
        let average_daily_score = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|r| r.total_points as f64).sum::<f64>() / history.len() as f64
        };

        let mut stats = UserStatsSummary::empty();
        if let Some(profile) = profile {
            stats.highest_daily_score = profile.highest_daily_score;
            stats.highest_score_date = profile.highest_score_date;
            stats.current_daily_score = profile.current_daily_score;
        }
        stats.current_streak = current_streak;
        stats.total_prayers_completed = total_prayers_completed;
        stats.average_daily_score = average_daily_score;

        Ok(stats)
    }

    /// Roll over a day: archive its ledgers, reset live counters, and
    /// maintain streaks.
    ///
    /// `date` defaults to yesterday in the ledger time zone, which is what
    /// the scheduled trigger wants; tests pass an explicit date. Safe to
    /// re-run: already-archived ledgers no longer exist, so they are
    /// skipped.
    pub async fn rollover(
        &self,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<RolloverSummary> {
        let date = match date {
            Some(date) => date,
            None => time_utils::local_date(now, self.ledger_offset)
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| AppError::BadRequest("Date out of range".to_string()))?,
        };
        let key = date.format("%Y-%m-%d").to_string();

        tracing::info!(date = %key, "Starting daily rollover");
        self.db.rollover_day(&key, now).await
    }
}
