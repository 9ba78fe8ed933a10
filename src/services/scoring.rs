// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily score ledger service.
//!
//! Handles the core workflow:
//! 1. Derive the ledger date key and local time from the completion instant
//! 2. Calculate points for (prayer, time of day)
//! 3. Apply the completion atomically (ledger + profile mirror)
//!
//! Callers pass the completion instant explicitly so tests can pin
//! arbitrary times instead of reading the wall clock here.

use crate::db::firestore::CompletionOutcome;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{DailyScoreRecord, Prayer};
use crate::services::points;
use crate::time_utils;
use chrono::{DateTime, FixedOffset, Utc};

/// Service for recording prayer completions and reading daily scores.
pub struct ScoreService {
    db: FirestoreDb,
    ledger_offset: FixedOffset,
}

impl ScoreService {
    pub fn new(db: FirestoreDb, offset_minutes: i32) -> Self {
        Self {
            db,
            ledger_offset: time_utils::ledger_offset(offset_minutes),
        }
    }

    /// Ledger date key for an instant.
    pub fn date_key(&self, now: DateTime<Utc>) -> String {
        time_utils::date_key(now, self.ledger_offset)
    }

    /// Record a prayer completion at `now`.
    ///
    /// Fails with `AlreadyCompleted` if the prayer is already in today's
    /// ledger; no points are awarded and nothing changes in that case.
    pub async fn complete_prayer(
        &self,
        user_id: &str,
        prayer: Prayer,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        let date = self.date_key(now);
        let local = time_utils::local_time(now, self.ledger_offset);
        let awarded = points::calculate_points(prayer.as_str(), local);

        tracing::debug!(
            user_id,
            prayer = %prayer,
            date = %date,
            bonus = awarded.speed_bonus,
            "Applying prayer completion"
        );

        self.db
            .complete_prayer_atomic(user_id, prayer, awarded, &date, now)
            .await
    }

    /// Get a user's daily score, defaulting to today.
    ///
    /// Absent documents and store-level permission failures both degrade to
    /// the zero-valued virtual record so read paths never error the UI.
    pub async fn daily_score(
        &self,
        user_id: &str,
        date: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DailyScoreRecord> {
        let date = match date {
            Some(raw) => {
                time_utils::parse_date_key(raw).ok_or_else(|| {
                    AppError::BadRequest("Invalid 'date' parameter: must be YYYY-MM-DD".to_string())
                })?;
                raw.to_string()
            }
            None => self.date_key(now),
        };

        match self.db.get_daily_score(user_id, &date).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Ok(DailyScoreRecord::empty(user_id, &date)),
            Err(AppError::PermissionDenied) => {
                tracing::warn!(user_id, date = %date, "Daily score read denied, returning empty");
                Ok(DailyScoreRecord::empty(user_id, &date))
            }
            Err(e) => Err(e),
        }
    }
}
