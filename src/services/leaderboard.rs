// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard composition.
//!
//! Merges daily ledgers with profile data into ranked entries. Ordering is
//! a stable descending sort on daily points; tied scores keep their input
//! order and still receive distinct ranks (`index + 1`), not
//! competition-style shared ranks.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{DailyScoreRecord, LeaderboardEntry, UserProfile};
use crate::time_utils;
use chrono::{DateTime, FixedOffset, Utc};

/// Maximum entries returned by the global leaderboard.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Sort entries best-first and assign ranks.
///
/// The sort is stable, so callers control tie order through input order.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.daily_points.cmp(&a.daily_points));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
}

/// A permission failure on any read in a leaderboard path degrades to an
/// empty board instead of erroring the UI. Other errors pass through.
fn empty_board_when_denied(
    result: Result<Vec<LeaderboardEntry>>,
    board: &str,
) -> Result<Vec<LeaderboardEntry>> {
    match result {
        Err(AppError::PermissionDenied) => {
            tracing::warn!(board, "Leaderboard read denied, returning empty");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Service composing friends and global leaderboards.
pub struct LeaderboardService {
    db: FirestoreDb,
    ledger_offset: FixedOffset,
}

impl LeaderboardService {
    pub fn new(db: FirestoreDb, offset_minutes: i32) -> Self {
        Self {
            db,
            ledger_offset: time_utils::ledger_offset(offset_minutes),
        }
    }

    fn build_entry(
        user_id: &str,
        score: Option<DailyScoreRecord>,
        profile: Option<UserProfile>,
        current_user_id: &str,
    ) -> LeaderboardEntry {
        let (daily_points, prayers_completed) = score
            .map(|record| (record.total_points, record.completed_count()))
            .unwrap_or((0, 0));

        let (name, best_score, streak) = profile
            .map(|p| {
                let name = if p.name.is_empty() {
                    "Unknown User".to_string()
                } else {
                    p.name
                };
                (name, p.highest_daily_score, p.daily_streak)
            })
            .unwrap_or_else(|| ("Unknown User".to_string(), 0, 0));

        LeaderboardEntry {
            user_id: user_id.to_string(),
            name,
            daily_points,
            best_score,
            prayers_completed,
            streak,
            rank: 0,
            is_current_user: user_id == current_user_id,
        }
    }

    /// Compose today's leaderboard for a user and their friends.
    ///
    /// The caller is listed first and friends follow in sorted-id order, so
    /// ties resolve in that fixed order. Permission-denied reads degrade to
    /// an empty board.
    pub async fn friends_leaderboard(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let date = time_utils::date_key(now, self.ledger_offset);
        empty_board_when_denied(self.compose_friends(user_id, &date).await, "friends")
    }

    async fn compose_friends(&self, user_id: &str, date: &str) -> Result<Vec<LeaderboardEntry>> {
        let friend_ids = self.db.get_friend_ids(user_id).await?;

        let mut ids = Vec::with_capacity(friend_ids.len() + 1);
        ids.push(user_id.to_string());
        ids.extend(friend_ids);

        let scores = self.db.get_daily_scores_for_users(&ids, date).await?;
        let profiles = self.db.get_profiles_for_users(&ids).await?;

        let mut entries: Vec<LeaderboardEntry> = ids
            .iter()
            .zip(scores.into_iter().zip(profiles))
            .map(|(id, (score, profile))| Self::build_entry(id, score, profile, user_id))
            .collect();

        rank_entries(&mut entries);
        Ok(entries)
    }

    /// Compose today's global leaderboard, bounded to `limit` entries.
    ///
    /// A permission failure on either read (scores or profiles) degrades to
    /// an empty board.
    pub async fn global_leaderboard(
        &self,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let date = time_utils::date_key(now, self.ledger_offset);
        let limit = limit.min(MAX_LEADERBOARD_LIMIT);

        empty_board_when_denied(self.compose_global(&date, limit).await, "global")
    }

    async fn compose_global(&self, date: &str, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        let records = self.db.get_daily_scores_for_date(date, limit).await?;

        let ids: Vec<String> = records.iter().map(|r| r.user_id.clone()).collect();
        let profiles = self.db.get_profiles_for_users(&ids).await?;

        let mut entries: Vec<LeaderboardEntry> = records
            .into_iter()
            .zip(profiles)
            .map(|(record, profile)| {
                let user_id = record.user_id.clone();
                Self::build_entry(&user_id, Some(record), profile, "")
            })
            .collect();

        // Re-sort in memory; required when the ordered query fell back
        rank_entries(&mut entries);
        Ok(entries)
    }
}
