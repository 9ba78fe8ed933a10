//! Daily score ledger documents.
//!
//! One `DailyScoreRecord` exists per (user, calendar date). It is the unit
//! of atomic update for prayer completions: membership in
//! `prayers_completed` is checked before any points are awarded, so each
//! prayer scores at most once per day.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Prayer;

/// Points awarded for a single prayer completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerPoints {
    pub base: u32,
    pub speed_bonus: u32,
    pub total: u32,
}

/// Per-user-per-day score document.
///
/// Stored at: `daily_scores/{user_id}_{date}`
///
/// Append-only with respect to `prayers_completed`; mutated only inside the
/// completion transaction and deleted at daily rollover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyScoreRecord {
    pub user_id: String,
    /// Ledger date key, `YYYY-MM-DD` in the reference time zone
    pub date: String,
    #[serde(default)]
    pub total_points: u32,
    /// Prayer names completed today; each appears at most once
    #[serde(default)]
    pub prayers_completed: Vec<String>,
    /// Prayer name -> completion timestamp (RFC3339)
    #[serde(default)]
    pub completion_times: HashMap<String, String>,
    #[serde(default)]
    pub last_updated: String,
}

impl DailyScoreRecord {
    /// Zero-valued record, used when no document exists yet.
    pub fn empty(user_id: &str, date: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            date: date.to_string(),
            total_points: 0,
            prayers_completed: Vec::new(),
            completion_times: HashMap::new(),
            last_updated: String::new(),
        }
    }

    /// Document ID in the daily scores collection.
    pub fn doc_id(user_id: &str, date: &str) -> String {
        format!("{}_{}", user_id, date)
    }

    pub fn is_completed(&self, prayer: Prayer) -> bool {
        self.prayers_completed.iter().any(|p| p == prayer.as_str())
    }

    pub fn completed_count(&self) -> u32 {
        self.prayers_completed.len() as u32
    }

    /// Record a prayer completion.
    ///
    /// Returns `true` if the prayer was newly recorded.
    /// Returns `false` if it was already completed today (no fields change).
    pub fn apply_completion(&mut self, prayer: Prayer, points: PrayerPoints, now: &str) -> bool {
        if self.is_completed(prayer) {
            return false;
        }

        self.prayers_completed.push(prayer.as_str().to_string());
        self.completion_times
            .insert(prayer.as_str().to_string(), now.to_string());
        self.total_points += points.total;
        self.last_updated = now.to_string();

        true
    }
}

/// Archived copy of a `DailyScoreRecord` after its day has rolled over.
///
/// Stored at: `historical_scores/{user_id}_{date}`, immutable after
/// creation. The archive write is an upsert so re-running a rollover never
/// duplicates a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalScoreRecord {
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub prayers_completed: Vec<String>,
    #[serde(default)]
    pub completion_times: HashMap<String, String>,
    #[serde(default)]
    pub archived_at: String,
}

impl HistoricalScoreRecord {
    pub fn from_daily(record: &DailyScoreRecord, archived_at: &str) -> Self {
        Self {
            user_id: record.user_id.clone(),
            date: record.date.clone(),
            total_points: record.total_points,
            prayers_completed: record.prayers_completed.clone(),
            completion_times: record.completion_times.clone(),
            archived_at: archived_at.to_string(),
        }
    }

    pub fn doc_id(user_id: &str, date: &str) -> String {
        DailyScoreRecord::doc_id(user_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(bonus: u32) -> PrayerPoints {
        PrayerPoints {
            base: 20,
            speed_bonus: bonus,
            total: 20 + bonus,
        }
    }

    #[test]
    fn test_apply_completion_basic() {
        let mut record = DailyScoreRecord::empty("user-1", "2025-03-10");

        let applied = record.apply_completion(Prayer::Fajr, points(10), "2025-03-10T05:30:00Z");

        assert!(applied);
        assert_eq!(record.total_points, 30);
        assert_eq!(record.completed_count(), 1);
        assert_eq!(
            record.completion_times.get("Fajr"),
            Some(&"2025-03-10T05:30:00Z".to_string())
        );
    }

    #[test]
    fn test_duplicate_completion_changes_nothing() {
        let mut record = DailyScoreRecord::empty("user-1", "2025-03-10");
        record.apply_completion(Prayer::Dhuhr, points(10), "2025-03-10T12:30:00Z");

        let applied_again =
            record.apply_completion(Prayer::Dhuhr, points(10), "2025-03-10T13:00:00Z");

        assert!(!applied_again);
        assert_eq!(record.total_points, 30); // Not double-counted
        assert_eq!(record.completed_count(), 1);
        assert_eq!(
            record.completion_times.get("Dhuhr"),
            Some(&"2025-03-10T12:30:00Z".to_string())
        );
    }

    #[test]
    fn test_all_five_prayers_at_max_bonus() {
        let mut record = DailyScoreRecord::empty("user-1", "2025-03-10");

        for prayer in Prayer::ALL {
            assert!(record.apply_completion(prayer, points(10), "2025-03-10T12:00:00Z"));
        }

        assert_eq!(record.total_points, 150);
        assert_eq!(record.completed_count(), 5);

        // A sixth attempt for any prayer fails
        for prayer in Prayer::ALL {
            assert!(!record.apply_completion(prayer, points(10), "2025-03-10T23:00:00Z"));
        }
        assert_eq!(record.total_points, 150);
    }

    #[test]
    fn test_archive_copies_ledger_verbatim() {
        let mut record = DailyScoreRecord::empty("user-1", "2025-03-10");
        record.apply_completion(Prayer::Asr, points(5), "2025-03-10T15:10:00Z");

        let archived = HistoricalScoreRecord::from_daily(&record, "2025-03-11T04:30:00Z");

        assert_eq!(archived.user_id, "user-1");
        assert_eq!(archived.date, "2025-03-10");
        assert_eq!(archived.total_points, 25);
        assert_eq!(archived.prayers_completed, vec!["Asr".to_string()]);
        assert_eq!(archived.archived_at, "2025-03-11T04:30:00Z");
    }
}
