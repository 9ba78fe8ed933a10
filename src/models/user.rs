//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The profile is owned by the auth/profile feature; the scoring engine
/// only touches the mirror fields below (current score, highest score,
/// streak, last prayer). Those are updated in the same transaction as the
/// daily ledger so a crash never leaves them out of sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user identifier (also used as document ID)
    pub user_id: String,
    /// Display name shown on leaderboards
    #[serde(default)]
    pub name: String,
    /// Email address (may be None if not shared)
    #[serde(default)]
    pub email: Option<String>,
    /// Maximum daily total ever recorded
    #[serde(default)]
    pub highest_daily_score: u32,
    /// Ledger date of that maximum (`YYYY-MM-DD`)
    #[serde(default)]
    pub highest_score_date: Option<String>,
    /// Mirror of today's ledger total, kept for cheap reads
    #[serde(default)]
    pub current_daily_score: u32,
    /// Consecutive prior days with points, maintained at rollover
    #[serde(default)]
    pub daily_streak: u32,
    /// Name of the most recently completed prayer
    #[serde(default)]
    pub last_prayer_completed: Option<String>,
    /// Completion timestamp of that prayer (RFC3339)
    #[serde(default)]
    pub last_prayer_time: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// Minimal profile for a user we have not seen before.
    pub fn new(user_id: &str, now: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: String::new(),
            email: None,
            highest_daily_score: 0,
            highest_score_date: None,
            current_daily_score: 0,
            daily_streak: 0,
            last_prayer_completed: None,
            last_prayer_time: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Mirror a new daily total after a prayer completion.
    ///
    /// Raises `highest_daily_score` only on a strictly greater total, so the
    /// earliest date achieving the maximum is kept on ties.
    pub fn record_daily_total(&mut self, total: u32, date: &str, prayer: &str, now: &str) {
        self.current_daily_score = total;
        self.last_prayer_completed = Some(prayer.to_string());
        self.last_prayer_time = Some(now.to_string());
        self.updated_at = now.to_string();

        if total > self.highest_daily_score {
            self.highest_daily_score = total;
            self.highest_score_date = Some(date.to_string());
        }
    }

    /// Reset the live counters at daily rollover.
    ///
    /// The streak increments only when yesterday scored points; a zero-point
    /// day breaks it.
    pub fn reset_for_new_day(&mut self, had_points: bool, now: &str) {
        self.current_daily_score = 0;
        self.last_prayer_completed = None;
        self.last_prayer_time = None;
        self.daily_streak = if had_points { self.daily_streak + 1 } else { 0 };
        self.updated_at = now.to_string();
    }
}

/// Derived statistics for a user, computed on read.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatsSummary {
    pub highest_daily_score: u32,
    pub highest_score_date: Option<String>,
    pub current_daily_score: u32,
    pub current_streak: u32,
    pub total_prayers_completed: u32,
    pub average_daily_score: f64,
}

impl UserStatsSummary {
    /// Zero-valued stats, used when the profile is absent or unreadable.
    pub fn empty() -> Self {
        Self {
            highest_daily_score: 0,
            highest_score_date: None,
            current_daily_score: 0,
            current_streak: 0,
            total_prayers_completed: 0,
            average_daily_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_daily_total_raises_highest() {
        let mut profile = UserProfile::new("user-1", "2025-03-10T05:00:00Z");

        profile.record_daily_total(30, "2025-03-10", "Fajr", "2025-03-10T05:30:00Z");
        assert_eq!(profile.highest_daily_score, 30);
        assert_eq!(profile.highest_score_date, Some("2025-03-10".to_string()));
        assert_eq!(profile.current_daily_score, 30);
        assert_eq!(profile.last_prayer_completed, Some("Fajr".to_string()));

        profile.record_daily_total(60, "2025-03-10", "Dhuhr", "2025-03-10T12:30:00Z");
        assert_eq!(profile.highest_daily_score, 60);
    }

    #[test]
    fn test_highest_score_never_decreases() {
        let mut profile = UserProfile::new("user-1", "2025-03-09T00:00:00Z");
        profile.highest_daily_score = 100;
        profile.highest_score_date = Some("2025-03-01".to_string());

        profile.record_daily_total(30, "2025-03-10", "Fajr", "2025-03-10T05:30:00Z");

        assert_eq!(profile.highest_daily_score, 100);
        assert_eq!(profile.highest_score_date, Some("2025-03-01".to_string()));
        assert_eq!(profile.current_daily_score, 30);
    }

    #[test]
    fn test_tied_total_keeps_earliest_date() {
        let mut profile = UserProfile::new("user-1", "2025-03-09T00:00:00Z");
        profile.highest_daily_score = 30;
        profile.highest_score_date = Some("2025-03-01".to_string());

        profile.record_daily_total(30, "2025-03-10", "Fajr", "2025-03-10T05:30:00Z");

        assert_eq!(profile.highest_score_date, Some("2025-03-01".to_string()));
    }

    #[test]
    fn test_reset_for_new_day_with_points() {
        let mut profile = UserProfile::new("user-1", "2025-03-09T00:00:00Z");
        profile.current_daily_score = 80;
        profile.daily_streak = 4;
        profile.last_prayer_completed = Some("Isha".to_string());

        profile.reset_for_new_day(true, "2025-03-10T04:30:00Z");

        assert_eq!(profile.current_daily_score, 0);
        assert_eq!(profile.daily_streak, 5);
        assert_eq!(profile.last_prayer_completed, None);
        assert_eq!(profile.last_prayer_time, None);
    }

    #[test]
    fn test_reset_for_new_day_without_points_breaks_streak() {
        let mut profile = UserProfile::new("user-1", "2025-03-09T00:00:00Z");
        profile.daily_streak = 4;

        profile.reset_for_new_day(false, "2025-03-10T04:30:00Z");

        assert_eq!(profile.daily_streak, 0);
    }
}
