//! Ephemeral leaderboard entries.

use serde::Serialize;

/// One row of a composed leaderboard. Never persisted; `rank` is assigned
/// at composition time.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    /// Today's ledger total
    pub daily_points: u32,
    /// Lifetime best daily total from the profile
    pub best_score: u32,
    pub prayers_completed: u32,
    pub streak: u32,
    /// Dense rank starting at 1; ties keep input order and distinct ranks
    pub rank: u32,
    pub is_current_user: bool,
}
