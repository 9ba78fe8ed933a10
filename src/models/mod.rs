// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod friend;
pub mod leaderboard;
pub mod prayer;
pub mod score;
pub mod user;

pub use friend::{FriendRequest, Friendship, RequestStatus};
pub use leaderboard::LeaderboardEntry;
pub use prayer::Prayer;
pub use score::{DailyScoreRecord, HistoricalScoreRecord, PrayerPoints};
pub use user::{UserProfile, UserStatsSummary};
