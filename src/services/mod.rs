// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod friends;
pub mod leaderboard;
pub mod points;
pub mod qibla;
pub mod scoring;
pub mod stats;

pub use friends::FriendService;
pub use leaderboard::LeaderboardService;
pub use scoring::ScoreService;
pub use stats::StatsService;
