//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Live per-user-per-day ledgers (keyed by `{user_id}_{date}`)
    pub const DAILY_SCORES: &str = "daily_scores";
    /// Immutable archive of rolled-over ledgers
    pub const HISTORICAL_SCORES: &str = "historical_scores";
    pub const FRIEND_REQUESTS: &str = "friend_requests";
    pub const FRIENDSHIPS: &str = "friendships";
}
