//! Friend request and friendship models.
//!
//! Requests are keyed by the unordered user pair so A->B and B->A share a
//! single pending slot; two users cannot hold simultaneous requests toward
//! each other.

use serde::{Deserialize, Serialize};

/// Friend request state. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A friend request from one user to another.
///
/// Stored at: `friend_requests/{pair_id}` where `pair_id` is the sorted
/// user pair. A later request between the same pair overwrites a terminal
/// one; a pending one blocks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub request_id: String,
    pub from: String,
    pub to: String,
    pub status: RequestStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl FriendRequest {
    pub fn new(from: &str, to: &str, now: &str) -> Self {
        Self {
            request_id: pair_id(from, to),
            from: from.to_string(),
            to: to.to_string(),
            status: RequestStatus::Pending,
            created_at: now.to_string(),
            updated_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Symmetric friendship between two users.
///
/// Stored at: `friendships/{pair_id}`. Queried as the union of edges where
/// the user appears as either endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub user1: String,
    pub user2: String,
    pub created_at: String,
}

impl Friendship {
    pub fn new(a: &str, b: &str, now: &str) -> Self {
        let (user1, user2) = ordered_pair(a, b);
        Self {
            user1: user1.to_string(),
            user2: user2.to_string(),
            created_at: now.to_string(),
        }
    }

    pub fn doc_id(&self) -> String {
        pair_id(&self.user1, &self.user2)
    }

    /// The endpoint that is not `user_id`, if `user_id` is part of the edge.
    pub fn other(&self, user_id: &str) -> Option<&str> {
        if self.user1 == user_id {
            Some(&self.user2)
        } else if self.user2 == user_id {
            Some(&self.user1)
        } else {
            None
        }
    }
}

/// Deterministic document ID for an unordered user pair.
pub fn pair_id(a: &str, b: &str) -> String {
    let (first, second) = ordered_pair(a, b);
    format!("{}_{}", first, second)
}

fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
