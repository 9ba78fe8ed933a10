// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend-request protocol.
//!
//! State machine: `pending -> accepted` or `pending -> rejected`, both
//! terminal. Requests are keyed by the unordered user pair, so a pending
//! A->B blocks B->A as well. Accepting creates the friendship edge in the
//! same transaction as the status change.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::friend::pair_id;
use crate::models::{FriendRequest, Friendship, RequestStatus};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

/// Service implementing the friend-request protocol.
pub struct FriendService {
    db: FirestoreDb,
}

impl FriendService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Send a friend request from one user to another.
    ///
    /// Fails with `AlreadyFriends` if an edge exists, or `RequestPending`
    /// if a pending request exists in either direction. A terminal
    /// (accepted/rejected) request does not block a fresh one.
    pub async fn send_request(
        &self,
        from: &str,
        to: &str,
        now: DateTime<Utc>,
    ) -> Result<FriendRequest> {
        if from == to {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        if self.db.get_friendship(from, to).await?.is_some() {
            return Err(AppError::AlreadyFriends);
        }

        if let Some(existing) = self.db.get_friend_request(&pair_id(from, to)).await? {
            if existing.is_pending() {
                return Err(AppError::RequestPending);
            }
        }

        let request = FriendRequest::new(from, to, &format_utc_rfc3339(now));
        self.db.upsert_friend_request(&request).await?;

        tracing::info!(from, to, "Friend request sent");
        Ok(request)
    }

    /// Accept a pending request addressed to `user_id`.
    ///
    /// Only the recipient may accept; requests that are absent, terminal,
    /// or addressed to someone else all surface as `RequestNotFound`.
    pub async fn accept_request(
        &self,
        request_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Friendship> {
        let request = self.pending_request_for(request_id, user_id).await?;
        self.db.accept_friend_request_atomic(&request, now).await
    }

    /// Reject a pending request addressed to `user_id`. No edge is created.
    pub async fn reject_request(
        &self,
        request_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut request = self.pending_request_for(request_id, user_id).await?;
        request.status = RequestStatus::Rejected;
        request.updated_at = Some(format_utc_rfc3339(now));

        self.db.upsert_friend_request(&request).await?;

        tracing::info!(from = %request.from, to = %request.to, "Friend request rejected");
        Ok(())
    }

    /// Pending requests addressed to a user.
    ///
    /// Permission-denied reads degrade to an empty list.
    pub async fn pending_requests(&self, user_id: &str) -> Result<Vec<FriendRequest>> {
        match self.db.get_pending_requests_for(user_id).await {
            Ok(requests) => Ok(requests),
            Err(AppError::PermissionDenied) => {
                tracing::warn!(user_id, "Pending request read denied, returning empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// All friend IDs for a user.
    pub async fn friends(&self, user_id: &str) -> Result<Vec<String>> {
        self.db.get_friend_ids(user_id).await
    }

    async fn pending_request_for(&self, request_id: &str, user_id: &str) -> Result<FriendRequest> {
        let not_found = || AppError::RequestNotFound(request_id.to_string());

        let request = self
            .db
            .get_friend_request(request_id)
            .await?
            .ok_or_else(not_found)?;

        if !request.is_pending() || request.to != user_id {
            return Err(not_found());
        }

        Ok(request)
    }
}
