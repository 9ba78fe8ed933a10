// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend-request protocol integration tests.
//!
//! These tests require the Firestore emulator; each test uses its own
//! unique pair of users.

use chrono::{TimeZone, Utc};
use salah_tracker::error::AppError;
use salah_tracker::models::friend::pair_id;
use salah_tracker::models::Prayer;
use salah_tracker::services::{FriendService, LeaderboardService, ScoreService};

mod common;
use common::{test_db, unique_user_id};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn test_pending_request_blocks_both_directions() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");

    let request = service.send_request(&alice, &bob, now()).await.unwrap();
    assert_eq!(request.request_id, pair_id(&alice, &bob));
    assert!(request.is_pending());

    // Same direction
    let err = service.send_request(&alice, &bob, now()).await.unwrap_err();
    assert!(matches!(err, AppError::RequestPending));

    // Reverse direction shares the same slot
    let err = service.send_request(&bob, &alice, now()).await.unwrap_err();
    assert!(matches!(err, AppError::RequestPending));
}

#[tokio::test]
async fn test_self_request_rejected() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");

    let err = service.send_request(&alice, &alice, now()).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_accept_creates_friendship_edge() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");

    let request = service.send_request(&alice, &bob, now()).await.unwrap();

    // Pending list for the recipient includes it
    let pending = service.pending_requests(&bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].from, alice);

    let edge = service
        .accept_request(&request.request_id, &bob, now())
        .await
        .unwrap();
    assert_eq!(edge.other(&alice), Some(bob.as_str()));

    // Both users now list each other
    assert_eq!(service.friends(&alice).await.unwrap(), vec![bob.clone()]);
    assert_eq!(service.friends(&bob).await.unwrap(), vec![alice.clone()]);

    // Pending list drains
    assert!(service.pending_requests(&bob).await.unwrap().is_empty());

    // A fresh request between friends fails
    let err = service.send_request(&bob, &alice, now()).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyFriends));
}

#[tokio::test]
async fn test_only_recipient_may_accept() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");
    let carol = unique_user_id("carol");

    let request = service.send_request(&alice, &bob, now()).await.unwrap();

    // Sender cannot accept their own request
    let err = service
        .accept_request(&request.request_id, &alice, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RequestNotFound(_)));

    // Neither can an unrelated user
    let err = service
        .accept_request(&request.request_id, &carol, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RequestNotFound(_)));

    // No edge was created
    assert!(service.friends(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reject_allows_fresh_request() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");

    let request = service.send_request(&alice, &bob, now()).await.unwrap();
    service
        .reject_request(&request.request_id, &bob, now())
        .await
        .unwrap();

    // Rejection is terminal: no edge, pending list empty
    assert!(service.friends(&alice).await.unwrap().is_empty());
    assert!(service.pending_requests(&bob).await.unwrap().is_empty());

    // A rejected request does not block a new one, in either direction
    let request = service.send_request(&bob, &alice, now()).await.unwrap();
    assert!(request.is_pending());
    assert_eq!(request.from, bob);
}

#[tokio::test]
async fn test_accepting_twice_fails() {
    require_emulator!();

    let service = FriendService::new(test_db().await);
    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");

    let request = service.send_request(&alice, &bob, now()).await.unwrap();
    service
        .accept_request(&request.request_id, &bob, now())
        .await
        .unwrap();

    let err = service
        .accept_request(&request.request_id, &bob, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RequestNotFound(_)));
}

#[tokio::test]
async fn test_friends_leaderboard_ranks_pair() {
    require_emulator!();

    let db = test_db().await;
    let friend_service = FriendService::new(db.clone());
    let score_service = ScoreService::new(db.clone(), 0);
    let leaderboard_service = LeaderboardService::new(db.clone(), 0);

    let alice = unique_user_id("alice");
    let bob = unique_user_id("bob");

    let request = friend_service
        .send_request(&alice, &bob, now())
        .await
        .unwrap();
    friend_service
        .accept_request(&request.request_id, &bob, now())
        .await
        .unwrap();

    // Bob scores higher today
    let instant = Utc.with_ymd_and_hms(2025, 3, 10, 5, 30, 0).unwrap();
    score_service
        .complete_prayer(&bob, Prayer::Fajr, instant)
        .await
        .unwrap();

    let board = leaderboard_service
        .friends_leaderboard(&alice, now())
        .await
        .unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board[0].user_id, bob);
    assert_eq!(board[0].daily_points, 30);
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[1].user_id, alice);
    assert_eq!(board[1].daily_points, 0);
    assert_eq!(board[1].rank, 2);
    assert!(board[1].is_current_user);
}
