//! End-to-end matchmaking, move refereeing and clock behaviour through the
//! registry, on a paused Tokio clock.

mod common;

use std::time::Duration;

use common::{account, channel_harness, coord, harness};
use referee::{GameEvent, GameState, JoinOutcome, RefereeError};

#[tokio::test(start_paused = true)]
async fn test_two_players_are_paired_in_order() {
    let h = harness(Duration::from_secs(300));
    let alice = account("alice");
    let bob = account("bob");

    assert_eq!(h.registry.join_queue(alice.clone()).unwrap(), JoinOutcome::Queued { position: 0 });
    let JoinOutcome::Matched { session_id } = h.registry.join_queue(bob.clone()).unwrap() else {
        panic!("second join should start a game");
    };

    assert_eq!(h.registry.session_count(), 1);
    assert_eq!(h.registry.queue_len(), 0);

    let snapshot = h.registry.get_session(session_id).await.unwrap();
    assert_eq!(snapshot.white_account, alice);
    assert_eq!(snapshot.black_account, bob);
    assert_eq!(snapshot.state, GameState::WhiteToMove);
    assert_eq!(snapshot.white_time_remaining_ms, 300_000);
    assert_eq!(snapshot.black_time_remaining_ms, 300_000);

    assert_eq!(h.notifier.events_for("alice"), vec![GameEvent::GameStart]);
    assert_eq!(h.notifier.events_for("bob"), vec![GameEvent::GameStart]);
    h.registry.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_third_player_waits() {
    let h = harness(Duration::from_secs(300));
    h.registry.join_queue(account("alice")).unwrap();
    h.registry.join_queue(account("bob")).unwrap();
    assert_eq!(h.registry.join_queue(account("carol")).unwrap(), JoinOutcome::Queued { position: 0 });
    assert!(h.registry.find_session_for("carol").is_none());

    let JoinOutcome::Matched { session_id } = h.registry.join_queue(account("dave")).unwrap() else {
        panic!("fourth join should start a game");
    };
    let snapshot = h.registry.active_session_for("dave").await.unwrap();
    assert_eq!(snapshot.id, session_id);
    assert_eq!(snapshot.white_account.username, "carol");
    h.registry.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_join_is_rejected() {
    let h = harness(Duration::from_secs(300));
    h.registry.join_queue(account("alice")).unwrap();
    let err = h.registry.join_queue(account("alice")).unwrap_err();
    assert!(matches!(err, RefereeError::AlreadyQueued(_)));
    assert_eq!(h.registry.queue_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fools_mate_through_registry() {
    let h = harness(Duration::from_secs(300));
    let alice = account("alice");
    let bob = account("bob");
    let id = h.registry.start_game(alice.clone(), bob.clone()).unwrap();

    for (player, origin, destination) in [
        (&alice, "f2", "f3"),
        (&bob, "e7", "e5"),
        (&alice, "g2", "g4"),
    ] {
        let snapshot = h
            .registry
            .move_piece(id, player, coord(origin), coord(destination))
            .await
            .unwrap();
        assert!(!snapshot.state.is_terminal());
    }

    let last = h
        .registry
        .move_piece(id, &bob, coord("d8"), coord("h4"))
        .await
        .unwrap();
    assert_eq!(last.state, GameState::BlackWinByMate);
    assert_eq!(last.moves.len(), 4);
    assert_eq!(last.black_account.elo_rating, 1215);
    assert_eq!(last.white_account.elo_rating, 1185);

    assert!(h.registry.find_session_for("alice").is_none());
    assert!(h.registry.find_session_for("bob").is_none());
    assert_eq!(
        h.ratings.writes(),
        vec![("alice".to_string(), 1185), ("bob".to_string(), 1215)]
    );
    assert_eq!(h.notifier.count(GameEvent::GameUpdate), 6);
    assert_eq!(h.notifier.count(GameEvent::GameOver), 2);

    // The finished game is gone.
    let err = h
        .registry
        .move_piece(id, &alice, coord("a2"), coord("a3"))
        .await
        .unwrap_err();
    assert!(matches!(err, RefereeError::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_moves_change_nothing() {
    let h = harness(Duration::from_secs(300));
    let alice = account("alice");
    let bob = account("bob");
    let mallory = account("mallory");
    let id = h.registry.start_game(alice.clone(), bob.clone()).unwrap();

    let cases = [
        (&bob, "e7", "e5"),
        (&mallory, "e2", "e4"),
        (&alice, "e7", "e5"),
        (&alice, "e2", "e5"),
        (&alice, "e4", "e5"),
    ];
    for (player, origin, destination) in cases {
        let result = h
            .registry
            .move_piece(id, player, coord(origin), coord(destination))
            .await;
        assert!(result.is_err(), "{} {origin}->{destination}", player.username);
    }

    let snapshot = h.registry.get_session(id).await.unwrap();
    assert_eq!(snapshot.state, GameState::WhiteToMove);
    assert!(snapshot.moves.is_empty());
    assert_eq!(h.notifier.count(GameEvent::GameUpdate), 0);
    h.registry.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_zero_clock_loses_on_time_exactly_once() {
    let (registry, mut rx, ratings) = channel_harness(Duration::ZERO);
    let id = registry.start_game(account("alice"), account("bob")).unwrap();

    let mut over = Vec::new();
    while over.len() < 2 {
        let notification = rx.recv().await.unwrap();
        if notification.event == GameEvent::GameOver {
            over.push(notification);
        }
    }
    assert!(over.iter().all(|n| n.payload.state == GameState::BlackWinByTime));
    assert!(over.iter().all(|n| n.payload.id == id));
    assert_eq!(over[0].payload.white_time_remaining_ms, 0);

    // Let any stray timer fire.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(ratings.writes().len(), 2);
    assert!(registry.find_session_for("alice").is_none());
    assert_eq!(registry.session_count(), 0);
    while let Ok(notification) = rx.try_recv() {
        assert_ne!(notification.event, GameEvent::GameOver);
    }
}

#[tokio::test(start_paused = true)]
async fn test_move_rearms_timeout_for_opponent() {
    let h = harness(Duration::from_secs(10));
    let alice = account("alice");
    let bob = account("bob");
    let id = h.registry.start_game(alice.clone(), bob.clone()).unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;
    h.registry
        .move_piece(id, &alice, coord("e2"), coord("e4"))
        .await
        .unwrap();

    // White used 6s; black now has a fresh 10s window, so the game
    // survives past white's original deadline.
    tokio::time::sleep(Duration::from_secs(8)).await;
    let snapshot = h.registry.get_session(id).await.unwrap();
    assert_eq!(snapshot.state, GameState::BlackToMove);
    assert_eq!(snapshot.white_time_remaining_ms, 4_000);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(h.registry.find_session_for("bob").is_none());
    let last = h.notifier.last().unwrap();
    assert_eq!(last.state, GameState::WhiteWinByTime);
    assert_eq!(last.black_time_remaining_ms, 0);
}

#[tokio::test(start_paused = true)]
async fn test_resignation_through_registry() {
    let h = harness(Duration::from_secs(300));
    let alice = account("alice");
    let bob = account("bob");
    let id = h.registry.start_game(alice.clone(), bob.clone()).unwrap();

    let snapshot = h.registry.resign(id, &alice).await.unwrap();
    assert_eq!(snapshot.state, GameState::BlackWinByResignation);
    assert_eq!(snapshot.white_rating_change, Some(-15));
    assert_eq!(snapshot.black_rating_change, Some(15));

    // Both players may queue again.
    h.registry.join_queue(alice).unwrap();
    assert!(matches!(
        h.registry.join_queue(bob).unwrap(),
        JoinOutcome::Matched { .. }
    ));
    h.registry.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_in_game_player_cannot_queue_or_start() {
    let h = harness(Duration::from_secs(300));
    h.registry.start_game(account("alice"), account("bob")).unwrap();

    assert!(matches!(
        h.registry.join_queue(account("alice")),
        Err(RefereeError::AlreadyInGame(_))
    ));
    assert!(matches!(
        h.registry.start_game(account("carol"), account("bob")),
        Err(RefereeError::AlreadyInGame(_))
    ));
    assert!(matches!(
        h.registry.start_game(account("carol"), account("carol")),
        Err(RefereeError::AlreadyInGame(_))
    ));
    h.registry.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_move_at_exact_deadline_loses_on_time() {
    let h = harness(Duration::from_secs(10));
    let alice = account("alice");
    let id = h.registry.start_game(alice.clone(), account("bob")).unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;
    let err = h
        .registry
        .move_piece(id, &alice, coord("e2"), coord("e4"))
        .await
        .unwrap_err();
    assert!(matches!(err, RefereeError::NotFound(_)));

    assert_eq!(h.notifier.count(GameEvent::GameOver), 2);
    assert_eq!(h.notifier.count(GameEvent::GameUpdate), 0);
    let last = h.notifier.last().unwrap();
    assert_eq!(last.state, GameState::BlackWinByTime);
    assert!(last.moves.is_empty());
    assert_eq!(h.ratings.writes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_registry_stops_games_without_settlement() {
    let h = harness(Duration::from_secs(10));
    h.registry.start_game(account("alice"), account("bob")).unwrap();
    h.registry.join_queue(account("carol")).unwrap();

    drop(h.registry);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(h.ratings.writes().is_empty());
    assert_eq!(h.notifier.count(GameEvent::GameOver), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_games_without_settlement() {
    let h = harness(Duration::from_secs(10));
    let id = h.registry.start_game(account("alice"), account("bob")).unwrap();

    h.registry.shutdown();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(h.ratings.writes().is_empty());
    assert_eq!(h.registry.session_count(), 0);
    assert!(matches!(
        h.registry.get_session(id).await,
        Err(RefereeError::NotFound(_))
    ));
}
