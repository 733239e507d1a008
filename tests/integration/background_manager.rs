use std::sync::Arc;

use backdrop::background::{BackgroundState, Layer, UpdateOutcome};
use backdrop::constraint::{Constraint, Orientation, Viewport};
use backdrop::error::{BackdropError, FailureClass};

use crate::support::{fallback_legend, manager, FakeSource};

#[tokio::test]
async fn shrinking_after_growth_fetches_nothing_new() {
    let source = Arc::new(FakeSource::new());
    let (manager, surface) = manager(source.clone(), 8);

    let first = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert_eq!(
        first,
        UpdateOutcome::Applied {
            constraint: Constraint::portrait(480),
            from_cache: false
        }
    );

    let grown = manager
        .update_constraint(Constraint::portrait(736))
        .await
        .unwrap();
    assert!(matches!(grown, UpdateOutcome::Applied { .. }));

    let shrunk = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert_eq!(shrunk, UpdateOutcome::Skipped);

    assert_eq!(
        source.requested_keys(),
        vec![
            "images/lake.jpg?height=480".to_string(),
            "images/lake.jpg?height=736".to_string(),
        ]
    );
    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(736)));
    assert_eq!(surface.layers().len(), 2);
}

#[tokio::test]
async fn orientation_flip_always_refetches() {
    let source = Arc::new(FakeSource::new());
    let (manager, _surface) = manager(source.clone(), 8);

    manager
        .update_constraint(Constraint::landscape(1280))
        .await
        .unwrap();
    let flipped = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert_eq!(
        flipped,
        UpdateOutcome::Applied {
            constraint: Constraint::portrait(480),
            from_cache: false
        }
    );
    assert_eq!(source.requested_keys().len(), 2);

    // Flipping back is still an update, but the variant comes from the cache.
    let back = manager
        .update_constraint(Constraint::landscape(1280))
        .await
        .unwrap();
    assert_eq!(
        back,
        UpdateOutcome::Applied {
            constraint: Constraint::landscape(1280),
            from_cache: true
        }
    );
    assert_eq!(source.requested_keys().len(), 2);
}

#[tokio::test]
async fn legend_follows_response_headers() {
    let source = Arc::new(FakeSource::new());
    let (manager, surface) = manager(source, 8);

    manager
        .update_constraint(Constraint::unbounded(Orientation::Landscape))
        .await
        .unwrap();

    let legend = surface.legend().unwrap();
    assert_eq!(legend.main_color, "#334455");
    assert_eq!(legend.location, "lake.jpg");
    assert_eq!(legend.date, "June 2021");
    match manager.state() {
        BackgroundState::Shown { key, .. } => assert_eq!(key, "images/lake.jpg"),
        other => panic!("expected shown state, got {:?}", other),
    }
}

#[tokio::test]
async fn viewport_changes_map_to_breakpoints() {
    let source = Arc::new(FakeSource::new());
    let (manager, _surface) = manager(source.clone(), 8);

    manager.handle_viewport(Viewport::new(375, 667)).await.unwrap();
    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(736)));

    // Resizing within the same breakpoint does nothing.
    let same = manager.handle_viewport(Viewport::new(400, 700)).await.unwrap();
    assert_eq!(same, UpdateOutcome::Skipped);

    manager
        .handle_viewport(Viewport::new(1920, 1080))
        .await
        .unwrap();
    assert_eq!(
        manager.current_constraint(),
        Some(Constraint::landscape(1920))
    );
    assert_eq!(
        source.requested_keys(),
        vec![
            "images/lake.jpg?height=736".to_string(),
            "images/lake.jpg?width=1920".to_string(),
        ]
    );
}

#[tokio::test]
async fn failure_before_first_image_shows_fallback() {
    let source = Arc::new(FakeSource::new());
    source.fail_with(Some(BackdropError::Network("connection refused".to_string())));
    let (manager, surface) = manager(source.clone(), 8);

    let err = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap_err();
    assert_eq!(err.class(), Some(FailureClass::Network));
    assert_eq!(manager.state(), BackgroundState::Fallback);
    assert_eq!(manager.last_error(), Some(err));
    assert!(matches!(surface.top(), Some(Layer::Fallback)));
    assert_eq!(surface.legend(), Some(fallback_legend()));

    // Fallback is not a satisfied constraint: the same breakpoint retries.
    source.fail_with(None);
    let retried = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert!(matches!(retried, UpdateOutcome::Applied { .. }));
    assert!(matches!(surface.top(), Some(Layer::Image(_))));
}

#[tokio::test]
async fn failed_upgrade_keeps_current_background() {
    let source = Arc::new(FakeSource::new());
    let (manager, surface) = manager(source.clone(), 8);

    manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    source.fail_with(Some(BackdropError::Http {
        status: 502,
        url: "http://localhost/images/lake.jpg?height=736".to_string(),
    }));

    assert!(manager
        .update_constraint(Constraint::portrait(736))
        .await
        .is_err());
    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(480)));
    assert_eq!(surface.layers().len(), 1);
    assert!(manager.last_error().is_some());
}

#[tokio::test]
async fn undecodable_body_is_a_decode_failure() {
    let source = Arc::new(FakeSource::new().with_body(b"<html>oops</html>".to_vec()));
    let (manager, surface) = manager(source, 8);

    let err = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap_err();
    assert_eq!(err.class(), Some(FailureClass::Decode));
    assert!(matches!(surface.top(), Some(Layer::Fallback)));
}

#[tokio::test]
async fn later_dispatch_wins_over_slow_earlier_fetch() {
    let source = Arc::new(FakeSource::new());
    let gate = source.gate("images/lake.jpg?height=736");
    let (manager, surface) = manager(source.clone(), 8);
    let manager = Arc::new(manager);

    let slow_manager = manager.clone();
    let slow = tokio::spawn(async move {
        slow_manager
            .update_constraint(Constraint::portrait(736))
            .await
    });

    while source.requested_keys().is_empty() {
        tokio::task::yield_now().await;
    }

    let fast = manager
        .update_constraint(Constraint::landscape(1280))
        .await
        .unwrap();
    assert!(matches!(fast, UpdateOutcome::Applied { .. }));

    gate.notify_one();
    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow, UpdateOutcome::Superseded);

    assert_eq!(
        manager.current_constraint(),
        Some(Constraint::landscape(1280))
    );
    assert_eq!(surface.layers().len(), 1);
}

#[tokio::test]
async fn superseded_failure_is_not_applied() {
    let source = Arc::new(FakeSource::new());
    let gate = source.gate("images/lake.jpg?height=480");
    let (manager, surface) = manager(source.clone(), 8);
    let manager = Arc::new(manager);

    let slow_manager = manager.clone();
    let slow = tokio::spawn(async move {
        slow_manager
            .update_constraint(Constraint::portrait(480))
            .await
    });
    while source.requested_keys().is_empty() {
        tokio::task::yield_now().await;
    }

    manager
        .update_constraint(Constraint::landscape(980))
        .await
        .unwrap();

    source.fail_with(Some(BackdropError::Network("reset".to_string())));
    gate.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), UpdateOutcome::Superseded);

    assert_eq!(manager.last_error(), None);
    assert!(matches!(surface.top(), Some(Layer::Image(_))));
}

#[tokio::test]
async fn rotating_back_cancels_outstanding_fetch() {
    let source = Arc::new(FakeSource::new());
    let gate = source.gate("images/lake.jpg?width=1280");
    let (manager, surface) = manager(source.clone(), 8);
    let manager = Arc::new(manager);

    manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();

    let slow_manager = manager.clone();
    let slow = tokio::spawn(async move {
        slow_manager
            .update_constraint(Constraint::landscape(1280))
            .await
    });
    while source.requested_keys().len() < 2 {
        tokio::task::yield_now().await;
    }
    assert_eq!(
        manager.pending_constraint(),
        Some(Constraint::landscape(1280))
    );

    let back = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert_eq!(back, UpdateOutcome::Skipped);
    assert_eq!(manager.pending_constraint(), None);

    gate.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), UpdateOutcome::Superseded);

    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(480)));
    assert_eq!(surface.layers().len(), 1);
}

#[tokio::test]
async fn shrinking_while_growth_is_pending_keeps_shown_background() {
    let source = Arc::new(FakeSource::new());
    let gate = source.gate("images/lake.jpg?height=736");
    let (manager, surface) = manager(source.clone(), 8);
    let manager = Arc::new(manager);

    manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();

    let slow_manager = manager.clone();
    let slow = tokio::spawn(async move {
        slow_manager
            .update_constraint(Constraint::portrait(736))
            .await
    });
    while source.requested_keys().len() < 2 {
        tokio::task::yield_now().await;
    }

    let shrunk = manager
        .update_constraint(Constraint::portrait(480))
        .await
        .unwrap();
    assert_eq!(shrunk, UpdateOutcome::Skipped);

    gate.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), UpdateOutcome::Superseded);
    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(480)));
    assert_eq!(surface.layers().len(), 1);
    assert_eq!(source.requested_keys().len(), 2);
}

#[tokio::test]
async fn constraint_covered_by_pending_fetch_is_not_dispatched_again() {
    let source = Arc::new(FakeSource::new());
    let gate = source.gate("images/lake.jpg?height=736");
    let (manager, surface) = manager(source.clone(), 8);
    let manager = Arc::new(manager);

    let slow_manager = manager.clone();
    let slow = tokio::spawn(async move {
        slow_manager
            .update_constraint(Constraint::portrait(736))
            .await
    });
    while source.requested_keys().is_empty() {
        tokio::task::yield_now().await;
    }

    // Nothing is shown yet; the outstanding 736 fetch covers both requests.
    for c in [Constraint::portrait(736), Constraint::portrait(480)] {
        assert_eq!(
            manager.update_constraint(c).await.unwrap(),
            UpdateOutcome::Skipped
        );
    }

    gate.notify_one();
    assert!(matches!(
        slow.await.unwrap().unwrap(),
        UpdateOutcome::Applied { .. }
    ));
    assert_eq!(manager.current_constraint(), Some(Constraint::portrait(736)));
    assert_eq!(manager.pending_constraint(), None);
    assert_eq!(surface.layers().len(), 1);
    assert_eq!(source.requested_keys().len(), 1);
}
