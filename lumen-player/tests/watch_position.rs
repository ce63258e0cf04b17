mod support;

use std::time::Duration;

use lumen_player::{MediaEvent, PlayerMessage};
use support::Harness;

#[tokio::test(start_paused = true)]
async fn explicit_start_time_wins_over_history() {
    let mut h = Harness::new();
    h.history.seed(h.target, 300.0);

    let source = h.source().with_start_time(120.0);
    h.controller.load(source).await.unwrap();
    h.start_playback(600.0);

    assert_eq!(h.history.reads(), 0);
    assert_eq!(h.media.seeks(), vec![120.0]);
}

#[tokio::test(start_paused = true)]
async fn resumes_from_history() {
    let mut h = Harness::new();
    h.history.seed(h.target, 300.0);
    h.load().await;
    h.start_playback(600.0);

    assert_eq!(h.history.reads(), 1);
    assert_eq!(h.media.seeks(), vec![300.0]);
}

#[tokio::test(start_paused = true)]
async fn failed_history_read_starts_at_zero() {
    let mut h = Harness::new();
    h.history.fail_reads(true);
    h.load().await;
    h.start_playback(600.0);

    assert!(h.media.seeks().is_empty());
    assert!(h.controller.session().is_some());
}

#[tokio::test(start_paused = true)]
async fn rapid_updates_produce_one_write() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(600.0);

    for second in 10..20 {
        h.media.set_position(f64::from(second));
        h.media_event(MediaEvent::TimeUpdate);
    }
    assert!(h.history.writes().is_empty());

    tokio::time::sleep(Duration::from_millis(5_100)).await;
    let writes = h.history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 19.0);
    assert!(!writes[0].completed);
}

#[tokio::test(start_paused = true)]
async fn small_moves_are_not_persisted() {
    let mut h = Harness::new();
    h.history.seed(h.target, 100.0);
    h.load().await;
    h.start_playback(600.0);

    h.media.set_position(103.0);
    h.media_event(MediaEvent::TimeUpdate);
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert!(h.history.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn completion_resets_position_once() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(100.0);

    h.media.set_position(96.0);
    h.media_event(MediaEvent::TimeUpdate);
    h.media.set_position(98.0);
    h.media_event(MediaEvent::TimeUpdate);
    h.media.set_position(100.0);
    h.media_event(MediaEvent::Ended);
    h.settle_writes().await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    let writes = h.history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 0.0);
    assert!(writes[0].completed);
    assert!(h.history.record(h.target).unwrap().completed);
}

#[tokio::test(start_paused = true)]
async fn pause_writes_immediately() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(600.0);

    h.media.set_position(42.0);
    h.media_event(MediaEvent::TimeUpdate);
    h.send(PlayerMessage::Pause);
    h.media_event(MediaEvent::Pause);
    h.settle_writes().await;

    let writes = h.history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 42.0);

    // The debounced write was superseded
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(h.history.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_flushes_position() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(600.0);
    h.media.set_position(77.0);

    h.send(PlayerMessage::Close);
    h.settle_writes().await;

    let writes = h.history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 77.0);
    assert_eq!(writes[0].target, h.target);
}

#[tokio::test(start_paused = true)]
async fn close_after_duration_lost_still_completes() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(100.0);
    h.media.set_position(97.0);
    h.media.set_duration(f64::NAN);

    h.send(PlayerMessage::Close);
    h.settle_writes().await;

    let writes = h.history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 0.0);
    assert!(writes[0].completed);
}

#[tokio::test(start_paused = true)]
async fn close_before_first_frame_writes_nothing() {
    let mut h = Harness::new();
    h.history.seed(h.target, 250.0);
    h.load().await;

    h.send(PlayerMessage::Close);
    h.settle_writes().await;

    assert!(h.history.writes().is_empty());
    assert_eq!(h.history.record(h.target).unwrap().watch_time_seconds, 250.0);
}

#[tokio::test(start_paused = true)]
async fn write_failures_are_not_surfaced() {
    let mut h = Harness::new();
    h.history.fail_writes(true);
    h.load().await;
    h.start_playback(600.0);

    h.media.set_position(50.0);
    h.send(PlayerMessage::Pause);
    h.media_event(MediaEvent::Pause);
    h.settle_writes().await;

    assert_eq!(h.history.writes().len(), 1);
    assert!(h.history.record(h.target).is_none());
    assert!(!h.controller.playback_state().is_error());
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_flushes_position() {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(600.0);
    h.media.set_position(64.0);

    let Harness {
        controller,
        history,
        ..
    } = h;
    drop(controller);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let writes = history.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].seconds, 64.0);
}
