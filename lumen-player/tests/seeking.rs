mod support;

use lumen_model::{PlaybackState, ScrubState};
use lumen_player::{MediaEvent, PlayerMessage, TrackGeometry};
use support::Harness;

const TRACK: TrackGeometry = TrackGeometry {
    left: 0.0,
    width: 1000.0,
};

async fn playing(duration: f64) -> Harness {
    let mut h = Harness::new();
    h.load().await;
    h.start_playback(duration);
    h
}

#[tokio::test(start_paused = true)]
async fn drag_commits_release_position_and_resumes() {
    let mut h = playing(200.0).await;
    h.media.set_position(30.0);

    h.send(PlayerMessage::ScrubStart {
        pointer_x: 150.0,
        track: TRACK,
    });
    assert_eq!(h.media.pause_calls(), 1);
    assert_eq!(
        h.controller.scrub_state(),
        ScrubState::Dragging {
            preview_time: 30.0,
            was_playing: true,
        }
    );

    // The element confirms the pause; that is not a user pause
    h.media_event(MediaEvent::Pause);
    assert_eq!(h.controller.playback_state(), &PlaybackState::Playing);

    h.advance(20).await;
    h.send(PlayerMessage::ScrubMove { pointer_x: 450.0 });
    assert_eq!(h.controller.displayed_position(), 90.0);
    // Preview only: the element has not moved
    assert_eq!(h.media.position(), 30.0);

    h.send(PlayerMessage::ScrubEnd {
        pointer_x: Some(450.0),
    });
    assert_eq!(h.media.position(), 90.0);
    assert!(!h.media.is_paused());
    assert_eq!(h.controller.scrub_state(), ScrubState::Idle);
}

#[tokio::test(start_paused = true)]
async fn drag_from_paused_stays_paused() {
    let mut h = playing(200.0).await;
    h.send(PlayerMessage::Pause);
    h.media_event(MediaEvent::Pause);

    h.send(PlayerMessage::ScrubStart {
        pointer_x: 100.0,
        track: TRACK,
    });
    h.send(PlayerMessage::ScrubEnd { pointer_x: None });

    assert_eq!(h.media.position(), 20.0);
    assert!(h.media.is_paused());
}

#[tokio::test(start_paused = true)]
async fn timeupdates_during_drag_do_not_move_preview() {
    let mut h = playing(200.0).await;
    h.send(PlayerMessage::ScrubStart {
        pointer_x: 500.0,
        track: TRACK,
    });
    h.media.set_position(12.0);
    h.media_event(MediaEvent::TimeUpdate);

    assert_eq!(h.controller.displayed_position(), 100.0);
}

#[tokio::test(start_paused = true)]
async fn seeks_clamp_to_media_bounds() {
    let mut h = playing(120.0).await;

    h.send(PlayerMessage::SeekTo(500.0));
    assert_eq!(h.media.position(), 120.0);

    h.send(PlayerMessage::SeekTo(-3.0));
    assert_eq!(h.media.position(), 0.0);

    h.send(PlayerMessage::ScrubStart {
        pointer_x: -50.0,
        track: TRACK,
    });
    h.send(PlayerMessage::ScrubEnd {
        pointer_x: Some(2000.0),
    });
    assert_eq!(h.media.position(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn relative_steps() {
    let mut h = playing(600.0).await;
    h.media.set_position(100.0);

    h.send(PlayerMessage::SeekForward);
    assert_eq!(h.media.position(), 105.0);
    h.send(PlayerMessage::SeekBackwardLong);
    assert_eq!(h.media.position(), 95.0);
    h.send(PlayerMessage::SeekForwardLong);
    assert_eq!(h.media.position(), 105.0);
    h.send(PlayerMessage::SeekBackward);
    assert_eq!(h.media.position(), 100.0);
}

#[tokio::test(start_paused = true)]
async fn click_seeks_without_drag() {
    let mut h = playing(200.0).await;
    h.send(PlayerMessage::SeekBarClicked {
        pointer_x: 500.0,
        track: TRACK,
    });
    assert_eq!(h.media.position(), 100.0);
    assert!(!h.media.is_paused());
}

#[tokio::test(start_paused = true)]
async fn unknown_or_zero_duration_is_a_no_op() {
    for duration in [f64::NAN, 0.0] {
        let mut h = Harness::new();
        h.load().await;
        h.manifest();
        h.media.set_duration(duration);
        h.media_event(MediaEvent::LoadedMetadata);
        h.media_event(MediaEvent::Playing);

        h.send(PlayerMessage::SeekRelative(10.0));
        h.send(PlayerMessage::SeekForwardLong);
        h.send(PlayerMessage::ScrubStart {
            pointer_x: 300.0,
            track: TRACK,
        });
        h.send(PlayerMessage::ScrubEnd {
            pointer_x: Some(300.0),
        });

        assert!(h.media.seeks().is_empty());
        assert_eq!(h.controller.scrub_state(), ScrubState::Idle);
    }
}
