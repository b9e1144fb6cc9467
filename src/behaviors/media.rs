//! Media control: scrub for next/previous track, plus two play/pause
//! paths (a quick there-and-back reversal, and a brief multi-finger hold).

use crate::gesture::registry::{ConsumerDescriptor, GestureConsumer, GestureOutcome, Registration};
use crate::gesture::{SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host, MediaAction};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_HEIGHT, TOUCHPAD_BASE_WIDTH};

pub fn registration(
    fingers: Vec<u32>,
    orientation: Orientation,
    inverted: bool,
    speed_multiplier: f64,
) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Swipe,
            fingers,
            orientation,
            modes: ActionMode::NORMAL | ActionMode::OVERVIEW,
            natural_scroll: !inverted,
            speed_multiplier,
        },
        consumer: Box::new(MediaControl),
    }
}

/// The brief-hold play/pause tap.
pub fn tap_registration(fingers: u32) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Hold,
            fingers: vec![fingers],
            orientation: Orientation::None,
            modes: ActionMode::NORMAL | ActionMode::OVERVIEW,
            natural_scroll: false,
            speed_multiplier: 1.0,
        },
        consumer: Box::new(MediaTap),
    }
}

struct MediaControl;

impl GestureConsumer for MediaControl {
    fn begin(
        &mut self,
        _host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        let distance = match event.orientation {
            Orientation::Horizontal => TOUCHPAD_BASE_WIDTH,
            _ => TOUCHPAD_BASE_HEIGHT,
        };
        confirm.confirm_swipe(distance, vec![-1.0, 0.0, 1.0], 0.0, 0.0)
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        if outcome.cancelled {
            return;
        }
        if outcome.toggled {
            host.media.call(MediaAction::PlayPause);
        } else if outcome.progress >= 1.0 {
            host.media.call(MediaAction::Next);
        } else if outcome.progress <= -1.0 {
            host.media.call(MediaAction::Previous);
        }
    }
}

struct MediaTap;

impl GestureConsumer for MediaTap {
    fn begin(
        &mut self,
        _host: &mut Host,
        _confirm: &mut dyn SwipeConfirm,
        _event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        // Holds carry no progress; only `tap` does anything.
        Ok(())
    }

    fn tap(&mut self, host: &mut Host, _event: &GestureEvent) {
        host.media.call(MediaAction::PlayPause);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gesture::SwipeTracker;
    use crate::host::headless::{self, HostAction};
    use crate::input::GesturePhase;

    fn outcome(progress: f64, toggled: bool) -> GestureOutcome {
        GestureOutcome {
            progress,
            duration: Duration::from_millis(300),
            cancelled: false,
            toggled,
        }
    }

    fn event() -> GestureEvent {
        GestureEvent {
            phase: GesturePhase::Begin,
            kind: GestureKind::Swipe,
            fingers: 3,
            orientation: Orientation::Horizontal,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time: Duration::ZERO,
        }
    }

    #[test]
    fn resolved_endpoints_skip_tracks() {
        let (mut host, log, _) = headless::host();
        let mut consumer = MediaControl;
        consumer.end(&mut host, &outcome(1.0, false));
        consumer.end(&mut host, &outcome(-1.0, false));
        assert_eq!(
            log.take(),
            vec![
                HostAction::Media(MediaAction::Next),
                HostAction::Media(MediaAction::Previous)
            ]
        );
    }

    #[test]
    fn returning_to_center_does_nothing() {
        let (mut host, log, _) = headless::host();
        let mut consumer = MediaControl;
        consumer.end(&mut host, &outcome(0.0, false));
        assert!(log.take().is_empty());
    }

    #[test]
    fn reversal_toggle_wins_over_the_snap_point() {
        let (mut host, log, _) = headless::host();
        let mut consumer = MediaControl;
        consumer.end(&mut host, &outcome(0.0, true));
        assert_eq!(log.take(), vec![HostAction::Media(MediaAction::PlayPause)]);
    }

    #[test]
    fn cancelled_gesture_does_nothing() {
        let (mut host, log, _) = headless::host();
        let mut consumer = MediaControl;
        consumer.end(
            &mut host,
            &GestureOutcome {
                progress: 0.0,
                duration: Duration::from_millis(100),
                cancelled: true,
                toggled: true,
            },
        );
        assert!(log.take().is_empty());
    }

    #[test]
    fn hold_tap_toggles_playback() {
        let (mut host, log, _) = headless::host();
        let mut consumer = MediaTap;
        consumer.tap(&mut host, &event());
        assert_eq!(log.take(), vec![HostAction::Media(MediaAction::PlayPause)]);
    }
}
