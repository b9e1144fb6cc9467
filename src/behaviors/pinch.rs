//! Pinch actions.
//!
//! Progress is seeded at 1.0 (the neutral pinch scale) over [0, 2]; a pinch
//! in drives it toward 0, which is where all three actions fire. A pinch
//! released back at 1.0 or stretched out to 2.0 does nothing.

use touchflow_config::PinchGesture;

use crate::gesture::registry::{
    ConsumerDescriptor, GestureConsumer, GestureCx, GestureOutcome, Registration,
};
use crate::gesture::{SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host, Key};
use crate::input::{GestureEvent, GestureKind, Orientation};

pub fn registration(gesture: PinchGesture, fingers: Vec<u32>, speed_multiplier: f64) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Pinch,
            fingers,
            orientation: Orientation::None,
            modes: ActionMode::NORMAL,
            natural_scroll: false,
            speed_multiplier,
        },
        consumer: Box::new(PinchAction { gesture }),
    }
}

struct PinchAction {
    gesture: PinchGesture,
}

impl GestureConsumer for PinchAction {
    fn allowed(&self, host: &Host, _event: &GestureEvent, _cx: &GestureCx) -> bool {
        match self.gesture {
            PinchGesture::ShowDesktop => true,
            PinchGesture::CloseWindow | PinchGesture::CloseDocument => {
                host.compositor.focused_window_exists()
            }
            PinchGesture::None => false,
        }
    }

    fn begin(
        &mut self,
        _host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        _event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        // Scale deltas map 1:1 onto progress.
        confirm.confirm_swipe(1.0, vec![0.0, 1.0, 2.0], 1.0, 1.0)
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        if outcome.cancelled || outcome.progress > 0.0 {
            return;
        }
        match self.gesture {
            PinchGesture::ShowDesktop => host.compositor.show_desktop(),
            PinchGesture::CloseWindow => host.compositor.close_focused(),
            PinchGesture::CloseDocument => host.keyboard.tap(&[Key::Ctrl, Key::KeyW]),
            PinchGesture::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gesture::SwipeTracker;
    use crate::host::headless::{self, HostAction};
    use crate::input::GesturePhase;

    fn outcome(progress: f64) -> GestureOutcome {
        GestureOutcome {
            progress,
            duration: Duration::from_millis(250),
            cancelled: false,
            toggled: false,
        }
    }

    fn event() -> GestureEvent {
        GestureEvent {
            phase: GesturePhase::Begin,
            kind: GestureKind::Pinch,
            fingers: 3,
            orientation: Orientation::None,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time: Duration::ZERO,
        }
    }

    #[test]
    fn begin_seeds_neutral_scale() {
        let (mut host, _, _) = headless::host();
        let mut consumer = PinchAction { gesture: PinchGesture::ShowDesktop };
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event()).unwrap();
        assert_eq!(tracker.progress(), 1.0);
        assert_eq!(tracker.snap_points(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn pinch_in_fires_the_action() {
        let (mut host, log, _) = headless::host();
        let mut consumer = PinchAction { gesture: PinchGesture::ShowDesktop };
        consumer.end(&mut host, &outcome(0.0));
        assert_eq!(log.take(), vec![HostAction::ShowDesktop]);

        let mut consumer = PinchAction { gesture: PinchGesture::CloseWindow };
        consumer.end(&mut host, &outcome(0.0));
        assert_eq!(log.take(), vec![HostAction::CloseWindow]);

        let mut consumer = PinchAction { gesture: PinchGesture::CloseDocument };
        consumer.end(&mut host, &outcome(0.0));
        assert_eq!(log.take(), vec![HostAction::Keys(vec![Key::Ctrl, Key::KeyW])]);
    }

    #[test]
    fn releasing_at_neutral_or_stretching_out_does_nothing() {
        let (mut host, log, _) = headless::host();
        let mut consumer = PinchAction { gesture: PinchGesture::CloseWindow };
        consumer.end(&mut host, &outcome(1.0));
        consumer.end(&mut host, &outcome(2.0));
        assert!(log.take().is_empty());
    }

    #[test]
    fn close_actions_need_a_focused_window() {
        let (host, _, state) = headless::host();
        state.borrow_mut().focused_window = false;
        let close = PinchAction { gesture: PinchGesture::CloseWindow };
        let show = PinchAction { gesture: PinchGesture::ShowDesktop };
        assert!(!close.allowed(&host, &event(), &GestureCx::default()));
        assert!(show.allowed(&host, &event(), &GestureCx::default()));
    }
}
