//! Window manipulation by vertical swipe: up maximizes, down restores, and
//! a further down on an unmaximized window minimizes when allowed.

use crate::gesture::registry::{
    ConsumerDescriptor, GestureConsumer, GestureCx, GestureOutcome, Registration,
};
use crate::gesture::{SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_HEIGHT};

pub fn registration(
    fingers: Vec<u32>,
    orientation: Orientation,
    allow_minimize: bool,
    speed_multiplier: f64,
) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Swipe,
            fingers,
            orientation,
            modes: ActionMode::NORMAL,
            natural_scroll: false,
            speed_multiplier,
        },
        consumer: Box::new(WindowManipulation { allow_minimize }),
    }
}

struct WindowManipulation {
    allow_minimize: bool,
}

impl GestureConsumer for WindowManipulation {
    fn allowed(&self, host: &Host, _event: &GestureEvent, _cx: &GestureCx) -> bool {
        host.compositor.focused_window_exists()
    }

    fn begin(
        &mut self,
        _host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        _event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        confirm.confirm_swipe(TOUCHPAD_BASE_HEIGHT, vec![-1.0, 0.0, 1.0], 0.0, 0.0)
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        if outcome.cancelled {
            return;
        }
        if outcome.progress <= -1.0 {
            // Up.
            if !host.compositor.focused_is_maximized() {
                host.compositor.maximize_focused();
            }
        } else if outcome.progress >= 1.0 {
            // Down.
            if host.compositor.focused_is_maximized() {
                host.compositor.unmaximize_focused();
            } else if self.allow_minimize {
                host.compositor.minimize_focused();
            }
        }
    }
}
