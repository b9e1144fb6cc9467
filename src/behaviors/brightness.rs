//! Backlight scrubbing with an OSD readout.
//!
//! Progress runs over the percentage range directly (the wiring multiplies
//! the configured speed by 100 to match), and the gesture declines on
//! machines without a backlight.

use crate::gesture::registry::{ConsumerDescriptor, GestureConsumer, GestureOutcome, Registration};
use crate::gesture::{progress, SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host, OsdThrottle};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_HEIGHT, TOUCHPAD_BASE_WIDTH};

const SNAP_POINTS: [f64; 2] = [0.0, 100.0];
const ICON: &str = "display-brightness-symbolic";

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
            // Snap points span a hundred units instead of one.
            speed_multiplier: speed_multiplier * 100.0,
        },
        consumer: Box::new(BrightnessControl { throttle: OsdThrottle::new() }),
    }
}

struct BrightnessControl {
    throttle: OsdThrottle,
}

impl BrightnessControl {
    fn apply(&mut self, host: &mut Host, progress: f64, osd_time: Option<std::time::Duration>) {
        let percent = progress::clamp_to_range(progress, &SNAP_POINTS).round();
        host.brightness.set_brightness(percent);

        let draw = match osd_time {
            Some(time) => self.throttle.ready(time),
            None => true,
        };
        if draw {
            let monitor = host.compositor.active_monitor();
            host.osd.show(monitor, ICON, None, percent / 100.0);
        }
    }
}

impl GestureConsumer for BrightnessControl {
    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        // No backlight exposed: decline, the gesture falls through.
        let Some(current) = host.brightness.brightness() else {
            return Ok(());
        };
        self.throttle = OsdThrottle::new();
        let distance = match event.orientation {
            Orientation::Horizontal => TOUCHPAD_BASE_WIDTH,
            _ => TOUCHPAD_BASE_HEIGHT,
        };
        let current = current.clamp(0.0, 100.0);
        confirm.confirm_swipe(distance, SNAP_POINTS.to_vec(), current, current)
    }

    fn update(&mut self, host: &mut Host, progress: f64, event: &GestureEvent) {
        self.apply(host, progress, Some(event.time));
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        self.apply(host, outcome.progress, None);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gesture::SwipeTracker;
    use crate::host::headless::{self, HostAction};
    use crate::input::GesturePhase;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn event(time: Duration) -> GestureEvent {
        GestureEvent {
            phase: GesturePhase::Update,
            kind: GestureKind::Swipe,
            fingers: 3,
            orientation: Orientation::Vertical,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time,
        }
    }

    #[test]
    fn begin_seeds_progress_from_current_brightness() {
        let (mut host, _, state) = headless::host();
        state.borrow_mut().brightness = Some(70.0);
        let mut consumer = BrightnessControl { throttle: OsdThrottle::new() };
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        assert!((tracker.progress() - 70.0).abs() < 1e-9);
        assert_eq!(tracker.snap_points(), &[0.0, 100.0]);
    }

    #[test]
    fn missing_backlight_declines_the_gesture() {
        let (mut host, _, state) = headless::host();
        state.borrow_mut().brightness = None;
        let mut consumer = BrightnessControl { throttle: OsdThrottle::new() };
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        assert!(!tracker.is_armed());
    }

    #[test]
    fn updates_round_and_clamp_the_percentage() {
        let (mut host, log, _) = headless::host();
        let mut consumer = BrightnessControl { throttle: OsdThrottle::new() };
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        log.take();

        consumer.update(&mut host, 41.4, &event(ms(10)));
        assert!(log.take().contains(&HostAction::SetBrightness(41.0)));

        consumer.update(&mut host, 130.0, &event(ms(100)));
        assert!(log.take().contains(&HostAction::SetBrightness(100.0)));
    }

    #[test]
    fn osd_level_is_normalized() {
        let (mut host, log, _) = headless::host();
        let mut consumer = BrightnessControl { throttle: OsdThrottle::new() };
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        log.take();

        consumer.update(&mut host, 60.0, &event(ms(10)));
        assert!(log.take().iter().any(
            |a| matches!(a, HostAction::OsdShow { icon, level } if icon == ICON && (*level - 0.6).abs() < 1e-9)
        ));
    }
}
