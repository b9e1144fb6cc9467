//! Window switching by scrubbing through the switcher popup.
//!
//! The switcher list is mapped onto the [0, 1] progress range with one
//! dummy slot on each side, so the first and last real windows keep a full
//! selection interval instead of a half-open sliver at the edges. Selection
//! only starts after a short delay; a gesture released before the delay
//! leaves the desktop untouched.

use std::time::Duration;

use crate::gesture::registry::{
    ConsumerDescriptor, GestureConsumer, GestureCx, GestureOutcome, Registration,
};
use crate::gesture::{progress, SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_WIDTH};

/// Virtual entries flanking the real window list on each side.
const DUMMY_WIN_COUNT: usize = 1;

/// Below this many windows the scrub distance stops shrinking, so short
/// lists do not become twitchy.
const MIN_WIN_COUNT: usize = 16;

pub fn registration(
    fingers: Vec<u32>,
    orientation: Orientation,
    delay_ms: u64,
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
        consumer: Box::new(WindowSwitcher {
            delay: Duration::from_millis(delay_ms),
            state: SwitcherState::Inactive,
            windows: 0,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitcherState {
    Inactive,
    /// Open but not yet scrubbing; updates before `began + delay` are
    /// swallowed.
    Delay { began: Duration },
    Active,
}

struct WindowSwitcher {
    delay: Duration,
    state: SwitcherState,
    windows: usize,
}

/// Progress at the center of `index`'s selection interval.
fn avg_progress(index: usize, windows: usize) -> f64 {
    let total = (windows + 2 * DUMMY_WIN_COUNT) as f64;
    (index as f64 + DUMMY_WIN_COUNT as f64 + 0.5) / total
}

/// Window index selected by `progress`, clamped to the real list.
fn index_for(progress: f64, windows: usize) -> usize {
    let total = (windows + 2 * DUMMY_WIN_COUNT) as f64;
    let raw = (progress * total).floor() as isize - DUMMY_WIN_COUNT as isize;
    raw.clamp(0, windows as isize - 1) as usize
}

impl GestureConsumer for WindowSwitcher {
    fn allowed(&self, host: &Host, _event: &GestureEvent, cx: &GestureCx) -> bool {
        // A hold-and-swipe belongs to the forward/back gesture.
        !cx.hold_and_swipe && !host.compositor.search_active()
    }

    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        let windows = host.compositor.switcher_open();
        if windows == 0 {
            host.compositor.switcher_close();
            return Ok(());
        }
        self.windows = windows;
        self.state = SwitcherState::Delay { began: event.time };
        host.osd.hide_all();

        let total = windows + 2 * DUMMY_WIN_COUNT;
        let distance =
            TOUCHPAD_BASE_WIDTH * (total as f64 / MIN_WIN_COUNT as f64).max(1.0);
        // Selection starts on the window after the focused one.
        let initial = avg_progress(1.min(windows - 1), windows);
        confirm.confirm_swipe(distance, vec![0.0, 1.0], initial, initial)
    }

    fn update(&mut self, host: &mut Host, progress: f64, event: &GestureEvent) {
        match self.state {
            SwitcherState::Inactive => return,
            SwitcherState::Delay { began } => {
                if event.time.saturating_sub(began) < self.delay {
                    return;
                }
                self.state = SwitcherState::Active;
            }
            SwitcherState::Active => {}
        }
        let progress = progress::clamp_to_range(progress, &[0.0, 1.0]);
        host.compositor.switcher_select(index_for(progress, self.windows));
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        let state = std::mem::replace(&mut self.state, SwitcherState::Inactive);
        if state == SwitcherState::Inactive {
            return;
        }
        if outcome.cancelled || matches!(state, SwitcherState::Delay { .. }) {
            host.compositor.switcher_close();
        } else {
            host.compositor
                .switcher_select(index_for(outcome.progress, self.windows));
            host.compositor.switcher_activate();
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        if self.state != SwitcherState::Inactive {
            self.state = SwitcherState::Inactive;
            host.compositor.switcher_close();
        }
    }
}

#[cfg(test)]
mod tests {
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
            fingers: 4,
            orientation: Orientation::Horizontal,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time,
        }
    }

    fn switcher() -> WindowSwitcher {
        WindowSwitcher {
            delay: ms(100),
            state: SwitcherState::Inactive,
            windows: 0,
        }
    }

    #[test]
    fn index_mapping_round_trips() {
        for windows in [1, 2, 4, 16, 40] {
            for index in 0..windows {
                assert_eq!(index_for(avg_progress(index, windows), windows), index);
            }
        }
    }

    #[test]
    fn index_mapping_clamps_the_dummy_slots() {
        assert_eq!(index_for(0.0, 4), 0);
        assert_eq!(index_for(0.05, 4), 0);
        assert_eq!(index_for(1.0, 4), 3);
        assert_eq!(index_for(0.99, 4), 3);
    }

    #[test]
    fn begin_opens_switcher_and_hides_osd() {
        let (mut host, log, _) = headless::host();
        let mut consumer = switcher();
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        assert_eq!(log.take(), vec![HostAction::SwitcherOpen, HostAction::OsdHideAll]);
        assert!(tracker.is_armed());
        // Four windows: seeded on the second entry.
        assert!((tracker.progress() - avg_progress(1, 4)).abs() < 1e-9);
    }

    #[test]
    fn updates_within_the_delay_do_not_select() {
        let (mut host, log, _) = headless::host();
        let mut consumer = switcher();
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        log.take();

        consumer.update(&mut host, 0.9, &event(ms(50)));
        assert!(log.take().is_empty());

        consumer.update(&mut host, 0.9, &event(ms(150)));
        assert_eq!(log.take(), vec![HostAction::SwitcherSelect(3)]);
    }

    #[test]
    fn end_activates_the_selection() {
        let (mut host, log, _) = headless::host();
        let mut consumer = switcher();
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        consumer.update(&mut host, 0.5, &event(ms(200)));
        log.take();

        consumer.end(
            &mut host,
            &GestureOutcome {
                progress: avg_progress(2, 4),
                duration: ms(400),
                cancelled: false,
                toggled: false,
            },
        );
        assert_eq!(
            log.take(),
            vec![HostAction::SwitcherSelect(2), HostAction::SwitcherActivate]
        );
    }

    #[test]
    fn quick_release_within_the_delay_closes_quietly() {
        let (mut host, log, _) = headless::host();
        let mut consumer = switcher();
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        log.take();

        consumer.end(
            &mut host,
            &GestureOutcome {
                progress: 0.5,
                duration: ms(60),
                cancelled: false,
                toggled: false,
            },
        );
        assert_eq!(log.take(), vec![HostAction::SwitcherClose]);
    }

    #[test]
    fn empty_window_list_declines_the_gesture() {
        let (mut host, _, state) = headless::host();
        state.borrow_mut().switcher_windows = 0;
        let mut consumer = switcher();
        let mut tracker = SwipeTracker::new(1.0, false);
        consumer.begin(&mut host, &mut tracker, &event(ms(0))).unwrap();
        assert!(!tracker.is_armed());
    }
}
