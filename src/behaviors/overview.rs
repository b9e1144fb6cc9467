//! Overview navigation.
//!
//! The host session confirms with its own overview geometry; a
//! [`SnapOverride`] imposes the configured state list instead. The cyclic
//! list adds two virtual states past the real ends so a single long swipe
//! round-trips HIDDEN -> WINDOW_PICKER -> APP_GRID -> HIDDEN; while the
//! gesture is live a [`TransitionStrategy`] folds the virtual range back
//! into renderable progress.

use touchflow_config::OverviewNavigation;

use crate::gesture::registry::{ConsumerDescriptor, GestureConsumer, GestureOutcome, Registration};
use crate::gesture::{SnapOverride, SwipeConfirm, TrackerError};
use crate::host::{overview_state, ActionMode, Host, TransitionStrategy};
use crate::input::{GestureEvent, GestureKind, Orientation};

pub fn registration(
    fingers: Vec<u32>,
    orientation: Orientation,
    states: OverviewNavigation,
    natural_scroll: bool,
    speed_multiplier: f64,
) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Swipe,
            fingers,
            orientation,
            modes: ActionMode::NORMAL | ActionMode::OVERVIEW,
            natural_scroll,
            speed_multiplier,
        },
        consumer: Box::new(OverviewNavigate { states, strategy_installed: false }),
    }
}

/// Folds the cyclic virtual states back into the real [0, 2] range while
/// the gesture renders. The factor of two keeps the round trip's pace: one
/// unit of travel through a virtual interval crosses two real states.
struct CyclicStrategy;

impl TransitionStrategy for CyclicStrategy {
    fn render_progress(&self, raw: f64) -> f64 {
        if raw < overview_state::HIDDEN {
            ((overview_state::HIDDEN - raw) * 2.0).min(overview_state::APP_GRID)
        } else if raw > overview_state::APP_GRID {
            (overview_state::APP_GRID - (raw - overview_state::APP_GRID) * 2.0)
                .max(overview_state::HIDDEN)
        } else {
            raw
        }
    }
}

/// Maps a resolved snap point onto the real state it stands for.
fn normalize_state(progress: f64) -> f64 {
    if progress == overview_state::APP_GRID_PREV {
        overview_state::APP_GRID
    } else if progress == overview_state::HIDDEN_NEXT {
        overview_state::HIDDEN
    } else {
        progress
    }
}

struct OverviewNavigate {
    states: OverviewNavigation,
    strategy_installed: bool,
}

impl OverviewNavigate {
    fn snap_points(&self) -> Vec<f64> {
        use overview_state::{APP_GRID, APP_GRID_PREV, HIDDEN, HIDDEN_NEXT, WINDOW_PICKER};
        match self.states {
            OverviewNavigation::Gnome => vec![HIDDEN, WINDOW_PICKER, APP_GRID],
            OverviewNavigation::WindowPickerOnly => vec![HIDDEN, WINDOW_PICKER],
            OverviewNavigation::Cyclic => {
                vec![APP_GRID_PREV, HIDDEN, WINDOW_PICKER, APP_GRID, HIDDEN_NEXT]
            }
        }
    }

    fn clear_strategy(&mut self, host: &mut Host) {
        if self.strategy_installed {
            host.compositor.set_transition_strategy(None);
            self.strategy_installed = false;
        }
    }
}

impl GestureConsumer for OverviewNavigate {
    fn allowed(
        &self,
        host: &Host,
        _event: &GestureEvent,
        _cx: &crate::gesture::registry::GestureCx,
    ) -> bool {
        !host.compositor.search_active()
    }

    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        _event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        let mut override_snaps = SnapOverride::new(confirm, self.snap_points());
        host.compositor.overview_begin(&mut override_snaps)?;
        if self.states == OverviewNavigation::Cyclic {
            host.compositor
                .set_transition_strategy(Some(Box::new(CyclicStrategy)));
            self.strategy_installed = true;
        }
        Ok(())
    }

    fn update(&mut self, host: &mut Host, progress: f64, _event: &GestureEvent) {
        host.compositor.overview_update(progress);
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        let state = normalize_state(outcome.progress);
        host.compositor.overview_end(outcome.duration, state);
        self.clear_strategy(host);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.clear_strategy(host);
    }
}
