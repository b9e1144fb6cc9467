//! Workspace switching.
//!
//! The host confirms with the real workspace layout; an [`EndpointPadding`]
//! decorator widens the range by one on each side so the outermost
//! workspaces still have an interval to rubber-band into. Live overshoot is
//! rendered elastically and the resolved value is clamped back at END.

use std::time::Duration;

use crate::gesture::registry::{ConsumerDescriptor, GestureConsumer, GestureOutcome, Registration};
use crate::gesture::{EndpointPadding, SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host};
use crate::input::{GestureEvent, GestureKind, Orientation};

/// Fraction of overshoot past the outer workspaces that is rendered.
const ELASTIC_FACTOR: f64 = 0.05;

pub fn registration(
    fingers: Vec<u32>,
    orientation: Orientation,
    natural_scroll: bool,
    speed_multiplier: f64,
) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Swipe,
            fingers,
            orientation,
            modes: ActionMode::NORMAL,
            natural_scroll,
            speed_multiplier,
        },
        consumer: Box::new(WorkspaceSwitch::default()),
    }
}

#[derive(Debug, Default)]
struct WorkspaceSwitch {
    /// True first/last workspace indices, captured at confirmation.
    bounds: (f64, f64),
}

impl WorkspaceSwitch {
    fn damp(&self, progress: f64) -> f64 {
        let (first, last) = self.bounds;
        if progress < first {
            first + (progress - first) * ELASTIC_FACTOR
        } else if progress > last {
            last + (progress - last) * ELASTIC_FACTOR
        } else {
            progress
        }
    }
}

impl GestureConsumer for WorkspaceSwitch {
    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        _event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        let monitor = host.compositor.active_monitor();
        let mut padded = EndpointPadding::new(confirm);
        host.compositor.workspace_switch_begin(&mut padded, monitor)?;
        self.bounds = padded.bounds();
        Ok(())
    }

    fn update(&mut self, host: &mut Host, progress: f64, _event: &GestureEvent) {
        host.compositor.workspace_switch_update(self.damp(progress));
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        let (first, last) = self.bounds;
        let progress = outcome.progress.clamp(first, last);
        host.compositor.workspace_switch_end(outcome.duration, progress);
    }
}
