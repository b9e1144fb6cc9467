//! Consumer registration and gesture arbitration.
//!
//! At most one consumer owns a gesture instance. Swipes arbitrate lazily:
//! the registry buffers motion until the dominant axis is unambiguous, then
//! walks the slots in declared order and hands the gesture to the first one
//! that matches and accepts. Pinches and holds arbitrate at BEGIN.

use std::time::Duration;

use crate::gesture::heuristics::{HoldTap, ReversalDetector};
use crate::gesture::{EndResult, SwipeConfirm, SwipeTracker, TrackerError};
use crate::host::{ActionMode, Host};
use crate::input::{GestureEvent, GestureKind, GesturePhase, Orientation};

/// Accumulated motion (in raw units) before a swipe's axis is trusted.
pub const DRAG_THRESHOLD_DISTANCE: f64 = 16.0;

/// Per-gesture context available to `allowed` predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureCx {
    /// The gesture started within the hold-swipe delay of a hold release
    /// with the same finger count.
    pub hold_and_swipe: bool,
}

/// Static matching criteria for one consumer slot.
#[derive(Debug, Clone)]
pub struct ConsumerDescriptor {
    pub kind: GestureKind,
    pub fingers: Vec<u32>,
    /// Swipe only; pinches and holds ignore it.
    pub orientation: Orientation,
    pub modes: ActionMode,
    pub natural_scroll: bool,
    pub speed_multiplier: f64,
}

impl ConsumerDescriptor {
    fn matches(&self, event: &GestureEvent, mode: ActionMode) -> bool {
        self.kind == event.kind
            && self.fingers.contains(&event.fingers)
            && (self.kind != GestureKind::Swipe || self.orientation == event.orientation)
            && self.modes.intersects(mode)
    }
}

/// What the consumer learns when its gesture finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutcome {
    /// Resolved snap point, or the cancel progress for cancellations.
    pub progress: f64,
    pub duration: Duration,
    pub cancelled: bool,
    /// The gesture read as a quick there-and-back reversal.
    pub toggled: bool,
}

/// One gesture behavior. `begin` must call `confirm_swipe` on the handle it
/// is given to accept the gesture; leaving it unconfirmed declines without
/// blocking lower-priority slots on the next gesture.
pub trait GestureConsumer {
    fn allowed(&self, _host: &Host, _event: &GestureEvent, _cx: &GestureCx) -> bool {
        true
    }

    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError>;

    fn update(&mut self, _host: &mut Host, _progress: f64, _event: &GestureEvent) {}

    fn end(&mut self, _host: &mut Host, _outcome: &GestureOutcome) {}

    /// Hold-tap dispatch; only meaningful for [`GestureKind::Hold`] slots.
    fn tap(&mut self, _host: &mut Host, _event: &GestureEvent) {}

    /// Called when the consumer set is torn down (rebuild or shutdown).
    fn teardown(&mut self, _host: &mut Host) {}
}

pub struct Registration {
    pub descriptor: ConsumerDescriptor,
    pub consumer: Box<dyn GestureConsumer>,
}

struct ActiveBinding {
    slot: usize,
    tracker: SwipeTracker,
    kind: GestureKind,
    orientation: Orientation,
}

struct PendingSwipe {
    fingers: u32,
    dx: f64,
    dy: f64,
    began: Duration,
}

pub struct ConsumerRegistry {
    slots: Vec<Registration>,
    active: Option<ActiveBinding>,
    pending: Option<PendingSwipe>,
    hold_tap: HoldTap,
    last_hold_end: Option<(Duration, u32)>,
    hold_swipe_delay: Duration,
    reversal: ReversalDetector,
}

impl ConsumerRegistry {
    pub fn new(hold_swipe_delay: Duration) -> Self {
        Self {
            slots: Vec::new(),
            active: None,
            pending: None,
            hold_tap: HoldTap::default(),
            last_hold_end: None,
            hold_swipe_delay,
            reversal: ReversalDetector::default(),
        }
    }

    /// Replaces the consumer set. A gesture in flight is force-cancelled
    /// first so the outgoing consumer restores its pre-gesture state, then
    /// every outgoing consumer gets exactly one teardown.
    pub fn rebuild(
        &mut self,
        host: &mut Host,
        slots: Vec<Registration>,
        hold_swipe_delay: Duration,
    ) {
        self.force_cancel(host);
        for slot in &mut self.slots {
            slot.consumer.teardown(host);
        }
        self.slots = slots;
        self.pending = None;
        self.hold_tap.cancel();
        self.last_hold_end = None;
        self.hold_swipe_delay = hold_swipe_delay;
    }

    pub fn handle_event(&mut self, host: &mut Host, event: GestureEvent) {
        match (event.kind, event.phase) {
            (GestureKind::Swipe, GesturePhase::Begin) => {
                self.force_cancel(host);
                self.pending = Some(PendingSwipe {
                    fingers: event.fingers,
                    dx: 0.0,
                    dy: 0.0,
                    began: event.time,
                });
            }
            (GestureKind::Swipe, GesturePhase::Update) => {
                if self.active.is_some() {
                    self.deliver_update(host, event);
                } else {
                    self.accumulate_pending(host, event);
                }
            }
            (GestureKind::Swipe | GestureKind::Pinch, GesturePhase::End | GesturePhase::Cancel) => {
                self.pending = None;
                self.finish(host, event);
            }
            (GestureKind::Pinch, GesturePhase::Begin) => {
                self.force_cancel(host);
                self.arbitrate(host, event.with_orientation(Orientation::None));
            }
            (GestureKind::Pinch, GesturePhase::Update) => {
                self.deliver_update(host, event);
            }
            (GestureKind::Hold, GesturePhase::Begin) => {
                self.hold_tap.begin(event.time, event.fingers);
            }
            (GestureKind::Hold, GesturePhase::End) => {
                self.last_hold_end = Some((event.time, event.fingers));
                if self.hold_tap.end(event.time).is_some() {
                    self.dispatch_tap(host, event);
                }
            }
            (GestureKind::Hold, GesturePhase::Cancel) => {
                // Holds are cancelled when the fingers start moving; that is
                // exactly the hold-and-swipe case, so remember the release.
                self.last_hold_end = Some((event.time, event.fingers));
                self.hold_tap.cancel();
            }
            (GestureKind::Hold, GesturePhase::Update) => {}
        }
    }

    fn accumulate_pending(&mut self, host: &mut Host, event: GestureEvent) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.dx += event.dx;
        pending.dy += event.dy;
        if pending.dx.hypot(pending.dy) < DRAG_THRESHOLD_DISTANCE {
            return;
        }

        let pending = self.pending.take().unwrap();
        let orientation = if pending.dx.abs() > pending.dy.abs() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let begin = GestureEvent {
            phase: GesturePhase::Begin,
            kind: GestureKind::Swipe,
            fingers: pending.fingers,
            orientation,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time: pending.began,
        };
        self.arbitrate(host, begin);

        if self.active.is_some() {
            // Replay the buffered motion as the first update.
            let mut replay = event.with_orientation(orientation);
            replay.dx = pending.dx;
            replay.dy = pending.dy;
            self.deliver_update(host, replay);
        }
    }

    /// Walks the slots in declared order and binds the first one that
    /// matches, is allowed, and confirms.
    fn arbitrate(&mut self, host: &mut Host, event: GestureEvent) {
        let mode = host.compositor.action_mode();
        let cx = GestureCx {
            hold_and_swipe: self.last_hold_end.is_some_and(|(time, fingers)| {
                fingers == event.fingers
                    && event.time.saturating_sub(time) <= self.hold_swipe_delay
            }),
        };

        let Some(slot) = self.slots.iter().position(|slot| {
            slot.descriptor.matches(&event, mode) && slot.consumer.allowed(host, &event, &cx)
        }) else {
            trace!(?event.kind, event.fingers, "no consumer claimed the gesture");
            return;
        };

        let descriptor = &self.slots[slot].descriptor;
        let mut tracker =
            SwipeTracker::new(descriptor.speed_multiplier, descriptor.natural_scroll);
        if let Err(err) = self.slots[slot].consumer.begin(host, &mut tracker, &event) {
            warn!(?err, slot, "gesture consumer failed to arm");
            return;
        }
        if !tracker.is_armed() {
            // The consumer looked at the session and declined.
            return;
        }

        self.reversal.reset(event.time, tracker.progress());
        self.active = Some(ActiveBinding {
            slot,
            tracker,
            kind: event.kind,
            orientation: event.orientation,
        });
    }

    fn deliver_update(&mut self, host: &mut Host, event: GestureEvent) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.kind != event.kind {
            return;
        }
        let delta = event.axis_delta(active.orientation);
        match active.tracker.update(delta, event.time) {
            Ok(progress) => {
                self.reversal.observe(progress, event.time);
                let event = event.with_orientation(active.orientation);
                self.slots[active.slot].consumer.update(host, progress, &event);
            }
            Err(err) => error!(?err, "gesture update on an unarmed tracker"),
        }
    }

    fn finish(&mut self, host: &mut Host, event: GestureEvent) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        if active.kind != event.kind {
            self.active = Some(active);
            return;
        }
        let result = if event.phase == GesturePhase::Cancel {
            active.tracker.cancel(event.time)
        } else {
            active.tracker.end(event.time)
        };
        match result {
            Ok(result) => self.deliver_end(host, active.slot, &result, event.time),
            Err(err) => error!(?err, "gesture end on an unarmed tracker"),
        }
    }

    /// Cancels a gesture in flight, if any. Safe to call at any time; the
    /// consumer sees exactly one END with `cancelled` set.
    fn force_cancel(&mut self, host: &mut Host) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let now = crate::utils::get_monotonic_time();
        match active.tracker.cancel(now) {
            Ok(result) => self.deliver_end(host, active.slot, &result, now),
            Err(err) => error!(?err, "force-cancel on an unarmed tracker"),
        }
    }

    fn deliver_end(&mut self, host: &mut Host, slot: usize, result: &EndResult, time: Duration) {
        let outcome = GestureOutcome {
            progress: result.progress,
            duration: result.duration,
            cancelled: result.cancelled,
            toggled: !result.cancelled && self.reversal.is_toggle(time),
        };
        self.slots[slot].consumer.end(host, &outcome);
    }

    fn dispatch_tap(&mut self, host: &mut Host, event: GestureEvent) {
        let mode = host.compositor.action_mode();
        let cx = GestureCx::default();
        let slot = self.slots.iter().position(|slot| {
            slot.descriptor.matches(&event, mode) && slot.consumer.allowed(host, &event, &cx)
        });
        if let Some(slot) = slot {
            self.slots[slot].consumer.tap(host, &event);
        }
    }
}
