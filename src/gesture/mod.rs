//! Gesture progress tracking and consumer arbitration.
//!
//! The [`SwipeTracker`] owns one gesture instance at a time: a consumer arms
//! it with a distance reference and snap points, raw deltas stream through
//! [`SwipeTracker::update`], and END resolves the terminal snap point. The
//! registry (see [`registry`]) owns the tracker and decides which consumer
//! gets it.

use std::collections::VecDeque;
use std::time::Duration;

pub mod heuristics;
pub mod progress;
pub mod registry;

/// Samples older than this are ignored when estimating release velocity.
const VELOCITY_WINDOW: Duration = Duration::from_millis(150);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrackerError {
    #[error("gesture operation '{0}' requires a confirmed tracker")]
    NotConfirmed(&'static str),
    #[error("tracker is already driving a gesture")]
    AlreadyConfirmed,
    #[error("snap points must be non-empty and strictly increasing")]
    InvalidSnapPoints,
    #[error("distance reference must be finite and positive, got {0}")]
    InvalidDistance(f64),
}

/// The arming half of the tracker's interface.
///
/// Consumers receive this at BEGIN instead of the whole tracker, so
/// decorators ([`EndpointPadding`], [`SnapOverride`]) can rewrite the snap
/// geometry without seeing progress updates.
pub trait SwipeConfirm {
    fn confirm_swipe(
        &mut self,
        distance: f64,
        snap_points: Vec<f64>,
        current_progress: f64,
        cancel_progress: f64,
    ) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Armed,
    Live,
}

/// What a finished gesture settled into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndResult {
    /// Resolved snap point (END) or the cancel progress (CANCEL).
    pub progress: f64,
    pub duration: Duration,
    pub cancelled: bool,
}

/// Recent progress deltas, pruned to [`VELOCITY_WINDOW`].
#[derive(Debug, Default)]
struct VelocityHistory {
    samples: VecDeque<(Duration, f64)>,
}

impl VelocityHistory {
    fn append(&mut self, time: Duration, delta: f64) {
        self.prune(time);
        self.samples.push_back((time, delta));
    }

    fn prune(&mut self, now: Duration) {
        while let Some(&(time, _)) = self.samples.front() {
            if time + VELOCITY_WINDOW < now {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Progress units per second over the retained window.
    fn velocity(&mut self, now: Duration) -> f64 {
        self.prune(now);
        let Some(&(oldest, _)) = self.samples.front() else {
            return 0.0;
        };
        let total: f64 = self.samples.iter().map(|&(_, delta)| delta).sum();
        let elapsed = now.saturating_sub(oldest).as_secs_f64();
        if elapsed <= f64::EPSILON {
            // All samples share one timestamp; treat the window as one frame.
            total / VELOCITY_WINDOW.as_secs_f64()
        } else {
            total / elapsed
        }
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Converts raw deltas into snap-relative progress for one gesture instance.
///
/// Unconfirmed trackers refuse updates; updates and END never run before a
/// consumer armed the tracker via [`SwipeConfirm::confirm_swipe`]. Progress
/// is deliberately not clamped here, so consumers can render elastic
/// overshoot past the outer snap points.
#[derive(Debug)]
pub struct SwipeTracker {
    phase: Phase,
    distance: f64,
    snap_points: Vec<f64>,
    progress: f64,
    cancel_progress: f64,
    speed_multiplier: f64,
    natural_scroll: bool,
    began: Option<Duration>,
    history: VelocityHistory,
}

impl SwipeTracker {
    pub fn new(speed_multiplier: f64, natural_scroll: bool) -> Self {
        Self {
            phase: Phase::Idle,
            distance: 1.0,
            snap_points: Vec::new(),
            progress: 0.0,
            cancel_progress: 0.0,
            speed_multiplier,
            natural_scroll,
            began: None,
            history: VelocityHistory::default(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn snap_points(&self) -> &[f64] {
        &self.snap_points
    }

    /// Folds one raw delta into progress and returns the new value.
    pub fn update(&mut self, raw_delta: f64, time: Duration) -> Result<f64, TrackerError> {
        if self.phase == Phase::Idle {
            return Err(TrackerError::NotConfirmed("update"));
        }
        self.phase = Phase::Live;
        if self.began.is_none() {
            self.began = Some(time);
        }

        let mut delta = raw_delta / self.distance * self.speed_multiplier;
        if self.natural_scroll {
            delta = -delta;
        }
        self.progress += delta;
        self.history.append(time, delta);
        Ok(self.progress)
    }

    /// Finishes the gesture, resolving the terminal snap point.
    pub fn end(&mut self, time: Duration) -> Result<EndResult, TrackerError> {
        if self.phase == Phase::Idle {
            return Err(TrackerError::NotConfirmed("end"));
        }
        let duration = time.saturating_sub(self.began.unwrap_or(time));
        let velocity = self.history.velocity(time);
        let progress =
            progress::resolve_terminal(self.progress, velocity, &self.snap_points, duration);
        self.reset();
        Ok(EndResult { progress, duration, cancelled: false })
    }

    /// Aborts the gesture; the consumer returns to the pre-gesture state
    /// captured at confirmation, skipping snap resolution entirely.
    pub fn cancel(&mut self, time: Duration) -> Result<EndResult, TrackerError> {
        if self.phase == Phase::Idle {
            return Err(TrackerError::NotConfirmed("cancel"));
        }
        let duration = time.saturating_sub(self.began.unwrap_or(time));
        let progress = self.cancel_progress;
        self.reset();
        Ok(EndResult { progress, duration, cancelled: true })
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.snap_points.clear();
        self.began = None;
        self.history.clear();
    }
}

impl SwipeConfirm for SwipeTracker {
    fn confirm_swipe(
        &mut self,
        distance: f64,
        snap_points: Vec<f64>,
        current_progress: f64,
        cancel_progress: f64,
    ) -> Result<(), TrackerError> {
        if self.phase != Phase::Idle {
            return Err(TrackerError::AlreadyConfirmed);
        }
        if !distance.is_finite() || distance <= 0.0 {
            return Err(TrackerError::InvalidDistance(distance));
        }
        if snap_points.is_empty() || snap_points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TrackerError::InvalidSnapPoints);
        }

        self.phase = Phase::Armed;
        self.distance = distance;
        self.snap_points = snap_points;
        self.progress = current_progress;
        self.cancel_progress = cancel_progress;
        self.began = None;
        self.history.clear();
        Ok(())
    }
}

/// Widens the confirmed snap range by one unit on each side.
///
/// Used by workspace switching so the first and last workspace still have an
/// interval to rubber-band into; the behavior remembers the true endpoints
/// and clamps the resolved value back at END.
pub struct EndpointPadding<'a> {
    inner: &'a mut dyn SwipeConfirm,
    first: f64,
    last: f64,
}

impl<'a> EndpointPadding<'a> {
    pub fn new(inner: &'a mut dyn SwipeConfirm) -> Self {
        Self { inner, first: 0.0, last: 0.0 }
    }

    /// True endpoints of the unpadded range, valid after confirmation.
    pub fn bounds(&self) -> (f64, f64) {
        (self.first, self.last)
    }
}

impl SwipeConfirm for EndpointPadding<'_> {
    fn confirm_swipe(
        &mut self,
        distance: f64,
        mut snap_points: Vec<f64>,
        current_progress: f64,
        cancel_progress: f64,
    ) -> Result<(), TrackerError> {
        let (Some(&first), Some(&last)) = (snap_points.first(), snap_points.last()) else {
            return Err(TrackerError::InvalidSnapPoints);
        };
        self.first = first;
        self.last = last;
        snap_points.insert(0, first - 1.0);
        snap_points.push(last + 1.0);
        self.inner
            .confirm_swipe(distance, snap_points, current_progress, cancel_progress)
    }
}

/// Replaces the confirmed snap points wholesale, keeping everything else.
///
/// Overview navigation uses this to impose its state list over whatever the
/// host session would confirm with.
pub struct SnapOverride<'a> {
    inner: &'a mut dyn SwipeConfirm,
    snap_points: Vec<f64>,
}

impl<'a> SnapOverride<'a> {
    pub fn new(inner: &'a mut dyn SwipeConfirm, snap_points: Vec<f64>) -> Self {
        Self { inner, snap_points }
    }
}

impl SwipeConfirm for SnapOverride<'_> {
    fn confirm_swipe(
        &mut self,
        distance: f64,
        _snap_points: Vec<f64>,
        current_progress: f64,
        cancel_progress: f64,
    ) -> Result<(), TrackerError> {
        self.inner.confirm_swipe(
            distance,
            std::mem::take(&mut self.snap_points),
            current_progress,
            cancel_progress,
        )
    }
}
