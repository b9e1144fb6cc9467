//! Secondary gesture classifiers layered over the progress stream.
//!
//! These never consume events themselves; the registry feeds them and asks
//! for a verdict at gesture end.

use std::time::Duration;

/// Progress moves smaller than this are treated as jitter, not direction.
pub const REVERSAL_NOISE_THRESHOLD: f64 = 0.05;

/// The last two direction changes must land within this window.
pub const REVERSAL_PAIR_WINDOW: Duration = Duration::from_millis(300);

/// Gestures longer than this are navigation, never a toggle.
pub const REVERSAL_GESTURE_CEILING: Duration = Duration::from_millis(500);

/// A hold released within this window counts as a tap.
pub const HOLD_TAP_CEILING: Duration = Duration::from_millis(200);

/// Detects a quick there-and-back scrub, used as a play/pause toggle by the
/// media behavior.
///
/// Direction samples are recorded whenever filtered progress movement flips
/// sign; the initial direction counts as the first sample, so a single
/// reversal already yields two.
#[derive(Debug, Default)]
pub struct ReversalDetector {
    samples: Vec<(Duration, f64)>,
    anchor: f64,
    last_direction: f64,
    began: Duration,
}

impl ReversalDetector {
    pub fn reset(&mut self, time: Duration, progress: f64) {
        self.samples.clear();
        self.anchor = progress;
        self.last_direction = 0.0;
        self.began = time;
    }

    pub fn observe(&mut self, progress: f64, time: Duration) {
        let moved = progress - self.anchor;
        if moved.abs() <= REVERSAL_NOISE_THRESHOLD {
            return;
        }
        let direction = moved.signum();
        if direction != self.last_direction {
            self.samples.push((time, direction));
            self.last_direction = direction;
        }
        self.anchor = progress;
    }

    /// Whether the finished gesture reads as a toggle rather than a scrub.
    pub fn is_toggle(&self, end: Duration) -> bool {
        if end.saturating_sub(self.began) >= REVERSAL_GESTURE_CEILING {
            return false;
        }
        let [.., (previous, _), (latest, _)] = self.samples[..] else {
            return false;
        };
        latest.saturating_sub(previous) <= REVERSAL_PAIR_WINDOW
    }
}

/// Classifies hold gestures: a brief hold with the configured finger count
/// is a tap, anything longer (or cancelled) is not.
#[derive(Debug, Default)]
pub struct HoldTap {
    began: Option<(Duration, u32)>,
}

impl HoldTap {
    pub fn begin(&mut self, time: Duration, fingers: u32) {
        self.began = Some((time, fingers));
    }

    pub fn cancel(&mut self) {
        self.began = None;
    }

    /// Returns the finger count if the hold released quickly enough.
    pub fn end(&mut self, time: Duration) -> Option<u32> {
        let (began, fingers) = self.began.take()?;
        (time.saturating_sub(began) < HOLD_TAP_CEILING).then_some(fingers)
    }
}
