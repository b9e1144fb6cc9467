//! Terminal snap-point resolution.
//!
//! Pure functions only; the tracker calls [`resolve_terminal`] exactly once
//! per gesture at END, and never for CANCEL.

use std::time::Duration;

/// Progress distance under which the gesture latches onto the nearer
/// interval boundary regardless of velocity.
pub const SNAP_POINT_THRESHOLD: f64 = 0.1;

/// Velocity (progress units per second) above which a gesture is treated as
/// a flick and settles in the direction of travel.
pub const FLICK_VELOCITY: f64 = 0.4;

/// Gestures longer than this never count as flicks, however fast they end.
pub const FLICK_DURATION_CEILING: Duration = Duration::from_millis(500);

/// Resolves the snap point a gesture settles into at END.
///
/// Out-of-range progress clamps to the nearest endpoint (elastic-overscroll
/// consumers animate the decay back themselves). Within an interval the
/// nearer boundary wins when closer than [`SNAP_POINT_THRESHOLD`]; otherwise
/// a flick picks the boundary in the velocity's direction; otherwise the
/// nearer boundary by absolute distance, ties broken toward the lower index.
///
/// Deterministic and side-effect free, so calling it twice with the same
/// inputs always yields the same snap point.
pub fn resolve_terminal(
    progress: f64,
    velocity: f64,
    snap_points: &[f64],
    duration: Duration,
) -> f64 {
    assert!(!snap_points.is_empty(), "snap points must be non-empty");

    let first = snap_points[0];
    let last = *snap_points.last().unwrap();
    if progress <= first {
        return first;
    }
    if progress >= last {
        return last;
    }

    // first < progress < last, so a containing interval exists and its upper
    // boundary is at index >= 1.
    let hi_idx = snap_points
        .iter()
        .position(|&point| point >= progress)
        .unwrap();
    let lo = snap_points[hi_idx - 1];
    let hi = snap_points[hi_idx];

    let to_lo = progress - lo;
    let to_hi = hi - progress;

    if to_lo.min(to_hi) < SNAP_POINT_THRESHOLD {
        return if to_lo <= to_hi { lo } else { hi };
    }

    if velocity.abs() > FLICK_VELOCITY && duration < FLICK_DURATION_CEILING {
        return if velocity > 0.0 { hi } else { lo };
    }

    if to_lo <= to_hi {
        lo
    } else {
        hi
    }
}

/// Clamps live progress into the snap range, for consumers that opted out
/// of elastic overshoot (continuous controls like volume or brightness).
pub fn clamp_to_range(progress: f64, snap_points: &[f64]) -> f64 {
    let first = snap_points.first().copied().unwrap_or(0.0);
    let last = snap_points.last().copied().unwrap_or(first);
    progress.clamp(first, last)
}
