//! Raw touchpad event decoding.
//!
//! [`EventClassifier`] is a pure translation layer: it turns the hardware
//! event stream into immutable [`GestureEvent`]s, latching the finger count
//! reported at BEGIN for the whole gesture instance (hardware reports can
//! disagree mid-gesture; the BEGIN value is authoritative). It performs no
//! arbitration and no dispatch.

use std::time::Duration;

/// Reference touchpad surface, in libinput-ish units. Consumers that scrub
/// relative to the pad itself (rather than a screen dimension) use these as
/// their distance reference.
pub const TOUCHPAD_BASE_WIDTH: f64 = 400.0;
pub const TOUCHPAD_BASE_HEIGHT: f64 = 300.0;

/// A hardware touchpad event, as delivered by the input backend.
#[derive(Debug, Clone, Copy)]
pub enum TouchpadEvent {
    SwipeBegin { fingers: u32, time: Duration },
    SwipeUpdate { dx: f64, dy: f64, time: Duration },
    SwipeEnd { cancelled: bool, time: Duration },
    PinchBegin { fingers: u32, time: Duration },
    PinchUpdate { dx: f64, dy: f64, scale: f64, rotation: f64, time: Duration },
    PinchEnd { cancelled: bool, time: Duration },
    HoldBegin { fingers: u32, time: Duration },
    HoldEnd { cancelled: bool, time: Duration },
}

impl TouchpadEvent {
    pub fn time(&self) -> Duration {
        match *self {
            TouchpadEvent::SwipeBegin { time, .. }
            | TouchpadEvent::SwipeUpdate { time, .. }
            | TouchpadEvent::SwipeEnd { time, .. }
            | TouchpadEvent::PinchBegin { time, .. }
            | TouchpadEvent::PinchUpdate { time, .. }
            | TouchpadEvent::PinchEnd { time, .. }
            | TouchpadEvent::HoldBegin { time, .. }
            | TouchpadEvent::HoldEnd { time, .. } => time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Begin,
    Update,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Swipe,
    Pinch,
    Hold,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    None,
    Vertical,
    Horizontal,
}

/// One classified gesture event. Produced once per hardware callback,
/// never mutated afterwards.
///
/// For swipes the orientation is [`Orientation::None`] until the
/// arbitration layer resolves the dominant axis; the registry stamps the
/// resolved orientation on the copies it delivers to consumers.
#[derive(Debug, Clone, Copy)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub kind: GestureKind,
    pub fingers: u32,
    pub orientation: Orientation,
    pub dx: f64,
    pub dy: f64,
    /// Pinch only: change of the pinch scale since the previous event.
    pub scale_delta: f64,
    pub time: Duration,
}

impl GestureEvent {
    /// Raw delta along the given axis; for pinches this is the scale delta.
    pub fn axis_delta(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.dy,
            Orientation::Horizontal => self.dx,
            Orientation::None => self.scale_delta,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Decodes hardware events into [`GestureEvent`]s.
#[derive(Debug, Default)]
pub struct EventClassifier {
    swipe_fingers: Option<u32>,
    pinch_fingers: Option<u32>,
    hold_fingers: Option<u32>,
    last_pinch_scale: f64,
}

impl EventClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies one hardware event. Returns `None` for UPDATE/END events
    /// arriving without a matching BEGIN (out-of-order hardware stream).
    pub fn classify(&mut self, event: TouchpadEvent) -> Option<GestureEvent> {
        let time = event.time();
        match event {
            TouchpadEvent::SwipeBegin { fingers, .. } => {
                self.swipe_fingers = Some(fingers);
                Some(self.gesture(GesturePhase::Begin, GestureKind::Swipe, fingers, time))
            }
            TouchpadEvent::SwipeUpdate { dx, dy, .. } => {
                let fingers = self.swipe_fingers?;
                let mut ev = self.gesture(GesturePhase::Update, GestureKind::Swipe, fingers, time);
                ev.dx = dx;
                ev.dy = dy;
                Some(ev)
            }
            TouchpadEvent::SwipeEnd { cancelled, .. } => {
                let fingers = self.swipe_fingers.take()?;
                let phase = if cancelled { GesturePhase::Cancel } else { GesturePhase::End };
                Some(self.gesture(phase, GestureKind::Swipe, fingers, time))
            }
            TouchpadEvent::PinchBegin { fingers, .. } => {
                self.pinch_fingers = Some(fingers);
                self.last_pinch_scale = 1.0;
                Some(self.gesture(GesturePhase::Begin, GestureKind::Pinch, fingers, time))
            }
            TouchpadEvent::PinchUpdate { dx, dy, scale, .. } => {
                let fingers = self.pinch_fingers?;
                let mut ev = self.gesture(GesturePhase::Update, GestureKind::Pinch, fingers, time);
                ev.dx = dx;
                ev.dy = dy;
                ev.scale_delta = scale - self.last_pinch_scale;
                self.last_pinch_scale = scale;
                Some(ev)
            }
            TouchpadEvent::PinchEnd { cancelled, .. } => {
                let fingers = self.pinch_fingers.take()?;
                let phase = if cancelled { GesturePhase::Cancel } else { GesturePhase::End };
                Some(self.gesture(phase, GestureKind::Pinch, fingers, time))
            }
            TouchpadEvent::HoldBegin { fingers, .. } => {
                self.hold_fingers = Some(fingers);
                Some(self.gesture(GesturePhase::Begin, GestureKind::Hold, fingers, time))
            }
            TouchpadEvent::HoldEnd { cancelled, .. } => {
                let fingers = self.hold_fingers.take()?;
                let phase = if cancelled { GesturePhase::Cancel } else { GesturePhase::End };
                Some(self.gesture(phase, GestureKind::Hold, fingers, time))
            }
        }
    }

    fn gesture(
        &self,
        phase: GesturePhase,
        kind: GestureKind,
        fingers: u32,
        time: Duration,
    ) -> GestureEvent {
        GestureEvent {
            phase,
            kind,
            fingers,
            orientation: Orientation::None,
            dx: 0.0,
            dy: 0.0,
            scale_delta: 0.0,
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn finger_count_is_latched_at_begin() {
        let mut classifier = EventClassifier::new();
        let begin = classifier
            .classify(TouchpadEvent::SwipeBegin { fingers: 3, time: ms(0) })
            .unwrap();
        assert_eq!(begin.fingers, 3);

        let update = classifier
            .classify(TouchpadEvent::SwipeUpdate { dx: 4.0, dy: -2.0, time: ms(10) })
            .unwrap();
        assert_eq!(update.fingers, 3);
        assert_eq!(update.dx, 4.0);
        assert_eq!(update.dy, -2.0);

        let end = classifier
            .classify(TouchpadEvent::SwipeEnd { cancelled: false, time: ms(20) })
            .unwrap();
        assert_eq!(end.fingers, 3);
        assert_eq!(end.phase, GesturePhase::End);
    }

    #[test]
    fn update_without_begin_is_dropped() {
        let mut classifier = EventClassifier::new();
        assert!(classifier
            .classify(TouchpadEvent::SwipeUpdate { dx: 1.0, dy: 0.0, time: ms(0) })
            .is_none());
    }

    #[test]
    fn cancelled_end_becomes_cancel_phase() {
        let mut classifier = EventClassifier::new();
        classifier.classify(TouchpadEvent::SwipeBegin { fingers: 4, time: ms(0) });
        let end = classifier
            .classify(TouchpadEvent::SwipeEnd { cancelled: true, time: ms(5) })
            .unwrap();
        assert_eq!(end.phase, GesturePhase::Cancel);
    }

    #[test]
    fn pinch_scale_deltas_accumulate_to_total_scale() {
        let mut classifier = EventClassifier::new();
        classifier.classify(TouchpadEvent::PinchBegin { fingers: 3, time: ms(0) });
        let first = classifier
            .classify(TouchpadEvent::PinchUpdate {
                dx: 0.0,
                dy: 0.0,
                scale: 0.9,
                rotation: 0.0,
                time: ms(10),
            })
            .unwrap();
        let second = classifier
            .classify(TouchpadEvent::PinchUpdate {
                dx: 0.0,
                dy: 0.0,
                scale: 0.75,
                rotation: 0.0,
                time: ms(20),
            })
            .unwrap();
        assert!((first.scale_delta - -0.1).abs() < 1e-9);
        assert!((second.scale_delta - -0.15).abs() < 1e-9);
    }

    #[test]
    fn hold_and_swipe_streams_are_independent() {
        let mut classifier = EventClassifier::new();
        classifier.classify(TouchpadEvent::HoldBegin { fingers: 3, time: ms(0) });
        classifier.classify(TouchpadEvent::SwipeBegin { fingers: 3, time: ms(50) });
        let hold_end = classifier
            .classify(TouchpadEvent::HoldEnd { cancelled: false, time: ms(60) })
            .unwrap();
        assert_eq!(hold_end.kind, GestureKind::Hold);
        let update = classifier
            .classify(TouchpadEvent::SwipeUpdate { dx: 1.0, dy: 0.0, time: ms(70) })
            .unwrap();
        assert_eq!(update.kind, GestureKind::Swipe);
    }
}
