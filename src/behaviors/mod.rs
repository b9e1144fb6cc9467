//! Gesture behaviors and the config-to-consumer wiring.
//!
//! [`build_consumers`] is the single place that turns a configuration
//! snapshot into an ordered consumer list; the order doubles as arbitration
//! priority, so the hold-and-swipe slots come first (their `allowed`
//! predicate keeps them out of the way of plain swipes).

use touchflow_config::{Config, PinchGesture, SwipeGesture};

use crate::gesture::registry::Registration;
use crate::input::Orientation;

pub mod brightness;
pub mod forward_back;
pub mod media;
pub mod overview;
pub mod pinch;
pub mod volume;
pub mod window_snap;
pub mod window_switcher;
pub mod workspace;

/// Collapses the per-finger-count slots of one axis: when both counts map
/// to the same behavior a single consumer takes both, otherwise each count
/// gets its own.
fn slot_assignments<T: Copy + PartialEq>(
    three: T,
    four: T,
    none: T,
) -> Vec<(T, Vec<u32>)> {
    if three == four && three != none {
        return vec![(three, vec![3, 4])];
    }
    [(three, vec![3]), (four, vec![4])]
        .into_iter()
        .filter(|(gesture, _)| *gesture != none)
        .collect()
}

fn swipe_registration(
    gesture: SwipeGesture,
    fingers: Vec<u32>,
    orientation: Orientation,
    config: &Config,
) -> Option<Registration> {
    let tuning = &config.tuning;
    let gestures = &config.gestures;
    match gesture {
        SwipeGesture::None => None,
        SwipeGesture::OverviewNavigation => Some(overview::registration(
            fingers,
            orientation,
            gestures.overview_navigation_states,
            gestures.default_overview_gesture_direction,
            tuning.touchpad_speed_scale,
        )),
        SwipeGesture::WorkspaceSwitching => Some(workspace::registration(
            fingers,
            orientation,
            gestures.follow_natural_scroll,
            tuning.touchpad_speed_scale,
        )),
        SwipeGesture::WindowSwitching => Some(window_switcher::registration(
            fingers,
            orientation,
            tuning.alttab_delay_ms,
            tuning.touchpad_speed_scale,
        )),
        SwipeGesture::VolumeControl => Some(volume::registration(
            fingers,
            orientation,
            gestures.invert_volume_direction,
            tuning.volume_control_speed,
        )),
        SwipeGesture::WindowManipulation => Some(window_snap::registration(
            fingers,
            orientation,
            gestures.allow_minimize_window,
            tuning.touchpad_speed_scale,
        )),
        SwipeGesture::MediaControl => Some(media::registration(
            fingers,
            orientation,
            gestures.invert_media_direction,
            tuning.media_control_speed,
        )),
        SwipeGesture::BrightnessControl => Some(brightness::registration(
            fingers,
            orientation,
            gestures.invert_brightness_direction,
            tuning.brightness_control_speed,
        )),
    }
}

/// Builds the ordered consumer list for one configuration snapshot.
pub fn build_consumers(config: &Config) -> Vec<Registration> {
    let gestures = &config.gestures;
    let mut slots = Vec::new();

    // Hold-and-swipe first: its predicate rejects plain swipes, and plain
    // slots would otherwise shadow it.
    if gestures.enable_forward_back_gesture {
        slots.push(forward_back::registration(
            Orientation::Horizontal,
            &config.forward_back,
            config.tuning.touchpad_speed_scale,
        ));
        if gestures.enable_vertical_app_gesture {
            slots.push(forward_back::registration(
                Orientation::Vertical,
                &config.forward_back,
                config.tuning.touchpad_speed_scale,
            ));
        }
    }

    // The stock horizontal workspace gesture stays disabled unless the
    // config explicitly assigns workspace switching to a horizontal slot;
    // the vertical slots carry no such implicit binding to clear.
    let axes = [
        (
            Orientation::Vertical,
            gestures.vertical_swipe_3_fingers,
            gestures.vertical_swipe_4_fingers,
        ),
        (
            Orientation::Horizontal,
            gestures.horizontal_swipe_3_fingers,
            gestures.horizontal_swipe_4_fingers,
        ),
    ];
    let mut media_bound = false;
    for (orientation, three, four) in axes {
        for (gesture, fingers) in slot_assignments(three, four, SwipeGesture::None) {
            media_bound |= gesture == SwipeGesture::MediaControl;
            if let Some(slot) = swipe_registration(gesture, fingers, orientation, config) {
                slots.push(slot);
            }
        }
    }

    for (gesture, fingers) in slot_assignments(
        gestures.pinch_3_fingers,
        gestures.pinch_4_fingers,
        PinchGesture::None,
    ) {
        slots.push(pinch::registration(
            gesture,
            fingers,
            config.tuning.touchpad_pinch_speed,
        ));
    }

    // The play/pause tap only exists alongside a media scrub binding.
    if media_bound {
        slots.push(media::tap_registration(gestures.hold_tap_fingers));
    }

    slots
}
