//! Volume scrubbing with an OSD readout.

use crate::gesture::registry::{ConsumerDescriptor, GestureConsumer, GestureOutcome, Registration};
use crate::gesture::{progress, SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host, OsdThrottle};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_HEIGHT, TOUCHPAD_BASE_WIDTH};

const SNAP_POINTS: [f64; 2] = [0.0, 1.0];

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
            speed_multiplier,
        },
        consumer: Box::new(VolumeControl { max_volume: 1.0, throttle: OsdThrottle::new() }),
    }
}

struct VolumeControl {
    max_volume: f64,
    throttle: OsdThrottle,
}

fn icon_for(volume: f64) -> &'static str {
    // Tiers match the shell's own volume OSD.
    let tier = if volume <= 0.0 {
        0
    } else {
        ((3.0 * volume + 1.0).floor() as i32).clamp(1, 3)
    };
    match tier {
        0 => "audio-volume-muted-symbolic",
        1 => "audio-volume-low-symbolic",
        2 => "audio-volume-medium-symbolic",
        _ => "audio-volume-high-symbolic",
    }
}

impl VolumeControl {
    fn apply(&mut self, host: &mut Host, progress: f64, osd_time: Option<std::time::Duration>) {
        let volume = progress::clamp_to_range(progress, &SNAP_POINTS);
        host.audio.set_muted(volume <= 0.0);
        host.audio.set_volume(volume * self.max_volume);

        let draw = match osd_time {
            Some(time) => self.throttle.ready(time),
            None => true,
        };
        if draw {
            let monitor = host.compositor.active_monitor();
            let label = host.audio.port_label();
            host.osd.show(monitor, icon_for(volume), label.as_deref(), volume);
        }
    }
}

impl GestureConsumer for VolumeControl {
    fn begin(
        &mut self,
        host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        self.max_volume = host.audio.max_volume();
        self.throttle = OsdThrottle::new();
        let current = if self.max_volume > 0.0 {
            (host.audio.volume() / self.max_volume).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let distance = match event.orientation {
            Orientation::Horizontal => TOUCHPAD_BASE_WIDTH,
            _ => TOUCHPAD_BASE_HEIGHT,
        };
        confirm.confirm_swipe(distance, SNAP_POINTS.to_vec(), current, current)
    }

    fn update(&mut self, host: &mut Host, progress: f64, event: &GestureEvent) {
        self.apply(host, progress, Some(event.time));
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        self.apply(host, outcome.progress, None);
    }
}
