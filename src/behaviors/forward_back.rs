//! Forward/back navigation by hold-and-swipe.
//!
//! Only claims gestures whose context says a same-finger hold released just
//! before the swipe began, so plain swipes fall through to the regular
//! slots. The injected key sequence is looked up per focused application.

use std::collections::HashMap;

use touchflow_config::{AppKeyBind, ForwardBack, ForwardBackKeyBind};

use crate::gesture::registry::{
    ConsumerDescriptor, GestureConsumer, GestureCx, GestureOutcome, Registration,
};
use crate::gesture::{SwipeConfirm, TrackerError};
use crate::host::{ActionMode, Host, Key};
use crate::input::{GestureEvent, GestureKind, Orientation, TOUCHPAD_BASE_HEIGHT, TOUCHPAD_BASE_WIDTH};

pub fn registration(
    orientation: Orientation,
    config: &ForwardBack,
    speed_multiplier: f64,
) -> Registration {
    Registration {
        descriptor: ConsumerDescriptor {
            kind: GestureKind::Swipe,
            fingers: vec![3, 4],
            orientation,
            modes: ActionMode::NORMAL,
            natural_scroll: false,
            speed_multiplier,
        },
        consumer: Box::new(ForwardBackGesture { apps: config.apps.clone() }),
    }
}

struct ForwardBackGesture {
    apps: HashMap<String, AppKeyBind>,
}

fn keys_for(bind: &AppKeyBind, forward: bool) -> Vec<Key> {
    let forward = forward != bind.reversed;
    match bind.kind {
        ForwardBackKeyBind::Default | ForwardBackKeyBind::ForwardBack => {
            if forward {
                vec![Key::Forward]
            } else {
                vec![Key::Back]
            }
        }
        ForwardBackKeyBind::PageUpDown => {
            if forward {
                vec![Key::PageDown]
            } else {
                vec![Key::PageUp]
            }
        }
        ForwardBackKeyBind::RightLeft => {
            if forward {
                vec![Key::Right]
            } else {
                vec![Key::Left]
            }
        }
        ForwardBackKeyBind::AudioNextPrev => {
            if forward {
                vec![Key::AudioNext]
            } else {
                vec![Key::AudioPrev]
            }
        }
        ForwardBackKeyBind::TabNextPrev => {
            if forward {
                vec![Key::Ctrl, Key::Tab]
            } else {
                vec![Key::Ctrl, Key::Shift, Key::Tab]
            }
        }
    }
}

impl GestureConsumer for ForwardBackGesture {
    fn allowed(&self, _host: &Host, _event: &GestureEvent, cx: &GestureCx) -> bool {
        cx.hold_and_swipe
    }

    fn begin(
        &mut self,
        _host: &mut Host,
        confirm: &mut dyn SwipeConfirm,
        event: &GestureEvent,
    ) -> Result<(), TrackerError> {
        let distance = match event.orientation {
            Orientation::Horizontal => TOUCHPAD_BASE_WIDTH,
            _ => TOUCHPAD_BASE_HEIGHT,
        };
        confirm.confirm_swipe(distance, vec![-1.0, 0.0, 1.0], 0.0, 0.0)
    }

    fn end(&mut self, host: &mut Host, outcome: &GestureOutcome) {
        if outcome.cancelled || outcome.progress == 0.0 {
            return;
        }
        let bind = host
            .compositor
            .focused_app_id()
            .and_then(|id| self.apps.get(&id).cloned())
            .unwrap_or_default();
        let keys = keys_for(&bind, outcome.progress > 0.0);
        host.keyboard.tap(&keys);
    }
}
