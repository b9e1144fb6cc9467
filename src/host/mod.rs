//! The session boundary.
//!
//! Behaviors never talk to the desktop directly; everything observable they
//! do goes through the trait objects collected in [`Host`]. The live session
//! implementation lives in [`session`], and [`headless`] provides a
//! recording implementation for tests.

use std::time::Duration;

use crate::gesture::{SwipeConfirm, TrackerError};

#[cfg(test)]
pub mod headless;
pub mod session;

bitflags::bitflags! {
    /// Which session modes a gesture binding is available in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ActionMode: u32 {
        const NORMAL = 1;
        const OVERVIEW = 1 << 1;
    }
}

/// Overview navigation states, expressed as tracker progress values.
pub mod overview_state {
    pub const HIDDEN: f64 = 0.0;
    pub const WINDOW_PICKER: f64 = 1.0;
    pub const APP_GRID: f64 = 2.0;
    /// Virtual state below HIDDEN used by the cyclic round trip.
    pub const APP_GRID_PREV: f64 = -1.0;
    /// Virtual state above APP_GRID used by the cyclic round trip.
    pub const HIDDEN_NEXT: f64 = 3.0;
}

/// Remaps the overview's rendered progress while a gesture crosses a
/// virtual state (the cyclic round trip). Installed on the compositor for
/// the duration of one gesture.
pub trait TransitionStrategy {
    /// Maps raw tracker progress to the progress the overview should render.
    fn render_progress(&self, raw: f64) -> f64;
}

/// Compositor-side surface: workspaces, the overview, the window switcher
/// and the focused window.
pub trait Compositor {
    fn screen_size(&self) -> (f64, f64);
    fn action_mode(&self) -> ActionMode;
    fn search_active(&self) -> bool;
    fn active_monitor(&self) -> i32;

    /// Arms `confirm` with the workspace layout: snap points are workspace
    /// indices and the current progress is the active workspace.
    fn workspace_switch_begin(
        &mut self,
        confirm: &mut dyn SwipeConfirm,
        monitor: i32,
    ) -> Result<(), TrackerError>;
    fn workspace_switch_update(&mut self, progress: f64);
    fn workspace_switch_end(&mut self, duration: Duration, progress: f64);

    fn overview_progress(&self) -> f64;
    /// Arms `confirm` with the overview's own state geometry.
    fn overview_begin(&mut self, confirm: &mut dyn SwipeConfirm) -> Result<(), TrackerError>;
    fn overview_update(&mut self, progress: f64);
    fn overview_end(&mut self, duration: Duration, progress: f64);
    fn set_transition_strategy(&mut self, strategy: Option<Box<dyn TransitionStrategy>>);

    /// Opens the window switcher and returns the number of entries.
    fn switcher_open(&mut self) -> usize;
    fn switcher_select(&mut self, index: usize);
    fn switcher_activate(&mut self);
    fn switcher_close(&mut self);

    fn focused_window_exists(&self) -> bool;
    fn focused_is_maximized(&self) -> bool;
    fn maximize_focused(&mut self);
    fn unmaximize_focused(&mut self);
    fn minimize_focused(&mut self);
    fn close_focused(&mut self);
    fn show_desktop(&mut self);
    fn focused_app_id(&self) -> Option<String>;
}

/// On-screen display for continuous controls (volume, brightness).
pub trait Osd {
    fn show(&mut self, monitor: i32, icon: &str, label: Option<&str>, level: f64);
    fn hide_all(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Alt,
    Ctrl,
    Shift,
    Left,
    Right,
    PageUp,
    PageDown,
    Tab,
    KeyW,
    Forward,
    Back,
    AudioNext,
    AudioPrev,
}

/// Injects key taps into the session (modifiers held around the last key).
pub trait VirtualKeyboard {
    fn tap(&mut self, keys: &[Key]);
}

pub trait Audio {
    fn max_volume(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    /// Label of the active output port, for the OSD.
    fn port_label(&self) -> Option<String>;
}

pub trait Brightness {
    /// Backlight percentage, `None` when no backlight is exposed.
    fn brightness(&self) -> Option<f64>;
    fn set_brightness(&mut self, value: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Next,
    Previous,
    PlayPause,
}

/// The session media player, addressed over the session bus.
pub trait MediaBus {
    fn call(&mut self, action: MediaAction);
}

/// Everything the behaviors can observe or mutate in the desktop session.
pub struct Host {
    pub compositor: Box<dyn Compositor>,
    pub osd: Box<dyn Osd>,
    pub keyboard: Box<dyn VirtualKeyboard>,
    pub audio: Box<dyn Audio>,
    pub brightness: Box<dyn Brightness>,
    pub media: Box<dyn MediaBus>,
}

/// OSD refresh rate cap. Continuous controls update per touch event, far
/// faster than the OSD needs to redraw.
const OSD_MIN_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Timestamp-driven throttle gating OSD redraws to ~30 Hz.
#[derive(Debug, Default)]
pub struct OsdThrottle {
    last: Option<Duration>,
}

impl OsdThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a redraw is due at `now`; records the redraw if so.
    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < OSD_MIN_INTERVAL => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
