//! A recording [`Host`] for tests: every observable action lands in a
//! shared log, and the session-side state behaviors read from is plain data
//! the test can poke.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::{
    ActionMode, Audio, Brightness, Compositor, Host, Key, MediaAction, MediaBus, Osd,
    TransitionStrategy, VirtualKeyboard,
};
use crate::gesture::{SwipeConfirm, TrackerError};

#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    WorkspaceBegin,
    WorkspaceUpdate(f64),
    WorkspaceEnd(f64),
    OverviewUpdate(f64),
    OverviewEnd(f64),
    StrategyInstalled(bool),
    SwitcherOpen,
    SwitcherSelect(usize),
    SwitcherActivate,
    SwitcherClose,
    OsdShow { icon: String, level: f64 },
    OsdHideAll,
    Keys(Vec<Key>),
    SetVolume(f64),
    SetMuted(bool),
    SetBrightness(f64),
    Media(MediaAction),
    Maximize,
    Unmaximize,
    Minimize,
    CloseWindow,
    ShowDesktop,
}

/// Shared, append-only log of host actions.
#[derive(Debug, Clone, Default)]
pub struct Recording(Rc<RefCell<Vec<HostAction>>>);

impl Recording {
    fn push(&self, action: HostAction) {
        self.0.borrow_mut().push(action);
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<HostAction> {
        std::mem::take(&mut self.0.borrow_mut())
    }
}

/// Mutable session state the fake host serves reads from.
#[derive(Debug)]
pub struct HeadlessState {
    pub screen: (f64, f64),
    pub mode: ActionMode,
    pub search_active: bool,
    pub workspace_count: usize,
    pub active_workspace: usize,
    pub overview_progress: f64,
    pub switcher_windows: usize,
    pub focused_window: bool,
    pub maximized: bool,
    pub app_id: Option<String>,
    pub volume: f64,
    pub max_volume: f64,
    pub brightness: Option<f64>,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            screen: (1920.0, 1080.0),
            mode: ActionMode::NORMAL,
            search_active: false,
            workspace_count: 3,
            active_workspace: 1,
            overview_progress: 0.0,
            switcher_windows: 4,
            focused_window: true,
            maximized: false,
            app_id: None,
            volume: 0.5,
            max_volume: 1.0,
            brightness: Some(50.0),
        }
    }
}

pub type SharedState = Rc<RefCell<HeadlessState>>;

/// Builds a host whose every action is recorded.
pub fn host() -> (Host, Recording, SharedState) {
    let log = Recording::default();
    let state: SharedState = Rc::new(RefCell::new(HeadlessState::default()));
    let host = Host {
        compositor: Box::new(HeadlessCompositor { log: log.clone(), state: state.clone() }),
        osd: Box::new(HeadlessOsd { log: log.clone() }),
        keyboard: Box::new(HeadlessKeyboard { log: log.clone() }),
        audio: Box::new(HeadlessAudio { log: log.clone(), state: state.clone() }),
        brightness: Box::new(HeadlessBrightness { log: log.clone(), state: state.clone() }),
        media: Box::new(HeadlessMedia { log: log.clone() }),
    };
    (host, log, state)
}

struct HeadlessCompositor {
    log: Recording,
    state: SharedState,
}

impl Compositor for HeadlessCompositor {
    fn screen_size(&self) -> (f64, f64) {
        self.state.borrow().screen
    }

    fn action_mode(&self) -> ActionMode {
        self.state.borrow().mode
    }

    fn search_active(&self) -> bool {
        self.state.borrow().search_active
    }

    fn active_monitor(&self) -> i32 {
        0
    }

    fn workspace_switch_begin(
        &mut self,
        confirm: &mut dyn SwipeConfirm,
        _monitor: i32,
    ) -> Result<(), TrackerError> {
        let (width, count, active) = {
            let state = self.state.borrow();
            (state.screen.0, state.workspace_count, state.active_workspace)
        };
        let snap_points = (0..count).map(|i| i as f64).collect();
        self.log.push(HostAction::WorkspaceBegin);
        confirm.confirm_swipe(width, snap_points, active as f64, active as f64)
    }

    fn workspace_switch_update(&mut self, progress: f64) {
        self.log.push(HostAction::WorkspaceUpdate(progress));
    }

    fn workspace_switch_end(&mut self, _duration: Duration, progress: f64) {
        self.state.borrow_mut().active_workspace = progress.round().max(0.0) as usize;
        self.log.push(HostAction::WorkspaceEnd(progress));
    }

    fn overview_progress(&self) -> f64 {
        self.state.borrow().overview_progress
    }

    fn overview_begin(&mut self, confirm: &mut dyn SwipeConfirm) -> Result<(), TrackerError> {
        let (height, current) = {
            let state = self.state.borrow();
            (state.screen.1, state.overview_progress)
        };
        confirm.confirm_swipe(height, vec![0.0, 1.0, 2.0], current, current)
    }

    fn overview_update(&mut self, progress: f64) {
        self.state.borrow_mut().overview_progress = progress;
        self.log.push(HostAction::OverviewUpdate(progress));
    }

    fn overview_end(&mut self, _duration: Duration, progress: f64) {
        self.state.borrow_mut().overview_progress = progress;
        self.log.push(HostAction::OverviewEnd(progress));
    }

    fn set_transition_strategy(&mut self, strategy: Option<Box<dyn TransitionStrategy>>) {
        self.log.push(HostAction::StrategyInstalled(strategy.is_some()));
    }

    fn switcher_open(&mut self) -> usize {
        self.log.push(HostAction::SwitcherOpen);
        self.state.borrow().switcher_windows
    }

    fn switcher_select(&mut self, index: usize) {
        self.log.push(HostAction::SwitcherSelect(index));
    }

    fn switcher_activate(&mut self) {
        self.log.push(HostAction::SwitcherActivate);
    }

    fn switcher_close(&mut self) {
        self.log.push(HostAction::SwitcherClose);
    }

    fn focused_window_exists(&self) -> bool {
        self.state.borrow().focused_window
    }

    fn focused_is_maximized(&self) -> bool {
        self.state.borrow().maximized
    }

    fn maximize_focused(&mut self) {
        self.state.borrow_mut().maximized = true;
        self.log.push(HostAction::Maximize);
    }

    fn unmaximize_focused(&mut self) {
        self.state.borrow_mut().maximized = false;
        self.log.push(HostAction::Unmaximize);
    }

    fn minimize_focused(&mut self) {
        self.log.push(HostAction::Minimize);
    }

    fn close_focused(&mut self) {
        self.log.push(HostAction::CloseWindow);
    }

    fn show_desktop(&mut self) {
        self.log.push(HostAction::ShowDesktop);
    }

    fn focused_app_id(&self) -> Option<String> {
        self.state.borrow().app_id.clone()
    }
}

struct HeadlessOsd {
    log: Recording,
}

impl Osd for HeadlessOsd {
    fn show(&mut self, _monitor: i32, icon: &str, _label: Option<&str>, level: f64) {
        self.log.push(HostAction::OsdShow { icon: icon.to_owned(), level });
    }

    fn hide_all(&mut self) {
        self.log.push(HostAction::OsdHideAll);
    }
}

struct HeadlessKeyboard {
    log: Recording,
}

impl VirtualKeyboard for HeadlessKeyboard {
    fn tap(&mut self, keys: &[Key]) {
        self.log.push(HostAction::Keys(keys.to_vec()));
    }
}

struct HeadlessAudio {
    log: Recording,
    state: SharedState,
}

impl Audio for HeadlessAudio {
    fn max_volume(&self) -> f64 {
        self.state.borrow().max_volume
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
        self.log.push(HostAction::SetVolume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.push(HostAction::SetMuted(muted));
    }

    fn port_label(&self) -> Option<String> {
        Some("Speakers".to_owned())
    }
}

struct HeadlessBrightness {
    log: Recording,
    state: SharedState,
}

impl Brightness for HeadlessBrightness {
    fn brightness(&self) -> Option<f64> {
        self.state.borrow().brightness
    }

    fn set_brightness(&mut self, value: f64) {
        self.state.borrow_mut().brightness = Some(value);
        self.log.push(HostAction::SetBrightness(value));
    }
}

struct HeadlessMedia {
    log: Recording,
}

impl MediaBus for HeadlessMedia {
    fn call(&mut self, action: MediaAction) {
        self.log.push(HostAction::Media(action));
    }
}
