//! The live GNOME session host, backed by the session bus.
//!
//! Media players are reached over MPRIS and the backlight over
//! gnome-settings-daemon; both are standard interfaces. Everything
//! compositor-side (workspaces, overview, switcher, focused window, key
//! injection, the mixer) goes through the companion shell interface, which
//! is the daemon-side rendition of what used to run inside the shell
//! process itself.
//!
//! Bus hiccups degrade rather than crash: getters fall back to defaults and
//! every component warns once instead of spamming the log per touch event.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use zbus::blocking;
use zbus::zvariant::Value;

use super::{
    ActionMode, Audio, Brightness, Compositor, Host, Key, MediaAction, MediaBus, Osd,
    TransitionStrategy, VirtualKeyboard,
};
use crate::gesture::{SwipeConfirm, TrackerError};
use crate::input::TouchpadEvent;

pub static DBUS_CONNECTION: LazyLock<blocking::Connection> =
    LazyLock::new(|| blocking::Connection::session().expect("Failed to open session bus!"));

const SHELL_NAME: &str = "org.gnome.Shell";
const SHELL_PATH: &str = "/org/gnome/Shell";

const COMPANION_NAME: &str = "org.gnome.Shell";
const COMPANION_PATH: &str = "/org/gnome/Shell/Extensions/Touchflow";
const COMPANION_IFACE: &str = "org.gnome.Shell.Extensions.Touchflow";

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const MPRIS_PLAYER_IFACE: &str = "org.mpris.MediaPlayer2.Player";

const POWER_NAME: &str = "org.gnome.SettingsDaemon.Power";
const POWER_PATH: &str = "/org/gnome/SettingsDaemon/Power";
const POWER_SCREEN_IFACE: &str = "org.gnome.SettingsDaemon.Power.Screen";

/// Builds the live host. Fails when the session bus or the companion shell
/// interface is unreachable; the per-call paths degrade instead.
pub fn host() -> anyhow::Result<Host> {
    let connection = &*DBUS_CONNECTION;
    let companion = blocking::Proxy::new(connection, COMPANION_NAME, COMPANION_PATH, COMPANION_IFACE)?;
    let shell = blocking::Proxy::new(connection, SHELL_NAME, SHELL_PATH, SHELL_NAME)?;
    Ok(Host {
        compositor: Box::new(ShellCompositor {
            proxy: companion.clone(),
            strategy: None,
            warned: Cell::new(false),
        }),
        osd: Box::new(ShellOsd {
            shell,
            companion: companion.clone(),
            warned: Cell::new(false),
        }),
        keyboard: Box::new(ShellKeyboard { proxy: companion.clone(), warned: Cell::new(false) }),
        audio: Box::new(ShellAudio { proxy: companion, warned: Cell::new(false) }),
        brightness: Box::new(PowerBrightness { warned: Cell::new(false) }),
        media: Box::new(MprisMedia { warned: Cell::new(false) }),
    })
}

fn warn_once(warned: &Cell<bool>, what: &str, err: &zbus::Error) {
    if !warned.replace(true) {
        warn!(?err, "{what} unavailable, degrading");
    }
}

// {{{ Compositor

struct ShellCompositor {
    proxy: blocking::Proxy<'static>,
    /// Applied locally before progress crosses the bus; the shell side only
    /// ever sees renderable values.
    strategy: Option<Box<dyn TransitionStrategy>>,
    warned: Cell<bool>,
}

impl ShellCompositor {
    fn get<R>(&self, method: &'static str, fallback: R) -> R
    where
        R: for<'de> serde::Deserialize<'de> + zbus::zvariant::Type,
    {
        match self.proxy.call(method, &()) {
            Ok(value) => value,
            Err(err) => {
                warn_once(&self.warned, method, &err);
                fallback
            }
        }
    }

    fn send<B>(&self, method: &'static str, body: &B)
    where
        B: serde::Serialize + zbus::zvariant::DynamicType,
    {
        if let Err(err) = self.proxy.call::<_, _, ()>(method, body) {
            warn_once(&self.warned, method, &err);
        }
    }
}

impl Compositor for ShellCompositor {
    fn screen_size(&self) -> (f64, f64) {
        let (width, height) = self.get::<(i32, i32)>("ScreenSize", (1920, 1080));
        (f64::from(width), f64::from(height))
    }

    fn action_mode(&self) -> ActionMode {
        ActionMode::from_bits_truncate(self.get::<u32>("ActionMode", ActionMode::NORMAL.bits()))
    }

    fn search_active(&self) -> bool {
        self.get("SearchActive", false)
    }

    fn active_monitor(&self) -> i32 {
        self.get("ActiveMonitor", 0)
    }

    fn workspace_switch_begin(
        &mut self,
        confirm: &mut dyn SwipeConfirm,
        monitor: i32,
    ) -> Result<(), TrackerError> {
        let (count, active, distance) = match self
            .proxy
            .call::<_, _, (u32, u32, f64)>("WorkspaceLayout", &(monitor,))
        {
            Ok(layout) => layout,
            Err(err) => {
                warn_once(&self.warned, "WorkspaceLayout", &err);
                return Ok(());
            }
        };
        let snap_points = (0..count.max(1)).map(f64::from).collect();
        let current = f64::from(active);
        confirm.confirm_swipe(distance.max(1.0), snap_points, current, current)
    }

    fn workspace_switch_update(&mut self, progress: f64) {
        self.send("WorkspaceUpdate", &(progress,));
    }

    fn workspace_switch_end(&mut self, duration: Duration, progress: f64) {
        self.send("WorkspaceEnd", &(duration.as_millis() as u32, progress));
    }

    fn overview_progress(&self) -> f64 {
        self.get("OverviewProgress", 0.0)
    }

    fn overview_begin(&mut self, confirm: &mut dyn SwipeConfirm) -> Result<(), TrackerError> {
        let (distance, current) = match self
            .proxy
            .call::<_, _, (f64, f64)>("OverviewGeometry", &())
        {
            Ok(geometry) => geometry,
            Err(err) => {
                warn_once(&self.warned, "OverviewGeometry", &err);
                return Ok(());
            }
        };
        confirm.confirm_swipe(distance.max(1.0), vec![0.0, 1.0, 2.0], current, current)
    }

    fn overview_update(&mut self, progress: f64) {
        let rendered = match &self.strategy {
            Some(strategy) => strategy.render_progress(progress),
            None => progress,
        };
        self.send("OverviewUpdate", &(rendered,));
    }

    fn overview_end(&mut self, duration: Duration, progress: f64) {
        self.send("OverviewEnd", &(duration.as_millis() as u32, progress));
    }

    fn set_transition_strategy(&mut self, strategy: Option<Box<dyn TransitionStrategy>>) {
        self.strategy = strategy;
    }

    fn switcher_open(&mut self) -> usize {
        self.get::<u32>("SwitcherOpen", 0) as usize
    }

    fn switcher_select(&mut self, index: usize) {
        self.send("SwitcherSelect", &(index as u32,));
    }

    fn switcher_activate(&mut self) {
        self.send("SwitcherActivate", &());
    }

    fn switcher_close(&mut self) {
        self.send("SwitcherClose", &());
    }

    fn focused_window_exists(&self) -> bool {
        self.get::<(bool, bool, String)>("FocusedWindow", (false, false, String::new())).0
    }

    fn focused_is_maximized(&self) -> bool {
        self.get::<(bool, bool, String)>("FocusedWindow", (false, false, String::new())).1
    }

    fn maximize_focused(&mut self) {
        self.send("MaximizeFocused", &());
    }

    fn unmaximize_focused(&mut self) {
        self.send("UnmaximizeFocused", &());
    }

    fn minimize_focused(&mut self) {
        self.send("MinimizeFocused", &());
    }

    fn close_focused(&mut self) {
        self.send("CloseFocused", &());
    }

    fn show_desktop(&mut self) {
        self.send("ShowDesktop", &());
    }

    fn focused_app_id(&self) -> Option<String> {
        let (exists, _, app_id) =
            self.get::<(bool, bool, String)>("FocusedWindow", (false, false, String::new()));
        (exists && !app_id.is_empty()).then_some(app_id)
    }
}

// }}}

// {{{ OSD

struct ShellOsd {
    shell: blocking::Proxy<'static>,
    companion: blocking::Proxy<'static>,
    warned: Cell<bool>,
}

impl Osd for ShellOsd {
    fn show(&mut self, monitor: i32, icon: &str, label: Option<&str>, level: f64) {
        let mut params: HashMap<&str, Value<'_>> = HashMap::new();
        params.insert("icon", Value::from(icon));
        params.insert("level", Value::from(level));
        params.insert("monitor", Value::from(monitor));
        if let Some(label) = label {
            params.insert("label", Value::from(label));
        }
        if let Err(err) = self.shell.call::<_, _, ()>("ShowOSD", &(params,)) {
            warn_once(&self.warned, "ShowOSD", &err);
        }
    }

    fn hide_all(&mut self) {
        if let Err(err) = self.companion.call::<_, _, ()>("HideOsd", &()) {
            warn_once(&self.warned, "HideOsd", &err);
        }
    }
}

// }}}

// {{{ Keyboard

struct ShellKeyboard {
    proxy: blocking::Proxy<'static>,
    warned: Cell<bool>,
}

fn key_name(key: Key) -> &'static str {
    match key {
        Key::Alt => "Alt_L",
        Key::Ctrl => "Control_L",
        Key::Shift => "Shift_L",
        Key::Left => "Left",
        Key::Right => "Right",
        Key::PageUp => "Prior",
        Key::PageDown => "Next",
        Key::Tab => "Tab",
        Key::KeyW => "w",
        Key::Forward => "XF86Forward",
        Key::Back => "XF86Back",
        Key::AudioNext => "XF86AudioNext",
        Key::AudioPrev => "XF86AudioPrev",
    }
}

impl VirtualKeyboard for ShellKeyboard {
    fn tap(&mut self, keys: &[Key]) {
        let names: Vec<&str> = keys.iter().map(|&key| key_name(key)).collect();
        if let Err(err) = self.proxy.call::<_, _, ()>("SendKeys", &(names,)) {
            warn_once(&self.warned, "SendKeys", &err);
        }
    }
}

// }}}

// {{{ Audio

struct ShellAudio {
    proxy: blocking::Proxy<'static>,
    warned: Cell<bool>,
}

impl ShellAudio {
    fn mixer(&self) -> (f64, f64) {
        match self.proxy.call::<_, _, (f64, f64)>("GetVolume", &()) {
            Ok(mixer) => mixer,
            Err(err) => {
                warn_once(&self.warned, "GetVolume", &err);
                (0.0, 1.0)
            }
        }
    }
}

impl Audio for ShellAudio {
    fn max_volume(&self) -> f64 {
        self.mixer().1
    }

    fn volume(&self) -> f64 {
        self.mixer().0
    }

    fn set_volume(&mut self, volume: f64) {
        if let Err(err) = self.proxy.call::<_, _, ()>("SetVolume", &(volume,)) {
            warn_once(&self.warned, "SetVolume", &err);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        if let Err(err) = self.proxy.call::<_, _, ()>("SetMuted", &(muted,)) {
            warn_once(&self.warned, "SetMuted", &err);
        }
    }

    fn port_label(&self) -> Option<String> {
        match self.proxy.call::<_, _, String>("PortLabel", &()) {
            Ok(label) if !label.is_empty() => Some(label),
            Ok(_) => None,
            Err(err) => {
                warn_once(&self.warned, "PortLabel", &err);
                None
            }
        }
    }
}

// }}}

// {{{ Brightness

struct PowerBrightness {
    warned: Cell<bool>,
}

impl PowerBrightness {
    fn proxy(&self) -> zbus::Result<blocking::Proxy<'static>> {
        blocking::Proxy::new(&*DBUS_CONNECTION, POWER_NAME, POWER_PATH, POWER_SCREEN_IFACE)
    }
}

impl Brightness for PowerBrightness {
    fn brightness(&self) -> Option<f64> {
        let value = self.proxy().and_then(|proxy| {
            proxy
                .get_property::<i32>("Brightness")
                .map_err(zbus::Error::from)
        });
        match value {
            // gsd reports -1 when no backlight is present.
            Ok(value) if value >= 0 => Some(f64::from(value)),
            Ok(_) => None,
            Err(err) => {
                warn_once(&self.warned, "Brightness", &err);
                None
            }
        }
    }

    fn set_brightness(&mut self, value: f64) {
        let result = self.proxy().and_then(|proxy| {
            proxy
                .set_property("Brightness", value.round() as i32)
                .map_err(zbus::Error::from)
        });
        if let Err(err) = result {
            warn_once(&self.warned, "Brightness", &err);
        }
    }
}

// }}}

// {{{ Media

struct MprisMedia {
    warned: Cell<bool>,
}

/// Picks the MPRIS player to address: the first one reporting `Playing`,
/// falling back to the first player on the bus.
fn pick_player(connection: &blocking::Connection) -> zbus::Result<Option<blocking::Proxy<'static>>> {
    let names = blocking::fdo::DBusProxy::new(connection)?.list_names()?;
    let mut fallback = None;
    for name in names {
        if !name.as_str().starts_with(MPRIS_PREFIX) {
            continue;
        }
        let proxy = blocking::Proxy::new(
            connection,
            name.to_string(),
            MPRIS_PATH,
            MPRIS_PLAYER_IFACE,
        )?;
        match proxy.get_property::<String>("PlaybackStatus") {
            Ok(status) if status == "Playing" => return Ok(Some(proxy)),
            Ok(_) if fallback.is_none() => fallback = Some(proxy),
            _ => {}
        }
    }
    Ok(fallback)
}

impl MediaBus for MprisMedia {
    fn call(&mut self, action: MediaAction) {
        let method = match action {
            MediaAction::Next => "Next",
            MediaAction::Previous => "Previous",
            MediaAction::PlayPause => "PlayPause",
        };
        let result = pick_player(&DBUS_CONNECTION).and_then(|player| match player {
            Some(player) => player.call::<_, _, ()>(method, &()),
            None => {
                debug!("no media player on the bus");
                Ok(())
            }
        });
        if let Err(err) = result {
            warn_once(&self.warned, "MPRIS", &err);
        }
    }
}

// }}}

// {{{ Input events

/// One `TouchpadGesture` signal, as emitted by the companion interface.
type GestureSignal = (String, String, u32, f64, f64, f64, f64, bool, u64);

fn decode_event(signal: &GestureSignal) -> Option<TouchpadEvent> {
    let (kind, phase, fingers, dx, dy, scale, rotation, cancelled, time_us) = signal;
    let (fingers, cancelled) = (*fingers, *cancelled);
    let time = Duration::from_micros(*time_us);
    match (kind.as_str(), phase.as_str()) {
        ("swipe", "begin") => Some(TouchpadEvent::SwipeBegin { fingers, time }),
        ("swipe", "update") => Some(TouchpadEvent::SwipeUpdate { dx: *dx, dy: *dy, time }),
        ("swipe", "end") => Some(TouchpadEvent::SwipeEnd { cancelled, time }),
        ("pinch", "begin") => Some(TouchpadEvent::PinchBegin { fingers, time }),
        ("pinch", "update") => Some(TouchpadEvent::PinchUpdate {
            dx: *dx,
            dy: *dy,
            scale: *scale,
            rotation: *rotation,
            time,
        }),
        ("pinch", "end") => Some(TouchpadEvent::PinchEnd { cancelled, time }),
        ("hold", "begin") => Some(TouchpadEvent::HoldBegin { fingers, time }),
        ("hold", "end") => Some(TouchpadEvent::HoldEnd { cancelled, time }),
        _ => {
            trace!(%kind, %phase, "unknown touchpad gesture signal");
            None
        }
    }
}

/// Subscribes to the companion's gesture signals on a dedicated thread and
/// forwards them into the event loop through `tx`.
pub fn spawn_event_listener(
    tx: calloop::channel::Sender<TouchpadEvent>,
) -> anyhow::Result<std::thread::JoinHandle<()>> {
    let proxy = blocking::Proxy::new(
        &*DBUS_CONNECTION,
        COMPANION_NAME,
        COMPANION_PATH,
        COMPANION_IFACE,
    )?;
    let handle = std::thread::Builder::new()
        .name("Touchpad gesture listener".to_owned())
        .spawn(move || {
            let signals = match proxy.receive_signal("TouchpadGesture") {
                Ok(signals) => signals,
                Err(err) => {
                    error!(?err, "Failed to subscribe to touchpad gesture signals");
                    return;
                }
            };
            for message in signals {
                let signal: GestureSignal = match message.body().deserialize() {
                    Ok(signal) => signal,
                    Err(err) => {
                        warn!(?err, "Malformed touchpad gesture signal");
                        continue;
                    }
                };
                if let Some(event) = decode_event(&signal) {
                    if tx.send(event).is_err() {
                        // Channel gone, the event loop is shutting down.
                        break;
                    }
                }
            }
        })?;
    Ok(handle)
}

// }}}
