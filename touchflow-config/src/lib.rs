//! Configuration types and configuration file loading for touchflow, using
//! [`toml`] and [`serde`].
//!
//! The configuration lives at `$XDG_CONFIG_HOME/touchflow/config.toml`. A
//! default file is written out on first start. Every field has a documented
//! default so a partial (or missing) file always yields a usable config.

#[macro_use]
extern crate tracing;

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::Deserialize;

static DEFAULT_CONFIG_CONTENTS: &str = include_str!("../res/config.toml");

const fn default_true() -> bool {
    true
}

const fn default_false() -> bool {
    false
}

fn default_speed() -> f64 {
    1.0
}

const fn default_alttab_delay() -> u64 {
    100
}

const fn default_hold_swipe_delay() -> u64 {
    100
}

const fn default_hold_tap_fingers() -> u32 {
    4
}

/// What a swipe slot (finger count + axis) is bound to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum SwipeGesture {
    #[default]
    None,
    OverviewNavigation,
    WorkspaceSwitching,
    WindowSwitching,
    VolumeControl,
    WindowManipulation,
    MediaControl,
    BrightnessControl,
}

/// What a pinch slot (finger count) is bound to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum PinchGesture {
    #[default]
    None,
    ShowDesktop,
    CloseWindow,
    CloseDocument,
}

/// Which snap-point set the overview navigation gesture cycles through.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum OverviewNavigation {
    Cyclic,
    #[default]
    Gnome,
    WindowPickerOnly,
}

/// Key sequence injected by the forward/back hold-and-swipe gesture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum ForwardBackKeyBind {
    #[default]
    Default,
    ForwardBack,
    PageUpDown,
    RightLeft,
    AudioNextPrev,
    TabNextPrev,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AppKeyBind {
    pub kind: ForwardBackKeyBind,
    pub reversed: bool,
}

impl Default for AppKeyBind {
    fn default() -> Self {
        Self {
            kind: ForwardBackKeyBind::Default,
            reversed: false,
        }
    }
}

/// Gesture *shape*: which finger counts and axes map to which behavior.
///
/// Any change here invalidates the live consumer set, so these keys trigger
/// an immediate engine rebuild.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Gestures {
    pub vertical_swipe_3_fingers: SwipeGesture,
    pub vertical_swipe_4_fingers: SwipeGesture,
    pub horizontal_swipe_3_fingers: SwipeGesture,
    pub horizontal_swipe_4_fingers: SwipeGesture,
    pub pinch_3_fingers: PinchGesture,
    pub pinch_4_fingers: PinchGesture,
    pub overview_navigation_states: OverviewNavigation,
    #[serde(default = "default_true")]
    pub follow_natural_scroll: bool,
    #[serde(default = "default_true")]
    pub default_overview_gesture_direction: bool,
    #[serde(default = "default_false")]
    pub allow_minimize_window: bool,
    #[serde(default = "default_false")]
    pub invert_volume_direction: bool,
    #[serde(default = "default_false")]
    pub invert_media_direction: bool,
    #[serde(default = "default_false")]
    pub invert_brightness_direction: bool,
    #[serde(default = "default_false")]
    pub enable_forward_back_gesture: bool,
    #[serde(default = "default_false")]
    pub enable_vertical_app_gesture: bool,
    #[serde(default = "default_hold_tap_fingers")]
    pub hold_tap_fingers: u32,
}

impl Default for Gestures {
    fn default() -> Self {
        Self {
            vertical_swipe_3_fingers: SwipeGesture::OverviewNavigation,
            vertical_swipe_4_fingers: SwipeGesture::WorkspaceSwitching,
            horizontal_swipe_3_fingers: SwipeGesture::WorkspaceSwitching,
            horizontal_swipe_4_fingers: SwipeGesture::WindowSwitching,
            pinch_3_fingers: PinchGesture::None,
            pinch_4_fingers: PinchGesture::None,
            overview_navigation_states: OverviewNavigation::default(),
            follow_natural_scroll: true,
            default_overview_gesture_direction: true,
            allow_minimize_window: false,
            invert_volume_direction: false,
            invert_media_direction: false,
            invert_brightness_direction: false,
            enable_forward_back_gesture: false,
            enable_vertical_app_gesture: false,
            hold_tap_fingers: default_hold_tap_fingers(),
        }
    }
}

/// Tuning scalars that affect gesture feel but not gesture shape.
///
/// Changing these reloads the engine behind a short debounce so a settings
/// slider being dragged does not rebuild the consumer set on every tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Tuning {
    #[serde(default = "default_speed")]
    pub touchpad_speed_scale: f64,
    #[serde(default = "default_speed")]
    pub touchpad_pinch_speed: f64,
    #[serde(default = "default_speed")]
    pub volume_control_speed: f64,
    #[serde(default = "default_speed")]
    pub media_control_speed: f64,
    #[serde(default = "default_speed")]
    pub brightness_control_speed: f64,
    #[serde(default = "default_alttab_delay")]
    pub alttab_delay_ms: u64,
    #[serde(default = "default_hold_swipe_delay")]
    pub hold_swipe_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            touchpad_speed_scale: 1.0,
            touchpad_pinch_speed: 1.0,
            volume_control_speed: 1.0,
            media_control_speed: 1.0,
            brightness_control_speed: 1.0,
            alttab_delay_ms: default_alttab_delay(),
            hold_swipe_delay_ms: default_hold_swipe_delay(),
        }
    }
}

/// Per-application key binds for the forward/back gesture, keyed by app id.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForwardBack {
    pub apps: HashMap<String, AppKeyBind>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub gestures: Gestures,
    pub tuning: Tuning,
    pub forward_back: ForwardBack,
}

/// How an observed configuration change should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadClass {
    /// Nothing relevant changed.
    Unchanged,
    /// Only tuning scalars changed; reload after the debounce delay.
    Debounced,
    /// Gesture shape changed; reload immediately.
    Immediate,
}

/// Classifies the difference between two configuration snapshots.
///
/// Mirrors the distinction between animation-affecting settings (speed
/// scalars, delays) and settings that change which gestures exist at all.
pub fn reload_class(old: &Config, new: &Config) -> ReloadClass {
    if old == new {
        ReloadClass::Unchanged
    } else if old.gestures == new.gestures && old.forward_back == new.forward_back {
        ReloadClass::Debounced
    } else {
        ReloadClass::Immediate
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error while loading the config: {0}")]
    Io(#[from] std::io::Error),
    #[error("error while parsing the config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Path of the configuration file, honoring `$XDG_CONFIG_HOME`.
    pub fn path() -> Result<PathBuf, Error> {
        let path = xdg::BaseDirectories::new().place_config_file("touchflow/config.toml")?;
        Ok(path)
    }

    /// Loads the configuration file, creating it from the embedded defaults
    /// if it does not exist yet.
    pub fn load() -> Result<Self, Error> {
        let path = Self::path()?;
        let reader = OpenOptions::new().read(true).write(false).open(&path);
        let mut reader = match reader {
            Ok(reader) => reader,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(?path, "No config file found, writing out defaults");
                let mut file = File::create_new(&path)?;
                writeln!(&mut file, "{DEFAULT_CONFIG_CONTENTS}")?;
                OpenOptions::new().read(true).write(false).open(&path)?
            }
            Err(err) => return Err(Error::Io(err)),
        };

        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        let config = toml::from_str(&buf)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contents_match_default_config() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_CONTENTS).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [gestures]
            vertical-swipe-3-fingers = "volume-control"

            [tuning]
            touchpad-speed-scale = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.gestures.vertical_swipe_3_fingers,
            SwipeGesture::VolumeControl
        );
        assert_eq!(
            parsed.gestures.vertical_swipe_4_fingers,
            SwipeGesture::WorkspaceSwitching
        );
        assert_eq!(parsed.tuning.touchpad_speed_scale, 2.5);
        assert_eq!(parsed.tuning.alttab_delay_ms, 100);
    }

    #[test]
    fn forward_back_app_table() {
        let parsed: Config = toml::from_str(
            r#"
            [forward-back.apps."org.mozilla.firefox"]
            kind = "page-up-down"
            reversed = true
            "#,
        )
        .unwrap();
        let bind = &parsed.forward_back.apps["org.mozilla.firefox"];
        assert_eq!(bind.kind, ForwardBackKeyBind::PageUpDown);
        assert!(bind.reversed);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("[gestures]\nfoo = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn tuning_only_change_is_debounced() {
        let old = Config::default();
        let mut new = Config::default();
        new.tuning.touchpad_speed_scale = 1.5;
        assert_eq!(reload_class(&old, &new), ReloadClass::Debounced);
    }

    #[test]
    fn shape_change_is_immediate() {
        let old = Config::default();
        let mut new = Config::default();
        new.gestures.horizontal_swipe_3_fingers = SwipeGesture::MediaControl;
        assert_eq!(reload_class(&old, &new), ReloadClass::Immediate);
    }

    #[test]
    fn identical_snapshots_are_unchanged() {
        let config = Config::default();
        assert_eq!(reload_class(&config, &config.clone()), ReloadClass::Unchanged);
    }
}
