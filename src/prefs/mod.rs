//! Preference persistence for the focus timer.
//!
//! Preferences are a flat set of named keys stored in one JSON document.
//! Every key is decoded independently with typed validation: a missing,
//! malformed, or out-of-range value falls back to its documented default
//! without affecting the other keys. Writes persist immediately and never
//! surface an error to the caller; when the platform offers no usable
//! persistence the store degrades to in-memory only.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{SoundPreset, Theme, TimerStyle};

/// File name of the preference document inside the config directory.
const PREFS_FILE: &str = "prefs.json";

/// Directory under the home directory where state lives.
pub const CONFIG_DIR: &str = ".focustick";

// ============================================================================
// Preference keys
// ============================================================================

mod keys {
    pub const THEME: &str = "theme";
    pub const FOCUS_DURATION: &str = "focus_duration_minutes";
    pub const BREAK_DURATION: &str = "break_duration_minutes";
    pub const TIMER_STYLE: &str = "timer_style";
    pub const SOUND_ENABLED: &str = "sound_enabled";
    pub const SOUND_PRESET: &str = "sound_preset";
    pub const SOUND_VOLUME: &str = "sound_volume";
    pub const DESKTOP_NOTIFICATIONS: &str = "desktop_notifications_enabled";
}

// ============================================================================
// Preferences
// ============================================================================

/// The decoded preference set, always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub theme: Theme,
    pub focus_duration_minutes: u32,
    pub break_duration_minutes: u32,
    pub timer_style: TimerStyle,
    pub sound_enabled: bool,
    pub sound_preset: SoundPreset,
    pub sound_volume: f32,
    pub desktop_notifications_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            focus_duration_minutes: 25,
            break_duration_minutes: 5,
            timer_style: TimerStyle::Circle,
            sound_enabled: true,
            sound_preset: SoundPreset::Chime,
            sound_volume: 0.6,
            desktop_notifications_enabled: false,
        }
    }
}

impl Preferences {
    /// Decodes preferences from a raw JSON object, validating each key
    /// independently and substituting the default for anything invalid.
    fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            theme: decode_enum(map, keys::THEME).unwrap_or(defaults.theme),
            focus_duration_minutes: decode_positive_u32(map, keys::FOCUS_DURATION)
                .unwrap_or(defaults.focus_duration_minutes),
            break_duration_minutes: decode_positive_u32(map, keys::BREAK_DURATION)
                .unwrap_or(defaults.break_duration_minutes),
            timer_style: decode_enum(map, keys::TIMER_STYLE).unwrap_or(defaults.timer_style),
            sound_enabled: decode_bool(map, keys::SOUND_ENABLED).unwrap_or(defaults.sound_enabled),
            sound_preset: decode_enum(map, keys::SOUND_PRESET).unwrap_or(defaults.sound_preset),
            sound_volume: decode_unit_f32(map, keys::SOUND_VOLUME)
                .unwrap_or(defaults.sound_volume),
            desktop_notifications_enabled: decode_bool(map, keys::DESKTOP_NOTIFICATIONS)
                .unwrap_or(defaults.desktop_notifications_enabled),
        }
    }

    /// Encodes the full preference set as a JSON object.
    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::THEME.into(), Value::from(self.theme.as_str()));
        map.insert(
            keys::FOCUS_DURATION.into(),
            Value::from(self.focus_duration_minutes),
        );
        map.insert(
            keys::BREAK_DURATION.into(),
            Value::from(self.break_duration_minutes),
        );
        map.insert(
            keys::TIMER_STYLE.into(),
            Value::from(self.timer_style.as_str()),
        );
        map.insert(keys::SOUND_ENABLED.into(), Value::from(self.sound_enabled));
        map.insert(
            keys::SOUND_PRESET.into(),
            Value::from(self.sound_preset.as_str()),
        );
        map.insert(
            keys::SOUND_VOLUME.into(),
            Value::from(f64::from(self.sound_volume)),
        );
        map.insert(
            keys::DESKTOP_NOTIFICATIONS.into(),
            Value::from(self.desktop_notifications_enabled),
        );
        map
    }
}

fn decode_enum<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    serde_json::from_value(value.clone()).ok()
}

fn decode_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key)?.as_bool()
}

fn decode_positive_u32(map: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = map.get(key)?.as_u64()?;
    let value = u32::try_from(value).ok()?;
    (value > 0).then_some(value)
}

fn decode_unit_f32(map: &Map<String, Value>, key: &str) -> Option<f32> {
    let value = map.get(key)?.as_f64()?;
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value as f32)
}

// ============================================================================
// PreferenceStore
// ============================================================================

/// Keyed preference store with immediate, best-effort persistence.
#[derive(Debug)]
pub struct PreferenceStore {
    /// Backing file; `None` means the store is in-memory only.
    path: Option<PathBuf>,
    values: Preferences,
}

impl PreferenceStore {
    /// Loads preferences from the default location (`~/.focustick/prefs.json`).
    ///
    /// Falls back to an in-memory store when no home directory is available.
    pub fn load() -> Self {
        match default_prefs_path() {
            Some(path) => Self::load_from(path),
            None => {
                warn!("No home directory found, preferences are in-memory only");
                Self::in_memory()
            }
        }
    }

    /// Loads preferences from an explicit file path.
    ///
    /// A missing or unreadable file yields the defaults; a corrupt document
    /// yields the defaults for the affected keys only when the document is
    /// still an object, or for everything otherwise.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => Preferences::from_map(&map),
                Ok(_) | Err(_) => {
                    warn!("Preference file {:?} is not a JSON object, using defaults", path);
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                warn!("Could not read preferences from {:?}: {}", path, e);
                Preferences::default()
            }
        };

        Self {
            path: Some(path),
            values,
        }
    }

    /// Creates a store with defaults and no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Preferences::default(),
        }
    }

    /// Returns the current preference set.
    pub fn prefs(&self) -> &Preferences {
        &self.values
    }

    /// Returns the backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ------------------------------------------------------------------------
    // Setters: validate, apply, persist. Each returns whether the value
    // was accepted; persistence failures degrade to in-memory silently.
    // ------------------------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) {
        self.values.theme = theme;
        self.persist();
    }

    pub fn set_focus_duration(&mut self, minutes: u32) -> bool {
        if minutes == 0 {
            return false;
        }
        self.values.focus_duration_minutes = minutes;
        self.persist();
        true
    }

    pub fn set_break_duration(&mut self, minutes: u32) -> bool {
        if minutes == 0 {
            return false;
        }
        self.values.break_duration_minutes = minutes;
        self.persist();
        true
    }

    pub fn set_timer_style(&mut self, style: TimerStyle) {
        self.values.timer_style = style;
        self.persist();
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.values.sound_enabled = enabled;
        self.persist();
    }

    pub fn set_sound_preset(&mut self, preset: SoundPreset) {
        self.values.sound_preset = preset;
        self.persist();
    }

    pub fn set_sound_volume(&mut self, volume: f32) -> bool {
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return false;
        }
        self.values.sound_volume = volume;
        self.persist();
        true
    }

    pub fn set_desktop_notifications_enabled(&mut self, enabled: bool) {
        self.values.desktop_notifications_enabled = enabled;
        self.persist();
    }

    /// Writes the full document. On any failure the store drops its backing
    /// path and continues in-memory; the caller never sees an error.
    fn persist(&mut self) {
        let Some(path) = &self.path else {
            return;
        };

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let doc = Value::Object(self.values.to_map());
            fs::write(path, serde_json::to_string_pretty(&doc)?.as_bytes())
        })();

        match result {
            Ok(()) => debug!("Preferences written to {:?}", path),
            Err(e) => {
                warn!(
                    "Could not persist preferences to {:?}: {}; continuing in-memory",
                    path, e
                );
                self.path = None;
            }
        }
    }
}

/// Default preference file path under the home directory.
pub fn default_prefs_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(PREFS_FILE))
}

// ============================================================================
// Tests
// ============================================================================
