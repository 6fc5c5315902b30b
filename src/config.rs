//! User settings and their persistence
//!
//! Every field is read independently: a missing or corrupt value falls
//! back to its default without discarding the rest of the file.

use crate::error::CallerResult;
use crate::narration::{NarrationSettings, RepeatMode, VoiceInfo};
use crate::pool::{Category, EnabledCategories};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;
pub const DEFAULT_INTERVAL_SECS: u32 = 5;

/// Accepted speech rate range (Web Speech API limits)
pub const RATE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=10.0;
pub const PITCH_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
pub const INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Color theme. `None` in settings means follow the system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub rate: f32,
    pub pitch: f32,
    pub interval_secs: u32,
    pub voice: Option<String>,
    pub categories: EnabledCategories,
    pub repeat_mode: RepeatMode,
    pub theme: Option<Theme>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            interval_secs: DEFAULT_INTERVAL_SECS,
            voice: None,
            categories: EnabledCategories::default(),
            repeat_mode: RepeatMode::default(),
            theme: None,
        }
    }
}

impl Settings {
    /// Parse settings text, never failing
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(val) => Self::from_value(&val),
            Err(e) => {
                warn!("⚠️ Settings are not valid JSON, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Read each known field, keeping the default for anything unusable
    pub fn from_value(val: &Value) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = val
            .get("rate")
            .and_then(lenient_f64)
            .filter(|v| RATE_RANGE.contains(v))
        {
            cfg.rate = v as f32;
        }
        if let Some(v) = val
            .get("pitch")
            .and_then(lenient_f64)
            .filter(|v| PITCH_RANGE.contains(v))
        {
            cfg.pitch = v as f32;
        }
        if let Some(v) = val
            .get("interval_secs")
            .and_then(lenient_u64)
            .filter(|v| INTERVAL_RANGE.contains(v))
        {
            cfg.interval_secs = v as u32;
        }
        if let Some(v) = val
            .get("voice")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
        {
            cfg.voice = Some(v.to_string());
        }
        if let Some(map) = val.get("categories").and_then(|v| v.as_object()) {
            for category in Category::all() {
                if let Some(on) = map.get(category.label()).and_then(lenient_bool) {
                    cfg.categories.set(category, on);
                }
            }
        }

        cfg.repeat_mode = match val
            .get("repeat_mode")
            .and_then(|v| v.as_str())
            .and_then(|v| v.parse().ok())
        {
            Some(mode) => mode,
            None => legacy_repeat_mode(val).unwrap_or_default(),
        };

        cfg.theme = match val.get("theme").and_then(|v| v.as_str()) {
            Some("light") => Some(Theme::Light),
            Some("dark") => Some(Theme::Dark),
            _ => None,
        };

        cfg
    }

    pub fn to_json(&self) -> CallerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Narration parameters with an already resolved voice
    pub fn narration(&self, voice: Option<VoiceInfo>) -> NarrationSettings {
        NarrationSettings {
            voice,
            rate: self.rate,
            pitch: self.pitch,
            repeat_mode: self.repeat_mode,
        }
    }

    /// Concrete theme, resolving "follow the system" with the given hint
    pub fn effective_theme(&self, system_prefers_dark: bool) -> Theme {
        self.theme.unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }
}

/// Older settings stored two independent toggles instead of a mode.
/// Digits won when both were on; digits defaulted to on.
fn legacy_repeat_mode(val: &Value) -> Option<RepeatMode> {
    let digits = val.get("repeat_digits").and_then(lenient_bool);
    let number = val.get("repeat_number").and_then(lenient_bool);
    if digits.is_none() && number.is_none() {
        return None;
    }

    Some(if digits.unwrap_or(true) {
        RepeatMode::SpellDigits
    } else if number.unwrap_or(false) {
        RepeatMode::RepeatNumber
    } else {
        RepeatMode::Off
    })
}

fn lenient_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Where settings are loaded from and saved to
pub trait SettingsStore: Send + std::fmt::Debug {
    /// Load settings; never fails, defaults fill any gaps
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> CallerResult<()>;
}

/// Settings kept as a JSON file
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl Default for JsonSettingsStore {
    fn default() -> Self {
        Self::new(settings_path())
    }
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Settings {
        if !self.path.exists() {
            debug!("No settings at {}, using defaults", self.path.display());
            return Settings::default();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("⚠️ Could not read {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(val) => Settings::from_value(&val),
            Err(e) => {
                // Backup corrupt file for debugging
                let backup_path = self.path.with_extension("json.corrupt");
                warn!(
                    "⚠️ Settings file corrupted ({}), moving it to {}",
                    e,
                    backup_path.display()
                );
                let _ = std::fs::rename(&self.path, &backup_path);
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> CallerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, settings.to_json()?)?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store holding the raw serialized text. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from arbitrary stored text, valid or not
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.to_string()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|raw| raw.clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.raw()
            .map(|raw| Settings::from_json(&raw))
            .unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> CallerResult<()> {
        let json = settings.to_json()?;
        let mut raw = self
            .raw
            .lock()
            .map_err(|e| crate::error::CallerError::Settings(e.to_string()))?;
        *raw = Some(json);
        Ok(())
    }
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bingo-caller")
        .join("settings.json")
}
