//! Game settings and preferences
//!
//! Persisted separately from progression in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::TURRET_SLOTS;

/// Volume slider step used by the menus
pub const VOLUME_STEP: f32 = 0.1;

fn default_volume() -> f32 {
    0.5
}

fn default_turrets() -> [bool; TURRET_SLOTS] {
    [true; TURRET_SLOTS]
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Per-slot turret enable flags
    #[serde(default = "default_turrets")]
    pub turret_enabled: [bool; TURRET_SLOTS],
    #[serde(skip)]
    dirty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            turret_enabled: default_turrets(),
            dirty: false,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sky_intruder_settings";

    /// Parse persisted settings, clamping anything out of range
    pub fn from_json(json: &str) -> Option<Self> {
        let mut settings: Self = serde_json::from_str(json).ok()?;
        settings.sanitize();
        Some(settings)
    }

    pub fn sanitize(&mut self) {
        self.volume = self.volume.clamp(0.0, 1.0);
    }

    /// Nudge the volume by one slider step, staying in [0, 1]
    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.dirty = true;
    }

    /// Flip a turret slot; slots beyond the owned turret count are refused
    pub fn toggle_turret(&mut self, slot: usize, owned_turrets: u32) -> bool {
        if slot < TURRET_SLOTS && (owned_turrets as usize) > slot {
            self.turret_enabled[slot] = !self.turret_enabled[slot];
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&mut self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                self.dirty = false;
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&mut self) {
        self.dirty = false;
    }
}
