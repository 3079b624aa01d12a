//! Runtime settings
//!
//! Persisted separately from the leaderboard. Unknown or missing fields fall
//! back to defaults so older records keep loading.

use serde::{Deserialize, Serialize};

use crate::consts::{ASTEROID_DENSITY, FADE_SECONDS, LINE_DENSITY, TRIANGLE_DENSITY};
use crate::persistence::{self, Storage};

/// Which decorative scene plays in the background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AmbientStyle {
    #[default]
    Triangles,
    Lines,
}

impl AmbientStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbientStyle::Triangles => "Triangles",
            AmbientStyle::Lines => "Lines",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "triangles" => Some(AmbientStyle::Triangles),
            "lines" => Some(AmbientStyle::Lines),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Runner ticks per second (the minigame moves too fast at the default 40)
    pub tick_rate: u32,

    // === Densities (entities per pixel of surface area) ===
    pub triangle_density: f32,
    pub line_density: f32,
    /// Base of the score-dependent asteroid target
    pub asteroid_density: f32,

    /// Fade duration for scene switches
    pub transition_seconds: f32,
    pub ambient: AmbientStyle,

    /// Draw collision circles in red
    pub debug_collisions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate: 80,
            triangle_density: TRIANGLE_DENSITY,
            line_density: LINE_DENSITY,
            asteroid_density: ASTEROID_DENSITY,
            transition_seconds: FADE_SECONDS,
            ambient: AmbientStyle::Triangles,
            debug_collisions: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "firefly_settings";

    /// Load settings from storage, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Settings>(storage, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from storage");
                return settings.sanitized();
            }
            Ok(None) => log::info!("Using default settings"),
            Err(e) => log::warn!("Could not load settings ({}), using defaults", e),
        }
        Self::default()
    }

    /// Save settings; failures are logged and dropped
    pub fn save(&self, storage: &dyn Storage) {
        match persistence::save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }

    /// Replace out-of-range values with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tick_rate == 0 {
            self.tick_rate = defaults.tick_rate;
        }
        for (value, fallback) in [
            (&mut self.triangle_density, defaults.triangle_density),
            (&mut self.line_density, defaults.line_density),
            (&mut self.asteroid_density, defaults.asteroid_density),
            (&mut self.transition_seconds, defaults.transition_seconds),
        ] {
            if !value.is_finite() || *value < 0.0 {
                *value = fallback;
            }
        }
        self
    }
}
