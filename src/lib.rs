//! Firefly - a small 2D canvas animation framework
//!
//! Core modules:
//! - `sim`: Value types, entities, scenes, transitions and the fixed-tick runner
//! - `scenes`: The ambient background scenes and the Asteroids minigame
//! - `renderer`: Drawing surface (scope stack, paths, colors) over a backend
//! - `platform`: Keyboard state and the cheat code matcher
//! - `persistence`: Key/value storage (LocalStorage on web)

pub mod app;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scenes;
pub mod settings;
pub mod sim;

pub use app::{App, Context};
pub use highscores::Leaderboard;
pub use settings::{AmbientStyle, Settings};

/// Framework configuration constants
pub mod consts {
    /// Default runner tick rate (iterations per second)
    pub const DEFAULT_TICK_RATE: u32 = 40;
    /// Delta handed to the very first tick, before any wall time has elapsed
    pub const BOOTSTRAP_DELTA: f32 = 1.0;
    /// Lag (seconds) past one tick interval before the runner catches up
    pub const CATCH_UP_THRESHOLD: f64 = 0.001;
    /// Maximum immediate catch-up ticks per frame to prevent spiral of death
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Default fade duration (seconds) for scene switches
    pub const FADE_SECONDS: f32 = 5.0;

    /// Decorative entity densities (entities per pixel of surface area)
    pub const TRIANGLE_DENSITY: f32 = 0.000_04;
    pub const LINE_DENSITY: f32 = 0.000_02;
    /// Asteroid density base (raised to a score dependent power)
    pub const ASTEROID_DENSITY: f32 = 0.000_004;
}

/// Convert degrees to radians
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}
