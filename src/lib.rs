//! Sky Intruder - a canvas arcade shooter with persistent progression
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, game state)
//! - `progression`: Persistent credits, upgrades, and skin unlocks
//! - `settings`: Volume and turret-slot preferences
//! - `input`: Raw key/pointer state to simulation/menu commands
//! - `menu`: Menu screens and the pause overlay
//! - `audio`: Procedural sound effects driven by simulation events

pub mod audio;
pub mod input;
pub mod menu;
pub mod progression;
pub mod settings;
pub mod sim;

pub use progression::ProgressionStore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the original frame-locked tuning)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Player defaults (speeds are per tick)
    pub const PLAYER_SIZE: f32 = 60.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    /// Max cosmetic tilt angle in radians (~17 degrees)
    pub const PLAYER_MAX_TILT: f32 = 0.3;
    pub const PLAYER_TILT_STEP: f32 = 0.15;

    /// Projectile defaults
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 10.0;
    /// Ticks between cannon shots (0.25 s at 60 Hz)
    pub const CANNON_COOLDOWN_TICKS: u64 = 15;
    /// Projectiles are culled this far past any playfield edge
    pub const OFFSCREEN_MARGIN: f32 = 20.0;

    /// Hostile defaults
    pub const HOSTILE_SIZE: f32 = 35.0;
    pub const HOSTILE_BASE_SPEED: f32 = 3.0;
    /// Spawn interval in ticks at level 1; shrinks by 10 per level
    pub const BASE_SPAWN_INTERVAL: u32 = 60;
    /// Spawn interval floor
    pub const MIN_SPAWN_INTERVAL: u32 = 20;

    /// Ticks between turret volleys (3 s at 60 Hz)
    pub const TURRET_COOLDOWN_TICKS: u64 = 180;
    pub const TURRET_SLOTS: usize = 3;

    /// Respawn-immunity window after losing a life (2 s at 60 Hz)
    pub const RESPAWN_TICKS: u32 = 120;
    /// Level-up banner duration (3 s at 60 Hz)
    pub const LEVEL_BANNER_TICKS: u32 = 180;
    /// Screen shake duration after a ram
    pub const SCREEN_SHAKE_TICKS: u32 = 10;

    /// Kills required to advance a level
    pub const KILLS_PER_LEVEL: u32 = 10;
    pub const SCORE_PER_KILL: u64 = 10;

    /// Explosion particle tuning
    pub const EXPLOSION_LIFE_TICKS: u32 = 30;
    pub const EXPLOSION_FRICTION: f32 = 0.95;
}
