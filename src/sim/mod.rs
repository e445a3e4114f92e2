//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use snapshot::{RenderSnapshot, snapshot};
pub use state::{
    Explosion, ExplosionSize, GameEvent, GamePhase, GameState, Hostile, HostileKind, Loadout,
    PlayerShip, Projectile, ProjectileSource, SessionStats,
};
pub use tick::{TickInput, tick};
