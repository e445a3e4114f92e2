//! Game state and core simulation types
//!
//! The per-run world: player ship, projectiles, hostiles, explosions, and
//! the session counters. Progression (credits, upgrades, skins) lives in
//! `crate::progression` and persists across runs; everything here is reset
//! by `GameState::new`.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen, pause overlay shown
    Paused,
    /// Run ended; explosions keep animating for the end screen
    GameOver,
}

/// Where a projectile came from - turret shots don't count toward accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSource {
    Cannon,
    Turret,
}

/// A projectile entity
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub source: ProjectileSource,
}

impl Projectile {
    /// A cannon shot travelling straight up
    pub fn cannon(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, -BULLET_SPEED),
            source: ProjectileSource::Cannon,
        }
    }

    /// A turret shot aimed along `dir` (unit vector)
    pub fn turret(pos: Vec2, dir: Vec2) -> Self {
        Self {
            pos,
            vel: dir * BULLET_SPEED,
            source: ProjectileSource::Turret,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, BULLET_WIDTH, BULLET_HEIGHT)
    }

    /// True once the projectile has left the playfield by the cull margin
    pub fn is_off_screen(&self) -> bool {
        self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > SCREEN_HEIGHT + OFFSCREEN_MARGIN
            || self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > SCREEN_WIDTH + OFFSCREEN_MARGIN
    }
}

/// Hostile aircraft classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    Light,
    Medium,
    Heavy,
}

impl HostileKind {
    pub const ALL: [HostileKind; 3] = [HostileKind::Light, HostileKind::Medium, HostileKind::Heavy];

    pub fn max_health(self) -> f32 {
        match self {
            HostileKind::Light => 100.0,
            HostileKind::Medium => 200.0,
            HostileKind::Heavy => 300.0,
        }
    }

    /// Damage dealt to the player on contact
    pub fn contact_damage(self) -> f32 {
        match self {
            HostileKind::Light => 25.0,
            HostileKind::Medium => 40.0,
            HostileKind::Heavy => 60.0,
        }
    }

    /// Weighted spawn chance (weights sum to 100)
    pub fn spawn_weight(self) -> u32 {
        match self {
            HostileKind::Light => 70,
            HostileKind::Medium => 25,
            HostileKind::Heavy => 5,
        }
    }

    /// Heavier airframes fly proportionally slower
    pub fn speed_factor(self) -> f32 {
        match self {
            HostileKind::Light => 1.0,
            HostileKind::Medium => 0.85,
            HostileKind::Heavy => 0.7,
        }
    }

    /// Horizontal hitbox widening to cover wing extent
    pub fn wing_margin(self) -> f32 {
        match self {
            HostileKind::Light => 12.0,
            HostileKind::Medium => 18.0,
            HostileKind::Heavy => 22.0,
        }
    }

    /// Credits awarded when destroyed
    pub fn credit_reward(self) -> u64 {
        match self {
            HostileKind::Light => 5,
            HostileKind::Medium => 10,
            HostileKind::Heavy => 15,
        }
    }
}

/// An enemy aircraft descending from the top edge
#[derive(Debug, Clone)]
pub struct Hostile {
    pub pos: Vec2,
    /// Fixed per-instance downward speed (px/tick)
    pub speed: f32,
    pub kind: HostileKind,
    pub health: f32,
}

impl Hostile {
    pub fn new(x: f32, kind: HostileKind, speed: f32) -> Self {
        Self {
            pos: Vec2::new(x, -HOSTILE_SIZE),
            speed,
            kind,
            health: kind.max_health(),
        }
    }

    /// Apply damage; returns true when this hit destroyed the hostile
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Collision box, widened horizontally for the wings
    pub fn hit_box(&self) -> Rect {
        Rect::at(self.pos, HOSTILE_SIZE, HOSTILE_SIZE).widened(self.kind.wing_margin())
    }

    pub fn center(&self) -> Vec2 {
        Rect::at(self.pos, HOSTILE_SIZE, HOSTILE_SIZE).center()
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.y > SCREEN_HEIGHT
    }
}

/// The player's aircraft
#[derive(Debug, Clone)]
pub struct PlayerShip {
    pub pos: Vec2,
    pub health: f32,
    /// Cosmetic bank angle, eased toward +/-PLAYER_MAX_TILT while strafing
    pub tilt: f32,
}

impl PlayerShip {
    pub fn new() -> Self {
        Self {
            pos: start_position(),
            health: PLAYER_MAX_HEALTH,
            tilt: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, PLAYER_SIZE, PLAYER_SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Reset health and position after the respawn countdown elapses
    pub fn respawn(&mut self) {
        self.health = PLAYER_MAX_HEALTH;
        self.pos = start_position();
    }
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self::new()
    }
}

/// Player start position: bottom center, 20 px off the bottom edge
pub fn start_position() -> Vec2 {
    Vec2::new(
        SCREEN_WIDTH / 2.0 - PLAYER_SIZE / 2.0,
        SCREEN_HEIGHT - PLAYER_SIZE - 20.0,
    )
}

/// Explosion size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionSize {
    Normal,
    /// Player death burst, more particles
    Large,
}

impl ExplosionSize {
    pub fn particle_count(self) -> usize {
        match self {
            ExplosionSize::Normal => 12,
            ExplosionSize::Large => 20,
        }
    }
}

/// A single explosion particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Remaining ticks; particles fade out as this drops
    pub life: u32,
}

/// A cosmetic particle burst; never collides with anything
#[derive(Debug, Clone)]
pub struct Explosion {
    pub particles: Vec<Particle>,
    pub size: ExplosionSize,
    /// Ticks elapsed since the burst started
    pub age: u32,
}

impl Explosion {
    /// Spawn a burst at `origin` with radially spread particles
    pub fn new(origin: Vec2, size: ExplosionSize, rng: &mut Pcg32) -> Self {
        let count = size.particle_count();
        let particles = (0..count)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / count as f32
                    + rng.random_range(0.0..0.5);
                let speed = rng.random_range(2.0..6.0);
                Particle {
                    pos: origin,
                    vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                    size: rng.random_range(3.0..7.0),
                    life: EXPLOSION_LIFE_TICKS,
                }
            })
            .collect();
        Self {
            particles,
            size,
            age: 0,
        }
    }

    /// Advance particles by one tick
    pub fn update(&mut self) {
        self.age += 1;
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel *= EXPLOSION_FRICTION;
            p.life = p.life.saturating_sub(1);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.age >= EXPLOSION_LIFE_TICKS
    }
}

/// Per-run counters; reset every run and never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u64,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub enemies_defeated: u32,
    /// Current level, starting at 1
    pub level: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            level: 1,
            ..Default::default()
        }
    }

    /// Hit percentage in [0, 100]; 0 when nothing has been fired
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hit as f32 / self.shots_fired as f32 * 100.0
        }
    }
}

/// Upgrade-derived loadout captured at run start
#[derive(Debug, Clone, Copy, Default)]
pub struct Loadout {
    /// Spare lives beyond the first
    pub lives: u32,
    pub damage_level: u32,
    pub turret_level: u32,
    /// Per-slot enable flags from settings
    pub turret_enabled: [bool; TURRET_SLOTS],
}

/// Events emitted by `tick` for the presentation layer and audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    CannonFired,
    TurretVolley,
    /// A projectile connected without destroying its target
    HostileHit,
    HostileDestroyed {
        kind: HostileKind,
    },
    /// The player was rammed but survived
    PlayerHit,
    /// A life was consumed; respawn countdown started
    PlayerDown,
    Respawned,
    LevelUp {
        level: u32,
    },
    SkinUnlocked {
        skin: usize,
    },
    RunOver,
}

/// Complete per-run world state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub tick_count: u64,
    pub player: PlayerShip,
    pub projectiles: Vec<Projectile>,
    pub hostiles: Vec<Hostile>,
    pub explosions: Vec<Explosion>,
    pub stats: SessionStats,
    pub loadout: Loadout,
    /// Spare lives remaining this run
    pub lives: u32,
    /// Respawn-immunity countdown; nonzero means the player is untouchable
    pub respawn_ticks: u32,
    /// Screen-shake countdown after a ram
    pub shake_ticks: u32,
    /// Cosmetic shake offset recomputed each tick while shaking
    pub shake_offset: Vec2,
    /// Level-up banner countdown
    pub level_banner_ticks: u32,
    /// Skin indices unlocked during this run, for the end-of-run display
    pub unlocked_this_run: Vec<usize>,
    pub(crate) last_cannon_tick: i64,
    pub(crate) last_turret_tick: i64,
}

impl GameState {
    /// Start a fresh run with the given seed and upgrade loadout
    pub fn new(seed: u64, loadout: Loadout) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            tick_count: 0,
            player: PlayerShip::new(),
            projectiles: Vec::new(),
            hostiles: Vec::new(),
            explosions: Vec::new(),
            stats: SessionStats::new(),
            lives: loadout.lives,
            loadout,
            respawn_ticks: 0,
            shake_ticks: 0,
            shake_offset: Vec2::ZERO,
            level_banner_ticks: 0,
            unlocked_this_run: Vec::new(),
            // First shot and first turret volley are allowed immediately
            last_cannon_tick: -(CANNON_COOLDOWN_TICKS as i64),
            last_turret_tick: -(TURRET_COOLDOWN_TICKS as i64),
        }
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_ticks > 0
    }
}
