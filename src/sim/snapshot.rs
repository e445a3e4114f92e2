//! The render contract
//!
//! A read-only snapshot of everything the presentation layer needs for one
//! frame. The simulation produces it, the external canvas renderer consumes
//! it; nothing in here feeds back into gameplay.

use serde::Serialize;

use super::state::{GamePhase, GameState, HostileKind, ProjectileSource};
use crate::consts::*;
use crate::progression::{ProgressionStore, SKINS};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub health: f32,
    pub tilt: f32,
    /// Equipped skin index; visual parameters resolve renderer-side
    pub skin: usize,
    /// Blink the ship while the immunity window runs
    pub respawning: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub source: ProjectileSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostileView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub kind: HostileKind,
    /// 0..1, drives the health bar above damaged hostiles
    pub health_fraction: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub score: u64,
    pub level: u32,
    /// Hit percentage in [0, 100]
    pub accuracy: f32,
    pub lives: u32,
    pub credits: u64,
    pub enemies_defeated: u32,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub player: PlayerView,
    pub projectiles: Vec<ProjectileView>,
    pub hostiles: Vec<HostileView>,
    pub particles: Vec<ParticleView>,
    pub shake_x: f32,
    pub shake_y: f32,
    pub hud: HudView,
    pub paused: bool,
    pub game_over: bool,
    pub respawning: bool,
    pub level_banner_ticks: u32,
    /// Skin names unlocked this run, for the end-of-run display
    pub unlocked_this_run: Vec<&'static str>,
}

/// Build the per-frame snapshot from the world state and the store
pub fn snapshot(state: &GameState, store: &ProgressionStore) -> RenderSnapshot {
    let player = PlayerView {
        x: state.player.pos.x,
        y: state.player.pos.y,
        w: PLAYER_SIZE,
        h: PLAYER_SIZE,
        health: state.player.health,
        tilt: state.player.tilt,
        skin: store.selected_skin,
        respawning: state.is_respawning(),
    };

    let projectiles = state
        .projectiles
        .iter()
        .map(|p| ProjectileView {
            x: p.pos.x,
            y: p.pos.y,
            w: BULLET_WIDTH,
            h: BULLET_HEIGHT,
            source: p.source,
        })
        .collect();

    let hostiles = state
        .hostiles
        .iter()
        .map(|h| HostileView {
            x: h.pos.x,
            y: h.pos.y,
            w: HOSTILE_SIZE,
            h: HOSTILE_SIZE,
            kind: h.kind,
            health_fraction: (h.health / h.kind.max_health()).clamp(0.0, 1.0),
        })
        .collect();

    let max_life = EXPLOSION_LIFE_TICKS as f32;
    let particles = state
        .explosions
        .iter()
        .flat_map(|e| {
            let fade = 1.0 - e.age as f32 / max_life;
            e.particles.iter().filter(|p| p.life > 0).map(move |p| ParticleView {
                x: p.pos.x,
                y: p.pos.y,
                size: p.size,
                alpha: fade * p.life as f32 / max_life,
            })
        })
        .collect();

    RenderSnapshot {
        player,
        projectiles,
        hostiles,
        particles,
        shake_x: state.shake_offset.x,
        shake_y: state.shake_offset.y,
        hud: HudView {
            score: state.stats.score,
            level: state.stats.level,
            accuracy: state.stats.accuracy(),
            lives: state.lives,
            credits: store.credits,
            enemies_defeated: state.stats.enemies_defeated,
        },
        paused: state.phase == GamePhase::Paused,
        game_over: state.phase == GamePhase::GameOver,
        respawning: state.is_respawning(),
        level_banner_ticks: state.level_banner_ticks,
        unlocked_this_run: state
            .unlocked_this_run
            .iter()
            .map(|&i| SKINS[i].name)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Loadout;

    #[test]
    fn test_snapshot_reflects_state() {
        let state = GameState::new(7, Loadout::default());
        let store = ProgressionStore::default();
        let snap = snapshot(&state, &store);

        assert_eq!(snap.hud.level, 1);
        assert_eq!(snap.hud.accuracy, 0.0);
        assert_eq!(snap.player.skin, store.selected_skin);
        assert!(!snap.paused);
        assert!(!snap.game_over);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(7, Loadout::default());
        let store = ProgressionStore::default();
        let json = serde_json::to_string(&snapshot(&state, &store)).unwrap();
        assert!(json.contains("\"score\":0"));
    }
}
