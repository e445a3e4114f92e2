//! Fixed timestep simulation tick
//!
//! Advances the world by exactly one discrete step: spawning, movement,
//! collision resolution, damage/lives bookkeeping, and leveling. Credits
//! and skin unlocks flow through the `ProgressionStore` so that gameplay
//! rewards persist the moment they are earned.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    Explosion, ExplosionSize, GameEvent, GamePhase, GameState, Hostile, HostileKind, Projectile,
    ProjectileSource,
};
use crate::consts::*;
use crate::progression::ProgressionStore;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Held fire button; the cannon cooldown rate-limits it
    pub fire: bool,
    /// Edge-triggered pause toggle
    pub pause: bool,
}

/// Turret mount offsets from the ship's top-center, one per slot
const TURRET_MOUNTS: [Vec2; TURRET_SLOTS] = [
    Vec2::new(-12.0, 30.0),
    Vec2::new(12.0, 30.0),
    Vec2::new(0.0, 25.0),
];

/// Advance the game state by one tick, returning the events that occurred
pub fn tick(
    state: &mut GameState,
    store: &mut ProgressionStore,
    input: &TickInput,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Pause toggle; pausing freezes everything below
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return events;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return events,
        GamePhase::GameOver => {
            // End-screen debris keeps animating
            update_explosions(state);
            update_shake(state);
            return events;
        }
        GamePhase::Playing => {}
    }

    state.tick_count += 1;

    if state.level_banner_ticks > 0 {
        state.level_banner_ticks -= 1;
    }
    update_shake(state);

    move_player(state, input);
    fire_cannon(state, input, &mut events);
    spawn_hostiles(state);
    fire_turrets(state, &mut events);

    // Move everything, cull what left the playfield
    for p in &mut state.projectiles {
        p.pos += p.vel;
    }
    state.projectiles.retain(|p| !p.is_off_screen());
    for h in &mut state.hostiles {
        h.pos.y += h.speed;
    }
    state.hostiles.retain(|h| !h.is_off_screen());
    update_explosions(state);

    resolve_projectile_hits(state, store, &mut events);
    resolve_player_collisions(state, store, &mut events);

    // Respawn countdown; immunity ends when it reaches zero
    if state.respawn_ticks > 0 {
        state.respawn_ticks -= 1;
        if state.respawn_ticks == 0 {
            state.player.respawn();
            events.push(GameEvent::Respawned);
        }
    }

    events
}

fn update_shake(state: &mut GameState) {
    if state.shake_ticks > 0 {
        state.shake_ticks -= 1;
        let magnitude = state.shake_ticks as f32 * 2.0;
        state.shake_offset = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * magnitude,
            (state.rng.random::<f32>() - 0.5) * magnitude,
        );
    } else {
        state.shake_offset = Vec2::ZERO;
    }
}

fn move_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    if input.move_left {
        player.pos.x -= PLAYER_SPEED;
    }
    if input.move_right {
        player.pos.x += PLAYER_SPEED;
    }
    if input.move_up {
        player.pos.y -= PLAYER_SPEED;
    }
    if input.move_down {
        player.pos.y += PLAYER_SPEED;
    }

    // Bank toward the strafe direction, ease back to level otherwise
    if input.move_left && !input.move_right {
        player.tilt = (player.tilt - PLAYER_TILT_STEP).max(-PLAYER_MAX_TILT);
    } else if input.move_right && !input.move_left {
        player.tilt = (player.tilt + PLAYER_TILT_STEP).min(PLAYER_MAX_TILT);
    } else if player.tilt > 0.0 {
        player.tilt = (player.tilt - PLAYER_TILT_STEP).max(0.0);
    } else if player.tilt < 0.0 {
        player.tilt = (player.tilt + PLAYER_TILT_STEP).min(0.0);
    }

    player.pos.x = player.pos.x.clamp(0.0, SCREEN_WIDTH - PLAYER_SIZE);
    player.pos.y = player.pos.y.clamp(0.0, SCREEN_HEIGHT - PLAYER_SIZE);
}

fn fire_cannon(state: &mut GameState, input: &TickInput, events: &mut Vec<GameEvent>) {
    if !input.fire {
        return;
    }
    let now = state.tick_count as i64;
    if now - state.last_cannon_tick < CANNON_COOLDOWN_TICKS as i64 {
        return;
    }
    let muzzle = Vec2::new(
        state.player.pos.x + PLAYER_SIZE / 2.0 - BULLET_WIDTH / 2.0,
        state.player.pos.y,
    );
    state.projectiles.push(Projectile::cannon(muzzle));
    state.stats.shots_fired += 1;
    state.last_cannon_tick = now;
    events.push(GameEvent::CannonFired);
}

/// One uniform roll per tick; the interval shrinks with level down to a floor
fn spawn_hostiles(state: &mut GameState) {
    let interval = BASE_SPAWN_INTERVAL
        .saturating_sub((state.stats.level - 1) * 10)
        .max(MIN_SPAWN_INTERVAL);
    if state.rng.random_range(0..interval) != 0 {
        return;
    }

    let x = state.rng.random_range(0.0..SCREEN_WIDTH - HOSTILE_SIZE);
    let kind = roll_hostile_kind(&mut state.rng);
    let level_multiplier = 1.0 + (state.stats.level - 1) as f32 * 0.2;
    let jitter = state.rng.random_range(-1.0..1.0);
    let speed = HOSTILE_BASE_SPEED * level_multiplier * kind.speed_factor() + jitter;
    state.hostiles.push(Hostile::new(x, kind, speed));
}

/// Weighted draw over the hostile classes (weights sum to 100)
fn roll_hostile_kind(rng: &mut Pcg32) -> HostileKind {
    let roll = rng.random_range(0..100u32);
    let mut threshold = 0;
    for kind in HostileKind::ALL {
        threshold += kind.spawn_weight();
        if roll < threshold {
            return kind;
        }
    }
    HostileKind::Light
}

/// Each enabled turret slot fires one homing shot at the nearest hostiles,
/// sharing targets when hostiles are scarcer than slots
fn fire_turrets(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let turret_level = state.loadout.turret_level as usize;
    if turret_level == 0 || state.is_respawning() {
        return;
    }
    let now = state.tick_count as i64;
    if now - state.last_turret_tick < TURRET_COOLDOWN_TICKS as i64 {
        return;
    }
    if state.hostiles.is_empty() {
        return;
    }

    let player_center = state.player.center();
    let mut ranked: Vec<usize> = (0..state.hostiles.len()).collect();
    ranked.sort_by(|&a, &b| {
        let da = state.hostiles[a].center().distance_squared(player_center);
        let db = state.hostiles[b].center().distance_squared(player_center);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fired = false;
    let mut volley_index = 0usize;
    for slot in 0..turret_level.min(TURRET_SLOTS) {
        if !state.loadout.turret_enabled[slot] {
            continue;
        }
        let mount = Vec2::new(
            state.player.pos.x + PLAYER_SIZE / 2.0 + TURRET_MOUNTS[slot].x,
            state.player.pos.y + TURRET_MOUNTS[slot].y,
        );
        let target_center = state.hostiles[ranked[volley_index % ranked.len()]].center();
        volley_index += 1;

        let to_target = target_center - mount;
        if to_target.length_squared() > 0.0 {
            let origin = mount - Vec2::new(BULLET_WIDTH / 2.0, 0.0);
            state
                .projectiles
                .push(Projectile::turret(origin, to_target.normalize()));
            fired = true;
        }
    }

    if fired {
        state.last_turret_tick = now;
        events.push(GameEvent::TurretVolley);
    }
}

/// Each projectile resolves against the first overlapping hostile and is
/// consumed; at most one hit per projectile per tick
fn resolve_projectile_hits(
    state: &mut GameState,
    store: &mut ProgressionStore,
    events: &mut Vec<GameEvent>,
) {
    let damage = 50.0 + 25.0 * state.loadout.damage_level as f32;

    let mut p = 0;
    while p < state.projectiles.len() {
        let rect = state.projectiles[p].rect();
        let mut consumed = false;
        for h in 0..state.hostiles.len() {
            if !rect.intersects(&state.hostiles[h].hit_box()) {
                continue;
            }
            // Turret shots don't count toward accuracy
            if state.projectiles[p].source == ProjectileSource::Cannon {
                state.stats.shots_hit += 1;
            }
            if state.hostiles[h].take_damage(damage) {
                let hostile = state.hostiles.remove(h);
                destroy_hostile(state, store, hostile, events);
            } else {
                events.push(GameEvent::HostileHit);
            }
            consumed = true;
            break;
        }
        if consumed {
            state.projectiles.remove(p);
        } else {
            p += 1;
        }
    }
}

fn destroy_hostile(
    state: &mut GameState,
    store: &mut ProgressionStore,
    hostile: Hostile,
    events: &mut Vec<GameEvent>,
) {
    let burst = Explosion::new(hostile.center(), ExplosionSize::Normal, &mut state.rng);
    state.explosions.push(burst);
    store.award_credits(hostile.kind.credit_reward());
    state.stats.score += SCORE_PER_KILL;
    state.stats.enemies_defeated += 1;
    events.push(GameEvent::HostileDestroyed { kind: hostile.kind });

    if state.stats.enemies_defeated % KILLS_PER_LEVEL == 0 {
        // Accuracy-gated unlocks are judged against the level being left,
        // before the increment
        let accuracy = state.stats.accuracy();
        let completed = store.evaluate_unlocks(state.stats.level, accuracy, true);
        record_unlocks(state, completed, events);

        state.stats.level += 1;
        state.level_banner_ticks = LEVEL_BANNER_TICKS;
        events.push(GameEvent::LevelUp {
            level: state.stats.level,
        });

        let reached = store.evaluate_unlocks(state.stats.level, accuracy, false);
        record_unlocks(state, reached, events);
    }
}

fn record_unlocks(state: &mut GameState, newly: Vec<usize>, events: &mut Vec<GameEvent>) {
    for skin in newly {
        state.unlocked_this_run.push(skin);
        events.push(GameEvent::SkinUnlocked { skin });
    }
}

/// Ram damage; skipped entirely during the respawn-immunity window
fn resolve_player_collisions(
    state: &mut GameState,
    store: &mut ProgressionStore,
    events: &mut Vec<GameEvent>,
) {
    if state.is_respawning() {
        return;
    }

    let mut h = 0;
    while h < state.hostiles.len() {
        let player_rect = state.player.rect();
        if !player_rect.intersects(&state.hostiles[h].hit_box()) {
            h += 1;
            continue;
        }

        let hostile = state.hostiles.remove(h);
        state.player.health -= hostile.kind.contact_damage();
        state.shake_ticks = SCREEN_SHAKE_TICKS;
        let burst = Explosion::new(hostile.center(), ExplosionSize::Normal, &mut state.rng);
        state.explosions.push(burst);
        events.push(GameEvent::PlayerHit);

        if state.player.health <= 0.0 {
            state.player.health = 0.0;
            let burst = Explosion::new(state.player.center(), ExplosionSize::Large, &mut state.rng);
            state.explosions.push(burst);

            if state.lives > 0 {
                state.lives -= 1;
                state.respawn_ticks = RESPAWN_TICKS;
                events.push(GameEvent::PlayerDown);
            } else {
                state.phase = GamePhase::GameOver;
                store.finish_run();
                events.push(GameEvent::RunOver);
            }
            break;
        }
    }
}

fn update_explosions(state: &mut GameState) {
    for e in &mut state.explosions {
        e.update();
    }
    state.explosions.retain(|e| !e.is_finished());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Loadout;

    fn new_run(loadout: Loadout) -> (GameState, ProgressionStore) {
        (GameState::new(12345, loadout), ProgressionStore::default())
    }

    /// A stationary light hostile parked in the projectile lane
    fn parked_hostile(kind: HostileKind) -> Hostile {
        let mut h = Hostile::new(100.0, kind, 0.0);
        h.pos.y = 300.0;
        h
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut state, mut store) = new_run(Loadout::default());
        state.hostiles.push(parked_hostile(HostileKind::Light));

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut store, &pause);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks_before = state.tick_count;
        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.tick_count, ticks_before);

        // Toggling again resumes
        tick(&mut state, &mut store, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_light_hostile_dies_in_two_cannon_hits() {
        let (mut state, mut store) = new_run(Loadout::default());
        state.hostiles.push(parked_hostile(HostileKind::Light));
        let credits_before = store.credits;

        // First hit: damaged but alive
        state
            .projectiles
            .push(Projectile::cannon(Vec2::new(110.0, 320.0)));
        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.hostiles.len(), 1);
        assert_eq!(state.hostiles[0].health, 50.0);
        assert_eq!(state.stats.shots_hit, 1);
        assert_eq!(state.stats.enemies_defeated, 0);

        // Second hit: destroyed, credited, scored
        state
            .projectiles
            .push(Projectile::cannon(Vec2::new(110.0, 320.0)));
        tick(&mut state, &mut store, &TickInput::default());
        assert!(state.hostiles.iter().all(|h| h.pos.y < 0.0)); // only fresh spawns, if any
        assert_eq!(store.credits, credits_before + 5);
        assert_eq!(state.stats.score, 10);
        assert_eq!(state.stats.enemies_defeated, 1);
        assert_eq!(state.stats.shots_hit, 2);
    }

    #[test]
    fn test_damage_upgrade_one_shots_light() {
        let loadout = Loadout {
            damage_level: 2,
            ..Default::default()
        };
        let (mut state, mut store) = new_run(loadout);
        state.hostiles.push(parked_hostile(HostileKind::Light));
        state
            .projectiles
            .push(Projectile::cannon(Vec2::new(110.0, 320.0)));

        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.stats.enemies_defeated, 1);
    }

    #[test]
    fn test_turret_hits_do_not_count_toward_accuracy() {
        let (mut state, mut store) = new_run(Loadout::default());
        state.hostiles.push(parked_hostile(HostileKind::Light));
        state
            .projectiles
            .push(Projectile::turret(Vec2::new(110.0, 320.0), Vec2::new(0.0, -1.0)));

        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.stats.shots_hit, 0);
        assert_eq!(state.hostiles[0].health, 50.0);
    }

    #[test]
    fn test_level_up_every_ten_kills() {
        let (mut state, mut store) = new_run(Loadout::default());
        state.stats.enemies_defeated = 9;
        state.hostiles.push(parked_hostile(HostileKind::Light));
        state.hostiles[0].health = 50.0;
        state
            .projectiles
            .push(Projectile::cannon(Vec2::new(110.0, 320.0)));

        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.stats.enemies_defeated, 10);
        assert_eq!(state.stats.level, 2);
        assert!(state.level_banner_ticks > 0);
    }

    #[test]
    fn test_accuracy_unlock_uses_pre_increment_level() {
        // Completing level 2 at 95% accuracy must unlock the Rafale (skin 4),
        // whose condition names level 2 - proof the check runs before the
        // level increments to 3.
        let (mut state, mut store) = new_run(Loadout::default());
        state.stats.level = 2;
        state.stats.enemies_defeated = 9;
        state.stats.shots_fired = 20;
        state.stats.shots_hit = 19;
        state.hostiles.push(parked_hostile(HostileKind::Light));
        state.hostiles[0].health = 50.0;
        state
            .projectiles
            .push(Projectile::cannon(Vec2::new(110.0, 320.0)));

        let events = tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.stats.level, 3);
        assert!(store.unlocked_skins[4]);
        assert!(state.unlocked_this_run.contains(&4));
        assert!(events.contains(&GameEvent::SkinUnlocked { skin: 4 }));
    }

    #[test]
    fn test_ram_damages_player_and_removes_hostile() {
        let (mut state, mut store) = new_run(Loadout::default());
        let mut rammer = Hostile::new(state.player.pos.x, HostileKind::Light, 0.0);
        rammer.pos.y = state.player.pos.y;
        state.hostiles.push(rammer);

        let events = tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.player.health, 75.0);
        assert!(state.hostiles.is_empty() || state.hostiles.iter().all(|h| h.pos.y < 0.0));
        assert!(state.shake_ticks > 0);
        assert!(events.contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn test_lethal_ram_with_lives_starts_respawn() {
        let loadout = Loadout {
            lives: 2,
            ..Default::default()
        };
        let (mut state, mut store) = new_run(loadout);
        state.player.health = 10.0;
        let mut rammer = Hostile::new(state.player.pos.x, HostileKind::Light, 0.0);
        rammer.pos.y = state.player.pos.y;
        state.hostiles.push(rammer);

        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.player.health, 0.0);
        assert_eq!(state.lives, 1);
        assert!(state.is_respawning());
        assert_eq!(state.phase, GamePhase::Playing);

        // Park another hostile on the player: immunity must hold
        let mut second = Hostile::new(state.player.pos.x, HostileKind::Heavy, 0.0);
        second.pos.y = state.player.pos.y;
        state.hostiles.push(second);

        // Countdown already ticked once above, so RESPAWN_TICKS - 1 remain
        for _ in 0..RESPAWN_TICKS - 1 {
            tick(&mut state, &mut store, &TickInput::default());
        }
        assert!(!state.is_respawning());
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
        assert_eq!(state.player.pos, crate::sim::state::start_position());
        assert_eq!(state.lives, 1);
    }

    #[test]
    fn test_lethal_ram_without_lives_ends_run_and_keeps_credits() {
        let (mut state, mut store) = new_run(Loadout::default());
        store.credits = 100;
        store.begin_run();
        store.award_credits(25);

        state.player.health = 10.0;
        let mut rammer = Hostile::new(state.player.pos.x, HostileKind::Light, 0.0);
        rammer.pos.y = state.player.pos.y;
        state.hostiles.push(rammer);

        let events = tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::RunOver));

        // Run finished: a quit-to-menu rollback afterwards changes nothing
        store.abandon_run();
        assert_eq!(store.credits, 125);
    }

    #[test]
    fn test_turret_volley_targets_nearest() {
        let loadout = Loadout {
            turret_level: 2,
            turret_enabled: [true, true, false],
            ..Default::default()
        };
        let (mut state, mut store) = new_run(loadout);
        state.hostiles.push(parked_hostile(HostileKind::Light));

        let events = tick(&mut state, &mut store, &TickInput::default());
        assert!(events.contains(&GameEvent::TurretVolley));
        let turret_shots = state
            .projectiles
            .iter()
            .filter(|p| p.source == ProjectileSource::Turret)
            .count();
        assert_eq!(turret_shots, 2);
        assert_eq!(state.stats.shots_fired, 0);

        // Cooldown: the next tick fires nothing new
        tick(&mut state, &mut store, &TickInput::default());
        let after = state
            .projectiles
            .iter()
            .filter(|p| p.source == ProjectileSource::Turret)
            .count();
        assert_eq!(after, 2);
    }

    #[test]
    fn test_turrets_hold_fire_with_no_hostiles() {
        let loadout = Loadout {
            turret_level: 3,
            turret_enabled: [true, true, true],
            ..Default::default()
        };
        let (mut state, _) = new_run(loadout);
        state.tick_count = 1;

        let mut events = Vec::new();
        fire_turrets(&mut state, &mut events);
        assert!(events.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_turrets_hold_fire_while_respawning() {
        let loadout = Loadout {
            turret_level: 1,
            turret_enabled: [true, true, true],
            ..Default::default()
        };
        let (mut state, _) = new_run(loadout);
        state.tick_count = 1;
        state.respawn_ticks = 10;
        state.hostiles.push(parked_hostile(HostileKind::Light));

        let mut events = Vec::new();
        fire_turrets(&mut state, &mut events);
        assert!(events.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_cannon_cooldown() {
        let (mut state, mut store) = new_run(Loadout::default());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &mut store, &fire);
        assert_eq!(state.stats.shots_fired, 1);

        // Held fire inside the cooldown adds nothing
        for _ in 0..(CANNON_COOLDOWN_TICKS - 1) {
            tick(&mut state, &mut store, &fire);
        }
        assert_eq!(state.stats.shots_fired, 1);

        tick(&mut state, &mut store, &fire);
        assert_eq!(state.stats.shots_fired, 2);
    }

    #[test]
    fn test_game_over_keeps_explosions_animating() {
        let (mut state, mut store) = new_run(Loadout::default());
        state.phase = GamePhase::GameOver;
        let burst = Explosion::new(Vec2::new(100.0, 100.0), ExplosionSize::Large, &mut state.rng);
        state.explosions.push(burst);

        tick(&mut state, &mut store, &TickInput::default());
        assert_eq!(state.tick_count, 0);
        assert_eq!(state.explosions[0].age, 1);
    }

    #[test]
    fn test_player_stays_on_screen() {
        let (mut state, mut store) = new_run(Loadout::default());
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        for _ in 0..500 {
            tick(&mut state, &mut store, &left);
        }
        assert_eq!(state.player.pos.x, 0.0);
        assert_eq!(state.player.tilt, -PLAYER_MAX_TILT);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn health_and_counters_stay_in_bounds(
                seed in any::<u64>(),
                frames in proptest::collection::vec(any::<(bool, bool, bool, bool, bool)>(), 1..200),
            ) {
                let loadout = Loadout { lives: 1, ..Default::default() };
                let mut state = GameState::new(seed, loadout);
                let mut store = ProgressionStore::default();

                for (l, r, u, d, f) in frames {
                    let input = TickInput {
                        move_left: l,
                        move_right: r,
                        move_up: u,
                        move_down: d,
                        fire: f,
                        pause: false,
                    };
                    tick(&mut state, &mut store, &input);

                    prop_assert!(state.player.health >= 0.0);
                    prop_assert!(state.player.health <= PLAYER_MAX_HEALTH);
                    prop_assert!(state.player.tilt.abs() <= PLAYER_MAX_TILT);
                    prop_assert!(state.stats.shots_hit <= state.stats.shots_fired);
                }
            }
        }
    }
}
