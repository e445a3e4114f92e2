//! Persistent progression: credits, upgrade tracks, and skin unlocks
//!
//! Loaded once at startup, mutated by gameplay and menu events, saved
//! whenever something changes. Credits earned mid-run are provisional:
//! the balance is snapshotted at run start and restored if the player
//! quits to the menu, so only finished runs keep their earnings.

use serde::{Deserialize, Serialize};

/// Number of cosmetic skins, index-aligned with `SKINS`
pub const SKIN_COUNT: usize = 5;
/// The always-unlocked default skin
pub const STARTER_SKIN: usize = 1;

/// How a skin becomes available
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnlockCondition {
    Always,
    ReachLevel(u32),
    /// Only met at the instant the given level is being completed
    FinishLevelAccuracy { level: u32, min_accuracy: f32 },
}

impl UnlockCondition {
    /// Evaluate against the current session state. `level_complete` is true
    /// only during a level-up transition, where `level` is the level being
    /// left (pre-increment).
    pub fn is_met(&self, level: u32, accuracy: f32, level_complete: bool) -> bool {
        match *self {
            UnlockCondition::Always => true,
            UnlockCondition::ReachLevel(required) => level >= required,
            UnlockCondition::FinishLevelAccuracy {
                level: required,
                min_accuracy,
            } => level_complete && level == required && accuracy >= min_accuracy,
        }
    }
}

/// A cosmetic skin and its unlock requirement
#[derive(Debug, Clone, Copy)]
pub struct SkinSpec {
    pub name: &'static str,
    /// Requirement text shown in the skins menu
    pub requirement: &'static str,
    pub unlock: UnlockCondition,
}

/// The fixed skin list; visual parameters are resolved by the renderer
pub const SKINS: [SkinSpec; SKIN_COUNT] = [
    SkinSpec {
        name: "F-22 Raptor",
        requirement: "Reach Level 4",
        unlock: UnlockCondition::ReachLevel(4),
    },
    SkinSpec {
        name: "Eurofighter Typhoon",
        requirement: "Starter Aircraft",
        unlock: UnlockCondition::Always,
    },
    SkinSpec {
        name: "F-35 Lightning",
        requirement: "Reach Level 5",
        unlock: UnlockCondition::ReachLevel(5),
    },
    SkinSpec {
        name: "Sukhoi Su-27",
        requirement: "Complete Level 3 with 75%+ accuracy",
        unlock: UnlockCondition::FinishLevelAccuracy {
            level: 3,
            min_accuracy: 75.0,
        },
    },
    SkinSpec {
        name: "Dassault Rafale",
        requirement: "Complete Level 2 with 90%+ accuracy",
        unlock: UnlockCondition::FinishLevelAccuracy {
            level: 2,
            min_accuracy: 90.0,
        },
    },
];

/// Purchasable upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeTrack {
    Lives,
    Damage,
    Turrets,
}

impl UpgradeTrack {
    pub const ALL: [UpgradeTrack; 3] =
        [UpgradeTrack::Lives, UpgradeTrack::Damage, UpgradeTrack::Turrets];

    pub fn max_level(self) -> u32 {
        match self {
            UpgradeTrack::Lives => 3,
            UpgradeTrack::Damage => 5,
            UpgradeTrack::Turrets => 3,
        }
    }

    fn base_cost(self) -> u64 {
        match self {
            UpgradeTrack::Lives => 500,
            UpgradeTrack::Damage => 300,
            UpgradeTrack::Turrets => 1000,
        }
    }

    fn cost_multiplier(self) -> f64 {
        match self {
            UpgradeTrack::Lives => 2.0,
            UpgradeTrack::Damage => 1.5,
            UpgradeTrack::Turrets => 2.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UpgradeTrack::Lives => "Extra Lives",
            UpgradeTrack::Damage => "Damage Boost",
            UpgradeTrack::Turrets => "Auto Turrets",
        }
    }

    pub fn effect(self) -> &'static str {
        match self {
            UpgradeTrack::Lives => "+1 life per level",
            UpgradeTrack::Damage => "+25 damage per level",
            UpgradeTrack::Turrets => "+1 turret per level",
        }
    }
}

/// Cost to buy the next level of a track when currently at `level`
pub fn upgrade_cost(track: UpgradeTrack, level: u32) -> u64 {
    (track.base_cost() as f64 * track.cost_multiplier().powi(level as i32)).floor() as u64
}

/// Upgrade levels per track
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub lives: u32,
    pub damage: u32,
    pub turrets: u32,
}

impl UpgradeLevels {
    pub fn get(&self, track: UpgradeTrack) -> u32 {
        match track {
            UpgradeTrack::Lives => self.lives,
            UpgradeTrack::Damage => self.damage,
            UpgradeTrack::Turrets => self.turrets,
        }
    }

    fn get_mut(&mut self, track: UpgradeTrack) -> &mut u32 {
        match track {
            UpgradeTrack::Lives => &mut self.lives,
            UpgradeTrack::Damage => &mut self.damage,
            UpgradeTrack::Turrets => &mut self.turrets,
        }
    }
}

fn default_unlocked() -> [bool; SKIN_COUNT] {
    let mut unlocked = [false; SKIN_COUNT];
    unlocked[STARTER_SKIN] = true;
    unlocked
}

fn default_selected() -> usize {
    STARTER_SKIN
}

/// Persistent player progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionStore {
    /// Currency balance; non-negative by construction (u64)
    #[serde(default)]
    pub credits: u64,
    #[serde(default)]
    pub upgrades: UpgradeLevels,
    /// Monotonic unlock flags, index-aligned with `SKINS`
    #[serde(default = "default_unlocked")]
    pub unlocked_skins: [bool; SKIN_COUNT],
    #[serde(default = "default_selected")]
    pub selected_skin: usize,
    /// Balance snapshot taken at run start, for quit-to-menu rollback
    #[serde(skip)]
    run_start_credits: Option<u64>,
    #[serde(skip)]
    dirty: bool,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self {
            credits: 0,
            upgrades: UpgradeLevels::default(),
            unlocked_skins: default_unlocked(),
            selected_skin: STARTER_SKIN,
            run_start_credits: None,
            dirty: false,
        }
    }
}

impl ProgressionStore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sky_intruder_progress";

    /// Parse a persisted store, repairing anything invalid
    pub fn from_json(json: &str) -> Option<Self> {
        let mut store: Self = serde_json::from_str(json).ok()?;
        store.sanitize();
        Some(store)
    }

    /// Clamp persisted values into their valid ranges. The starter skin is
    /// always unlocked and a locked or out-of-range selection falls back
    /// to it.
    pub fn sanitize(&mut self) {
        for track in UpgradeTrack::ALL {
            let level = self.upgrades.get_mut(track);
            *level = (*level).min(track.max_level());
        }
        self.unlocked_skins[STARTER_SKIN] = true;
        if self.selected_skin >= SKIN_COUNT || !self.unlocked_skins[self.selected_skin] {
            self.selected_skin = STARTER_SKIN;
        }
    }

    /// Try to buy the next level of `track`. Returns false with no state
    /// change when the track is maxed or the balance is short.
    pub fn purchase_upgrade(&mut self, track: UpgradeTrack) -> bool {
        let level = self.upgrades.get(track);
        if level >= track.max_level() {
            return false;
        }
        let cost = upgrade_cost(track, level);
        if self.credits < cost {
            return false;
        }
        self.credits -= cost;
        *self.upgrades.get_mut(track) += 1;
        self.dirty = true;
        true
    }

    /// Equip a skin; only unlocked skins can be selected
    pub fn equip_skin(&mut self, index: usize) -> bool {
        if index < SKIN_COUNT && self.unlocked_skins[index] {
            self.selected_skin = index;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Add credits earned from a kill to the live balance
    pub fn award_credits(&mut self, amount: u64) {
        self.credits += amount;
        self.dirty = true;
    }

    /// Snapshot the balance at run start for the quit-to-menu rollback
    pub fn begin_run(&mut self) {
        self.run_start_credits = Some(self.credits);
    }

    /// Quit-to-menu: discard credits earned this run
    pub fn abandon_run(&mut self) {
        if let Some(snapshot) = self.run_start_credits.take() {
            self.credits = snapshot;
            self.dirty = true;
        }
    }

    /// Game over: credits earned this run become permanent
    pub fn finish_run(&mut self) {
        self.run_start_credits = None;
        self.dirty = true;
    }

    /// Evaluate every locked skin against the current session state and
    /// unlock the ones whose condition is met. Returns the newly unlocked
    /// indices. Unlocks are monotonic.
    pub fn evaluate_unlocks(
        &mut self,
        level: u32,
        accuracy: f32,
        level_complete: bool,
    ) -> Vec<usize> {
        let mut newly = Vec::new();
        for (i, skin) in SKINS.iter().enumerate() {
            if self.unlocked_skins[i] {
                continue;
            }
            if skin.unlock.is_met(level, accuracy, level_complete) {
                self.unlocked_skins[i] = true;
                self.dirty = true;
                newly.push(i);
            }
        }
        newly
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load progression from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(store) = Self::from_json(&json) {
                    log::info!("Loaded progression ({} credits)", store.credits);
                    return store;
                }
                log::warn!("Corrupt progression data, starting fresh");
            }
        }

        log::info!("Using default progression");
        Self::default()
    }

    /// Save progression to LocalStorage (WASM only)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_curve() {
        assert_eq!(upgrade_cost(UpgradeTrack::Lives, 0), 500);
        assert_eq!(upgrade_cost(UpgradeTrack::Lives, 1), 1000);
        assert_eq!(upgrade_cost(UpgradeTrack::Lives, 2), 2000);
        assert_eq!(upgrade_cost(UpgradeTrack::Damage, 1), 450);
        assert_eq!(upgrade_cost(UpgradeTrack::Turrets, 2), 6250);
    }

    #[test]
    fn test_purchase_insufficient_is_noop() {
        let mut store = ProgressionStore::default();
        store.credits = 100;
        assert!(!store.purchase_upgrade(UpgradeTrack::Damage));
        assert_eq!(store.credits, 100);
        assert_eq!(store.upgrades.damage, 0);
    }

    #[test]
    fn test_purchase_debits_and_levels() {
        let mut store = ProgressionStore::default();
        store.credits = 800;
        assert!(store.purchase_upgrade(UpgradeTrack::Damage));
        assert_eq!(store.credits, 500);
        assert_eq!(store.upgrades.damage, 1);
    }

    #[test]
    fn test_purchase_at_max_level_fails() {
        let mut store = ProgressionStore::default();
        store.credits = 1_000_000;
        store.upgrades.lives = UpgradeTrack::Lives.max_level();
        assert!(!store.purchase_upgrade(UpgradeTrack::Lives));
        assert_eq!(store.credits, 1_000_000);
    }

    #[test]
    fn test_escrow_rollback_on_abandon() {
        let mut store = ProgressionStore::default();
        store.credits = 50;
        store.begin_run();
        store.award_credits(30);
        assert_eq!(store.credits, 80);
        store.abandon_run();
        assert_eq!(store.credits, 50);
    }

    #[test]
    fn test_escrow_kept_on_finish() {
        let mut store = ProgressionStore::default();
        store.credits = 50;
        store.begin_run();
        store.award_credits(30);
        store.finish_run();
        assert_eq!(store.credits, 80);
        // A later abandon must not roll anything back
        store.abandon_run();
        assert_eq!(store.credits, 80);
    }

    #[test]
    fn test_sanitize_locked_selection_falls_back() {
        let mut store = ProgressionStore::default();
        store.selected_skin = 3; // locked
        store.sanitize();
        assert_eq!(store.selected_skin, STARTER_SKIN);
    }

    #[test]
    fn test_sanitize_out_of_range_selection() {
        let mut store = ProgressionStore::default();
        store.selected_skin = 99;
        store.sanitize();
        assert_eq!(store.selected_skin, STARTER_SKIN);
    }

    #[test]
    fn test_sanitize_clamps_upgrade_levels() {
        let mut store = ProgressionStore::default();
        store.upgrades.damage = 42;
        store.sanitize();
        assert_eq!(store.upgrades.damage, UpgradeTrack::Damage.max_level());
    }

    #[test]
    fn test_from_json_repairs_bad_data() {
        let store =
            ProgressionStore::from_json(r#"{"credits": 10, "selected_skin": 4}"#).unwrap();
        assert_eq!(store.selected_skin, STARTER_SKIN);
        assert!(store.unlocked_skins[STARTER_SKIN]);
    }

    #[test]
    fn test_equip_requires_unlock() {
        let mut store = ProgressionStore::default();
        assert!(!store.equip_skin(0));
        store.unlocked_skins[0] = true;
        assert!(store.equip_skin(0));
        assert_eq!(store.selected_skin, 0);
    }

    #[test]
    fn test_level_unlock() {
        let mut store = ProgressionStore::default();
        let newly = store.evaluate_unlocks(4, 0.0, false);
        assert_eq!(newly, vec![0]);
        assert!(store.unlocked_skins[0]);
        // Already-unlocked skins are not reported again
        assert!(store.evaluate_unlocks(4, 0.0, false).is_empty());
    }

    #[test]
    fn test_accuracy_unlock_only_at_level_completion() {
        let mut store = ProgressionStore::default();
        // High accuracy at the right level, but not a completion instant
        assert!(store.evaluate_unlocks(2, 95.0, false).is_empty());
        // Completion of a different level
        assert!(store.evaluate_unlocks(3, 95.0, true).iter().all(|&i| i != 4));
        // Completion of level 2 with 90%+ accuracy unlocks the Rafale
        let newly = store.evaluate_unlocks(2, 95.0, true);
        assert!(newly.contains(&4));
    }
}
