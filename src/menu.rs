//! Menu screens and the pause overlay
//!
//! The main menu owns navigation between its screens and applies
//! purchase/equip/settings operations to the stores. The pause overlay is a
//! separate tiny state machine shown while the simulation is frozen; it
//! never touches the run itself, only reports what the player chose.

use crate::input::{MenuInput, SETTINGS_ROWS};
use crate::progression::{ProgressionStore, SKIN_COUNT, SKINS, UpgradeTrack};
use crate::settings::{Settings, VOLUME_STEP};

/// Root menu entries, in display order
pub const ROOT_ITEMS: [&str; 6] = [
    "Start Game",
    "Upgrades",
    "Skins",
    "Settings",
    "Controls",
    "About",
];

/// Pause overlay entries, in display order
pub const PAUSE_ITEMS: [&str; 3] = ["Resume", "Volume", "Quit to Menu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Root,
    Upgrades,
    Skins,
    Settings,
    Controls,
    About,
}

/// What the driver should do after handling a frame of menu input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    StartRun,
}

/// Main menu state machine
#[derive(Debug)]
pub struct MenuState {
    pub screen: Screen,
    pub root_cursor: usize,
    pub upgrade_cursor: usize,
    pub skin_cursor: usize,
    pub settings_cursor: usize,
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Root,
            root_cursor: 0,
            upgrade_cursor: 0,
            skin_cursor: 0,
            settings_cursor: 0,
        }
    }

    /// Reset to the root screen (used when returning from a run)
    pub fn reset(&mut self) {
        self.screen = Screen::Root;
        self.root_cursor = 0;
    }

    pub fn handle(
        &mut self,
        input: &MenuInput,
        store: &mut ProgressionStore,
        settings: &mut Settings,
    ) -> MenuAction {
        match self.screen {
            Screen::Root => self.handle_root(input, store),
            Screen::Upgrades => {
                self.handle_upgrades(input, store);
                MenuAction::None
            }
            Screen::Skins => {
                self.handle_skins(input, store);
                MenuAction::None
            }
            Screen::Settings => {
                self.handle_settings(input, store, settings);
                MenuAction::None
            }
            Screen::Controls | Screen::About => {
                if input.back || input.select {
                    self.screen = Screen::Root;
                }
                MenuAction::None
            }
        }
    }

    fn handle_root(&mut self, input: &MenuInput, store: &ProgressionStore) -> MenuAction {
        if input.up {
            self.root_cursor = (self.root_cursor + ROOT_ITEMS.len() - 1) % ROOT_ITEMS.len();
        }
        if input.down {
            self.root_cursor = (self.root_cursor + 1) % ROOT_ITEMS.len();
        }
        if input.select {
            match self.root_cursor {
                0 => return MenuAction::StartRun,
                1 => {
                    self.screen = Screen::Upgrades;
                    self.upgrade_cursor = 0;
                }
                2 => {
                    self.screen = Screen::Skins;
                    // Cursor starts on the equipped skin
                    self.skin_cursor = store.selected_skin;
                }
                3 => {
                    self.screen = Screen::Settings;
                    self.settings_cursor = 0;
                }
                4 => self.screen = Screen::Controls,
                _ => self.screen = Screen::About,
            }
        }
        MenuAction::None
    }

    fn handle_upgrades(&mut self, input: &MenuInput, store: &mut ProgressionStore) {
        if input.back {
            self.screen = Screen::Root;
            return;
        }
        let tracks = UpgradeTrack::ALL;
        if input.up {
            self.upgrade_cursor = (self.upgrade_cursor + tracks.len() - 1) % tracks.len();
        }
        if input.down {
            self.upgrade_cursor = (self.upgrade_cursor + 1) % tracks.len();
        }
        if input.select {
            store.purchase_upgrade(tracks[self.upgrade_cursor]);
        }
    }

    fn handle_skins(&mut self, input: &MenuInput, store: &mut ProgressionStore) {
        if input.back {
            self.screen = Screen::Root;
            return;
        }
        if input.up {
            self.skin_cursor = (self.skin_cursor + SKIN_COUNT - 1) % SKIN_COUNT;
        }
        if input.down {
            self.skin_cursor = (self.skin_cursor + 1) % SKIN_COUNT;
        }
        if input.select {
            store.equip_skin(self.skin_cursor);
        }
    }

    fn handle_settings(
        &mut self,
        input: &MenuInput,
        store: &ProgressionStore,
        settings: &mut Settings,
    ) {
        if input.back {
            self.screen = Screen::Root;
            return;
        }
        if input.up {
            self.settings_cursor = (self.settings_cursor + SETTINGS_ROWS - 1) % SETTINGS_ROWS;
        }
        if input.down {
            self.settings_cursor = (self.settings_cursor + 1) % SETTINGS_ROWS;
        }
        if input.left || input.right {
            if self.settings_cursor == 0 {
                let delta = if input.left { -VOLUME_STEP } else { VOLUME_STEP };
                settings.adjust_volume(delta);
            } else {
                // Turret rows only respond for slots the player owns
                settings.toggle_turret(self.settings_cursor - 1, store.upgrades.turrets);
            }
        }
    }

    /// Label of the currently highlighted skin (for the renderer)
    pub fn highlighted_skin(&self) -> &'static str {
        SKINS[self.skin_cursor].name
    }
}

/// What the player chose on the pause overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    None,
    Resume,
    QuitToMenu,
}

/// Pause overlay state; navigation stays live while the sim is frozen
#[derive(Debug, Default)]
pub struct PauseMenu {
    pub cursor: usize,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, input: &MenuInput, settings: &mut Settings) -> PauseAction {
        if input.back {
            return PauseAction::Resume;
        }
        if input.up {
            self.cursor = (self.cursor + PAUSE_ITEMS.len() - 1) % PAUSE_ITEMS.len();
        }
        if input.down {
            self.cursor = (self.cursor + 1) % PAUSE_ITEMS.len();
        }
        if self.cursor == 1 && (input.left || input.right) {
            let delta = if input.left { -VOLUME_STEP } else { VOLUME_STEP };
            settings.adjust_volume(delta);
        }
        if input.select {
            match self.cursor {
                0 => return PauseAction::Resume,
                2 => return PauseAction::QuitToMenu,
                _ => {}
            }
        }
        PauseAction::None
    }
}
