//! Sky Intruder entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! renderer is an external collaborator: each frame the driver serializes a
//! view (menu layout or world snapshot) and hands it to a JS hook.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use serde::Serialize;

    use sky_intruder::audio::{AudioManager, SoundEffect};
    use sky_intruder::consts::*;
    use sky_intruder::input::{FrameInput, InputMapper};
    use sky_intruder::menu::{MenuAction, MenuState, PauseAction, PauseMenu, PAUSE_ITEMS, ROOT_ITEMS};
    use sky_intruder::progression::{upgrade_cost, ProgressionStore, SKINS, UpgradeTrack};
    use sky_intruder::settings::Settings;
    use sky_intruder::sim::{
        snapshot, GameEvent, GamePhase, GameState, Loadout, RenderSnapshot, tick,
    };

    // The renderer is external: it installs `window.presentFrame` and draws
    // whatever the simulation hands it.
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            if (window.presentFrame) {
                window.presentFrame(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Menu,
        Run,
    }

    /// One upgrade row for the menu renderer
    #[derive(Serialize)]
    struct UpgradeRow {
        label: &'static str,
        effect: &'static str,
        level: u32,
        max_level: u32,
        /// Cost of the next level; absent when maxed
        next_cost: Option<u64>,
    }

    /// One skin row for the menu renderer
    #[derive(Serialize)]
    struct SkinRow {
        name: &'static str,
        requirement: &'static str,
        unlocked: bool,
        equipped: bool,
    }

    /// Menu-mode frame payload
    #[derive(Serialize)]
    struct MenuView {
        screen: &'static str,
        root_items: [&'static str; 6],
        cursor: usize,
        upgrade_cursor: usize,
        skin_cursor: usize,
        settings_cursor: usize,
        credits: u64,
        volume: f32,
        turret_enabled: [bool; TURRET_SLOTS],
        owned_turrets: u32,
        upgrades: Vec<UpgradeRow>,
        skins: Vec<SkinRow>,
    }

    /// Run-mode frame payload
    #[derive(Serialize)]
    struct RunView {
        pause_items: [&'static str; 3],
        pause_cursor: usize,
        volume: f32,
        snapshot: RenderSnapshot,
    }

    /// What the external renderer receives each frame
    #[derive(Serialize)]
    struct FrameView {
        mode: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        menu: Option<MenuView>,
        #[serde(skip_serializing_if = "Option::is_none")]
        run: Option<RunView>,
    }

    /// Game instance holding all state
    struct Game {
        mode: Mode,
        state: GameState,
        store: ProgressionStore,
        settings: Settings,
        menu: MenuState,
        pause_menu: PauseMenu,
        mapper: InputMapper,
        audio: AudioManager,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new() -> Self {
            let store = ProgressionStore::load();
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_volume(settings.volume);
            Self {
                mode: Mode::Menu,
                state: GameState::new(0, Loadout::default()),
                store,
                settings,
                menu: MenuState::new(),
                pause_menu: PauseMenu::new(),
                mapper: InputMapper::new(),
                audio,
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Start a fresh run with the current upgrades and settings
        fn start_run(&mut self) {
            self.store.begin_run();
            let loadout = Loadout {
                lives: self.store.upgrades.lives,
                damage_level: self.store.upgrades.damage,
                turret_level: self.store.upgrades.turrets,
                turret_enabled: self.settings.turret_enabled,
            };
            let seed = js_sys::Date::now() as u64;
            self.state = GameState::new(seed, loadout);
            self.pause_menu = PauseMenu::new();
            self.mode = Mode::Run;
            log::info!("Run started with seed {}", seed);
        }

        /// Leave the run for the menu, rolling back provisional credits
        /// unless the run already ended
        fn quit_to_menu(&mut self) {
            if self.state.phase != GamePhase::GameOver {
                self.store.abandon_run();
            }
            self.menu.reset();
            self.mode = Mode::Menu;
        }

        /// Pause from outside the input path (tab hidden, window blur)
        fn force_pause(&mut self) {
            if self.mode == Mode::Run && self.state.phase == GamePhase::Playing {
                self.state.phase = GamePhase::Paused;
                log::info!("Auto-paused");
            }
        }

        /// Run simulation ticks and menu handling for one frame
        fn update(&mut self, dt: f32) {
            let frame = self.mapper.sample();

            match self.mode {
                Mode::Menu => self.update_menu(&frame),
                Mode::Run => self.update_run(&frame, dt),
            }

            // Save-on-mutation, at most once per frame
            if self.store.is_dirty() {
                self.store.save();
            }
            if self.settings.is_dirty() {
                self.settings.save();
                self.audio.set_volume(self.settings.volume);
            }
        }

        fn update_menu(&mut self, frame: &FrameInput) {
            if frame.menu.up || frame.menu.down || frame.menu.left || frame.menu.right {
                self.audio.play(SoundEffect::MenuMove);
            }
            if frame.menu.select {
                self.audio.play(SoundEffect::MenuSelect);
            }
            let action = self
                .menu
                .handle(&frame.menu, &mut self.store, &mut self.settings);
            if action == MenuAction::StartRun {
                self.start_run();
            }
        }

        fn update_run(&mut self, frame: &FrameInput, dt: f32) {
            match self.state.phase {
                GamePhase::Paused => {
                    if frame.menu.any() {
                        self.audio.play(SoundEffect::MenuMove);
                    }
                    match self.pause_menu.handle(&frame.menu, &mut self.settings) {
                        PauseAction::Resume => self.state.phase = GamePhase::Playing,
                        PauseAction::QuitToMenu => {
                            self.quit_to_menu();
                            return;
                        }
                        PauseAction::None => {}
                    }
                    // The pause key still toggles while frozen
                    if frame.tick.pause {
                        self.state.phase = GamePhase::Playing;
                        self.pause_menu = PauseMenu::new();
                    }
                }
                GamePhase::GameOver => {
                    if frame.restart {
                        self.start_run();
                        return;
                    }
                    if frame.to_menu {
                        self.quit_to_menu();
                        return;
                    }
                    self.step_simulation(frame, dt);
                }
                GamePhase::Playing => {
                    self.step_simulation(frame, dt);
                    if self.state.phase == GamePhase::Paused {
                        self.pause_menu = PauseMenu::new();
                    }
                }
            }
        }

        /// Fixed-timestep accumulator around `tick`
        fn step_simulation(&mut self, frame: &FrameInput, dt: f32) {
            let mut input = frame.tick;
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let events = tick(&mut self.state, &mut self.store, &input);
                self.audio.play_events(&events);
                for event in &events {
                    if let GameEvent::SkinUnlocked { skin } = event {
                        log::info!("Skin unlocked: {}", SKINS[*skin].name);
                    }
                }
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                input.pause = false;
            }
        }

        /// Serialize the frame for the external renderer
        fn render(&self) {
            let view = match self.mode {
                Mode::Menu => FrameView {
                    mode: "menu",
                    menu: Some(self.menu_view()),
                    run: None,
                },
                Mode::Run => FrameView {
                    mode: "run",
                    menu: None,
                    run: Some(RunView {
                        pause_items: PAUSE_ITEMS,
                        pause_cursor: self.pause_menu.cursor,
                        volume: self.settings.volume,
                        snapshot: snapshot(&self.state, &self.store),
                    }),
                },
            };
            if let Ok(json) = serde_json::to_string(&view) {
                present_frame(&json);
            }
        }

        fn menu_view(&self) -> MenuView {
            let screen = match self.menu.screen {
                sky_intruder::menu::Screen::Root => "root",
                sky_intruder::menu::Screen::Upgrades => "upgrades",
                sky_intruder::menu::Screen::Skins => "skins",
                sky_intruder::menu::Screen::Settings => "settings",
                sky_intruder::menu::Screen::Controls => "controls",
                sky_intruder::menu::Screen::About => "about",
            };
            let upgrades = UpgradeTrack::ALL
                .iter()
                .map(|&track| {
                    let level = self.store.upgrades.get(track);
                    UpgradeRow {
                        label: track.label(),
                        effect: track.effect(),
                        level,
                        max_level: track.max_level(),
                        next_cost: (level < track.max_level())
                            .then(|| upgrade_cost(track, level)),
                    }
                })
                .collect();
            let skins = SKINS
                .iter()
                .enumerate()
                .map(|(i, skin)| SkinRow {
                    name: skin.name,
                    requirement: skin.requirement,
                    unlocked: self.store.unlocked_skins[i],
                    equipped: self.store.selected_skin == i,
                })
                .collect();

            MenuView {
                screen,
                root_items: ROOT_ITEMS,
                cursor: self.menu.root_cursor,
                upgrade_cursor: self.menu.upgrade_cursor,
                skin_cursor: self.menu.skin_cursor,
                settings_cursor: self.menu.settings_cursor,
                credits: self.store.credits,
                volume: self.settings.volume,
                turret_enabled: self.settings.turret_enabled,
                owned_turrets: self.store.upgrades.turrets,
                upgrades,
                skins,
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sky Intruder starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(SCREEN_WIDTH as u32);
        canvas.set_height(SCREEN_HEIGHT as u32);

        let game = Rc::new(RefCell::new(Game::new()));

        setup_input_handlers(&canvas, game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Sky Intruder running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                if sky_intruder::input::Button::from_key(&key).is_some() {
                    // Keep space/arrows from scrolling the page
                    event.prevent_default();
                }
                game.borrow_mut().mapper.key_event(&key, true);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().mapper.key_event(&event.key(), false);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer: the pause control in the corner
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let y = event.client_y() as f32 - rect.top() as f32;
                game.borrow_mut().mapper.pointer_click(x, y);
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().force_pause();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().force_pause();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sky_intruder::ProgressionStore;
    use sky_intruder::sim::{GamePhase, GameState, Loadout, TickInput, tick};

    env_logger::init();
    log::info!("Sky Intruder (native) starting...");
    log::info!("Run in a browser for the playable version; native mode runs a headless demo.");

    // Headless demo: hold fire and weave for up to a minute of sim time
    let mut store = ProgressionStore::load();
    store.begin_run();
    let mut state = GameState::new(42, Loadout::default());

    let mut ticks = 0u32;
    while state.phase != GamePhase::GameOver && ticks < 60 * 60 {
        let weave_left = (ticks / 120) % 2 == 0;
        let input = TickInput {
            fire: true,
            move_left: weave_left,
            move_right: !weave_left,
            ..Default::default()
        };
        tick(&mut state, &mut store, &input);
        ticks += 1;
    }

    println!(
        "demo over after {} ticks: score {}, level {}, accuracy {:.0}%, credits {}",
        ticks,
        state.stats.score,
        state.stats.level,
        state.stats.accuracy(),
        store.credits
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
