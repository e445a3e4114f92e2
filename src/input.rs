//! Input mapper
//!
//! Translates raw key/pointer state into simulation commands and menu
//! navigation events. The simulation never sees a platform key name: the
//! driver feeds key transitions in, and once per frame the mapper emits an
//! abstract `FrameInput`. Navigation and toggles are edge-latched so a held
//! key fires once; movement and fire are level-sampled.

use crate::consts::{SCREEN_WIDTH, TURRET_SLOTS};
use crate::sim::{Rect, TickInput};

/// Abstract buttons the game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Pause,
    Confirm,
    Cancel,
    Restart,
    ToMenu,
}

impl Button {
    pub const COUNT: usize = 10;

    fn index(self) -> usize {
        match self {
            Button::Left => 0,
            Button::Right => 1,
            Button::Up => 2,
            Button::Down => 3,
            Button::Fire => 4,
            Button::Pause => 5,
            Button::Confirm => 6,
            Button::Cancel => 7,
            Button::Restart => 8,
            Button::ToMenu => 9,
        }
    }

    /// Key binding table (browser `KeyboardEvent.key` values)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Button::Left),
            "ArrowRight" | "d" | "D" => Some(Button::Right),
            "ArrowUp" | "w" | "W" => Some(Button::Up),
            "ArrowDown" | "s" | "S" => Some(Button::Down),
            " " | "Space" => Some(Button::Fire),
            "p" | "P" => Some(Button::Pause),
            "Enter" => Some(Button::Confirm),
            "Escape" => Some(Button::Cancel),
            "r" | "R" => Some(Button::Restart),
            "m" | "M" => Some(Button::ToMenu),
            _ => None,
        }
    }
}

/// Menu navigation events for one frame (all edge-triggered)
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Confirm or fire both select in menus
    pub select: bool,
    pub back: bool,
}

impl MenuInput {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right || self.select || self.back
    }
}

/// Everything sampled from the devices for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub tick: TickInput,
    pub menu: MenuInput,
    pub restart: bool,
    pub to_menu: bool,
}

/// Edge-detecting mapper over the raw held-key state
#[derive(Debug, Default)]
pub struct InputMapper {
    held: [bool; Button::COUNT],
    prev: [bool; Button::COUNT],
    /// Pause toggles queued by pointer clicks on the pause control
    clicked_pause: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key transition from the platform layer
    pub fn key_event(&mut self, key: &str, pressed: bool) {
        if let Some(button) = Button::from_key(key) {
            self.held[button.index()] = pressed;
        }
    }

    /// Feed a pointer click in canvas coordinates
    pub fn pointer_click(&mut self, x: f32, y: f32) {
        if pause_button_rect().contains(glam::Vec2::new(x, y)) {
            self.clicked_pause = true;
        }
    }

    fn down(&self, button: Button) -> bool {
        self.held[button.index()]
    }

    fn pressed(&self, button: Button) -> bool {
        self.held[button.index()] && !self.prev[button.index()]
    }

    /// Sample one frame of input and latch the edges
    pub fn sample(&mut self) -> FrameInput {
        let pause = self.pressed(Button::Pause) || self.clicked_pause;
        let frame = FrameInput {
            tick: TickInput {
                move_left: self.down(Button::Left),
                move_right: self.down(Button::Right),
                move_up: self.down(Button::Up),
                move_down: self.down(Button::Down),
                fire: self.down(Button::Fire),
                pause,
            },
            menu: MenuInput {
                up: self.pressed(Button::Up),
                down: self.pressed(Button::Down),
                left: self.pressed(Button::Left),
                right: self.pressed(Button::Right),
                select: self.pressed(Button::Confirm) || self.pressed(Button::Fire),
                back: self.pressed(Button::Cancel),
            },
            restart: self.pressed(Button::Restart),
            to_menu: self.pressed(Button::ToMenu),
        };
        self.prev = self.held;
        self.clicked_pause = false;
        frame
    }
}

/// Fixed on-screen pause control (top-right corner), hit-tested for clicks
pub fn pause_button_rect() -> Rect {
    Rect::new(SCREEN_WIDTH - 50.0, 10.0, 40.0, 40.0)
}

/// Settings screen rows: the volume slider plus one row per turret slot
pub const SETTINGS_ROWS: usize = 1 + TURRET_SLOTS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_is_level_sampled() {
        let mut mapper = InputMapper::new();
        mapper.key_event("ArrowLeft", true);

        let a = mapper.sample();
        let b = mapper.sample();
        assert!(a.tick.move_left);
        assert!(b.tick.move_left);
    }

    #[test]
    fn test_nav_is_edge_latched() {
        let mut mapper = InputMapper::new();
        mapper.key_event("ArrowDown", true);

        let a = mapper.sample();
        let b = mapper.sample();
        assert!(a.menu.down);
        assert!(!b.menu.down);

        // Release and press again fires a new edge
        mapper.key_event("ArrowDown", false);
        mapper.sample();
        mapper.key_event("s", true);
        assert!(mapper.sample().menu.down);
    }

    #[test]
    fn test_pause_edge() {
        let mut mapper = InputMapper::new();
        mapper.key_event("p", true);
        assert!(mapper.sample().tick.pause);
        assert!(!mapper.sample().tick.pause);
    }

    #[test]
    fn test_space_fires_and_selects() {
        let mut mapper = InputMapper::new();
        mapper.key_event(" ", true);
        let frame = mapper.sample();
        assert!(frame.tick.fire);
        assert!(frame.menu.select);
    }

    #[test]
    fn test_pointer_click_on_pause_control() {
        let mut mapper = InputMapper::new();
        mapper.pointer_click(SCREEN_WIDTH - 30.0, 30.0);
        assert!(mapper.sample().tick.pause);
        // Consumed after one frame
        assert!(!mapper.sample().tick.pause);
    }

    #[test]
    fn test_pointer_click_elsewhere_ignored() {
        let mut mapper = InputMapper::new();
        mapper.pointer_click(100.0, 300.0);
        assert!(!mapper.sample().tick.pause);
    }

    #[test]
    fn test_unbound_key_ignored() {
        let mut mapper = InputMapper::new();
        mapper.key_event("F5", true);
        let frame = mapper.sample();
        assert!(!frame.tick.fire && !frame.menu.any());
    }
}
