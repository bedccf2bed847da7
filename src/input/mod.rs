// Input module - Physical gamepad state to logical SNES controller state
//
// The handheld reports a bitmask of physical keys. Each poll builds the SNES
// joypad bitmask from scratch through the active binding table. Two physical
// keys are reserved for opening the in-game menu and the options menu.

pub mod config;
pub mod keymap;

pub use config::KeymapConfig;
pub use keymap::{Direction, KeyBinding, KeymapProfile, KeymapSet};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Raw physical key state reported by the platform
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GamepadKeys: u32 {
        const UP = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
        const SELECT = 1 << 4;
        const START = 1 << 5;
        const MENU = 1 << 6;
        const OPTION = 1 << 7;
        const A = 1 << 8;
        const B = 1 << 9;
    }
}

bitflags! {
    /// SNES joypad state handed to the emulation core
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SnesButtons: u32 {
        const B = 0x8000;
        const Y = 0x4000;
        const SELECT = 0x2000;
        const START = 0x1000;
        const UP = 0x0800;
        const DOWN = 0x0400;
        const LEFT = 0x0200;
        const RIGHT = 0x0100;
        const A = 0x0080;
        const X = 0x0040;
        const L = 0x0020;
        const R = 0x0010;
    }
}

bitflags! {
    /// Menus requested by the current poll
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MenuTriggers: u8 {
        const GAME_MENU = 0x01;
        const OPTIONS_MENU = 0x02;
    }
}

/// A single physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhysicalKey {
    Up,
    Right,
    Down,
    Left,
    Select,
    Start,
    Menu,
    Option,
    A,
    B,
}

impl PhysicalKey {
    /// Every key, in bit order
    pub const ALL: [PhysicalKey; 10] = [
        PhysicalKey::Up,
        PhysicalKey::Right,
        PhysicalKey::Down,
        PhysicalKey::Left,
        PhysicalKey::Select,
        PhysicalKey::Start,
        PhysicalKey::Menu,
        PhysicalKey::Option,
        PhysicalKey::A,
        PhysicalKey::B,
    ];

    /// Bit for this key in the raw mask
    pub fn mask(self) -> GamepadKeys {
        GamepadKeys::from_bits_truncate(1 << self.bit_index())
    }

    /// Position of the key's bit
    pub fn bit_index(self) -> u32 {
        self as u32
    }

    /// True for the four d-pad directions
    pub fn is_dpad(self) -> bool {
        self.bit_index() < 4
    }

    /// Name shown in the controls dialog
    pub fn name(self) -> &'static str {
        match self {
            PhysicalKey::Up => "UP",
            PhysicalKey::Right => "RIGHT",
            PhysicalKey::Down => "DOWN",
            PhysicalKey::Left => "LEFT",
            PhysicalKey::Select => "SELECT",
            PhysicalKey::Start => "START",
            PhysicalKey::Menu => "MENU",
            PhysicalKey::Option => "OPTION",
            PhysicalKey::A => "A",
            PhysicalKey::B => "B",
        }
    }

    /// Parse a key name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

/// A single SNES joypad button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnesButton {
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
    A,
    B,
    X,
    Y,
    L,
    R,
}

impl SnesButton {
    /// Every button
    pub const ALL: [SnesButton; 12] = [
        SnesButton::Up,
        SnesButton::Down,
        SnesButton::Left,
        SnesButton::Right,
        SnesButton::Start,
        SnesButton::Select,
        SnesButton::A,
        SnesButton::B,
        SnesButton::X,
        SnesButton::Y,
        SnesButton::L,
        SnesButton::R,
    ];

    /// Bit for this button in the joypad mask
    pub fn mask(self) -> SnesButtons {
        match self {
            SnesButton::Up => SnesButtons::UP,
            SnesButton::Down => SnesButtons::DOWN,
            SnesButton::Left => SnesButtons::LEFT,
            SnesButton::Right => SnesButtons::RIGHT,
            SnesButton::Start => SnesButtons::START,
            SnesButton::Select => SnesButtons::SELECT,
            SnesButton::A => SnesButtons::A,
            SnesButton::B => SnesButtons::B,
            SnesButton::X => SnesButtons::X,
            SnesButton::Y => SnesButtons::Y,
            SnesButton::L => SnesButtons::L,
            SnesButton::R => SnesButtons::R,
        }
    }

    /// Label shown in the controls dialog
    pub fn label(self) -> &'static str {
        match self {
            SnesButton::Up => "UP",
            SnesButton::Down => "DOWN",
            SnesButton::Left => "LEFT",
            SnesButton::Right => "RIGHT",
            SnesButton::Start => "START",
            SnesButton::Select => "SELECT",
            SnesButton::A => "A",
            SnesButton::B => "B",
            SnesButton::X => "X",
            SnesButton::Y => "Y",
            SnesButton::L => "L",
            SnesButton::R => "R",
        }
    }

    /// Parse a button label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|button| button.label().eq_ignore_ascii_case(label))
    }
}

/// Outcome of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollResult {
    /// Logical joypad state for port 0
    pub controller: SnesButtons,
    /// Menus to open before this frame runs
    pub triggers: MenuTriggers,
}

/// Light-gun / mouse reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub buttons: u32,
}

/// Translates physical key state into SNES joypad state
///
/// The translator holds only the binding table; `poll` has no memory of
/// earlier polls.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    bindings: Vec<KeyBinding>,
}

impl InputTranslator {
    /// Translator with the reference mapping
    ///
    /// D-pad to d-pad, START to Start, SELECT to A, A to B, B to Y.
    pub fn new() -> Self {
        Self::with_bindings(KeymapProfile::reference().bindings().to_vec())
    }

    /// Translator with an explicit binding table
    pub fn with_bindings(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    /// Current binding table
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Remove every binding
    pub fn unmap_all(&mut self) {
        self.bindings.clear();
    }

    /// Add one binding
    pub fn map(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
    }

    /// Replace the whole binding table with a profile's bindings
    pub fn apply_profile(&mut self, profile: &KeymapProfile) {
        self.unmap_all();
        for &binding in profile.bindings() {
            self.map(binding);
        }
    }

    /// Translate one raw reading
    ///
    /// A binding marked as modifier only fires while MENU is held with its
    /// key; such a combination consumes the MENU press. Otherwise MENU opens
    /// the game menu and OPTION opens the options menu. A poll that raises a
    /// menu sets no joypad bits.
    pub fn poll(&self, raw: GamepadKeys) -> PollResult {
        let menu_held = raw.contains(GamepadKeys::MENU);
        let mut controller = SnesButtons::empty();
        let mut combo_keys = GamepadKeys::empty();

        if menu_held {
            for binding in self.bindings.iter().filter(|b| b.modifier) {
                if raw.contains(binding.key.mask()) {
                    controller |= binding.action.mask();
                    combo_keys |= binding.key.mask();
                }
            }
        }

        for binding in self.bindings.iter().filter(|b| !b.modifier) {
            let key = binding.key.mask();
            if raw.contains(key) && !combo_keys.contains(key) {
                controller |= binding.action.mask();
            }
        }

        let mut triggers = MenuTriggers::empty();
        if menu_held && combo_keys.is_empty() {
            triggers |= MenuTriggers::GAME_MENU;
        }
        if raw.contains(GamepadKeys::OPTION) {
            triggers |= MenuTriggers::OPTIONS_MENU;
        }

        if !triggers.is_empty() {
            controller = SnesButtons::empty();
        }

        PollResult {
            controller,
            triggers,
        }
    }

    /// Mouse reading; pointing devices are not supported
    pub fn mouse_position(&self, _which: u32) -> Option<PointerState> {
        None
    }

    /// Super Scope reading; pointing devices are not supported
    pub fn superscope_position(&self) -> Option<PointerState> {
        None
    }

    /// Justifier aim; always reported offscreen
    pub fn justifier_offscreen(&self) -> bool {
        true
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new()
    }
}
