// Keyboard input - Desktop keys standing in for the handheld's buttons
//
// Default mappings:
// - Arrow keys: D-pad
// - X: A
// - Z: B
// - Enter: START
// - Right Shift: SELECT
// - Escape: MENU
// - Tab: OPTION

use crate::input::{GamepadKeys, PhysicalKey};
use std::collections::HashMap;
use winit::keyboard::{KeyCode, PhysicalKey as WinitKey};

/// Key code to handheld button table
#[derive(Debug, Clone)]
pub struct KeyboardMapping {
    keys: HashMap<KeyCode, PhysicalKey>,
}

impl KeyboardMapping {
    /// The default desktop layout
    pub fn default_mapping() -> Self {
        let keys = [
            (KeyCode::ArrowUp, PhysicalKey::Up),
            (KeyCode::ArrowDown, PhysicalKey::Down),
            (KeyCode::ArrowLeft, PhysicalKey::Left),
            (KeyCode::ArrowRight, PhysicalKey::Right),
            (KeyCode::KeyX, PhysicalKey::A),
            (KeyCode::KeyZ, PhysicalKey::B),
            (KeyCode::Enter, PhysicalKey::Start),
            (KeyCode::ShiftRight, PhysicalKey::Select),
            (KeyCode::Escape, PhysicalKey::Menu),
            (KeyCode::Tab, PhysicalKey::Option),
        ]
        .into_iter()
        .collect();

        Self { keys }
    }

    /// Button bound to a key code
    pub fn key_for(&self, code: KeyCode) -> Option<PhysicalKey> {
        self.keys.get(&code).copied()
    }
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self::default_mapping()
    }
}

/// Keyboard half of the desktop gamepad state
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    mapping: KeyboardMapping,
    pressed: GamepadKeys,
}

impl KeyboardInput {
    /// Create with the default mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key event
    pub fn handle_key(&mut self, key: WinitKey, pressed: bool) {
        let WinitKey::Code(code) = key else {
            return;
        };
        if let Some(button) = self.mapping.key_for(code) {
            self.pressed.set(button.mask(), pressed);
        }
    }

    /// Buttons currently held on the keyboard
    pub fn state(&self) -> GamepadKeys {
        self.pressed
    }

    /// Drop every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.pressed = GamepadKeys::empty();
    }
}
