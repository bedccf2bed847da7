// Gamepad input - Physical controllers through gilrs
//
// Every connected controller feeds the same key state; the handheld only
// has one set of buttons.
//
// Default mappings (standard gamepad layout):
// - D-pad: D-pad
// - East: A
// - South: B
// - Start: START
// - Select/Back: SELECT
// - Mode/West: MENU
// - North: OPTION

use crate::input::{GamepadKeys, PhysicalKey};
use gilrs::{Button, Event, EventType, Gilrs};
use tracing::{info, warn};

/// Handheld button for a gamepad button
pub fn button_key(button: Button) -> Option<PhysicalKey> {
    match button {
        Button::DPadUp => Some(PhysicalKey::Up),
        Button::DPadDown => Some(PhysicalKey::Down),
        Button::DPadLeft => Some(PhysicalKey::Left),
        Button::DPadRight => Some(PhysicalKey::Right),
        Button::East => Some(PhysicalKey::A),
        Button::South => Some(PhysicalKey::B),
        Button::Start => Some(PhysicalKey::Start),
        Button::Select => Some(PhysicalKey::Select),
        Button::Mode | Button::West => Some(PhysicalKey::Menu),
        Button::North => Some(PhysicalKey::Option),
        _ => None,
    }
}

/// Gamepad half of the desktop gamepad state
pub struct GamepadInput {
    gilrs: Gilrs,
    pressed: GamepadKeys,
}

impl GamepadInput {
    /// Start listening for controllers
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;

        let connected: Vec<_> = gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, gamepad)| format!("{} ({})", gamepad.name(), id))
            .collect();
        if connected.is_empty() {
            info!("no gamepads detected");
        } else {
            info!(gamepads = ?connected, "gamepads detected");
        }

        Ok(Self {
            gilrs,
            pressed: GamepadKeys::empty(),
        })
    }

    /// Start listening, or run without controllers if that fails
    pub fn open() -> Option<Self> {
        Self::new()
            .map_err(|e| warn!(error = %e, "gamepad support unavailable"))
            .ok()
    }

    /// Process pending controller events
    pub fn update(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::ButtonPressed(button, _) => apply(&mut self.pressed, button, true),
                EventType::ButtonReleased(button, _) => apply(&mut self.pressed, button, false),
                EventType::Connected => info!(gamepad = %id, "gamepad connected"),
                EventType::Disconnected => {
                    info!(gamepad = %id, "gamepad disconnected");
                    self.pressed = GamepadKeys::empty();
                }
                _ => {}
            }
        }
    }

    /// Buttons currently held on any controller
    pub fn state(&self) -> GamepadKeys {
        self.pressed
    }
}

fn apply(pressed: &mut GamepadKeys, button: Button, down: bool) {
    if let Some(key) = button_key(button) {
        pressed.set(key.mask(), down);
    }
}
