use std::collections::HashMap;

use mvs_core::prelude::InputButton;
use sdl2::keyboard::Scancode;

/// Maps SDL scancodes to machine button IDs.
pub struct KeyMap {
    map: HashMap<Scancode, u8>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a scancode to a machine button ID.
    pub fn bind(&mut self, scancode: Scancode, button_id: u8) {
        self.map.insert(scancode, button_id);
    }

    /// Look up the machine button ID for a scancode.
    pub fn get(&self, scancode: Scancode) -> Option<u8> {
        self.map.get(&scancode).copied()
    }
}

/// Build a default key map for the Neo Geo's fifteen joystick/system
/// buttons (see `neogeo::peripherals::input::INPUT_MAP`).
pub fn default_key_map(buttons: &[InputButton]) -> KeyMap {
    let mut km = KeyMap::new();

    for button in buttons {
        let scancode = match button.name {
            "P1 Up" => Some(Scancode::Up),
            "P1 Down" => Some(Scancode::Down),
            "P1 Left" => Some(Scancode::Left),
            "P1 Right" => Some(Scancode::Right),
            "P1 A" => Some(Scancode::Z),
            "P1 B" => Some(Scancode::X),
            "P1 C" => Some(Scancode::C),
            "P1 D" => Some(Scancode::V),
            "P1 Start" => Some(Scancode::Num1),
            "P1 Select" => Some(Scancode::Num2),
            "Coin 1" => Some(Scancode::Num5),
            "Coin 2" => Some(Scancode::Num6),
            "Coin 3" => Some(Scancode::Num7),
            "Coin 4" => Some(Scancode::Num8),
            "Service" => Some(Scancode::Num9),

            _ => None,
        };

        if let Some(sc) = scancode {
            km.bind(sc, button.id);
        }
    }

    km
}
