//! P1 controls, system inputs, and RTC readback bits (§4.G "Input"),
//! grounded directly on `input.c`'s three read ports.

use mvs_core::prelude::InputButton;

pub const P1_UP: u8 = 0;
pub const P1_DOWN: u8 = 1;
pub const P1_LEFT: u8 = 2;
pub const P1_RIGHT: u8 = 3;
pub const P1_A: u8 = 4;
pub const P1_B: u8 = 5;
pub const P1_C: u8 = 6;
pub const P1_D: u8 = 7;
pub const P1_START: u8 = 8;
pub const P1_SELECT: u8 = 9;
pub const COIN_1: u8 = 10;
pub const COIN_2: u8 = 11;
pub const COIN_3: u8 = 12;
pub const COIN_4: u8 = 13;
pub const SERVICE: u8 = 14;

pub const INPUT_MAP: &[InputButton] = &[
    InputButton { id: P1_UP, name: "P1 Up" },
    InputButton { id: P1_DOWN, name: "P1 Down" },
    InputButton { id: P1_LEFT, name: "P1 Left" },
    InputButton { id: P1_RIGHT, name: "P1 Right" },
    InputButton { id: P1_A, name: "P1 A" },
    InputButton { id: P1_B, name: "P1 B" },
    InputButton { id: P1_C, name: "P1 C" },
    InputButton { id: P1_D, name: "P1 D" },
    InputButton { id: P1_START, name: "P1 Start" },
    InputButton { id: P1_SELECT, name: "P1 Select" },
    InputButton { id: COIN_1, name: "Coin 1" },
    InputButton { id: COIN_2, name: "Coin 2" },
    InputButton { id: COIN_3, name: "Coin 3" },
    InputButton { id: COIN_4, name: "Coin 4" },
    InputButton { id: SERVICE, name: "Service" },
];

/// Active-low button state for the fifteen lines this board reads. `true`
/// means pressed; active-low encoding into the read ports happens at read
/// time, not storage time, so `set_input` stays a plain bit set/clear.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputState {
    pressed: u16,
}

impl InputState {
    pub fn set(&mut self, button: u8, pressed: bool) {
        if button > SERVICE {
            return;
        }
        if pressed {
            self.pressed |= 1 << button;
        } else {
            self.pressed &= !(1 << button);
        }
    }

    fn bit(&self, button: u8) -> bool {
        self.pressed & (1 << button) != 0
    }

    /// 0x300000: P1 controls, active-low bits 0..7 (`input_p1cnt_r`).
    pub fn p1_controls(&self) -> u8 {
        let mut state = 0u8;
        for (i, id) in [P1_UP, P1_DOWN, P1_LEFT, P1_RIGHT, P1_A, P1_B, P1_C, P1_D].iter().enumerate() {
            if !self.bit(*id) {
                state |= 1 << i;
            }
        }
        state
    }

    /// 0x320001 low 6 bits: coin/service lines (`input_status_a_r`, RTC bits
    /// 6/7 are overlaid by the caller).
    pub fn status_a_low(&self) -> u8 {
        let mut state = 0u8;
        for (i, id) in [COIN_1, COIN_2, SERVICE, COIN_3, COIN_4].iter().enumerate() {
            if !self.bit(*id) {
                state |= 1 << i;
            }
        }
        state
    }

    /// 0x380000: start/select plus fixed memory-card/MVS marker bits
    /// (`input_status_b_r`).
    pub fn status_b(&self) -> u8 {
        let mut state = 0u8;
        if !self.bit(P1_START) {
            state |= 1 << 0;
        }
        if !self.bit(P1_SELECT) {
            state |= 1 << 1;
        }
        state | 0x20 | 0x40 | 0x80
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpressed_state_reads_all_high() {
        let input = InputState::default();
        assert_eq!(input.p1_controls(), 0xFF);
        assert_eq!(input.status_a_low(), 0x1F);
    }

    #[test]
    fn pressing_a_button_clears_its_bit() {
        let mut input = InputState::default();
        input.set(P1_A, true);
        assert_eq!(input.p1_controls(), 0xFF & !(1 << 4));
        input.set(P1_A, false);
        assert_eq!(input.p1_controls(), 0xFF);
    }

    #[test]
    fn status_b_always_carries_mvs_marker_bits() {
        let input = InputState::default();
        assert_eq!(input.status_b() & 0xE0, 0xE0);
    }

    #[test]
    fn coin_1_clears_status_a_bit_0() {
        let mut input = InputState::default();
        input.set(COIN_1, true);
        assert_eq!(input.status_a_low() & 1, 0);
    }
}
