// Copyright (c) 2026 rezky_nightky

use crossterm::event::KeyCode;

pub const BUTTON_COLOR: u8 = 0;
pub const BUTTON_PAUSE: u8 = 3;
pub const BUTTON_FADE_DOWN: u8 = 6;
pub const BUTTON_FADE_UP: u8 = 7;

/// A polled controller with edge-triggered buttons.
pub trait InputDevice {
    /// True at most once per physical press, until the edges are cleared.
    fn button_pressed(&self, index: u8) -> bool;
    fn clear_button_edges(&mut self);
}

/// Button latch for up to 32 buttons. Whoever owns the physical input calls
/// [`Gamepad::press`]; the engine reads and clears the edges once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gamepad {
    edges: u32,
}

impl Gamepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, index: u8) {
        if let Some(bit) = 1u32.checked_shl(index as u32) {
            self.edges |= bit;
        }
    }
}

impl InputDevice for Gamepad {
    fn button_pressed(&self, index: u8) -> bool {
        1u32.checked_shl(index as u32)
            .is_some_and(|bit| self.edges & bit != 0)
    }

    fn clear_button_edges(&mut self) {
        self.edges = 0;
    }
}

/// Keyboard stand-in for the gamepad buttons.
pub fn button_for_key(code: KeyCode) -> Option<u8> {
    match code {
        KeyCode::Char('c') | KeyCode::Enter => Some(BUTTON_COLOR),
        KeyCode::Char('p') => Some(BUTTON_PAUSE),
        KeyCode::Char('-') | KeyCode::Left => Some(BUTTON_FADE_DOWN),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => Some(BUTTON_FADE_UP),
        _ => None,
    }
}
