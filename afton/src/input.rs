#![deny(missing_docs)]
//! Reading the buttons.

use afton_reg::KEY_INPUT;
use bitflags::bitflags;

use crate::bus::Bus;

bitflags! {
    /// Represents a button on the GBA
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Button: u16 {
        /// The A button
        const A = 1 << 0;
        /// The B button
        const B = 1 << 1;
        /// The SELECT button
        const SELECT = 1 << 2;
        /// The START button
        const START = 1 << 3;
        /// The RIGHT button on the D-Pad
        const RIGHT = 1 << 4;
        /// The LEFT button on the D-Pad
        const LEFT = 1 << 5;
        /// The UP button on the D-Pad
        const UP = 1 << 6;
        /// The DOWN button on the D-Pad
        const DOWN = 1 << 7;
        /// The R shoulder button
        const R = 1 << 8;
        /// The L shoulder button
        const L = 1 << 9;
    }
}

/// Keeps the state of the buttons as of the last [`update`](Self::update).
///
/// The key register is active low; this flips it so a set bit means pressed.
#[derive(Debug, Clone, Default)]
pub struct ButtonController {
    current: Button,
}

impl ButtonController {
    /// Create a new ButtonController with nothing pressed.
    #[must_use]
    pub fn new() -> Self {
        ButtonController::default()
    }

    /// Reads the key register. Call this once per frame; nothing else reads
    /// the hardware.
    pub fn update<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.current = Button::from_bits_truncate(!bus.read16(KEY_INPUT));
    }

    /// Returns `true` if any of the provided keys are pressed.
    #[must_use]
    pub fn is_pressed(&self, keys: Button) -> bool {
        self.current.intersects(keys)
    }
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use super::*;
    use crate::simulator::SimulatedBus;

    #[test]
    fn nothing_pressed_by_default() {
        let mut bus = SimulatedBus::new();
        let mut input = ButtonController::new();

        input.update(&mut bus);

        assert!(!input.is_pressed(Button::all()));
    }

    #[test]
    fn reads_active_low_register() {
        let mut bus = SimulatedBus::new();
        let mut input = ButtonController::new();

        bus.set_keys(Button::LEFT | Button::A);
        input.update(&mut bus);

        assert!(input.is_pressed(Button::A));
        assert!(input.is_pressed(Button::LEFT | Button::RIGHT));
        assert!(!input.is_pressed(Button::RIGHT));
    }

    #[test]
    fn only_changes_on_update() {
        let mut bus = SimulatedBus::new();
        let mut input = ButtonController::new();

        bus.set_keys(Button::A);
        input.update(&mut bus);
        bus.set_keys(Button::empty());

        assert!(input.is_pressed(Button::A));

        input.update(&mut bus);
        assert!(!input.is_pressed(Button::A));
    }
}
