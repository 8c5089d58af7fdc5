use afton_reg::{Divider, TimerControl, timer_control, timer_data};

use crate::{bus::Bus, memory_mapped::MemoryMapped};

const fn data_register(timer: usize) -> MemoryMapped<u16> {
    MemoryMapped::new(timer_data(timer))
}

const fn control_register(timer: usize) -> MemoryMapped<TimerControl> {
    MemoryMapped::new(timer_control(timer))
}

/// One of the four hardware timers. Timers 0 and 1 pace the sound FIFOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Timer<const N: usize> {}

impl<const N: usize> Timer<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// The timer overflows once every `n` ticks of its divided clock.
    pub fn set_overflow_amount<B: Bus + ?Sized>(&mut self, bus: &mut B, n: u16) {
        let count_up_value = 0u16.wrapping_sub(n);
        data_register(N).set(bus, count_up_value);
    }

    pub fn set_divider<B: Bus + ?Sized>(&mut self, bus: &mut B, divider: Divider) {
        control_register(N).update(bus, |control| control.set_divider(divider));
    }

    pub fn set_enabled<B: Bus + ?Sized>(&mut self, bus: &mut B, enabled: bool) {
        control_register(N).update(bus, |control| control.set_enable(enabled));
    }
}

impl<const N: usize> Default for Timer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use super::*;
    use crate::simulator::SimulatedBus;

    #[test]
    fn overflow_amount_counts_up_to_zero() {
        let mut bus = SimulatedBus::new();
        let mut timer = Timer::<1>::new();

        timer.set_overflow_amount(&mut bus, 2097);

        assert_eq!(bus.read16(timer_data(1)), 65536u32.wrapping_sub(2097) as u16);
    }

    #[test]
    fn control_bits() {
        let mut bus = SimulatedBus::new();
        let mut timer = Timer::<0>::new();

        timer.set_divider(&mut bus, Divider::Divider64);
        timer.set_enabled(&mut bus, true);

        assert_eq!(bus.read16(timer_control(0)), 1 | (1 << 7));

        timer.set_enabled(&mut bus, false);

        assert_eq!(bus.read16(timer_control(0)), 1);
    }
}
