use core::marker::PhantomData;

use crate::bus::Bus;

/// A halfword register at a fixed address, read and written as `T`.
pub(crate) struct MemoryMapped<T> {
    address: u32,
    phantom: PhantomData<T>,
}

impl<T> MemoryMapped<T>
where
    T: Copy + From<u16> + Into<u16>,
{
    pub(crate) const fn new(address: u32) -> Self {
        MemoryMapped {
            address,
            phantom: PhantomData,
        }
    }

    pub(crate) fn get<B: Bus + ?Sized>(&self, bus: &mut B) -> T {
        T::from(bus.read16(self.address))
    }

    pub(crate) fn set<B: Bus + ?Sized>(&self, bus: &mut B, val: T) {
        bus.write16(self.address, val.into());
    }

    pub(crate) fn update<B: Bus + ?Sized>(&self, bus: &mut B, f: impl FnOnce(&mut T)) {
        let mut value = self.get(bus);
        f(&mut value);
        self.set(bus, value);
    }
}
