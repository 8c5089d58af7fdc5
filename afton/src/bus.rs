//! The seam between the game and the hardware.
//!
//! Everything that touches a register or video memory takes a `&mut impl Bus`.
//! [`Mmio`] is the real thing. The simulator provides another implementation
//! for running on a host.

use afton_reg::{DmaControl, dma_control, dma_count, dma_destination, dma_source};

/// Where a DMA transfer reads from.
#[derive(Clone, Copy, Debug)]
pub enum Source<'a> {
    /// Image, palette, map and sprite attribute data.
    Halfwords(&'a [u16]),
    /// Signed 8-bit PCM, streamed into a sound FIFO.
    Samples(&'a [i8]),
}

impl Source<'_> {
    /// The address the DMA unit should read from. Only meaningful on the
    /// console, where pointers are 32 bits wide.
    #[must_use]
    pub fn address(&self) -> u32 {
        match self {
            Source::Halfwords(data) => data.as_ptr() as usize as u32,
            Source::Samples(data) => data.as_ptr() as usize as u32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Source::Halfwords(data) => data.len(),
            Source::Samples(data) => data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One programming of a DMA channel.
#[derive(Clone, Copy, Debug)]
pub struct Transfer<'a> {
    pub source: Source<'a>,
    pub destination: u32,
    /// Number of units to move, in the transfer size given by `control`.
    /// Ignored by the hardware for sound FIFO transfers.
    pub count: u16,
    pub control: DmaControl,
}

/// Read and write access to the memory mapped hardware.
pub trait Bus {
    fn read16(&mut self, address: u32) -> u16;

    fn write16(&mut self, address: u32, value: u16);

    fn write8(&mut self, address: u32, value: u8);

    fn write32(&mut self, address: u32, value: u32) {
        self.write16(address, value as u16);
        self.write16(address + 2, (value >> 16) as u16);
    }

    /// Programs `channel` with `transfer`. Transfers with immediate timing have
    /// completed by the time this returns.
    fn dma(&mut self, channel: usize, transfer: Transfer<'_>);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn read16(&mut self, address: u32) -> u16 {
        (**self).read16(address)
    }

    fn write16(&mut self, address: u32, value: u16) {
        (**self).write16(address, value);
    }

    fn write8(&mut self, address: u32, value: u8) {
        (**self).write8(address, value);
    }

    fn write32(&mut self, address: u32, value: u32) {
        (**self).write32(address, value);
    }

    fn dma(&mut self, channel: usize, transfer: Transfer<'_>) {
        (**self).dma(channel, transfer);
    }
}

/// Volatile access to the real registers.
#[derive(Debug)]
#[non_exhaustive]
pub struct Mmio {}

impl Mmio {
    /// # Safety
    /// Must only be used when running on a Game Boy Advance, where every
    /// address in `afton_reg` is backed by the hardware it names.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Mmio {}
    }
}

impl Bus for Mmio {
    fn read16(&mut self, address: u32) -> u16 {
        // Safety: constructing an Mmio promises these addresses are real
        unsafe { (address as usize as *const u16).read_volatile() }
    }

    fn write16(&mut self, address: u32, value: u16) {
        unsafe { (address as usize as *mut u16).write_volatile(value) }
    }

    fn write8(&mut self, address: u32, value: u8) {
        unsafe { (address as usize as *mut u8).write_volatile(value) }
    }

    fn write32(&mut self, address: u32, value: u32) {
        unsafe { (address as usize as *mut u32).write_volatile(value) }
    }

    fn dma(&mut self, channel: usize, transfer: Transfer<'_>) {
        self.write16(dma_control(channel), 0);
        self.write32(dma_source(channel), transfer.source.address());
        self.write32(dma_destination(channel), transfer.destination);
        self.write16(dma_count(channel), transfer.count);
        self.write16(dma_control(channel), transfer.control.into());
    }
}
