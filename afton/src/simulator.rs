//! A [`Bus`] backed by ordinary memory, for running on a host.
//!
//! It models just enough of the console for the game to run: IO registers,
//! palette RAM, video RAM and object attribute memory as plain storage, a
//! scanline counter that advances every time it is read, immediate DMA copies,
//! sound DMA recorded as streams, and the mGBA debug port.

use std::{string::String, vec::Vec};

use afton_reg::{
    AddressControl, BACKGROUND_PALETTE, DISPLAY_CONTROL, DmaControl, KEY_INPUT,
    MGBA_DEBUG_ENABLE, MGBA_DEBUG_LEVEL, MGBA_OUTPUT_STRING, MGBA_OUTPUT_STRING_LENGTH, OAM,
    SCANLINES, StartTiming, TransferSize, VBLANK_START, VERTICAL_COUNT, VRAM, VRAM_LENGTH,
    background_offset_horizontal, dma_control,
};

use crate::{
    bus::{Bus, Source, Transfer},
    input::Button,
};

const IO: u32 = 0x0400_0000;
const IO_LENGTH: usize = 0x400;
const PALETTE_LENGTH: usize = 0x400;
const OAM_LENGTH: usize = 0x400;

const SCROLL_REGISTERS: core::ops::Range<u32> =
    background_offset_horizontal(0)..background_offset_horizontal(0) + 16;

const FORCE_BLANK: u16 = 1 << 7;
const ALL_KEYS_RELEASED: u16 = 0x3ff;

/// A repeating DMA transfer into a sound FIFO that is currently running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundStream {
    pub destination: u32,
    pub samples: Vec<i8>,
    /// How many times this DMA channel has been started for sound since the
    /// bus was created.
    pub starts: u32,
}

#[derive(Clone, Debug)]
pub struct SimulatedBus {
    io: Vec<u16>,
    palette: Vec<u16>,
    vram: Vec<u16>,
    oam: Vec<u16>,

    scanline: u16,
    next_scanline: u16,
    frames: u32,
    video_writes_outside_vblank: usize,

    sound_streams: [Option<SoundStream>; 2],
    sound_starts: [u32; 2],

    mgba_attached: bool,
    mgba_enabled: bool,
    mgba_buffer: [u8; MGBA_OUTPUT_STRING_LENGTH],
    debug_messages: Vec<(u16, String)>,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

fn region(address: u32, base: u32, length: usize) -> Option<usize> {
    let offset = address.checked_sub(base)? as usize;
    (offset < length).then_some(offset / 2)
}

fn sound_channel(channel: usize) -> Option<usize> {
    match channel {
        1 | 2 => Some(channel - 1),
        _ => None,
    }
}

impl SimulatedBus {
    /// A freshly powered on machine, with mGBA listening and no buttons held.
    #[must_use]
    pub fn new() -> Self {
        let mut bus = SimulatedBus {
            io: std::vec![0; IO_LENGTH / 2],
            palette: std::vec![0; PALETTE_LENGTH / 2],
            vram: std::vec![0; VRAM_LENGTH / 2],
            oam: std::vec![0; OAM_LENGTH / 2],

            scanline: 0,
            next_scanline: 0,
            frames: 0,
            video_writes_outside_vblank: 0,

            sound_streams: [None, None],
            sound_starts: [0; 2],

            mgba_attached: true,
            mgba_enabled: false,
            mgba_buffer: [0; MGBA_OUTPUT_STRING_LENGTH],
            debug_messages: Vec::new(),
        };

        bus.store(KEY_INPUT, ALL_KEYS_RELEASED);
        bus
    }

    /// Holds down exactly `buttons` until the next call.
    pub fn set_keys(&mut self, buttons: Button) {
        self.store(KEY_INPUT, !buttons.bits() & ALL_KEYS_RELEASED);
    }

    /// Whether the debug port answers the handshake.
    pub fn set_mgba_attached(&mut self, attached: bool) {
        self.mgba_attached = attached;
        self.mgba_enabled &= attached;
    }

    /// The scanline the display last reported.
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// How many vertical blanks have been observed.
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Writes to object attribute memory or the background scroll registers
    /// made while the display was drawing. On hardware those tear.
    #[must_use]
    pub fn video_writes_outside_vblank(&self) -> usize {
        self.video_writes_outside_vblank
    }

    #[must_use]
    pub fn palette(&self) -> &[u16] {
        &self.palette
    }

    #[must_use]
    pub fn vram(&self) -> &[u16] {
        &self.vram
    }

    #[must_use]
    pub fn oam(&self) -> &[u16] {
        &self.oam
    }

    /// The sound DMA running on `channel`, if any.
    #[must_use]
    pub fn sound_stream(&self, channel: usize) -> Option<&SoundStream> {
        self.sound_streams[sound_channel(channel)?].as_ref()
    }

    /// Every message sent to the mGBA debug port, with its level.
    #[must_use]
    pub fn debug_messages(&self) -> &[(u16, String)] {
        &self.debug_messages
    }

    /// Reads memory without the side effects of [`Bus::read16`].
    #[must_use]
    pub fn peek16(&self, address: u32) -> u16 {
        if let Some(index) = region(address, IO, IO_LENGTH) {
            self.io[index]
        } else if let Some(index) = region(address, BACKGROUND_PALETTE, PALETTE_LENGTH) {
            self.palette[index]
        } else if let Some(index) = region(address, VRAM, VRAM_LENGTH) {
            self.vram[index]
        } else if let Some(index) = region(address, OAM, OAM_LENGTH) {
            self.oam[index]
        } else {
            0
        }
    }

    fn halfword_mut(&mut self, address: u32) -> Option<&mut u16> {
        if let Some(index) = region(address, IO, IO_LENGTH) {
            Some(&mut self.io[index])
        } else if let Some(index) = region(address, BACKGROUND_PALETTE, PALETTE_LENGTH) {
            Some(&mut self.palette[index])
        } else if let Some(index) = region(address, VRAM, VRAM_LENGTH) {
            Some(&mut self.vram[index])
        } else if let Some(index) = region(address, OAM, OAM_LENGTH) {
            Some(&mut self.oam[index])
        } else {
            None
        }
    }

    fn in_vblank(&self) -> bool {
        self.scanline >= VBLANK_START || self.peek16(DISPLAY_CONTROL) & FORCE_BLANK != 0
    }

    fn store(&mut self, address: u32, value: u16) {
        let is_video = region(address, OAM, OAM_LENGTH).is_some()
            || SCROLL_REGISTERS.contains(&address);
        if is_video && !self.in_vblank() {
            self.video_writes_outside_vblank += 1;
        }

        if let Some(halfword) = self.halfword_mut(address & !1) {
            *halfword = value;
        }
    }

    fn advance_scanline(&mut self) -> u16 {
        self.scanline = self.next_scanline;
        self.next_scanline = (self.next_scanline + 1) % SCANLINES;

        if self.scanline == VBLANK_START {
            self.frames += 1;
        }

        self.scanline
    }

    fn flush_debug_message(&mut self, level: u16) {
        let length = self
            .mgba_buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MGBA_OUTPUT_STRING_LENGTH);
        let message = String::from_utf8_lossy(&self.mgba_buffer[..length]).into_owned();

        self.debug_messages.push((level & 0b111, message));
        self.mgba_buffer = [0; MGBA_OUTPUT_STRING_LENGTH];
    }

    fn immediate_copy(&mut self, transfer: &Transfer<'_>) {
        let control = transfer.control;
        let halfwords_per_unit = match control.transfer_size() {
            TransferSize::Halfword => 1,
            TransferSize::Word => 2,
        };
        let step: i64 = match control.destination() {
            AddressControl::Increment | AddressControl::IncrementReload => 2,
            AddressControl::Decrement => -2,
            AddressControl::Fixed => 0,
        };

        let values: Vec<u16> = match transfer.source {
            Source::Halfwords(data) => data.to_vec(),
            Source::Samples(data) => data
                .chunks(2)
                .map(|pair| {
                    let low = pair[0] as u8 as u16;
                    let high = pair.get(1).map_or(0, |&b| b as u8 as u16);
                    low | (high << 8)
                })
                .collect(),
        };
        let count = transfer.count as usize * halfwords_per_unit;

        let mut destination = i64::from(transfer.destination);
        for &value in values.iter().take(count) {
            self.store(destination as u32, value);
            destination += step;
        }
    }
}

impl Bus for SimulatedBus {
    fn read16(&mut self, address: u32) -> u16 {
        match address {
            VERTICAL_COUNT => self.advance_scanline(),
            MGBA_DEBUG_ENABLE if self.mgba_enabled => 0x1DEA,
            MGBA_DEBUG_ENABLE => 0,
            _ => self.peek16(address),
        }
    }

    fn write16(&mut self, address: u32, value: u16) {
        match address {
            MGBA_DEBUG_ENABLE => self.mgba_enabled = self.mgba_attached && value == 0xC0DE,
            MGBA_DEBUG_LEVEL => {
                if self.mgba_enabled && value & 0x100 != 0 {
                    self.flush_debug_message(value);
                }
            }
            KEY_INPUT | VERTICAL_COUNT => {}
            _ => {
                for channel in [1, 2] {
                    let disabled = !DmaControl::from(value).enable();
                    if address == dma_control(channel) && disabled {
                        self.sound_streams[channel - 1] = None;
                    }
                }
                self.store(address, value);
            }
        }
    }

    fn write8(&mut self, address: u32, value: u8) {
        let offset = address.wrapping_sub(MGBA_OUTPUT_STRING) as usize;
        if offset < MGBA_OUTPUT_STRING_LENGTH {
            self.mgba_buffer[offset] = value;
            return;
        }

        let current = self.peek16(address & !1);
        let updated = if address & 1 == 0 {
            (current & 0xff00) | u16::from(value)
        } else {
            (current & 0x00ff) | (u16::from(value) << 8)
        };
        self.store(address & !1, updated);
    }

    fn dma(&mut self, channel: usize, transfer: Transfer<'_>) {
        let control = transfer.control;
        if !control.enable() {
            self.write16(dma_control(channel), control.into());
            return;
        }

        match control.timing() {
            StartTiming::Immediate => {
                self.immediate_copy(&transfer);

                let mut finished = control;
                finished.set_enable(false);
                self.store(dma_control(channel), finished.into());
            }
            StartTiming::Special => {
                if let Some(index) = sound_channel(channel) {
                    let samples = match transfer.source {
                        Source::Samples(data) => data.to_vec(),
                        Source::Halfwords(data) => data
                            .iter()
                            .flat_map(|halfword| halfword.to_le_bytes())
                            .map(|b| b as i8)
                            .collect(),
                    };

                    self.sound_starts[index] += 1;
                    self.sound_streams[index] = Some(SoundStream {
                        destination: transfer.destination,
                        samples,
                        starts: self.sound_starts[index],
                    });
                }
                self.store(dma_control(channel), control.into());
            }
            // nothing afton does is timed to the blanking periods
            StartTiming::VBlank | StartTiming::HBlank => {
                self.store(dma_control(channel), control.into());
            }
        }
    }
}
