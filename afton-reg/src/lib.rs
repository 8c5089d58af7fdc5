#![no_std]
#![deny(clippy::all)]
#![deny(clippy::missing_const_for_fn)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]

//! This crate contains the addresses and bit layouts of the Game Boy Advance
//! registers and memory regions that afton drives.
//!
//! Addresses are plain `u32`s rather than pointers. Nothing in here touches
//! memory; the `afton` crate reads and writes these through its `Bus` trait so
//! that the same code can run against the real hardware or a simulator.
//!
//! Do note that registers may overlap in certain modes.

use bilge::prelude::*;

pub const DISPLAY_CONTROL: u32 = 0x0400_0000;
pub const DISPLAY_STATUS: u32 = 0x0400_0004;
pub const VERTICAL_COUNT: u32 = 0x0400_0006;

/// First scanline of the vertical blank.
pub const VBLANK_START: u16 = 160;
/// Total number of scanlines, including the vertical blank.
pub const SCANLINES: u16 = 228;

pub const fn background_control(bg: usize) -> u32 {
    assert!(bg < 4, "background must be in range 0..=3");

    0x0400_0008 + (bg * core::mem::size_of::<u16>()) as u32
}

pub const fn background_offset_horizontal(bg: usize) -> u32 {
    assert!(bg < 4, "background must be in range 0..=3");

    0x0400_0010 + (bg * 2 * core::mem::size_of::<u16>()) as u32
}

pub const fn background_offset_vertical(bg: usize) -> u32 {
    background_offset_horizontal(bg) + core::mem::size_of::<u16>() as u32
}

pub const SOUND_CONTROL_DIRECT: u32 = 0x0400_0082;
pub const SOUND_CONTROL_MASTER: u32 = 0x0400_0084;

pub const FIFO_A: u32 = 0x0400_00A0;
pub const FIFO_B: u32 = 0x0400_00A4;

pub const fn dma_source(channel: usize) -> u32 {
    assert!(channel < 4, "dma channel must be in range 0..=3");

    0x0400_00B0 + 0x0C * channel as u32
}

pub const fn dma_destination(channel: usize) -> u32 {
    dma_source(channel) + 4
}

pub const fn dma_count(channel: usize) -> u32 {
    dma_source(channel) + 8
}

pub const fn dma_control(channel: usize) -> u32 {
    dma_source(channel) + 10
}

pub const fn timer_data(timer: usize) -> u32 {
    assert!(timer < 4, "timer must be in range 0..=3");

    0x0400_0100 + 4 * timer as u32
}

pub const fn timer_control(timer: usize) -> u32 {
    timer_data(timer) + 2
}

pub const KEY_INPUT: u32 = 0x0400_0130;

pub const BACKGROUND_PALETTE: u32 = 0x0500_0000;
pub const OBJECT_PALETTE: u32 = 0x0500_0200;
/// Number of colours in each of the background and object palettes.
pub const PALETTE_LENGTH: usize = 256;

pub const VRAM: u32 = 0x0600_0000;
pub const VRAM_LENGTH: usize = 0x1_8000;

pub const CHAR_BLOCK_LENGTH: usize = 0x4000;
pub const SCREEN_BLOCK_LENGTH: usize = 0x800;

/// Background tile images live in one of 4 character blocks of 16K.
pub const fn char_block(block: usize) -> u32 {
    assert!(block < 4, "char block must be in range 0..=3");

    VRAM + (block * CHAR_BLOCK_LENGTH) as u32
}

/// Background tile maps live in one of 32 screen blocks of 2K.
pub const fn screen_block(block: usize) -> u32 {
    assert!(block < 32, "screen block must be in range 0..=31");

    VRAM + (block * SCREEN_BLOCK_LENGTH) as u32
}

pub const OBJECT_TILES: u32 = 0x0601_0000;
pub const OBJECT_TILES_LENGTH: usize = 0x8000;

pub const OAM: u32 = 0x0700_0000;
pub const OAM_ENTRIES: usize = 128;

pub const MGBA_OUTPUT_STRING: u32 = 0x04FF_F600;
pub const MGBA_OUTPUT_STRING_LENGTH: usize = 256;
pub const MGBA_DEBUG_LEVEL: u32 = 0x04FF_F700;
pub const MGBA_DEBUG_ENABLE: u32 = 0x04FF_F780;

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct DisplayControl {
    pub mode: DisplayMode,
    pub is_game_boy_colour: bool,
    pub page_select: Page,
    pub hblank_in_oam: bool,
    pub object_mapping: ObjectMappingMode,
    pub force_blank: bool,
    pub background: [IsEnabled; 4],
    pub object: IsEnabled,
    pub window: [IsEnabled; 2],
    pub window_object: IsEnabled,
}

#[bitsize(3)]
#[derive(FromBits, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Tiled0,
    Tiled1,
    Tiled2,
    Bitmap3,
    Bitmap4,
    Bitmap5,
    #[fallback]
    Prohibited,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectMappingMode {
    Map2D,
    Map1D,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Front,
    Back,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IsEnabled {
    Disabled,
    Enabled,
}

impl From<bool> for IsEnabled {
    fn from(value: bool) -> Self {
        match value {
            true => IsEnabled::Enabled,
            false => IsEnabled::Disabled,
        }
    }
}

impl From<IsEnabled> for bool {
    fn from(value: IsEnabled) -> Self {
        match value {
            IsEnabled::Disabled => false,
            IsEnabled::Enabled => true,
        }
    }
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct BackgroundControl {
    pub priority: Priority,
    pub tile_block: u2,
    reserved: u2,
    pub mosaic: IsEnabled,
    pub colour_mode: ColourMode,
    pub map_block: u5,
    pub affine_wrapping: IsEnabled,
    pub size: BackgroundSize,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColourMode {
    FourBitPerPixel,
    EightBitPerPixel,
}

/// Size of a regular background in tiles, width first.
#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BackgroundSize {
    S32x32,
    S64x32,
    S32x64,
    S64x64,
}

impl BackgroundSize {
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            BackgroundSize::S32x32 | BackgroundSize::S32x64 => 32,
            BackgroundSize::S64x32 | BackgroundSize::S64x64 => 64,
        }
    }

    #[must_use]
    pub const fn height(self) -> usize {
        match self {
            BackgroundSize::S32x32 | BackgroundSize::S64x32 => 32,
            BackgroundSize::S32x64 | BackgroundSize::S64x64 => 64,
        }
    }

    /// Number of 32x32 screen blocks the map occupies.
    #[must_use]
    pub const fn screen_blocks(self) -> usize {
        (self.width() / 32) * (self.height() / 32)
    }
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressControl {
    Increment,
    Decrement,
    Fixed,
    IncrementReload,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransferSize {
    Halfword,
    Word,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum StartTiming {
    Immediate,
    VBlank,
    HBlank,
    /// Sound FIFO refill on DMA 1 and 2, video capture on DMA 3.
    Special,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct DmaControl {
    reserved: u5,
    pub destination: AddressControl,
    pub source: AddressControl,
    pub repeat: bool,
    pub transfer_size: TransferSize,
    pub game_pak_drq: bool,
    pub timing: StartTiming,
    pub interrupt: bool,
    pub enable: bool,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Divider {
    // 16.78MHz or 59.59ns
    Divider1,
    // 262.21kHz or 3.815us
    Divider64,
    // 65.536kHz or 15.26us
    Divider256,
    // 16.384kHz or 61.04us
    Divider1024,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct TimerControl {
    pub divider: Divider,
    pub cascade: bool,
    reserved: u3,
    pub interrupt: bool,
    pub enable: bool,
    reserved: u8,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum DmgVolume {
    Quarter,
    Half,
    Full,
    Prohibited,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum DirectSoundVolume {
    Half,
    Full,
}

#[bitsize(1)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerSelect {
    Timer0,
    Timer1,
}

#[bitsize(4)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct DirectSoundChannel {
    pub right: IsEnabled,
    pub left: IsEnabled,
    pub timer: TimerSelect,
    pub fifo_reset: bool,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct DirectSoundControl {
    pub dmg_volume: DmgVolume,
    pub volume: [DirectSoundVolume; 2],
    reserved: u4,
    pub channel: [DirectSoundChannel; 2],
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct SoundMasterControl {
    pub playing: [bool; 4],
    reserved: u3,
    pub master: IsEnabled,
    reserved: u8,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectMode {
    Normal,
    Affine,
    Disabled,
    AffineDouble,
}

#[bitsize(2)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, Debug)]
pub enum GraphicsMode {
    Normal,
    AlphaBlending,
    Window,
    Prohibited,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct ObjectAttribute0 {
    pub y: u8,
    pub object_mode: ObjectMode,
    pub graphics_mode: GraphicsMode,
    pub mosaic: bool,
    pub colour_mode: ColourMode,
    pub shape: u2,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct ObjectAttribute1 {
    pub x: u9,
    reserved: u3,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub size: u2,
}

#[bitsize(16)]
#[derive(FromBits, Clone, Copy, PartialEq, Eq, DebugBits)]
pub struct ObjectAttribute2 {
    pub tile_index: u10,
    pub priority: Priority,
    pub palette_bank: u4,
}
