use afton_reg::{
    BACKGROUND_PALETTE, BackgroundControl, BackgroundSize, CHAR_BLOCK_LENGTH, ColourMode,
    OBJECT_PALETTE, PALETTE_LENGTH, Priority, SCREEN_BLOCK_LENGTH, background_control,
    background_offset_horizontal, background_offset_vertical, char_block, screen_block,
};
use agb_fixnum::Vector2D;
use bilge::prelude::*;

use super::tile_map::TileMap;
use crate::{Error, bus::Bus, dma::dma_copy16};

const BACKGROUNDS: usize = 4;
/// Backgrounds can only take their tiles from the first 4 character blocks.
const BACKGROUND_CHAR_BLOCKS: usize = 4;
const SCREEN_BLOCKS: usize = 32;

/// Everything needed to put one regular background on screen. Tiles are 256
/// colour, 32 halfwords each.
#[derive(Clone, Copy, Debug)]
pub struct LayerConfig {
    pub tiles: &'static [u16],
    pub map: &'static [u16],
    pub size: BackgroundSize,
    pub char_block: usize,
    pub screen_block: usize,
    pub priority: Priority,
}

fn check_fits(what: &'static str, len: usize, capacity: usize) -> Result<(), Error> {
    if len > capacity {
        Err(Error::AssetTooLarge {
            what,
            len,
            capacity,
        })
    } else {
        Ok(())
    }
}

fn load_palette<B: Bus + ?Sized>(
    bus: &mut B,
    what: &'static str,
    palette: &[u16],
    destination: u32,
) -> Result<(), Error> {
    check_fits(what, palette.len(), PALETTE_LENGTH)?;
    dma_copy16(bus, palette, destination);

    Ok(())
}

/// Loads the 256 colour palette shared by every background.
pub fn load_background_palette<B: Bus + ?Sized>(bus: &mut B, palette: &[u16]) -> Result<(), Error> {
    load_palette(bus, "background palette", palette, BACKGROUND_PALETTE)
}

/// Loads the 256 colour palette shared by every sprite.
pub fn load_object_palette<B: Bus + ?Sized>(bus: &mut B, palette: &[u16]) -> Result<(), Error> {
    load_palette(bus, "object palette", palette, OBJECT_PALETTE)
}

/// A regular background that has been loaded into video memory.
#[derive(Clone, Copy, Debug)]
pub struct Background {
    index: usize,
    map: TileMap<'static>,
}

impl Background {
    /// Copies the tiles and map of `layer` into video memory and points
    /// background `index` at them. The layer is not shown until it is enabled
    /// in the display control register.
    pub fn new<B: Bus + ?Sized>(
        bus: &mut B,
        index: usize,
        layer: &LayerConfig,
    ) -> Result<Self, Error> {
        if index >= BACKGROUNDS {
            return Err(Error::NoSuchBackground(index));
        }

        let map = TileMap::new(layer.map, layer.size)?;

        check_fits(
            "tile data",
            layer.tiles.len(),
            BACKGROUND_CHAR_BLOCKS.saturating_sub(layer.char_block) * CHAR_BLOCK_LENGTH / 2,
        )?;
        check_fits(
            "tile map",
            map.data().len(),
            SCREEN_BLOCKS.saturating_sub(layer.screen_block) * SCREEN_BLOCK_LENGTH / 2,
        )?;

        dma_copy16(bus, layer.tiles, char_block(layer.char_block));
        dma_copy16(bus, map.data(), screen_block(layer.screen_block));

        let mut control = BackgroundControl::from(0u16);
        control.set_priority(layer.priority);
        control.set_tile_block(u2::new(layer.char_block as u8));
        control.set_colour_mode(ColourMode::EightBitPerPixel);
        control.set_map_block(u5::new(layer.screen_block as u8));
        control.set_size(layer.size);
        bus.write16(background_control(index), control.into());

        log::debug!(
            "Background {index}: {} tiles in char block {}, {:?} map in screen block {}",
            layer.tiles.len() / 32,
            layer.char_block,
            layer.size,
            layer.screen_block
        );

        let mut background = Background { index, map };
        background.set_scroll(bus, (0, 0).into());

        Ok(background)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn map(&self) -> &TileMap<'static> {
        &self.map
    }

    /// Writes the scroll registers. The hardware only keeps the low 9 bits
    /// and wraps the map, so any value is fine.
    pub fn set_scroll<B: Bus + ?Sized>(&mut self, bus: &mut B, scroll: Vector2D<i32>) {
        bus.write16(background_offset_horizontal(self.index), scroll.x as u16 & 0x1ff);
        bus.write16(background_offset_vertical(self.index), scroll.y as u16 & 0x1ff);
    }
}
