//! The hardware sprite table.
//!
//! Sprites are kept in a fixed table mirroring object attribute memory and
//! handed out in order by [`SpriteTable::allocate`]. Nothing is freed on its
//! own; [`SpriteTable::reset`] takes the whole table back and moves every entry
//! off screen. The table is copied to the hardware in one go by
//! [`SpriteTable::commit`], which should happen during the vertical blank.

use core::ops::{Index, IndexMut};

use afton_reg::{
    ColourMode, OAM, OAM_ENTRIES, OBJECT_TILES, OBJECT_TILES_LENGTH, ObjectAttribute0,
    ObjectAttribute1, ObjectAttribute2, ObjectMode, Priority,
};
use agb_fixnum::Vector2D;
use bilge::prelude::*;

use super::{HEIGHT, WIDTH};
use crate::{Error, bus::Bus, dma::dma_copy16};

/// Copies 256 colour sprite tiles to the start of object tile memory. In 256
/// colour mode each tile takes two tile indices, so the tile at halfword
/// offset `32 * n` is tile index `2 * n`.
pub fn load_sprite_tiles<B: Bus + ?Sized>(bus: &mut B, tiles: &[u16]) -> Result<(), Error> {
    let capacity = OBJECT_TILES_LENGTH / 2;
    if tiles.len() > capacity {
        return Err(Error::AssetTooLarge {
            what: "sprite tiles",
            len: tiles.len(),
            capacity,
        });
    }

    dma_copy16(bus, tiles, OBJECT_TILES);
    Ok(())
}

/// The 12 shape and size combinations the hardware supports, width first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSize {
    S8x8,
    S16x16,
    S32x32,
    S64x64,
    S16x8,
    S32x8,
    S32x16,
    S64x32,
    S8x16,
    S8x32,
    S16x32,
    S32x64,
}

impl SpriteSize {
    const fn shape_size(self) -> (u8, u8) {
        match self {
            SpriteSize::S8x8 => (0, 0),
            SpriteSize::S16x16 => (0, 1),
            SpriteSize::S32x32 => (0, 2),
            SpriteSize::S64x64 => (0, 3),
            SpriteSize::S16x8 => (1, 0),
            SpriteSize::S32x8 => (1, 1),
            SpriteSize::S32x16 => (1, 2),
            SpriteSize::S64x32 => (1, 3),
            SpriteSize::S8x16 => (2, 0),
            SpriteSize::S8x32 => (2, 1),
            SpriteSize::S16x32 => (2, 2),
            SpriteSize::S32x64 => (2, 3),
        }
    }

    #[must_use]
    pub const fn width(self) -> i32 {
        match self {
            SpriteSize::S8x8 | SpriteSize::S8x16 | SpriteSize::S8x32 => 8,
            SpriteSize::S16x16 | SpriteSize::S16x8 | SpriteSize::S16x32 => 16,
            SpriteSize::S32x32 | SpriteSize::S32x8 | SpriteSize::S32x16 | SpriteSize::S32x64 => 32,
            SpriteSize::S64x64 | SpriteSize::S64x32 => 64,
        }
    }

    #[must_use]
    pub const fn height(self) -> i32 {
        match self {
            SpriteSize::S8x8 | SpriteSize::S16x8 | SpriteSize::S32x8 => 8,
            SpriteSize::S16x16 | SpriteSize::S8x16 | SpriteSize::S32x16 => 16,
            SpriteSize::S32x32 | SpriteSize::S64x32 | SpriteSize::S8x32 | SpriteSize::S16x32 => 32,
            SpriteSize::S64x64 | SpriteSize::S32x64 => 64,
        }
    }
}

/// One entry of object attribute memory. The fourth halfword of each entry
/// belongs to the affine matrices, which are not used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    a0: ObjectAttribute0,
    a1: ObjectAttribute1,
    a2: ObjectAttribute2,
}

impl Sprite {
    fn new(position: Vector2D<i32>, size: SpriteSize, tile_index: u16, priority: Priority) -> Self {
        let (shape, size) = size.shape_size();

        let mut a0 = ObjectAttribute0::from(0u16);
        a0.set_object_mode(ObjectMode::Normal);
        a0.set_colour_mode(ColourMode::EightBitPerPixel);
        a0.set_shape(u2::new(shape));

        let mut a1 = ObjectAttribute1::from(0u16);
        a1.set_size(u2::new(size));

        let mut a2 = ObjectAttribute2::from(0u16);
        a2.set_priority(priority);

        let mut sprite = Sprite { a0, a1, a2 };
        sprite.set_position(position).set_tile_index(tile_index);
        sprite
    }

    fn off_screen() -> Self {
        let mut sprite = Sprite {
            a0: ObjectAttribute0::from(0u16),
            a1: ObjectAttribute1::from(0u16),
            a2: ObjectAttribute2::from(0u16),
        };
        sprite.hide();
        sprite
    }

    /// Only the low 9 bits of x and 8 bits of y are kept, so positions wrap
    /// the way the hardware does.
    pub fn set_position(&mut self, position: Vector2D<i32>) -> &mut Self {
        self.a0.set_y(position.y as u8);
        self.a1.set_x(u9::new((position.x & 0x1ff) as u16));

        self
    }

    /// Moves the sprite just past the bottom right of the screen.
    pub fn hide(&mut self) -> &mut Self {
        self.set_position((WIDTH, HEIGHT).into())
    }

    pub fn move_by(&mut self, delta: Vector2D<i32>) -> &mut Self {
        let position = self.position() + delta;
        self.set_position(position)
    }

    pub fn set_hflip(&mut self, flip: bool) -> &mut Self {
        self.a1.set_horizontal_flip(flip);

        self
    }

    pub fn set_vflip(&mut self, flip: bool) -> &mut Self {
        self.a1.set_vertical_flip(flip);

        self
    }

    /// Selects the first tile of the sprite's image in object tile memory.
    pub fn set_tile_index(&mut self, tile_index: u16) -> &mut Self {
        self.a2.set_tile_index(u10::new(tile_index & 0x3ff));

        self
    }

    pub fn set_palette_bank(&mut self, bank: u8) -> &mut Self {
        self.a2.set_palette_bank(u4::new(bank & 0xf));

        self
    }

    pub fn set_priority(&mut self, priority: Priority) -> &mut Self {
        self.a2.set_priority(priority);

        self
    }

    /// The position as the hardware sees it, `0..512` by `0..256`.
    #[must_use]
    pub fn position(&self) -> Vector2D<i32> {
        (i32::from(self.a1.x().value()), i32::from(self.a0.y())).into()
    }

    #[must_use]
    pub fn hflip(&self) -> bool {
        self.a1.horizontal_flip()
    }

    #[must_use]
    pub fn vflip(&self) -> bool {
        self.a1.vertical_flip()
    }

    #[must_use]
    pub fn tile_index(&self) -> u16 {
        self.a2.tile_index().value()
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.a2.priority()
    }

    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        let position = self.position();
        position.x == WIDTH && position.y == HEIGHT
    }

    fn halfwords(&self) -> [u16; 4] {
        [self.a0.into(), self.a1.into(), self.a2.into(), 0]
    }
}

/// Names one entry of a [`SpriteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(u8);

impl SpriteId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct SpriteTable {
    sprites: [Sprite; OAM_ENTRIES],
    next: usize,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteTable {
    #[must_use]
    pub fn new() -> Self {
        SpriteTable {
            sprites: [Sprite::off_screen(); OAM_ENTRIES],
            next: 0,
        }
    }

    /// Hands out the next unused entry, set up in 256 colour mode with no
    /// flipping.
    pub fn allocate(
        &mut self,
        position: Vector2D<i32>,
        size: SpriteSize,
        tile_index: u16,
        priority: Priority,
    ) -> Result<SpriteId, Error> {
        if self.next == OAM_ENTRIES {
            return Err(Error::SpritesExhausted(OAM_ENTRIES));
        }

        let id = SpriteId(self.next as u8);
        self.sprites[self.next] = Sprite::new(position, size, tile_index, priority);
        self.next += 1;

        Ok(id)
    }

    /// Forgets every allocation and moves all entries off screen. Ids handed
    /// out before the reset must not be used afterwards.
    pub fn reset(&mut self) {
        self.next = 0;
        for sprite in &mut self.sprites {
            sprite.hide();
        }
    }

    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    /// Copies the entire table into object attribute memory.
    pub fn commit<B: Bus + ?Sized>(&self, bus: &mut B) {
        let mut buffer = [0u16; OAM_ENTRIES * 4];
        for (chunk, sprite) in buffer.chunks_exact_mut(4).zip(&self.sprites) {
            chunk.copy_from_slice(&sprite.halfwords());
        }

        dma_copy16(bus, &buffer, OAM);
    }
}

impl Index<SpriteId> for SpriteTable {
    type Output = Sprite;

    fn index(&self, id: SpriteId) -> &Sprite {
        &self.sprites[id.index()]
    }
}

impl IndexMut<SpriteId> for SpriteTable {
    fn index_mut(&mut self, id: SpriteId) -> &mut Sprite {
        &mut self.sprites[id.index()]
    }
}
