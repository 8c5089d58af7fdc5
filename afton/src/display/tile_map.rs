use core::ops::RangeInclusive;

use afton_reg::BackgroundSize;

use crate::Error;

/// Tiles are 8x8 pixels.
const TILE_SHIFT: i32 = 3;
const BLOCK_TILES: usize = 32;
const BLOCK_ENTRIES: usize = BLOCK_TILES * BLOCK_TILES;

/// A background map as it is laid out in screen blocks.
///
/// Maps wider or taller than 32 tiles are stored as consecutive 32x32 blocks:
/// for a 64x64 map the top left block comes first, then top right, bottom
/// left and bottom right.
#[derive(Clone, Copy, Debug)]
pub struct TileMap<'a> {
    data: &'a [u16],
    size: BackgroundSize,
}

impl<'a> TileMap<'a> {
    pub fn new(data: &'a [u16], size: BackgroundSize) -> Result<Self, Error> {
        let expected = size.width() * size.height();
        if data.len() < expected {
            return Err(Error::TileMapTooShort {
                expected,
                actual: data.len(),
            });
        }

        Ok(TileMap { data, size })
    }

    #[must_use]
    pub fn data(&self) -> &'a [u16] {
        &self.data[..self.size.width() * self.size.height()]
    }

    #[must_use]
    pub fn size(&self) -> BackgroundSize {
        self.size
    }

    /// The tile under the screen pixel `(x, y)` with the map scrolled by
    /// `(xscroll, yscroll)`. The map repeats in both directions.
    #[must_use]
    pub fn tile_lookup(&self, x: i32, y: i32, xscroll: i32, yscroll: i32) -> u16 {
        let width = self.size.width() as i32;
        let height = self.size.height() as i32;

        let mut x = ((x + xscroll) >> TILE_SHIFT).rem_euclid(width) as usize;
        let mut y = ((y + yscroll) >> TILE_SHIFT).rem_euclid(height) as usize;

        let mut offset = 0;

        if width == 64 && x >= BLOCK_TILES {
            x -= BLOCK_TILES;
            offset += BLOCK_ENTRIES;
        }

        if height == 64 && y >= BLOCK_TILES {
            y -= BLOCK_TILES;
            offset += if width == 64 {
                2 * BLOCK_ENTRIES
            } else {
                BLOCK_ENTRIES
            };
        }

        self.data[offset + y * BLOCK_TILES + x]
    }
}

/// Which tile indices an actor can stand on.
#[derive(Clone, Copy, Debug)]
pub struct Walkable<'a> {
    ranges: &'a [RangeInclusive<u16>],
}

impl<'a> Walkable<'a> {
    #[must_use]
    pub const fn new(ranges: &'a [RangeInclusive<u16>]) -> Self {
        Walkable { ranges }
    }

    #[must_use]
    pub fn contains(&self, tile: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(&tile))
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec;

    use quickcheck::{Arbitrary, Gen, quickcheck};

    use super::*;

    /// Stores the logical tile `(x, y)` of a `width` x `height` map as
    /// `y * width + x`, in screen block order.
    fn numbered_map(size: BackgroundSize) -> Vec<u16> {
        let (width, height) = (size.width(), size.height());
        let mut data = std::vec![0; width * height];

        for y in 0..height {
            for x in 0..width {
                let block = (y / 32) * (width / 32) + x / 32;
                data[block * 1024 + (y % 32) * 32 + x % 32] = (y * width + x) as u16;
            }
        }

        data
    }

    fn oracle(size: BackgroundSize, x: i32, y: i32, xscroll: i32, yscroll: i32) -> u16 {
        let width = size.width() as i32;
        let height = size.height() as i32;
        let tile_x = (x + xscroll).div_euclid(8).rem_euclid(width);
        let tile_y = (y + yscroll).div_euclid(8).rem_euclid(height);

        (tile_y * width + tile_x) as u16
    }

    #[derive(Clone, Copy, Debug)]
    struct Size(BackgroundSize);

    impl Arbitrary for Size {
        fn arbitrary(g: &mut Gen) -> Self {
            Size(
                *g.choose(&[
                    BackgroundSize::S32x32,
                    BackgroundSize::S64x32,
                    BackgroundSize::S32x64,
                    BackgroundSize::S64x64,
                ])
                .unwrap(),
            )
        }
    }

    quickcheck! {
        fn lookup_matches_direct_indexing(size: Size, x: u8, y: u8, xscroll: i16, yscroll: i16) -> bool {
            let data = numbered_map(size.0);
            let map = TileMap::new(&data, size.0).unwrap();
            let (x, y, xscroll, yscroll) = (x as i32, y as i32, xscroll as i32, yscroll as i32);

            map.tile_lookup(x, y, xscroll, yscroll) == oracle(size.0, x, y, xscroll, yscroll)
        }
    }

    #[test]
    fn wraps_far_out_of_range_scroll() {
        let data = numbered_map(BackgroundSize::S32x32);
        let map = TileMap::new(&data, BackgroundSize::S32x32).unwrap();

        assert_eq!(map.tile_lookup(0, 0, 256 * 1000 + 8, 0), 1);
        assert_eq!(map.tile_lookup(0, 0, -8, 0), 31);
        assert_eq!(map.tile_lookup(0, 0, 0, -8 - 256 * 1000), 31 * 32);
    }

    #[test]
    fn selects_block_for_wide_and_tall_maps() {
        let mut data = std::vec![0; 4096];
        data[0x400] = 1;
        data[0x800] = 2;
        data[0xC00] = 3;

        let map = TileMap::new(&data, BackgroundSize::S64x64).unwrap();
        assert_eq!(map.tile_lookup(32 * 8, 0, 0, 0), 1);
        assert_eq!(map.tile_lookup(0, 32 * 8, 0, 0), 2);
        assert_eq!(map.tile_lookup(32 * 8, 32 * 8, 0, 0), 3);

        // a tall but narrow map only has a second block below
        let map = TileMap::new(&data[..2048], BackgroundSize::S32x64).unwrap();
        assert_eq!(map.tile_lookup(0, 32 * 8, 0, 0), 1);
    }

    #[test]
    fn rejects_short_data() {
        let data = [0; 1024];

        assert_eq!(
            TileMap::new(&data, BackgroundSize::S64x32).unwrap_err(),
            Error::TileMapTooShort {
                expected: 2048,
                actual: 1024
            }
        );
    }

    #[test]
    fn walkable_ranges_are_inclusive() {
        let ranges = [1..=6, 12..=17];
        let walkable = Walkable::new(&ranges);

        assert!(!walkable.contains(0));
        assert!(walkable.contains(1));
        assert!(walkable.contains(6));
        assert!(!walkable.contains(7));
        assert!(walkable.contains(12));
        assert!(walkable.contains(17));
        assert!(!walkable.contains(18));
    }
}
