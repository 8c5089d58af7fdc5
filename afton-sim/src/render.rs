//! Draws what the display would show from the simulated video memory.
//!
//! Only what afton uses is supported: tiled mode 0 with 256 colour regular
//! backgrounds, and 256 colour sprites with one dimensional tile mapping.

use afton::{
    reg::{
        BACKGROUND_PALETTE, BackgroundControl, DISPLAY_CONTROL, DisplayControl, IsEnabled, OAM,
        OAM_ENTRIES, OBJECT_PALETTE, OBJECT_TILES, ObjectAttribute0, ObjectAttribute1,
        ObjectAttribute2, ObjectMode, background_control, background_offset_horizontal,
        background_offset_vertical, char_block, screen_block,
    },
    simulator::SimulatedBus,
};
use image::{DynamicImage, GenericImage, Rgba};

pub const WIDTH: usize = 240;
pub const HEIGHT: usize = 160;

/// One 15 bit colour per pixel, row by row.
pub struct Screen {
    pixels: Vec<u16>,
}

fn palette_colour(bus: &SimulatedBus, palette: u32, index: u8) -> u16 {
    bus.peek16(palette + 2 * u32::from(index))
}

/// The 256 colour pixel `(x, y)` of the tile starting at byte address `tile`.
fn tile_pixel(bus: &SimulatedBus, tile: u32, x: usize, y: usize) -> u8 {
    let byte = tile + (y * 8 + x) as u32;
    let halfword = bus.peek16(byte & !1);

    if byte & 1 == 0 {
        halfword as u8
    } else {
        (halfword >> 8) as u8
    }
}

struct Layer {
    background: usize,
    control: BackgroundControl,
    scroll: (usize, usize),
}

impl Layer {
    fn pixel(&self, bus: &SimulatedBus, x: usize, y: usize) -> u8 {
        let size = self.control.size();
        let (width, height) = (size.width() * 8, size.height() * 8);
        let x = (x + self.scroll.0) % width;
        let y = (y + self.scroll.1) % height;

        let (mut tile_x, mut tile_y) = (x / 8, y / 8);
        let mut block = screen_block(self.control.map_block().value() as usize);
        if tile_x >= 32 {
            tile_x -= 32;
            block += 0x800;
        }
        if tile_y >= 32 {
            tile_y -= 32;
            block += 0x800 * (size.width() as u32 / 32);
        }

        let entry = bus.peek16(block + 2 * (tile_y * 32 + tile_x) as u32);
        let tile = u32::from(entry & 0x3ff);
        let (mut px, mut py) = (x % 8, y % 8);
        if entry & (1 << 10) != 0 {
            px = 7 - px;
        }
        if entry & (1 << 11) != 0 {
            py = 7 - py;
        }

        let tiles = char_block(self.control.tile_block().value() as usize);
        tile_pixel(bus, tiles + tile * 64, px, py)
    }
}

/// Width and height of each shape and size combination.
const SPRITE_SIZES: [[(usize, usize); 4]; 3] = [
    [(8, 8), (16, 16), (32, 32), (64, 64)],
    [(16, 8), (32, 8), (32, 16), (64, 32)],
    [(8, 16), (8, 32), (16, 32), (32, 64)],
];

struct Sprite {
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    hflip: bool,
    vflip: bool,
    tile: u32,
    priority: u8,
}

impl Sprite {
    fn read(bus: &SimulatedBus, index: usize) -> Option<Self> {
        let base = OAM + 8 * index as u32;
        let a0 = ObjectAttribute0::from(bus.peek16(base));
        let a1 = ObjectAttribute1::from(bus.peek16(base + 2));
        let a2 = ObjectAttribute2::from(bus.peek16(base + 4));

        let shape = a0.shape().value() as usize;
        if a0.object_mode() == ObjectMode::Disabled || shape == 3 {
            return None;
        }

        let (width, height) = SPRITE_SIZES[shape][a1.size().value() as usize];

        // positions wrap, so the far ends of the range are just off the top
        // and left of the screen
        let mut x = i32::from(a1.x().value());
        if x + width as i32 > 512 {
            x -= 512;
        }
        let mut y = i32::from(a0.y());
        if y + height as i32 > 256 {
            y -= 256;
        }

        Some(Sprite {
            x,
            y,
            width,
            height,
            hflip: a1.horizontal_flip(),
            vflip: a1.vertical_flip(),
            tile: u32::from(a2.tile_index().value()),
            priority: a2.priority() as u8,
        })
    }

    fn pixel(&self, bus: &SimulatedBus, x: usize, y: usize) -> u8 {
        let x = if self.hflip { self.width - 1 - x } else { x };
        let y = if self.vflip { self.height - 1 - y } else { y };

        let tiles_across = self.width / 8;
        let tile = self.tile + 2 * ((y / 8) * tiles_across + x / 8) as u32;

        tile_pixel(bus, OBJECT_TILES + tile * 32, x % 8, y % 8)
    }
}

impl Screen {
    #[must_use]
    pub fn capture(bus: &SimulatedBus) -> Self {
        let backdrop = palette_colour(bus, BACKGROUND_PALETTE, 0);
        let mut screen = Screen {
            pixels: vec![backdrop; WIDTH * HEIGHT],
        };

        let display = DisplayControl::from(bus.peek16(DISPLAY_CONTROL));
        if display.force_blank() {
            screen.pixels.fill(0x7fff);
            return screen;
        }

        let mut layers: Vec<Layer> = (0..4)
            .filter(|&background| display.background_at(background) == IsEnabled::Enabled)
            .map(|background| Layer {
                background,
                control: BackgroundControl::from(bus.peek16(background_control(background))),
                scroll: (
                    usize::from(bus.peek16(background_offset_horizontal(background)) & 0x1ff),
                    usize::from(bus.peek16(background_offset_vertical(background)) & 0x1ff),
                ),
            })
            .collect();
        // drawn back to front
        layers.sort_by_key(|layer| {
            (
                std::cmp::Reverse(layer.control.priority() as u8),
                std::cmp::Reverse(layer.background),
            )
        });

        let sprites: Vec<Sprite> = if display.object() == IsEnabled::Enabled {
            (0..OAM_ENTRIES)
                .rev()
                .filter_map(|index| Sprite::read(bus, index))
                .collect()
        } else {
            Vec::new()
        };

        for priority in (0..4).rev() {
            for layer in layers
                .iter()
                .filter(|layer| layer.control.priority() as u8 == priority)
            {
                screen.draw_layer(bus, layer);
            }

            for sprite in sprites.iter().filter(|sprite| sprite.priority == priority) {
                screen.draw_sprite(bus, sprite);
            }
        }

        screen
    }

    fn draw_layer(&mut self, bus: &SimulatedBus, layer: &Layer) {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let index = layer.pixel(bus, x, y);
                if index != 0 {
                    self.pixels[y * WIDTH + x] = palette_colour(bus, BACKGROUND_PALETTE, index);
                }
            }
        }
    }

    fn draw_sprite(&mut self, bus: &SimulatedBus, sprite: &Sprite) {
        for sy in 0..sprite.height {
            for sx in 0..sprite.width {
                let x = sprite.x + sx as i32;
                let y = sprite.y + sy as i32;
                if !(0..WIDTH as i32).contains(&x) || !(0..HEIGHT as i32).contains(&y) {
                    continue;
                }

                let index = sprite.pixel(bus, sx, sy);
                if index != 0 {
                    self.pixels[y as usize * WIDTH + x as usize] =
                        palette_colour(bus, OBJECT_PALETTE, index);
                }
            }
        }
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * WIDTH + x]
    }

    #[must_use]
    pub fn to_image(&self) -> DynamicImage {
        let mut image = DynamicImage::new_rgba8(WIDTH as u32, HEIGHT as u32);

        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                image.put_pixel(x as u32, y as u32, Rgba(rgba(self.pixel(x, y))));
            }
        }

        image
    }
}

/// Expands a 15 bit colour to 8 bits per channel.
fn rgba(colour: u16) -> [u8; 4] {
    let channel = |shift: u16| {
        let value = ((colour >> shift) & 0x1f) as u8;
        (value << 3) | (value >> 2)
    };

    [channel(0), channel(5), channel(10), 255]
}

#[cfg(test)]
mod test {
    use afton::{game::Game, reg::VRAM, resources};

    use super::*;

    #[test]
    fn expands_colours() {
        assert_eq!(rgba(0), [0, 0, 0, 255]);
        assert_eq!(rgba(0x7fff), [255, 255, 255, 255]);
        assert_eq!(rgba(0x001f), [255, 0, 0, 255]);
    }

    #[test]
    fn blank_screen_is_white() {
        let mut bus = SimulatedBus::new();
        afton::display::force_blank(&mut bus);

        let screen = Screen::capture(&bus);
        assert_eq!(screen.pixel(0, 0), 0x7fff);
    }

    #[test]
    fn draws_the_collide_scene() {
        let mut bus = SimulatedBus::new();
        let _game = Game::new(&mut bus, &resources::COLLIDE).unwrap();
        let screen = Screen::capture(&bus);

        // sky in the top left corner, grass on top of the ground row
        assert_eq!(screen.pixel(0, 0), bus.peek16(BACKGROUND_PALETTE));
        assert_eq!(screen.pixel(0, 18 * 8), bus.peek16(BACKGROUND_PALETTE + 2));
        // the player's hair, two pixels down from the top of the sprite
        assert_eq!(screen.pixel(100 + 5, 113 + 2), bus.peek16(OBJECT_PALETTE + 2 * 6));
    }

    #[test]
    fn reads_vram() {
        let mut bus = SimulatedBus::new();
        afton::dma::dma_copy16(&mut bus, &[0x0201], VRAM);

        assert_eq!(tile_pixel(&bus, VRAM, 0, 0), 1);
        assert_eq!(tile_pixel(&bus, VRAM, 1, 0), 2);
    }
}
