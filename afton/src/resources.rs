//! The two scenes and all of their assets.
//!
//! Graphics and sound are drawn by `const fn`s so the data lands in ROM the
//! same way converted image and audio files would. Backgrounds and sprites are
//! 256 colour; sound is signed 8-bit PCM at 8kHz.

use afton_reg::{BackgroundSize, PALETTE_LENGTH, Priority};
use agb_fixnum::Vector2D;

use crate::{
    actor::{ActorConfig, Number},
    display::{background::LayerConfig, object::SpriteSize, tile_map::Walkable},
    level::{CutsceneConfig, GuestConfig, Layer, LevelConfig, SoundConfig},
    sound::{AlignedSamples, Channel, Playback, Sample},
};

const fn rgb(r: u16, g: u16, b: u16) -> u16 {
    r | (g << 5) | (b << 10)
}

/// 8x8 pixels at one byte each, two pixels to a halfword.
const TILE_HALFWORDS: usize = 32;

mod colour {
    pub const SKY: u8 = 0;
    pub const GRASS: u8 = 1;
    pub const GRASS_DARK: u8 = 2;
    pub const DIRT: u8 = 3;
    pub const DIRT_DARK: u8 = 4;
    pub const STONE: u8 = 5;
    pub const CLOUD: u8 = 7;
    pub const CLOUD_SHADE: u8 = 8;
    pub const HILL: u8 = 9;
    pub const HILL_DARK: u8 = 10;
}

const fn background_palette() -> [u16; PALETTE_LENGTH] {
    let mut palette = [0; PALETTE_LENGTH];

    palette[colour::SKY as usize] = rgb(12, 20, 31);
    palette[colour::GRASS as usize] = rgb(8, 26, 6);
    palette[colour::GRASS_DARK as usize] = rgb(4, 18, 4);
    palette[colour::DIRT as usize] = rgb(20, 12, 6);
    palette[colour::DIRT_DARK as usize] = rgb(14, 8, 4);
    palette[colour::STONE as usize] = rgb(16, 16, 18);
    palette[6] = rgb(10, 10, 12);
    palette[colour::CLOUD as usize] = rgb(30, 30, 31);
    palette[colour::CLOUD_SHADE as usize] = rgb(24, 26, 30);
    palette[colour::HILL as usize] = rgb(6, 16, 10);
    palette[colour::HILL_DARK as usize] = rgb(4, 12, 8);

    palette
}

/// The colour of pixel `(x, y)` of background tile `tile`.
///
/// * 0 is empty
/// * 1 to 6 are the top of the ground
/// * 7 to 11 are clouds
/// * 12 to 17 are the ground underneath
/// * 18 to 23 are the hills behind
const fn background_pixel(tile: usize, x: usize, y: usize) -> u8 {
    match tile {
        1..=6 => {
            let variant = tile - 1;
            if y < 2 {
                colour::GRASS
            } else if y < 3 {
                if (x + variant) % 3 == 0 {
                    colour::GRASS_DARK
                } else {
                    colour::GRASS
                }
            } else if (x + y + variant) % 5 == 0 {
                colour::DIRT_DARK
            } else {
                colour::DIRT
            }
        }
        7..=11 => {
            let variant = tile - 7;
            let top = 2 + variant % 2;
            if y == 6 {
                colour::CLOUD_SHADE
            } else if within(y, top, 5) {
                colour::CLOUD
            } else {
                colour::SKY
            }
        }
        12..=17 => {
            let variant = tile - 12;
            if (x * 3 + y * 5 + variant) % 7 == 0 {
                colour::DIRT_DARK
            } else if (x + 2 * y + variant) % 11 == 0 {
                colour::STONE
            } else {
                colour::DIRT
            }
        }
        18 if y >= 7 - x => colour::HILL,
        19 if y >= 1 => colour::HILL,
        20 if y >= x => colour::HILL,
        21..=23 => {
            if (x + y + tile) % 6 == 0 {
                colour::HILL_DARK
            } else {
                colour::HILL
            }
        }
        _ => colour::SKY,
    }
}

const BACKGROUND_TILE_COUNT: usize = 24;

const fn background_tiles() -> [u16; BACKGROUND_TILE_COUNT * TILE_HALFWORDS] {
    let mut tiles = [0; BACKGROUND_TILE_COUNT * TILE_HALFWORDS];

    let mut tile = 0;
    while tile < BACKGROUND_TILE_COUNT {
        let mut y = 0;
        while y < 8 {
            let mut x = 0;
            while x < 8 {
                let left = background_pixel(tile, x, y) as u16;
                let right = background_pixel(tile, x + 1, y) as u16;
                tiles[tile * TILE_HALFWORDS + (y * 8 + x) / 2] = left | (right << 8);
                x += 2;
            }
            y += 1;
        }
        tile += 1;
    }

    tiles
}

const GROUND_ROW: usize = 18;

/// The tile at column `x` and row `y` of the 64x32 ground layer.
const fn ground_tile(x: usize, y: usize) -> u16 {
    let platform = y == 14 && (within(x, 26, 30) || within(x, 44, 47));

    if y == GROUND_ROW || platform {
        1 + (x % 6) as u16
    } else if y > GROUND_ROW {
        12 + ((x + y) % 6) as u16
    } else if y == 4 && within(x, 5, 9) {
        7 + (x - 5) as u16
    } else if y == 6 && within(x, 38, 42) {
        7 + (x - 38) as u16
    } else {
        0
    }
}

/// The tile at column `x` and row `y` of the 32x32 hill layer.
const fn hill_tile(x: usize, y: usize) -> u16 {
    let column = x % 8;

    if y == 12 {
        match column {
            1 => 18,
            2..=4 => 19,
            5 => 20,
            _ => 0,
        }
    } else if within(y, 13, GROUND_ROW + 1) && within(column, 1, 5) {
        21 + ((x + y) % 3) as u16
    } else {
        0
    }
}

/// Where logical tile `(x, y)` of a map `width` tiles wide is stored, with the
/// map laid out in 32x32 screen blocks, left block first.
const fn block_index(width: usize, x: usize, y: usize) -> usize {
    let block = (y / 32) * (width / 32) + x / 32;
    block * 1024 + (y % 32) * 32 + x % 32
}

const fn ground_map() -> [u16; 64 * 32] {
    let mut map = [0; 64 * 32];

    let mut y = 0;
    while y < 32 {
        let mut x = 0;
        while x < 64 {
            map[block_index(64, x, y)] = ground_tile(x, y);
            x += 1;
        }
        y += 1;
    }

    map
}

const fn hill_map() -> [u16; 32 * 32] {
    let mut map = [0; 32 * 32];

    let mut y = 0;
    while y < 32 {
        let mut x = 0;
        while x < 32 {
            map[block_index(32, x, y)] = hill_tile(x, y);
            x += 1;
        }
        y += 1;
    }

    map
}

static BACKGROUND_PALETTE: [u16; PALETTE_LENGTH] = background_palette();
static BACKGROUND_TILES: [u16; BACKGROUND_TILE_COUNT * TILE_HALFWORDS] = background_tiles();
static GROUND_MAP: [u16; 64 * 32] = ground_map();
static HILL_MAP: [u16; 32 * 32] = hill_map();

static WALKABLE: [core::ops::RangeInclusive<u16>; 2] = [1..=6, 12..=17];

const GROUND_LAYER: Layer = Layer {
    background: 0,
    config: LayerConfig {
        tiles: &BACKGROUND_TILES,
        map: &GROUND_MAP,
        size: BackgroundSize::S64x32,
        char_block: 0,
        screen_block: 16,
        priority: Priority::P0,
    },
    scroll_shift: 0,
};

const HILL_LAYER: Layer = Layer {
    background: 1,
    config: LayerConfig {
        tiles: &BACKGROUND_TILES,
        map: &HILL_MAP,
        size: BackgroundSize::S32x32,
        char_block: 0,
        screen_block: 18,
        priority: Priority::P1,
    },
    scroll_shift: 1,
};

const fn object_palette() -> [u16; PALETTE_LENGTH] {
    let mut palette = [0; PALETTE_LENGTH];

    palette[1] = rgb(31, 24, 18);
    palette[2] = rgb(18, 6, 20);
    palette[3] = rgb(6, 6, 16);
    palette[4] = rgb(4, 3, 2);
    palette[5] = rgb(0, 0, 0);
    palette[6] = rgb(12, 6, 2);
    palette[7] = rgb(28, 22, 4);
    palette[8] = rgb(20, 14, 2);
    palette[9] = rgb(31, 31, 31);
    palette[10] = rgb(2, 2, 2);
    palette[11] = rgb(31, 2, 2);

    palette
}

const fn within(value: usize, low: usize, high: usize) -> bool {
    value >= low && value <= high
}

/// The player, two walk frames.
const fn player_pixel(frame: usize, x: usize, y: usize) -> u8 {
    let (back, front) = if frame == 0 { (5, 9) } else { (4, 10) };
    let leg = within(x, back, back + 2) || within(x, front, front + 2);

    if within(y, 2, 3) && within(x, 5, 11) {
        6
    } else if y == 5 && x == 9 {
        5
    } else if within(y, 4, 9) && within(x, 5, 11) {
        1
    } else if within(y, 12, 17) && (x == 3 || x == 12) {
        1
    } else if within(y, 10, 19) && within(x, 4, 11) {
        2
    } else if within(y, 20, 28) && leg {
        3
    } else if within(y, 29, 30) && leg {
        4
    } else {
        0
    }
}

/// The guest, four frames of it coming to life.
const fn guest_pixel(frame: usize, x: usize, y: usize) -> u8 {
    let eye = match frame {
        3 => 11,
        1 => 5,
        _ => 9,
    };
    let step = frame % 2;

    if within(y, 0, 2) && within(x, 6, 10) {
        10
    } else if within(y, 1, 3) && (within(x, 3, 5) || within(x, 11, 13)) {
        8
    } else if y == 6 && (x == 6 || x == 10) {
        eye
    } else if within(y, 3, 11) && within(x, 3, 13) {
        7
    } else if within(y, 15, 23) && within(x, 5, 11) {
        8
    } else if within(y, 12, 26) && within(x, 2, 14) {
        7
    } else if within(y, 27, 30) && (within(x, 3 + step, 6 + step) || within(x, 10 - step, 13 - step)) {
        8
    } else {
        0
    }
}

const PLAYER_FRAMES: usize = 2;
const GUEST_FRAMES: usize = 4;
/// A 16x32 sprite is 8 tiles.
const FRAME_HALFWORDS: usize = 8 * TILE_HALFWORDS;
/// 256 colour tiles take two tile indices each.
const FRAME_TILE_INDICES: u16 = 16;

const fn sprite_pixel(frame: usize, x: usize, y: usize) -> u8 {
    if frame < PLAYER_FRAMES {
        player_pixel(frame, x, y)
    } else {
        guest_pixel(frame - PLAYER_FRAMES, x, y)
    }
}

/// Frames of 16x32 sprites in one dimensional order: each frame's 2x4 tiles
/// row by row.
const fn sprite_tiles() -> [u16; (PLAYER_FRAMES + GUEST_FRAMES) * FRAME_HALFWORDS] {
    let mut tiles = [0; (PLAYER_FRAMES + GUEST_FRAMES) * FRAME_HALFWORDS];

    let mut frame = 0;
    while frame < PLAYER_FRAMES + GUEST_FRAMES {
        let mut y = 0;
        while y < 32 {
            let mut x = 0;
            while x < 16 {
                let tile = (y / 8) * 2 + x / 8;
                let index =
                    frame * FRAME_HALFWORDS + tile * TILE_HALFWORDS + ((y % 8) * 8 + x % 8) / 2;
                let left = sprite_pixel(frame, x, y) as u16;
                let right = sprite_pixel(frame, x + 1, y) as u16;
                tiles[index] = left | (right << 8);
                x += 2;
            }
            y += 1;
        }
        frame += 1;
    }

    tiles
}

static OBJECT_PALETTE: [u16; PALETTE_LENGTH] = object_palette();
static SPRITE_TILES: [u16; (PLAYER_FRAMES + GUEST_FRAMES) * FRAME_HALFWORDS] = sprite_tiles();

const SAMPLE_RATE: u32 = 8000;

const fn music<const N: usize>() -> [i8; N] {
    // periods in samples of a short phrase, roughly C E G E C G E C
    const PERIODS: [usize; 8] = [31, 24, 20, 24, 31, 20, 24, 31];
    let note_length = N / PERIODS.len();

    let mut samples = [0; N];
    let mut i = 0;
    while i < N {
        let note = i / note_length;
        let period = PERIODS[if note < PERIODS.len() { note } else { PERIODS.len() - 1 }];
        let position = i % note_length;
        let amplitude = 40 - (position * 32 / note_length) as i32;

        samples[i] = if i % period < period / 2 {
            amplitude as i8
        } else {
            -amplitude as i8
        };
        i += 1;
    }

    samples
}

const fn sting<const N: usize>() -> [i8; N] {
    let mut samples = [0; N];
    let mut noise: u32 = 0x1234_5678;

    let mut i = 0;
    while i < N {
        noise = noise.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let amplitude = 100 - (i * 90 / N) as i32;
        let period = 8 + i / 200;
        let square = if i % period < period / 2 { amplitude } else { -amplitude };
        let hiss = ((noise >> 16) % 32) as i32 - 16;

        samples[i] = (square / 2 + hiss) as i8;
        i += 1;
    }

    samples
}

static MUSIC_DATA: AlignedSamples<16000> = AlignedSamples(music());
static MUSIC: Sample = Sample::new(&MUSIC_DATA.0, SAMPLE_RATE);
static STING_DATA: AlignedSamples<6000> = AlignedSamples(sting());
static STING: Sample = Sample::new(&STING_DATA.0, SAMPLE_RATE);

pub const PLAYER: ActorConfig = ActorConfig {
    start: Vector2D::new(100, 113),
    gravity: Number::from_raw(50),
    jump_velocity: Number::from_raw(-1350),
    border: 40,
    animation_delay: 8,
    frame_stride: FRAME_TILE_INDICES,
    max_frame: FRAME_TILE_INDICES,
    tile_base: 0,
    size: SpriteSize::S16x32,
    feet: Vector2D::new(8, 32),
    priority: Priority::P0,
};

pub const GUEST: ActorConfig = ActorConfig {
    start: Vector2D::new(420, 113),
    tile_base: PLAYER_FRAMES as u16 * FRAME_TILE_INDICES,
    max_frame: (GUEST_FRAMES as u16 - 1) * FRAME_TILE_INDICES,
    ..PLAYER
};

/// One layer, the player and nothing else.
pub static COLLIDE: LevelConfig = LevelConfig {
    name: "collide",

    background_palette: &BACKGROUND_PALETTE,
    layers: &[GROUND_LAYER],
    collision_layer: 0,
    walkable: Walkable::new(&WALKABLE),

    object_palette: &OBJECT_PALETTE,
    sprite_tiles: &SPRITE_TILES,
    player: PLAYER,
    guest: None,

    music: None,
    frame_delay: 300,
};

/// Hills behind the ground, music, and a guest waiting to the right.
pub static CUTSCENE: LevelConfig = LevelConfig {
    name: "cutscene",

    layers: &[GROUND_LAYER, HILL_LAYER],
    guest: Some(GuestConfig {
        actor: GUEST,
        cutscene: CutsceneConfig {
            player_position: Vector2D::new(60, 113),
            guest_position: Vector2D::new(150, 113),
            sting: SoundConfig {
                sample: &STING,
                channel: Channel::B,
                playback: Playback::Once,
            },
            pause_frames: 120,
            halt_frame_threshold: (GUEST_FRAMES as u16 - 1) * FRAME_TILE_INDICES,
        },
    }),
    music: Some(SoundConfig {
        sample: &MUSIC,
        channel: Channel::A,
        playback: Playback::Loop,
    }),

    ..COLLIDE
};
