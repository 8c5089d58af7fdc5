//! Compile time description of a scene.
//!
//! A [`LevelConfig`] names every asset a scene needs and every number that
//! tunes it. The scenes that ship with the game are in
//! [`resources`](crate::resources).

use agb_fixnum::Vector2D;

use crate::{
    Error,
    actor::ActorConfig,
    display::{background::LayerConfig, tile_map::Walkable},
    sound::{Channel, Playback, Sample},
};

/// One background of a scene.
#[derive(Debug, Clone, Copy)]
pub struct Layer {
    /// Which of the four hardware backgrounds shows this layer.
    pub background: usize,
    pub config: LayerConfig,
    /// The layer scrolls at `1 / 2^scroll_shift` of the camera speed.
    pub scroll_shift: u32,
}

impl Layer {
    /// This layer's scroll when the camera is at `camera`.
    #[must_use]
    pub fn scroll(&self, camera: i32) -> Vector2D<i32> {
        (camera >> self.scroll_shift, 0).into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SoundConfig {
    pub sample: &'static Sample,
    pub channel: Channel,
    pub playback: Playback,
}

/// What happens once the player reaches the guest.
#[derive(Debug, Clone, Copy)]
pub struct CutsceneConfig {
    pub player_position: Vector2D<i32>,
    pub guest_position: Vector2D<i32>,
    pub sting: SoundConfig,
    /// How long the guest animates before the outcome is decided.
    pub pause_frames: u32,
    /// The game halts if the guest's animation frame has reached this when
    /// the pause ends, and the level starts over otherwise.
    pub halt_frame_threshold: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct GuestConfig {
    pub actor: ActorConfig,
    pub cutscene: CutsceneConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub name: &'static str,

    pub background_palette: &'static [u16],
    pub layers: &'static [Layer],
    /// Index into `layers` of the layer actors stand on.
    pub collision_layer: usize,
    pub walkable: Walkable<'static>,

    pub object_palette: &'static [u16],
    pub sprite_tiles: &'static [u16],
    pub player: ActorConfig,
    pub guest: Option<GuestConfig>,

    pub music: Option<SoundConfig>,
    /// Passed to [`busy_wait`](crate::display::busy_wait) at the end of
    /// every frame.
    pub frame_delay: u32,
}

impl LevelConfig {
    pub fn collision(&self) -> Result<&Layer, Error> {
        self.layers
            .get(self.collision_layer)
            .ok_or(Error::NoSuchLayer(self.collision_layer))
    }
}
