//! The frame loop.
//!
//! Every frame the actors are advanced and the buttons read, then the game
//! waits for the vertical blank before touching the scroll registers and
//! object attribute memory. When the scene has a guest, reaching it starts a
//! short scripted cut-scene that ends either by starting the level over or by
//! halting for good.

use crate::{
    Error,
    actor::{Actor, Control, Step},
    bus::Bus,
    display::{
        self,
        background::{self, Background},
        object::{self, SpriteTable},
    },
    input::{Button, ButtonController},
    level::{GuestConfig, LevelConfig},
    sound::Sound,
};

const BACKGROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// The guest is animating. `remaining` frames are left before the outcome
    /// is decided.
    Cutscene { remaining: u32 },
    /// Nothing happens any more.
    Halted,
}

pub struct Game {
    level: &'static LevelConfig,
    backgrounds: [Option<Background>; BACKGROUNDS],
    sprites: SpriteTable,
    player: Actor,
    guest: Option<Actor>,
    input: ButtonController,
    sound: Sound,
    camera: i32,
    phase: Phase,
}

impl Game {
    /// Loads every asset of `level`, puts the actors at their starting
    /// points, starts the music and turns the display on.
    pub fn new<B: Bus + ?Sized>(bus: &mut B, level: &'static LevelConfig) -> Result<Self, Error> {
        log::info!("Setting up {}", level.name);

        display::force_blank(bus);

        background::load_background_palette(bus, level.background_palette)?;
        let mut backgrounds = [None; BACKGROUNDS];
        for (i, layer) in level.layers.iter().enumerate() {
            let slot = backgrounds.get_mut(i).ok_or(Error::NoSuchLayer(i))?;
            *slot = Some(Background::new(bus, layer.background, &layer.config)?);
        }
        level.collision()?;

        background::load_object_palette(bus, level.object_palette)?;
        object::load_sprite_tiles(bus, level.sprite_tiles)?;

        let mut sprites = SpriteTable::new();
        let (player, guest) = spawn(level, &mut sprites)?;

        let mut sound = Sound::new(bus);
        if let Some(music) = level.music {
            sound.play(bus, music.channel, music.sample, music.playback);
        }

        let mut game = Game {
            level,
            backgrounds,
            sprites,
            player,
            guest,
            input: ButtonController::new(),
            sound,
            camera: 0,
            phase: Phase::Playing,
        };

        game.commit_actors();
        game.sprites.commit(bus);
        game.scroll_backgrounds(bus);

        display::set_tiled0(bus, level.layers.iter().map(|layer| layer.background));

        Ok(game)
    }

    /// Runs one frame and returns the phase the game is in afterwards.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Phase {
        self.phase = match self.phase {
            Phase::Halted => return Phase::Halted,
            Phase::Playing => self.play(bus),
            Phase::Cutscene { remaining } => self.cutscene(remaining),
        };

        self.commit_actors();

        display::wait_for_vblank(bus);
        self.scroll_backgrounds(bus);
        self.sprites.commit(bus);
        self.sound.on_vblank(bus);

        display::busy_wait(self.level.frame_delay);

        self.phase
    }

    /// Runs frames until the game halts, then stops for good.
    ///
    /// ```no_run
    /// use afton::{game::Game, resources, simulator::SimulatedBus};
    ///
    /// let mut bus = SimulatedBus::new();
    /// Game::new(&mut bus, &resources::COLLIDE)?.run(&mut bus);
    /// # Ok::<(), afton::Error>(())
    /// ```
    pub fn run<B: Bus + ?Sized>(mut self, bus: &mut B) -> ! {
        loop {
            if self.step(bus) == Phase::Halted {
                halt();
            }
        }
    }

    fn update_actors(&mut self) {
        let Ok(layer) = self.level.collision() else {
            return;
        };
        let Some(Some(background)) = self.backgrounds.get(self.level.collision_layer) else {
            return;
        };

        let scroll = layer.scroll(self.camera);
        let map = background.map();

        self.player.update(map, &self.level.walkable, scroll);
        if let Some(guest) = &mut self.guest {
            guest.update(map, &self.level.walkable, scroll);
        }
    }

    fn play<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Phase {
        self.update_actors();

        self.input.update(bus);

        let scrolled = if self.input.is_pressed(Button::RIGHT) {
            (self.player.walk_right() == Step::Edge).then_some(1)
        } else if self.input.is_pressed(Button::LEFT) {
            (self.player.walk_left() == Step::Edge).then_some(-1)
        } else {
            self.player.stop();
            None
        };

        if let Some(delta) = scrolled {
            self.camera += delta;
            // the guest stays where it is in the world
            if let Some(guest) = &mut self.guest {
                guest.shift(-delta);
            }
        }

        if self.input.is_pressed(Button::A) {
            self.player.jump();
        }

        match (&mut self.guest, self.level.guest) {
            (Some(guest), Some(config)) if self.player.position().x >= guest.position().x => {
                guest.set_animatronic(true);
                self.start_cutscene(bus, &config)
            }
            _ => Phase::Playing,
        }
    }

    fn start_cutscene<B: Bus + ?Sized>(&mut self, bus: &mut B, config: &GuestConfig) -> Phase {
        let cutscene = &config.cutscene;
        log::info!("Cut-scene at camera {}", self.camera);

        self.player.set_position(cutscene.player_position);
        self.player.stop();

        if let Some(guest) = &mut self.guest {
            guest.set_position(cutscene.guest_position);
            guest.start_animating();
        }

        let sting = cutscene.sting;
        self.sound
            .play(bus, sting.channel, sting.sample, sting.playback);

        Phase::Cutscene {
            remaining: cutscene.pause_frames,
        }
    }

    fn cutscene(&mut self, remaining: u32) -> Phase {
        self.update_actors();

        if remaining > 1 {
            return Phase::Cutscene {
                remaining: remaining - 1,
            };
        }

        let (Some(guest), Some(config)) = (&self.guest, self.level.guest) else {
            return Phase::Playing;
        };

        if guest.frame() >= config.cutscene.halt_frame_threshold {
            log::info!("Guest reached frame {}, halting", guest.frame());
            Phase::Halted
        } else {
            self.restart()
        }
    }

    /// Puts everything back the way the level starts, apart from the music
    /// which keeps going.
    fn restart(&mut self) -> Phase {
        log::info!("Guest stopped at frame {}, starting over", self.guest_frame());

        self.camera = 0;
        self.sprites.reset();

        match spawn(self.level, &mut self.sprites) {
            Ok((player, guest)) => {
                self.player = player;
                self.guest = guest;
                Phase::Playing
            }
            Err(e) => {
                log::error!("Could not restart {}: {e}", self.level.name);
                Phase::Halted
            }
        }
    }

    fn guest_frame(&self) -> u16 {
        self.guest.as_ref().map_or(0, Actor::frame)
    }

    fn commit_actors(&mut self) {
        self.player.commit(&mut self.sprites);
        if let Some(guest) = &self.guest {
            guest.commit(&mut self.sprites);
        }
    }

    fn scroll_backgrounds<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        for (layer, background) in self.level.layers.iter().zip(&mut self.backgrounds) {
            if let Some(background) = background {
                background.set_scroll(bus, layer.scroll(self.camera));
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How far the world has scrolled, in pixels.
    #[must_use]
    pub fn camera(&self) -> i32 {
        self.camera
    }

    #[must_use]
    pub fn player(&self) -> &Actor {
        &self.player
    }

    #[must_use]
    pub fn guest(&self) -> Option<&Actor> {
        self.guest.as_ref()
    }

    #[must_use]
    pub fn sprites(&self) -> &SpriteTable {
        &self.sprites
    }

    #[must_use]
    pub fn sound(&self) -> &Sound {
        &self.sound
    }
}

fn spawn(level: &LevelConfig, sprites: &mut SpriteTable) -> Result<(Actor, Option<Actor>), Error> {
    let player = Actor::new(&level.player, Control::Player, sprites)?;
    let guest = level
        .guest
        .map(|guest| Actor::new(&guest.actor, Control::Scripted, sprites))
        .transpose()?;

    Ok((player, guest))
}

/// Stops forever.
pub fn halt() -> ! {
    log::info!("Halted");
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use super::*;
    use crate::{resources, simulator::SimulatedBus};

    #[test]
    fn standing_still_changes_nothing() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();

        for _ in 0..30 {
            assert_eq!(game.step(&mut bus), Phase::Playing);
        }

        assert_eq!(game.camera(), 0);
        assert_eq!(game.player().position(), (100, 113).into());
        assert!(!game.player().is_falling());
    }

    #[test]
    fn walking_into_the_border_scrolls() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();

        bus.set_keys(Button::RIGHT);
        // from 100 to the right border at 184 takes 84 frames
        for _ in 0..84 {
            game.step(&mut bus);
        }
        assert_eq!(game.player().position().x, 184);
        assert_eq!(game.camera(), 0);

        for _ in 0..10 {
            game.step(&mut bus);
        }
        assert_eq!(game.player().position().x, 184);
        assert_eq!(game.camera(), 10);

        bus.set_keys(Button::LEFT);
        game.step(&mut bus);
        assert_eq!(game.player().position().x, 183);
        assert!(game.player().is_moving());
    }

    #[test]
    fn scrolling_left_past_the_start_wraps_the_map() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();

        bus.set_keys(Button::LEFT);
        for _ in 0..200 {
            game.step(&mut bus);
        }

        assert_eq!(game.player().position().x, 40);
        assert_eq!(game.camera(), -140);
        // the ground row goes all the way round
        assert!(!game.player().is_falling());
    }

    #[test]
    fn releasing_the_pad_stops_walking() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();

        bus.set_keys(Button::RIGHT);
        for _ in 0..5 {
            game.step(&mut bus);
        }
        bus.set_keys(Button::empty());
        game.step(&mut bus);

        assert!(!game.player().is_moving());
        assert_eq!(game.player().frame(), 0);
    }

    #[test]
    fn guest_stays_put_in_the_world() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::CUTSCENE).unwrap();
        let start = game.guest().unwrap().position().x;

        bus.set_keys(Button::RIGHT);
        for _ in 0..100 {
            game.step(&mut bus);
        }

        let guest = game.guest().unwrap();
        assert_eq!(guest.position().x + game.camera(), start);
    }

    #[test]
    fn halted_game_does_nothing() {
        let mut bus = SimulatedBus::new();
        let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();
        game.phase = Phase::Halted;

        let frames = bus.frames();
        assert_eq!(game.step(&mut bus), Phase::Halted);
        assert_eq!(bus.frames(), frames);
    }
}
