//! Characters that stand on the ground.
//!
//! The player and the guest share one model: a position in screen pixels,
//! a vertical velocity that gravity acts on while the actor is over a tile it
//! cannot stand on, and a walk animation. They differ only in who moves them,
//! see [`Control`].

use afton_reg::Priority;
use agb_fixnum::{Num, Vector2D};

use crate::{
    Error,
    display::{
        HEIGHT, WIDTH,
        object::{SpriteId, SpriteSize, SpriteTable},
        tile_map::{TileMap, Walkable},
    },
};

/// Fixed point with 8 fractional bits, so one unit of the raw value is 1/256
/// of a pixel.
pub type Number = Num<i32, 8>;

/// Who decides how an actor moves horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Walks with the D-pad. When it gets near the edge of the screen the
    /// world scrolls instead.
    Player,
    /// Stays put in the world, so it is shifted against every scroll of the
    /// camera, and is moved around by the cut-scene.
    Scripted,
}

/// The result of trying to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    /// The actor is at its border and did not move. The caller should scroll.
    Edge,
    /// The actor is [`Control::Scripted`] and does not walk on request.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
pub struct ActorConfig {
    pub start: Vector2D<i32>,
    /// Added to the vertical velocity every tick while falling.
    pub gravity: Number,
    pub jump_velocity: Number,
    /// How close to either side of the screen the actor may walk.
    pub border: i32,
    /// Ticks between animation frames while walking.
    pub animation_delay: u32,
    /// Sprite tile indices between consecutive animation frames.
    pub frame_stride: u16,
    /// The last frame offset before the animation starts over.
    pub max_frame: u16,
    /// Sprite tile index of the first frame.
    pub tile_base: u16,
    pub size: SpriteSize,
    /// The point probed for ground, relative to the top left of the sprite.
    pub feet: Vector2D<i32>,
    pub priority: Priority,
}

#[derive(Debug, Clone)]
pub struct Actor {
    config: ActorConfig,
    control: Control,
    sprite: SpriteId,

    position: Vector2D<i32>,
    yvel: Number,

    frame: u16,
    counter: u32,

    moving: bool,
    falling: bool,
    facing_left: bool,
    animatronic: bool,
}

impl Actor {
    /// Places a new actor at its start position, standing still, and takes a
    /// sprite for it.
    pub fn new(
        config: &ActorConfig,
        control: Control,
        sprites: &mut SpriteTable,
    ) -> Result<Self, Error> {
        let sprite = sprites.allocate(
            config.start,
            config.size,
            config.tile_base,
            config.priority,
        )?;

        Ok(Actor {
            config: *config,
            control,
            sprite,

            position: config.start,
            yvel: Number::new(0),

            frame: 0,
            counter: 0,

            moving: false,
            falling: false,
            facing_left: false,
            animatronic: false,
        })
    }

    /// Advances the actor by one tick: falls, checks what is underneath its
    /// feet and lands if it can stand there, then animates.
    pub fn update(&mut self, map: &TileMap<'_>, walkable: &Walkable<'_>, scroll: Vector2D<i32>) {
        if self.falling {
            self.position.y += self.yvel.floor();
            self.yvel += self.config.gravity;
        }

        let feet = self.position + self.config.feet;
        let tile = map.tile_lookup(feet.x, feet.y, scroll.x, scroll.y);

        if walkable.contains(tile) {
            self.falling = false;
            self.yvel = Number::new(0);
            // line up with the top of the block, which is one pixel below the
            // bottom of the image
            self.position.y &= !3;
            self.position.y += 1;
        } else {
            self.falling = true;
        }

        if self.moving {
            self.counter += 1;
            if self.counter >= self.config.animation_delay {
                self.frame += self.config.frame_stride;
                if self.frame > self.config.max_frame {
                    self.frame = 0;
                }
                self.counter = 0;
            }
        }
    }

    pub fn walk_left(&mut self) -> Step {
        if self.control == Control::Scripted {
            return Step::Ignored;
        }

        self.facing_left = true;
        self.moving = true;

        if self.position.x <= self.config.border {
            Step::Edge
        } else {
            self.position.x -= 1;
            Step::Moved
        }
    }

    pub fn walk_right(&mut self) -> Step {
        if self.control == Control::Scripted {
            return Step::Ignored;
        }

        self.facing_left = false;
        self.moving = true;

        if self.position.x >= WIDTH - 16 - self.config.border {
            Step::Edge
        } else {
            self.position.x += 1;
            Step::Moved
        }
    }

    /// Stops walking. The counter restarts one tick short of the delay, so
    /// the first step of the next walk shows a new frame straight away.
    pub fn stop(&mut self) {
        self.moving = false;
        self.frame = 0;
        self.counter = self.config.animation_delay.saturating_sub(1);
    }

    /// Does nothing while already in the air.
    pub fn jump(&mut self) {
        if !self.falling {
            self.yvel = self.config.jump_velocity;
            self.falling = true;
        }
    }

    /// Moves the actor horizontally without walking, to keep it in place
    /// relative to a scrolling world.
    pub fn shift(&mut self, dx: i32) {
        self.position.x += dx;
    }

    pub fn set_position(&mut self, position: Vector2D<i32>) {
        self.position = position;
    }

    /// Plays the walk animation on the spot.
    pub fn start_animating(&mut self) {
        self.moving = true;
    }

    pub fn set_animatronic(&mut self, animatronic: bool) {
        self.animatronic = animatronic;
    }

    /// Copies position, facing and animation frame to the actor's sprite. An
    /// actor entirely outside the screen is hidden rather than left to wrap
    /// around into view.
    pub fn commit(&self, sprites: &mut SpriteTable) {
        let sprite = &mut sprites[self.sprite];
        let (x, y) = (self.position.x, self.position.y);

        let visible = x > -self.config.size.width()
            && x < WIDTH
            && y > -self.config.size.height()
            && y < HEIGHT;

        if visible {
            sprite.set_position(self.position);
        } else {
            sprite.hide();
        }

        sprite
            .set_hflip(self.facing_left)
            .set_tile_index(self.config.tile_base + self.frame);
    }

    #[must_use]
    pub fn control(&self) -> Control {
        self.control
    }

    #[must_use]
    pub fn position(&self) -> Vector2D<i32> {
        self.position
    }

    #[must_use]
    pub fn yvel(&self) -> Number {
        self.yvel
    }

    #[must_use]
    pub fn frame(&self) -> u16 {
        self.frame
    }

    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    #[must_use]
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    #[must_use]
    pub fn is_animatronic(&self) -> bool {
        self.animatronic
    }

    #[must_use]
    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }
}

#[cfg(test)]
mod test {
    use afton_reg::BackgroundSize;

    use super::*;

    const CONFIG: ActorConfig = ActorConfig {
        start: Vector2D::new(100, 113),
        gravity: Number::from_raw(50),
        jump_velocity: Number::from_raw(-1350),
        border: 40,
        animation_delay: 8,
        frame_stride: 16,
        max_frame: 16,
        tile_base: 0,
        size: SpriteSize::S16x32,
        feet: Vector2D::new(8, 32),
        priority: Priority::P0,
    };

    const WALKABLE: Walkable<'static> = Walkable::new(&[1..=6, 12..=17]);

    /// Solid ground along tile row 18, which is where a sprite at y = 113
    /// has its feet.
    static GROUND: [u16; 1024] = {
        let mut map = [0; 1024];
        let mut x = 0;
        while x < 32 {
            map[18 * 32 + x] = 1;
            x += 1;
        }
        map
    };
    static EMPTY: [u16; 1024] = [0; 1024];

    fn ground() -> TileMap<'static> {
        TileMap::new(&GROUND, BackgroundSize::S32x32).unwrap()
    }

    fn empty() -> TileMap<'static> {
        TileMap::new(&EMPTY, BackgroundSize::S32x32).unwrap()
    }

    fn actor() -> Actor {
        Actor::new(&CONFIG, Control::Player, &mut SpriteTable::new()).unwrap()
    }

    #[test]
    fn stands_on_walkable_ground() {
        let mut actor = actor();

        actor.update(&ground(), &WALKABLE, (0, 0).into());

        assert!(!actor.is_falling());
        assert_eq!(actor.position().y, 113);
        assert_eq!(actor.position().y % 4, 1);
        assert_eq!(actor.yvel(), Number::new(0));
    }

    #[test]
    fn falls_faster_each_tick() {
        let mut actor = actor();

        actor.update(&empty(), &WALKABLE, (0, 0).into());
        assert!(actor.is_falling());

        let mut previous = actor.yvel();
        for _ in 0..20 {
            actor.update(&empty(), &WALKABLE, (0, 0).into());
            assert_eq!(actor.yvel() - previous, CONFIG.gravity);
            previous = actor.yvel();
        }
    }

    #[test]
    fn lands_aligned_to_four_pixels_plus_one() {
        let mut actor = actor();
        actor.set_position((100, 90).into());

        for _ in 0..200 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
            if !actor.is_falling() {
                break;
            }
        }

        assert!(!actor.is_falling());
        assert_eq!(actor.position().y % 4, 1);
        assert_eq!(actor.yvel(), Number::new(0));
        // the feet are on the ground row
        assert_eq!((actor.position().y + 32) / 8, 18);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let mut actor = actor();
        actor.update(&ground(), &WALKABLE, (0, 0).into());

        actor.jump();
        assert!(actor.is_falling());
        assert_eq!(actor.yvel(), CONFIG.jump_velocity);

        actor.update(&ground(), &WALKABLE, (0, 0).into());
        // -1350 / 256 rounded down
        assert_eq!(actor.position().y, 113 - 6);

        let yvel = actor.yvel();
        actor.jump();
        assert_eq!(actor.yvel(), yvel);
    }

    #[test]
    fn jump_comes_back_down() {
        let mut actor = actor();
        actor.update(&ground(), &WALKABLE, (0, 0).into());
        actor.jump();

        let mut highest = actor.position().y;
        for _ in 0..100 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
            highest = highest.min(actor.position().y);
        }

        assert!(highest < 113 - 32);
        assert!(!actor.is_falling());
        assert_eq!(actor.position().y, 113);
    }

    #[test]
    fn edges_stop_the_actor() {
        let mut actor = actor();

        actor.set_position((40, 113).into());
        assert_eq!(actor.walk_left(), Step::Edge);
        assert_eq!(actor.position().x, 40);

        actor.set_position((41, 113).into());
        assert_eq!(actor.walk_left(), Step::Moved);
        assert_eq!(actor.position().x, 40);

        actor.set_position((184, 113).into());
        assert_eq!(actor.walk_right(), Step::Edge);
        assert_eq!(actor.position().x, 184);

        actor.set_position((183, 113).into());
        assert_eq!(actor.walk_right(), Step::Moved);
        assert_eq!(actor.position().x, 184);
    }

    #[test]
    fn scripted_actors_do_not_walk() {
        let mut actor = Actor::new(&CONFIG, Control::Scripted, &mut SpriteTable::new()).unwrap();
        assert_eq!(actor.control(), Control::Scripted);

        assert_eq!(actor.walk_left(), Step::Ignored);
        assert_eq!(actor.walk_right(), Step::Ignored);
        assert_eq!(actor.position().x, 100);
        assert!(!actor.is_moving());

        // but can still be moved by whoever scripts them
        actor.shift(-3);
        assert_eq!(actor.position().x, 97);
    }

    #[test]
    fn animates_once_per_delay_while_walking() {
        let mut actor = actor();
        actor.walk_right();

        for _ in 0..7 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
        }
        assert_eq!(actor.frame(), 0);

        actor.update(&ground(), &WALKABLE, (0, 0).into());
        assert_eq!(actor.frame(), 16);

        for _ in 0..8 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
        }
        // past the last frame it starts over
        assert_eq!(actor.frame(), 0);
    }

    #[test]
    fn stop_resets_the_animation() {
        let mut actor = actor();
        actor.walk_right();
        for _ in 0..8 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
        }
        assert_eq!(actor.frame(), 16);

        actor.stop();
        assert!(!actor.is_moving());
        assert_eq!(actor.frame(), 0);
        assert_eq!(actor.counter(), 7);

        // the next walk shows a new frame on its first tick
        actor.walk_left();
        actor.update(&ground(), &WALKABLE, (0, 0).into());
        assert_eq!(actor.frame(), 16);
    }

    #[test]
    fn scroll_changes_the_ground_underfoot() {
        static HALF: [u16; 1024] = {
            let mut map = [0; 1024];
            let mut x = 0;
            while x < 16 {
                map[18 * 32 + x] = 12;
                x += 1;
            }
            map
        };
        let map = TileMap::new(&HALF, BackgroundSize::S32x32).unwrap();
        let mut actor = actor();

        actor.update(&map, &WALKABLE, (0, 0).into());
        assert!(!actor.is_falling());

        // tile column 13 with no scroll, column 29 with 128 pixels of scroll
        actor.update(&map, &WALKABLE, (128, 0).into());
        assert!(actor.is_falling());
    }

    #[test]
    fn commit_writes_the_sprite() {
        let mut sprites = SpriteTable::new();
        let mut actor = Actor::new(&CONFIG, Control::Player, &mut sprites).unwrap();

        actor.walk_left();
        for _ in 0..8 {
            actor.update(&ground(), &WALKABLE, (0, 0).into());
        }
        actor.commit(&mut sprites);

        let sprite = &sprites[actor.sprite()];
        assert_eq!(sprite.position(), (99, 113).into());
        assert!(sprite.hflip());
        assert_eq!(sprite.tile_index(), 16);
    }

    #[test]
    fn off_screen_actors_are_hidden() {
        let mut sprites = SpriteTable::new();
        let mut actor = Actor::new(&CONFIG, Control::Scripted, &mut sprites).unwrap();

        actor.set_position((520, 113).into());
        actor.commit(&mut sprites);
        assert!(sprites[actor.sprite()].is_off_screen());

        actor.shift(-400);
        actor.commit(&mut sprites);
        assert_eq!(sprites[actor.sprite()].position(), (120, 113).into());
    }
}
