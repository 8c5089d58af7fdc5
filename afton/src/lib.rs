#![no_std]
#![deny(clippy::all)]

//! # afton
//! `afton` is a small platformer demo for the Game Boy Advance. A player walks
//! and jumps across a scrolling tile background; in the longer scene a guest
//! waits at the end of the level and a scripted cut-scene plays when the
//! player reaches it.
//!
//! Every access to the hardware goes through the [`Bus`](bus::Bus) trait. On
//! the console that is [`Mmio`](bus::Mmio), which performs volatile reads and
//! writes. With the `simulator` feature (on by default) there is also
//! [`SimulatedBus`](simulator::SimulatedBus), which models enough of the
//! machine to run and test the whole game on a host.
//!
//! ```
//! use afton::{game::{Game, Phase}, resources, simulator::SimulatedBus};
//!
//! let mut bus = SimulatedBus::new();
//! let mut game = Game::new(&mut bus, &resources::COLLIDE).unwrap();
//!
//! for _ in 0..10 {
//!     assert_eq!(game.step(&mut bus), Phase::Playing);
//! }
//! ```

#[cfg(feature = "simulator")]
extern crate std;

pub mod actor;
pub mod bus;
pub mod display;
pub mod dma;
mod error;
pub mod game;
pub mod input;
pub mod level;
mod memory_mapped;
pub mod mgba;
pub mod resources;
#[cfg(feature = "simulator")]
pub mod simulator;
pub mod sound;
pub mod timer;

pub use afton_reg as reg;
pub use agb_fixnum as fixnum;
pub use error::Error;
