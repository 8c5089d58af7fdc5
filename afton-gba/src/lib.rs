#![no_std]
#![deny(clippy::all)]

//! Runs an afton scene on the console.
//!
//! `agb` supplies the start up code, the linker script and the panic handler.
//! Everything after that goes through afton's own [`Mmio`] bus.

use afton::{bus::Mmio, game, level::LevelConfig, mgba};

/// Sets up `level` and plays it until it halts.
///
/// Log output goes to mGBA when running inside it. A scene that cannot be
/// set up is logged and the console halts.
///
/// # Safety
/// Must be called once, on the console, from the `#[agb::entry]` function
/// and before anything else logs.
pub unsafe fn play(level: &'static LevelConfig) -> ! {
    // Safety: the caller promised we are on the console and first to log.
    // Outside mGBA nothing is installed and the log level stays off.
    unsafe { mgba::init_logger(log::LevelFilter::Info) };

    // Safety: as above
    let mut bus = unsafe { Mmio::new() };

    match game::Game::new(&mut bus, level) {
        Ok(game) => game.run(&mut bus),
        Err(e) => {
            log::error!("Could not set up {}: {e}", level.name);
            game::halt()
        }
    }
}
