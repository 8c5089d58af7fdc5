use afton_reg::{
    DISPLAY_CONTROL, DisplayControl, DisplayMode, IsEnabled, ObjectMappingMode, VBLANK_START,
    VERTICAL_COUNT,
};

use crate::{bus::Bus, memory_mapped::MemoryMapped};

/// Regular tiled backgrounds.
pub mod background;
/// Hardware sprites.
pub mod object;
/// Tile maps and looking tiles up in them.
pub mod tile_map;

/// Width of the Gameboy advance screen in pixels
pub const WIDTH: i32 = 240;
/// Height of the Gameboy advance screen in pixels
pub const HEIGHT: i32 = 160;

const DISPLAY: MemoryMapped<DisplayControl> = MemoryMapped::new(DISPLAY_CONTROL);

/// Switches to tiled mode 0 showing the given backgrounds and sprites, with
/// sprite tiles laid out one dimensionally. Forced blank is lifted.
pub fn set_tiled0<B: Bus + ?Sized>(bus: &mut B, backgrounds: impl IntoIterator<Item = usize>) {
    let mut control = DisplayControl::from(0u16);
    control.set_mode(DisplayMode::Tiled0);
    control.set_object_mapping(ObjectMappingMode::Map1D);
    control.set_object(IsEnabled::Enabled);

    for background in backgrounds {
        control.set_background_at(background, IsEnabled::Enabled);
    }

    DISPLAY.set(bus, control);
}

/// Blanks the screen so video memory can be written at any time.
pub fn force_blank<B: Bus + ?Sized>(bus: &mut B) {
    DISPLAY.update(bus, |control| control.set_force_blank(true));
}

fn vcount<B: Bus + ?Sized>(bus: &mut B) -> u16 {
    bus.read16(VERTICAL_COUNT)
}

/// Waits until the start of the next vertical blank by watching the scanline
/// counter. If called during a vertical blank it waits for the following one.
pub fn wait_for_vblank<B: Bus + ?Sized>(bus: &mut B) {
    while vcount(bus) >= VBLANK_START {}
    while vcount(bus) < VBLANK_START {}
}

/// Burns time in a loop. Used to slow the game down to the speed it was tuned
/// at.
pub fn busy_wait(amount: u32) {
    for _ in 0..busy_wait_iterations(amount) {
        core::hint::spin_loop();
    }
}

const fn busy_wait_iterations(amount: u32) -> u32 {
    amount.saturating_mul(10)
}
