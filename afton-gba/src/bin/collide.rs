//! Walking and jumping on a scrolling level, nothing else.
#![no_std]
#![no_main]

#[agb::entry]
fn main(_gba: agb::Gba) -> ! {
    // Safety: this is the entry point, running on the console
    unsafe { afton_gba::play(&afton::resources::COLLIDE) }
}
