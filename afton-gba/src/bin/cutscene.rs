//! Walk right until you meet the guest.
#![no_std]
#![no_main]

#[agb::entry]
fn main(_gba: agb::Gba) -> ! {
    // Safety: this is the entry point, running on the console
    unsafe { afton_gba::play(&afton::resources::CUTSCENE) }
}
