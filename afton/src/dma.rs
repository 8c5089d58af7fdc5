//! The blocking bulk copy used to load video memory, and the repeating
//! transfers that feed the sound FIFOs.

use afton_reg::{AddressControl, DmaControl, StartTiming, TransferSize, dma_control};

use crate::bus::{Bus, Source, Transfer};

/// DMA 3 is the general purpose channel.
const COPY_CHANNEL: usize = 3;
const MAX_COPY_LENGTH: usize = 0x8000;

fn copy_control() -> DmaControl {
    let mut control = DmaControl::from(0u16);
    control.set_enable(true);
    control
}

/// Copies `source` to consecutive halfwords starting at `destination`. The
/// transfer has finished when this returns.
pub fn dma_copy16<B: Bus + ?Sized>(bus: &mut B, source: &[u16], destination: u32) {
    for (i, chunk) in source.chunks(MAX_COPY_LENGTH).enumerate() {
        bus.dma(
            COPY_CHANNEL,
            Transfer {
                source: Source::Halfwords(chunk),
                destination: destination + (i * MAX_COPY_LENGTH * 2) as u32,
                count: chunk.len() as u16,
                control: copy_control(),
            },
        );
    }
}

pub(crate) fn sound_control() -> DmaControl {
    let mut control = DmaControl::from(0u16);
    control.set_destination(AddressControl::Fixed);
    control.set_repeat(true);
    control.set_transfer_size(TransferSize::Word);
    control.set_timing(StartTiming::Special);
    control.set_enable(true);
    control
}

/// Starts streaming `samples` into the FIFO at `fifo`. The hardware keeps
/// reading past the end of the slice until [`stop`] is called, so callers
/// must stop the channel in time.
pub fn start_sound<B: Bus + ?Sized>(
    bus: &mut B,
    channel: usize,
    samples: &'static [i8],
    fifo: u32,
) {
    bus.dma(
        channel,
        Transfer {
            source: Source::Samples(samples),
            destination: fifo,
            count: 0,
            control: sound_control(),
        },
    );
}

pub fn stop<B: Bus + ?Sized>(bus: &mut B, channel: usize) {
    bus.write16(dma_control(channel), 0);
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use afton_reg::{VRAM, screen_block};

    use super::*;
    use crate::simulator::SimulatedBus;

    #[test]
    fn copies_halfwords() {
        let mut bus = SimulatedBus::new();
        let data = [1, 2, 3, 0xffff];

        dma_copy16(&mut bus, &data, screen_block(2));

        for (i, value) in data.iter().enumerate() {
            assert_eq!(bus.read16(screen_block(2) + 2 * i as u32), *value);
        }
    }

    #[test]
    fn copies_longer_than_one_transfer() {
        let mut bus = SimulatedBus::new();
        let data: std::vec::Vec<u16> = (0..0x9000).map(|i| i as u16).collect();

        dma_copy16(&mut bus, &data, VRAM);

        assert_eq!(bus.read16(VRAM + 2 * 0x7fff), 0x7fff);
        assert_eq!(bus.read16(VRAM + 2 * 0x8000), 0x8000);
        assert_eq!(bus.read16(VRAM + 2 * 0x8fff), 0x8fff);
    }

    #[test]
    fn sound_transfers_stream_until_stopped() {
        static SAMPLES: [i8; 4] = [1, -1, 2, -2];
        let mut bus = SimulatedBus::new();

        start_sound(&mut bus, 1, &SAMPLES, afton_reg::FIFO_A);
        assert_eq!(bus.sound_stream(1).map(|s| s.samples.len()), Some(4));

        stop(&mut bus, 1);
        assert!(bus.sound_stream(1).is_none());
    }
}
