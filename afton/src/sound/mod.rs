//! DirectSound playback of 8-bit PCM samples.
//!
//! Channel A is paced by timer 0 and fed by DMA 1, channel B by timer 1 and
//! DMA 2. The hardware has no notion of a sample ending, so each channel keeps
//! a countdown of frames until its sample runs out. [`Sound::on_vblank`] must
//! be called once per frame; it restarts looping samples and silences one-shot
//! ones when their countdown reaches zero.

use afton_reg::{
    DirectSoundControl, DirectSoundVolume, Divider, DmgVolume, FIFO_A, FIFO_B, IsEnabled,
    SOUND_CONTROL_DIRECT, SOUND_CONTROL_MASTER, SoundMasterControl, TimerSelect,
};

use crate::{bus::Bus, dma, memory_mapped::MemoryMapped, timer::Timer};

/// System clock in Hz.
pub const CLOCK: u32 = 16_777_216;
/// Clock cycles in one frame, 228 scanlines of 1232 cycles.
pub const CYCLES_PER_FRAME: u32 = 280_896;

const DIRECT_SOUND_CONTROL: MemoryMapped<DirectSoundControl> =
    MemoryMapped::new(SOUND_CONTROL_DIRECT);
const MASTER_CONTROL: MemoryMapped<SoundMasterControl> = MemoryMapped::new(SOUND_CONTROL_MASTER);

/// Signed 8-bit PCM data and the rate it should play at.
///
/// The data must be word aligned because it is streamed to the FIFO a word at
/// a time; [`AlignedSamples`] takes care of that for statics.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    data: &'static [i8],
    rate: u32,
}

impl Sample {
    /// # Panics
    /// If `rate` is too low for the timer to count out a single sample, or
    /// faster than the system clock.
    #[must_use]
    pub const fn new(data: &'static [i8], rate: u32) -> Self {
        assert!(
            rate > CLOCK >> 16 && rate <= CLOCK,
            "sample rate out of range"
        );

        Sample { data, rate }
    }

    #[must_use]
    pub const fn data(&self) -> &'static [i8] {
        self.data
    }

    #[must_use]
    pub const fn rate(&self) -> u32 {
        self.rate
    }

    /// Timer ticks between consecutive samples.
    #[must_use]
    pub const fn ticks_per_sample(&self) -> u16 {
        (CLOCK / self.rate) as u16
    }

    /// How many whole frames the sample lasts.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        ((self.data.len() as u64 * self.ticks_per_sample() as u64) / CYCLES_PER_FRAME as u64)
            as u32
    }
}

#[repr(C, align(4))]
pub struct AlignedSamples<const N: usize>(pub [i8; N]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    const fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }

    const fn dma_channel(self) -> usize {
        match self {
            Channel::A => 1,
            Channel::B => 2,
        }
    }

    const fn fifo(self) -> u32 {
        match self {
            Channel::A => FIFO_A,
            Channel::B => FIFO_B,
        }
    }

    fn reset_fifo<B: Bus + ?Sized>(self, bus: &mut B) {
        let index = self.index();
        DIRECT_SOUND_CONTROL.update(bus, |control| {
            let mut channel = control.channel_at(index);
            channel.set_fifo_reset(true);
            control.set_channel_at(index, channel);
        });
    }

    fn start_timer<B: Bus + ?Sized>(self, bus: &mut B, sample: &Sample) {
        match self {
            Channel::A => start_timer(bus, Timer::<0>::new(), sample),
            Channel::B => start_timer(bus, Timer::<1>::new(), sample),
        }
    }

    fn stop_timer<B: Bus + ?Sized>(self, bus: &mut B) {
        match self {
            Channel::A => Timer::<0>::new().set_enabled(bus, false),
            Channel::B => Timer::<1>::new().set_enabled(bus, false),
        }
    }
}

fn start_timer<B: Bus + ?Sized, const N: usize>(bus: &mut B, mut timer: Timer<N>, sample: &Sample) {
    timer.set_enabled(bus, false);
    timer.set_overflow_amount(bus, sample.ticks_per_sample());
    timer.set_divider(bus, Divider::Divider1);
    timer.set_enabled(bus, true);
}

/// What happens when a sample runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Loop,
    Once,
}

#[derive(Debug, Clone, Copy)]
struct Playing {
    sample: &'static Sample,
    playback: Playback,
    frames_remaining: u32,
}

#[derive(Debug)]
pub struct Sound {
    channels: [Option<Playing>; 2],
}

impl Sound {
    /// Routes both DirectSound channels to both speakers at full volume and
    /// turns the sound hardware on.
    pub fn new<B: Bus + ?Sized>(bus: &mut B) -> Self {
        let mut control = DirectSoundControl::from(0u16);
        control.set_dmg_volume(DmgVolume::Full);

        for (index, timer) in [TimerSelect::Timer0, TimerSelect::Timer1]
            .into_iter()
            .enumerate()
        {
            control.set_volume_at(index, DirectSoundVolume::Full);

            let mut channel = control.channel_at(index);
            channel.set_left(IsEnabled::Enabled);
            channel.set_right(IsEnabled::Enabled);
            channel.set_timer(timer);
            channel.set_fifo_reset(true);
            control.set_channel_at(index, channel);
        }

        DIRECT_SOUND_CONTROL.set(bus, control);
        MASTER_CONTROL.update(bus, |master| master.set_master(IsEnabled::Enabled));

        Sound {
            channels: [None, None],
        }
    }

    pub fn play<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        channel: Channel,
        sample: &'static Sample,
        playback: Playback,
    ) {
        log::debug!(
            "Playing {} samples at {}Hz on channel {:?} ({:?})",
            sample.data().len(),
            sample.rate(),
            channel,
            playback
        );

        self.start(bus, channel, sample);
        self.channels[channel.index()] = Some(Playing {
            sample,
            playback,
            frames_remaining: sample.frames(),
        });
    }

    fn start<B: Bus + ?Sized>(&mut self, bus: &mut B, channel: Channel, sample: &'static Sample) {
        dma::stop(bus, channel.dma_channel());
        channel.reset_fifo(bus);
        dma::start_sound(bus, channel.dma_channel(), sample.data(), channel.fifo());
        channel.start_timer(bus, sample);
    }

    pub fn stop<B: Bus + ?Sized>(&mut self, bus: &mut B, channel: Channel) {
        dma::stop(bus, channel.dma_channel());
        channel.stop_timer(bus);
        self.channels[channel.index()] = None;
    }

    #[must_use]
    pub fn is_playing(&self, channel: Channel) -> bool {
        self.channels[channel.index()].is_some()
    }

    /// Vertical blanks left before the sample on `channel` runs out. The
    /// channel is restarted or stopped on the vertical blank that brings this
    /// to zero, so playback never outlasts the sample.
    #[must_use]
    pub fn frames_remaining(&self, channel: Channel) -> Option<u32> {
        self.channels[channel.index()].map(|playing| playing.frames_remaining)
    }

    pub fn on_vblank<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        for channel in [Channel::A, Channel::B] {
            let Some(playing) = &mut self.channels[channel.index()] else {
                continue;
            };

            playing.frames_remaining = playing.frames_remaining.saturating_sub(1);
            if playing.frames_remaining > 0 {
                continue;
            }

            match playing.playback {
                Playback::Loop => {
                    log::trace!("Looping channel {channel:?}");
                    let sample = playing.sample;
                    playing.frames_remaining = sample.frames();
                    self.start(bus, channel, sample);
                }
                Playback::Once => {
                    log::trace!("Channel {channel:?} finished");
                    self.stop(bus, channel);
                }
            }
        }
    }
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use afton_reg::{timer_control, timer_data};

    use super::*;
    use crate::simulator::SimulatedBus;

    static DATA: AlignedSamples<8192> = AlignedSamples([0; 8192]);
    static SAMPLE: Sample = Sample::new(&DATA.0, 8192);

    #[test]
    fn sample_timing() {
        assert_eq!(SAMPLE.ticks_per_sample(), 2048);
        // one second of audio
        assert_eq!(SAMPLE.frames(), 59);
    }

    #[test]
    fn new_enables_the_hardware() {
        let mut bus = SimulatedBus::new();
        let _sound = Sound::new(&mut bus);

        let direct = bus.read16(SOUND_CONTROL_DIRECT);
        assert_eq!(direct & 0b1111, 0b1110);
        // both channels on both speakers, A from timer 0 and B from timer 1
        assert_eq!(direct >> 8, 0b1111_1011);
        assert_ne!(bus.read16(SOUND_CONTROL_MASTER) & (1 << 7), 0);
    }

    #[test]
    fn play_starts_timer_and_dma() {
        let mut bus = SimulatedBus::new();
        let mut sound = Sound::new(&mut bus);

        sound.play(&mut bus, Channel::A, &SAMPLE, Playback::Loop);

        assert!(sound.is_playing(Channel::A));
        assert_eq!(bus.read16(timer_data(0)), 0u16.wrapping_sub(2048));
        assert_ne!(bus.read16(timer_control(0)) & (1 << 7), 0);

        let stream = bus.sound_stream(1).unwrap();
        assert_eq!(stream.destination, FIFO_A);
        assert_eq!(stream.samples.len(), 8192);
    }

    #[test]
    fn looping_channel_restarts_when_it_runs_out() {
        let mut bus = SimulatedBus::new();
        let mut sound = Sound::new(&mut bus);

        sound.play(&mut bus, Channel::A, &SAMPLE, Playback::Loop);
        let starts = bus.sound_stream(1).unwrap().starts;

        for _ in 1..SAMPLE.frames() {
            sound.on_vblank(&mut bus);
        }
        assert_eq!(sound.frames_remaining(Channel::A), Some(1));
        assert_eq!(bus.sound_stream(1).unwrap().starts, starts);

        sound.on_vblank(&mut bus);

        assert_eq!(bus.sound_stream(1).unwrap().starts, starts + 1);
        assert_eq!(sound.frames_remaining(Channel::A), Some(SAMPLE.frames()));
    }

    #[test]
    fn playback_never_outlasts_the_sample() {
        let mut bus = SimulatedBus::new();
        let mut sound = Sound::new(&mut bus);

        sound.play(&mut bus, Channel::A, &SAMPLE, Playback::Loop);
        let starts = bus.sound_stream(1).unwrap().starts;

        let mut vblanks = 0u64;
        while bus.sound_stream(1).unwrap().starts == starts {
            sound.on_vblank(&mut bus);
            vblanks += 1;
        }

        let duration = SAMPLE.data().len() as u64 * u64::from(SAMPLE.ticks_per_sample());
        assert!(vblanks * u64::from(CYCLES_PER_FRAME) <= duration);
    }

    #[test]
    fn one_shot_channel_stops_when_it_runs_out() {
        let mut bus = SimulatedBus::new();
        let mut sound = Sound::new(&mut bus);

        sound.play(&mut bus, Channel::B, &SAMPLE, Playback::Once);

        for _ in 1..SAMPLE.frames() {
            sound.on_vblank(&mut bus);
        }
        assert!(sound.is_playing(Channel::B));

        sound.on_vblank(&mut bus);

        assert!(!sound.is_playing(Channel::B));
        assert!(bus.sound_stream(2).is_none());
        assert_eq!(bus.read16(timer_control(1)) & (1 << 7), 0);
    }

    #[test]
    fn channels_are_independent() {
        let mut bus = SimulatedBus::new();
        let mut sound = Sound::new(&mut bus);

        sound.play(&mut bus, Channel::A, &SAMPLE, Playback::Loop);
        sound.play(&mut bus, Channel::B, &SAMPLE, Playback::Once);
        sound.stop(&mut bus, Channel::B);

        assert!(sound.is_playing(Channel::A));
        assert!(bus.sound_stream(1).is_some());
        assert!(bus.sound_stream(2).is_none());
    }
}
