//! The tone call every decoded note ends in, and the packing of its four
//! parameter words.
//!
//! ```text
//! frequency  [16:slide target][16:start]       target 0 = no slide
//! duration   [8:attack][8:decay][8:release][8:sustain]
//! volume     [8:peak][8:sustain level]
//! flags      [2:pan][2:pulse mode][2:channel]
//! ```

use crate::message::Pan;
use crate::song::{Channel, PulseMode};

const SLIDE_TARGET_SHIFT: u32 = 16;

const RELEASE_SHIFT: u32 = 8;
const DECAY_SHIFT: u32 = 16;
const ATTACK_SHIFT: u32 = 24;

const PEAK_VOLUME_SHIFT: u32 = 8;

const PULSE_MODE_SHIFT: u32 = 2;
const PAN_SHIFT: u32 = 4;

/// Receiver of tone calls; the synthesizer side of the sequencer.
///
/// Closures taking the four words implement it, so a host can forward straight
/// to its own `tone` import.
pub trait Tone {
    fn tone(&mut self, frequency: u32, duration: u32, volume: u32, flags: u32);
}

impl<F> Tone for F
where
    F: FnMut(u32, u32, u32, u32),
{
    fn tone(&mut self, frequency: u32, duration: u32, volume: u32, flags: u32) {
        self(frequency, duration, volume, flags)
    }
}

/// One tone call, as packed words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneCommand {
    pub frequency: u32,
    pub duration: u32,
    pub volume: u32,
    pub flags: u32,
}

impl ToneCommand {
    pub fn emit<T: Tone + ?Sized>(&self, out: &mut T) {
        out.tone(self.frequency, self.duration, self.volume, self.flags);
    }

    pub fn start_freq(&self) -> u16 {
        self.frequency as u16
    }

    pub fn slide_target(&self) -> u16 {
        (self.frequency >> SLIDE_TARGET_SHIFT) as u16
    }

    pub fn sustain_ticks(&self) -> u8 {
        self.duration as u8
    }

    pub fn release_ticks(&self) -> u8 {
        (self.duration >> RELEASE_SHIFT) as u8
    }

    pub fn decay_ticks(&self) -> u8 {
        (self.duration >> DECAY_SHIFT) as u8
    }

    pub fn attack_ticks(&self) -> u8 {
        (self.duration >> ATTACK_SHIFT) as u8
    }

    pub fn sustain_volume(&self) -> u8 {
        self.volume as u8
    }

    pub fn peak_volume(&self) -> u8 {
        (self.volume >> PEAK_VOLUME_SHIFT) as u8
    }
}

pub(crate) fn pack_slide(from: u16, to: u16) -> u32 {
    u32::from(from) | (u32::from(to) << SLIDE_TARGET_SHIFT)
}

/// `sustain` is not masked: a sustain past 255 ticks spills into the release
/// byte, exactly as the receiving synth has always been fed.
pub(crate) fn pack_duration(sustain: u32, release: u8, decay: u8, attack: u8) -> u32 {
    sustain
        | (u32::from(release) << RELEASE_SHIFT)
        | (u32::from(decay) << DECAY_SHIFT)
        | (u32::from(attack) << ATTACK_SHIFT)
}

pub(crate) fn pack_volume(sustain: u8, peak: u8) -> u32 {
    u32::from(sustain) | (u32::from(peak) << PEAK_VOLUME_SHIFT)
}

pub(crate) fn pack_flags(channel: Channel, pulse_mode: PulseMode, pan: Pan) -> u32 {
    u32::from(channel.bits())
        | (u32::from(pulse_mode.bits()) << PULSE_MODE_SHIFT)
        | (u32::from(pan.offset()) << PAN_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_fields_unpack() {
        let command = ToneCommand {
            frequency: pack_slide(440, 880),
            duration: pack_duration(10, 3, 2, 1),
            volume: pack_volume(50, 100),
            flags: pack_flags(Channel::Triangle, PulseMode::Half, Pan::Right),
        };

        assert_eq!(command.start_freq(), 440);
        assert_eq!(command.slide_target(), 880);
        assert_eq!(command.sustain_ticks(), 10);
        assert_eq!(command.release_ticks(), 3);
        assert_eq!(command.decay_ticks(), 2);
        assert_eq!(command.attack_ticks(), 1);
        assert_eq!(command.sustain_volume(), 50);
        assert_eq!(command.peak_volume(), 100);
        assert_eq!(command.flags, 0b10_10_10);
    }

    #[test]
    fn long_sustain_spills_into_release() {
        assert_eq!(pack_duration(0x1ff, 0, 0, 0), 0x0000_01ff);
        assert_eq!(pack_duration(0x100, 1, 0, 0), 0x0000_0100);
    }

    #[test]
    fn closures_receive_tones() {
        let mut calls = 0;
        let mut last = 0;
        {
            let mut sink = |frequency: u32, _: u32, _: u32, _: u32| {
                calls += 1;
                last = frequency;
            };
            let command = ToneCommand {
                frequency: 261,
                duration: 0,
                volume: 0,
                flags: 0,
            };
            command.emit(&mut sink);
            command.emit(&mut sink);
        }

        assert_eq!(calls, 2);
        assert_eq!(last, 261);
    }
}
