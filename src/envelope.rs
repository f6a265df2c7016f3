use crate::consts::{DEFAULT_SUSTAIN, DEFAULT_VOLUME, POP_GUARD_TICKS};
use crate::tone::{pack_duration, pack_volume};

/// The per-track ADSR settings and volume, as set by the instrument messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub volume: u8,  // Peak volume
    pub attack: u8,  // Ticks
    pub decay: u8,   // Ticks
    pub sustain: u8, // Ratio of volume, 255 = full
    pub release: u8, // Ticks
}

/// How a tone is shaped over its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Full ADSR, fitted into the note length.
    Note,
    /// Release only, so the running envelope is not retriggered mid-slide.
    Slide,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            volume: DEFAULT_VOLUME,
            attack: 0,
            decay: 0,
            sustain: DEFAULT_SUSTAIN,
            release: 0,
        }
    }
}

impl Envelope {
    /// Duration word for a tone lasting `length` ticks.
    ///
    /// A `Note` clips attack to the length, then decay to what is left, and
    /// sustains for the remainder. `pop_guard` stretches the tone so it
    /// overlaps a following slide segment.
    pub(crate) fn duration(&self, shape: Shape, length: u32, pop_guard: bool) -> u32 {
        let word = match shape {
            Shape::Slide => pack_duration(length, self.release, 0, 0),
            Shape::Note => {
                let attack = length.min(u32::from(self.attack));
                let decay = (length - attack).min(u32::from(self.decay));
                let sustain = length - attack - decay;
                pack_duration(sustain, self.release, decay as u8, attack as u8)
            }
        };

        if pop_guard {
            word + POP_GUARD_TICKS
        } else {
            word
        }
    }

    /// Volume word: the sustain level scaled from the peak, and the peak.
    pub(crate) fn volume_word(&self) -> u32 {
        let level = u32::from(self.volume) * u32::from(self.sustain) / 255;
        pack_volume(level as u8, self.volume)
    }
}
