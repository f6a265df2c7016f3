//! Message ids.
//!
//! Every message starts with a one-byte id. Ids are handed out in spans from
//! 0 upwards, in this order:
//!
//! ```text
//! long wait      1    [length]             waits length + short waits + 1
//! short wait     N    -                    waits id - base + 1
//! note           88   [length]             pitch = id - base
//! segments       N    -                    count = id - base + 1
//! arp            N    [length][notes...]   count = id - base + 2
//! set volume     1    [8:volume]
//! set attack     1    [8:ticks]
//! set decay      1    [8:ticks]
//! set sustain    1    [8:ratio]
//! set release    1    [8:ticks]
//! set pan        3    -                    center, left, right
//! set arp speed  1    [8:ticks]
//! reserved       rest
//! ```
//!
//! The span sizes are part of the format contract; a [`Layout`] fixes them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{NUM_NOTES, NUM_PANS, NUM_SETTERS};

/// Stereo placement of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pan {
    Center,
    Left,
    Right,
}

impl Pan {
    pub(crate) fn from_offset(offset: u8) -> Pan {
        match offset {
            0 => Pan::Center,
            1 => Pan::Left,
            _ => Pan::Right,
        }
    }

    pub(crate) fn offset(self) -> u8 {
        self as u8
    }
}

impl Default for Pan {
    fn default() -> Self {
        Pan::Center
    }
}

/// A decoded message id. Operands are read by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    LongWait,
    ShortWait(u8),
    Note(u8),
    Segments(u8),
    Arp(u8),
    SetVolume,
    SetAttack,
    SetDecay,
    SetSustain,
    SetRelease,
    SetPan(Pan),
    SetArpSpeed,
    Reserved(u8),
}

/// Span sizes of the variable-width ranges of the message id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Spans", into = "Spans"))]
pub struct Layout {
    short_waits: u8,
    segments: u8,
    arps: u8,
}

impl Layout {
    /// 63 short waits, 16 segment counts, 24 arp sizes. Ids 0xc9 and up are
    /// reserved.
    pub const COMPACT: Layout = Layout {
        short_waits: 63,
        segments: 16,
        arps: 24,
    };

    /// 120 short waits, 16 segment counts, 16 arp sizes, as written by the
    /// MIDI converter. Ids 0xfa and up are reserved.
    pub const EXTENDED: Layout = Layout {
        short_waits: 120,
        segments: 16,
        arps: 16,
    };

    /// Build a layout, or `None` if a span is empty or the ids do not fit in
    /// a byte.
    pub fn new(short_waits: u8, segments: u8, arps: u8) -> Option<Layout> {
        let total = 1
            + u32::from(short_waits)
            + u32::from(NUM_NOTES)
            + u32::from(segments)
            + u32::from(arps)
            + u32::from(NUM_SETTERS)
            + u32::from(NUM_PANS);

        if short_waits == 0 || segments == 0 || arps == 0 || total > 0x100 {
            return None;
        }

        Some(Layout {
            short_waits,
            segments,
            arps,
        })
    }

    pub fn short_waits(&self) -> u8 {
        self.short_waits
    }

    pub fn max_segments(&self) -> u8 {
        self.segments
    }

    /// Largest number of notes a single arp message can hold.
    pub fn max_arp_notes(&self) -> u8 {
        self.arps + 1
    }

    /// Ticks added to the length operand of a long wait.
    pub fn long_wait_offset(&self) -> u32 {
        u32::from(self.short_waits) + 1
    }

    fn short_wait_base(&self) -> u8 {
        1
    }

    fn note_base(&self) -> u8 {
        self.short_wait_base() + self.short_waits
    }

    fn segments_base(&self) -> u8 {
        self.note_base() + NUM_NOTES
    }

    fn arp_base(&self) -> u8 {
        self.segments_base() + self.segments
    }

    fn set_volume_id(&self) -> u8 {
        self.arp_base() + self.arps
    }

    fn set_pan_base(&self) -> u8 {
        self.set_volume_id() + 5
    }

    fn set_arp_speed_id(&self) -> u8 {
        self.set_pan_base() + NUM_PANS
    }

    /// First reserved id. A full layout leaves none and returns `None`.
    pub fn reserved_base(&self) -> Option<u8> {
        self.set_arp_speed_id().checked_add(1)
    }

    /// Classify a message id, checking spans from the top down.
    pub fn decode(&self, id: u8) -> Message {
        let vol = self.set_volume_id();

        if self.reserved_base().map_or(false, |base| id >= base) {
            Message::Reserved(id)
        } else if id == self.set_arp_speed_id() {
            Message::SetArpSpeed
        } else if id >= self.set_pan_base() {
            Message::SetPan(Pan::from_offset(id - self.set_pan_base()))
        } else if id == vol + 4 {
            Message::SetRelease
        } else if id == vol + 3 {
            Message::SetSustain
        } else if id == vol + 2 {
            Message::SetDecay
        } else if id == vol + 1 {
            Message::SetAttack
        } else if id == vol {
            Message::SetVolume
        } else if id >= self.arp_base() {
            Message::Arp(id - self.arp_base() + 2)
        } else if id >= self.segments_base() {
            Message::Segments(id - self.segments_base() + 1)
        } else if id >= self.note_base() {
            Message::Note(id - self.note_base())
        } else if id >= self.short_wait_base() {
            Message::ShortWait(id - self.short_wait_base() + 1)
        } else {
            Message::LongWait
        }
    }

    /// The id for `message`, or `None` if its argument falls outside its span.
    pub fn encode(&self, message: Message) -> Option<u8> {
        fn span(base: u8, first: u8, count: u8, value: u8) -> Option<u8> {
            if value >= first && value - first < count {
                Some(base + (value - first))
            } else {
                None
            }
        }

        let vol = self.set_volume_id();
        match message {
            Message::LongWait => Some(0),
            Message::ShortWait(ticks) => {
                span(self.short_wait_base(), 1, self.short_waits, ticks)
            }
            Message::Note(pitch) => span(self.note_base(), 0, NUM_NOTES, pitch),
            Message::Segments(count) => span(self.segments_base(), 1, self.segments, count),
            Message::Arp(count) => span(self.arp_base(), 2, self.arps, count),
            Message::SetVolume => Some(vol),
            Message::SetAttack => Some(vol + 1),
            Message::SetDecay => Some(vol + 2),
            Message::SetSustain => Some(vol + 3),
            Message::SetRelease => Some(vol + 4),
            Message::SetPan(pan) => Some(self.set_pan_base() + pan.offset()),
            Message::SetArpSpeed => Some(self.set_arp_speed_id()),
            Message::Reserved(id) => match self.reserved_base() {
                Some(base) if id >= base => Some(id),
                _ => None,
            },
        }
    }
}

/// Unchecked span sizes, validated into a [`Layout`] on deserialization.
#[cfg(feature = "serde")]
#[derive(Clone, Copy, Serialize, Deserialize)]
struct Spans {
    short_waits: u8,
    segments: u8,
    arps: u8,
}

#[cfg(feature = "serde")]
impl core::convert::TryFrom<Spans> for Layout {
    type Error = &'static str;

    fn try_from(spans: Spans) -> Result<Self, Self::Error> {
        Layout::new(spans.short_waits, spans.segments, spans.arps)
            .ok_or("message id spans do not fit in a byte")
    }
}

#[cfg(feature = "serde")]
impl From<Layout> for Spans {
    fn from(layout: Layout) -> Self {
        Spans {
            short_waits: layout.short_waits,
            segments: layout.segments,
            arps: layout.arps,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::COMPACT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_boundaries() {
        let layout = Layout::COMPACT;
        assert_eq!(layout.decode(0x00), Message::LongWait);
        assert_eq!(layout.decode(0x01), Message::ShortWait(1));
        assert_eq!(layout.decode(0x3f), Message::ShortWait(63));
        assert_eq!(layout.decode(0x40), Message::Note(0));
        assert_eq!(layout.decode(0x97), Message::Note(87));
        assert_eq!(layout.decode(0x98), Message::Segments(1));
        assert_eq!(layout.decode(0xa7), Message::Segments(16));
        assert_eq!(layout.decode(0xa8), Message::Arp(2));
        assert_eq!(layout.decode(0xbf), Message::Arp(25));
        assert_eq!(layout.decode(0xc0), Message::SetVolume);
        assert_eq!(layout.decode(0xc1), Message::SetAttack);
        assert_eq!(layout.decode(0xc2), Message::SetDecay);
        assert_eq!(layout.decode(0xc3), Message::SetSustain);
        assert_eq!(layout.decode(0xc4), Message::SetRelease);
        assert_eq!(layout.decode(0xc5), Message::SetPan(Pan::Center));
        assert_eq!(layout.decode(0xc6), Message::SetPan(Pan::Left));
        assert_eq!(layout.decode(0xc7), Message::SetPan(Pan::Right));
        assert_eq!(layout.decode(0xc8), Message::SetArpSpeed);
        assert_eq!(layout.decode(0xc9), Message::Reserved(0xc9));
        assert_eq!(layout.decode(0xff), Message::Reserved(0xff));
        assert_eq!(layout.long_wait_offset(), 64);
    }

    #[test]
    fn extended_boundaries() {
        let layout = Layout::EXTENDED;
        assert_eq!(layout.decode(0x78), Message::ShortWait(120));
        assert_eq!(layout.decode(0x79), Message::Note(0));
        assert_eq!(layout.decode(0xd1), Message::Segments(1));
        assert_eq!(layout.decode(0xe1), Message::Arp(2));
        assert_eq!(layout.decode(0xf1), Message::SetVolume);
        assert_eq!(layout.decode(0xf5), Message::SetRelease);
        assert_eq!(layout.decode(0xf6), Message::SetPan(Pan::Center));
        assert_eq!(layout.decode(0xf9), Message::SetArpSpeed);
        assert_eq!(layout.reserved_base(), Some(0xfa));
        assert_eq!(layout.long_wait_offset(), 121);
    }

    #[test]
    fn encode_inverts_decode() {
        for &layout in &[Layout::COMPACT, Layout::EXTENDED] {
            for id in 0..=0xff_u8 {
                assert_eq!(layout.encode(layout.decode(id)), Some(id));
            }
        }
    }

    #[test]
    fn encode_rejects_values_outside_the_span() {
        let layout = Layout::COMPACT;
        assert_eq!(layout.encode(Message::ShortWait(0)), None);
        assert_eq!(layout.encode(Message::ShortWait(64)), None);
        assert_eq!(layout.encode(Message::Note(88)), None);
        assert_eq!(layout.encode(Message::Arp(1)), None);
        assert_eq!(layout.encode(Message::Arp(26)), None);
        assert_eq!(layout.encode(Message::Segments(17)), None);
        assert_eq!(layout.encode(Message::Reserved(0x10)), None);
    }

    #[test]
    fn full_layout_has_no_reserved_ids() {
        // 1 + 156 + 88 + 1 + 1 + 6 + 3 = 256
        let layout = Layout::new(156, 1, 1).unwrap();
        assert_eq!(layout.reserved_base(), None);
        assert_eq!(layout.decode(0xff), Message::SetArpSpeed);
        assert!(Layout::new(157, 1, 1).is_none());
        assert!(Layout::new(0, 16, 16).is_none());
    }
}
