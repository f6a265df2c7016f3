use arrayvec::ArrayVec;
use byteorder::{BigEndian, ByteOrder};
use core::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::Error;

const CHANNEL_MASK: u8 = 0x3;
const PULSE_MODE_SHIFT: u8 = 2;
const PULSE_MODE_MASK: u8 = 0x3;

/// The synth voice a track plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    Pulse1,
    Pulse2,
    Triangle,
    Noise,
}

/// Duty cycle of the pulse channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PulseMode {
    Eighth,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Channel {
    fn from_bits(bits: u8) -> Channel {
        match bits & CHANNEL_MASK {
            0 => Channel::Pulse1,
            1 => Channel::Pulse2,
            2 => Channel::Triangle,
            _ => Channel::Noise,
        }
    }

    pub(crate) fn bits(self) -> u8 {
        self as u8
    }
}

impl PulseMode {
    fn from_bits(bits: u8) -> PulseMode {
        match bits & PULSE_MODE_MASK {
            0 => PulseMode::Eighth,
            1 => PulseMode::Quarter,
            2 => PulseMode::Half,
            _ => PulseMode::ThreeQuarters,
        }
    }

    pub(crate) fn bits(self) -> u8 {
        self as u8
    }
}

/// Pack a channel and pulse mode into a track flags byte.
#[cfg(feature = "std")]
pub(crate) fn track_flags(channel: Channel, pulse_mode: PulseMode) -> u8 {
    channel.bits() | (pulse_mode.bits() << PULSE_MODE_SHIFT)
}

/// Where one track's stream lives in the buffer, and the voice it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHeader {
    pub channel: Channel,
    pub pulse_mode: PulseMode,
    /// Message bytes, from just past the flags byte to the end of the stream.
    pub data: Range<usize>,
}

/// A validated song buffer: the header is parsed once and every track stream
/// is known to lie inside the buffer.
#[derive(Debug, Clone)]
pub struct Song<'a> {
    data: &'a [u8],
    tracks: ArrayVec<[TrackHeader; MAX_TRACKS]>,
}

impl<'a> Song<'a> {
    /// Parse the header of a song buffer.
    ///
    /// ```text
    /// [8:track count]
    /// { [16:stream size][2:-][2:pulse mode][2:channel] {...messages...} }
    /// ```
    ///
    /// The stream size counts the flags byte and the messages.
    pub fn from_slice(data: &'a [u8]) -> Result<Song<'a>, Error> {
        let count = *data.first().ok_or(Error::MissingHeader)?;
        if usize::from(count) > MAX_TRACKS {
            return Err(Error::TooManyTracks(count));
        }

        let mut tracks = ArrayVec::new();
        let mut offset = TRACK_COUNT_LENGTH;
        for track in 0..usize::from(count) {
            let size_field = data
                .get(offset..offset + STREAM_SIZE_LENGTH)
                .ok_or(Error::MissingHeader)?;
            let size = usize::from(BigEndian::read_u16(size_field));
            if size < FLAGS_LENGTH {
                return Err(Error::EmptyTrack { track });
            }

            let end = offset + STREAM_SIZE_LENGTH + size;
            if end > data.len() {
                return Err(Error::TrackOutOfBounds {
                    track,
                    end,
                    len: data.len(),
                });
            }

            let flags = data[offset + STREAM_SIZE_LENGTH];
            let start = offset + STREAM_SIZE_LENGTH + FLAGS_LENGTH;
            log::debug!("Track #{} | size {} | flags {:#04x}", track + 1, size, flags);

            tracks.push(TrackHeader {
                channel: Channel::from_bits(flags),
                pulse_mode: PulseMode::from_bits(flags >> PULSE_MODE_SHIFT),
                data: start..end,
            });
            offset = end;
        }

        Ok(Song { data, tracks })
    }

    pub fn tracks(&self) -> &[TrackHeader] {
        &self.tracks
    }

    /// The whole buffer, header included.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_track_headers() {
        #[rustfmt::skip]
        let data = [
            2,
            0x00, 0x03, 0b0000_1001, 0x01, 0x02,
            0x00, 0x01, 0b0000_0010,
        ];
        let song = Song::from_slice(&data).unwrap();

        assert_eq!(song.tracks().len(), 2);
        assert_eq!(song.tracks()[0].channel, Channel::Pulse2);
        assert_eq!(song.tracks()[0].pulse_mode, PulseMode::Half);
        assert_eq!(song.tracks()[0].data, 4..6);
        assert_eq!(song.tracks()[1].channel, Channel::Triangle);
        assert_eq!(song.tracks()[1].pulse_mode, PulseMode::Eighth);
        assert_eq!(song.tracks()[1].data, 9..9);
    }

    #[test]
    fn zero_tracks_is_a_silent_song() {
        let song = Song::from_slice(&[0]).unwrap();
        assert!(song.tracks().is_empty());
    }

    #[test]
    fn rejects_empty_buffer() {
        assert_eq!(Song::from_slice(&[]).unwrap_err(), Error::MissingHeader);
    }

    #[test]
    fn rejects_too_many_tracks() {
        let error = Song::from_slice(&[5, 0, 1, 0]).unwrap_err();
        assert_eq!(error, Error::TooManyTracks(5));
        assert!(error.is_malformed_header());
    }

    #[test]
    fn rejects_stream_past_buffer_end() {
        let error = Song::from_slice(&[1, 0x00, 0x10, 0x00, 0x40]).unwrap_err();
        assert_eq!(
            error,
            Error::TrackOutOfBounds {
                track: 0,
                end: 19,
                len: 5
            }
        );
        assert!(error.is_malformed_header());
    }

    #[test]
    fn rejects_missing_size_field() {
        let error = Song::from_slice(&[2, 0x00, 0x01, 0x00, 0x00]).unwrap_err();
        assert_eq!(error, Error::MissingHeader);
    }

    #[test]
    fn rejects_track_without_flags() {
        let error = Song::from_slice(&[1, 0x00, 0x00]).unwrap_err();
        assert_eq!(error, Error::EmptyTrack { track: 0 });
    }
}
