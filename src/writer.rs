//! Encoding song buffers. (Requires `std` feature.)

use byteorder::{BigEndian, ByteOrder};
use std::convert::TryFrom;

use crate::consts::{MAX_LENGTH, MAX_TRACKS, NUM_NOTES};
use crate::errors::Error;
use crate::length::encode_length;
use crate::message::{Layout, Message, Pan};
use crate::song::{track_flags, Channel, PulseMode};

/// Builds a song buffer one track at a time.
///
/// ```rust
/// use w4on::{Channel, PulseMode, Sequence, SongWriter};
///
/// let mut writer = SongWriter::default();
/// writer
///     .track(Channel::Pulse1, PulseMode::Half)
///     .volume(60)
///     .note(40, 10)?
///     .wait(20)?;
/// let data = writer.finish()?;
///
/// let sequence = Sequence::new(&data)?;
/// assert_eq!(sequence.tracks().len(), 1);
/// # Ok::<(), w4on::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SongWriter {
    layout: Layout,
    tracks: Vec<TrackWriter>,
}

/// Message stream of one track.
#[derive(Debug, Clone)]
pub struct TrackWriter {
    layout: Layout,
    flags: u8,
    data: Vec<u8>,
}

impl SongWriter {
    pub fn new(layout: Layout) -> Self {
        SongWriter {
            layout,
            tracks: Vec::new(),
        }
    }

    /// Start a new track and return it for writing.
    pub fn track(&mut self, channel: Channel, pulse_mode: PulseMode) -> &mut TrackWriter {
        self.tracks
            .push(TrackWriter::new(self.layout, channel, pulse_mode));
        let last = self.tracks.len() - 1;
        &mut self.tracks[last]
    }

    /// Concatenate the tracks behind the header.
    pub fn finish(&self) -> Result<Vec<u8>, Error> {
        if self.tracks.len() > MAX_TRACKS {
            return Err(Error::TooManyTracks(self.tracks.len().min(0xff) as u8));
        }

        let mut out = vec![self.tracks.len() as u8];
        for (track, writer) in self.tracks.iter().enumerate() {
            let size = writer.size();
            let size = u16::try_from(size).map_err(|_| Error::TrackTooLarge { track, size })?;
            let mut field = [0; 2];
            BigEndian::write_u16(&mut field, size);
            out.extend_from_slice(&field);
            out.push(writer.flags);
            out.extend_from_slice(&writer.data);
        }

        Ok(out)
    }
}

impl TrackWriter {
    pub fn new(layout: Layout, channel: Channel, pulse_mode: PulseMode) -> Self {
        TrackWriter {
            layout,
            flags: track_flags(channel, pulse_mode),
            data: Vec::new(),
        }
    }

    /// Stream size as written in the header, flags byte included.
    pub fn size(&self) -> usize {
        self.data.len() + 1
    }

    fn id(&mut self, message: Message, what: &'static str, value: u8) -> Result<(), Error> {
        let id = self.layout.encode(message).ok_or(Error::ValueOutOfRange {
            what,
            value: value.into(),
        })?;
        self.data.push(id);
        Ok(())
    }

    fn length(&mut self, length: u16) -> Result<(), Error> {
        let field = encode_length(length).ok_or(Error::ValueOutOfRange {
            what: "length",
            value: length.into(),
        })?;
        self.data.extend_from_slice(&field);
        Ok(())
    }

    fn setter(&mut self, message: Message, value: u8) -> &mut Self {
        if let Some(id) = self.layout.encode(message) {
            self.data.push(id);
            self.data.push(value);
        }
        self
    }

    pub fn volume(&mut self, volume: u8) -> &mut Self {
        self.setter(Message::SetVolume, volume)
    }

    pub fn attack(&mut self, ticks: u8) -> &mut Self {
        self.setter(Message::SetAttack, ticks)
    }

    pub fn decay(&mut self, ticks: u8) -> &mut Self {
        self.setter(Message::SetDecay, ticks)
    }

    /// Sustain level as a ratio of the volume, 255 = full.
    pub fn sustain(&mut self, ratio: u8) -> &mut Self {
        self.setter(Message::SetSustain, ratio)
    }

    pub fn release(&mut self, ticks: u8) -> &mut Self {
        self.setter(Message::SetRelease, ticks)
    }

    pub fn arp_speed(&mut self, ticks: u8) -> &mut Self {
        self.setter(Message::SetArpSpeed, ticks)
    }

    pub fn pan(&mut self, pan: Pan) -> &mut Self {
        if let Some(id) = self.layout.encode(Message::SetPan(pan)) {
            self.data.push(id);
        }
        self
    }

    /// Rest for `ticks`, chaining long waits when one is not enough.
    pub fn wait(&mut self, ticks: u32) -> Result<&mut Self, Error> {
        let short = u32::from(self.layout.short_waits());
        let offset = self.layout.long_wait_offset();
        let longest = u32::from(MAX_LENGTH) + offset;

        let mut ticks = ticks;
        while ticks > 0 {
            if ticks <= short {
                self.id(Message::ShortWait(ticks as u8), "short wait", ticks as u8)?;
                ticks = 0;
            } else {
                let chunk = ticks.min(longest);
                self.id(Message::LongWait, "long wait", 0)?;
                self.length((chunk - offset) as u16)?;
                ticks -= chunk;
            }
        }

        Ok(self)
    }

    /// Play `pitch` (0 = A0, 87 = C8) for `length` ticks.
    pub fn note(&mut self, pitch: u8, length: u16) -> Result<&mut Self, Error> {
        let rollback = self.data.len();
        if let Err(error) = self
            .id(Message::Note(pitch), "note", pitch)
            .and_then(|_| self.length(length))
        {
            self.data.truncate(rollback);
            return Err(error);
        }

        Ok(self)
    }

    /// Turn the `count` notes following the next one into slides.
    pub fn segments(&mut self, count: u8) -> Result<&mut Self, Error> {
        self.id(Message::Segments(count), "segment count", count)?;
        Ok(self)
    }

    /// Cycle through `notes` for `length` ticks, one step per arp speed.
    pub fn arp(&mut self, notes: &[u8], length: u16) -> Result<&mut Self, Error> {
        let count = u8::try_from(notes.len()).map_err(|_| Error::ValueOutOfRange {
            what: "arp note count",
            value: notes.len() as u32,
        })?;
        if let Some(&pitch) = notes.iter().find(|&&pitch| pitch >= NUM_NOTES) {
            return Err(Error::ValueOutOfRange {
                what: "arp note",
                value: pitch.into(),
            });
        }

        let rollback = self.data.len();
        if let Err(error) = self
            .id(Message::Arp(count), "arp note count", count)
            .and_then(|_| self.length(length))
        {
            self.data.truncate(rollback);
            return Err(error);
        }
        self.data.extend_from_slice(notes);

        Ok(self)
    }
}
