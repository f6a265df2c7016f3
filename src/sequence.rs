use arrayvec::ArrayVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::envelope::{Envelope, Shape};
use crate::errors::Error;
use crate::length::read_length;
use crate::message::{Layout, Message, Pan};
use crate::pitch::note_freq;
use crate::song::{Channel, PulseMode, Song, TrackHeader};
use crate::tone::{pack_flags, pack_slide, Tone, ToneCommand};

/// When a segment marker starts turning notes into slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentStart {
    /// The note after the marker plays normally and the `count` notes after
    /// it slide. This is what the MIDI converter writes.
    AfterLeadNote,
    /// The `count` notes after the marker slide, the first one from the last
    /// note played before the marker.
    Immediate,
}

impl Default for SegmentStart {
    fn default() -> Self {
        SegmentStart::AfterLeadNote
    }
}

/// Playback options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub layout: Layout,
    pub segments: SegmentStart,
}

/// An arp in progress: `count` pitches stored at `notes` in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arp {
    notes: usize,
    count: u8,
}

/// Playback state of one track.
#[derive(Debug, Clone)]
pub struct Track {
    channel: Channel,
    pulse_mode: PulseMode,
    pan: Pan,
    envelope: Envelope,
    arp_speed: u8,

    // Stream state
    position: usize,
    end: usize,
    fault: Option<Error>,
    skipped: Option<Error>,

    // Event state
    ticks_left: u32,
    event_tick: u32,
    last_note: u8,
    pending_segments: u8,
    segments_left: u8,
    arp: Option<Arp>,
}

/// Bounds-checked reads over one track's stream. Nothing past `data.len()`
/// belongs to the track.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    start: usize,
    track: usize,
}

impl<'a> Cursor<'a> {
    fn truncated(&self) -> Error {
        Error::TruncatedStream {
            track: self.track,
            offset: self.start,
        }
    }

    fn byte(&mut self) -> Result<u8, Error> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.truncated())?;
        self.pos += 1;
        Ok(byte)
    }

    fn length(&mut self) -> Result<u32, Error> {
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let (length, used) = read_length(rest).ok_or_else(|| self.truncated())?;
        self.pos += used;
        Ok(u32::from(length))
    }

    /// Step over `count` bytes, returning where they start.
    fn skip(&mut self, count: usize) -> Result<usize, Error> {
        let start = self.pos;
        if start + count > self.data.len() {
            return Err(self.truncated());
        }
        self.pos += count;
        Ok(start)
    }
}

impl Track {
    fn new(header: &TrackHeader) -> Self {
        Track {
            channel: header.channel,
            pulse_mode: header.pulse_mode,
            pan: Pan::Center,
            envelope: Envelope::default(),
            arp_speed: DEFAULT_ARP_SPEED,
            position: header.data.start,
            end: header.data.end,
            fault: None,
            skipped: None,
            ticks_left: 0,
            event_tick: 0,
            last_note: 0,
            pending_segments: 0,
            segments_left: 0,
            arp: None,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn pulse_mode(&self) -> PulseMode {
        self.pulse_mode
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn arp_speed(&self) -> u8 {
        self.arp_speed
    }

    /// Offset of the next message in the song buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Ticks left on the current note, arp or wait.
    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    pub fn last_note(&self) -> u8 {
        self.last_note
    }

    /// Slides left in the current segment run.
    pub fn segments_left(&self) -> u8 {
        self.segments_left
    }

    /// The error that stopped this track, if any.
    pub fn fault(&self) -> Option<Error> {
        self.fault
    }

    /// The last reserved message id this track stepped over, if any. Unlike a
    /// fault it does not stop the track.
    pub fn skipped(&self) -> Option<Error> {
        self.skipped
    }

    /// No further messages will be read: the stream is used up or broken.
    pub fn is_exhausted(&self) -> bool {
        self.fault.is_some() || self.position >= self.end
    }

    fn flags(&self) -> u32 {
        pack_flags(self.channel, self.pulse_mode, self.pan)
    }

    fn emit<T: Tone + ?Sized>(
        &self,
        shape: Shape,
        frequency: u32,
        length: u32,
        pop_guard: bool,
        out: &mut T,
    ) {
        ToneCommand {
            frequency,
            duration: self.envelope.duration(shape, length, pop_guard),
            volume: self.envelope.volume_word(),
            flags: self.flags(),
        }
        .emit(out);
    }

    /// Advance this track by one tick. Returns `true` if it is sounding or
    /// resting for this tick.
    fn tick<T: Tone + ?Sized>(
        &mut self,
        index: usize,
        data: &[u8],
        config: &Config,
        out: &mut T,
    ) -> bool {
        while self.ticks_left == 0 && !self.is_exhausted() {
            if let Err(error) = self.read_message(index, data, config, out) {
                log::warn!("Track #{} stopped: {:?}", index + 1, error);
                self.fault = Some(error);
            }
        }

        if self.ticks_left == 0 {
            return false;
        }

        if let Some(arp) = self.arp {
            let speed = u32::from(self.arp_speed.max(1));
            if self.event_tick % speed == 0 {
                let step = (self.event_tick / speed) % u32::from(arp.count);
                if let Some(&pitch) = data.get(arp.notes + step as usize) {
                    self.emit(Shape::Note, note_freq(pitch).into(), speed, false, out);
                }
            }
        }

        self.event_tick += 1;
        self.ticks_left -= 1;

        true
    }

    /// Read one message with its operands and apply it. The position only
    /// moves once the whole message has been read.
    fn read_message<T: Tone + ?Sized>(
        &mut self,
        index: usize,
        data: &[u8],
        config: &Config,
        out: &mut T,
    ) -> Result<(), Error> {
        let mut cursor = Cursor {
            data: &data[..self.end],
            pos: self.position,
            start: self.position,
            track: index,
        };

        let id = cursor.byte()?;
        let message = config.layout.decode(id);
        log::trace!("Track #{} | {:?} at {}", index + 1, message, cursor.start);

        match message {
            Message::LongWait => {
                let ticks = cursor.length()? + config.layout.long_wait_offset();
                self.start_event(&cursor);
                self.ticks_left = ticks;
            }
            Message::ShortWait(ticks) => {
                self.start_event(&cursor);
                self.ticks_left = u32::from(ticks);
            }
            Message::Note(pitch) => {
                let length = cursor.length()?;
                self.start_event(&cursor);
                self.play_note(pitch, length, out);
            }
            Message::Segments(count) => {
                self.start_event(&cursor);
                match config.segments {
                    SegmentStart::AfterLeadNote => self.pending_segments = count,
                    SegmentStart::Immediate => self.segments_left = count,
                }
            }
            Message::Arp(count) => {
                let length = cursor.length()?;
                let notes = cursor.skip(usize::from(count))?;
                self.start_event(&cursor);
                self.ticks_left = length;
                self.arp = Some(Arp { notes, count });
            }
            Message::SetVolume => {
                self.envelope.volume = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::SetAttack => {
                self.envelope.attack = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::SetDecay => {
                self.envelope.decay = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::SetSustain => {
                self.envelope.sustain = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::SetRelease => {
                self.envelope.release = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::SetPan(pan) => {
                self.start_event(&cursor);
                self.pan = pan;
            }
            Message::SetArpSpeed => {
                self.arp_speed = cursor.byte()?;
                self.start_event(&cursor);
            }
            Message::Reserved(id) => {
                log::warn!(
                    "Track #{} | skipping reserved message id {:#04x} at {}",
                    index + 1,
                    id,
                    cursor.start
                );
                self.skipped = Some(Error::UnknownMessage {
                    track: index,
                    offset: cursor.start,
                    id,
                });
                self.start_event(&cursor);
            }
        }

        Ok(())
    }

    /// Commit a fully read message and clear the per-event state.
    fn start_event(&mut self, cursor: &Cursor) {
        self.position = cursor.pos;
        self.event_tick = 0;
        self.arp = None;
    }

    fn play_note<T: Tone + ?Sized>(&mut self, pitch: u8, length: u32, out: &mut T) {
        self.ticks_left = length;

        if self.segments_left > 0 {
            self.segments_left -= 1;
            let frequency = pack_slide(note_freq(self.last_note), note_freq(pitch));
            self.emit(Shape::Slide, frequency, length, true, out);
        } else {
            let leads_segments = self.pending_segments > 0;
            self.emit(Shape::Note, note_freq(pitch).into(), length, leads_segments, out);
            if leads_segments {
                self.segments_left = self.pending_segments;
                self.pending_segments = 0;
            }
        }

        self.last_note = pitch;
    }
}

/// The main struct for playback. Each call to [`Sequence::tick`] advances
/// every track by one tick (nominally 1/60 s) and sends the tones that start
/// on that tick to a [`Tone`] receiver.
///
/// ```rust
/// # let data = [1, 0x00, 0x03, 0x00, 0x68, 0x0a];
/// use w4on::Sequence;
///
/// let mut sequence = Sequence::new(&data)?;
/// let mut tone = |frequency, duration, volume, flags| {
///     // Forward to the synth
/// #   let _: (u32, u32, u32, u32) = (frequency, duration, volume, flags);
/// };
/// while sequence.tick(&mut tone) {
///     // Render one tick of audio
/// }
/// # Ok::<(), w4on::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Sequence<'a> {
    song: Song<'a>,
    config: Config,
    tracks: ArrayVec<[Track; MAX_TRACKS]>,
}

impl<'a> Sequence<'a> {
    /// Load a song buffer with the default [`Config`].
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        Self::with_config(data, Config::default())
    }

    pub fn with_config(data: &'a [u8], config: Config) -> Result<Self, Error> {
        Ok(Self::from_song(Song::from_slice(data)?, config))
    }

    pub fn from_song(song: Song<'a>, config: Config) -> Self {
        let tracks = Self::load_tracks(&song);

        Sequence {
            song,
            config,
            tracks,
        }
    }

    fn load_tracks(song: &Song) -> ArrayVec<[Track; MAX_TRACKS]> {
        song.tracks().iter().map(Track::new).collect()
    }

    /// Rewind every track to the start of the song.
    pub fn reset(&mut self) {
        self.tracks = Self::load_tracks(&self.song);
    }

    /// Advance by one tick. Returns `false` once no track has anything left
    /// to play or wait for.
    pub fn tick<T: Tone + ?Sized>(&mut self, out: &mut T) -> bool {
        let data = self.song.data();
        let config = &self.config;
        let mut playing = false;

        for (i, track) in self.tracks.iter_mut().enumerate() {
            playing |= track.tick(i, data, config, out);
        }

        playing
    }

    pub fn song(&self) -> &Song<'a> {
        &self.song
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Errors that stopped tracks early.
    pub fn faults<'s>(&'s self) -> impl Iterator<Item = Error> + 's {
        self.tracks.iter().filter_map(Track::fault)
    }

    /// The last reserved id skipped on each track that met one.
    pub fn skipped<'s>(&'s self) -> impl Iterator<Item = Error> + 's {
        self.tracks.iter().filter_map(Track::skipped)
    }
}
