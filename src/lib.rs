//! A sequencer for w4on songs: compact per-channel message streams that are
//! played back one tick at a time by calling a 4-channel tone synth.
//!
//! [`Sequence`] owns the playback state and borrows the song buffer. Every
//! [`Sequence::tick`] sends the tones starting on that tick to a [`Tone`]
//! receiver, which is usually a closure forwarding to the host's `tone`.

#![cfg_attr(not(feature = "std"), no_std)]

mod consts;
mod envelope;
mod errors;
mod length;
mod message;
mod pitch;
mod sequence;
mod song;
mod tone;
#[cfg(feature = "std")]
mod writer;

pub use envelope::Envelope;
pub use errors::Error;
pub use length::{encode_length, read_length};
pub use message::{Layout, Message, Pan};
pub use pitch::note_freq;
pub use sequence::{Config, SegmentStart, Sequence, Track};
pub use song::{Channel, PulseMode, Song, TrackHeader};
pub use tone::{Tone, ToneCommand};
#[cfg(feature = "std")]
pub use writer::{SongWriter, TrackWriter};
