/// Possible errors.
///
/// The header variants are returned by [`Song::from_slice`](crate::Song::from_slice)
/// and refuse a buffer outright. Stream variants are local to one track: a
/// truncated track stops playing and keeps the error as its fault, the rest of
/// the sequence carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum Error {
    #[cfg_attr(feature = "std", error("Buffer ends inside the song header"))]
    MissingHeader,

    #[cfg_attr(feature = "std", error("Too many tracks: {0} (at most 4)"))]
    TooManyTracks(u8),

    #[cfg_attr(feature = "std", error("Track {track} has no room for its flags byte"))]
    EmptyTrack { track: usize },

    #[cfg_attr(
        feature = "std",
        error("Track {track} ends at offset {end}, past the buffer length {len}")
    )]
    TrackOutOfBounds { track: usize, end: usize, len: usize },

    #[cfg_attr(
        feature = "std",
        error("Track {track} is truncated at offset {offset}")
    )]
    TruncatedStream { track: usize, offset: usize },

    #[cfg_attr(
        feature = "std",
        error("Track {track} has reserved message id {id:#04x} at offset {offset}")
    )]
    UnknownMessage { track: usize, offset: usize, id: u8 },

    #[cfg_attr(feature = "std", error("Value {value} is out of range for {what}"))]
    ValueOutOfRange { what: &'static str, value: u32 },

    #[cfg_attr(
        feature = "std",
        error("Track {track} holds {size} bytes, more than a 16-bit size field allows")
    )]
    TrackTooLarge { track: usize, size: usize },
}

impl Error {
    /// `true` for the errors that reject a buffer at load time.
    pub fn is_malformed_header(&self) -> bool {
        match self {
            Error::MissingHeader
            | Error::TooManyTracks(_)
            | Error::EmptyTrack { .. }
            | Error::TrackOutOfBounds { .. } => true,
            _ => false,
        }
    }
}
