pub(crate) const MAX_TRACKS: usize = 4;

pub(crate) const TRACK_COUNT_LENGTH: usize = 1;
pub(crate) const STREAM_SIZE_LENGTH: usize = 2;
pub(crate) const FLAGS_LENGTH: usize = 1;

pub(crate) const NUM_NOTES: u8 = 88;
pub(crate) const NUM_PANS: u8 = 3;
pub(crate) const NUM_SETTERS: u8 = 6; // volume, a, d, s, r, arp speed

pub(crate) const DEFAULT_VOLUME: u8 = 100;
pub(crate) const DEFAULT_SUSTAIN: u8 = 255;
pub(crate) const DEFAULT_ARP_SPEED: u8 = 1;

pub(crate) const MAX_LENGTH: u16 = 0x7fff;

/// Ticks added to a tone that borders a slide segment.
pub(crate) const POP_GUARD_TICKS: u32 = 2;
