/// Frequencies of the top octave of the table, A10 upwards. Lower octaves are
/// right-shifts of these.
const TOP_OCTAVE: [u16; 12] = [
    28160, // A10
    29834, 31609, 33488, 35479, 37589, 39824, 42192, 44701, 47359, 50175, 53159,
];

const TOP_OCTAVE_SHIFT: u8 = 10;

/// Get the tone frequency for a note index, where 0 is A0 and 87 is C8.
///
/// Indices past the top octave keep the top octave's frequency.
pub fn note_freq(note: u8) -> u16 {
    let shift = TOP_OCTAVE_SHIFT.saturating_sub(note / 12);
    TOP_OCTAVE[usize::from(note % 12)] >> shift
}
