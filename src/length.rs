//! Variable-length fields.
//!
//! ```text
//! [0][7:length]                     0..=127, one byte
//! [1][7:length high][8:length low]  0..=32767, two bytes, big-endian
//! ```

use arrayvec::ArrayVec;
use byteorder::{BigEndian, ByteOrder};

use crate::consts::MAX_LENGTH;

const EXTENDED_FLAG: u8 = 0x80;

/// Decode a length from the start of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` when `data`
/// ends before the field does. Pass only the bytes up to the end of the
/// owning track so a field can never straddle into the next one.
pub fn read_length(data: &[u8]) -> Option<(u16, usize)> {
    let first = *data.first()?;
    if first & EXTENDED_FLAG == 0 {
        return Some((u16::from(first), 1));
    }

    let field = data.get(..2)?;
    Some((BigEndian::read_u16(field) & MAX_LENGTH, 2))
}

/// Encode `value` as a length field, or `None` if it does not fit in 15 bits.
pub fn encode_length(value: u16) -> Option<ArrayVec<[u8; 2]>> {
    let mut out = ArrayVec::new();
    if value > MAX_LENGTH {
        return None;
    } else if value < u16::from(EXTENDED_FLAG) {
        out.push(value as u8);
    } else {
        let mut field = [0; 2];
        BigEndian::write_u16(&mut field, value);
        out.push(field[0] | EXTENDED_FLAG);
        out.push(field[1]);
    }

    Some(out)
}
