//! Expansion of color channel values into WS2812B pulse trains.
//!
//! Every data bit is transmitted as three peripheral bits `1x0`:
//! a short high pulse (`100`) for a `0` and a long high pulse (`110`) for a `1`.
//! The most significant bit of the channel value is transmitted first.

use crate::protocol::BYTES_PER_COLOR;

/// The pulse train of a channel value of zero; `100` repeated eight times.
const PULSE_TEMPLATE: u32 = 0x92_49_24;

/// The mask of all data bits (the middle bit of every pulse) in a pulse train.
const DATA_MASK: u32 = 0x49_24_92;

/// Lookup table from channel value to its encoded pulse train.
pub static COLOR_MAP: [[u8; BYTES_PER_COLOR]; 256] = build_color_map();

const fn pulse_train(value: u8) -> u32 {
    let mut train = PULSE_TEMPLATE;
    let mut bit = 0;
    while bit < 8 {
        if value & (1 << bit) != 0 {
            train |= 1 << (1 + 3 * bit);
        }
        bit += 1;
    }
    train
}

const fn build_color_map() -> [[u8; BYTES_PER_COLOR]; 256] {
    let mut map = [[0; BYTES_PER_COLOR]; 256];
    let mut value = 0;
    while value < 256 {
        let train = pulse_train(value as u8);
        map[value] = [(train >> 16) as u8, (train >> 8) as u8, train as u8];
        value += 1;
    }
    map
}

/// Encodes a single color channel value.
#[inline]
pub fn encode(value: u8) -> &'static [u8; BYTES_PER_COLOR] {
    &COLOR_MAP[usize::from(value)]
}

/// Decodes an encoded pulse train back into its channel value.
///
/// Returns `None` if the bytes are not a valid pulse train.
pub fn decode(bytes: &[u8; BYTES_PER_COLOR]) -> Option<u8> {
    let train = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
    if train & !DATA_MASK != PULSE_TEMPLATE {
        return None;
    }

    let mut value = 0;
    for bit in 0..8 {
        if train & (1 << (1 + 3 * bit)) != 0 {
            value |= 1 << bit;
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_entries() {
        assert_eq!(encode(0), &[0x92, 0x49, 0x24]);
        assert_eq!(encode(1), &[0x92, 0x49, 0x26]);
        assert_eq!(encode(0x80), &[0xd2, 0x49, 0x24]);
        assert_eq!(encode(0x55), &[0x9a, 0x69, 0xa6]);
        assert_eq!(encode(255), &[0xdb, 0x6d, 0xb6]);
    }

    #[test]
    fn every_bit_is_a_valid_pulse() {
        for value in 0..=255u8 {
            let [a, b, c] = *encode(value);
            let train = u32::from_be_bytes([0, a, b, c]);
            for bit in 0..8 {
                let pulse = (train >> (3 * bit)) & 0b111;
                let expected = if value & (1 << bit) != 0 { 0b110 } else { 0b100 };
                assert_eq!(pulse, expected, "value {value}, bit {bit}");
            }
        }
    }

    #[test]
    fn decode_inverts_encode() {
        for value in 0..=255u8 {
            assert_eq!(decode(encode(value)), Some(value));
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode(&[0, 0, 0]), None);
        assert_eq!(decode(&[0xff, 0xff, 0xff]), None);
        assert_eq!(decode(&[0x92, 0x49, 0x25]), None);
    }
}
