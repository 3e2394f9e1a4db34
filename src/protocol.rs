// Every WS2812B bit is three peripheral bits: `1x0`, with `x` the data bit.
// A WS2812B bit lasts 1.25us (800 kHz), so the peripheral runs at 2.4 MHz.

/// Number of peripheral bits used to encode one WS2812B bit.
pub const BITS_PER_PULSE: u32 = 3;

/// Rate at which the peripheral has to shift out bits.
pub const BIT_RATE: u32 = 800_000 * BITS_PER_PULSE;

/// Number of encoded bytes per color channel.
pub const BYTES_PER_COLOR: usize = 3;

/// Number of encoded bytes per pixel (green, red and blue channel).
pub const BYTES_PER_PIXEL: usize = 3 * BYTES_PER_COLOR;

/// Number of zero bytes appended to every frame.
///
/// Newer WS2812B revisions require at least 280us of idle line to latch;
/// 96 bytes hold the line low for 320us.
pub const RESET_BYTES: usize = 96;

/// Data width of one peripheral slot, in bits.
pub const SLOT_BITS: u32 = 16;

/// Number of slots (channels) per peripheral frame.
pub const SLOTS: u32 = 2;

/// Length of the complete frame buffer for a strip of `pixels` LEDs.
///
/// Returns `None` if the length does not fit into memory.
pub const fn frame_len(pixels: u32) -> Option<usize> {
    // u32 -> usize: the crate requires at least 32-bit targets
    match (pixels as usize).checked_mul(BYTES_PER_PIXEL) {
        Some(len) => len.checked_add(RESET_BYTES),
        None => None,
    }
}

/// Maximum number of frames per second a strip with a frame of `frame_len` bytes can show.
pub const fn refresh_rate(frame_len: usize) -> u32 {
    let bits = (frame_len as u64).saturating_mul(8);
    if bits == 0 {
        return 0;
    }
    (BIT_RATE as u64 / bits) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_length() {
        assert_eq!(frame_len(0), Some(RESET_BYTES));
        assert_eq!(frame_len(4), Some(4 * 9 + RESET_BYTES));
        assert_eq!(frame_len(256), Some(2400));
    }

    #[test]
    fn refresh_rate_halves_with_doubled_strip() {
        assert_eq!(refresh_rate(frame_len(4).unwrap()), 2272);
        assert_eq!(refresh_rate(frame_len(256).unwrap()), 125);
        assert_eq!(refresh_rate(frame_len(512).unwrap()), 63);
    }

    #[test]
    fn refresh_rate_of_empty_frame() {
        assert_eq!(refresh_rate(0), 0);
    }
}
