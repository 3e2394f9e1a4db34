use alloc::vec::Vec;

use crate::{
    encoder,
    pixel::Color,
    protocol::{self, BYTES_PER_COLOR, BYTES_PER_PIXEL},
};

/// The byte order in which the peripheral puts buffer bytes onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneOrder {
    /// The peripheral sends 16-bit slots most significant byte first,
    /// but reads them from memory in little endian.
    ///
    /// Every pair of bytes has to be swapped, so byte `k` is stored at `k ^ 1`.
    #[default]
    Swapped16,
    /// The peripheral sends bytes in memory order.
    Linear,
}

impl LaneOrder {
    #[inline]
    fn position(self, offset: usize) -> usize {
        match self {
            LaneOrder::Swapped16 => offset ^ 1,
            LaneOrder::Linear => offset,
        }
    }
}

/// The encoded content of a whole LED strip, followed by the reset gap.
///
/// The length never changes after creation; the reset gap is always zero.
#[derive(Debug)]
pub(crate) struct FrameBuffer {
    data: Vec<u8>,
    pixels: u32,
    lanes: LaneOrder,
}

/// Returned when a pixel index is outside of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InvalidIndex;

/// Returned when the frame buffer cannot be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AllocError {
    /// The frame length overflows `usize`.
    Overflow,
    /// The allocator refused to provide the memory.
    OutOfMemory { bytes: usize },
}

impl FrameBuffer {
    /// Allocates a frame with every pixel switched off.
    pub fn new(pixels: u32, lanes: LaneOrder) -> Result<Self, AllocError> {
        let len = protocol::frame_len(pixels).ok_or(AllocError::Overflow)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| AllocError::OutOfMemory { bytes: len })?;
        data.resize(len, 0);

        let mut frame = Self {
            data,
            pixels,
            lanes,
        };
        frame.clear();
        Ok(frame)
    }

    /// Sets every pixel to [`Color::OFF`].
    pub fn clear(&mut self) {
        for start in (0..self.pixels as usize * BYTES_PER_PIXEL).step_by(BYTES_PER_PIXEL) {
            self.write_pixel(start, Color::OFF);
        }
    }

    /// Raw frame content, in the order it has to be handed to the peripheral.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Stores the encoded color of a single pixel.
    pub fn set(&mut self, index: u32, color: Color) -> Result<(), InvalidIndex> {
        let start = self.pixel_offset(index)?;
        self.write_pixel(start, color);
        Ok(())
    }

    fn write_pixel(&mut self, start: usize, color: Color) {
        for (offset, byte) in (start..).zip(color.to_ws2812_bytes()) {
            let position = self.lanes.position(offset);
            // With an odd pixel count, the last pixel byte lands in the reset gap
            // and its partner position stays zero; both are inside the buffer.
            if let Some(slot) = self.data.get_mut(position) {
                *slot = byte;
            }
        }
    }

    /// Decodes the color of a single pixel.
    ///
    /// Returns `None` if the index is out of range.
    pub fn get(&self, index: u32) -> Option<Color> {
        let start = self.pixel_offset(index).ok()?;

        let mut channels = [0u8; 3];
        for (channel, chunk_start) in channels
            .iter_mut()
            .zip((start..start + BYTES_PER_PIXEL).step_by(BYTES_PER_COLOR))
        {
            let mut encoded = [0u8; BYTES_PER_COLOR];
            for (offset, byte) in (chunk_start..).zip(encoded.iter_mut()) {
                *byte = *self.data.get(self.lanes.position(offset))?;
            }
            *channel = encoder::decode(&encoded)?;
        }

        let [green, red, blue] = channels;
        Some(Color::rgb(red, green, blue))
    }

    fn pixel_offset(&self, index: u32) -> Result<usize, InvalidIndex> {
        if index >= self.pixels {
            return Err(InvalidIndex);
        }
        Ok(index as usize * BYTES_PER_PIXEL)
    }
}
