use crate::{encoder, protocol::BYTES_PER_PIXEL};

/// A 24-bit RGB color.
///
/// The packed representation is `0x00RRGGBB`: red in bits 23..16,
/// green in bits 15..8 and blue in bits 7..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(u32);

impl Color {
    /// All channels off.
    pub const OFF: Self = Self::rgb(0, 0, 0);

    /// Packs three channel values into a color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self((red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    /// The red channel.
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// The green channel.
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The blue channel.
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// The packed `0x00RRGGBB` value.
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Return the encoded bytes that should be sent to the LED strip, before lane ordering.
    ///
    /// IMPORTANT: WS2812 strips are GRB encoded.
    pub(crate) fn to_ws2812_bytes(self) -> [u8; BYTES_PER_PIXEL] {
        let mut bytes = [0; BYTES_PER_PIXEL];
        for (chunk, channel) in bytes
            .chunks_exact_mut(3)
            .zip([self.green(), self.red(), self.blue()])
        {
            chunk.copy_from_slice(encoder::encode(channel));
        }
        bytes
    }
}

/// Packed `0x00RRGGBB` data. The top byte is ignored.
impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Self(packed & 0x00ff_ffff)
    }
}

/// Raw RGB data.
impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::rgb(red, green, blue)
    }
}

/// 8-bit Linear sRGB, which is the color space
/// most NeoPixel strips are in.
///
/// Be aware that this differs from normal,
/// gamma-corrected sRGB. A conversion has to take place.
///
/// More info can be found in the documentation of the
/// [palette] crate.
impl From<palette::LinSrgb<u8>> for Color {
    fn from(color: palette::LinSrgb<u8>) -> Self {
        Self::rgb(color.red, color.green, color.blue)
    }
}

impl From<Color> for palette::LinSrgb<u8> {
    fn from(color: Color) -> Self {
        palette::LinSrgb::new(color.red(), color.green(), color.blue())
    }
}

/// A request to change the color of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelUpdate {
    /// Position of the pixel on the strip, starting at zero.
    pub index: u32,
    /// The new color.
    pub color: Color,
}

impl PixelUpdate {
    /// Creates a new pixel update.
    pub fn new(index: u32, color: impl Into<Color>) -> Self {
        Self {
            index,
            color: color.into(),
        }
    }
}

impl<C: Into<Color>> From<(u32, C)> for PixelUpdate {
    fn from((index, color): (u32, C)) -> Self {
        Self::new(index, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_packing() {
        let color = Color::rgb(0x12, 0x34, 0x56);
        assert_eq!(color.packed(), 0x0012_3456);
        assert_eq!(color.red(), 0x12);
        assert_eq!(color.green(), 0x34);
        assert_eq!(color.blue(), 0x56);
        assert_eq!(Color::from(0xff12_3456), color);
        assert_eq!(Color::from([0x12, 0x34, 0x56]), color);
    }

    #[test]
    fn palette_conversion() {
        let color = Color::from(palette::LinSrgb::new(1u8, 2, 3));
        assert_eq!(color, Color::rgb(1, 2, 3));
        assert_eq!(palette::LinSrgb::<u8>::from(color), palette::LinSrgb::new(1, 2, 3));
    }

    #[test]
    fn wire_order_is_grb() {
        let bytes = Color::rgb(255, 0, 0).to_ws2812_bytes();
        assert_eq!(bytes[0..3], *encoder::encode(0));
        assert_eq!(bytes[3..6], *encoder::encode(255));
        assert_eq!(bytes[6..9], *encoder::encode(0));
    }
}
