use binread::BinRead;
use image::RgbaImage;
use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::pixel_encodings::{decode_palette, ChannelOrder, Rgba8};
use crate::texture_utils;
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

const ROW_ALIGNMENT: usize = 4;

#[derive(BinRead, Debug)]
struct SprHeader {
    _unknown1: u16,
    mode: u8,
    _unknown2: u8,
    _unknown3: u16,
    _unknown4: u16,
}

#[derive(BinRead, Debug)]
struct SprDimensions {
    _unknown1: u16,
    width: u16,
    height: u16,
    _unknown2: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprDepth {
    FourBit,
    EightBit,
}

impl SprDepth {
    fn from_mode(mode: u8) -> Self {
        if mode == 1 {
            SprDepth::FourBit
        } else {
            SprDepth::EightBit
        }
    }

    pub fn palette_size(&self) -> usize {
        match self {
            SprDepth::FourBit => 16,
            SprDepth::EightBit => 256,
        }
    }

    fn bytes_per_row(&self, aligned_width: usize) -> usize {
        match self {
            SprDepth::FourBit => aligned_width / 2,
            SprDepth::EightBit => aligned_width,
        }
    }
}

/// An indexed sprite. `data` always holds one palette index per pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub depth: SprDepth,
    pub width: usize,
    pub height: usize,
    pub palette: Vec<Rgba8>,
    pub data: Vec<u8>,
}

impl Sprite {
    pub fn from_bytes(name: &str, raw: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(raw);
        let header: SprHeader = cursor.read_record()?;
        let depth = SprDepth::from_mode(header.mode);

        let mut words = Vec::with_capacity(depth.palette_size());
        for _ in 0..depth.palette_size() {
            words.push(cursor.read_u16()?);
        }
        let palette = decode_palette(&words, ChannelOrder::BGR);

        let dimensions: SprDimensions = cursor.read_record()?;
        let width = dimensions.width as usize;
        let height = dimensions.height as usize;
        debug!("SPR {} is {}x{} ({:?})", name, width, height, depth);

        // Rows are padded out to a multiple of four pixels. In 4-bit mode every
        // byte holds two pixels, low nibble first, and anything past `width` is dropped.
        let aligned_width = texture_utils::align(width, ROW_ALIGNMENT);
        cursor.require(depth.bytes_per_row(aligned_width) * height)?;
        let mut data: Vec<u8> = Vec::with_capacity(width * height);
        let mut row: Vec<u8> = Vec::with_capacity(aligned_width);
        for _ in 0..height {
            let raw_row = cursor.read_bytes(depth.bytes_per_row(aligned_width))?;
            row.clear();
            match depth {
                SprDepth::FourBit => {
                    for value in raw_row {
                        row.push(value & 0xF);
                        row.push(value >> 4);
                    }
                }
                SprDepth::EightBit => row.extend_from_slice(raw_row),
            }
            data.extend_from_slice(&row[..width]);
        }

        Ok(Sprite {
            name: name.to_string(),
            depth,
            width,
            height,
            palette,
            data,
        })
    }

    /// Resolves every index through the palette into RGBA8, row-major from the top.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut decoded: Vec<u8> = Vec::with_capacity(self.data.len() * 4);
        for index in &self.data {
            let color = self.palette.get(*index as usize).copied().unwrap_or_default();
            decoded.extend_from_slice(&color.to_array());
        }
        decoded
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::spr_bytes;

    #[test]
    fn eight_bit_round_trip() {
        let palette: Vec<u16> = (0..256).map(|i| i as u16 * 0x41).collect();
        let indices: Vec<u8> = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9];
        // 5x3, each row padded to 8 bytes.
        let mut payload = Vec::new();
        for row in indices.chunks(5) {
            payload.extend_from_slice(row);
            payload.extend_from_slice(&[0xEE, 0xEE, 0xEE]);
        }
        let raw = spr_bytes(0, &palette, 5, 3, &payload);
        let sprite = Sprite::from_bytes("TEST", &raw).unwrap();
        assert_eq!(SprDepth::EightBit, sprite.depth);
        assert_eq!(5, sprite.width);
        assert_eq!(3, sprite.height);
        assert_eq!(indices, sprite.data);
        assert_eq!(256, sprite.palette.len());
        assert_eq!(decode_palette(&palette, ChannelOrder::BGR), sprite.palette);
    }

    #[test]
    fn four_bit_unpacks_low_nibble_first() {
        let palette: Vec<u16> = (0..16).collect();
        let raw = spr_bytes(1, &palette, 4, 1, &[0x21, 0x43]);
        let sprite = Sprite::from_bytes("TEST", &raw).unwrap();
        assert_eq!(SprDepth::FourBit, sprite.depth);
        assert_eq!(16, sprite.palette.len());
        assert_eq!(vec![1, 2, 3, 4], sprite.data);
    }

    #[test]
    fn four_bit_odd_width_drops_trailing_nibble() {
        let palette: Vec<u16> = (0..16).collect();
        let raw = spr_bytes(1, &palette, 3, 1, &[0x21, 0xF3]);
        let sprite = Sprite::from_bytes("TEST", &raw).unwrap();
        assert_eq!(vec![1, 2, 3], sprite.data);
    }

    #[test]
    fn four_bit_rows_stay_aligned() {
        let palette: Vec<u16> = (0..16).collect();
        // Width 5 pads to 8 pixels, so 4 bytes per row.
        let payload = vec![0x21, 0x43, 0xF5, 0xFF, 0x76, 0x98, 0xFA, 0xFF];
        let raw = spr_bytes(1, &palette, 5, 2, &payload);
        let sprite = Sprite::from_bytes("TEST", &raw).unwrap();
        assert_eq!(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10], sprite.data);
    }

    #[test]
    fn truncated_payload() {
        let palette: Vec<u16> = (0..16).collect();
        let raw = spr_bytes(1, &palette, 8, 2, &[0x11, 0x11, 0x11, 0x11]);
        let result = Sprite::from_bytes("TEST", &raw);
        assert!(matches!(result, Err(DecodeError::TruncatedInput(_, _, _))));
    }

    #[test]
    fn oversized_dimensions_without_payload() {
        let palette: Vec<u16> = vec![0; 256];
        let raw = spr_bytes(0, &palette, 0xFFFF, 0xFFFF, &[]);
        let result = Sprite::from_bytes("HUGE", &raw);
        assert!(matches!(
            result,
            Err(DecodeError::TruncatedInput(528, _, 528))
        ));
    }

    #[test]
    fn truncated_header() {
        let result = Sprite::from_bytes("TEST", &[0, 0, 1]);
        assert!(matches!(result, Err(DecodeError::TruncatedInput(0, _, 3))));
    }

    #[test]
    fn rasterize_keys_black() {
        let mut palette = vec![0u16; 256];
        palette[1] = 0x7FFF;
        let raw = spr_bytes(0, &palette, 2, 2, &[0, 1, 0, 0, 1, 0, 0, 0]);
        let sprite = Sprite::from_bytes("KEY", &raw).unwrap();
        assert_eq!(vec![0, 1, 1, 0], sprite.data);
        let image = sprite.to_image().unwrap();
        assert_eq!((2, 2), image.dimensions());
        assert_eq!([0, 0, 0, 0], image.get_pixel(0, 0).0);
        assert_eq!([248, 248, 248, 255], image.get_pixel(1, 0).0);
        assert_eq!([248, 248, 248, 255], image.get_pixel(0, 1).0);
        assert_eq!([0, 0, 0, 0], image.get_pixel(1, 1).0);
    }
}
