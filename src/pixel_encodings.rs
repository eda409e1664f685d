/// Channel order of a 15-bit color word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    BGR,
    RGB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba8 { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Decodes a PSX 1-5-5-5 color word.
///
/// Each 5-bit channel is shifted left by 3 with no rounding, so the low
/// three bits of every output channel are always zero. Bit 15 (the "special"
/// semi-transparency flag) is ignored. When `transparent_if_black` is set a
/// pure black word decodes with alpha 0.
pub fn decode_psx5551_pixel(value: u16, order: ChannelOrder, transparent_if_black: bool) -> Rgba8 {
    let mut r = (((value & 0x7C00) >> 10) << 3) as u8;
    let g = (((value & 0x03E0) >> 5) << 3) as u8;
    let mut b = ((value & 0x001F) << 3) as u8;
    let a = if transparent_if_black && r == 0 && g == 0 && b == 0 {
        0
    } else {
        0xFF
    };
    if order == ChannelOrder::BGR {
        std::mem::swap(&mut r, &mut b);
    }
    Rgba8 { r, g, b, a }
}

/// Decodes a palette of color words. Only index 0 can become transparent.
pub fn decode_palette(words: &[u16], order: ChannelOrder) -> Vec<Rgba8> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| decode_psx5551_pixel(*word, order, i == 0))
        .collect()
}
