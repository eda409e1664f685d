use log::debug;
use rustc_hash::FxHashMap;

use crate::spr::Sprite;

/// Size assumed for textures that were never decoded.
pub const FALLBACK_DIMENSION: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDimensions {
    pub width: usize,
    pub height: usize,
}

impl TextureDimensions {
    pub fn new(width: usize, height: usize) -> Self {
        TextureDimensions { width, height }
    }

    /// Divisors that map texel coordinates onto 0..1.
    pub fn uv_divisors(&self) -> (f32, f32) {
        (
            self.width.saturating_sub(1).max(1) as f32,
            self.height.saturating_sub(1).max(1) as f32,
        )
    }
}

impl Default for TextureDimensions {
    fn default() -> Self {
        TextureDimensions::new(FALLBACK_DIMENSION, FALLBACK_DIMENSION)
    }
}

/// Decoded sprite sizes by texture name, filled in while an extraction runs.
///
/// Mesh export reads UV divisors from here, so every sprite in a directory
/// has to be recorded before that directory's meshes are exported.
#[derive(Debug, Clone, Default)]
pub struct TextureCatalog {
    entries: FxHashMap<String, TextureDimensions>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        TextureCatalog::default()
    }

    pub fn insert(&mut self, name: &str, dimensions: TextureDimensions) {
        self.entries.insert(name.to_string(), dimensions);
    }

    pub fn record_sprite(&mut self, sprite: &Sprite) {
        self.insert(&sprite.name, TextureDimensions::new(sprite.width, sprite.height));
    }

    pub fn get(&self, name: &str) -> Option<TextureDimensions> {
        self.entries.get(name).copied()
    }

    /// Looks up a texture, falling back to 128x128 when it is unknown.
    pub fn dimensions_or_default(&self, name: &str) -> TextureDimensions {
        match self.get(name) {
            Some(dimensions) => dimensions,
            None => {
                debug!("No dimensions for texture {}, assuming {}x{}", name, FALLBACK_DIMENSION, FALLBACK_DIMENSION);
                TextureDimensions::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
