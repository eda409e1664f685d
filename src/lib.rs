mod asset_kind;
mod byte_cursor;
mod encoded_strings;
mod errors;
mod extraction;
mod mesh;
mod obj_export;
mod pixel_encodings;
mod settings;
mod texture_catalog;
mod texture_utils;

pub mod insts;
pub mod pth;
pub mod s33;
pub mod spr;
pub mod wmf;
pub mod wwf;

#[cfg(test)]
mod utils;

pub use asset_kind::AssetKind;
pub use byte_cursor::ByteCursor;
pub use extraction::{ExtractedDirectory, Extractor, OutputFile};
pub use mesh::{Face, FaceTexture, InlineUv, Mesh, Point3D, UvCorner};
pub use obj_export::{MeshExporter, ObjDocument};
pub use pixel_encodings::{decode_palette, decode_psx5551_pixel, ChannelOrder, Rgba8};
pub use settings::ExportSettings;
pub use texture_catalog::{TextureCatalog, TextureDimensions};

pub use errors::{DecodeError, EncodeError, ExportError, ExtractionError, SettingsError};
