use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Read of {1} byte(s) at '0x{0:x}' runs past the end of a buffer of size '0x{2:x}'.")]
    TruncatedInput(usize, usize, usize),

    #[error("Entry '{0}' at '0x{1:x}' with length '0x{2:x}' does not fit in an archive of size '0x{3:x}'.")]
    MalformedArchive(String, usize, usize, usize),

    #[error("Fell out of buffer at '0x{1:x}' while reading {0}.")]
    UnexpectedTerminator(&'static str, usize),

    #[error("Unable to parse record: {0}")]
    InvalidRecord(String),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Entry '{0}' needs address '0x{1:x}', which does not fit in 32 bits.")]
    AddressOverflow(String, usize),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Material index '{0}' is out of bounds for a texture table of size '{1}'.")]
    MissingMaterial(usize, usize),

    #[error("Vertex index '{0}' is out of bounds for a mesh with '{1}' points.")]
    VertexOutOfRange(usize, usize),

    #[error("UV index '{0}' is out of bounds for a UV table of size '{1}'.")]
    UvIndexOutOfRange(usize, usize),

    #[error("Section of {0}x{1} cells holds '{2}' things.")]
    SectionSizeMismatch(usize, usize, usize),

    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Scale factor '{0}' must be a positive, finite number.")]
    InvalidScaleFactor(f32),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to decode '{0}': {1}")]
    Decode(String, DecodeError),

    #[error("Failed to export '{0}': {1}")]
    Export(String, ExportError),

    #[error("Sprite '{0}' has dimensions that cannot form an image.")]
    InvalidSpriteSize(String),

    #[error("Output name '{0}' is not a plain file name.")]
    UnsafeEntryName(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
