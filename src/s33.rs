use crate::byte_cursor::ByteCursor;
use crate::mesh::{read_texture_table, FaceTableAt, Mesh, MeshBlock, Point3D, UvStorage, TAG_LENGTH};
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// A single-block model. Same face records as WMF, but without the block
/// prefix, block chaining or auxiliary map tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct S33 {
    pub meshes: Vec<Mesh>,
    pub textures: Vec<String>,
}

impl S33 {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(raw);
        let block = MeshBlock::read(&mut cursor, FaceTableAt::Sequential)?;
        cursor.skip(TAG_LENGTH)?; // TEXTURES
        let textures = UvStorage::Inline.read_face_textures(&mut cursor, block.face_count())?;
        let meshes = vec![block.into_mesh(textures, Point3D::default())];
        cursor.read_u16()?;
        let textures = read_texture_table(&mut cursor)?;
        Ok(S33 { meshes, textures })
    }
}
