use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::mesh::{read_texture_table, FaceTableAt, Mesh, MeshBlock, Point3D, UvStorage, TAG_LENGTH};
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

const BLOCK_PREFIX_SIZE: usize = 4;

// Per-face stride of the SHADEMAP, BASEMAPP and ENVMAPPP tables.
const AUXILIARY_TABLE_STRIDES: [usize; 3] = [4, 4, 8];

/// A chained multi-block model with inline per-face UVs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Wmf {
    pub meshes: Vec<Mesh>,
    pub textures: Vec<String>,
}

impl Wmf {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(raw);

        // Geometry for every block comes first; their face textures follow later in one run.
        let mut blocks: Vec<MeshBlock> = Vec::new();
        loop {
            cursor.skip(BLOCK_PREFIX_SIZE)?;
            let block = MeshBlock::read(&mut cursor, FaceTableAt::Sequential)?;
            let next_block = block.header.next_block;
            blocks.push(block);
            if next_block == 0 {
                break;
            }
        }
        let total_face_count: usize = blocks.iter().map(|b| b.face_count()).sum();

        cursor.skip(TAG_LENGTH)?; // TEXTURES
        let mut meshes = Vec::with_capacity(blocks.len());
        for block in blocks {
            let textures = UvStorage::Inline.read_face_textures(&mut cursor, block.face_count())?;
            meshes.push(block.into_mesh(textures, Point3D::default()));
        }
        cursor.read_u16()?;
        let textures = read_texture_table(&mut cursor)?;

        // The auxiliary maps carry nothing we export, but they are sized by the face count.
        for stride in AUXILIARY_TABLE_STRIDES.iter() {
            cursor.skip(TAG_LENGTH)?;
            cursor.skip(total_face_count * stride)?;
        }
        debug!(
            "WMF: {} meshes, {} faces, {} textures",
            meshes.len(),
            total_face_count,
            textures.len()
        );

        Ok(Wmf { meshes, textures })
    }
}
