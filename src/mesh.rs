use binread::BinRead;
use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

pub(crate) const TAG_LENGTH: usize = 8;
pub(crate) const TEXTURE_NAME_LENGTH: usize = 8;

// Three points plus the continuation word.
const VERTEX_RUN_SIZE: usize = 3 * 6 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point3D {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Point3D {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Point3D { x, y, z }
    }

    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let x = cursor.read_i16()?;
        let y = cursor.read_i16()?;
        let z = cursor.read_i16()?;
        Ok(Point3D { x, y, z })
    }
}

/// A texel coordinate, 0-255 on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UvCorner {
    pub u: u8,
    pub v: u8,
}

impl UvCorner {
    pub fn new(u: u8, v: u8) -> Self {
        UvCorner { u, v }
    }

    pub(crate) fn read_quad(cursor: &mut ByteCursor) -> Result<[UvCorner; 4]> {
        let mut corners = [UvCorner::default(); 4];
        for corner in corners.iter_mut() {
            corner.u = cursor.read_u8()?;
            corner.v = cursor.read_u8()?;
        }
        Ok(corners)
    }
}

/// Texture information stored directly in a face record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineUv {
    /// Zero-based index into the file's texture table. Stored one-based on disk.
    pub material: u16,
    /// Opaque; has no observed effect on geometry.
    pub xy_flip: u8,
    pub corners: [UvCorner; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceTexture {
    Inline(InlineUv),
    /// Index into a shared UV table.
    Table(u16),
}

/// A quad. Vertex indices are local to the owning mesh's point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [u8; 4],
    pub texture: FaceTexture,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mesh {
    pub points: Vec<Point3D>,
    pub faces: Vec<Face>,
    /// Placement of the mesh in its world block. Zero outside of world files.
    pub offset: Point3D,
}

/// How a format stores per-face texture information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvStorage {
    Inline,
    TableIndexed,
}

impl UvStorage {
    fn read_face_texture(self, cursor: &mut ByteCursor) -> Result<FaceTexture> {
        Ok(match self {
            UvStorage::Inline => {
                let material = u16::from(cursor.read_u8()?).wrapping_sub(1);
                let xy_flip = cursor.read_u8()?;
                let corners = UvCorner::read_quad(cursor)?;
                FaceTexture::Inline(InlineUv {
                    material,
                    xy_flip,
                    corners,
                })
            }
            UvStorage::TableIndexed => FaceTexture::Table(cursor.read_u16()?),
        })
    }

    pub(crate) fn read_face_textures(
        self,
        cursor: &mut ByteCursor,
        count: usize,
    ) -> Result<Vec<FaceTexture>> {
        let mut textures = Vec::with_capacity(count);
        for _ in 0..count {
            textures.push(self.read_face_texture(cursor)?);
        }
        Ok(textures)
    }
}

/// Where a block's face index table begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceTableAt {
    /// Straight after the vertex run.
    Sequential,
    /// At `point_offset` bytes from the start of the block header.
    PointOffset,
}

#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub point_offset: u16,
    pub face_count: u16,
    #[br(pad_after = 8)]
    pub texture_offset: u16,
    pub next_block: u16,
}

/// Geometry of one block, before its face textures are known.
#[derive(Debug, Clone)]
pub(crate) struct MeshBlock {
    pub header: BlockHeader,
    pub points: Vec<Point3D>,
    pub indices: Vec<[u8; 4]>,
}

impl MeshBlock {
    pub fn read(cursor: &mut ByteCursor, faces_at: FaceTableAt) -> Result<Self> {
        let block_start = cursor.tell();
        let header: BlockHeader = cursor.read_record()?;
        let points = read_vertex_run(cursor)?;
        if faces_at == FaceTableAt::PointOffset {
            cursor.seek_relative(block_start, header.point_offset as usize);
        }
        let mut indices = Vec::with_capacity(header.face_count as usize);
        for _ in 0..header.face_count {
            let raw = cursor.read_bytes(4)?;
            indices.push([raw[0], raw[1], raw[2], raw[3]]);
        }
        cursor.skip(4)?;
        debug!(
            "Mesh block at 0x{:x}: {} points, {} faces",
            block_start,
            points.len(),
            indices.len()
        );
        Ok(MeshBlock {
            header,
            points,
            indices,
        })
    }

    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    pub fn into_mesh(self, textures: Vec<FaceTexture>, offset: Point3D) -> Mesh {
        let faces = self
            .indices
            .into_iter()
            .zip(textures)
            .map(|(vertices, texture)| Face { vertices, texture })
            .collect();
        Mesh {
            points: self.points,
            faces,
            offset,
        }
    }
}

/// Reads vertex runs until a non-zero continuation word.
///
/// Each run holds three points; the second is stored Z, X, Y while the
/// outer two are stored X, Y, Z.
pub(crate) fn read_vertex_run(cursor: &mut ByteCursor) -> Result<Vec<Point3D>> {
    let mut points = Vec::new();
    loop {
        if cursor.remaining() < VERTEX_RUN_SIZE {
            return Err(DecodeError::UnexpectedTerminator("a vertex run", cursor.tell()));
        }
        points.push(Point3D::read(cursor)?);
        let z = cursor.read_i16()?;
        let x = cursor.read_i16()?;
        let y = cursor.read_i16()?;
        points.push(Point3D { x, y, z });
        points.push(Point3D::read(cursor)?);
        if cursor.read_i16()? != 0 {
            break;
        }
    }
    Ok(points)
}

/// Reads 8-byte texture names up to and including the table's terminator
/// word, which starts with a zero byte.
pub(crate) fn read_texture_table(cursor: &mut ByteCursor) -> Result<Vec<String>> {
    let mut textures = Vec::new();
    while cursor.peek_non_zero("the texture table")? {
        if let Some(name) = cursor.read_fixed_string(TEXTURE_NAME_LENGTH)? {
            textures.push(name);
        }
    }
    cursor.read_u32()?;
    Ok(textures)
}
