use binread::BinRead;
use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::mesh::{FaceTableAt, Mesh, MeshBlock, Point3D, UvStorage};
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

const MULTIPLIER_SPAN: i32 = 0xFFFF;

#[derive(BinRead, Debug, Clone, Copy)]
struct InstanceRecord {
    a: u8,
    x: u16,
    x_multiplier: i8,
    c: u8,
    y: u16,
    y_multiplier: i8,
    z: i16,
    offset: u16,
    e: u32,
    f: u8,
    g: u16,
    h: u8,
    i: u32,
}

/// A placed object in a track's instance table.
///
/// The single-letter fields have no known meaning and are kept as read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    pub a: u8,
    pub x: i32,
    pub x_multiplier: i8,
    pub c: u8,
    pub y: i32,
    pub y_multiplier: i8,
    pub z: i32,
    pub offset: u16,
    pub e: u32,
    pub f: u8,
    pub g: u16,
    pub h: u8,
    pub i: u32,
}

impl From<InstanceRecord> for Instance {
    fn from(record: InstanceRecord) -> Self {
        Instance {
            a: record.a,
            x: record.x as i32 + record.x_multiplier as i32 * MULTIPLIER_SPAN,
            x_multiplier: record.x_multiplier,
            c: record.c,
            y: record.y as i32 + record.y_multiplier as i32 * MULTIPLIER_SPAN,
            y_multiplier: record.y_multiplier,
            z: record.z as i32,
            offset: record.offset,
            e: record.e,
            f: record.f,
            g: record.g,
            h: record.h,
            i: record.i,
        }
    }
}

/// Instance table of a track (INSTS.DAT): object placements plus the meshes they use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstsDat {
    pub instances: Vec<Instance>,
    pub meshes: Vec<Mesh>,
}

impl InstsDat {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(raw);

        let mut instances = Vec::new();
        while cursor.peek_non_zero("the instance table")? {
            let record: InstanceRecord = cursor.read_record()?;
            instances.push(Instance::from(record));
        }
        cursor.read_u32()?;

        // Block offsets are relative to the table start plus the offset's own slot.
        let table_start = cursor.tell();
        let mut offsets = Vec::new();
        loop {
            if cursor.remaining() < 4 {
                return Err(DecodeError::UnexpectedTerminator("the mesh offset table", cursor.tell()));
            }
            let offset = cursor.read_u32()?;
            if offset == 0 {
                break;
            }
            offsets.push(offset as usize);
        }

        let mut meshes = Vec::with_capacity(offsets.len());
        for (i, offset) in offsets.iter().enumerate() {
            cursor.seek(table_start + offset + i * 4);
            let block = MeshBlock::read(&mut cursor, FaceTableAt::PointOffset)?;
            let textures = UvStorage::Inline.read_face_textures(&mut cursor, block.face_count())?;
            meshes.push(block.into_mesh(textures, Point3D::default()));
        }
        debug!("DAT: {} instances, {} meshes", instances.len(), meshes.len());

        Ok(InstsDat { instances, meshes })
    }
}
