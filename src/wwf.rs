use binread::BinRead;
use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::mesh::{read_texture_table, FaceTableAt, Mesh, MeshBlock, Point3D, UvCorner, UvStorage};
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// Coordinate span added per unit of a section multiplier.
pub const MULTIPLIER_SPAN: i64 = 65535;

const THING_RECORD_SIZE: usize = 8;

/// Shared texture coordinates for one quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvTableEntry {
    /// One-based index into the texture table.
    pub material: u16,
    pub corners: [UvCorner; 4],
}

impl UvTableEntry {
    /// Zero-based texture index.
    pub fn texture_index(&self) -> usize {
        (self.material as usize).saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapBlock {
    pub x: i16,
    pub y: i16,
    pub meshes: Vec<Mesh>,
}

#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq)]
struct SectionHeader {
    rows: u16,
    columns: u16,
    offset_x: u16,
    offset_y: u16,
    x_multiplier: i16,
    y_multiplier: i16,
}

#[derive(BinRead, Debug, Clone, Copy)]
struct ThingRecord {
    x: i16,
    y: i16,
    z: i16,
    uv_index: u16,
}

/// One terrain-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thing {
    pub position: Point3D,
    pub uv_index: u16,
}

impl From<ThingRecord> for Thing {
    fn from(record: ThingRecord) -> Self {
        Thing {
            position: Point3D::new(record.x, record.y, record.z),
            uv_index: record.uv_index,
        }
    }
}

/// A terrain grid of `rows * columns` things.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    pub rows: usize,
    pub columns: usize,
    pub offset_x: u16,
    pub offset_y: u16,
    pub x_multiplier: i16,
    pub y_multiplier: i16,
    pub things: Vec<Thing>,
}

impl Section {
    /// The section origin; multipliers extend the 16-bit offsets by 65535 per unit.
    pub fn origin(&self) -> (i64, i64) {
        (
            self.offset_x as i64 + self.x_multiplier as i64 * MULTIPLIER_SPAN,
            self.offset_y as i64 + self.y_multiplier as i64 * MULTIPLIER_SPAN,
        )
    }

    /// The thing at column `column`, row `row`.
    pub fn thing(&self, column: usize, row: usize) -> Option<&Thing> {
        self.things.get(column * self.rows + row)
    }
}

/// A track world: placed mesh blocks and terrain sections sharing one UV table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Wwf {
    pub uv_table: Vec<UvTableEntry>,
    pub map_blocks: Vec<MapBlock>,
    pub sections: Vec<Section>,
    pub textures: Vec<String>,
}

impl Wwf {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(raw);
        let uv_table = read_uv_table(&mut cursor)?;

        let block_count = cursor.read_u16()?;
        let mut map_blocks = Vec::with_capacity(block_count as usize);
        for _ in 0..block_count {
            map_blocks.push(read_map_block(&mut cursor)?);
        }

        let section_count = cursor.read_u16()?;
        let mut sections = Vec::with_capacity(section_count as usize);
        for _ in 0..section_count {
            sections.push(read_section(&mut cursor)?);
        }

        let textures = read_texture_table(&mut cursor)?;
        debug!(
            "WWF: {} UV entries, {} blocks, {} sections, {} textures",
            uv_table.len(),
            map_blocks.len(),
            sections.len(),
            textures.len()
        );
        Ok(Wwf {
            uv_table,
            map_blocks,
            sections,
            textures,
        })
    }
}

fn read_uv_table(cursor: &mut ByteCursor) -> Result<Vec<UvTableEntry>> {
    let mut entries = Vec::new();
    loop {
        if cursor.remaining() < 2 {
            return Err(DecodeError::UnexpectedTerminator("the UV table", cursor.tell()));
        }
        let material = cursor.read_u16()?;
        if material == 0 {
            break;
        }
        let corners = UvCorner::read_quad(cursor)?;
        entries.push(UvTableEntry { material, corners });
    }
    Ok(entries)
}

fn read_map_block(cursor: &mut ByteCursor) -> Result<MapBlock> {
    let x = cursor.read_i16()?;
    let y = cursor.read_i16()?;
    let mesh_count = cursor.read_u16()?;
    let mut meshes = Vec::with_capacity(mesh_count as usize);
    for _ in 0..mesh_count {
        let offset = Point3D::read(cursor)?;
        let block = MeshBlock::read(cursor, FaceTableAt::Sequential)?;
        let textures = UvStorage::TableIndexed.read_face_textures(cursor, block.face_count())?;
        meshes.push(block.into_mesh(textures, offset));
    }
    Ok(MapBlock { x, y, meshes })
}

fn read_section(cursor: &mut ByteCursor) -> Result<Section> {
    let header: SectionHeader = cursor.read_record()?;
    let count = header.rows as usize * header.columns as usize;
    cursor.require(count * THING_RECORD_SIZE)?;
    let mut things = Vec::with_capacity(count);
    for _ in 0..count {
        things.push(Thing::from(cursor.read_record::<ThingRecord>()?));
    }
    Ok(Section {
        rows: header.rows as usize,
        columns: header.columns as usize,
        offset_x: header.offset_x,
        offset_y: header.offset_y,
        x_multiplier: header.x_multiplier,
        y_multiplier: header.y_multiplier,
        things,
    })
}
