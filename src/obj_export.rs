use std::fmt::Write;

use log::debug;

use crate::mesh::{FaceTexture, Mesh, UvCorner};
use crate::s33::S33;
use crate::settings::ExportSettings;
use crate::texture_catalog::TextureCatalog;
use crate::wmf::Wmf;
use crate::wwf::{Section, UvTableEntry, Wwf};
use crate::{ExportError, SettingsError};

type Result<T> = std::result::Result<T, ExportError>;

/// Corner order of the two triangles emitted per quad, 1-based.
type Winding = [[usize; 3]; 2];

const MODEL_WINDING: Winding = [[3, 2, 1], [2, 3, 4]];
const WORLD_MESH_WINDING: Winding = [[4, 2, 1], [3, 4, 1]];
const TERRAIN_WINDING: Winding = [[1, 2, 4], [1, 4, 3]];

const MESH_OFFSET_UNIT: i64 = 256;
const BLOCK_TILE_SIZE: i64 = 16384;

/// A material library and the geometry that references it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjDocument {
    pub mtl: String,
    pub obj: String,
}

/// Turns decoded models into OBJ/MTL text.
///
/// The catalog must already hold every sprite the model's directory provides;
/// textures it does not know are normalized as 128x128.
pub struct MeshExporter<'a> {
    catalog: &'a TextureCatalog,
    scale: f64,
}

impl<'a> MeshExporter<'a> {
    /// Fails if `settings` does not validate.
    pub fn new(
        catalog: &'a TextureCatalog,
        settings: &ExportSettings,
    ) -> std::result::Result<Self, SettingsError> {
        settings.validate()?;
        Ok(MeshExporter {
            catalog,
            scale: settings.scale_factor as f64,
        })
    }

    pub fn export_wmf(&self, stem: &str, wmf: &Wmf) -> Result<ObjDocument> {
        self.export_model(stem, &wmf.meshes, &wmf.textures, 0)
    }

    pub fn export_s33(&self, stem: &str, s33: &S33) -> Result<ObjDocument> {
        self.export_model(stem, &s33.meshes, &s33.textures, 1)
    }

    pub fn export_wwf(&self, stem: &str, wwf: &Wwf) -> Result<ObjDocument> {
        let mtl = material_library(&wwf.textures, 0)?;
        let mut writer = ObjWriter::new(stem, self.catalog, self.scale)?;
        let uv_table = &wwf.uv_table;

        for block in &wwf.map_blocks {
            let block_x = block.x as i64 * BLOCK_TILE_SIZE;
            let block_y = block.y as i64 * BLOCK_TILE_SIZE;
            for (index, mesh) in block.meshes.iter().enumerate() {
                writer.group(&format!("BLOCK_{}x{}_{}", block.x, block.y, index))?;
                let origin = [
                    mesh.offset.x as i64 * MESH_OFFSET_UNIT + block_x,
                    mesh.offset.y as i64 * MESH_OFFSET_UNIT + block_y,
                    mesh.offset.z as i64 * MESH_OFFSET_UNIT,
                ];
                write_mesh(&mut writer, mesh, origin, &wwf.textures, uv_table, WORLD_MESH_WINDING)?;
            }
        }

        for (index, section) in wwf.sections.iter().enumerate() {
            writer.group(&format!("TRACKDAT_{}", index))?;
            write_section(&mut writer, section, &wwf.textures, uv_table)?;
        }

        debug!("Exported {} with {} vertices", stem, writer.emitted);
        Ok(ObjDocument {
            mtl,
            obj: writer.finish(),
        })
    }

    fn export_model(
        &self,
        stem: &str,
        meshes: &[Mesh],
        textures: &[String],
        ambient: u8,
    ) -> Result<ObjDocument> {
        let mtl = material_library(textures, ambient)?;
        let mut writer = ObjWriter::new(stem, self.catalog, self.scale)?;
        for (index, mesh) in meshes.iter().enumerate() {
            writer.group(&format!("geometry_{}", index))?;
            write_mesh(&mut writer, mesh, [0, 0, 0], textures, &[], MODEL_WINDING)?;
        }
        debug!("Exported {} with {} vertices", stem, writer.emitted);
        Ok(ObjDocument {
            mtl,
            obj: writer.finish(),
        })
    }
}

fn material_library(textures: &[String], ambient: u8) -> Result<String> {
    let mut mtl = String::new();
    for name in textures {
        writeln!(mtl, "newmtl {}", name)?;
        writeln!(mtl, "Ka {} {} {}", ambient, ambient, ambient)?;
        writeln!(mtl, "Kd 1 1 1")?;
        writeln!(mtl, "Ks 0 0 0")?;
        writeln!(mtl, "map_Kd {}.png", name)?;
    }
    Ok(mtl)
}

/// Finds the texture and UVs of a face, either inline or through the UV table.
fn resolve_texture<'t>(
    texture: &FaceTexture,
    textures: &'t [String],
    uv_table: &[UvTableEntry],
) -> Result<(usize, &'t str, [UvCorner; 4])> {
    let (index, corners) = match texture {
        FaceTexture::Inline(uv) => (uv.material as usize, uv.corners),
        FaceTexture::Table(uv_index) => {
            let entry = uv_table
                .get(*uv_index as usize)
                .ok_or(ExportError::UvIndexOutOfRange(*uv_index as usize, uv_table.len()))?;
            (entry.texture_index(), entry.corners)
        }
    };
    let name = textures
        .get(index)
        .ok_or(ExportError::MissingMaterial(index, textures.len()))?;
    Ok((index, name.as_str(), corners))
}

fn write_mesh(
    writer: &mut ObjWriter,
    mesh: &Mesh,
    origin: [i64; 3],
    textures: &[String],
    uv_table: &[UvTableEntry],
    winding: Winding,
) -> Result<()> {
    for face in &mesh.faces {
        let (material, name, corners) = resolve_texture(&face.texture, textures, uv_table)?;
        let mut positions = [[0i64; 3]; 4];
        for (position, vertex) in positions.iter_mut().zip(face.vertices.iter()) {
            let point = mesh
                .points
                .get(*vertex as usize)
                .ok_or(ExportError::VertexOutOfRange(*vertex as usize, mesh.points.len()))?;
            *position = [
                origin[0] + point.x as i64,
                origin[1] + point.y as i64,
                origin[2] + point.z as i64,
            ];
        }
        writer.quad(material, name, &corners, &positions, winding)?;
    }
    Ok(())
}

fn write_section(
    writer: &mut ObjWriter,
    section: &Section,
    textures: &[String],
    uv_table: &[UvTableEntry],
) -> Result<()> {
    if section.things.len() != section.rows * section.columns {
        return Err(ExportError::SectionSizeMismatch(
            section.rows,
            section.columns,
            section.things.len(),
        ));
    }
    let (origin_x, origin_y) = section.origin();

    for column in 0..section.columns.saturating_sub(1) {
        for row in 0..section.rows.saturating_sub(1) {
            let cell = [
                (column, row),
                (column + 1, row),
                (column, row + 1),
                (column + 1, row + 1),
            ];
            let mut positions = [[0i64; 3]; 4];
            for (position, (c, r)) in positions.iter_mut().zip(cell.iter()) {
                let thing = &section.things[c * section.rows + r];
                *position = [
                    origin_x + thing.position.x as i64,
                    origin_y + thing.position.y as i64,
                    thing.position.z as i64,
                ];
            }
            // The cell takes its texture from its top-left thing.
            let anchor = &section.things[column * section.rows + row];
            let (material, name, corners) =
                resolve_texture(&FaceTexture::Table(anchor.uv_index), textures, uv_table)?;
            writer.quad(material, name, &corners, &positions, TERRAIN_WINDING)?;
        }
    }
    Ok(())
}

/// Geometry stream with one global vertex counter for the whole file.
struct ObjWriter<'a> {
    out: String,
    catalog: &'a TextureCatalog,
    scale: f64,
    emitted: usize,
    active_material: Option<usize>,
}

impl<'a> ObjWriter<'a> {
    fn new(stem: &str, catalog: &'a TextureCatalog, scale: f64) -> Result<Self> {
        let mut out = String::new();
        writeln!(out, "mtllib {}.mtl", stem)?;
        Ok(ObjWriter {
            out,
            catalog,
            scale,
            emitted: 0,
            active_material: None,
        })
    }

    fn group(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "g {}", name)?;
        self.active_material = None;
        Ok(())
    }

    fn quad(
        &mut self,
        material: usize,
        name: &str,
        corners: &[UvCorner; 4],
        positions: &[[i64; 3]; 4],
        winding: Winding,
    ) -> Result<()> {
        if self.active_material != Some(material) {
            writeln!(self.out, "usemtl {}", name)?;
            self.active_material = Some(material);
        }

        let (u_divisor, v_divisor) = self.catalog.dimensions_or_default(name).uv_divisors();
        for corner in corners {
            let u = corner.u as f32 / u_divisor;
            let v = 1.0 - corner.v as f32 / v_divisor;
            writeln!(self.out, "vt {:.6} {:.6}", u, v)?;
        }
        for position in positions {
            // Flip before scaling so zero never becomes negative zero.
            writeln!(
                self.out,
                "v {:.6} {:.6} {:.6}",
                position[0] as f64 * self.scale,
                -position[1] as f64 * self.scale,
                -position[2] as f64 * self.scale
            )?;
        }

        let base = self.emitted;
        for triangle in winding.iter() {
            let [a, b, c] = *triangle;
            writeln!(
                self.out,
                "f {0}/{0} {1}/{1} {2}/{2}",
                base + a,
                base + b,
                base + c
            )?;
        }
        self.emitted += 4;
        Ok(())
    }

    fn finish(self) -> String {
        self.out
    }
}
