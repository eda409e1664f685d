use std::fs::OpenOptions;
use std::io::Read;
use std::path::PathBuf;

use crate::encoded_strings::encode_fixed_name;
use crate::mesh::{Face, FaceTexture, Point3D, UvCorner, TEXTURE_NAME_LENGTH};
use crate::wwf::{Section, UvTableEntry};

pub fn load_test_file(name: &str) -> Vec<u8> {
    let mut test_file_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    test_file_path.push("resources/test/");
    test_file_path.push(name);
    let mut file = OpenOptions::new().read(true).open(test_file_path).unwrap();
    let mut file_contents: Vec<u8> = Vec::new();
    file.read_to_end(&mut file_contents).unwrap();
    file_contents
}

/// Geometry for one mesh block. The point count must be a multiple of three.
#[derive(Debug, Clone)]
pub struct TestBlock {
    pub points: Vec<Point3D>,
    pub faces: Vec<Face>,
}

#[derive(Debug, Clone)]
pub struct TestMapBlock {
    pub x: i16,
    pub y: i16,
    pub meshes: Vec<(Point3D, TestBlock)>,
}

fn push_u16(raw: &mut Vec<u8>, value: u16) {
    raw.extend_from_slice(&value.to_le_bytes());
}

fn push_i16(raw: &mut Vec<u8>, value: i16) {
    raw.extend_from_slice(&value.to_le_bytes());
}

fn push_point(raw: &mut Vec<u8>, point: &Point3D) {
    push_i16(raw, point.x);
    push_i16(raw, point.y);
    push_i16(raw, point.z);
}

fn push_corners(raw: &mut Vec<u8>, corners: &[UvCorner; 4]) {
    for corner in corners {
        raw.push(corner.u);
        raw.push(corner.v);
    }
}

pub fn spr_bytes(mode: u8, palette: &[u16], width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
    let mut raw = Vec::new();
    push_u16(&mut raw, 0);
    raw.push(mode);
    raw.push(0);
    push_u16(&mut raw, 0);
    push_u16(&mut raw, 0);
    for word in palette {
        push_u16(&mut raw, *word);
    }
    push_u16(&mut raw, 0);
    push_u16(&mut raw, width);
    push_u16(&mut raw, height);
    push_u16(&mut raw, 0);
    raw.extend_from_slice(payload);
    raw
}

pub fn vertex_run_bytes(points: &[Point3D]) -> Vec<u8> {
    assert_eq!(0, points.len() % 3);
    let mut raw = Vec::new();
    let run_count = points.len() / 3;
    for (i, run) in points.chunks(3).enumerate() {
        push_point(&mut raw, &run[0]);
        push_i16(&mut raw, run[1].z);
        push_i16(&mut raw, run[1].x);
        push_i16(&mut raw, run[1].y);
        push_point(&mut raw, &run[2]);
        push_i16(&mut raw, if i + 1 == run_count { 1 } else { 0 });
    }
    raw
}

pub fn texture_table_bytes(names: &[&str]) -> Vec<u8> {
    let mut raw = Vec::new();
    for name in names {
        raw.extend(encode_fixed_name(name, TEXTURE_NAME_LENGTH));
    }
    raw.extend_from_slice(&[0, 0, 0x2A, 0x2A]);
    raw
}

fn face_texture_bytes(raw: &mut Vec<u8>, texture: &FaceTexture) {
    match texture {
        FaceTexture::Inline(uv) => {
            raw.push(uv.material.wrapping_add(1) as u8);
            raw.push(uv.xy_flip);
            push_corners(raw, &uv.corners);
        }
        FaceTexture::Table(index) => push_u16(raw, *index),
    }
}

fn face_textures_bytes(raw: &mut Vec<u8>, faces: &[Face]) {
    for face in faces {
        face_texture_bytes(raw, &face.texture);
    }
}

/// A block header, vertex run, face indices and filler. With `trailing_textures`
/// the face texture records follow straight after.
pub fn mesh_block_bytes(block: &TestBlock, next_block: u16, trailing_textures: bool) -> Vec<u8> {
    let run = vertex_run_bytes(&block.points);
    let mut raw = Vec::new();
    push_u16(&mut raw, (16 + run.len()) as u16);
    push_u16(&mut raw, block.faces.len() as u16);
    push_u16(&mut raw, 0);
    raw.extend_from_slice(&[0; 8]);
    push_u16(&mut raw, next_block);
    raw.extend(run);
    for face in &block.faces {
        raw.extend_from_slice(&face.vertices);
    }
    raw.extend_from_slice(&[0; 4]);
    if trailing_textures {
        face_textures_bytes(&mut raw, &block.faces);
    }
    raw
}

pub fn wmf_bytes(blocks: &[TestBlock], textures: &[&str]) -> Vec<u8> {
    let mut raw = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        raw.extend_from_slice(&[0; 4]);
        let next_block = if i + 1 == blocks.len() { 0 } else { 1 };
        raw.extend(mesh_block_bytes(block, next_block, false));
    }
    raw.extend_from_slice(b"TEXTURES");
    for block in blocks {
        face_textures_bytes(&mut raw, &block.faces);
    }
    push_u16(&mut raw, 0);
    raw.extend(texture_table_bytes(textures));
    let face_count: usize = blocks.iter().map(|b| b.faces.len()).sum();
    for (tag, stride) in [(b"SHADEMAP", 4), (b"BASEMAPP", 4), (b"ENVMAPPP", 8)].iter() {
        raw.extend_from_slice(*tag);
        raw.extend(std::iter::repeat(0x7Fu8).take(face_count * stride));
    }
    raw
}

pub fn s33_bytes(block: &TestBlock, textures: &[&str]) -> Vec<u8> {
    let mut raw = mesh_block_bytes(block, 0, false);
    raw.extend_from_slice(b"TEXTURES");
    face_textures_bytes(&mut raw, &block.faces);
    push_u16(&mut raw, 0);
    raw.extend(texture_table_bytes(textures));
    raw
}

pub fn wwf_bytes(
    uv_table: &[UvTableEntry],
    blocks: &[TestMapBlock],
    sections: &[Section],
    textures: &[&str],
) -> Vec<u8> {
    let mut raw = Vec::new();
    for entry in uv_table {
        push_u16(&mut raw, entry.material);
        push_corners(&mut raw, &entry.corners);
    }
    push_u16(&mut raw, 0);

    push_u16(&mut raw, blocks.len() as u16);
    for block in blocks {
        push_i16(&mut raw, block.x);
        push_i16(&mut raw, block.y);
        push_u16(&mut raw, block.meshes.len() as u16);
        for (offset, mesh) in &block.meshes {
            push_point(&mut raw, offset);
            raw.extend(mesh_block_bytes(mesh, 0, true));
        }
    }

    push_u16(&mut raw, sections.len() as u16);
    for section in sections {
        push_u16(&mut raw, section.rows as u16);
        push_u16(&mut raw, section.columns as u16);
        push_u16(&mut raw, section.offset_x);
        push_u16(&mut raw, section.offset_y);
        push_i16(&mut raw, section.x_multiplier);
        push_i16(&mut raw, section.y_multiplier);
        for thing in &section.things {
            push_point(&mut raw, &thing.position);
            push_u16(&mut raw, thing.uv_index);
        }
    }

    raw.extend(texture_table_bytes(textures));
    raw
}
