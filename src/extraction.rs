use std::fs;
use std::io::Cursor;
use std::path::{Component, Path};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageOutputFormat};
use log::{info, warn};

use crate::asset_kind::{stem, AssetKind};
use crate::obj_export::{MeshExporter, ObjDocument};
use crate::pth::{self, ExtractedEntry};
use crate::s33::S33;
use crate::settings::ExportSettings;
use crate::spr::Sprite;
use crate::texture_catalog::TextureCatalog;
use crate::texture_utils::power_of_two_dimensions;
use crate::wmf::Wmf;
use crate::wwf::Wwf;
use crate::{DecodeError, ExtractionError};

type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Everything produced from one archive. Nested archives become children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedDirectory {
    pub name: String,
    pub files: Vec<OutputFile>,
    pub children: Vec<ExtractedDirectory>,
}

impl ExtractedDirectory {
    pub fn file(&self, name: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&ExtractedDirectory> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Writes this directory and its children under `parent`.
    ///
    /// Every directory and file name must be a single plain path component;
    /// names from an archive directory that would leave `parent` are rejected.
    pub fn write_to(&self, parent: &Path) -> Result<()> {
        let path = parent.join(plain_file_name(&self.name)?);
        fs::create_dir_all(&path)?;
        for file in &self.files {
            fs::write(path.join(plain_file_name(&file.name)?), &file.contents)?;
        }
        for child in &self.children {
            child.write_to(&path)?;
        }
        Ok(())
    }

    fn push(&mut self, name: String, contents: Vec<u8>) {
        self.files.push(OutputFile { name, contents });
    }
}

fn plain_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(ExtractionError::UnsafeEntryName(name.to_string())),
    }
}

/// Formats that become OBJ/MTL pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ModelKind {
    Wmf,
    Wwf,
    S33,
}

pub struct Extractor<'a> {
    settings: &'a ExportSettings,
}

impl<'a> Extractor<'a> {
    /// Fails if `settings` does not validate.
    pub fn new(settings: &'a ExportSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Extractor { settings })
    }

    /// Unpacks a PTH archive and converts what it can.
    ///
    /// Nested archives are handled first, then sprites, then models, so every
    /// texture a model can see is in `catalog` by the time it is exported.
    pub fn extract(
        &self,
        name: &str,
        raw: &[u8],
        catalog: &mut TextureCatalog,
    ) -> Result<ExtractedDirectory> {
        info!("Processing {}", name);
        let entries = pth::parse(raw).map_err(|err| ExtractionError::Decode(name.to_string(), err))?;
        let mut directory = ExtractedDirectory {
            name: stem(name).to_string(),
            ..Default::default()
        };

        let mut archives = Vec::new();
        let mut sprites = Vec::new();
        let mut models = Vec::new();
        for entry in entries {
            match AssetKind::from_name(&entry.name) {
                Some(AssetKind::Pth) => archives.push(entry),
                Some(AssetKind::Spr) => sprites.push(entry),
                Some(AssetKind::Wmf) => models.push((ModelKind::Wmf, entry)),
                Some(AssetKind::Wwf) => models.push((ModelKind::Wwf, entry)),
                Some(AssetKind::S33) => models.push((ModelKind::S33, entry)),
                None => {
                    warn!("Passing through unrecognised entry {}", entry.name);
                    directory.push(entry.name, entry.contents);
                }
            }
        }

        for entry in archives {
            let child = self.extract(&entry.name, &entry.contents, catalog)?;
            directory.children.push(child);
            self.keep_intermediate(&mut directory, entry);
        }

        for entry in sprites {
            info!("SPR : {}", entry.name);
            let sprite = Sprite::from_bytes(stem(&entry.name), &entry.contents)
                .map_err(|err| ExtractionError::Decode(entry.name.clone(), err))?;
            catalog.record_sprite(&sprite);
            let png = self.encode_sprite(&sprite)?;
            directory.push(format!("{}.png", sprite.name), png);
            self.keep_intermediate(&mut directory, entry);
        }

        let exporter = MeshExporter::new(catalog, self.settings)?;
        for (kind, entry) in models {
            info!("{:?} : {}", kind, entry.name);
            let model_stem = stem(&entry.name).to_string();
            let document = export_model(&exporter, kind, &model_stem, &entry)?;
            directory.push(format!("{}.mtl", model_stem), document.mtl.into_bytes());
            directory.push(format!("{}.obj", model_stem), document.obj.into_bytes());
            self.keep_intermediate(&mut directory, entry);
        }

        Ok(directory)
    }

    fn keep_intermediate(&self, directory: &mut ExtractedDirectory, entry: ExtractedEntry) {
        if self.settings.keep_intermediate_files {
            directory.push(entry.name, entry.contents);
        }
    }

    fn encode_sprite(&self, sprite: &Sprite) -> Result<Vec<u8>> {
        let mut image = sprite
            .to_image()
            .ok_or_else(|| ExtractionError::InvalidSpriteSize(sprite.name.clone()))?;
        if self.settings.force_power_of_two {
            let (width, height) = power_of_two_dimensions(image.width(), image.height());
            if (width, height) != image.dimensions() {
                image = imageops::resize(&image, width, height, FilterType::Nearest);
            }
        }
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image).write_to(&mut png, ImageOutputFormat::Png)?;
        Ok(png.into_inner())
    }
}

fn export_model(
    exporter: &MeshExporter,
    kind: ModelKind,
    model_stem: &str,
    entry: &ExtractedEntry,
) -> Result<ObjDocument> {
    let decode_error = |err: DecodeError| ExtractionError::Decode(entry.name.clone(), err);
    let raw = &entry.contents;
    let document = match kind {
        ModelKind::Wmf => {
            let wmf = Wmf::from_bytes(raw).map_err(decode_error)?;
            exporter.export_wmf(model_stem, &wmf)
        }
        ModelKind::Wwf => {
            let wwf = Wwf::from_bytes(raw).map_err(decode_error)?;
            exporter.export_wwf(model_stem, &wwf)
        }
        ModelKind::S33 => {
            let s33 = S33::from_bytes(raw).map_err(decode_error)?;
            exporter.export_s33(model_stem, &s33)
        }
    };
    document.map_err(|err| ExtractionError::Export(entry.name.clone(), err))
}
