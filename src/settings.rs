use serde::{Deserialize, Serialize};

use crate::SettingsError;

type Result<T> = std::result::Result<T, SettingsError>;

/// Options for turning extracted assets into images and models.
///
/// Serialized with the PascalCase keys used by existing settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    #[serde(rename = "ScaleFactor")]
    pub scale_factor: f32,

    #[serde(rename = "ForcePowerOfTwo")]
    pub force_power_of_two: bool,

    #[serde(rename = "KeepProcessedFiles")]
    pub keep_intermediate_files: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            scale_factor: 1.0,
            force_power_of_two: false,
            keep_intermediate_files: false,
        }
    }
}

impl ExportSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: ExportSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(SettingsError::InvalidScaleFactor(self.scale_factor));
        }
        Ok(())
    }
}
