use std::path::Path;
use std::str::FromStr;

use strum_macros::EnumString;

/// Formats the extractor knows how to process, keyed by file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString)]
pub enum AssetKind {
    #[strum(serialize = "pth")]
    Pth,
    #[strum(serialize = "spr")]
    Spr,
    #[strum(serialize = "wmf")]
    Wmf,
    #[strum(serialize = "wwf")]
    Wwf,
    #[strum(serialize = "s33")]
    S33,
}

impl AssetKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        AssetKind::from_str(&extension).ok()
    }
}

/// File name without its extension.
pub fn stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
