use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gs: Gs,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gs {
    /// Path to the Ghostscript executable, or "auto" to search PATH (and the
    /// usual Windows install directories). `GSBATCH_GS` overrides "auto".
    pub executable: String,
}
impl Default for Gs {
    fn default() -> Self {
        Self {
            executable: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Paper size name used when resize gets no explicit dimensions.
    pub paper: String,
    /// Resolution for rasterize and recompression.
    pub dpi: u32,
    /// Raster output device name (see `presets::ImageDevice`).
    pub device: String,
    /// `-dPDFSETTINGS` preset for compress and recompression.
    pub quality: String,
}
impl Default for Defaults {
    fn default() -> Self {
        Self {
            paper: "A4".into(),
            dpi: 150,
            device: "png".into(),
            quality: "ebook".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: String::new(),
        }
    }
}
