use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Named paper sizes in PostScript points (1 inch = 72 points), portrait.
pub const PAPER_SIZES: &[(&str, (u32, u32))] = &[
    ("A4", (595, 842)),
    ("A3", (842, 1191)),
    ("A5", (420, 595)),
    ("Letter", (612, 792)),
    ("Legal", (612, 1008)),
    ("B5", (516, 729)),
];

/// Look up a paper size by name, case-insensitively.
pub fn paper_size(name: &str) -> Option<(u32, u32)> {
    PAPER_SIZES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, dims)| *dims)
}

/// Ghostscript raster output devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImageDevice {
    Png,
    PngGray,
    Jpeg,
    JpegGray,
    Tiff,
}

impl ImageDevice {
    /// The `-sDEVICE=` name Ghostscript expects.
    pub fn gs_name(&self) -> &'static str {
        match self {
            ImageDevice::Png => "png16m",
            ImageDevice::PngGray => "pnggray",
            ImageDevice::Jpeg => "jpeg",
            ImageDevice::JpegGray => "jpeggray",
            ImageDevice::Tiff => "tiff24nc",
        }
    }
}

/// `-dPDFSETTINGS` quality presets, smallest output first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 72 dpi, smallest file.
    Screen,
    /// 150 dpi, medium quality.
    Ebook,
    /// 300 dpi, high quality.
    Printer,
    /// 300 dpi, color-preserving, largest file.
    Prepress,
}

impl Quality {
    pub fn gs_name(&self) -> &'static str {
        match self {
            Quality::Screen => "screen",
            Quality::Ebook => "ebook",
            Quality::Printer => "printer",
            Quality::Prepress => "prepress",
        }
    }
}
