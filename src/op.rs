use crate::presets::{ImageDevice, Quality};
use std::path::{Path, PathBuf};

/// A fully-built interpreter invocation: the resolved executable plus its
/// argument vector. Immutable once built; consumed by a single runner call.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Recompress {
    pub dpi: u32,
    pub quality: Quality,
}

/// One document operation, carrying exactly the parameters its argument
/// mapping needs. Page numbers are 1-based inclusive.
#[derive(Debug, Clone)]
pub enum Operation {
    Resize {
        paper_width: u32,
        paper_height: u32,
        fit_page: bool,
        recompress: Option<Recompress>,
    },
    Rasterize {
        device: ImageDevice,
        dpi: u32,
        first_page: Option<u32>,
        last_page: Option<u32>,
    },
    Merge {
        inputs: Vec<PathBuf>,
    },
    ExtractRange {
        first_page: u32,
        last_page: u32,
    },
    Compress {
        quality: Quality,
    },
    PageCount,
}

impl Operation {
    /// Map the operation to Ghostscript's argument vector. Pure; the flag
    /// sets are a fixed external protocol and must not be reordered.
    ///
    /// `Merge` takes its inputs from the variant and ignores `input`;
    /// `PageCount` produces no file and ignores `output`.
    pub fn to_args(&self, input: &Path, output: &Path) -> Vec<String> {
        match self {
            Operation::Resize {
                paper_width,
                paper_height,
                fit_page,
                recompress,
            } => {
                let mut args = vec![
                    "-dBATCH".to_string(),
                    "-dNOPAUSE".to_string(),
                    "-sDEVICE=pdfwrite".to_string(),
                    "-dFIXEDMEDIA".to_string(),
                    format!("-dDEVICEWIDTHPOINTS={paper_width}"),
                    format!("-dDEVICEHEIGHTPOINTS={paper_height}"),
                ];
                // Resolution and recompression flags are omitted unless asked
                // for: running pdfwrite without them is measurably faster.
                if let Some(rc) = recompress {
                    args.push(format!("-r{}", rc.dpi));
                    args.push(format!("-dPDFSETTINGS=/{}", rc.quality.gs_name()));
                }
                if *fit_page {
                    args.push("-dPDFFitPage".to_string());
                }
                args.push(format!("-sOutputFile={}", output.display()));
                args.push(input.display().to_string());
                args
            }
            Operation::Rasterize {
                device,
                dpi,
                first_page,
                last_page,
            } => {
                let mut args = vec![
                    "-dBATCH".to_string(),
                    "-dNOPAUSE".to_string(),
                    format!("-sDEVICE={}", device.gs_name()),
                    format!("-r{dpi}"),
                ];
                if let Some(first) = first_page {
                    args.push(format!("-dFirstPage={first}"));
                }
                if let Some(last) = last_page {
                    args.push(format!("-dLastPage={last}"));
                }
                args.push(format!("-sOutputFile={}", output.display()));
                args.push(input.display().to_string());
                args
            }
            Operation::Merge { inputs } => {
                let mut args = vec![
                    "-dBATCH".to_string(),
                    "-dNOPAUSE".to_string(),
                    "-sDEVICE=pdfwrite".to_string(),
                    format!("-sOutputFile={}", output.display()),
                ];
                // Input order determines page order in the result.
                args.extend(inputs.iter().map(|p| p.display().to_string()));
                args
            }
            Operation::ExtractRange {
                first_page,
                last_page,
            } => vec![
                "-dBATCH".to_string(),
                "-dNOPAUSE".to_string(),
                "-sDEVICE=pdfwrite".to_string(),
                format!("-dFirstPage={first_page}"),
                format!("-dLastPage={last_page}"),
                format!("-sOutputFile={}", output.display()),
                input.display().to_string(),
            ],
            Operation::Compress { quality } => vec![
                "-dBATCH".to_string(),
                "-dNOPAUSE".to_string(),
                "-sDEVICE=pdfwrite".to_string(),
                "-dCompatibilityLevel=1.4".to_string(),
                "-dPDFFitPage".to_string(),
                format!("-dPDFSETTINGS=/{}", quality.gs_name()),
                format!("-sOutputFile={}", output.display()),
                input.display().to_string(),
            ],
            Operation::PageCount => {
                // PostScript string literals want forward slashes even on
                // Windows paths.
                let ps_path = input.display().to_string().replace('\\', "/");
                vec![
                    "-dNODISPLAY".to_string(),
                    "-dNOSAFER".to_string(),
                    "-c".to_string(),
                    format!("({ps_path}) (r) file runpdfbegin pdfpagecount = quit"),
                ]
            }
        }
    }
}
