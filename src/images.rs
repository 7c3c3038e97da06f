//! Image decode and image-container PDF encode collaborators.
//!
//! Decoding goes through the `image` crate; the multi-page container is
//! built with `printpdf` 0.8's data-oriented API (pages as `Vec<Op>`,
//! serialized via `PdfDocument::save`). One page per image, input order
//! preserved.

use crate::progress::ProgressEvent;
use crate::toolkit::{OpOutcome, ProgressFn};
use anyhow::{bail, Context, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pixel-to-page mapping resolution. Pages are sized so each image lands at
/// its native pixel dimensions at this density.
const PAGE_DPI: f32 = 150.0;

/// Encode the images as one multi-page PDF at `output`, one page per image
/// in the given order.
pub fn images_to_pdf(
    inputs: &[PathBuf],
    output: &Path,
    mut progress: Option<ProgressFn<'_>>,
) -> OpOutcome {
    match build_pdf(inputs, &mut progress) {
        Ok(bytes) => match std::fs::write(output, &bytes) {
            Ok(()) => {
                info!(
                    "encoded {} image(s) into {}",
                    inputs.len(),
                    output.display()
                );
                OpOutcome::success(format!(
                    "encoded {} image(s) into {}",
                    inputs.len(),
                    output.display()
                ))
            }
            Err(err) => OpOutcome::failure(format!("writing {}: {err}", output.display())),
        },
        Err(err) => OpOutcome::failure(format!("{err:#}")),
    }
}

fn build_pdf(inputs: &[PathBuf], progress: &mut Option<ProgressFn<'_>>) -> Result<Vec<u8>> {
    if inputs.is_empty() {
        bail!("no image files given");
    }
    let total = inputs.len() as u32;

    let mut doc = PdfDocument::new("gsbatch");
    let mut pages: Vec<PdfPage> = Vec::new();

    for (i, path) in inputs.iter().enumerate() {
        if let Some(cb) = progress.as_mut() {
            cb(ProgressEvent {
                current_page: i as u32 + 1,
                total_pages: total,
                status: format!("loading image {}/{}", i + 1, total),
            });
        }

        let decoded =
            image::open(path).with_context(|| format!("decoding image {}", path.display()))?;
        let width = decoded.width() as usize;
        let height = decoded.height() as usize;
        debug!("image {} is {}x{}", path.display(), width, height);

        // printpdf wants plain RGB8 pixel data.
        let rgb = decoded.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width,
            height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // Page sized to the image: px / dpi = inches, 25.4 mm per inch.
        let page_w = Mm(width as f32 / PAGE_DPI * 25.4);
        let page_h = Mm(height as f32 / PAGE_DPI * 25.4);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(PAGE_DPI),
                rotate: None,
            },
        }];
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if let Some(cb) = progress.as_mut() {
        cb(ProgressEvent {
            current_page: total,
            total_pages: total,
            status: "encoding PDF".to_string(),
        });
    }

    doc.with_pages(pages);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}
