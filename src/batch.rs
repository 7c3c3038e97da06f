use crate::images;
use crate::progress::ProgressEvent;
use crate::toolkit::{Ghostscript, OpOutcome, ProgressFn};
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One page range, 1-based inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

/// How a whole-document job is split into multiple outputs.
#[derive(Debug, Clone)]
pub enum SplitStrategy {
    /// One output per caller-given range.
    ExplicitRanges(Vec<PageRange>),
    /// Consecutive windows of `n` pages; the last may be shorter.
    FixedPageCount(u32),
    OnePagePerFile,
    /// Consecutive groups of `size` images per output PDF. `0` or a size
    /// covering the whole list collapses to a single "merge all" group.
    ImageGroup(usize),
}

#[derive(Debug, Clone, Serialize)]
pub enum BatchOp {
    ExtractRange { first: u32, last: u32 },
    ImagesToPdf { inputs: Vec<PathBuf> },
}

/// One sub-operation plus its target output path.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub op: BatchOp,
    pub output: PathBuf,
}

impl BatchItem {
    pub fn describe(&self) -> String {
        match &self.op {
            BatchOp::ExtractRange { first, last } => {
                format!("pages {}-{} -> {}", first, last, self.output.display())
            }
            BatchOp::ImagesToPdf { inputs } => {
                format!("{} image(s) -> {}", inputs.len(), self.output.display())
            }
        }
    }
}

/// An ordered, fully-named batch job. Built once from a strategy and the
/// resolved page count, consumed item-by-item, then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct BatchPlan {
    pub items: Vec<BatchItem>,
}

impl BatchPlan {
    pub fn explicit_ranges(ranges: &[PageRange], output: &Path) -> Result<BatchPlan> {
        if ranges.is_empty() {
            bail!("no page ranges given");
        }
        for (i, r) in ranges.iter().enumerate() {
            if r.first == 0 {
                bail!("range #{}: page numbers start at 1", i + 1);
            }
            if r.first > r.last {
                bail!(
                    "range #{}: first page {} is after last page {}",
                    i + 1,
                    r.first,
                    r.last
                );
            }
        }
        let items = ranges
            .iter()
            .enumerate()
            .map(|(i, r)| BatchItem {
                op: BatchOp::ExtractRange {
                    first: r.first,
                    last: r.last,
                },
                output: numbered_output(output, i + 1, ranges.len()),
            })
            .collect();
        Ok(BatchPlan { items })
    }

    /// Partition `[1, total_pages]` into consecutive windows of `n` pages.
    pub fn every_n_pages(n: u32, total_pages: u32, output: &Path) -> Result<BatchPlan> {
        if n == 0 {
            bail!("pages per file must be at least 1");
        }
        if total_pages == 0 {
            bail!("document page count is unknown");
        }
        let count = total_pages.div_ceil(n) as usize;
        let items = (0..count)
            .map(|idx| {
                let first = idx as u32 * n + 1;
                let last = ((idx as u32 + 1) * n).min(total_pages);
                BatchItem {
                    op: BatchOp::ExtractRange { first, last },
                    output: numbered_output(output, idx + 1, count),
                }
            })
            .collect();
        Ok(BatchPlan { items })
    }

    pub fn one_page_per_file(total_pages: u32, output: &Path) -> Result<BatchPlan> {
        Self::every_n_pages(1, total_pages, output)
    }

    pub fn image_groups(
        images: &[PathBuf],
        group_size: usize,
        output: &Path,
    ) -> Result<BatchPlan> {
        if images.is_empty() {
            bail!("no image files given");
        }
        let size = if group_size == 0 || group_size >= images.len() {
            images.len()
        } else {
            group_size
        };
        let count = images.len().div_ceil(size);
        let items = images
            .chunks(size)
            .enumerate()
            .map(|(i, group)| BatchItem {
                op: BatchOp::ImagesToPdf {
                    inputs: group.to_vec(),
                },
                output: numbered_output(output, i + 1, count),
            })
            .collect();
        Ok(BatchPlan { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run items strictly in order, fail-fast. After each successful item an
    /// aggregated event fires: `current_page` = items completed,
    /// `total_pages` = item count. On the first failure the failing item's
    /// message is returned and nothing further runs; outputs already written
    /// stay on disk.
    pub fn execute(
        &self,
        run_item: &mut dyn FnMut(&BatchItem) -> OpOutcome,
        mut progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        let count = self.items.len() as u32;
        for (i, item) in self.items.iter().enumerate() {
            info!("batch item {}/{}: {}", i + 1, count, item.describe());
            let out = run_item(item);
            if !out.ok {
                return OpOutcome::failure(out.message);
            }
            if let Some(cb) = progress.as_mut() {
                cb(ProgressEvent {
                    current_page: i as u32 + 1,
                    total_pages: count,
                    status: format!("item {}/{}: {}", i + 1, count, item.describe()),
                });
            }
        }
        OpOutcome::success(format!("produced {} output file(s)", self.items.len()))
    }
}

/// Output naming, uniform across all strategies: a single-item plan uses the
/// caller's path verbatim; otherwise `{base}_{index:03}{ext}`, 1-based.
pub fn numbered_output(output: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = output
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_{index:03}{ext}"))
}

/// Build the plan for a PDF split job, resolving the page count from the
/// interpreter when the strategy needs it.
pub fn plan_pdf_split(
    gs: &Ghostscript,
    input: &Path,
    output: &Path,
    strategy: &SplitStrategy,
) -> Result<BatchPlan> {
    match strategy {
        SplitStrategy::ExplicitRanges(ranges) => BatchPlan::explicit_ranges(ranges, output),
        SplitStrategy::FixedPageCount(n) => {
            let total = gs.page_count(input)?;
            BatchPlan::every_n_pages(*n, total, output)
        }
        SplitStrategy::OnePagePerFile => {
            let total = gs.page_count(input)?;
            BatchPlan::one_page_per_file(total, output)
        }
        SplitStrategy::ImageGroup(_) => {
            bail!("image grouping does not apply to a PDF input")
        }
    }
}

/// Plan and execute a PDF split. Items run without per-page tracking to keep
/// throughput high; progress is per-item.
pub fn run_pdf_split(
    gs: &Ghostscript,
    input: &Path,
    output: &Path,
    strategy: &SplitStrategy,
    progress: Option<ProgressFn<'_>>,
) -> OpOutcome {
    let plan = match plan_pdf_split(gs, input, output, strategy) {
        Ok(plan) => plan,
        Err(err) => return OpOutcome::failure(format!("{err:#}")),
    };
    plan.execute(
        &mut |item| match &item.op {
            BatchOp::ExtractRange { first, last } => {
                gs.extract_range(input, &item.output, *first, *last, None)
            }
            BatchOp::ImagesToPdf { .. } => {
                OpOutcome::failure("image batch item in a PDF split plan")
            }
        },
        progress,
    )
}

/// Plan and execute grouped image-to-PDF encoding.
pub fn run_image_batch(
    images: &[PathBuf],
    output: &Path,
    group_size: usize,
    progress: Option<ProgressFn<'_>>,
) -> OpOutcome {
    let plan = match BatchPlan::image_groups(images, group_size, output) {
        Ok(plan) => plan,
        Err(err) => return OpOutcome::failure(format!("{err:#}")),
    };
    plan.execute(
        &mut |item| match &item.op {
            BatchOp::ImagesToPdf { inputs } => images::images_to_pdf(inputs, &item.output, None),
            BatchOp::ExtractRange { .. } => {
                OpOutcome::failure("page range item in an image batch plan")
            }
        },
        progress,
    )
}
