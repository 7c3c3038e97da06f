use crate::config::Config;
use crate::op::{CommandSpec, Operation, Recompress};
use crate::presets::{ImageDevice, Quality};
use crate::progress::{PageTracker, ProgressEvent};
use crate::runner::{ExecutionResult, GsRunner};
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Uniform result pair for every document operation. Failures carry the
/// captured interpreter output (or the validation message) verbatim; the
/// facade never aborts the process.
#[derive(Debug, Clone)]
pub struct OpOutcome {
    pub ok: bool,
    pub message: String,
}

impl OpOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Progress observer: `(current_page, total_pages, status)` per event,
/// invoked zero or more times per job.
pub type ProgressFn<'a> = &'a mut dyn FnMut(ProgressEvent);

#[derive(Debug, Clone)]
pub struct ResizeParams {
    pub paper_width: u32,
    pub paper_height: u32,
    pub fit_page: bool,
    pub recompress: Option<Recompress>,
}

/// Facade over the interpreter: one method per document operation, each
/// composing argument building, execution, and progress translation.
///
/// When no progress callback is supplied every method takes the silent fast
/// path: no page-count pre-query, no streaming read loop. The two paths are
/// kept deliberately separate; folding them together would tax the common
/// case with the pre-query.
pub struct Ghostscript {
    runner: GsRunner,
}

impl Ghostscript {
    pub fn new(runner: GsRunner) -> Self {
        Self { runner }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(GsRunner::from_config(cfg)?))
    }

    pub fn executable(&self) -> &Path {
        self.runner.executable()
    }

    /// Interpreter version string, for diagnostics.
    pub fn version(&self) -> Result<String> {
        let spec = self.spec(vec!["--version".to_string()]);
        let res = self.runner.run_silent(&spec);
        if !res.succeeded {
            return Err(anyhow!("gs --version failed: {}", res.raw_output.trim()));
        }
        Ok(res.raw_output.trim().to_string())
    }

    /// Ask the interpreter for the page count via a one-line control script.
    /// An unparsable reply maps to `Ok(0)` ("unknown"); a failed invocation
    /// is an error carrying the diagnostic output.
    pub fn page_count(&self, input: &Path) -> Result<u32> {
        let spec = self.spec(Operation::PageCount.to_args(input, Path::new("")));
        let res = self.runner.run_silent(&spec);
        if !res.succeeded {
            return Err(anyhow!(
                "page count query failed for {}: {}",
                input.display(),
                res.raw_output.trim()
            ));
        }
        Ok(res.raw_output.trim().parse().unwrap_or(0))
    }

    pub fn resize(
        &self,
        input: &Path,
        output: &Path,
        params: &ResizeParams,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        if params.paper_width == 0 || params.paper_height == 0 {
            return OpOutcome::failure("paper width and height must be positive");
        }
        let op = Operation::Resize {
            paper_width: params.paper_width,
            paper_height: params.paper_height,
            fit_page: params.fit_page,
            recompress: params.recompress.clone(),
        };
        info!(
            "resize {} -> {} ({}x{} pt)",
            input.display(),
            output.display(),
            params.paper_width,
            params.paper_height
        );
        self.run_paged(&op, input, output, progress)
    }

    /// Rasterize to images. `output` should carry a `%03d`-style pattern for
    /// multi-page documents; Ghostscript substitutes the page number.
    pub fn rasterize(
        &self,
        input: &Path,
        output: &Path,
        device: ImageDevice,
        dpi: u32,
        first_page: Option<u32>,
        last_page: Option<u32>,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        if dpi == 0 {
            return OpOutcome::failure("dpi must be positive");
        }
        if first_page == Some(0) || last_page == Some(0) {
            return OpOutcome::failure("page numbers start at 1");
        }
        if let (Some(first), Some(last)) = (first_page, last_page) {
            if first > last {
                return OpOutcome::failure(format!("invalid page range {first}-{last}"));
            }
        }
        let op = Operation::Rasterize {
            device,
            dpi,
            first_page,
            last_page,
        };
        info!(
            "rasterize {} -> {} ({} @ {} dpi)",
            input.display(),
            output.display(),
            device.gs_name(),
            dpi
        );
        self.run_paged(&op, input, output, progress)
    }

    /// Merge PDFs in the given order. With a progress callback the total is
    /// the sum of each input's page count, so progress spans the whole job
    /// instead of restarting per input.
    pub fn merge(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        if inputs.is_empty() {
            return OpOutcome::failure("no input files to merge");
        }
        let op = Operation::Merge {
            inputs: inputs.to_vec(),
        };
        info!("merge {} file(s) -> {}", inputs.len(), output.display());
        let spec = self.spec(op.to_args(Path::new(""), output));
        match progress {
            None => outcome(self.runner.run_silent(&spec)),
            Some(cb) => {
                let total = inputs
                    .iter()
                    .map(|p| self.page_count(p).unwrap_or(0))
                    .sum();
                self.stream(&spec, total, 0, cb)
            }
        }
    }

    /// Extract pages `first..=last` into a new PDF. Progress is reported
    /// range-relative: page `first` arrives as 1, so the caller always sees
    /// "page k of (last - first + 1)".
    pub fn extract_range(
        &self,
        input: &Path,
        output: &Path,
        first: u32,
        last: u32,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        if first == 0 || first > last {
            return OpOutcome::failure(format!("invalid page range {first}-{last}"));
        }
        let op = Operation::ExtractRange {
            first_page: first,
            last_page: last,
        };
        info!(
            "extract pages {}-{} of {} -> {}",
            first,
            last,
            input.display(),
            output.display()
        );
        let spec = self.spec(op.to_args(input, output));
        match progress {
            None => outcome(self.runner.run_silent(&spec)),
            Some(cb) => {
                let total = last - first + 1;
                self.stream(&spec, total, first - 1, cb)
            }
        }
    }

    pub fn compress(
        &self,
        input: &Path,
        output: &Path,
        quality: Quality,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        let op = Operation::Compress { quality };
        info!(
            "compress {} -> {} (/{})",
            input.display(),
            output.display(),
            quality.gs_name()
        );
        self.run_paged(&op, input, output, progress)
    }

    fn spec(&self, args: Vec<String>) -> CommandSpec {
        CommandSpec {
            executable: self.runner.executable().to_path_buf(),
            args,
        }
    }

    /// Common path for single-input operations: silent when untracked,
    /// otherwise pre-query the input's page count and stream.
    fn run_paged(
        &self,
        op: &Operation,
        input: &Path,
        output: &Path,
        progress: Option<ProgressFn<'_>>,
    ) -> OpOutcome {
        let spec = self.spec(op.to_args(input, output));
        match progress {
            None => outcome(self.runner.run_silent(&spec)),
            Some(cb) => {
                let total = self.page_count(input).unwrap_or(0);
                self.stream(&spec, total, 0, cb)
            }
        }
    }

    /// `page_offset` shifts absolute page numbers down before forwarding;
    /// zero means no remapping.
    fn stream(
        &self,
        spec: &CommandSpec,
        total_pages: u32,
        page_offset: u32,
        cb: ProgressFn<'_>,
    ) -> OpOutcome {
        if total_pages == 0 {
            debug!("total page count unknown; events carry total_pages=0");
        }
        let mut tracker = PageTracker::new(total_pages);
        let res = self.runner.run_streaming(spec, &mut |line| {
            if let Some(mut ev) = tracker.observe(line) {
                if page_offset > 0 {
                    ev.current_page = ev.current_page.saturating_sub(page_offset);
                }
                cb(ev);
            }
        });
        outcome(res)
    }
}

fn outcome(res: ExecutionResult) -> OpOutcome {
    OpOutcome {
        ok: res.succeeded,
        message: res.raw_output.trim().to_string(),
    }
}
