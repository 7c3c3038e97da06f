use crate::{
    batch::{self, PageRange, SplitStrategy},
    config::Config,
    images,
    op::Recompress,
    presets::{paper_size, ImageDevice, Quality},
    progress::ProgressEvent,
    toolkit::{Ghostscript, OpOutcome, ResizeParams},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "gsbatch")]
#[command(about = "Ghostscript-backed PDF toolbox (resize, rasterize, merge, split, compress)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./gsbatch.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report the resolved Ghostscript executable and its version.
    Doctor {},
    /// Print the page count of a PDF.
    Pages { input: PathBuf },
    /// Rewrite a PDF onto a new paper size.
    Resize {
        input: PathBuf,
        output: PathBuf,
        /// Paper size name (A4, A3, A5, Letter, Legal, B5).
        #[arg(long)]
        paper: Option<String>,
        /// Custom paper width in points (overrides --paper with --height).
        #[arg(long)]
        width: Option<u32>,
        /// Custom paper height in points.
        #[arg(long)]
        height: Option<u32>,
        /// Keep original content size instead of scaling to the new media.
        #[arg(long)]
        no_fit: bool,
        /// Re-encode embedded images while resizing. Slower; off by default.
        #[arg(long)]
        recompress: bool,
        /// Resolution for recompression (implies --recompress).
        #[arg(long)]
        dpi: Option<u32>,
        /// Quality preset for recompression (implies --recompress).
        #[arg(long)]
        quality: Option<Quality>,
        /// Print per-page progress to stderr.
        #[arg(long)]
        progress: bool,
    },
    /// Render PDF pages to image files.
    Rasterize {
        input: PathBuf,
        /// Output path; include a %03d pattern for multi-page documents.
        output: PathBuf,
        #[arg(long)]
        device: Option<ImageDevice>,
        #[arg(long)]
        dpi: Option<u32>,
        #[arg(long)]
        first: Option<u32>,
        #[arg(long)]
        last: Option<u32>,
        #[arg(long)]
        progress: bool,
    },
    /// Merge PDFs in the given order.
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        progress: bool,
    },
    /// Extract a page range into a new PDF.
    Extract {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        first: u32,
        #[arg(long)]
        last: u32,
        #[arg(long)]
        progress: bool,
    },
    /// Recompress a PDF with a quality preset.
    Compress {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        quality: Option<Quality>,
        #[arg(long)]
        progress: bool,
    },
    /// Split a PDF into multiple files.
    Split {
        input: PathBuf,
        /// Base output path; multi-file output appends _001, _002, ...
        output: PathBuf,
        /// Explicit ranges, e.g. "1-3,7,9-12".
        #[arg(long, conflicts_with_all = ["every", "single"])]
        ranges: Option<String>,
        /// Split every N pages into one file.
        #[arg(long, conflicts_with = "single")]
        every: Option<u32>,
        /// One file per page.
        #[arg(long)]
        single: bool,
        /// Print the batch plan as JSON without executing it.
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        progress: bool,
    },
    /// Encode image files as PDF pages, optionally grouped N images per PDF.
    ImagesToPdf {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        /// Images per output PDF; omitted or 0 puts everything in one PDF.
        #[arg(long)]
        group: Option<usize>,
        #[arg(long)]
        progress: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match &cfg_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Pages { input } => pages(&cfg, input),
        Command::Resize {
            input,
            output,
            paper,
            width,
            height,
            no_fit,
            recompress,
            dpi,
            quality,
            progress,
        } => {
            let (paper_width, paper_height) = match (width, height) {
                (Some(w), Some(h)) => (*w, *h),
                (None, None) => {
                    let name = paper.as_deref().unwrap_or(&cfg.defaults.paper);
                    paper_size(name)
                        .ok_or_else(|| anyhow!("unknown paper size: {name}"))?
                }
                _ => return Err(anyhow!("--width and --height must be given together")),
            };
            let recompress = if *recompress || dpi.is_some() || quality.is_some() {
                Some(Recompress {
                    dpi: dpi.unwrap_or(cfg.defaults.dpi),
                    quality: resolve_quality(&cfg, *quality)?,
                })
            } else {
                None
            };
            let params = ResizeParams {
                paper_width,
                paper_height,
                fit_page: !no_fit,
                recompress,
            };
            let gs = Ghostscript::from_config(&cfg)?;
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| {
                gs.resize(input, output, &params, cb)
            }))
        }
        Command::Rasterize {
            input,
            output,
            device,
            dpi,
            first,
            last,
            progress,
        } => {
            let device = match device {
                Some(d) => *d,
                None => ImageDevice::from_str(&cfg.defaults.device, true)
                    .map_err(|e| anyhow!("defaults.device: {e}"))?,
            };
            let dpi = dpi.unwrap_or(cfg.defaults.dpi);
            let gs = Ghostscript::from_config(&cfg)?;
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| {
                gs.rasterize(input, output, device, dpi, *first, *last, cb)
            }))
        }
        Command::Merge {
            inputs,
            output,
            progress,
        } => {
            let gs = Ghostscript::from_config(&cfg)?;
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| gs.merge(inputs, output, cb)))
        }
        Command::Extract {
            input,
            output,
            first,
            last,
            progress,
        } => {
            let gs = Ghostscript::from_config(&cfg)?;
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| {
                gs.extract_range(input, output, *first, *last, cb)
            }))
        }
        Command::Compress {
            input,
            output,
            quality,
            progress,
        } => {
            let quality = resolve_quality(&cfg, *quality)?;
            let gs = Ghostscript::from_config(&cfg)?;
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| {
                gs.compress(input, output, quality, cb)
            }))
        }
        Command::Split {
            input,
            output,
            ranges,
            every,
            single,
            dry_run,
            progress,
        } => {
            let strategy = split_strategy(ranges.as_deref(), *every, *single)?;
            let gs = Ghostscript::from_config(&cfg)?;
            if *dry_run {
                let plan = batch::plan_pdf_split(&gs, input, output, &strategy)?;
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            prepare_output(output)?;
            finish(with_progress(*progress, |cb| {
                batch::run_pdf_split(&gs, input, output, &strategy, cb)
            }))
        }
        Command::ImagesToPdf {
            inputs,
            output,
            group,
            progress,
        } => {
            prepare_output(output)?;
            let outcome = match group {
                Some(size) if *size > 0 => with_progress(*progress, |cb| {
                    batch::run_image_batch(inputs, output, *size, cb)
                }),
                _ => with_progress(*progress, |cb| images::images_to_pdf(inputs, output, cb)),
            };
            finish(outcome)
        }
    }
}

fn doctor(cfg: &Config) -> Result<()> {
    let gs = Ghostscript::from_config(cfg)?;
    let version = gs.version()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "executable": gs.executable(),
            "version": version,
            "ok": true,
        }))?
    );
    Ok(())
}

fn pages(cfg: &Config, input: &Path) -> Result<()> {
    let gs = Ghostscript::from_config(cfg)?;
    let count = gs.page_count(input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "pages": count,
        }))?
    );
    Ok(())
}

fn split_strategy(
    ranges: Option<&str>,
    every: Option<u32>,
    single: bool,
) -> Result<SplitStrategy> {
    match (ranges, every, single) {
        (Some(spec), None, false) => Ok(SplitStrategy::ExplicitRanges(parse_ranges(spec)?)),
        (None, Some(n), false) => Ok(SplitStrategy::FixedPageCount(n)),
        (None, None, true) => Ok(SplitStrategy::OnePagePerFile),
        _ => Err(anyhow!(
            "choose exactly one of --ranges, --every, or --single"
        )),
    }
}

/// Parse "1-3,7,9-12" into page ranges; a bare number means a single page.
fn parse_ranges(spec: &str) -> Result<Vec<PageRange>> {
    spec.split(',')
        .map(|part| {
            let part = part.trim();
            if let Some((a, b)) = part.split_once('-') {
                Ok(PageRange {
                    first: a.trim().parse().with_context(|| format!("bad range: {part}"))?,
                    last: b.trim().parse().with_context(|| format!("bad range: {part}"))?,
                })
            } else {
                let page: u32 = part.parse().with_context(|| format!("bad page: {part}"))?;
                Ok(PageRange {
                    first: page,
                    last: page,
                })
            }
        })
        .collect()
}

fn resolve_quality(cfg: &Config, quality: Option<Quality>) -> Result<Quality> {
    match quality {
        Some(q) => Ok(q),
        None => Quality::from_str(&cfg.defaults.quality, true)
            .map_err(|e| anyhow!("defaults.quality: {e}")),
    }
}

fn prepare_output(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

/// Run `f` with a stderr progress printer when requested, silently otherwise.
/// The conditional dispatch is the whole point: no callback means the fast
/// path with no page-count pre-query.
fn with_progress<F>(requested: bool, f: F) -> OpOutcome
where
    F: FnOnce(Option<&mut dyn FnMut(ProgressEvent)>) -> OpOutcome,
{
    if requested {
        let mut printer = |ev: ProgressEvent| print_progress(&ev);
        f(Some(&mut printer))
    } else {
        f(None)
    }
}

fn print_progress(ev: &ProgressEvent) {
    if ev.total_pages > 0 {
        let pct = (ev.current_page * 100 / ev.total_pages).min(100);
        eprintln!("[{pct:>3}%] {}", ev.status);
    } else {
        eprintln!("       {}", ev.status);
    }
}

fn finish(outcome: OpOutcome) -> Result<()> {
    if !outcome.ok {
        let message = if outcome.message.is_empty() {
            "operation failed with no diagnostic output".to_string()
        } else {
            outcome.message
        };
        return Err(anyhow!(message));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "status": "ok",
            "message": if outcome.message.is_empty() { "done" } else { outcome.message.as_str() },
            "finished": now_rfc3339(),
        }))?
    );
    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("gsbatch.toml");
    if default.exists() { Some(default) } else { None }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file {
        let path = if cfg.logging.file_path.is_empty() {
            PathBuf::from("gsbatch.log")
        } else {
            PathBuf::from(&cfg.logging.file_path)
        };
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}
