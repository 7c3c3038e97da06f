use crate::config::Config;
use crate::op::CommandSpec;
use anyhow::{anyhow, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Outcome of one interpreter invocation. `raw_output` is the full captured
/// stream (stdout then stderr); callers extract page counts or diagnostics
/// from it.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub raw_output: String,
}

impl ExecutionResult {
    fn launch_failure(err: std::io::Error) -> Self {
        Self {
            succeeded: false,
            raw_output: err.to_string(),
        }
    }
}

/// Launches the Ghostscript executable. The executable path is resolved once
/// and treated as read-only state for the runner's lifetime.
pub struct GsRunner {
    executable: PathBuf,
}

impl GsRunner {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            executable: resolve_executable(&cfg.gs.executable)?,
        })
    }

    pub fn with_executable(executable: PathBuf) -> Self {
        Self { executable }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Silent mode: run to completion with `-q`, capturing all output. The
    /// default and fastest path, used whenever no progress observer exists.
    pub fn run_silent(&self, spec: &CommandSpec) -> ExecutionResult {
        debug!("gs silent: {:?}", spec.args);
        let output = Command::new(&spec.executable)
            .arg("-q")
            .args(&spec.args)
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(out) => {
                let mut raw = String::from_utf8_lossy(&out.stdout).into_owned();
                raw.push_str(&String::from_utf8_lossy(&out.stderr));
                ExecutionResult {
                    succeeded: out.status.success(),
                    raw_output: raw,
                }
            }
            Err(err) => ExecutionResult::launch_failure(err),
        }
    }

    /// Streaming mode: forward stdout line-by-line as lines arrive, then wait
    /// for exit. Stderr is drained on a thread so a chatty interpreter cannot
    /// deadlock on a full pipe; the accumulated capture matches silent mode.
    pub fn run_streaming(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(&str),
    ) -> ExecutionResult {
        debug!("gs streaming: {:?}", spec.args);
        let child = Command::new(&spec.executable)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match child {
            Ok(c) => c,
            Err(err) => return ExecutionResult::launch_failure(err),
        };

        let stderr_thread = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        let mut captured = String::new();
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        captured.push_str(&line);
                        captured.push('\n');
                        on_line(&line);
                    }
                    Err(_) => break,
                }
            }
        }

        let status = child.wait();
        if let Some(handle) = stderr_thread {
            if let Ok(tail) = handle.join() {
                captured.push_str(&tail);
            }
        }

        match status {
            Ok(status) => ExecutionResult {
                succeeded: status.success(),
                raw_output: captured,
            },
            Err(err) => ExecutionResult {
                succeeded: false,
                raw_output: err.to_string(),
            },
        }
    }
}

fn resolve_executable(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("GSBATCH_GS") {
            let p = expand_tilde(&env_val);
            if p.is_file() {
                return Ok(p);
            }
        }
        return find_ghostscript();
    }
    let p = expand_tilde(raw);
    if !p.is_file() {
        return Err(anyhow!(
            "configured gs.executable does not exist: {}",
            p.display()
        ));
    }
    Ok(p)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Search order: PATH first (`gs`, then the Windows console binaries), then
/// the standard Windows installer directories. Absence is fatal: there is
/// nothing useful this tool can do without the interpreter.
fn find_ghostscript() -> Result<PathBuf> {
    let names: &[&str] = if cfg!(windows) {
        &["gswin64c", "gswin32c", "gs"]
    } else {
        &["gs"]
    };
    for name in names {
        if let Some(p) = search_path(name) {
            debug!("found ghostscript on PATH: {}", p.display());
            return Ok(p);
        }
    }
    if let Some(p) = scan_windows_install_dirs() {
        debug!("found ghostscript in install dir: {}", p.display());
        return Ok(p);
    }
    Err(anyhow!(
        "Ghostscript not found. Download it from \
         https://ghostscript.com/releases/gsdnld.html and make sure `gs` \
         (or gswin64c.exe on Windows) is on your PATH."
    ))
}

fn search_path(name: &str) -> Option<PathBuf> {
    let suffix = if cfg!(windows) { ".exe" } else { "" };
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(format!("{name}{suffix}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Versioned install layout: `<root>\gs\gs10.03.1\bin\gswin64c.exe`. Newest
/// version (by name sort) wins.
fn scan_windows_install_dirs() -> Option<PathBuf> {
    if !cfg!(windows) {
        return None;
    }
    let mut roots = vec![
        PathBuf::from(r"C:\Program Files\gs"),
        PathBuf::from(r"C:\Program Files (x86)\gs"),
    ];
    if let Ok(profile) = std::env::var("USERPROFILE") {
        roots.push(PathBuf::from(profile).join("Downloads"));
    }

    for root in roots {
        let Ok(entries) = std::fs::read_dir(&root) else {
            continue;
        };
        let mut versions: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_dir()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("gs"))
            })
            .collect();
        versions.sort();
        for dir in versions.into_iter().rev() {
            for exe in ["gswin64c.exe", "gswin32c.exe"] {
                let candidate = dir.join("bin").join(exe);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}
