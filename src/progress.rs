use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on status text taken from a raw interpreter line.
pub const STATUS_TRUNCATE_CHARS: usize = 50;

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Page\s+(\d+)").expect("page marker regex"));

/// One progress observation. `total_pages == 0` means the total is unknown
/// and callers should not render a percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub current_page: u32,
    pub total_pages: u32,
    pub status: String,
}

/// Turns the interpreter's line-oriented output into `ProgressEvent`s.
///
/// Ghostscript announces page boundaries as lines starting with `Page N`.
/// Those advance `current_page`; any other non-empty line becomes a
/// status-only event so callers get liveness feedback between pages.
/// `current_page` never decreases within one invocation.
#[derive(Debug)]
pub struct PageTracker {
    total_pages: u32,
    current_page: u32,
}

impl PageTracker {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            current_page: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Observe one output line. Returns `None` for empty lines.
    ///
    /// A page marker with an unparsable number is demoted to an ordinary
    /// status line rather than treated as an error.
    pub fn observe(&mut self, line: &str) -> Option<ProgressEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(caps) = PAGE_MARKER.captures(line) {
            if let Ok(page) = caps[1].parse::<u32>() {
                self.current_page = self.current_page.max(page);
                return Some(self.event(format!("processing page {}", self.current_page)));
            }
        }

        Some(self.event(line.chars().take(STATUS_TRUNCATE_CHARS).collect()))
    }

    fn event(&self, status: String) -> ProgressEvent {
        ProgressEvent {
            current_page: self.current_page,
            total_pages: self.total_pages,
            status,
        }
    }
}
