use gsbatch::presets::ImageDevice;
use gsbatch::progress::ProgressEvent;
use gsbatch::runner::GsRunner;
use gsbatch::toolkit::Ghostscript;
use std::path::{Path, PathBuf};

/// A facade pointed at an executable that cannot exist. Validation failures
/// must surface before any launch is attempted, so a validation message (not
/// an exec error) proves nothing was spawned.
fn unlaunchable() -> Ghostscript {
    Ghostscript::new(GsRunner::with_executable(PathBuf::from(
        "/nonexistent/gs-binary",
    )))
}

#[test]
fn rasterize_rejects_zero_first_page_before_launch() {
    let out = unlaunchable().rasterize(
        Path::new("in.pdf"),
        Path::new("out.png"),
        ImageDevice::Png,
        150,
        Some(0),
        None,
        None,
    );
    assert!(!out.ok);
    assert_eq!(out.message, "page numbers start at 1");
}

#[test]
fn rasterize_rejects_zero_last_page_before_launch() {
    let out = unlaunchable().rasterize(
        Path::new("in.pdf"),
        Path::new("out.png"),
        ImageDevice::Png,
        150,
        None,
        Some(0),
        None,
    );
    assert!(!out.ok);
    assert_eq!(out.message, "page numbers start at 1");
}

#[test]
fn rasterize_rejects_inverted_range_before_launch() {
    let out = unlaunchable().rasterize(
        Path::new("in.pdf"),
        Path::new("out.png"),
        ImageDevice::Png,
        150,
        Some(5),
        Some(2),
        None,
    );
    assert!(!out.ok);
    assert_eq!(out.message, "invalid page range 5-2");
}

#[test]
fn extract_range_rejects_zero_first_page_before_launch() {
    let out = unlaunchable().extract_range(Path::new("in.pdf"), Path::new("out.pdf"), 0, 3, None);
    assert!(!out.ok);
    assert!(out.message.starts_with("invalid page range"));
}

#[cfg(unix)]
mod streaming {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in interpreter: a script emitting whatever output the scenario
    /// needs, driving the real streaming path end to end.
    fn fake_gs(dir: &Path, script: &str) -> Ghostscript {
        let path = dir.join("fake-gs.sh");
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        Ghostscript::new(GsRunner::with_executable(path))
    }

    #[test]
    fn extract_range_reports_range_relative_progress() {
        let dir = tempfile::tempdir().unwrap();
        let gs = fake_gs(
            dir.path(),
            "#!/bin/sh\nprintf 'Page 4\\nPage 5\\nPage 6\\n'\n",
        );

        let mut events: Vec<ProgressEvent> = Vec::new();
        let mut cb = |ev: ProgressEvent| events.push(ev);
        let out = gs.extract_range(
            Path::new("in.pdf"),
            &dir.path().join("out.pdf"),
            4,
            6,
            Some(&mut cb),
        );

        assert!(out.ok);
        // Absolute pages 4..6 arrive as 1..3 of 3.
        let pairs: Vec<(u32, u32)> = events
            .iter()
            .map(|e| (e.current_page, e.total_pages))
            .collect();
        assert_eq!(pairs, vec![(1, 3), (2, 3), (3, 3)]);
        let last = events.last().unwrap();
        assert_eq!(last.current_page, last.total_pages);
    }

    #[test]
    fn merge_progress_spans_the_sum_of_input_page_counts() {
        let dir = tempfile::tempdir().unwrap();
        // Silent invocations (page-count queries) get `-q` prepended; answer
        // those with a page count and everything else with page markers.
        let gs = fake_gs(
            dir.path(),
            "#!/bin/sh\n\
             if [ \"$1\" = \"-q\" ]; then printf '4\\n'; \
             else printf 'Page 1\\nPage 2\\n'; fi\n",
        );

        let mut events: Vec<ProgressEvent> = Vec::new();
        let mut cb = |ev: ProgressEvent| events.push(ev);
        let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
        let out = gs.merge(&inputs, &dir.path().join("merged.pdf"), Some(&mut cb));

        assert!(out.ok);
        assert!(!events.is_empty());
        // Two 4-page inputs: the whole job reports against 8, not 4-then-4.
        assert!(events.iter().all(|e| e.total_pages == 8));
        assert_eq!(events.last().unwrap().current_page, 2);
    }
}
