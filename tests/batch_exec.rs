use gsbatch::batch::{BatchItem, BatchPlan, PageRange};
use gsbatch::progress::ProgressEvent;
use gsbatch::toolkit::OpOutcome;
use std::path::PathBuf;

fn three_item_plan() -> BatchPlan {
    BatchPlan::one_page_per_file(3, &PathBuf::from("out.pdf")).unwrap()
}

#[test]
fn stops_at_first_failing_item_and_keeps_prior_output() {
    let dir = tempfile::tempdir().unwrap();
    let plan = BatchPlan::one_page_per_file(3, &dir.path().join("out.pdf")).unwrap();

    let mut executed = Vec::new();
    let result = plan.execute(
        &mut |item: &BatchItem| {
            executed.push(item.output.clone());
            if executed.len() == 2 {
                return OpOutcome::failure("item two exploded");
            }
            std::fs::write(&item.output, b"pdf").unwrap();
            OpOutcome::success("")
        },
        None,
    );

    assert!(!result.ok);
    assert_eq!(result.message, "item two exploded");
    // Item 1 ran and its output survives; item 3 never ran.
    assert_eq!(executed.len(), 2);
    assert!(dir.path().join("out_001.pdf").exists());
    assert!(!dir.path().join("out_003.pdf").exists());
}

#[test]
fn emits_one_aggregated_event_per_completed_item() {
    let plan = three_item_plan();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut cb = |ev: ProgressEvent| events.push(ev);

    let result = plan.execute(&mut |_| OpOutcome::success(""), Some(&mut cb));

    assert!(result.ok);
    let pairs: Vec<(u32, u32)> = events.iter().map(|e| (e.current_page, e.total_pages)).collect();
    assert_eq!(pairs, vec![(1, 3), (2, 3), (3, 3)]);
    assert!(events[0].status.contains("item 1/3"));
}

#[test]
fn failed_item_produces_no_event_for_itself() {
    let plan = three_item_plan();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut cb = |ev: ProgressEvent| events.push(ev);

    let mut calls = 0;
    let result = plan.execute(
        &mut |_| {
            calls += 1;
            if calls == 2 {
                OpOutcome::failure("boom")
            } else {
                OpOutcome::success("")
            }
        },
        Some(&mut cb),
    );

    assert!(!result.ok);
    assert_eq!(calls, 2);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].current_page, 1);
}

#[test]
fn success_reports_output_file_count() {
    let plan = BatchPlan::explicit_ranges(
        &[
            PageRange { first: 1, last: 2 },
            PageRange { first: 3, last: 4 },
        ],
        &PathBuf::from("out.pdf"),
    )
    .unwrap();

    let result = plan.execute(&mut |_| OpOutcome::success(""), None);
    assert!(result.ok);
    assert_eq!(result.message, "produced 2 output file(s)");
}
