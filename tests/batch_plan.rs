use gsbatch::batch::{numbered_output, BatchOp, BatchPlan, PageRange};
use std::path::{Path, PathBuf};

fn out() -> PathBuf {
    PathBuf::from("out.pdf")
}

fn item_range(plan: &BatchPlan, i: usize) -> (u32, u32) {
    match plan.items[i].op {
        BatchOp::ExtractRange { first, last } => (first, last),
        _ => panic!("expected a page range item"),
    }
}

#[test]
fn single_range_uses_output_verbatim() {
    let plan = BatchPlan::explicit_ranges(&[PageRange { first: 2, last: 5 }], &out()).unwrap();
    assert!(!plan.is_empty());
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.items[0].output, Path::new("out.pdf"));
}

#[test]
fn multiple_ranges_are_numbered_in_order() {
    let ranges = [
        PageRange { first: 1, last: 3 },
        PageRange { first: 7, last: 7 },
        PageRange { first: 9, last: 12 },
    ];
    let plan = BatchPlan::explicit_ranges(&ranges, &out()).unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.items[0].output, Path::new("out_001.pdf"));
    assert_eq!(plan.items[1].output, Path::new("out_002.pdf"));
    assert_eq!(plan.items[2].output, Path::new("out_003.pdf"));
    assert_eq!(item_range(&plan, 1), (7, 7));
}

#[test]
fn inverted_range_is_rejected() {
    let err = BatchPlan::explicit_ranges(&[PageRange { first: 5, last: 2 }], &out()).unwrap_err();
    assert!(err.to_string().contains("first page 5"));
}

#[test]
fn zero_page_is_rejected() {
    assert!(BatchPlan::explicit_ranges(&[PageRange { first: 0, last: 2 }], &out()).is_err());
}

#[test]
fn every_n_covers_all_pages_in_disjoint_windows() {
    let plan = BatchPlan::every_n_pages(3, 10, &out()).unwrap();
    assert_eq!(plan.len(), 4);
    assert_eq!(item_range(&plan, 0), (1, 3));
    assert_eq!(item_range(&plan, 1), (4, 6));
    assert_eq!(item_range(&plan, 2), (7, 9));
    assert_eq!(item_range(&plan, 3), (10, 10));
    assert_eq!(plan.items[0].output, Path::new("out_001.pdf"));
    assert_eq!(plan.items[3].output, Path::new("out_004.pdf"));
}

#[test]
fn every_n_windows_are_contiguous_for_awkward_sizes() {
    let plan = BatchPlan::every_n_pages(7, 101, &out()).unwrap();
    assert_eq!(plan.len(), 101u32.div_ceil(7) as usize);
    let mut next = 1;
    for i in 0..plan.len() {
        let (first, last) = item_range(&plan, i);
        assert_eq!(first, next);
        assert!(last >= first);
        next = last + 1;
    }
    assert_eq!(next, 102);
}

#[test]
fn every_n_rejects_zero_n_and_unknown_page_count() {
    assert!(BatchPlan::every_n_pages(0, 10, &out()).is_err());
    assert!(BatchPlan::every_n_pages(3, 0, &out()).is_err());
}

#[test]
fn one_page_per_file_enumerates_every_page() {
    let plan = BatchPlan::one_page_per_file(3, &out()).unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(item_range(&plan, 0), (1, 1));
    assert_eq!(item_range(&plan, 2), (3, 3));
}

#[test]
fn image_groups_split_with_short_tail() {
    let images: Vec<PathBuf> = (1..=7).map(|i| PathBuf::from(format!("{i}.png"))).collect();
    let plan = BatchPlan::image_groups(&images, 3, &out()).unwrap();
    assert_eq!(plan.len(), 3);
    let sizes: Vec<usize> = plan
        .items
        .iter()
        .map(|item| match &item.op {
            BatchOp::ImagesToPdf { inputs } => inputs.len(),
            _ => panic!("expected image item"),
        })
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(plan.items[0].output, Path::new("out_001.pdf"));
    assert_eq!(plan.items[2].output, Path::new("out_003.pdf"));
}

#[test]
fn image_group_of_zero_collapses_to_merge_all() {
    let images: Vec<PathBuf> = (1..=4).map(|i| PathBuf::from(format!("{i}.png"))).collect();
    let plan = BatchPlan::image_groups(&images, 0, &out()).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.items[0].output, Path::new("out.pdf"));
}

#[test]
fn image_group_covering_everything_collapses_to_merge_all() {
    let images: Vec<PathBuf> = (1..=4).map(|i| PathBuf::from(format!("{i}.png"))).collect();
    let plan = BatchPlan::image_groups(&images, 9, &out()).unwrap();
    assert_eq!(plan.len(), 1);
}

#[test]
fn numbered_output_keeps_directory_and_extension() {
    let p = numbered_output(Path::new("dir/report.pdf"), 12, 20);
    assert_eq!(p, Path::new("dir/report_012.pdf"));
}

#[test]
fn numbered_output_without_extension() {
    let p = numbered_output(Path::new("report"), 2, 3);
    assert_eq!(p, Path::new("report_002"));
}
