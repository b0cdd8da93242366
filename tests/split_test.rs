mod common;

use common::{blank_doc, save_to_temp};

use cleave::{plan_split, split_pdf, split_pdf_to_temp, Error, Pdf, ResourceTracker};

#[test]
fn test_split_page_counts_sum_to_total() {
    let (mut doc, _) = blank_doc(10);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");
    let source_bytes = std::fs::metadata(file.path()).expect("stat fixture").len();
    assert_eq!(pdf.byte_size(), source_bytes);

    let plan = plan_split(&[1, 5], pdf.page_count()).expect("plan");
    let out = tempfile::tempdir().expect("output dir");
    let report = split_pdf(&pdf, &plan, None, out.path()).expect("split");

    assert_eq!(report.total_parts, 2);
    assert_eq!(report.parts[0].page_count, 4);
    assert_eq!(report.parts[1].page_count, 6);
    assert_eq!(
        report.parts.iter().map(|p| p.page_count).sum::<u32>(),
        pdf.page_count()
    );
    assert_eq!(report.parts[0].filename, "part-01_pages-1-4.pdf");
    assert_eq!(report.parts[1].filename, "part-02_pages-5-10.pdf");
    assert!(report.parts.iter().all(|p| p.byte_size > 0));
    assert!(report.skipped_pages.is_empty());
    assert!(report.skipped_ranges.is_empty());
    assert!((report.average_pages - 5.0).abs() < 1e-9);

    // The written parts are valid PDFs with the planned page counts
    let part = Pdf::open(&report.parts[0].path).expect("reopen part");
    assert_eq!(part.page_count(), 4);
    let part = Pdf::open(&report.parts[1].path).expect("reopen part");
    assert_eq!(part.page_count(), 6);
}

#[test]
fn test_split_normalizes_missing_first_page() {
    let (mut doc, _) = blank_doc(10);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");

    let plan = plan_split(&[5], pdf.page_count()).expect("plan");
    let out = tempfile::tempdir().expect("output dir");
    let report = split_pdf(&pdf, &plan, None, out.path()).expect("split");

    assert_eq!(report.total_parts, 2);
    assert_eq!(report.parts[0].start_page, 1);
    assert_eq!(report.parts[0].end_page, 4);
    assert_eq!(report.parts[1].start_page, 5);
    assert_eq!(report.parts[1].end_page, 10);
}

#[test]
fn test_labels_drive_filenames() {
    let (mut doc, _) = blank_doc(6);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");

    let plan = plan_split(&[1, 4], pdf.page_count()).expect("plan");
    let labels = vec!["Front Matter".to_string(), "Chapter 1".to_string()];
    let out = tempfile::tempdir().expect("output dir");
    let report = split_pdf(&pdf, &plan, Some(&labels), out.path()).expect("split");

    assert_eq!(report.parts[0].filename, "Front_Matter_pages-1-3.pdf");
    assert_eq!(report.parts[1].filename, "Chapter_1_pages-4-6.pdf");
}

#[test]
fn test_single_point_copies_whole_document() {
    let (mut doc, _) = blank_doc(4);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");

    let plan = plan_split(&[1], pdf.page_count()).expect("plan");
    let out = tempfile::tempdir().expect("output dir");
    let report = split_pdf(&pdf, &plan, None, out.path()).expect("split");

    assert_eq!(report.total_parts, 1);
    let part = Pdf::open(&report.parts[0].path).expect("reopen part");
    assert_eq!(part.page_count(), 4);
}

#[test]
fn test_plan_rejects_bad_points_before_any_io() {
    let (mut doc, _) = blank_doc(4);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");

    assert!(matches!(
        plan_split(&[], pdf.page_count()),
        Err(Error::EmptySplitPoints)
    ));
    assert!(matches!(
        plan_split(&[9], pdf.page_count()),
        Err(Error::SplitPointOutOfRange { point: 9, .. })
    ));
}

#[test]
fn test_split_to_temp_registers_and_evicts() {
    let (mut doc, _) = blank_doc(10);
    let file = save_to_temp(&mut doc);
    let pdf = Pdf::open(file.path()).expect("open fixture");

    let plan = plan_split(&[1, 5], pdf.page_count()).expect("plan");
    let tracker = ResourceTracker::new();
    let report =
        split_pdf_to_temp(&pdf, &plan, None, &tracker, "job-1", 60).expect("split to temp");

    assert!(report.output_dir.exists());
    let stats = tracker.stats();
    assert_eq!(stats.dir_count, 1);
    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.contexts, vec!["job-1".to_string()]);

    let removed = tracker.evict_context("job-1");
    assert_eq!(removed, 3);
    assert!(!report.output_dir.exists());
    let stats = tracker.stats();
    assert_eq!(stats.file_count + stats.dir_count, 0);
}

#[test]
fn test_open_rejects_missing_and_empty_documents() {
    match Pdf::open("/nonexistent/never.pdf") {
        Err(Error::DocumentNotFound(path)) => {
            assert_eq!(path, std::path::PathBuf::from("/nonexistent/never.pdf"));
        }
        other => panic!("expected not-found error, got {:?}", other.map(|_| ())),
    }

    let empty = tempfile::NamedTempFile::new().expect("temp file");
    assert!(matches!(
        Pdf::open(empty.path()),
        Err(Error::EmptyDocument(_))
    ));
}
