//! Materialization of a split plan into output documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lopdf::Object;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pdf::Pdf;
use crate::track::ResourceTracker;

use super::plan::SplitPlan;

/// One written output document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct PartFile {
    pub index: usize,
    pub filename: String,
    pub path: PathBuf,
    pub start_page: u32,
    pub end_page: u32,
    /// Pages actually copied; may be less than the range span when
    /// individual pages were skipped.
    pub page_count: u32,
    pub byte_size: u64,
}

/// Summary of one split call.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SplitReport {
    pub parts: Vec<PartFile>,
    pub output_dir: PathBuf,
    pub total_parts: usize,
    pub total_bytes: u64,
    pub average_pages: f64,
    /// Pages that could not be copied, by 1-based number.
    pub skipped_pages: Vec<u32>,
    /// Range indexes that produced no readable pages and emitted no file.
    pub skipped_ranges: Vec<usize>,
    pub elapsed: Duration,
}

/// Write one output document per plan range into `output_dir`.
///
/// Pages are copied in original order and the source is never mutated. A
/// page that cannot be read is logged, recorded in the report, and skipped;
/// a range whose pages all fail emits no file and is recorded instead of
/// failing the call. Directory creation or write failures abort the whole
/// call.
///
/// `labels`, when given, are matched to ranges by position and drive the
/// output filenames.
pub fn split_pdf(
    pdf: &Pdf,
    plan: &SplitPlan,
    labels: Option<&[String]>,
    output_dir: &Path,
) -> Result<SplitReport> {
    let started = Instant::now();
    fs::create_dir_all(output_dir)?;

    info!(
        path = %pdf.path().display(),
        source_bytes = pdf.byte_size(),
        parts = plan.ranges.len(),
        output_dir = %output_dir.display(),
        "splitting document"
    );

    let total_pages = plan.total_pages;
    let mut parts = Vec::new();
    let mut skipped_pages = Vec::new();
    let mut skipped_ranges = Vec::new();

    for range in &plan.ranges {
        let mut keep = Vec::with_capacity(range.page_count() as usize);
        for page in range.start_page..=range.end_page {
            if pdf.page_readable(page) {
                keep.push(page);
            } else {
                warn!(page, part = range.index, "skipping unreadable page");
                skipped_pages.push(page);
            }
        }
        if keep.is_empty() {
            warn!(part = range.index, "no readable pages in range, skipping part");
            skipped_ranges.push(range.index);
            continue;
        }

        let label = labels
            .and_then(|labels| labels.get(range.index - 1))
            .map(String::as_str);
        let filename = range.output_name(label);
        let path = output_dir.join(&filename);

        let mut part = pdf.inner().clone();
        strip_navigation(&mut part);
        let delete: Vec<u32> = (1..=total_pages).filter(|p| !keep.contains(p)).collect();
        part.delete_pages(&delete);
        part.prune_objects();
        part.renumber_objects();
        part.compress();
        part.save(&path)?;

        let byte_size = fs::metadata(&path)?.len();
        debug!(
            filename = %filename,
            pages = keep.len(),
            byte_size,
            "wrote part"
        );
        parts.push(PartFile {
            index: range.index,
            filename,
            path,
            start_page: range.start_page,
            end_page: range.end_page,
            page_count: keep.len() as u32,
            byte_size,
        });
    }

    let total_bytes = parts.iter().map(|part| part.byte_size).sum();
    let pages_emitted: u32 = parts.iter().map(|part| part.page_count).sum();
    let average_pages = if parts.is_empty() {
        0.0
    } else {
        pages_emitted as f64 / parts.len() as f64
    };
    let elapsed = started.elapsed();

    info!(
        parts = parts.len(),
        total_bytes,
        ?elapsed,
        "split done"
    );

    Ok(SplitReport {
        total_parts: parts.len(),
        parts,
        output_dir: output_dir.to_path_buf(),
        total_bytes,
        average_pages,
        skipped_pages,
        skipped_ranges,
        elapsed,
    })
}

/// Split into a fresh working directory and register every artifact.
///
/// The directory and each part file are tracked under `context` with the
/// given TTL, so the caller can later remove everything with
/// [`ResourceTracker::evict_context`] or leave it to the expiry sweep. On a
/// fatal split error the partial directory is removed again so nothing
/// leaks.
pub fn split_pdf_to_temp(
    pdf: &Pdf,
    plan: &SplitPlan,
    labels: Option<&[String]>,
    tracker: &ResourceTracker,
    context: &str,
    ttl_minutes: u64,
) -> Result<SplitReport> {
    let dir = tempfile::Builder::new().prefix("pdf_split_").tempdir()?;
    let dir_path = dir.keep();
    let dir_id = tracker.register_directory(&dir_path, context, ttl_minutes);
    debug!(dir = %dir_path.display(), context, "created working directory");

    match split_pdf(pdf, plan, labels, &dir_path) {
        Ok(report) => {
            for part in &report.parts {
                tracker.register_file(&part.path, context, ttl_minutes);
            }
            Ok(report)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&dir_path) {
                warn!(
                    dir = %dir_path.display(),
                    error = %cleanup,
                    "could not remove working directory after failed split"
                );
            }
            tracker.unregister(dir_id);
            Err(e)
        }
    }
}

/// Drop outline and named-destination tables from a part document.
///
/// Their entries point into the original page tree, most of which the part
/// no longer contains.
fn strip_navigation(doc: &mut lopdf::Document) {
    let catalog_id = match doc.trailer.get(b"Root").and_then(|o| o.as_reference()) {
        Ok(id) => id,
        Err(_) => return,
    };
    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
        catalog.remove(b"Outlines");
        catalog.remove(b"Names");
        catalog.remove(b"Dests");
    }
}
