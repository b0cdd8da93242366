//! Validation of split points into a page-range plan.

use tracing::debug;

use crate::error::{Error, Result};

/// One contiguous page range of a split plan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SplitRange {
    /// 1-based position within the plan.
    pub index: usize,
    pub start_page: u32,
    pub end_page: u32,
}

impl SplitRange {
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }

    /// Output filename for this range.
    ///
    /// A usable label yields `<label>_pages-<start>-<end>.pdf`; otherwise
    /// the fallback `part-<index>_pages-<start>-<end>.pdf`. Single-page
    /// ranges use `page-<start>`.
    pub fn output_name(&self, label: Option<&str>) -> String {
        let pages = if self.start_page == self.end_page {
            format!("page-{}", self.start_page)
        } else {
            format!("pages-{}-{}", self.start_page, self.end_page)
        };
        match label.map(sanitize_label).filter(|base| !base.is_empty()) {
            Some(base) => format!("{base}_{pages}.pdf"),
            None => format!("part-{:02}_{pages}.pdf", self.index),
        }
    }
}

/// A validated, normalized split plan.
///
/// The ranges partition `[1, total_pages]` with no gaps or overlaps, in
/// ascending page order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SplitPlan {
    /// Normalized split points: deduplicated, ascending, starting at 1.
    pub points: Vec<u32>,
    pub total_pages: u32,
    pub ranges: Vec<SplitRange>,
}

/// A would-be output part, computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct PartPreview {
    pub index: usize,
    pub filename: String,
    pub start_page: u32,
    pub end_page: u32,
    pub page_count: u32,
}

impl SplitPlan {
    /// Preview the parts this plan would produce.
    pub fn preview(&self, labels: Option<&[String]>) -> Vec<PartPreview> {
        self.ranges
            .iter()
            .map(|range| {
                let label = labels
                    .and_then(|labels| labels.get(range.index - 1))
                    .map(String::as_str);
                PartPreview {
                    index: range.index,
                    filename: range.output_name(label),
                    start_page: range.start_page,
                    end_page: range.end_page,
                    page_count: range.page_count(),
                }
            })
            .collect()
    }
}

/// Validate and normalize split points, then derive the page ranges.
///
/// Points are deduplicated and sorted ascending; page 1 is inserted as the
/// first point when absent so the plan always covers the whole document.
/// An empty candidate set or any point outside `[1, total_pages]` is
/// rejected with the offending value.
///
/// # Example
///
/// ```
/// use cleave::plan_split;
///
/// let plan = plan_split(&[5], 10)?;
/// assert_eq!(plan.points, vec![1, 5]);
/// assert_eq!(plan.ranges.len(), 2);
/// # Ok::<(), cleave::Error>(())
/// ```
pub fn plan_split(points: &[u32], total_pages: u32) -> Result<SplitPlan> {
    if points.is_empty() {
        return Err(Error::EmptySplitPoints);
    }
    for &point in points {
        if point < 1 || point > total_pages {
            return Err(Error::SplitPointOutOfRange { point, total_pages });
        }
    }

    let mut normalized = points.to_vec();
    normalized.sort_unstable();
    normalized.dedup();
    if normalized.first() != Some(&1) {
        debug!("inserting page 1 as the first split point");
        normalized.insert(0, 1);
    }

    let mut ranges = Vec::with_capacity(normalized.len());
    for (i, &start) in normalized.iter().enumerate() {
        let end = match normalized.get(i + 1) {
            Some(&next) => next - 1,
            None => total_pages,
        };
        // Degenerate duplicate input produces an inverted range; skip it
        // rather than emitting an empty part.
        if start > end {
            continue;
        }
        ranges.push(SplitRange {
            index: ranges.len() + 1,
            start_page: start,
            end_page: end,
        });
    }

    debug!(
        points = ?normalized,
        total_pages,
        parts = ranges.len(),
        "split plan ready"
    );
    Ok(SplitPlan {
        points: normalized,
        total_pages,
        ranges,
    })
}

/// Reduce a label to filesystem-safe characters.
///
/// Alphanumerics (any script), dashes and underscores are kept; every other
/// run of characters collapses to a single underscore. Capped at 50
/// characters.
fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_sep = false;
    for c in label.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out.chars().take(50).collect()
}
