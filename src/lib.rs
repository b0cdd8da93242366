//! # cleave
//!
//! A library for splitting PDF documents at page boundaries derived from
//! their bookmark outline, with lifetime management for the working files
//! the splits produce.
//!
//! ## Features
//!
//! - Extract a PDF's bookmark outline into a flat, preorder node list
//! - Classify bookmark titles against common sectioning patterns
//! - Validate split points into a gap-free page-range plan
//! - Write one output PDF per range, tolerating individual bad pages
//! - Track working files/directories by context and TTL, with bulk and
//!   expiry-driven cleanup
//!
//! ## Quick Start
//!
//! ```no_run
//! use cleave::{classify_outline, extract_outline, plan_split, split_pdf, Pdf};
//!
//! let pdf = Pdf::open("manual.pdf")?;
//!
//! // Find chapter boundaries from the bookmark outline
//! let mut outline = extract_outline(&pdf);
//! classify_outline(&mut outline.nodes);
//! let points: Vec<u32> = outline
//!     .nodes
//!     .iter()
//!     .filter(|node| node.pattern.is_some())
//!     .filter_map(|node| node.page)
//!     .collect();
//!
//! // Split the document at those pages
//! let plan = plan_split(&points, pdf.page_count())?;
//! let report = split_pdf(&pdf, &plan, None, std::path::Path::new("out"))?;
//! println!("wrote {} parts", report.total_parts);
//! # Ok::<(), cleave::Error>(())
//! ```
//!
//! ## Working Files
//!
//! Components that produce on-disk artifacts register them with a
//! [`ResourceTracker`] under a caller-chosen context string and a TTL in
//! minutes. A [`Sweeper`] thread removes expired entries on a fixed
//! interval; [`ResourceTracker::evict_context`] removes everything a
//! context produced in one call.

pub mod error;
pub mod outline;
pub mod pdf;
pub mod split;
pub mod track;

pub use error::{Error, Result};
pub use outline::{
    analyze_structure, classify_outline, extract_outline, match_title, ClassifyStats, Outline,
    OutlineNode, OutlineStats, OutlineStatus, StructureAnalysis, TitlePattern,
};
pub use pdf::Pdf;
pub use split::{
    plan_split, split_pdf, split_pdf_to_temp, PartFile, PartPreview, SplitPlan, SplitRange,
    SplitReport,
};
pub use track::{
    ResourceId, ResourceKind, ResourceTracker, Sweeper, TrackedResource, TrackerStats,
};
