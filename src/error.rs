//! Error types for cleave operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening, planning, or splitting a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("document is empty: {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("document has no pages: {}", .0.display())]
    NoPages(PathBuf),

    #[error("no split points supplied")]
    EmptySplitPoints,

    #[error("split point {point} outside page range 1-{total_pages}")]
    SplitPointOutOfRange { point: u32, total_pages: u32 },

    #[error("invalid split point: {0:?}")]
    InvalidSplitPoint(String),

    #[error("unresolvable destination: {0}")]
    Destination(String),
}

pub type Result<T> = std::result::Result<T, Error>;
