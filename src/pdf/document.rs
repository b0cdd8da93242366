use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Object, ObjectId};
use tracing::debug;

use crate::error::{Error, Result};

/// An open, validated PDF document.
///
/// Opening validates that the file exists, is non-empty, parses, and has at
/// least one page. The source document is never mutated; splitting works on
/// clones of the parsed object tree.
pub struct Pdf {
    doc: lopdf::Document,
    path: PathBuf,
    byte_size: u64,
    /// 1-based page number -> page object id
    pages: BTreeMap<u32, ObjectId>,
    /// page object id -> 1-based page number
    page_numbers: HashMap<ObjectId, u32>,
}

impl Pdf {
    /// Open a PDF file from disk.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cleave::Pdf;
    ///
    /// let pdf = Pdf::open("manual.pdf")?;
    /// println!("{} pages", pdf.page_count());
    /// # Ok::<(), cleave::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::DocumentNotFound(path));
        }
        let byte_size = fs::metadata(&path)?.len();
        if byte_size == 0 {
            return Err(Error::EmptyDocument(path));
        }

        let doc = lopdf::Document::load(&path)?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::NoPages(path));
        }
        let page_numbers = pages.iter().map(|(num, id)| (*id, *num)).collect();

        debug!(
            path = %path.display(),
            pages = pages.len(),
            byte_size,
            "opened document"
        );

        Ok(Self {
            doc,
            path,
            byte_size,
            pages,
            page_numbers,
        })
    }

    /// Total number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the source file in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub(crate) fn inner(&self) -> &lopdf::Document {
        &self.doc
    }

    /// Map a page object id back to its 1-based page number.
    pub(crate) fn page_number(&self, id: ObjectId) -> Option<u32> {
        self.page_numbers.get(&id).copied()
    }

    /// Whether the given 1-based page resolves to a readable page object.
    pub(crate) fn page_readable(&self, page: u32) -> bool {
        match self.pages.get(&page) {
            Some(id) => matches!(self.doc.get_object(*id), Ok(Object::Dictionary(_))),
            None => false,
        }
    }
}
