use std::collections::HashSet;
use std::time::{Duration, Instant};

use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, info, warn};

use crate::pdf::{decode_text, deref, resolve_page, Pdf};

use super::classify::TitlePattern;

/// A single bookmark, flattened out of the outline tree.
///
/// Ids are assigned in preorder starting at 1, so sorting by id reproduces
/// the document's own outline order. `parent` is the id of the nearest
/// enclosing bookmark; root-level bookmarks have none.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OutlineNode {
    pub id: u32,
    pub title: String,
    /// 1-based target page, if the destination resolved and is in range.
    pub page: Option<u32>,
    /// Nesting depth; root entries are level 0.
    pub level: u32,
    pub parent: Option<u32>,
    pub valid: bool,
    /// Set by [`classify_outline`](super::classify_outline); never set for
    /// invalid nodes.
    pub pattern: Option<TitlePattern>,
}

/// How outline extraction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum OutlineStatus {
    /// The outline was walked; nodes may still carry per-entry errors.
    Parsed,
    /// The document has no outline.
    Missing,
    /// The outline exists but its structure could not be read.
    Damaged,
}

/// Statistics from one extraction pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OutlineStats {
    pub total_nodes: usize,
    pub valid_nodes: usize,
    pub total_pages: u32,
    pub elapsed: Duration,
    /// Count of recoverable per-entry failures (unresolvable destinations,
    /// out-of-range pages, unreadable items).
    pub error_count: usize,
    pub diagnostic: Option<String>,
    pub status: OutlineStatus,
}

/// Extraction result: preorder node list plus statistics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Outline {
    pub nodes: Vec<OutlineNode>,
    pub stats: OutlineStats,
}

impl Outline {
    pub fn has_bookmarks(&self) -> bool {
        !self.nodes.is_empty()
    }
}

/// Extract a document's bookmark outline.
///
/// This never fails: a document without an outline yields
/// [`OutlineStatus::Missing`], a structurally unreadable outline yields
/// [`OutlineStatus::Damaged`] with a diagnostic, and individual corrupt
/// entries are skipped while their siblings still parse.
///
/// # Example
///
/// ```no_run
/// use cleave::{extract_outline, Pdf};
///
/// let pdf = Pdf::open("manual.pdf")?;
/// let outline = extract_outline(&pdf);
/// for node in &outline.nodes {
///     println!("{}{}", "  ".repeat(node.level as usize), node.title);
/// }
/// # Ok::<(), cleave::Error>(())
/// ```
pub fn extract_outline(pdf: &Pdf) -> Outline {
    let started = Instant::now();
    let total_pages = pdf.page_count();

    let first = match outline_first(pdf) {
        RootLookup::First(id) => id,
        RootLookup::Missing => {
            info!(path = %pdf.path().display(), "document has no outline");
            return empty_outline(total_pages, started, OutlineStatus::Missing, None);
        }
        RootLookup::Damaged(diagnostic) => {
            warn!(path = %pdf.path().display(), %diagnostic, "outline unreadable");
            return empty_outline(total_pages, started, OutlineStatus::Damaged, Some(diagnostic));
        }
    };

    let mut walker = Walker {
        pdf,
        total_pages,
        nodes: Vec::new(),
        error_count: 0,
        seen: HashSet::new(),
    };
    walker.walk_level(first, 0, None);

    let Walker {
        nodes, error_count, ..
    } = walker;

    if nodes.is_empty() && error_count > 0 {
        let diagnostic = "outline present but no entry could be read".to_string();
        warn!(path = %pdf.path().display(), %diagnostic, "outline unreadable");
        return empty_outline(total_pages, started, OutlineStatus::Damaged, Some(diagnostic));
    }

    let valid_nodes = nodes.iter().filter(|node| node.valid).count();
    let elapsed = started.elapsed();
    info!(
        path = %pdf.path().display(),
        total = nodes.len(),
        valid = valid_nodes,
        errors = error_count,
        ?elapsed,
        "outline parsed"
    );

    Outline {
        stats: OutlineStats {
            total_nodes: nodes.len(),
            valid_nodes,
            total_pages,
            elapsed,
            error_count,
            diagnostic: None,
            status: OutlineStatus::Parsed,
        },
        nodes,
    }
}

fn empty_outline(
    total_pages: u32,
    started: Instant,
    status: OutlineStatus,
    diagnostic: Option<String>,
) -> Outline {
    Outline {
        nodes: Vec::new(),
        stats: OutlineStats {
            total_nodes: 0,
            valid_nodes: 0,
            total_pages,
            elapsed: started.elapsed(),
            error_count: 0,
            diagnostic,
            status,
        },
    }
}

enum RootLookup {
    First(ObjectId),
    Missing,
    Damaged(String),
}

/// Find the first top-level outline item, if any.
fn outline_first(pdf: &Pdf) -> RootLookup {
    let catalog = match pdf.inner().catalog() {
        Ok(catalog) => catalog,
        Err(e) => return RootLookup::Damaged(format!("document catalog unreadable: {e}")),
    };
    let outlines = match catalog.get(b"Outlines") {
        Ok(outlines) => outlines,
        Err(_) => return RootLookup::Missing,
    };
    let root = match outlines {
        Object::Reference(id) => match pdf.inner().get_object(*id).and_then(|o| o.as_dict()) {
            Ok(dict) => dict,
            Err(e) => return RootLookup::Damaged(format!("outline root unreadable: {e}")),
        },
        Object::Dictionary(dict) => dict,
        _ => return RootLookup::Damaged("outline root is not a dictionary".to_string()),
    };
    match root.get(b"First").and_then(|o| o.as_reference()) {
        Ok(id) => RootLookup::First(id),
        // An outline dictionary with no children counts as no bookmarks.
        Err(_) => RootLookup::Missing,
    }
}

struct Walker<'a> {
    pdf: &'a Pdf,
    total_pages: u32,
    nodes: Vec<OutlineNode>,
    error_count: usize,
    seen: HashSet<ObjectId>,
}

impl Walker<'_> {
    /// Walk one sibling chain, recursing into children.
    fn walk_level(&mut self, first: ObjectId, level: u32, parent: Option<u32>) {
        let mut current = Some(first);
        while let Some(id) = current {
            if !self.seen.insert(id) {
                warn!(object = ?id, "cycle in outline, abandoning chain");
                self.error_count += 1;
                return;
            }
            let dict = match self.pdf.inner().get_object(id).and_then(|o| o.as_dict()) {
                Ok(dict) => dict,
                Err(e) => {
                    // Without the dictionary there is no /Next to follow.
                    warn!(object = ?id, error = %e, "unreadable outline item, abandoning chain");
                    self.error_count += 1;
                    return;
                }
            };

            let node_id = self.visit_item(dict, level, parent);

            if let Ok(child) = dict.get(b"First").and_then(|o| o.as_reference()) {
                self.walk_level(child, level + 1, Some(node_id));
            }
            current = dict.get(b"Next").and_then(|o| o.as_reference()).ok();
        }
    }

    /// Record one destination entry, tolerating a broken destination.
    fn visit_item(&mut self, dict: &Dictionary, level: u32, parent: Option<u32>) -> u32 {
        let id = self.nodes.len() as u32 + 1;
        let title = item_title(self.pdf, dict);

        let mut page = match resolve_page(self.pdf, dict) {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(title = %title, error = %e, "could not resolve bookmark destination");
                self.error_count += 1;
                None
            }
        };

        // Known off-by-one sources resolve the first page as 0.
        if page == Some(0) {
            warn!(title = %title, "bookmark resolved to page 0, correcting to page 1");
            page = Some(1);
        }

        if let Some(p) = page {
            if p > self.total_pages {
                warn!(
                    title = %title,
                    page = p,
                    total_pages = self.total_pages,
                    "bookmark page out of range"
                );
                self.error_count += 1;
                page = None;
            }
        }

        let valid = page.is_some();
        debug!(id, level, title = %title, ?page, "parsed bookmark");
        self.nodes.push(OutlineNode {
            id,
            title,
            page,
            level,
            parent,
            valid,
            pattern: None,
        });
        id
    }
}

/// Resolve a display title. Missing or non-string titles become empty.
fn item_title(pdf: &Pdf, dict: &Dictionary) -> String {
    match dict.get(b"Title") {
        Ok(title) => match deref(pdf, title) {
            Object::String(bytes, _) => decode_text(bytes).trim().to_string(),
            _ => String::new(),
        },
        Err(_) => String::new(),
    }
}
