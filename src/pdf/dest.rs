//! Resolution of outline destinations to page numbers.
//!
//! An outline item points at its target page through one of several shapes:
//! an explicit `/Dest` array, a `/A` GoTo action wrapping one, or a named
//! destination resolved through the catalog's `/Dests` dictionary or the
//! `/Names` name tree.

use lopdf::{Dictionary, Object};

use crate::error::{Error, Result};

use super::document::Pdf;

/// Reference chains longer than this are treated as corrupt.
const MAX_DEREF: usize = 8;

const MAX_TREE_DEPTH: usize = 32;

/// Follow indirect references until a direct object is reached.
///
/// Unresolvable references are returned as-is so the caller's type checks
/// produce the error.
pub(crate) fn deref<'a>(pdf: &'a Pdf, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_DEREF {
        match current {
            Object::Reference(id) => match pdf.inner().get_object(*id) {
                Ok(target) => current = target,
                Err(_) => break,
            },
            _ => break,
        }
    }
    current
}

/// Resolve an outline item's destination to a 1-based page number.
///
/// A result of 0 is possible for degenerate integer destinations; the
/// extractor is responsible for the page-0 compatibility correction.
pub(crate) fn resolve_page(pdf: &Pdf, item: &Dictionary) -> Result<u32> {
    let target = dest_object(pdf, item)?;
    match target {
        Object::Name(name) => page_from_named(pdf, name),
        Object::String(name, _) => page_from_named(pdf, name),
        other => page_from_value(pdf, other),
    }
}

/// Pull the destination object out of an outline item.
fn dest_object<'a>(pdf: &'a Pdf, item: &'a Dictionary) -> Result<&'a Object> {
    if let Ok(dest) = item.get(b"Dest") {
        return Ok(deref(pdf, dest));
    }
    if let Ok(action) = item.get(b"A") {
        let action = deref(pdf, action)
            .as_dict()
            .map_err(|_| Error::Destination("action is not a dictionary".into()))?;
        if let Ok(kind) = action.get(b"S") {
            if let Object::Name(name) = deref(pdf, kind) {
                if name.as_slice() != b"GoTo" {
                    return Err(Error::Destination(format!(
                        "unsupported action type /{}",
                        String::from_utf8_lossy(name)
                    )));
                }
            }
        }
        let target = action
            .get(b"D")
            .map_err(|_| Error::Destination("GoTo action without /D".into()))?;
        return Ok(deref(pdf, target));
    }
    Err(Error::Destination("outline item has no /Dest or /A".into()))
}

/// Resolve a destination value: either a `[page ...]` array or a dictionary
/// wrapping one under `/D`.
fn page_from_value(pdf: &Pdf, value: &Object) -> Result<u32> {
    match value {
        Object::Array(parts) => page_from_array(pdf, parts),
        Object::Dictionary(dict) => {
            let inner = dict
                .get(b"D")
                .map_err(|_| Error::Destination("destination dictionary without /D".into()))?;
            match deref(pdf, inner) {
                Object::Array(parts) => page_from_array(pdf, parts),
                _ => Err(Error::Destination(
                    "destination dictionary /D is not an array".into(),
                )),
            }
        }
        _ => Err(Error::Destination("unsupported destination shape".into())),
    }
}

fn page_from_array(pdf: &Pdf, parts: &[Object]) -> Result<u32> {
    let first = parts
        .first()
        .ok_or_else(|| Error::Destination("empty destination array".into()))?;
    match first {
        Object::Reference(id) => pdf.page_number(*id).ok_or_else(|| {
            Error::Destination(format!(
                "destination page object {} {} is not in the page tree",
                id.0, id.1
            ))
        }),
        // Some generators write a 0-based page index instead of a reference.
        Object::Integer(index) => {
            let page = index + 1;
            if page < 0 {
                return Err(Error::Destination(format!("negative page index {index}")));
            }
            Ok(page as u32)
        }
        _ => Err(Error::Destination(
            "destination array does not begin with a page".into(),
        )),
    }
}

fn page_from_named(pdf: &Pdf, name: &[u8]) -> Result<u32> {
    let value = lookup_named(pdf, name)?;
    page_from_value(pdf, deref(pdf, value))
}

/// Look a named destination up in the catalog.
///
/// PDF 1.1 files keep a plain `/Dests` dictionary on the catalog; later
/// files use a name tree under `/Names` -> `/Dests`.
fn lookup_named<'a>(pdf: &'a Pdf, name: &[u8]) -> Result<&'a Object> {
    let catalog = pdf.inner().catalog()?;

    if let Ok(dests) = catalog.get(b"Dests") {
        if let Object::Dictionary(dict) = deref(pdf, dests) {
            if let Ok(value) = dict.get(name) {
                return Ok(value);
            }
        }
    }

    if let Ok(names) = catalog.get(b"Names") {
        if let Object::Dictionary(names) = deref(pdf, names) {
            if let Ok(tree) = names.get(b"Dests") {
                if let Some(value) = search_name_tree(pdf, deref(pdf, tree), name, 0) {
                    return Ok(value);
                }
            }
        }
    }

    Err(Error::Destination(format!(
        "named destination {:?} not found",
        String::from_utf8_lossy(name)
    )))
}

fn search_name_tree<'a>(
    pdf: &'a Pdf,
    node: &'a Object,
    name: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_TREE_DEPTH {
        return None;
    }
    let dict = node.as_dict().ok()?;

    if let Ok(entries) = dict.get(b"Names") {
        if let Object::Array(pairs) = deref(pdf, entries) {
            for pair in pairs.chunks_exact(2) {
                if let Object::String(key, _) = deref(pdf, &pair[0]) {
                    if key.as_slice() == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }
    }

    if let Ok(kids) = dict.get(b"Kids") {
        if let Object::Array(kids) = deref(pdf, kids) {
            for kid in kids {
                if let Some(found) = search_name_tree(pdf, deref(pdf, kid), name, depth + 1) {
                    return Some(found);
                }
            }
        }
    }

    None
}
