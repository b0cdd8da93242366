//! Shared fixtures: PDFs synthesized in memory and written to temp files.
#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use tempfile::NamedTempFile;

/// Where a fixture bookmark points.
pub enum Target {
    /// Index into the fixture's page list.
    Page(usize),
    /// Raw 0-based integer page index written directly into the array.
    RawIndex(i64),
    /// Reference to an object that does not exist.
    Broken,
}

pub struct Node {
    pub title: String,
    /// Encode the title as UTF-16BE with BOM in hex string format.
    pub utf16_title: bool,
    pub target: Target,
    pub kids: Vec<Node>,
}

pub fn bm(title: &str, page: usize) -> Node {
    Node {
        title: title.to_string(),
        utf16_title: false,
        target: Target::Page(page),
        kids: Vec::new(),
    }
}

pub fn bm_nested(title: &str, page: usize, kids: Vec<Node>) -> Node {
    Node {
        title: title.to_string(),
        utf16_title: false,
        target: Target::Page(page),
        kids,
    }
}

pub fn bm_broken(title: &str) -> Node {
    Node {
        title: title.to_string(),
        utf16_title: false,
        target: Target::Broken,
        kids: Vec::new(),
    }
}

pub fn bm_raw(title: &str, index: i64) -> Node {
    Node {
        title: title.to_string(),
        utf16_title: false,
        target: Target::RawIndex(index),
        kids: Vec::new(),
    }
}

pub fn bm_utf16(title: &str, page: usize) -> Node {
    Node {
        title: title.to_string(),
        utf16_title: true,
        target: Target::Page(page),
        kids: Vec::new(),
    }
}

/// Build a document with `pages` empty pages. Returns the page object ids
/// in page order.
pub fn blank_doc(pages: usize) -> (Document, Vec<ObjectId>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    let mut page_ids = Vec::with_capacity(pages);
    for _ in 0..pages {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        kids.push(Object::Reference(page_id));
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    (doc, page_ids)
}

/// Set a key on the document catalog.
pub fn set_catalog<V: Into<Object>>(doc: &mut Document, key: &str, value: V) {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(|o| o.as_reference())
        .expect("fixture has a catalog");
    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
        catalog.set(key, value);
    }
}

/// Attach an outline tree to the document catalog.
pub fn attach_outline(doc: &mut Document, page_ids: &[ObjectId], items: &[Node]) {
    let outlines_id = doc.new_object_id();
    let (first, last) = build_level(doc, outlines_id, page_ids, items);
    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => first,
            "Last" => last,
            "Count" => items.len() as i64,
        }),
    );
    set_catalog(doc, "Outlines", outlines_id);
}

fn build_level(
    doc: &mut Document,
    parent: ObjectId,
    page_ids: &[ObjectId],
    items: &[Node],
) -> (ObjectId, ObjectId) {
    assert!(!items.is_empty(), "outline level needs at least one item");
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let title = if item.utf16_title {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in item.title.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            Object::String(bytes, StringFormat::Hexadecimal)
        } else {
            Object::string_literal(item.title.clone())
        };

        let mut dict = dictionary! {
            "Title" => title,
            "Parent" => parent,
        };

        let first_element: Object = match item.target {
            Target::Page(index) => page_ids[index].into(),
            Target::RawIndex(index) => Object::Integer(index),
            Target::Broken => Object::Reference((9999, 0)),
        };
        dict.set(
            "Dest",
            vec![
                first_element,
                "XYZ".into(),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        );

        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }
        if !item.kids.is_empty() {
            let (first, last) = build_level(doc, ids[i], page_ids, &item.kids);
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.kids.len() as i64);
        }

        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    (ids[0], *ids.last().expect("non-empty level"))
}

/// Write the document to a named temp file, keeping it alive for the test.
pub fn save_to_temp(doc: &mut Document) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("create temp file");
    doc.save(file.path()).expect("save fixture PDF");
    file
}
