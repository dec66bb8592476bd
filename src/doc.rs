//! Shared lopdf document helpers.
//!
//! All domain operations work on [`lopdf::Document`]; this module collects
//! the plumbing they share: loading with password handling, building a new
//! document from a subset of pages, and atomic saves (write to a temp path,
//! then rename).

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolboxError};

/// Load a PDF, decrypting it when the document reports encryption.
///
/// `password` defaults to the empty string, which opens documents that are
/// encrypted with owner-only restrictions.
///
/// # Errors
///
/// Returns [`ToolboxError::FileNotFound`] for a missing file,
/// [`ToolboxError::NotAPdf`] when the `%PDF-` magic is absent, and an
/// error if the file cannot be parsed or the password does not
/// authenticate.
pub fn load_document(path: &Path, password: Option<&str>) -> Result<Document> {
    if !path.is_file() {
        return Err(ToolboxError::file_not_found(path.to_path_buf()));
    }
    if !crate::paths::looks_like_pdf(path) {
        return Err(ToolboxError::not_a_pdf(path.to_path_buf(), "missing %PDF header"));
    }

    let mut doc = Document::load(path)
        .map_err(|e| ToolboxError::failed_to_load_pdf(path.to_path_buf(), e.to_string()))?;

    if doc.is_encrypted() {
        doc.decrypt(password.unwrap_or(""))
            .map_err(|_| ToolboxError::WrongPassword {
                path: path.to_path_buf(),
            })?;
    }

    Ok(doc)
}

/// Page object ids of a document, in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Resolve the root `Pages` node referenced from the catalog.
pub(crate) fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog = doc
        .catalog()
        .map_err(|e| ToolboxError::other(format!("Failed to get catalog: {e}")))?;

    catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| ToolboxError::other(format!("Failed to get pages reference: {e}")))
}

/// Look up an inheritable page attribute, walking `/Parent` references.
///
/// `/Resources`, `/MediaBox` and `/Rotate` may live on an ancestor Pages
/// node instead of the page itself.
pub(crate) fn inherited_attr(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    // Parent chains are short; the depth cap guards against reference cycles.
    for _ in 0..32 {
        let dict = doc.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Build a new document containing the given pages of `source`, in order.
///
/// Indices are 0-based positions in `source`'s page sequence and may repeat.
/// The result gets a flat page tree: every kept page is re-parented onto the
/// root Pages node, inheritable attributes are materialized onto the pages,
/// and unreachable objects are pruned.
///
/// # Errors
///
/// Returns an error if any index is out of range or the source page tree is
/// malformed.
pub fn select_pages(source: &Document, indices: &[usize]) -> Result<Document> {
    let source_pages = page_ids(source);
    let total = source_pages.len();

    for &idx in indices {
        if idx >= total {
            return Err(ToolboxError::operation_failed(
                "page selection",
                format!("page index {} out of range (document has {total} pages)", idx + 1),
            ));
        }
    }

    let mut doc = source.clone();
    let root_id = pages_root_id(&doc)?;
    let selected: Vec<ObjectId> = indices.iter().map(|&i| source_pages[i]).collect();

    // Materialize inheritable attributes before the old parent chain is cut.
    for &page_id in &selected {
        for key in [b"Resources".as_slice(), b"MediaBox", b"Rotate"] {
            let needs = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map(|d| !d.has(key))
                .unwrap_or(false);
            if needs {
                if let Some(value) = inherited_attr(source, page_id, key) {
                    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                        dict.set(key, value);
                    }
                }
            }
        }
    }

    for &page_id in &selected {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(root_id));
        }
    }

    let kids: Vec<Object> = selected.iter().map(|&id| Object::Reference(id)).collect();
    let count = kids.len() as i64;

    match doc.get_object_mut(root_id) {
        Ok(Object::Dictionary(dict)) => {
            dict.set("Kids", Object::Array(kids));
            dict.set("Count", Object::Integer(count));
        }
        _ => {
            return Err(ToolboxError::other("Pages object is not a dictionary"));
        }
    }

    doc.prune_objects();
    doc.renumber_objects();

    Ok(doc)
}

/// Save a document atomically: write to `<path>.tmp`, then rename.
///
/// Returns the size of the written file in bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be created, written, or renamed.
pub fn save_document(doc: &mut Document, path: &Path) -> Result<u64> {
    let tmp: PathBuf = path.with_extension("tmp");

    let file = std::fs::File::create(&tmp).map_err(|e| ToolboxError::FailedToWrite {
        path: tmp.clone(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::new(file);
    doc.save_to(&mut writer)
        .map_err(|e| ToolboxError::FailedToWrite {
            path: tmp.clone(),
            source: std::io::Error::other(e),
        })?;
    writer.flush().map_err(|e| ToolboxError::FailedToWrite {
        path: tmp.clone(),
        source: e,
    })?;
    drop(writer);

    std::fs::rename(&tmp, path).map_err(|e| ToolboxError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(std::fs::metadata(path).map(|m| m.len()).unwrap_or(0))
}

/// Build a minimal single-page document, used by tests and doc examples.
///
/// The page carries `text` in its content stream so outputs can be told
/// apart.
pub fn minimal_document(text: &str) -> Document {
    use lopdf::content::{Content, Operation};
    use lopdf::Stream;

    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new(
                "Tj",
                vec![Object::string_literal(text.as_bytes().to_vec())],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        content.encode().unwrap_or_default(),
    ));

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        (
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
        ),
    ]));

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

/// Build a minimal document with `count` pages, each carrying its 1-based
/// page number as text.
pub fn minimal_document_with_pages(count: usize) -> Document {
    use lopdf::content::{Content, Operation};
    use lopdf::Stream;

    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut kids = Vec::with_capacity(count);
    for page_number in 1..=count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(
                        format!("page {page_number}").into_bytes(),
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap_or_default(),
        ));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(count as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}
