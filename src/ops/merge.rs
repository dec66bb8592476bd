//! Combine several PDFs into one document.

use std::path::{Path, PathBuf};

use lopdf::{Object, ObjectId};

use crate::doc::{self, load_document, page_ids, save_document};
use crate::error::{Result, ToolboxError};

/// What a successful merge produced.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Path of the merged document.
    pub output: PathBuf,
    /// How many input files went in.
    pub files_merged: usize,
    /// Page count of the merged document.
    pub total_pages: usize,
    /// Size of the merged file in bytes.
    pub output_size: u64,
}

/// Merge `inputs` into a single PDF at `output`, preserving input order.
///
/// The first document becomes the base; pages of every following
/// document are renumbered past the base's object ids, spliced into its
/// page tree, and re-parented onto its root `Pages` node. Inheritable
/// page attributes are materialized onto each imported page first so
/// nothing is lost when its original parent chain goes away.
///
/// `password` is tried on every encrypted input.
///
/// # Errors
///
/// Returns an error when fewer than two inputs are given, when any
/// input fails to load or decrypt, or when the output cannot be
/// written.
pub fn merge_pdfs(inputs: &[PathBuf], output: &Path, password: Option<&str>) -> Result<MergeOutcome> {
    if inputs.len() < 2 {
        return Err(ToolboxError::invalid_config(
            "merging needs at least two input files",
        ));
    }

    let mut merged = load_document(&inputs[0], password)?;

    for path in &inputs[1..] {
        let mut doc = load_document(path, password)?;
        materialize_inherited_attrs(&mut doc)?;

        doc.renumber_objects_with(merged.max_id + 1);
        merged.max_id = doc.max_id;

        let imported = page_ids(&doc);
        merged.objects.extend(doc.objects);

        append_pages(&mut merged, &imported)?;
    }

    let total_pages = merged.get_pages().len();
    set_page_count(&mut merged, total_pages)?;

    merged.prune_objects();
    merged.renumber_objects();

    let output_size = save_document(&mut merged, output)?;

    Ok(MergeOutcome {
        output: output.to_path_buf(),
        files_merged: inputs.len(),
        total_pages,
        output_size,
    })
}

/// Copy `/Resources`, `/MediaBox` and `/Rotate` down onto every page that
/// inherits them, so pages survive being re-parented into another tree.
fn materialize_inherited_attrs(doc: &mut lopdf::Document) -> Result<()> {
    for page_id in page_ids(doc) {
        let mut pulled: Vec<(&[u8], Object)> = Vec::new();
        {
            let page = doc
                .get_dictionary(page_id)
                .map_err(|e| ToolboxError::operation_failed("merge", e.to_string()))?;
            for key in [b"Resources".as_slice(), b"MediaBox", b"Rotate"] {
                if !page.has(key) {
                    if let Some(value) = doc::inherited_attr(doc, page_id, key) {
                        pulled.push((key, value));
                    }
                }
            }
        }
        if !pulled.is_empty() {
            if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
                for (key, value) in pulled {
                    page.set(key, value);
                }
            }
        }
    }
    Ok(())
}

/// Append `pages` to the root page tree of `merged` and re-parent them.
fn append_pages(merged: &mut lopdf::Document, pages: &[ObjectId]) -> Result<()> {
    let root_id = doc::pages_root_id(merged)?;

    for &page_id in pages {
        if let Ok(Object::Dictionary(dict)) = merged.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(root_id));
        }
    }

    match merged.get_object_mut(root_id) {
        Ok(Object::Dictionary(dict)) => {
            let kids = dict
                .get_mut(b"Kids")
                .and_then(Object::as_array_mut)
                .map_err(|e| ToolboxError::operation_failed("merge", e.to_string()))?;
            kids.extend(pages.iter().map(|&id| Object::Reference(id)));
            Ok(())
        }
        _ => Err(ToolboxError::other("Pages object is not a dictionary")),
    }
}

fn set_page_count(merged: &mut lopdf::Document, count: usize) -> Result<()> {
    let root_id = doc::pages_root_id(merged)?;
    match merged.get_object_mut(root_id) {
        Ok(Object::Dictionary(dict)) => {
            dict.set("Count", Object::Integer(count as i64));
            Ok(())
        }
        _ => Err(ToolboxError::other("Pages object is not a dictionary")),
    }
}
