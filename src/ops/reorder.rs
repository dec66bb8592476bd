//! Rearrange the pages of a document.

use std::path::Path;

use crate::doc::{load_document, page_ids, save_document, select_pages};
use crate::error::{Result, ToolboxError};

/// What a reorder produced.
#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    /// Page count of the written document.
    pub total_pages: usize,
    /// Size of the written file in bytes.
    pub output_size: u64,
}

/// Write `src` to `dst` with its pages in `order`.
///
/// `order` must be a permutation of the document's 0-based page
/// indices: same length as the page count, every index present exactly
/// once. Dropping or duplicating pages is the splitter's job, not the
/// reorderer's.
///
/// # Errors
///
/// Returns [`ToolboxError::InvalidConfig`] when `order` is not a
/// permutation, or a load/save error.
pub fn reorder_pdf(
    src: &Path,
    dst: &Path,
    order: &[usize],
    password: Option<&str>,
) -> Result<ReorderOutcome> {
    let doc = load_document(src, password)?;
    let total = page_ids(&doc).len();

    if order.len() != total {
        return Err(ToolboxError::invalid_config(format!(
            "order lists {} pages but the document has {total}",
            order.len()
        )));
    }
    let mut seen = vec![false; total];
    for &idx in order {
        if idx >= total {
            return Err(ToolboxError::invalid_config(format!(
                "page index {} out of range (document has {total} pages)",
                idx + 1
            )));
        }
        if seen[idx] {
            return Err(ToolboxError::invalid_config(format!(
                "page {} appears more than once in the new order",
                idx + 1
            )));
        }
        seen[idx] = true;
    }

    let mut reordered = select_pages(&doc, order)?;
    let output_size = save_document(&mut reordered, dst)?;

    Ok(ReorderOutcome {
        total_pages: total,
        output_size,
    })
}
