//! Rotate pages in place.

use std::path::Path;

use lopdf::Object;

use crate::doc::{self, load_document, page_ids, save_document};
use crate::error::{Result, ToolboxError};

/// What a rotation produced.
#[derive(Debug, Clone)]
pub struct RotateOutcome {
    /// How many pages had their `/Rotate` entry updated.
    pub pages_rotated: usize,
    /// Size of the written file in bytes.
    pub output_size: u64,
}

/// Rotate pages of `src` by `degrees` clockwise and write the result to
/// `dst`.
///
/// `degrees` must be 90, 180 or 270. `pages` selects 0-based page
/// indices; `None` rotates every page. The rotation is additive: a page
/// already carrying `/Rotate 90` rotated by 90 ends up at 180.
///
/// # Errors
///
/// Returns an error for an unsupported angle, an out-of-range page
/// index, or a document that fails to load or save.
pub fn rotate_pdf(
    src: &Path,
    dst: &Path,
    degrees: i64,
    pages: Option<&[usize]>,
    password: Option<&str>,
) -> Result<RotateOutcome> {
    if !matches!(degrees, 90 | 180 | 270) {
        return Err(ToolboxError::invalid_config(format!(
            "rotation must be 90, 180 or 270 degrees, got {degrees}"
        )));
    }

    let mut doc = load_document(src, password)?;
    let ids = page_ids(&doc);
    let total = ids.len();

    let targets: Vec<usize> = match pages {
        Some(selected) => {
            for &idx in selected {
                if idx >= total {
                    return Err(ToolboxError::operation_failed(
                        "rotate",
                        format!("page index {} out of range (document has {total} pages)", idx + 1),
                    ));
                }
            }
            selected.to_vec()
        }
        None => (0..total).collect(),
    };

    for &idx in &targets {
        let page_id = ids[idx];
        let current = doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"Rotate").ok().and_then(|o| o.as_i64().ok()))
            .or_else(|| {
                doc::inherited_attr(&doc, page_id, b"Rotate").and_then(|o| o.as_i64().ok())
            })
            .unwrap_or(0);

        let rotated = (current + degrees).rem_euclid(360);
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Rotate", Object::Integer(rotated));
        }
    }

    let output_size = save_document(&mut doc, dst)?;

    Ok(RotateOutcome {
        pages_rotated: targets.len(),
        output_size,
    })
}
