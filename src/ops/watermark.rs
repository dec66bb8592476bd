//! Stamp a diagonal text watermark across pages.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::doc::{self, load_document, page_ids, save_document};
use crate::error::{Result, ToolboxError};

/// Resource names the overlay registers on each page. Prefixed to stay
/// clear of names the document already uses.
const FONT_KEY: &[u8] = b"WmF0";
const GSTATE_KEY: &[u8] = b"WmG0";

/// Appearance of the stamped text.
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// The text to stamp.
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    /// Fill opacity, 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees, around the page center.
    pub angle_degrees: f32,
}

impl WatermarkOptions {
    /// Defaults matching the usual draft stamp: large, faint, diagonal.
    pub fn new(text: impl Into<String>) -> Self {
        WatermarkOptions {
            text: text.into(),
            font_size: 48.0,
            opacity: 0.3,
            angle_degrees: 45.0,
        }
    }
}

/// What a watermark pass produced.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    /// How many pages were stamped.
    pub pages_stamped: usize,
    /// Size of the written file in bytes.
    pub output_size: u64,
}

/// Stamp `opts.text` across pages of `src` and write the result to `dst`.
///
/// The stamp is appended to each page's content stream inside a saved
/// graphics state, rotated around the page center, drawn in gray with
/// the requested opacity through an `ExtGState`. Existing page content
/// is untouched. `pages` selects 0-based indices; `None` stamps every
/// page.
///
/// # Errors
///
/// Returns an error for empty watermark text, an opacity outside 0..=1,
/// an out-of-range page index, or load/save failures.
pub fn watermark_pdf(
    src: &Path,
    dst: &Path,
    opts: &WatermarkOptions,
    pages: Option<&[usize]>,
    password: Option<&str>,
) -> Result<WatermarkOutcome> {
    if opts.text.trim().is_empty() {
        return Err(ToolboxError::invalid_config("watermark text is empty"));
    }
    if !(0.0..=1.0).contains(&opts.opacity) {
        return Err(ToolboxError::invalid_config(format!(
            "opacity must be between 0 and 1, got {}",
            opts.opacity
        )));
    }

    let mut doc = load_document(src, password)?;
    let ids = page_ids(&doc);
    let total = ids.len();

    let targets: Vec<ObjectId> = match pages {
        Some(selected) => {
            let mut targets = Vec::with_capacity(selected.len());
            for &idx in selected {
                if idx >= total {
                    return Err(ToolboxError::operation_failed(
                        "watermark",
                        format!("page index {} out of range (document has {total} pages)", idx + 1),
                    ));
                }
                targets.push(ids[idx]);
            }
            targets
        }
        None => ids,
    };

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let gstate_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"ExtGState".to_vec())),
        ("ca", Object::Real(opts.opacity)),
        ("CA", Object::Real(opts.opacity)),
    ]));

    for &page_id in &targets {
        stamp_page(&mut doc, page_id, font_id, gstate_id, opts)?;
    }

    let output_size = save_document(&mut doc, dst)?;

    Ok(WatermarkOutcome {
        pages_stamped: targets.len(),
        output_size,
    })
}

fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    gstate_id: ObjectId,
    opts: &WatermarkOptions,
) -> Result<()> {
    register_resources(doc, page_id, font_id, gstate_id)?;

    let (x0, y0, x1, y1) = media_box(doc, page_id);
    let center_x = (x0 + x1) / 2.0;
    let center_y = (y0 + y1) / 2.0;
    // Rough horizontal centering; Helvetica averages ~0.5em per glyph.
    let half_width = opts.text.len() as f32 * opts.font_size * 0.25;

    let radians = opts.angle_degrees.to_radians();
    let (sin, cos) = radians.sin_cos();

    let overlay = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(GSTATE_KEY.to_vec())]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_KEY.to_vec()), Object::Real(opts.font_size)],
            ),
            Operation::new(
                "rg",
                vec![Object::Real(0.5), Object::Real(0.5), Object::Real(0.5)],
            ),
            Operation::new(
                "Tm",
                vec![
                    Object::Real(cos),
                    Object::Real(sin),
                    Object::Real(-sin),
                    Object::Real(cos),
                    Object::Real(center_x - half_width * cos),
                    Object::Real(center_y - half_width * sin),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::string_literal(opts.text.as_bytes().to_vec())],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = overlay
        .encode()
        .map_err(|e| ToolboxError::operation_failed("watermark", e.to_string()))?;

    let mut content = doc
        .get_page_content(page_id)
        .map_err(|e| ToolboxError::operation_failed("watermark", e.to_string()))?;
    content.push(b'\n');
    content.extend_from_slice(&encoded);
    doc.change_page_content(page_id, content)
        .map_err(|e| ToolboxError::operation_failed("watermark", e.to_string()))?;

    Ok(())
}

/// Make the watermark font and graphics state visible from the page's
/// `/Resources`, materializing an inherited or referenced dictionary
/// into an inline one first.
fn register_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    gstate_id: ObjectId,
) -> Result<()> {
    let mut resources = match doc::inherited_attr(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        Some(Object::Reference(id)) => doc
            .get_dictionary(id)
            .map(Clone::clone)
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .map(Clone::clone)
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_KEY, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let mut gstates = match resources.get(b"ExtGState") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .map(Clone::clone)
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };
    gstates.set(GSTATE_KEY, Object::Reference(gstate_id));
    resources.set("ExtGState", Object::Dictionary(gstates));

    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            page.set("Resources", Object::Dictionary(resources));
            Ok(())
        }
        _ => Err(ToolboxError::operation_failed(
            "watermark",
            "page is not a dictionary",
        )),
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    // US Letter when the document does not say.
    let fallback = (0.0, 0.0, 612.0, 792.0);
    let Some(Object::Array(values)) = doc::inherited_attr(doc, page_id, b"MediaBox") else {
        return fallback;
    };
    if values.len() != 4 {
        return fallback;
    }
    let mut nums = [0.0f32; 4];
    for (slot, value) in nums.iter_mut().zip(&values) {
        *slot = match value {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => return fallback,
        };
    }
    (nums[0], nums[1], nums[2], nums[3])
}
