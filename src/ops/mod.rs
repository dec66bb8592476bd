//! Domain operations on PDF files.
//!
//! Each submodule implements one operation as a plain synchronous
//! function over paths. The worker layer (see [`crate::worker`]) wraps
//! these into batch tasks; keeping the operations free of any event or
//! channel plumbing makes them directly testable.

pub mod compress;
pub mod convert;
pub mod merge;
pub mod protect;
pub mod reorder;
pub mod rotate;
pub mod split;
pub mod watermark;

pub use compress::{compress_pdf, CompressOutcome, CompressPreset};
pub use convert::{pdf_to_images, ConvertOutcome};
pub use merge::{merge_pdfs, MergeOutcome};
pub use protect::{protect_pdf, PERMISSIONS_PRINT_ONLY};
pub use reorder::{reorder_pdf, ReorderOutcome};
pub use rotate::{rotate_pdf, RotateOutcome};
pub use split::{parse_page_ranges, split_pdf, SplitMode, SplitOutcome};
pub use watermark::{watermark_pdf, WatermarkOptions, WatermarkOutcome};
