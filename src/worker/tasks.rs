//! [`FileTask`] adapters for each domain operation.
//!
//! Tasks bind an operation's parameters once and get applied to every
//! file in a batch. They produce `✓`/`✗` result messages; the worker
//! harness turns those into events.

use std::path::{Path, PathBuf};

use crate::error::{Result, ToolboxError};
use crate::ops::{
    compress_pdf, merge_pdfs, pdf_to_images, protect_pdf, reorder_pdf, rotate_pdf, split_pdf,
    watermark_pdf, CompressPreset, SplitMode, WatermarkOptions,
};
use crate::paths::{format_file_size, suffixed_output_path};
use crate::repair::{available_engines, repair, Engine};
use crate::worker::{FileTask, FileTaskResult};

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Strip restrictions or recover a damaged file through the repair
/// chain, writing `<stem>_unlocked.pdf`.
pub struct UnlockTask {
    password: Option<String>,
    output_dir: Option<PathBuf>,
    engines: Vec<Engine>,
}

impl UnlockTask {
    /// A task using every engine available on this system.
    pub fn new(password: Option<String>, output_dir: Option<PathBuf>) -> Self {
        UnlockTask {
            password,
            output_dir,
            engines: available_engines(),
        }
    }

    /// Restrict the chain to a fixed engine list.
    pub fn with_engines(mut self, engines: Vec<Engine>) -> Self {
        self.engines = engines;
        self
    }
}

impl FileTask for UnlockTask {
    fn name(&self) -> &'static str {
        "unlock"
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        if !src.exists() {
            return Err(ToolboxError::file_not_found(src.to_path_buf()));
        }

        let name = short_name(src);
        let dst = suffixed_output_path(src, "_unlocked", self.output_dir.as_deref());

        let mut attempted: Vec<String> = Vec::new();
        let outcome = repair(
            src,
            &dst,
            self.password.as_deref(),
            &self.engines,
            &mut |label| attempted.push(label.to_string()),
        );

        if outcome.succeeded {
            let engine = outcome
                .engine
                .map(|e| e.label().to_string())
                .unwrap_or_default();
            Ok(FileTaskResult::success(
                src,
                dst.clone(),
                format!("✓ {name} → {} ({engine})", short_name(&dst)),
            )
            .with_engine(engine))
        } else {
            Ok(FileTaskResult::failure(
                src,
                format!("✗ {name}: {} (tried: {})", outcome.message, attempted.join(", ")),
            ))
        }
    }
}

/// Rotate pages, writing `<stem>_rotated.pdf`.
pub struct RotateTask {
    degrees: i64,
    pages: Option<Vec<usize>>,
    output_dir: Option<PathBuf>,
    password: Option<String>,
}

impl RotateTask {
    /// Rotate by `degrees` clockwise; `pages` limits to 0-based indices.
    pub fn new(degrees: i64, pages: Option<Vec<usize>>, output_dir: Option<PathBuf>) -> Self {
        RotateTask {
            degrees,
            pages,
            output_dir,
            password: None,
        }
    }

    /// Password for encrypted inputs.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl FileTask for RotateTask {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn prepare(&self) -> Result<()> {
        if !matches!(self.degrees, 90 | 180 | 270) {
            return Err(ToolboxError::invalid_config(format!(
                "rotation must be 90, 180 or 270 degrees, got {}",
                self.degrees
            )));
        }
        Ok(())
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let dst = suffixed_output_path(src, "_rotated", self.output_dir.as_deref());

        let outcome = rotate_pdf(
            src,
            &dst,
            self.degrees,
            self.pages.as_deref(),
            self.password.as_deref(),
        )?;

        Ok(FileTaskResult::success(
            src,
            dst.clone(),
            format!(
                "✓ {name} → {} ({} page(s) rotated {}°)",
                short_name(&dst),
                outcome.pages_rotated,
                self.degrees
            ),
        ))
    }
}

/// Split each file into parts.
pub struct SplitTask {
    mode: SplitMode,
    output_dir: Option<PathBuf>,
    password: Option<String>,
}

impl SplitTask {
    /// Split according to `mode`, writing beside the source or into
    /// `output_dir`.
    pub fn new(mode: SplitMode, output_dir: Option<PathBuf>) -> Self {
        SplitTask {
            mode,
            output_dir,
            password: None,
        }
    }

    /// Password for encrypted inputs.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl FileTask for SplitTask {
    fn name(&self) -> &'static str {
        "split"
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let outcome = split_pdf(
            src,
            self.output_dir.as_deref(),
            &self.mode,
            self.password.as_deref(),
        )?;

        let first = outcome.outputs.first().cloned().unwrap_or_default();
        Ok(FileTaskResult::success(
            src,
            first,
            format!("✓ {name} → {} file(s)", outcome.outputs.len()),
        ))
    }
}

/// Stamp a text watermark, writing `<stem>_watermarked.pdf`.
pub struct WatermarkTask {
    opts: WatermarkOptions,
    pages: Option<Vec<usize>>,
    output_dir: Option<PathBuf>,
    password: Option<String>,
}

impl WatermarkTask {
    /// Stamp with `opts` on every page, or on `pages` when given.
    pub fn new(
        opts: WatermarkOptions,
        pages: Option<Vec<usize>>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        WatermarkTask {
            opts,
            pages,
            output_dir,
            password: None,
        }
    }

    /// Password for encrypted inputs.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl FileTask for WatermarkTask {
    fn name(&self) -> &'static str {
        "watermark"
    }

    fn prepare(&self) -> Result<()> {
        if self.opts.text.trim().is_empty() {
            return Err(ToolboxError::invalid_config("watermark text is empty"));
        }
        if !(0.0..=1.0).contains(&self.opts.opacity) {
            return Err(ToolboxError::invalid_config(format!(
                "opacity must be between 0 and 1, got {}",
                self.opts.opacity
            )));
        }
        Ok(())
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let dst = suffixed_output_path(src, "_watermarked", self.output_dir.as_deref());

        let outcome = watermark_pdf(
            src,
            &dst,
            &self.opts,
            self.pages.as_deref(),
            self.password.as_deref(),
        )?;

        Ok(FileTaskResult::success(
            src,
            dst.clone(),
            format!(
                "✓ {name} → {} ({} page(s) stamped)",
                short_name(&dst),
                outcome.pages_stamped
            ),
        ))
    }
}

/// Compress each file, writing `<stem>_compressed.pdf`.
pub struct CompressTask {
    preset: CompressPreset,
    output_dir: Option<PathBuf>,
    password: Option<String>,
}

impl CompressTask {
    /// Compress with the given preset.
    pub fn new(preset: CompressPreset, output_dir: Option<PathBuf>) -> Self {
        CompressTask {
            preset,
            output_dir,
            password: None,
        }
    }

    /// Password for encrypted inputs (used by the structural fallback).
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl FileTask for CompressTask {
    fn name(&self) -> &'static str {
        "compress"
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let dst = suffixed_output_path(src, "_compressed", self.output_dir.as_deref());

        let outcome = compress_pdf(src, &dst, self.preset, self.password.as_deref())?;

        Ok(FileTaskResult::success(
            src,
            dst.clone(),
            format!(
                "✓ {name} → {} ({} → {}, {:.1}% saved)",
                short_name(&dst),
                format_file_size(outcome.original_size),
                format_file_size(outcome.compressed_size),
                outcome.reduction_percent()
            ),
        )
        .with_engine(outcome.backend))
    }
}

/// Rearrange pages, writing `<stem>_reordered.pdf`.
pub struct ReorderTask {
    order: Vec<usize>,
    output_dir: Option<PathBuf>,
    password: Option<String>,
}

impl ReorderTask {
    /// Reorder to `order`, a 0-based permutation of the page indices.
    pub fn new(order: Vec<usize>, output_dir: Option<PathBuf>) -> Self {
        ReorderTask {
            order,
            output_dir,
            password: None,
        }
    }

    /// Password for encrypted inputs.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl FileTask for ReorderTask {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn prepare(&self) -> Result<()> {
        if self.order.is_empty() {
            return Err(ToolboxError::invalid_config("page order is empty"));
        }
        Ok(())
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let dst = suffixed_output_path(src, "_reordered", self.output_dir.as_deref());

        let outcome = reorder_pdf(src, &dst, &self.order, self.password.as_deref())?;

        Ok(FileTaskResult::success(
            src,
            dst.clone(),
            format!(
                "✓ {name} → {} ({} pages)",
                short_name(&dst),
                outcome.total_pages
            ),
        ))
    }
}

/// Password-protect each file, writing `<stem>_protected.pdf`.
pub struct ProtectTask {
    user_password: String,
    owner_password: Option<String>,
    output_dir: Option<PathBuf>,
}

impl ProtectTask {
    /// Protect with `user_password`; the owner password defaults to the
    /// same value.
    pub fn new(user_password: impl Into<String>, output_dir: Option<PathBuf>) -> Self {
        ProtectTask {
            user_password: user_password.into(),
            owner_password: None,
            output_dir,
        }
    }

    /// Use a distinct owner password.
    pub fn with_owner_password(mut self, password: impl Into<String>) -> Self {
        self.owner_password = Some(password.into());
        self
    }
}

impl FileTask for ProtectTask {
    fn name(&self) -> &'static str {
        "protect"
    }

    fn prepare(&self) -> Result<()> {
        if self.user_password.is_empty() {
            return Err(ToolboxError::invalid_config("password must not be empty"));
        }
        Ok(())
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let dst = suffixed_output_path(src, "_protected", self.output_dir.as_deref());

        let size = protect_pdf(
            src,
            &dst,
            &self.user_password,
            self.owner_password.as_deref(),
        )?;

        Ok(FileTaskResult::success(
            src,
            dst.clone(),
            format!(
                "✓ {name} → {} ({})",
                short_name(&dst),
                format_file_size(size)
            ),
        )
        .with_engine("ghostscript"))
    }
}

/// Render each file's pages to PNG images in a `<stem>_images` folder.
pub struct ConvertTask {
    dpi: u32,
    output_dir: Option<PathBuf>,
}

impl ConvertTask {
    /// Render at `dpi` dots per inch.
    pub fn new(dpi: u32, output_dir: Option<PathBuf>) -> Self {
        ConvertTask { dpi, output_dir }
    }
}

impl FileTask for ConvertTask {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn prepare(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(ToolboxError::invalid_config("resolution must be at least 1 dpi"));
        }
        Ok(())
    }

    fn process(&self, src: &Path) -> Result<FileTaskResult> {
        let name = short_name(src);
        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pages".to_string());
        let base = self
            .output_dir
            .clone()
            .or_else(|| src.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let image_dir = base.join(format!("{stem}_images"));

        let outcome = pdf_to_images(src, &image_dir, self.dpi)?;

        Ok(FileTaskResult::success(
            src,
            image_dir.clone(),
            format!(
                "✓ {name} → {} image(s) in {}",
                outcome.outputs.len(),
                image_dir.display()
            ),
        )
        .with_engine("pdftoppm"))
    }
}

/// Build the whole-batch merge operation for
/// [`crate::worker::BatchWorker::spawn_batch`].
///
/// The returned closure merges all inputs into `output` (made
/// collision-free first) and reports a single result.
pub fn merge_batch(
    output: PathBuf,
    password: Option<String>,
) -> impl FnOnce(&[PathBuf]) -> Result<FileTaskResult> + Send + 'static {
    move |files: &[PathBuf]| {
        let dst = crate::paths::ensure_unique_path(output);
        let outcome = merge_pdfs(files, &dst, password.as_deref())?;
        Ok(FileTaskResult::success(
            files[0].clone(),
            outcome.output.clone(),
            format!(
                "✓ merged {} files → {} ({} pages, {})",
                outcome.files_merged,
                short_name(&outcome.output),
                outcome.total_pages,
                format_file_size(outcome.output_size)
            ),
        ))
    }
}
