//! Split a PDF into smaller documents.

use std::path::{Path, PathBuf};

use crate::doc::{load_document, page_ids, save_document, select_pages};
use crate::error::{Result, ToolboxError};
use crate::paths::ensure_unique_path;

/// How to carve up the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// One output per range in a 1-based expression like `1-3,5,7-10`.
    /// Parsed against each document's page count with
    /// [`parse_page_ranges`].
    Ranges(String),
    /// Fixed-size chunks of `n` pages, last chunk possibly shorter.
    EveryN(usize),
    /// One output containing exactly the listed pages (0-based).
    Extract(Vec<usize>),
}

/// What a split produced.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// The written files, in page order.
    pub outputs: Vec<PathBuf>,
}

/// Parse a 1-based page range expression like `1-3,5,7-10`.
///
/// Whitespace around tokens is ignored. Returns 0-based inclusive
/// ranges. An end past the document is clamped to the last page; a
/// start past the document, a reversed range, or a page number of zero
/// is an error.
///
/// # Errors
///
/// Returns [`ToolboxError::InvalidConfig`] on any malformed token.
pub fn parse_page_ranges(expr: &str, total_pages: usize) -> Result<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();

    for token in expr.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_page_number(a)?, parse_page_number(b)?),
            None => {
                let page = parse_page_number(token)?;
                (page, page)
            }
        };

        if start > end {
            return Err(ToolboxError::invalid_config(format!(
                "invalid page range '{token}': start is after end"
            )));
        }
        if start > total_pages {
            return Err(ToolboxError::invalid_config(format!(
                "page {start} is out of range (document has {total_pages} pages)"
            )));
        }

        let end = end.min(total_pages);
        ranges.push((start - 1, end - 1));
    }

    if ranges.is_empty() {
        return Err(ToolboxError::invalid_config(format!(
            "no valid page ranges in '{expr}'"
        )));
    }

    Ok(ranges)
}

fn parse_page_number(token: &str) -> Result<usize> {
    let page: usize = token.trim().parse().map_err(|_| {
        ToolboxError::invalid_config(format!("invalid page number '{}'", token.trim()))
    })?;
    if page == 0 {
        return Err(ToolboxError::invalid_config("page numbers start at 1"));
    }
    Ok(page)
}

/// Split `src` according to `mode`, writing outputs next to the source
/// (or into `output_dir`). Output names never overwrite existing files.
///
/// # Errors
///
/// Returns an error if the source fails to load, a page index is out of
/// range, or any output cannot be written.
pub fn split_pdf(
    src: &Path,
    output_dir: Option<&Path>,
    mode: &SplitMode,
    password: Option<&str>,
) -> Result<SplitOutcome> {
    let source = load_document(src, password)?;
    let total = page_ids(&source).len();
    if total == 0 {
        return Err(ToolboxError::operation_failed("split", "document has no pages"));
    }

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| src.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let chunks: Vec<(Vec<usize>, String)> = match mode {
        SplitMode::Ranges(expr) => parse_page_ranges(expr, total)?
            .iter()
            .map(|&(start, end)| {
                let indices: Vec<usize> = (start..=end).collect();
                let name = if start == end {
                    format!("{stem}_p{}.pdf", start + 1)
                } else {
                    format!("{stem}_p{}-{}.pdf", start + 1, end + 1)
                };
                (indices, name)
            })
            .collect(),
        SplitMode::EveryN(n) => {
            if *n == 0 {
                return Err(ToolboxError::invalid_config("chunk size must be at least 1"));
            }
            (0..total)
                .collect::<Vec<usize>>()
                .chunks(*n)
                .map(|chunk| {
                    let first = chunk[0] + 1;
                    let last = chunk[chunk.len() - 1] + 1;
                    let name = if first == last {
                        format!("{stem}_p{first}.pdf")
                    } else {
                        format!("{stem}_p{first}-{last}.pdf")
                    };
                    (chunk.to_vec(), name)
                })
                .collect()
        }
        SplitMode::Extract(pages) => {
            if pages.is_empty() {
                return Err(ToolboxError::invalid_config("no pages selected"));
            }
            let listed = pages
                .iter()
                .map(|p| (p + 1).to_string())
                .collect::<Vec<_>>()
                .join(",");
            vec![(pages.clone(), format!("{stem}_extracted_p{listed}.pdf"))]
        }
    };

    let mut outputs = Vec::with_capacity(chunks.len());
    for (indices, name) in chunks {
        let mut part = select_pages(&source, &indices)?;
        let path = ensure_unique_path(dir.join(name));
        save_document(&mut part, &path)?;
        outputs.push(path);
    }

    Ok(SplitOutcome { outputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::minimal_document_with_pages;
    use rstest::rstest;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, pages: usize) -> PathBuf {
        let path = dir.path().join("source.pdf");
        let mut doc = minimal_document_with_pages(pages);
        save_document(&mut doc, &path).unwrap();
        path
    }

    #[rstest]
    #[case("1-3,5,7-10", 10, vec![(0, 2), (4, 4), (6, 9)])]
    #[case("2", 5, vec![(1, 1)])]
    #[case(" 1 - 2 , 4 ", 5, vec![(0, 1), (3, 3)])]
    #[case("3-99", 5, vec![(2, 4)])]
    fn test_parse_page_ranges(
        #[case] expr: &str,
        #[case] total: usize,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        assert_eq!(parse_page_ranges(expr, total).unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("5-2")]
    #[case("abc")]
    #[case("")]
    #[case("99", )]
    fn test_parse_page_ranges_rejects(#[case] expr: &str) {
        assert!(parse_page_ranges(expr, 5).is_err());
    }

    #[test]
    fn test_split_by_ranges() {
        let dir = TempDir::new().unwrap();
        let src = fixture(&dir, 6);

        let mode = SplitMode::Ranges("1-2,4-6".to_string());
        let outcome = split_pdf(&src, None, &mode, None).unwrap();

        assert_eq!(outcome.outputs.len(), 2);
        assert!(outcome.outputs[0].ends_with("source_p1-2.pdf"));
        assert!(outcome.outputs[1].ends_with("source_p4-6.pdf"));

        let first = load_document(&outcome.outputs[0], None).unwrap();
        assert_eq!(page_ids(&first).len(), 2);
        let second = load_document(&outcome.outputs[1], None).unwrap();
        assert_eq!(page_ids(&second).len(), 3);
    }

    #[test]
    fn test_split_every_n() {
        let dir = TempDir::new().unwrap();
        let src = fixture(&dir, 5);

        let outcome = split_pdf(&src, None, &SplitMode::EveryN(2), None).unwrap();

        assert_eq!(outcome.outputs.len(), 3);
        let last = load_document(&outcome.outputs[2], None).unwrap();
        assert_eq!(page_ids(&last).len(), 1);
    }

    #[test]
    fn test_split_every_zero_rejected() {
        let dir = TempDir::new().unwrap();
        let src = fixture(&dir, 2);

        let result = split_pdf(&src, None, &SplitMode::EveryN(0), None);
        assert!(matches!(result, Err(ToolboxError::InvalidConfig { .. })));
    }

    #[test]
    fn test_extract_pages() {
        let dir = TempDir::new().unwrap();
        let src = fixture(&dir, 5);

        let outcome = split_pdf(&src, None, &SplitMode::Extract(vec![0, 2, 4]), None).unwrap();

        assert_eq!(outcome.outputs.len(), 1);
        assert!(outcome.outputs[0].ends_with("source_extracted_p1,3,5.pdf"));
        let extracted = load_document(&outcome.outputs[0], None).unwrap();
        assert_eq!(page_ids(&extracted).len(), 3);
    }

    #[test]
    fn test_split_into_output_dir_without_collisions() {
        let dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let src = fixture(&dir, 2);

        let mode = SplitMode::EveryN(1);
        let first = split_pdf(&src, Some(out_dir.path()), &mode, None).unwrap();
        let second = split_pdf(&src, Some(out_dir.path()), &mode, None).unwrap();

        // A second run beside the first must pick fresh names.
        assert!(second.outputs.iter().all(|p| p.exists()));
        assert!(first
            .outputs
            .iter()
            .zip(&second.outputs)
            .all(|(a, b)| a != b));
    }
}
