//! PDF text-layer abstraction.
//!
//! The pipeline only needs page text out of a PDF, so the collaborator is a
//! narrow trait. [`LopdfTextSource`] is the stock implementation; tests and
//! callers with their own extractor plug in through [`PdfTextSource`].

use std::path::Path;

use lopdf::Document as LopdfDocument;

use super::options::{ErrorMode, PageSelection};
use crate::error::{Error, Result};

/// Source of extracted PDF text.
///
/// `extract` returns `Ok(None)` when the requested page (or the whole
/// document, for `page = None`) has no text layer. That is a normal outcome,
/// not an error.
pub trait PdfTextSource {
    /// Number of pages in the document.
    fn page_count(&self, path: &Path) -> Result<u32>;

    /// Text of one page (1-indexed) or, with `None`, of every page.
    fn extract(&self, path: &Path, page: Option<u32>) -> Result<Option<String>>;

    /// Page-concatenated text for a selection of pages.
    fn extract_selection(
        &self,
        path: &Path,
        pages: &PageSelection,
        mode: ErrorMode,
    ) -> Result<Option<String>> {
        if *pages == PageSelection::All {
            return self.extract(path, None);
        }

        let count = self.page_count(path)?;
        let numbers = pages
            .resolve(count)
            .map_err(|bad| Error::PageOutOfRange(bad, count))?;

        let mut texts = Vec::with_capacity(numbers.len());
        for page in numbers {
            match self.extract(path, Some(page)) {
                Ok(Some(text)) => texts.push(text),
                Ok(None) => log::debug!("Page {} has no text layer", page),
                Err(e) if mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(join_pages(texts))
    }
}

/// Join page texts, dropping empty ones. `None` when nothing is left.
fn join_pages(texts: Vec<String>) -> Option<String> {
    let kept: Vec<String> = texts.into_iter().filter(|t| !t.trim().is_empty()).collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("\n"))
    }
}

/// [`PdfTextSource`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextSource;

impl LopdfTextSource {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<LopdfDocument> {
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(doc)
    }

    fn page_text(doc: &LopdfDocument, page: u32) -> Result<Option<String>> {
        let text = doc.extract_text(&[page])?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn pages_text(doc: &LopdfDocument, pages: &[u32], mode: ErrorMode) -> Result<Option<String>> {
        let mut texts = Vec::with_capacity(pages.len());
        for &page in pages {
            match Self::page_text(doc, page) {
                Ok(Some(text)) => texts.push(text),
                Ok(None) => log::debug!("Page {} has no text layer", page),
                Err(e) if mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(join_pages(texts))
    }
}

impl PdfTextSource for LopdfTextSource {
    fn page_count(&self, path: &Path) -> Result<u32> {
        let doc = Self::open(path)?;
        Ok(doc.get_pages().len() as u32)
    }

    fn extract(&self, path: &Path, page: Option<u32>) -> Result<Option<String>> {
        let doc = Self::open(path)?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let count = pages.len() as u32;

        match page {
            Some(p) if !pages.contains(&p) => Err(Error::PageOutOfRange(p, count)),
            Some(p) => Self::page_text(&doc, p),
            // Whole-document requests tolerate pages without a usable text layer
            None => Self::pages_text(&doc, &pages, ErrorMode::Lenient),
        }
    }

    // Loads the file once instead of once per page.
    fn extract_selection(
        &self,
        path: &Path,
        pages: &PageSelection,
        mode: ErrorMode,
    ) -> Result<Option<String>> {
        let doc = Self::open(path)?;
        let count = doc.get_pages().len() as u32;
        let numbers = pages
            .resolve(count)
            .map_err(|bad| Error::PageOutOfRange(bad, count))?;
        Self::pages_text(&doc, &numbers, mode)
    }
}
