//! Loading options and configuration.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Error;

/// Largest span a range inside a page list may cover.
const MAX_LIST_RANGE: u32 = 10_000;

/// Options for loading a source document.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Error handling mode for per-page PDF text extraction
    pub error_mode: ErrorMode,

    /// Page selection (PDF sources only)
    pub pages: PageSelection,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (pages that fail to extract count as empty).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Error handling mode during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip unreadable pages and continue
    Lenient,
}

/// Page selection for PDF sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Resolve against a document's page count, in ascending order.
    ///
    /// Returns the first requested page that does not exist as `Err`.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>, u32> {
        match self {
            PageSelection::All => Ok((1..=page_count).collect()),
            PageSelection::Range(range) => {
                if *range.end() > page_count {
                    return Err(*range.end());
                }
                Ok(range.clone().filter(|p| *p >= 1).collect())
            }
            PageSelection::Pages(pages) => {
                if let Some(&bad) = pages.iter().find(|&&p| p == 0 || p > page_count) {
                    return Err(bad);
                }
                Ok(pages.clone())
            }
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                if start > end {
                    return Err(format!("Range start {} is after end {}", start, end));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut pages = BTreeSet::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                if start > end {
                    return Err(format!("Range start {} is after end {}", start, end));
                }
                if end - start >= MAX_LIST_RANGE {
                    return Err(format!(
                        "Range {}-{} spans more than {} pages",
                        start, end, MAX_LIST_RANGE
                    ));
                }
                pages.extend(start..=end);
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                pages.insert(p);
            }
        }

        Ok(PageSelection::Pages(pages.into_iter().collect()))
    }
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSelection::parse(s).map_err(|e| Error::InvalidPageRange(format!("{}: {}", s, e)))
    }
}
