//! Source-level types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where a document's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// LaTeX text handed over directly, without a file
    LatexInline,
    /// LaTeX file on disk (UTF-8)
    #[default]
    LatexFile,
    /// PDF file, read through its text layer
    Pdf,
}

impl SourceKind {
    /// Stable lowercase name, as used in rule files and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::LatexInline => "latex_inline",
            SourceKind::LatexFile => "latex_file",
            SourceKind::Pdf => "pdf",
        }
    }

    /// Whether begin/end markers are searched for in this kind of source.
    pub fn isolates_body(&self) -> bool {
        !matches!(self, SourceKind::Pdf)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latex_inline" | "inline" => Ok(SourceKind::LatexInline),
            "latex_file" | "latex" | "tex" => Ok(SourceKind::LatexFile),
            "pdf" => Ok(SourceKind::Pdf),
            other => Err(format!("Unknown source kind: {}", other)),
        }
    }
}

/// Raw text of a source plus its isolated body.
///
/// The body is fixed when the document is built and never changes afterwards.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    kind: SourceKind,
    origin: Option<PathBuf>,
    text: String,
    body: Range<usize>,
}

impl SourceDocument {
    /// Build a document whose body is isolated between `begin` and `end`.
    ///
    /// Falls back to the whole text when either marker is missing or the
    /// markers are out of order.
    pub fn with_markers(kind: SourceKind, text: String, begin: &str, end: &str) -> Self {
        let body = isolate_body(&text, begin, end);
        Self {
            kind,
            origin: None,
            text,
            body,
        }
    }

    /// Build a document whose body is the whole text.
    pub fn whole(kind: SourceKind, text: String) -> Self {
        let body = 0..text.len();
        Self {
            kind,
            origin: None,
            text,
            body,
        }
    }

    /// Attach the path the text was read from.
    pub fn with_origin(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin = Some(path.into());
        self
    }

    /// Source kind this document was loaded as.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Path the text was read from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Full raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parseable content region.
    pub fn body(&self) -> &str {
        &self.text[self.body.clone()]
    }

    /// Byte range of the body within the raw text.
    pub fn body_range(&self) -> Range<usize> {
        self.body.clone()
    }

    /// Whether the body holds any non-whitespace text.
    pub fn has_body(&self) -> bool {
        !self.body().trim().is_empty()
    }

    /// Human-readable name for logs and reports.
    pub fn display_name(&self) -> String {
        self.origin
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("<{}>", self.kind))
    }
}

/// Locate the text strictly between the first `begin` and the first `end`.
pub fn isolate_body(text: &str, begin: &str, end: &str) -> Range<usize> {
    if begin.is_empty() || end.is_empty() {
        return 0..text.len();
    }

    match (text.find(begin), text.find(end)) {
        (Some(b), Some(e)) if b + begin.len() <= e => (b + begin.len())..e,
        _ => 0..text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEGIN: &str = "\\begin{document}";
    const END: &str = "\\end{document}";

    #[test]
    fn test_body_between_markers() {
        let text = "\\documentclass{article}\n\\begin{document}\nHello\n\\end{document}\n";
        let doc = SourceDocument::with_markers(SourceKind::LatexInline, text.to_string(), BEGIN, END);
        assert_eq!(doc.body(), "\nHello\n");
    }

    #[test]
    fn test_body_without_markers_is_whole_text() {
        let text = "함수 f(x)에 대하여 [4점]";
        let doc = SourceDocument::with_markers(SourceKind::LatexInline, text.to_string(), BEGIN, END);
        assert_eq!(doc.body(), text);
    }

    #[test]
    fn test_body_misordered_markers() {
        let text = "\\end{document} middle \\begin{document}";
        assert_eq!(isolate_body(text, BEGIN, END), 0..text.len());
    }

    #[test]
    fn test_body_only_begin_marker() {
        let text = "\\begin{document} content";
        assert_eq!(isolate_body(text, BEGIN, END), 0..text.len());
    }

    #[test]
    fn test_has_body() {
        let doc = SourceDocument::whole(SourceKind::Pdf, "  \n\t ".to_string());
        assert!(!doc.has_body());

        let doc = SourceDocument::whole(SourceKind::Pdf, "1. 다음".to_string());
        assert!(doc.has_body());
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("pdf".parse::<SourceKind>().unwrap(), SourceKind::Pdf);
        assert_eq!("tex".parse::<SourceKind>().unwrap(), SourceKind::LatexFile);
        assert_eq!(
            "latex_inline".parse::<SourceKind>().unwrap(),
            SourceKind::LatexInline
        );
        assert!("docx".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_display_name() {
        let doc = SourceDocument::whole(SourceKind::LatexInline, String::new());
        assert_eq!(doc.display_name(), "<latex_inline>");

        let doc = doc.with_origin("exam/2024.tex");
        assert_eq!(doc.display_name(), "exam/2024.tex");
    }
}
