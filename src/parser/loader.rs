//! Source loader: raw text in, [`SourceDocument`] out.

use std::path::Path;

use super::backend::PdfTextSource;
use super::options::LoadOptions;
use super::rules::DocumentRules;
use crate::detect::detect_source_kind;
use crate::error::{Error, Result};
use crate::model::{SourceDocument, SourceKind};

/// Loads LaTeX and PDF sources.
pub struct SourceLoader<'a> {
    begin_marker: &'a str,
    end_marker: &'a str,
    pdf: &'a dyn PdfTextSource,
    options: LoadOptions,
}

impl<'a> SourceLoader<'a> {
    /// Create a loader using the body markers from `rules`.
    pub fn new(rules: &'a DocumentRules, pdf: &'a dyn PdfTextSource) -> Self {
        Self {
            begin_marker: &rules.begin_marker,
            end_marker: &rules.end_marker,
            pdf,
            options: LoadOptions::default(),
        }
    }

    /// Set load options.
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Load LaTeX text that is already in memory.
    pub fn load_inline(&self, text: &str) -> Result<SourceDocument> {
        let doc = SourceDocument::with_markers(
            SourceKind::LatexInline,
            text.to_string(),
            self.begin_marker,
            self.end_marker,
        );
        ensure_body(doc)
    }

    /// Load a LaTeX file. Invalid UTF-8 is a decode error; no other
    /// encoding is tried.
    pub fn load_latex_file(&self, path: &Path) -> Result<SourceDocument> {
        let text = read_utf8(path)?;
        let doc = SourceDocument::with_markers(
            SourceKind::LatexFile,
            text,
            self.begin_marker,
            self.end_marker,
        )
        .with_origin(path);
        ensure_body(doc)
    }

    /// Load a PDF through the text collaborator. The whole text is the body.
    pub fn load_pdf(&self, path: &Path) -> Result<SourceDocument> {
        let text = self
            .pdf
            .extract_selection(path, &self.options.pages, self.options.error_mode)?
            .ok_or_else(|| {
                Error::NoBodyAvailable(format!("{}: no text layer", path.display()))
            })?;

        let doc = SourceDocument::whole(SourceKind::Pdf, text).with_origin(path);
        ensure_body(doc)
    }

    /// Load `path` as `kind`, detecting the kind when it is `None`.
    pub fn load(&self, path: &Path, kind: Option<SourceKind>) -> Result<SourceDocument> {
        let kind = match kind {
            Some(kind) => kind,
            None => detect_source_kind(path)?,
        };
        log::debug!("Loading {} as {}", path.display(), kind);

        match kind {
            SourceKind::Pdf => self.load_pdf(path),
            SourceKind::LatexFile => self.load_latex_file(path),
            SourceKind::LatexInline => {
                let text = read_utf8(path)?;
                self.load_inline(&text)
            }
        }
    }
}

/// Read `path` as strict UTF-8.
fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| {
        Error::Decode(format!(
            "{}: invalid UTF-8 at byte {}",
            path.display(),
            e.utf8_error().valid_up_to()
        ))
    })
}

fn ensure_body(doc: SourceDocument) -> Result<SourceDocument> {
    if doc.has_body() {
        Ok(doc)
    } else {
        Err(Error::NoBodyAvailable(format!(
            "{}: body is empty",
            doc.display_name()
        )))
    }
}
