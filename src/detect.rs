//! Source kind detection.

use crate::error::Result;
use crate::model::SourceKind;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Detect the source kind of a file.
///
/// The `%PDF-` header wins over the extension; a file without it is a PDF
/// only if its extension says so, and LaTeX otherwise.
///
/// # Example
/// ```no_run
/// use unexam::detect::detect_source_kind;
///
/// let kind = detect_source_kind("2024_suneung.tex").unwrap();
/// println!("Source kind: {}", kind);
/// ```
pub fn detect_source_kind<P: AsRef<Path>>(path: P) -> Result<SourceKind> {
    let path = path.as_ref();
    let mut header = Vec::with_capacity(PDF_MAGIC.len());
    File::open(path)?
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut header)?;

    if is_pdf_bytes(&header) {
        return Ok(SourceKind::Pdf);
    }
    Ok(kind_from_extension(path))
}

/// Source kind implied by the file extension alone.
pub fn kind_from_extension(path: &Path) -> SourceKind {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        SourceKind::Pdf
    } else {
        SourceKind::LatexFile
    }
}

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"\\documentclass{article}"));
        assert!(!is_pdf_bytes(b"%PDF"));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_from_extension(Path::new("a.PDF")), SourceKind::Pdf);
        assert_eq!(kind_from_extension(Path::new("a.tex")), SourceKind::LatexFile);
        assert_eq!(kind_from_extension(Path::new("noext")), SourceKind::LatexFile);
    }

    #[test]
    fn test_detect_by_magic() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n%%EOF").unwrap();
        assert_eq!(detect_source_kind(file.path()).unwrap(), SourceKind::Pdf);
    }

    #[test]
    fn test_detect_short_latex_file() {
        let mut file = tempfile::Builder::new().suffix(".tex").tempfile().unwrap();
        file.write_all(b"ab").unwrap();
        assert_eq!(detect_source_kind(file.path()).unwrap(), SourceKind::LatexFile);
    }

    #[test]
    fn test_detect_missing_file() {
        assert!(detect_source_kind("/nonexistent/file.tex").is_err());
    }
}
