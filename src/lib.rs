//! # unexam
//!
//! Extracts CSAT-style math problems from LaTeX and PDF sources and writes
//! them as CSV and JSON.
//!
//! Each document comes with a rule table naming, for every problem, the
//! patterns that open it and the point marker (e.g. `[4점]`) that closes it.
//! The pipeline segments the body with those rules, reads the five options
//! after each problem, normalizes the records and writes
//! `<name>.csv` / `<name>.json`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unexam::{DocumentRules, Unexam};
//!
//! fn main() -> unexam::Result<()> {
//!     let rules = DocumentRules::from_file("2024_suneung.toml")?;
//!
//!     let result = Unexam::new()
//!         .with_rules(rules)
//!         .extract("2024_suneung.tex")?;
//!
//!     for warning in result.warnings() {
//!         eprintln!("{}", warning);
//!     }
//!     result.write_to("out")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Sources**: LaTeX text, LaTeX files and PDF text layers
//! - **Declarative rules**: per-document TOML rule tables
//! - **Options**: `(i)` and circled-digit markers, formulas and bare values
//! - **Outputs**: CSV with BOM for spreadsheets, JSON with literal UTF-8
//! - **Fix pass**: re-normalize previously written files in place

pub mod detect;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_source_kind, is_pdf_bytes};
pub use error::{Error, Result};
pub use model::{
    AnswerType, ExtractionConfidence, OptionCandidate, ProblemRecord, ProblemSet, ProblemSpan,
    SourceDocument, SourceKind, Warning,
};
pub use normalize::{CleanupOptions, CleanupPreset, Normalizer};
pub use parser::{
    DocumentRules, ErrorMode, LoadOptions, LopdfTextSource, MathDelimiter, PageSelection,
    PdfTextSource, ProblemRule,
};
pub use pipeline::{BatchOutcome, ExtractionReport, Pipeline, PipelineConfig, SpanSummary};
pub use render::{ExtractionStats, JsonFormat, JsonLayout, OutputOptions, WrittenFiles};

use std::path::Path;

/// Name given to problem sets extracted from in-memory text.
const INLINE_NAME: &str = "inline";

/// Extract problems from LaTeX text held in memory.
///
/// # Example
///
/// ```
/// use unexam::{extract_str, DocumentRules, ProblemRule};
///
/// let rules = DocumentRules::new().with_problem(ProblemRule::new("1", ["함수"]));
/// let report = extract_str("함수 f의 값은? [2점] (1) 1 (2) 2", &rules).unwrap();
/// assert_eq!(report.set.records[0].options.len(), 2);
/// ```
pub fn extract_str(text: &str, rules: &DocumentRules) -> Result<ExtractionReport> {
    let pipeline = Pipeline::new(PipelineConfig::new(INLINE_NAME).with_rules(rules.clone()))?;
    let doc = pipeline.load_inline(text)?;
    pipeline.extract(&doc, INLINE_NAME)
}

/// Extract problems from a LaTeX or PDF file without writing anything.
///
/// The source kind is detected from the file.
pub fn extract_file<P: AsRef<Path>>(path: P, rules: &DocumentRules) -> Result<ExtractionReport> {
    let path = path.as_ref();
    let config = PipelineConfig::new(path).with_rules(rules.clone());
    let name = config.resolved_output_name();
    let pipeline = Pipeline::new(config)?;
    let doc = pipeline.load()?;
    pipeline.extract(&doc, &name)
}

/// Builder-style API for one-off extractions.
///
/// # Example
///
/// ```no_run
/// use unexam::{CleanupPreset, DocumentRules, JsonLayout, PageSelection, Unexam};
///
/// let json = Unexam::new()
///     .with_rules(DocumentRules::from_file("rules.toml")?)
///     .with_pages(PageSelection::parse("1-8").unwrap())
///     .with_cleanup(CleanupPreset::Aggressive)
///     .with_json_layout(JsonLayout::keyed("problems"))
///     .lenient()
///     .extract("exam.pdf")?
///     .to_json()?;
/// # Ok::<(), unexam::Error>(())
/// ```
pub struct Unexam {
    rules: DocumentRules,
    load_options: LoadOptions,
    source_kind: Option<SourceKind>,
    cleanup: CleanupPreset,
    output_options: OutputOptions,
}

impl Unexam {
    /// Create a new Unexam builder.
    pub fn new() -> Self {
        Self {
            rules: DocumentRules::default(),
            load_options: LoadOptions::default(),
            source_kind: None,
            cleanup: CleanupPreset::default(),
            output_options: OutputOptions::default(),
        }
    }

    /// Set the document rules.
    pub fn with_rules(mut self, rules: DocumentRules) -> Self {
        self.rules = rules;
        self
    }

    /// Force the source kind.
    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = Some(kind);
        self
    }

    /// Enable lenient PDF loading.
    pub fn lenient(mut self) -> Self {
        self.load_options = self.load_options.lenient();
        self
    }

    /// Set page selection (PDF sources).
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.load_options = self.load_options.with_pages(pages);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = preset;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_layout(mut self, layout: JsonLayout) -> Self {
        self.output_options = self.output_options.with_json_layout(layout);
        self
    }

    /// Write compact JSON.
    pub fn compact_json(mut self) -> Self {
        self.output_options = self.output_options.compact();
        self
    }

    fn config(&self, path: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::new(path)
            .with_rules(self.rules.clone())
            .with_load_options(self.load_options.clone())
            .with_cleanup(self.cleanup)
            .with_output(self.output_options.clone());
        if let Some(kind) = self.source_kind {
            config = config.with_source_kind(kind);
        }
        config
    }

    /// Extract from a file and return a result wrapper.
    pub fn extract<P: AsRef<Path>>(self, path: P) -> Result<UnexamResult> {
        let config = self.config(path.as_ref());
        let name = config.resolved_output_name();
        let pipeline = Pipeline::new(config)?;
        let doc = pipeline.load()?;
        let report = pipeline.extract(&doc, &name)?;
        Ok(UnexamResult {
            report,
            output_options: self.output_options,
        })
    }

    /// Extract from LaTeX text held in memory.
    pub fn extract_str(self, text: &str) -> Result<UnexamResult> {
        let pipeline = Pipeline::new(self.config(Path::new(INLINE_NAME)))?;
        let doc = pipeline.load_inline(text)?;
        let report = pipeline.extract(&doc, INLINE_NAME)?;
        Ok(UnexamResult {
            report,
            output_options: self.output_options,
        })
    }
}

impl Default for Unexam {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an extraction.
pub struct UnexamResult {
    /// Records and warnings
    pub report: ExtractionReport,
    /// Output options to use
    output_options: OutputOptions,
}

impl UnexamResult {
    /// The extracted records.
    pub fn problems(&self) -> &ProblemSet {
        &self.report.set
    }

    /// Warnings raised during extraction.
    pub fn warnings(&self) -> &[Warning] {
        &self.report.warnings
    }

    /// Render as CSV (with BOM).
    pub fn to_csv(&self) -> Result<String> {
        render::to_csv(&self.report.set)
    }

    /// Render as JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.report.set, &self.output_options, &self.report.warnings)
    }

    /// Write `<name>.csv` and `<name>.json` into `dir`.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<WrittenFiles> {
        render::write_problem_set(
            &self.report.set,
            dir.as_ref(),
            &self.output_options,
            &self.report.warnings,
        )
    }

    /// Counts for this extraction.
    pub fn stats(&self) -> ExtractionStats {
        self.report.stats()
    }
}
