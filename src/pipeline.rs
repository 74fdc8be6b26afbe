//! Extraction pipeline.
//!
//! Source Loader → Problem Segmenter → Option Extractor → Record Normalizer
//! → Sink Writer, run straight through for one document at a time.
//!
//! # Example
//!
//! ```no_run
//! use unexam::{DocumentRules, Pipeline, PipelineConfig};
//!
//! fn main() -> unexam::Result<()> {
//!     let config = PipelineConfig::new("2024_suneung.tex")
//!         .with_rules(DocumentRules::from_file("2024_suneung.toml")?)
//!         .with_output_dir("out");
//!
//!     let report = Pipeline::new(config)?.run()?;
//!     for warning in &report.warnings {
//!         eprintln!("{}", warning);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{AnswerType, ProblemSet, SourceDocument, SourceKind, Warning};
use crate::normalize::{pad_index, CleanupPreset, Normalizer, RawProblem};
use crate::parser::{
    has_ordinal_markers, segment, CompiledRules, DocumentRules, LoadOptions, LopdfTextSource,
    OptionExtractor, PageSelection, PdfTextSource, Segmentation, SourceLoader,
};
use crate::render::{read_problem_set, write_problem_set, ExtractionStats, OutputOptions, WrittenFiles};

/// Output name used when none is given and the source has no file stem.
const FALLBACK_NAME: &str = "problems";

/// Everything one run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source file (LaTeX or PDF)
    pub source_path: PathBuf,

    /// Source kind; detected from the file when `None`
    pub source_kind: Option<SourceKind>,

    /// Directory receiving `<name>.csv` and `<name>.json`
    pub output_dir: PathBuf,

    /// Base name of the output files; the source file stem when `None`
    pub output_name: Option<String>,

    /// Loading options (PDF page selection, error mode)
    pub load: LoadOptions,

    /// Per-document rule table and layout settings
    pub rules: DocumentRules,

    /// Question cleanup level
    pub cleanup: CleanupPreset,

    /// JSON layout and format
    pub output: OutputOptions,
}

impl PipelineConfig {
    /// Create a configuration for `source_path` with default settings.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            source_kind: None,
            output_dir: PathBuf::from("."),
            output_name: None,
            load: LoadOptions::default(),
            rules: DocumentRules::default(),
            cleanup: CleanupPreset::default(),
            output: OutputOptions::default(),
        }
    }

    /// Force the source kind instead of detecting it.
    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = Some(kind);
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the output base name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Set loading options.
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Select PDF pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.load.pages = pages;
        self
    }

    /// Skip PDF pages that fail to extract.
    pub fn lenient(mut self) -> Self {
        self.load = self.load.lenient();
        self
    }

    /// Set the document rules.
    pub fn with_rules(mut self, rules: DocumentRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = preset;
        self
    }

    /// Set output options.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Output base name for this configuration's source.
    pub fn resolved_output_name(&self) -> String {
        self.output_name
            .clone()
            .unwrap_or_else(|| name_from_path(&self.source_path))
    }
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Records in document order
    pub set: ProblemSet,

    /// Data-quality warnings in the order they were raised
    pub warnings: Vec<Warning>,

    /// Files written, when the run wrote any
    pub written: Option<WrittenFiles>,
}

impl ExtractionReport {
    /// Counts for this run.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats::from_run(&self.set, &self.warnings)
    }
}

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<ExtractionReport>,
}

/// What the segmenter and extractor saw for one span, without cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanSummary {
    pub index: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub boundary: String,
    pub option_count: usize,
}

/// The extraction pipeline, with rules compiled once.
pub struct Pipeline {
    config: PipelineConfig,
    compiled: CompiledRules,
    extractor: OptionExtractor,
    normalizer: Normalizer,
    pdf: Box<dyn PdfTextSource>,
}

impl Pipeline {
    /// Compile the rule table and set up the stages. Fails on an invalid
    /// pattern.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let compiled = config.rules.compile()?;
        let extractor = OptionExtractor::new(config.rules.math_delimiters.clone());
        let normalizer = Normalizer::new(&config.rules, config.cleanup);

        log::debug!(
            "Pipeline ready: {} rules, source {}",
            compiled.rules.len(),
            config.source_path.display()
        );

        Ok(Self {
            config,
            compiled,
            extractor,
            normalizer,
            pdf: Box::new(LopdfTextSource::new()),
        })
    }

    /// Replace the PDF text collaborator.
    pub fn with_pdf_source(mut self, pdf: impl PdfTextSource + 'static) -> Self {
        self.pdf = Box::new(pdf);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn loader(&self) -> SourceLoader<'_> {
        SourceLoader::new(&self.config.rules, self.pdf.as_ref())
            .with_options(self.config.load.clone())
    }

    /// Load the configured source.
    pub fn load(&self) -> Result<SourceDocument> {
        self.load_path(&self.config.source_path)
    }

    /// Load any source with this pipeline's settings.
    pub fn load_path(&self, path: &Path) -> Result<SourceDocument> {
        self.loader().load(path, self.config.source_kind)
    }

    /// Load LaTeX text held in memory.
    pub fn load_inline(&self, text: &str) -> Result<SourceDocument> {
        self.loader().load_inline(text)
    }

    /// Segment a document body.
    pub fn segment(&self, doc: &SourceDocument) -> Segmentation {
        segment(doc.body(), &self.compiled)
    }

    /// Segment, extract and normalize. Does no IO.
    pub fn extract(&self, doc: &SourceDocument, name: &str) -> Result<ExtractionReport> {
        if !doc.has_body() {
            return Err(Error::NoBodyAvailable(format!(
                "{}: body is empty",
                doc.display_name()
            )));
        }

        let body = doc.body();
        let segmentation = self.segment(doc);

        let mut warnings: Vec<Warning> = segmentation
            .warnings
            .into_iter()
            .map(|w| match w {
                Warning::MissingProblem { index } => Warning::MissingProblem {
                    index: pad_index(&index),
                },
                other => other,
            })
            .collect();

        let mut set = ProblemSet::new(name);
        for span in &segmentation.spans {
            let trailing = span.trailing_text(body);
            let declared = self.compiled.get(&span.index).and_then(|rule| rule.kind);

            let (options, expects_choices) = match declared {
                Some(AnswerType::ShortAnswer) => (Vec::new(), false),
                Some(AnswerType::MultipleChoice) => (self.extractor.extract(trailing), true),
                None => (
                    self.extractor.extract(trailing),
                    has_ordinal_markers(trailing),
                ),
            };
            log::debug!("Problem {}: {} options", span.index, options.len());

            let normalized = self.normalizer.normalize(RawProblem {
                index: &span.index,
                question: span.question(body),
                options,
                boundary: &span.boundary,
                expects_choices,
            });

            warnings.extend(normalized.warning);
            set.push(normalized.record);
        }

        log::info!(
            "Extracted {} problems from {} ({} warnings)",
            set.len(),
            doc.display_name(),
            warnings.len()
        );

        Ok(ExtractionReport {
            set,
            warnings,
            written: None,
        })
    }

    /// Per-span view of a document for diagnostics.
    pub fn inspect(&self, doc: &SourceDocument) -> (Vec<SpanSummary>, Vec<Warning>) {
        let body = doc.body();
        let segmentation = self.segment(doc);

        let spans = segmentation
            .spans
            .iter()
            .map(|span| SpanSummary {
                index: span.index.clone(),
                start_offset: span.start_offset,
                end_offset: span.end_offset,
                boundary: span.boundary.clone(),
                option_count: self.extractor.extract(span.trailing_text(body)).len(),
            })
            .collect();

        (spans, segmentation.warnings)
    }

    /// Run the configured source end to end and write the output pair.
    pub fn run(&self) -> Result<ExtractionReport> {
        let name = self.config.resolved_output_name();
        self.run_source(&self.config.source_path, &name)
    }

    /// Run one source end to end, writing `<name>.csv` and `<name>.json`
    /// into the configured output directory.
    pub fn run_source(&self, path: &Path, name: &str) -> Result<ExtractionReport> {
        let doc = self.load_path(path)?;
        let mut report = self.extract(&doc, name)?;

        let written = write_problem_set(
            &report.set,
            &self.config.output_dir,
            &self.config.output,
            &report.warnings,
        )?;
        report.written = Some(written);
        Ok(report)
    }

    /// Run several sources in order; one failure does not stop the rest.
    /// Output names come from the file stems.
    pub fn run_batch<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<BatchOutcome> {
        self.run_batch_with(paths, |_| {})
    }

    /// Like [`run_batch`](Self::run_batch), calling `on_done` after each
    /// document.
    pub fn run_batch_with<P, F>(&self, paths: &[P], mut on_done: F) -> Vec<BatchOutcome>
    where
        P: AsRef<Path>,
        F: FnMut(&BatchOutcome),
    {
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let result = self.run_source(path, &name_from_path(path));
            if let Err(e) = &result {
                log::warn!("{}: {}", path.display(), e);
            }

            let outcome = BatchOutcome {
                path: path.to_path_buf(),
                result,
            };
            on_done(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Re-normalize a previously written CSV or JSON file and rewrite the
    /// pair into `output_dir` under the input's file stem.
    pub fn refresh_file(&self, input: &Path, output_dir: &Path) -> Result<ExtractionReport> {
        let previous = read_problem_set(input, &self.config.rules.math_delimiters)?;

        let mut set = ProblemSet::new(name_from_path(input));
        let mut warnings = Vec::new();
        for record in previous.iter() {
            let normalized = self.normalizer.refresh(record);
            warnings.extend(normalized.warning);
            set.push(normalized.record);
        }

        let written = write_problem_set(&set, output_dir, &self.config.output, &warnings)?;
        Ok(ExtractionReport {
            set,
            warnings,
            written: Some(written),
        })
    }
}

fn name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionConfidence;
    use crate::parser::ProblemRule;

    const SOURCE: &str = "\\documentclass{article}\n\\begin{document}\n\
        1. 함수 $f(x)=x^2-2x$의 최솟값은? [2점]\n\
        (1) $-2$ \\\\ (2) $-1$ \\\\ (3) 0 \\\\ (4) 1 \\\\ (5) 2\n\
        2. 수열 $\\{a_n\\}$에 대하여 $a_3$의 값을 구하시오. [3점]\n\
        \\end{document}\n";

    fn rules() -> DocumentRules {
        DocumentRules::new()
            .with_problem(ProblemRule::new("1", [r"함수 \$f\(x\)"]))
            .with_problem(ProblemRule::new("2", [r"수열"]))
            .with_problem(ProblemRule::new("3", [r"확률"]))
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::new("exam.tex").with_rules(rules())).unwrap()
    }

    #[test]
    fn test_extract_inline() {
        let pipeline = pipeline();
        let doc = pipeline.load_inline(SOURCE).unwrap();
        let report = pipeline.extract(&doc, "exam").unwrap();

        assert_eq!(report.set.len(), 2);
        let first = report.set.get("01").unwrap();
        assert_eq!(first.options.len(), 5);
        assert_eq!(first.points, Some(2));
        assert_eq!(first.extraction_confidence, ExtractionConfidence::Complete);

        let second = report.set.get("02").unwrap();
        assert_eq!(second.answer_type, AnswerType::ShortAnswer);
        assert_eq!(second.extraction_confidence, ExtractionConfidence::FreeResponse);

        assert_eq!(
            report.warnings,
            vec![Warning::MissingProblem {
                index: "03".to_string()
            }]
        );
        assert_eq!(report.stats().missing_count, 1);
    }

    #[test]
    fn test_declared_short_answer_skips_options() {
        let rules = DocumentRules::new().with_problem(
            ProblemRule::new("1", ["함수"]).with_kind(AnswerType::ShortAnswer),
        );
        let pipeline =
            Pipeline::new(PipelineConfig::new("exam.tex").with_rules(rules)).unwrap();
        let doc = pipeline.load_inline(SOURCE).unwrap();
        let report = pipeline.extract(&doc, "exam").unwrap();

        assert!(report.set.records[0].options.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_inspect_counts_options() {
        let pipeline = pipeline();
        let doc = pipeline.load_inline(SOURCE).unwrap();
        let (spans, warnings) = pipeline.inspect(&doc);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].option_count, 5);
        assert_eq!(spans[1].option_count, 0);
        assert_eq!(spans[0].boundary, "[2점]");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_invalid_rule_fails_construction() {
        let rules = DocumentRules::new().with_problem(ProblemRule::new("1", ["("]));
        let result = Pipeline::new(PipelineConfig::new("x.tex").with_rules(rules));
        assert!(matches!(result, Err(Error::Pattern(_))));
    }

    #[test]
    fn test_output_name_resolution() {
        let config = PipelineConfig::new("dir/2024_수능.tex");
        assert_eq!(config.resolved_output_name(), "2024_수능");
        assert_eq!(
            config.with_output_name("custom").resolved_output_name(),
            "custom"
        );
        assert_eq!(name_from_path(Path::new("")), FALLBACK_NAME);
    }
}
