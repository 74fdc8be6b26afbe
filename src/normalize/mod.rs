//! Record normalizer.
//!
//! Turns a segmented problem and its extracted options into a
//! [`ProblemRecord`], and re-normalizes records read back from a previous
//! run (the "fix" pass).

mod cleanup;

pub use cleanup::{CleanupOptions, CleanupPreset, QuestionCleanup};

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{
    glyph_for, AnswerType, ExtractionConfidence, OptionCandidate, ProblemRecord, Warning,
};
use crate::parser::{contains_math, wrap_bare, DocumentRules, MathDelimiter};

static POINTS_REGEX: OnceLock<Regex> = OnceLock::new();

/// A problem as it comes out of segmentation and option extraction.
#[derive(Debug, Clone)]
pub struct RawProblem<'a> {
    pub index: &'a str,
    pub question: &'a str,
    pub options: Vec<OptionCandidate>,
    /// End-boundary token, e.g. "[4점]"
    pub boundary: &'a str,
    /// Whether options were expected (declared, or markers seen)
    pub expects_choices: bool,
}

/// A normalized record and the warning it raised, if any.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: ProblemRecord,
    pub warning: Option<Warning>,
}

/// Builds uniform records.
pub struct Normalizer {
    cleanup: QuestionCleanup,
    delimiters: Vec<MathDelimiter>,
    wrap_with: MathDelimiter,
}

impl Normalizer {
    /// Create a normalizer for a document's rules.
    pub fn new(rules: &DocumentRules, preset: CleanupPreset) -> Self {
        let options =
            CleanupOptions::from_preset(preset).with_lookahead_window(rules.lookahead_window);
        Self {
            cleanup: QuestionCleanup::new(options, rules.topic_keywords.clone()),
            delimiters: rules.math_delimiters.clone(),
            wrap_with: rules.primary_delimiter(),
        }
    }

    /// Clean question text. Idempotent.
    pub fn clean_question(&self, text: &str) -> String {
        self.cleanup.process(text)
    }

    /// Normalize a freshly extracted problem.
    pub fn normalize(&self, raw: RawProblem<'_>) -> Normalized {
        let found = raw.options.len();
        let confidence = ExtractionConfidence::assess(found, raw.expects_choices);

        let record = ProblemRecord {
            index: pad_index(raw.index),
            question: self.clean_question(raw.question),
            answer_type: AnswerType::from_option_count(found),
            points: parse_points(raw.boundary),
            extraction_confidence: confidence,
            options: raw.options,
        };

        finish(record)
    }

    /// Re-normalize a record from a previous run.
    ///
    /// Applies the question cleanup and the bare-option policy again and
    /// re-derives the answer type and confidence. Running it on its own
    /// output changes nothing.
    pub fn refresh(&self, record: &ProblemRecord) -> Normalized {
        let options: Vec<OptionCandidate> = record
            .options
            .iter()
            .filter_map(|option| self.refresh_option(option))
            .collect();

        let found = options.len();
        let confidence = match found {
            0 if record.extraction_confidence == ExtractionConfidence::OptionsMissing => {
                ExtractionConfidence::OptionsMissing
            }
            0 => ExtractionConfidence::FreeResponse,
            n => ExtractionConfidence::assess(n, true),
        };

        let refreshed = ProblemRecord {
            index: pad_index(&record.index),
            question: self.clean_question(&record.question),
            answer_type: AnswerType::from_option_count(found),
            points: record.points,
            extraction_confidence: confidence,
            options,
        };

        finish(refreshed)
    }

    fn refresh_option(&self, option: &OptionCandidate) -> Option<OptionCandidate> {
        let text = option.raw_text.trim();
        let glyph = glyph_for(option.ordinal)?;

        let (raw_text, is_formula) = if contains_math(text, &self.delimiters) {
            (text.to_string(), true)
        } else {
            wrap_bare(text, &self.wrap_with)
        };

        Some(OptionCandidate {
            ordinal: option.ordinal,
            display_glyph: glyph,
            raw_text,
            is_formula,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&DocumentRules::default(), CleanupPreset::default())
    }
}

fn finish(record: ProblemRecord) -> Normalized {
    let warning = match record.extraction_confidence {
        ExtractionConfidence::Partial | ExtractionConfidence::OptionsMissing => {
            Some(Warning::PartialOptions {
                index: record.index.clone(),
                found: record.options.len(),
            })
        }
        _ => None,
    };
    if let Some(w) = &warning {
        log::warn!("{}", w);
    }
    Normalized { record, warning }
}

/// Zero-pad numeric indices to two digits ("2" → "02"). Other labels are
/// kept as they are.
pub fn pad_index(index: &str) -> String {
    let trimmed = index.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>2}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Point value from an end marker such as "[4점]".
pub fn parse_points(boundary: &str) -> Option<u8> {
    let re = POINTS_REGEX.get_or_init(|| Regex::new(r"(\d+)\s*점").expect("static pattern"));
    re.captures(boundary)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
