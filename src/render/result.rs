//! Extraction statistics.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerType, ExtractionConfidence, ProblemSet, Warning};

/// Counts collected over one or more extraction runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Documents processed
    pub document_count: u32,

    /// Records produced
    pub problem_count: u32,

    /// Records with at least one option
    pub multiple_choice_count: u32,

    /// Records without options
    pub short_answer_count: u32,

    /// Records with all five options
    pub complete_count: u32,

    /// Records that need a human look
    pub review_count: u32,

    /// Rules that matched nothing
    pub missing_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics for a single document.
    pub fn from_run(set: &ProblemSet, warnings: &[Warning]) -> Self {
        let mut stats = Self {
            document_count: 1,
            ..Self::default()
        };

        for record in set.iter() {
            stats.problem_count += 1;
            match record.answer_type {
                AnswerType::MultipleChoice => stats.multiple_choice_count += 1,
                AnswerType::ShortAnswer => stats.short_answer_count += 1,
            }
            if record.extraction_confidence == ExtractionConfidence::Complete {
                stats.complete_count += 1;
            }
            if record.extraction_confidence.needs_review() {
                stats.review_count += 1;
            }
        }

        stats.missing_count = warnings
            .iter()
            .filter(|w| matches!(w, Warning::MissingProblem { .. }))
            .count() as u32;
        stats
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.document_count += other.document_count;
        self.problem_count += other.problem_count;
        self.multiple_choice_count += other.multiple_choice_count;
        self.short_answer_count += other.short_answer_count;
        self.complete_count += other.complete_count;
        self.review_count += other.review_count;
        self.missing_count += other.missing_count;
    }
}
