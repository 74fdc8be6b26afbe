//! Problem-level types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Circled-digit glyphs for ordinals 1 through 5.
pub const OPTION_GLYPHS: [char; 5] = ['①', '②', '③', '④', '⑤'];

/// Maximum number of choices in a multiple-choice problem.
pub const MAX_OPTIONS: usize = 5;

/// Glyph for a 1-based ordinal.
pub fn glyph_for(ordinal: u8) -> Option<char> {
    match ordinal {
        1..=5 => Some(OPTION_GLYPHS[(ordinal - 1) as usize]),
        _ => None,
    }
}

/// Ordinal for a circled-digit glyph.
pub fn ordinal_for(glyph: char) -> Option<u8> {
    OPTION_GLYPHS
        .iter()
        .position(|&g| g == glyph)
        .map(|i| i as u8 + 1)
}

/// Extent of one problem within a document body.
///
/// Offsets are byte offsets into the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSpan {
    /// Display label (e.g. "02")
    pub index: String,

    /// Start of the question text
    pub start_offset: usize,

    /// End of the question text, where the end-boundary token begins
    pub end_offset: usize,

    /// Text after the end-boundary token up to the next problem or section
    pub trailing: Range<usize>,

    /// The end-boundary token as matched (e.g. "[4점]")
    pub boundary: String,
}

impl ProblemSpan {
    /// Question text of this span.
    pub fn question<'a>(&self, body: &'a str) -> &'a str {
        &body[self.start_offset..self.end_offset]
    }

    /// Trailing text that may hold the option list.
    pub fn trailing_text<'a>(&self, body: &'a str) -> &'a str {
        &body[self.trailing.clone()]
    }
}

/// One multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCandidate {
    /// 1-based position
    pub ordinal: u8,

    /// Circled-digit glyph for the ordinal
    pub display_glyph: char,

    /// Formula fragment or bare literal
    pub raw_text: String,

    /// Whether `raw_text` carries math delimiters
    pub is_formula: bool,
}

impl OptionCandidate {
    /// Create an option. Returns `None` for ordinals outside 1..=5.
    pub fn new(ordinal: u8, raw_text: impl Into<String>, is_formula: bool) -> Option<Self> {
        Some(Self {
            ordinal,
            display_glyph: glyph_for(ordinal)?,
            raw_text: raw_text.into(),
            is_formula,
        })
    }

    /// `"{glyph} {raw_text}"`, the form used in the CSV options column.
    pub fn display(&self) -> String {
        format!("{} {}", self.display_glyph, self.raw_text)
    }
}

/// Whether a problem is answered by choosing or by writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    MultipleChoice,
    ShortAnswer,
}

impl AnswerType {
    /// Derive from the number of recovered options.
    pub fn from_option_count(count: usize) -> Self {
        if count >= 1 {
            AnswerType::MultipleChoice
        } else {
            AnswerType::ShortAnswer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::MultipleChoice => "multiple_choice",
            AnswerType::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multiple_choice" => Ok(AnswerType::MultipleChoice),
            "short_answer" => Ok(AnswerType::ShortAnswer),
            other => Err(format!("Unknown answer type: {}", other)),
        }
    }
}

/// How much of the option list was recovered.
///
/// Kept apart from [`AnswerType`] so that "no options because extraction
/// failed" does not look like "no options because the problem is free
/// response".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionConfidence {
    /// All five options were found
    Complete,
    /// Between one and four options were found
    Partial,
    /// Options were expected but none were found
    OptionsMissing,
    /// No options expected and none found
    #[default]
    FreeResponse,
}

impl ExtractionConfidence {
    /// Derive from the option count and whether options were expected.
    pub fn assess(found: usize, expected_choices: bool) -> Self {
        match found {
            0 if expected_choices => ExtractionConfidence::OptionsMissing,
            0 => ExtractionConfidence::FreeResponse,
            n if n >= MAX_OPTIONS => ExtractionConfidence::Complete,
            _ => ExtractionConfidence::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionConfidence::Complete => "complete",
            ExtractionConfidence::Partial => "partial",
            ExtractionConfidence::OptionsMissing => "options_missing",
            ExtractionConfidence::FreeResponse => "free_response",
        }
    }

    /// Whether a human should look at this record.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            ExtractionConfidence::Partial | ExtractionConfidence::OptionsMissing
        )
    }
}

impl fmt::Display for ExtractionConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionConfidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "complete" => Ok(ExtractionConfidence::Complete),
            "partial" => Ok(ExtractionConfidence::Partial),
            "options_missing" => Ok(ExtractionConfidence::OptionsMissing),
            "free_response" => Ok(ExtractionConfidence::FreeResponse),
            other => Err(format!("Unknown extraction confidence: {}", other)),
        }
    }
}

/// One normalized problem, the unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    /// Zero-padded display index
    pub index: String,

    /// Cleaned question text
    pub question: String,

    /// Options in ordinal order
    pub options: Vec<OptionCandidate>,

    /// `multiple_choice` if any option was recovered
    pub answer_type: AnswerType,

    /// Point value read from the end marker
    #[serde(default)]
    pub points: Option<u8>,

    #[serde(default)]
    pub extraction_confidence: ExtractionConfidence,
}

impl ProblemRecord {
    /// Options joined the way the CSV options column stores them.
    pub fn options_column(&self) -> String {
        self.options
            .iter()
            .map(OptionCandidate::display)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check the ordinal invariant: unique and strictly increasing.
    pub fn has_ordered_options(&self) -> bool {
        self.options.windows(2).all(|w| w[0].ordinal < w[1].ordinal)
    }
}

/// All problems extracted from one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSet {
    /// Base name shared by the output files
    pub name: String,

    /// Records in document order
    pub records: Vec<ProblemRecord>,
}

impl ProblemSet {
    /// Create an empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push(&mut self, record: ProblemRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProblemRecord> {
        self.records.iter()
    }

    /// Look up a record by its display index.
    pub fn get(&self, index: &str) -> Option<&ProblemRecord> {
        self.records.iter().find(|r| r.index == index)
    }

    /// Number of records a human should review.
    pub fn review_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.extraction_confidence.needs_review())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_table() {
        assert_eq!(glyph_for(1), Some('①'));
        assert_eq!(glyph_for(5), Some('⑤'));
        assert_eq!(glyph_for(0), None);
        assert_eq!(glyph_for(6), None);
        assert_eq!(ordinal_for('③'), Some(3));
        assert_eq!(ordinal_for('3'), None);
    }

    #[test]
    fn test_option_candidate_display() {
        let option = OptionCandidate::new(2, "$\\frac{1}{2}$", true).unwrap();
        assert_eq!(option.display(), "② $\\frac{1}{2}$");
        assert!(OptionCandidate::new(6, "x", false).is_none());
    }

    #[test]
    fn test_answer_type_from_count() {
        assert_eq!(AnswerType::from_option_count(0), AnswerType::ShortAnswer);
        assert_eq!(AnswerType::from_option_count(3), AnswerType::MultipleChoice);
        assert_eq!(AnswerType::from_option_count(5), AnswerType::MultipleChoice);
    }

    #[test]
    fn test_confidence_assess() {
        assert_eq!(
            ExtractionConfidence::assess(5, true),
            ExtractionConfidence::Complete
        );
        assert_eq!(
            ExtractionConfidence::assess(3, false),
            ExtractionConfidence::Partial
        );
        assert_eq!(
            ExtractionConfidence::assess(0, true),
            ExtractionConfidence::OptionsMissing
        );
        assert_eq!(
            ExtractionConfidence::assess(0, false),
            ExtractionConfidence::FreeResponse
        );
        assert!(ExtractionConfidence::Partial.needs_review());
        assert!(!ExtractionConfidence::FreeResponse.needs_review());
    }

    #[test]
    fn test_options_column() {
        let record = ProblemRecord {
            index: "01".to_string(),
            question: "q".to_string(),
            options: vec![
                OptionCandidate::new(1, "1", false).unwrap(),
                OptionCandidate::new(2, "$-2$", true).unwrap(),
            ],
            answer_type: AnswerType::MultipleChoice,
            points: Some(2),
            extraction_confidence: ExtractionConfidence::Partial,
        };
        assert_eq!(record.options_column(), "① 1, ② $-2$");
        assert!(record.has_ordered_options());
    }

    #[test]
    fn test_span_slices() {
        let body = "문제 본문 [3점] (1) 2";
        let marker = body.find("[3점]").unwrap();
        let span = ProblemSpan {
            index: "01".to_string(),
            start_offset: 0,
            end_offset: marker,
            trailing: (marker + "[3점]".len())..body.len(),
            boundary: "[3점]".to_string(),
        };
        assert_eq!(span.question(body), "문제 본문 ");
        assert_eq!(span.trailing_text(body), " (1) 2");
    }

    #[test]
    fn test_record_json_uses_snake_case() {
        let record = ProblemRecord {
            index: "07".to_string(),
            question: "극한값은?".to_string(),
            options: Vec::new(),
            answer_type: AnswerType::ShortAnswer,
            points: None,
            extraction_confidence: ExtractionConfidence::FreeResponse,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"answer_type\":\"short_answer\""));
        assert!(json.contains("\"extraction_confidence\":\"free_response\""));
        assert!(json.contains("극한값은?"));
    }
}
