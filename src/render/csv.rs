//! CSV rendering and reading for problem sets.
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet tools pick
//! the right encoding for Hangul text.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    ordinal_for, AnswerType, ExtractionConfidence, OptionCandidate, ProblemRecord, ProblemSet,
};
use crate::parser::{contains_math, MathDelimiter};

/// UTF-8 byte order mark written at the start of every CSV file.
pub const BOM: &str = "\u{FEFF}";

/// Column order of the CSV output.
pub const CSV_HEADERS: [&str; 6] = [
    "index",
    "question",
    "options",
    "answer_type",
    "points",
    "extraction_confidence",
];

const OPTION_SEPARATOR: &str = ", ";

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    index: String,
    question: String,
    options: String,
    answer_type: AnswerType,
    #[serde(default)]
    points: Option<u8>,
    #[serde(default)]
    extraction_confidence: ExtractionConfidence,
}

impl From<&ProblemRecord> for CsvRow {
    fn from(record: &ProblemRecord) -> Self {
        Self {
            index: record.index.clone(),
            question: record.question.clone(),
            options: record.options_column(),
            answer_type: record.answer_type,
            points: record.points,
            extraction_confidence: record.extraction_confidence,
        }
    }
}

/// Render a problem set as CSV, BOM and header row included.
pub fn to_csv(set: &ProblemSet) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for record in set.iter() {
        writer.serialize(CsvRow::from(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Render(format!("CSV flush error: {}", e)))?;
    let body =
        String::from_utf8(bytes).map_err(|e| Error::Render(format!("CSV encoding error: {}", e)))?;

    Ok(format!("{}{}", BOM, body))
}

/// Read a problem set back from CSV text. The BOM is optional.
///
/// `delimiters` decides which options count as formulas.
pub fn from_csv(
    text: &str,
    name: impl Into<String>,
    delimiters: &[MathDelimiter],
) -> Result<ProblemSet> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());

    let mut set = ProblemSet::new(name);
    for row in reader.deserialize::<CsvRow>() {
        let row = row?;
        let options = split_options_column(&row.options)
            .into_iter()
            .map(|item| parse_option(item, delimiters))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| match e {
                Error::Decode(msg) => Error::Decode(format!("problem {}: {}", row.index, msg)),
                other => other,
            })?;

        set.push(ProblemRecord {
            index: row.index,
            question: row.question,
            options,
            answer_type: row.answer_type,
            points: row.points,
            extraction_confidence: row.extraction_confidence,
        });
    }

    Ok(set)
}

/// Split an options column into `"{glyph} {text}"` items.
///
/// Only splits on `", "` when a circled glyph follows, so commas inside a
/// formula such as `$f(1, 2)$` stay put.
pub fn split_options_column(column: &str) -> Vec<&str> {
    let column = column.trim();
    if column.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut start = 0;
    for (pos, _) in column.match_indices(OPTION_SEPARATOR) {
        let after = pos + OPTION_SEPARATOR.len();
        let next = column[after..].chars().next();
        if next.is_some_and(|c| ordinal_for(c).is_some()) {
            items.push(&column[start..pos]);
            start = after;
        }
    }
    items.push(&column[start..]);
    items
}

fn parse_option(item: &str, delimiters: &[MathDelimiter]) -> Result<OptionCandidate> {
    let mut chars = item.chars();
    let glyph = chars
        .next()
        .ok_or_else(|| Error::Decode("empty option".to_string()))?;
    let ordinal = ordinal_for(glyph)
        .ok_or_else(|| Error::Decode(format!("option {:?} has no ordinal glyph", item)))?;

    let rest = chars.as_str();
    let raw_text = rest.strip_prefix(' ').unwrap_or(rest);
    let is_formula = contains_math(raw_text, delimiters);

    OptionCandidate::new(ordinal, raw_text, is_formula)
        .ok_or_else(|| Error::Decode(format!("invalid ordinal {}", ordinal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::default_delimiters;

    fn sample_set() -> ProblemSet {
        let mut set = ProblemSet::new("sample");
        set.push(ProblemRecord {
            index: "01".to_string(),
            question: "함수 $f(x)=x^2$의 최솟값은?".to_string(),
            options: vec![
                OptionCandidate::new(1, "$\\frac{15}{16}$", true).unwrap(),
                OptionCandidate::new(2, "1", false).unwrap(),
                OptionCandidate::new(3, "$f(1, 2)$", true).unwrap(),
            ],
            answer_type: AnswerType::MultipleChoice,
            points: Some(3),
            extraction_confidence: ExtractionConfidence::Partial,
        });
        set.push(ProblemRecord {
            index: "22".to_string(),
            question: "값을 구하시오, \"단\" 조건".to_string(),
            options: Vec::new(),
            answer_type: AnswerType::ShortAnswer,
            points: None,
            extraction_confidence: ExtractionConfidence::FreeResponse,
        });
        set
    }

    #[test]
    fn test_csv_header_and_bom() {
        let csv = to_csv(&sample_set()).unwrap();
        assert!(csv.starts_with(BOM));
        let first_line = csv.trim_start_matches(BOM).lines().next().unwrap();
        assert_eq!(
            first_line,
            "index,question,options,answer_type,points,extraction_confidence"
        );
        assert!(csv.contains("multiple_choice"));
        assert!(csv.contains("① $\\frac{15}{16}$, ② 1"));
    }

    #[test]
    fn test_empty_set_still_has_header() {
        let csv = to_csv(&ProblemSet::new("empty")).unwrap();
        assert_eq!(csv.trim_start_matches(BOM).lines().count(), 1);
    }

    #[test]
    fn test_csv_round_trip() {
        let set = sample_set();
        let csv = to_csv(&set).unwrap();
        let back = from_csv(&csv, "sample", &default_delimiters()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_read_without_bom_or_new_columns() {
        let text = "index,question,options,answer_type\n03,수열,\"① 2, ② 4\",multiple_choice\n";
        let set = from_csv(text, "old", &default_delimiters()).unwrap();
        let record = set.get("03").unwrap();
        assert_eq!(record.options.len(), 2);
        assert_eq!(record.points, None);
        assert_eq!(
            record.extraction_confidence,
            ExtractionConfidence::FreeResponse
        );
    }

    #[test]
    fn test_split_options_column() {
        assert_eq!(
            split_options_column("① $f(1, 2)$, ② 3, ⑤ x"),
            vec!["① $f(1, 2)$", "② 3", "⑤ x"]
        );
        assert!(split_options_column("  ").is_empty());
    }

    #[test]
    fn test_option_without_glyph_is_rejected() {
        let text = "index,question,options,answer_type\n04,q,1 2,multiple_choice\n";
        let err = from_csv(text, "bad", &default_delimiters()).unwrap_err();
        assert!(matches!(err, Error::Decode(msg) if msg.contains("problem 04")));
    }
}
