//! Sink writer: persists a problem set as `<name>.csv` and `<name>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use super::csv::{from_csv, to_csv};
use super::json::{from_json, to_json};
use super::options::OutputOptions;
use crate::error::{Error, Result};
use crate::model::{ProblemSet, Warning};
use crate::parser::MathDelimiter;

/// Paths of the files written for one problem set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Write `<dir>/<name>.csv` and `<dir>/<name>.json`, replacing any
/// previous files.
///
/// Both documents are rendered before either file is touched, but the two
/// writes are not atomic as a pair.
pub fn write_problem_set(
    set: &ProblemSet,
    dir: &Path,
    options: &OutputOptions,
    warnings: &[Warning],
) -> Result<WrittenFiles> {
    if set.name.trim().is_empty() {
        return Err(Error::Config("output name is empty".to_string()));
    }

    let csv = to_csv(set)?;
    let json = to_json(set, options, warnings)?;

    fs::create_dir_all(dir)?;
    let written = WrittenFiles {
        csv: dir.join(format!("{}.csv", set.name)),
        json: dir.join(format!("{}.json", set.name)),
    };

    fs::write(&written.csv, csv)?;
    fs::write(&written.json, json)?;

    log::info!(
        "Wrote {} problems to {} and {}",
        set.len(),
        written.csv.display(),
        written.json.display()
    );
    Ok(written)
}

/// Read a previously written problem set; the format follows the file
/// extension (`.csv` or `.json`). The set name is the file stem unless the
/// JSON document carries one.
pub fn read_problem_set(path: &Path, delimiters: &[MathDelimiter]) -> Result<ProblemSet> {
    let text = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("problems")
        .to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let set = match extension.as_deref() {
        Some("csv") => from_csv(&text, stem, delimiters)?,
        Some("json") => from_json(&text, &stem)?,
        _ => {
            return Err(Error::Config(format!(
                "{}: expected a .csv or .json file",
                path.display()
            )))
        }
    };

    log::debug!("Read {} problems from {}", set.len(), path.display());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerType, ExtractionConfidence, ProblemRecord};
    use crate::parser::default_delimiters;
    use tempfile::tempdir;

    fn one_record_set(name: &str) -> ProblemSet {
        let mut set = ProblemSet::new(name);
        set.push(ProblemRecord {
            index: "30".to_string(),
            question: "자연수 n의 값을 구하시오.".to_string(),
            options: Vec::new(),
            answer_type: AnswerType::ShortAnswer,
            points: Some(4),
            extraction_confidence: ExtractionConfidence::FreeResponse,
        });
        set
    }

    #[test]
    fn test_write_creates_directory_and_pair() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        let written =
            write_problem_set(&one_record_set("exam"), &out, &OutputOptions::new(), &[]).unwrap();

        assert_eq!(written.csv, out.join("exam.csv"));
        assert!(written.csv.exists());
        assert!(written.json.exists());
    }

    #[test]
    fn test_write_replaces_previous_files() {
        let dir = tempdir().unwrap();
        let options = OutputOptions::new();

        let mut big = one_record_set("exam");
        big.push(big.records[0].clone());
        write_problem_set(&big, dir.path(), &options, &[]).unwrap();
        let written = write_problem_set(&one_record_set("exam"), dir.path(), &options, &[]).unwrap();

        let back = read_problem_set(&written.csv, &default_delimiters()).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_read_back_both_formats() {
        let dir = tempdir().unwrap();
        let set = one_record_set("exam");
        let written = write_problem_set(&set, dir.path(), &OutputOptions::new(), &[]).unwrap();

        assert_eq!(read_problem_set(&written.csv, &default_delimiters()).unwrap(), set);
        assert_eq!(read_problem_set(&written.json, &default_delimiters()).unwrap(), set);
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempdir().unwrap();
        let result = write_problem_set(&ProblemSet::new(" "), dir.path(), &OutputOptions::new(), &[]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exam.txt");
        fs::write(&path, "x").unwrap();
        assert!(matches!(
            read_problem_set(&path, &default_delimiters()),
            Err(Error::Config(_))
        ));
    }
}
