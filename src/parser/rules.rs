//! Declarative per-document rule table.
//!
//! Problems in a source are not delimited by one uniform marker, so each
//! document ships a table of `(index, start patterns, end boundary)` rows.
//! Rules are plain data, usually loaded from TOML:
//!
//! ```toml
//! end_boundary = '\[\s*\d+\s*점\s*\]'
//! section_boundary = '\\section\*?\{'
//!
//! [[problems]]
//! index = "1"
//! start = ['함수\s*\$f\(x\)', '다음 조건을']
//!
//! [[problems]]
//! index = "2"
//! start = ['수열 \$\\\{a_n\\\}']
//! kind = "short_answer"
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::AnswerType;

/// Default end boundary: a point-value marker such as `[4점]`.
pub const DEFAULT_END_BOUNDARY: &str = r"\[\s*\d+\s*점\s*\]";

/// A pair of math-markup delimiters (e.g. `$`…`$`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathDelimiter {
    pub open: String,
    pub close: String,
}

impl MathDelimiter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Wrap `text` in this delimiter pair.
    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.open, text, self.close)
    }

    /// Whether `text` holds an open delimiter followed later by a close one.
    pub fn occurs_in(&self, text: &str) -> bool {
        if self.open.is_empty() || self.close.is_empty() {
            return false;
        }
        text.find(&self.open)
            .map(|pos| text[pos + self.open.len()..].contains(&self.close))
            .unwrap_or(false)
    }
}

/// Default delimiters: `$…$` then `\(…\)`.
pub fn default_delimiters() -> Vec<MathDelimiter> {
    vec![MathDelimiter::new("$", "$"), MathDelimiter::new("\\(", "\\)")]
}

/// Whether `text` contains any of the recognized delimiter pairs.
pub fn contains_math(text: &str, delimiters: &[MathDelimiter]) -> bool {
    delimiters.iter().any(|d| d.occurs_in(text))
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRule {
    /// Display index ("1", "02", ...)
    pub index: String,

    /// Start patterns in priority order
    pub start: Vec<String>,

    /// End boundary pattern; the document default when absent
    #[serde(default)]
    pub end: Option<String>,

    /// Declared answer type, when known up front
    #[serde(default)]
    pub kind: Option<AnswerType>,
}

impl ProblemRule {
    /// Create a rule with one or more start patterns.
    pub fn new<I, S>(index: impl Into<String>, start: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: index.into(),
            start: start.into_iter().map(Into::into).collect(),
            end: None,
            kind: None,
        }
    }

    /// Override the end boundary pattern.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Declare the answer type.
    pub fn with_kind(mut self, kind: AnswerType) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Everything the pipeline needs to know about one document's layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRules {
    /// Marker opening the document body
    pub begin_marker: String,

    /// Marker closing the document body
    pub end_marker: String,

    /// Recognized math delimiters; the first is used for re-wrapping
    pub math_delimiters: Vec<MathDelimiter>,

    /// End boundary used by rules that do not set their own
    pub end_boundary: String,

    /// Heading that closes the option region of the preceding problem
    pub section_boundary: Option<String>,

    /// Words that mark where real question text begins
    pub topic_keywords: Vec<String>,

    /// How many characters to scan for a topic keyword during cleanup
    pub lookahead_window: usize,

    /// The rule table, in document order
    pub problems: Vec<ProblemRule>,
}

impl Default for DocumentRules {
    fn default() -> Self {
        Self {
            begin_marker: "\\begin{document}".to_string(),
            end_marker: "\\end{document}".to_string(),
            math_delimiters: default_delimiters(),
            end_boundary: DEFAULT_END_BOUNDARY.to_string(),
            section_boundary: None,
            topic_keywords: default_topic_keywords(),
            lookahead_window: 200,
            problems: Vec::new(),
        }
    }
}

fn default_topic_keywords() -> Vec<String> {
    [
        "다음", "함수", "수열", "두 ", "세 ", "좌표평면", "실수", "자연수", "정수", "확률",
        "삼각형", "곡선", "등차", "등비", "집합", "상수", "양수", "이차",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl DocumentRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load rules from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Append a problem rule.
    pub fn with_problem(mut self, rule: ProblemRule) -> Self {
        self.problems.push(rule);
        self
    }

    /// Set the body markers.
    pub fn with_markers(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.begin_marker = begin.into();
        self.end_marker = end.into();
        self
    }

    /// Set the section boundary pattern.
    pub fn with_section_boundary(mut self, pattern: impl Into<String>) -> Self {
        self.section_boundary = Some(pattern.into());
        self
    }

    /// Replace the topic keyword list.
    pub fn with_topic_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Delimiter used when re-wrapping bare algebraic options.
    pub fn primary_delimiter(&self) -> MathDelimiter {
        self.math_delimiters
            .first()
            .cloned()
            .unwrap_or_else(|| MathDelimiter::new("$", "$"))
    }

    /// Compile every pattern. Fails on the first invalid regex.
    pub fn compile(&self) -> Result<CompiledRules> {
        let default_end = Regex::new(&self.end_boundary)?;

        let mut rules = Vec::with_capacity(self.problems.len());
        for rule in &self.problems {
            if rule.start.is_empty() {
                return Err(Error::Config(format!(
                    "problem {} has no start pattern",
                    rule.index
                )));
            }
            let starts = rule
                .start
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let end = match &rule.end {
                Some(p) => Regex::new(p)?,
                None => default_end.clone(),
            };
            rules.push(CompiledRule {
                index: rule.index.clone(),
                starts,
                end,
                kind: rule.kind,
            });
        }

        let section_boundary = self
            .section_boundary
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        Ok(CompiledRules {
            rules,
            section_boundary,
        })
    }
}

/// A rule with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub index: String,
    pub starts: Vec<Regex>,
    pub end: Regex,
    pub kind: Option<AnswerType>,
}

/// The rule table ready for segmentation.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
    pub section_boundary: Option<Regex>,
}

impl CompiledRules {
    /// Look up a rule by display index.
    pub fn get(&self, index: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_from_toml() {
        let toml = r#"
end_boundary = '\[\d점\]'
section_boundary = '\\section'
topic_keywords = ["함수"]

[[problems]]
index = "1"
start = ['함수 \$f']

[[problems]]
index = "2"
start = ['수열', '등차수열']
end = '\[4점\]'
kind = "short_answer"
"#;
        let rules = DocumentRules::from_toml_str(toml).unwrap();
        assert_eq!(rules.problems.len(), 2);
        assert_eq!(rules.problems[1].start.len(), 2);
        assert_eq!(rules.problems[1].kind, Some(AnswerType::ShortAnswer));
        assert_eq!(rules.topic_keywords, vec!["함수".to_string()]);
        // Unset fields keep their defaults
        assert_eq!(rules.begin_marker, "\\begin{document}");
        assert_eq!(rules.lookahead_window, 200);

        let compiled = rules.compile().unwrap();
        assert_eq!(compiled.rules.len(), 2);
        assert!(compiled.section_boundary.is_some());
        assert!(compiled.get("2").unwrap().end.is_match("[4점]"));
    }

    #[test]
    fn test_invalid_pattern_fails_compile() {
        let rules = DocumentRules::new().with_problem(ProblemRule::new("1", ["(unclosed"]));
        assert!(matches!(rules.compile(), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_empty_start_list_fails_compile() {
        let rules = DocumentRules::new().with_problem(ProblemRule::new("1", Vec::<String>::new()));
        assert!(matches!(rules.compile(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_toml() {
        let result = DocumentRules::from_toml_str("problems = 3");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_default_end_boundary() {
        let re = Regex::new(DEFAULT_END_BOUNDARY).unwrap();
        assert!(re.is_match("[4점]"));
        assert!(re.is_match("[ 3 점 ]"));
        assert!(!re.is_match("[4]"));
    }

    #[test]
    fn test_delimiter_detection() {
        let delims = default_delimiters();
        assert!(contains_math("$x^2$", &delims));
        assert!(contains_math("\\(\\sqrt{2}\\)", &delims));
        assert!(!contains_math("12", &delims));
        assert!(!contains_math("$12", &delims));
        assert_eq!(delims[0].wrap("-3"), "$-3$");
    }
}
