//! Question text cleanup.
//!
//! Every stage is idempotent and so is the whole pipeline: cleaning an
//! already cleaned question returns it unchanged.

use std::borrow::Cow;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Unicode NFC and whitespace collapsing only
    Minimal,
    /// Minimal + ligatures, replacement chars and leftover option fragments
    #[default]
    Standard,
    /// Standard + PUA removal and CJK line merging (for PDF text layers)
    Aggressive,
}

/// Options for question cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Fix ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Join Hangul/Han characters split by a single line break
    pub merge_cjk_lines: bool,

    /// Strip a leading fragment left over from the previous problem's options
    pub strip_option_artifacts: bool,

    /// Characters scanned for a topic keyword when stripping artifacts
    pub lookahead_window: usize,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
            remove_pua: false,
            remove_replacement_char: false,
            merge_cjk_lines: false,
            strip_option_artifacts: false,
            lookahead_window: 200,
        }
    }

    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_pua: false,
            remove_replacement_char: true,
            merge_cjk_lines: false,
            strip_option_artifacts: true,
            lookahead_window: 200,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_pua: true,
            remove_replacement_char: true,
            merge_cjk_lines: true,
            strip_option_artifacts: true,
            lookahead_window: 200,
        }
    }

    /// Set the keyword lookahead window (in characters).
    pub fn with_lookahead_window(mut self, window: usize) -> Self {
        self.lookahead_window = window;
        self
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Question cleanup pipeline.
pub struct QuestionCleanup {
    options: CleanupOptions,
    topic_keywords: Vec<String>,
    whitespace: Regex,
    leading_marker: Regex,
    cjk_break: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl QuestionCleanup {
    /// Create a pipeline. Keywords that themselves start with an option
    /// marker are ignored, as they could never end an artifact.
    pub fn new(options: CleanupOptions, topic_keywords: Vec<String>) -> Self {
        let leading_marker =
            Regex::new(r"^(?:\(\s*[1-5]\s*\)|[①②③④⑤])").expect("static pattern");
        let topic_keywords = topic_keywords
            .into_iter()
            .filter(|k| !k.is_empty() && !leading_marker.is_match(k))
            .collect();

        Self {
            options,
            topic_keywords,
            whitespace: Regex::new(r"\s+").expect("static pattern"),
            leading_marker,
            cjk_break: Regex::new(r"([\p{Hangul}\p{Han}])\n([\p{Hangul}\p{Han}])")
                .expect("static pattern"),
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
            ],
        }
    }

    /// Process question text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligature_map {
                result = result.replace(ligature, replacement);
            }
        }

        if self.options.remove_pua {
            result = remove_pua_chars(&result);
        }

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        // Must run before whitespace collapsing removes the line breaks
        if self.options.merge_cjk_lines {
            result = self.merge_cjk_lines(result);
        }

        // After every removal, so no decomposed sequence is left behind
        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        result = self.whitespace.replace_all(&result, " ").trim().to_string();

        if self.options.strip_option_artifacts {
            result = self.strip_option_artifacts(&result).to_string();
        }

        result
    }

    /// Join lines broken between two Hangul or Han characters. Matches do
    /// not overlap, so a one-character line needs another pass.
    fn merge_cjk_lines(&self, mut text: String) -> String {
        loop {
            match self.cjk_break.replace_all(&text, "$1$2") {
                Cow::Borrowed(_) => return text,
                Cow::Owned(merged) => text = merged,
            }
        }
    }

    /// Drop a leading option fragment (e.g. "(5) 12 다음 함수…" → "다음 함수…").
    ///
    /// Only strips when the text starts with an ordinal marker and a topic
    /// keyword appears within the lookahead window.
    fn strip_option_artifacts<'a>(&self, text: &'a str) -> &'a str {
        if !self.leading_marker.is_match(text) {
            return text;
        }

        let limit = text
            .char_indices()
            .nth(self.options.lookahead_window)
            .map(|(i, _)| i)
            .unwrap_or(text.len());

        let keyword_at = self
            .topic_keywords
            .iter()
            .filter_map(|k| text.find(k.as_str()))
            .filter(|&pos| pos < limit)
            .min();

        match keyword_at {
            Some(pos) if pos > 0 => text[pos..].trim(),
            _ => text,
        }
    }
}

impl Default for QuestionCleanup {
    fn default() -> Self {
        Self::new(
            CleanupOptions::default(),
            crate::parser::DocumentRules::default().topic_keywords,
        )
    }
}

fn remove_pua_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            !(0xE000..=0xF8FF).contains(&code)
                && !(0xF0000..=0xFFFFD).contains(&code)
                && !(0x100000..=0x10FFFD).contains(&code)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanup() -> QuestionCleanup {
        QuestionCleanup::new(
            CleanupOptions::standard(),
            vec!["함수".to_string(), "다음".to_string()],
        )
    }

    #[test]
    fn test_collapse_whitespace() {
        let result = cleanup().process("  함수   $f(x)$ 에\n\n대하여\t값은?  ");
        assert_eq!(result, "함수 $f(x)$ 에 대하여 값은?");
    }

    #[test]
    fn test_strip_leading_option_artifact() {
        let text = "(4) 16 \\\\ (5) 18 다음 조건을 만족시키는 함수";
        assert_eq!(cleanup().process(text), "다음 조건을 만족시키는 함수");
    }

    #[test]
    fn test_strip_with_circled_glyph() {
        assert_eq!(cleanup().process("⑤ 3 함수 f의 최댓값은?"), "함수 f의 최댓값은?");
    }

    #[test]
    fn test_no_strip_without_keyword_in_window() {
        let cleanup = QuestionCleanup::new(
            CleanupOptions::standard().with_lookahead_window(5),
            vec!["함수".to_string()],
        );
        let text = "(5) 123456789 함수";
        assert_eq!(cleanup.process(text), text);
    }

    #[test]
    fn test_no_strip_without_leading_marker() {
        let text = "실수 전체의 집합에서 (1) 연속인 함수";
        assert_eq!(cleanup().process(text), text);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "(3) 7 (4) 8 \n (5) 9   다음 함수 f(x)",
            "  \u{FB01}nd  함수 \u{FFFD} ",
            "⑤ 함수",
            "",
            "(1)",
        ];
        for preset in [
            CleanupPreset::Minimal,
            CleanupPreset::Standard,
            CleanupPreset::Aggressive,
        ] {
            let cleanup = QuestionCleanup::new(
                CleanupOptions::from_preset(preset),
                vec!["함수".to_string(), "다음".to_string()],
            );
            for input in inputs {
                let once = cleanup.process(input);
                let twice = cleanup.process(&once);
                assert_eq!(once, twice, "not idempotent for {:?}", input);
            }
        }
    }

    #[test]
    fn test_marker_keywords_ignored() {
        let cleanup = QuestionCleanup::new(CleanupOptions::standard(), vec!["(1)".to_string()]);
        assert_eq!(cleanup.process("(1) 2 (1)"), "(1) 2 (1)");
    }

    #[test]
    fn test_aggressive_merges_cjk_lines() {
        let cleanup = QuestionCleanup::new(CleanupOptions::aggressive(), Vec::new());
        assert_eq!(cleanup.process("값을 구하\n시오."), "값을 구하시오.");
        assert_eq!(cleanup.process("a\u{E000}b"), "ab");
    }

    #[test]
    fn test_aggressive_merges_consecutive_cjk_breaks() {
        let cleanup = QuestionCleanup::new(CleanupOptions::aggressive(), Vec::new());
        assert_eq!(cleanup.process("값을\n구\n하시오"), "값을구하시오");
        assert_eq!(cleanup.process("가\n나\n다\n라"), "가나다라");

        let once = cleanup.process("값을\n구\n하시오");
        assert_eq!(cleanup.process(&once), once);
    }

    #[test]
    fn test_ligature_fix() {
        assert_eq!(cleanup().process("\u{FB01}nd"), "find");
    }
}
