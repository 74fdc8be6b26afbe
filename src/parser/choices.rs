//! Multiple-choice option extractor.
//!
//! For ordinals 1 through 5 the extractor looks for the ordinal marker, either
//! `(i)` as written in LaTeX sources or the circled glyph as found in PDF text
//! layers, and then reads either a delimited formula or a bare token after
//! it. The search for ordinal `i` starts strictly after where ordinal `i - 1`
//! ended, so a `(2)` inside the first option's formula is never taken for
//! the second marker.

use super::rules::{contains_math, MathDelimiter};
use crate::model::{glyph_for, OptionCandidate, MAX_OPTIONS};

/// Line-continuation token in LaTeX sources.
const LINE_CONTINUATION: &str = "\\\\";

/// Characters that make a bare token algebraic.
const OPERATOR_CHARS: &[char] = &['-', '−', '/', '^'];

/// Characters allowed in a bare token besides letters and digits.
const BARE_SYMBOLS: &[char] = &['+', '-', '−', '×', '÷', '*', '/', '^', '.', '_', '\'', '=', '<', '>'];

/// Extracts options from the text that follows a problem's end marker.
#[derive(Debug, Clone)]
pub struct OptionExtractor {
    delimiters: Vec<MathDelimiter>,
    wrap_with: MathDelimiter,
}

impl OptionExtractor {
    /// Create an extractor. The first delimiter is used for re-wrapping
    /// algebraic bare tokens; `$…$` when the list is empty.
    pub fn new(delimiters: Vec<MathDelimiter>) -> Self {
        let wrap_with = delimiters
            .first()
            .cloned()
            .unwrap_or_else(|| MathDelimiter::new("$", "$"));
        Self {
            delimiters,
            wrap_with,
        }
    }

    /// Extract up to five options, in ordinal order. Ordinals that cannot be
    /// read are skipped without a placeholder.
    pub fn extract(&self, trailing: &str) -> Vec<OptionCandidate> {
        let mut options = Vec::with_capacity(MAX_OPTIONS);
        let mut cursor = 0;

        for ordinal in 1..=MAX_OPTIONS as u8 {
            let Some((_, marker_end)) = find_marker(trailing, ordinal, cursor) else {
                log::debug!("Option {} marker not found", ordinal);
                continue;
            };

            let rest = &trailing[marker_end..];
            let skipped = rest.len() - rest.trim_start().len();
            let value_start = marker_end + skipped;

            let read = self
                .read_formula(&trailing[value_start..])
                .or_else(|| self.read_bare(trailing, value_start, ordinal));

            match read {
                Some((raw_text, is_formula, len)) => {
                    if let Some(option) = OptionCandidate::new(ordinal, raw_text, is_formula) {
                        options.push(option);
                    }
                    cursor = value_start + len;
                }
                None => log::debug!("Option {} has no readable value", ordinal),
            }
        }

        options
    }

    /// Delimited formula right at the start of `text`.
    fn read_formula(&self, text: &str) -> Option<(String, bool, usize)> {
        for delim in &self.delimiters {
            if delim.open.is_empty() || !text.starts_with(&delim.open) {
                continue;
            }
            let inner_start = delim.open.len();
            let Some(close) = text[inner_start..].find(&delim.close) else {
                continue;
            };
            if text[inner_start..inner_start + close].trim().is_empty() {
                continue;
            }
            let end = inner_start + close + delim.close.len();
            return Some((text[..end].to_string(), true, end));
        }
        None
    }

    /// Bare token at `start`: the run of letters, digits and arithmetic
    /// symbols there, never reaching past a line continuation, a newline or
    /// the next ordinal marker.
    fn read_bare(&self, trailing: &str, start: usize, ordinal: u8) -> Option<(String, bool, usize)> {
        let text = &trailing[start..];
        let mut end = text.len();

        if let Some(pos) = text.find(LINE_CONTINUATION) {
            end = end.min(pos);
        }
        if let Some(pos) = text.find('\n') {
            end = end.min(pos);
        }
        for next in ordinal + 1..=MAX_OPTIONS as u8 {
            if let Some((pos, _)) = find_marker(text, next, 0) {
                end = end.min(pos);
            }
        }

        let token = bare_run(&text[..end]);
        if token.is_empty() {
            return None;
        }

        let (raw_text, is_formula) = wrap_bare(token, &self.wrap_with);
        Some((raw_text, is_formula, token.len()))
    }

    /// Whether `text` reads as math markup for this extractor's delimiters.
    pub fn is_formula(&self, text: &str) -> bool {
        contains_math(text, &self.delimiters)
    }
}

impl Default for OptionExtractor {
    fn default() -> Self {
        Self::new(super::rules::default_delimiters())
    }
}

/// Locate the marker for `ordinal` at or after `from`: `(i)` or its glyph,
/// whichever comes first. Returns `(start, end)` byte offsets.
pub fn find_marker(text: &str, ordinal: u8, from: usize) -> Option<(usize, usize)> {
    let haystack = text.get(from..)?;
    let paren = format!("({})", ordinal);

    let by_paren = haystack.find(&paren).map(|p| (p, p + paren.len()));
    let by_glyph = glyph_for(ordinal).and_then(|g| {
        haystack
            .find(g)
            .map(|p| (p, p + g.len_utf8()))
    });

    let (start, end) = match (by_paren, by_glyph) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((from + start, from + end))
}

/// Whether `text` contains any ordinal marker (1..=5).
pub fn has_ordinal_markers(text: &str) -> bool {
    (1..=MAX_OPTIONS as u8).any(|ordinal| find_marker(text, ordinal, 0).is_some())
}

/// Leading run of letters, digits or arithmetic symbols in `text`.
fn bare_run(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || BARE_SYMBOLS.contains(&c)))
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Apply the bare-token policy: pure decimal integers stay as they are,
/// tokens carrying an operator are wrapped in `delimiter`.
///
/// Returns the stored text and whether it is a formula.
pub fn wrap_bare(token: &str, delimiter: &MathDelimiter) -> (String, bool) {
    if token.chars().all(|c| c.is_ascii_digit()) {
        return (token.to_string(), false);
    }
    if token.contains(OPERATOR_CHARS) {
        return (delimiter.wrap(token), true);
    }
    (token.to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(options: &[OptionCandidate]) -> Vec<String> {
        options.iter().map(OptionCandidate::display).collect()
    }

    #[test]
    fn test_mixed_formula_and_integer_options() {
        let trailing =
            r"(1) $\frac{15}{16}$\\(2) 1\\(3) $\frac{17}{16}$\\(4) $\frac{9}{8}$\\(5) $\frac{19}{16}$";
        let options = OptionExtractor::default().extract(trailing);

        assert_eq!(
            texts(&options),
            vec![
                r"① $\frac{15}{16}$",
                "② 1",
                r"③ $\frac{17}{16}$",
                r"④ $\frac{9}{8}$",
                r"⑤ $\frac{19}{16}$",
            ]
        );
        assert!(options[0].is_formula);
        assert!(!options[1].is_formula);
        assert_eq!(
            options.iter().map(|o| o.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_ordinal_inside_previous_formula_is_ignored() {
        let trailing = r"(1) $f(2)+1$ \\ (2) 7 \\ (3) 8";
        let options = OptionExtractor::default().extract(trailing);
        assert_eq!(texts(&options), vec![r"① $f(2)+1$", "② 7", "③ 8"]);
    }

    #[test]
    fn test_bare_tokens_on_one_line() {
        let options = OptionExtractor::default().extract("(1) 2 (2) 4 (3) 6 (4) 8 (5) 10");
        assert_eq!(
            texts(&options),
            vec!["① 2", "② 4", "③ 6", "④ 8", "⑤ 10"]
        );
    }

    #[test]
    fn test_algebraic_bare_token_is_wrapped() {
        let options = OptionExtractor::default().extract("(1) -3\n(2) 1/2\n(3) 2^5\n(4) 12\n(5) ab");
        assert_eq!(
            texts(&options),
            vec!["① $-3$", "② $1/2$", "③ $2^5$", "④ 12", "⑤ ab"]
        );
        assert!(options[0].is_formula);
        assert!(!options[3].is_formula);
        assert!(!options[4].is_formula);
    }

    #[test]
    fn test_circled_glyph_markers() {
        let options = OptionExtractor::default().extract("① 3 ② 5 ③ 7 ④ 9 ⑤ 11");
        assert_eq!(options.len(), 5);
        assert_eq!(options[4].raw_text, "11");
    }

    #[test]
    fn test_paren_delimiters() {
        let options = OptionExtractor::default().extract(r"(1) \(\sqrt{2}\) \\ (2) \(\sqrt{3}\)");
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].raw_text, r"\(\sqrt{3}\)");
        assert!(options[1].is_formula);
    }

    #[test]
    fn test_unreadable_ordinal_is_skipped() {
        let options = OptionExtractor::default().extract(r"(1) 1 \\ (2) [그림] \\ (3) 3");
        assert_eq!(texts(&options), vec!["① 1", "③ 3"]);
    }

    #[test]
    fn test_quad_separated_options() {
        let options =
            OptionExtractor::default().extract(r"(1) 1 \quad (2) 2 \quad (3) 3 \quad (4) 4 \quad (5) 5");
        assert_eq!(
            texts(&options),
            vec!["① 1", "② 2", "③ 3", "④ 4", "⑤ 5"]
        );
    }

    #[test]
    fn test_last_option_followed_by_next_problem() {
        let options =
            OptionExtractor::default().extract(r"(1) 1 \\ (2) 2 \\ (3) 3 \\ (4) 4 \\ (5) 5 2. ");
        assert_eq!(options.len(), 5);
        assert_eq!(options[4].raw_text, "5");
    }

    #[test]
    fn test_bare_run_stops_at_whitespace() {
        let options = OptionExtractor::default().extract("(1) -3 또는 (2) x+1, 이다");
        assert_eq!(texts(&options), vec!["① $-3$", "② x+1"]);
        assert_eq!(bare_run("12 cm"), "12");
        assert_eq!(bare_run(r"\quad"), "");
    }

    #[test]
    fn test_no_markers() {
        assert!(OptionExtractor::default().extract("정답을 구하시오.").is_empty());
        assert!(!has_ordinal_markers("정답을 구하시오."));
        assert!(has_ordinal_markers("③ 5"));
    }

    #[test]
    fn test_empty_formula_falls_through() {
        // "$$" alone is not a formula; the bare reader rejects it too
        let options = OptionExtractor::default().extract("(1) $$ (2) 2");
        assert_eq!(texts(&options), vec!["② 2"]);
    }

    #[test]
    fn test_find_marker_prefers_earliest() {
        assert_eq!(find_marker("② x (2) y", 2, 0), Some((0, 3)));
        assert_eq!(find_marker("② x (2) y", 2, 3), Some((6, 9)));
        assert_eq!(find_marker("abc", 2, 10), None);
    }

    #[test]
    fn test_wrap_bare_policy() {
        let d = MathDelimiter::new("$", "$");
        assert_eq!(wrap_bare("42", &d), ("42".to_string(), false));
        assert_eq!(wrap_bare("-1", &d), ("$-1$".to_string(), true));
        assert_eq!(wrap_bare("x", &d), ("x".to_string(), false));
        assert_eq!(wrap_bare("3.5", &d), ("3.5".to_string(), false));
    }
}
