//! Problem segmenter.
//!
//! Walks the body once with a cursor. For every rule, start patterns are
//! tried in priority order and the first one that matches (with an end
//! boundary after it) is taken; the cursor then moves past the boundary
//! token. Rules that match nothing leave a gap and a warning.

use super::rules::{CompiledRule, CompiledRules};
use crate::model::{ProblemSpan, Warning};

/// Spans found in a body, plus the rules that found nothing.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub spans: Vec<ProblemSpan>,
    pub warnings: Vec<Warning>,
}

/// Split `body` into problem spans.
pub fn segment(body: &str, rules: &CompiledRules) -> Segmentation {
    let mut result = Segmentation::default();
    let mut cursor = 0;

    for rule in &rules.rules {
        match match_rule(body, rule, cursor) {
            Some(span) => {
                log::debug!(
                    "Problem {} at {}..{} (boundary {:?})",
                    span.index,
                    span.start_offset,
                    span.end_offset,
                    span.boundary
                );
                cursor = span.trailing.start;
                result.spans.push(span);
            }
            None => {
                log::warn!("Problem {} not found after offset {}", rule.index, cursor);
                result.warnings.push(Warning::MissingProblem {
                    index: rule.index.clone(),
                });
            }
        }
    }

    close_trailing(body, rules, &mut result.spans);
    result
}

/// First start pattern (by priority) that matches from `cursor` and has an
/// end boundary at or after its match.
fn match_rule(body: &str, rule: &CompiledRule, cursor: usize) -> Option<ProblemSpan> {
    for start in &rule.starts {
        let Some(m) = start.find_at(body, cursor) else {
            continue;
        };
        let Some(end) = rule.end.find_at(body, m.end()) else {
            continue;
        };
        return Some(ProblemSpan {
            index: rule.index.clone(),
            start_offset: m.start(),
            end_offset: end.start(),
            trailing: end.end()..body.len(),
            boundary: end.as_str().to_string(),
        });
    }
    None
}

/// Cut each trailing region at the next span or the next section heading.
fn close_trailing(body: &str, rules: &CompiledRules, spans: &mut [ProblemSpan]) {
    let next_starts: Vec<usize> = spans
        .iter()
        .skip(1)
        .map(|s| s.start_offset)
        .chain(std::iter::once(body.len()))
        .collect();

    for (span, next_start) in spans.iter_mut().zip(next_starts) {
        let from = span.trailing.start;
        let mut to = next_start.max(from);

        if let Some(section) = &rules.section_boundary {
            if let Some(m) = section.find_at(body, from) {
                to = to.min(m.start());
            }
        }

        span.trailing = from..to;
    }
}
