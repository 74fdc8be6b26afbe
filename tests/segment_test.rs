//! Integration tests for segmentation and option extraction on LaTeX bodies.

use unexam::parser::{segment, OptionExtractor};
use unexam::{DocumentRules, ProblemRule};

const BODY: &str = r"\section*{5지선다형}
1. 함수 $f(x)=2x^3-3x$에 대하여 $f'(2)$의 값은? [2점]
(1) 18 \\ (2) 19 \\ (3) 20 \\ (4) 21 \\ (5) 22

2. 다음 조건을 만족시키는 자연수 $n$의 개수는? [3점]
(1) $-2$ \\ (2) $-1$ \\ (3) 0 \\ (4) 1 \\ (5) 2

\section*{단답형}
3. 등차수열 $\{a_n\}$에 대하여 $a_5$의 값을 구하시오. [3점]
";

fn rules() -> DocumentRules {
    DocumentRules::new()
        .with_section_boundary(r"\\section\*?\{")
        .with_problem(ProblemRule::new("1", [r"함수 \$f\(x\)=2x"]))
        .with_problem(ProblemRule::new("2", [r"조건을 만족시키는 정수", r"다음 조건을"]))
        .with_problem(ProblemRule::new("3", [r"등차수열"]))
}

#[test]
fn test_section_heading_closes_last_option_region() {
    let compiled = rules().compile().unwrap();
    let seg = segment(BODY, &compiled);

    assert_eq!(seg.spans.len(), 3);
    let second = &seg.spans[1];
    let trailing = second.trailing_text(BODY);
    assert!(trailing.contains("(5) 2"));
    assert!(!trailing.contains("단답형"));
}

#[test]
fn test_fallback_start_pattern() {
    let compiled = rules().compile().unwrap();
    let seg = segment(BODY, &compiled);

    assert!(seg.spans[1].question(BODY).starts_with("다음 조건을"));
}

#[test]
fn test_options_per_span() {
    let compiled = rules().compile().unwrap();
    let seg = segment(BODY, &compiled);
    let extractor = OptionExtractor::default();

    let counts: Vec<usize> = seg
        .spans
        .iter()
        .map(|span| extractor.extract(span.trailing_text(BODY)).len())
        .collect();
    assert_eq!(counts, vec![5, 5, 0]);

    let second = extractor.extract(seg.spans[1].trailing_text(BODY));
    assert!(second[0].is_formula);
    assert_eq!(second[2].raw_text, "0");
}

#[test]
fn test_problem_order_is_document_order() {
    // Rule 2 is listed first but its text comes second; rule 1 is then
    // searched only after rule 2's boundary and is reported missing
    let rules = DocumentRules::new()
        .with_problem(ProblemRule::new("2", [r"다음 조건을"]))
        .with_problem(ProblemRule::new("1", [r"함수 \$f\(x\)=2x"]));
    let seg = segment(BODY, &rules.compile().unwrap());

    assert_eq!(seg.spans.len(), 1);
    assert_eq!(seg.spans[0].index, "2");
    assert_eq!(seg.warnings.len(), 1);
}
