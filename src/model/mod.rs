//! Data model shared by every pipeline stage.
//!
//! A [`SourceDocument`] is split into [`ProblemSpan`]s, each span yields
//! [`OptionCandidate`]s, and the normalizer turns both into
//! [`ProblemRecord`]s collected in a [`ProblemSet`]. Data-quality issues
//! found on the way are reported as [`Warning`]s.

mod problem;
mod source;
mod warning;

pub use problem::{
    glyph_for, ordinal_for, AnswerType, ExtractionConfidence, OptionCandidate, ProblemRecord,
    ProblemSet, ProblemSpan, MAX_OPTIONS, OPTION_GLYPHS,
};
pub use source::{isolate_body, SourceDocument, SourceKind};
pub use warning::Warning;
