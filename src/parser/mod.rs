//! Source loading, problem segmentation and option extraction.

mod backend;
pub mod choices;
mod loader;
mod options;
mod rules;
pub mod segment;

pub use backend::{LopdfTextSource, PdfTextSource};
pub use choices::{find_marker, has_ordinal_markers, wrap_bare, OptionExtractor};
pub use loader::SourceLoader;
pub use options::{ErrorMode, LoadOptions, PageSelection};
pub use rules::{
    contains_math, default_delimiters, CompiledRule, CompiledRules, DocumentRules, MathDelimiter,
    ProblemRule, DEFAULT_END_BOUNDARY,
};
pub use segment::{segment, Segmentation};
