//! Rendering module: CSV and JSON output for problem sets.

mod csv;
mod json;
mod options;
mod result;
mod sink;

pub use self::csv::{from_csv, split_options_column, to_csv, BOM, CSV_HEADERS};
pub use json::{from_json, to_json, to_json_at};
pub use options::{JsonFormat, JsonLayout, OutputOptions};
pub use result::ExtractionStats;
pub use sink::{read_problem_set, write_problem_set, WrittenFiles};
