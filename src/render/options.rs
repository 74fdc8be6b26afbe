//! Output options for the sink writer.

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Top-level shape of the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JsonLayout {
    /// A bare array of records
    #[default]
    Array,
    /// An object holding the records under the given key, plus the source
    /// name, a timestamp and the run's warnings
    Keyed(String),
}

impl JsonLayout {
    /// Keys always present in a keyed document besides the record key.
    pub const RESERVED_KEYS: [&'static str; 3] = ["source", "generated_at", "warnings"];

    /// Keyed layout with the given record key.
    pub fn keyed(key: impl Into<String>) -> Self {
        JsonLayout::Keyed(key.into())
    }

    /// Parse a CLI value: `array`, or `keyed:<key>`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("array") {
            return Ok(JsonLayout::Array);
        }
        match s.split_once(':') {
            Some((kind, key)) if kind.eq_ignore_ascii_case("keyed") && !key.trim().is_empty() => {
                Ok(JsonLayout::keyed(key.trim()))
            }
            _ => Err(format!(
                "Invalid JSON layout: {} (expected 'array' or 'keyed:<key>')",
                s
            )),
        }
    }
}

/// Options for writing a problem set.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// JSON formatting
    pub json_format: JsonFormat,

    /// JSON top-level layout
    pub json_layout: JsonLayout,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_layout(mut self, layout: JsonLayout) -> Self {
        self.json_layout = layout;
        self
    }

    /// Shorthand for compact JSON.
    pub fn compact(self) -> Self {
        self.with_json_format(JsonFormat::Compact)
    }
}
