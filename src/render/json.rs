//! JSON rendering and reading for problem sets.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::options::{JsonFormat, JsonLayout, OutputOptions};
use crate::error::{Error, Result};
use crate::model::{ProblemRecord, ProblemSet, Warning};

/// Keyed document; keys are written in a fixed order.
struct KeyedDocument<'a> {
    key: &'a str,
    set: &'a ProblemSet,
    generated_at: String,
    warnings: &'a [Warning],
}

impl Serialize for KeyedDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.key, &self.set.records)?;
        map.serialize_entry("source", &self.set.name)?;
        map.serialize_entry("generated_at", &self.generated_at)?;
        map.serialize_entry("warnings", self.warnings)?;
        map.end()
    }
}

/// Render a problem set as JSON. Non-ASCII text is written as is.
pub fn to_json(set: &ProblemSet, options: &OutputOptions, warnings: &[Warning]) -> Result<String> {
    to_json_at(set, options, warnings, Utc::now())
}

/// Like [`to_json`], with an explicit timestamp for keyed documents.
pub fn to_json_at(
    set: &ProblemSet,
    options: &OutputOptions,
    warnings: &[Warning],
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match &options.json_layout {
        JsonLayout::Array => serialize(&set.records, options.json_format),
        JsonLayout::Keyed(key) => {
            if JsonLayout::RESERVED_KEYS.contains(&key.as_str()) {
                return Err(Error::Config(format!(
                    "JSON record key '{}' clashes with a reserved key",
                    key
                )));
            }
            let doc = KeyedDocument {
                key,
                set,
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                warnings,
            };
            serialize(&doc, options.json_format)
        }
    }
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Read a problem set back from JSON, in either layout.
///
/// The set name comes from the keyed document's `source` entry, else
/// `fallback_name`.
pub fn from_json(text: &str, fallback_name: &str) -> Result<ProblemSet> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Decode(format!("JSON parse error: {}", e)))?;

    let (records, name) = match value {
        Value::Array(_) => (value, fallback_name.to_string()),
        Value::Object(mut map) => {
            let name = map
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or(fallback_name)
                .to_string();
            let key = map
                .iter()
                .find(|(k, v)| !JsonLayout::RESERVED_KEYS.contains(&k.as_str()) && v.is_array())
                .map(|(k, _)| k.clone())
                .ok_or_else(|| Error::Decode("JSON object has no record array".to_string()))?;
            let records = map.remove(&key).unwrap_or(Value::Null);
            (records, name)
        }
        _ => {
            return Err(Error::Decode(
                "JSON must be an array or an object".to_string(),
            ))
        }
    };

    let records: Vec<ProblemRecord> = serde_json::from_value(records)
        .map_err(|e| Error::Decode(format!("JSON record error: {}", e)))?;

    Ok(ProblemSet { name, records })
}
