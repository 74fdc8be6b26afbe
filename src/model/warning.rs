//! Data-quality warnings collected during extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal condition a human should review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// No start pattern of the rule matched.
    MissingProblem { index: String },

    /// Fewer than five options were recovered.
    PartialOptions { index: String, found: usize },
}

impl Warning {
    /// Display index of the problem the warning is about.
    pub fn index(&self) -> &str {
        match self {
            Warning::MissingProblem { index } | Warning::PartialOptions { index, .. } => index,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingProblem { index } => {
                write!(f, "problem {} not found in body", index)
            }
            Warning::PartialOptions { index, found } => {
                write!(f, "problem {}: only {} of 5 options recovered", index, found)
            }
        }
    }
}
