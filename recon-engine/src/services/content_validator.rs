//! Content validation before upload
//!
//! Guards against known-degenerate inputs only: files of an
//! empty-sensitive family that carry no (or only header) lines.

use crate::config::EmptyContentFamily;
use serde::Serialize;
use std::path::Path;

const OK_REASON: &str = "OK";

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub reason: String,
    pub line_count: usize,
}

/// Number of `\n` / `\r\n` delimited lines; a trailing empty line is not counted
pub fn count_lines(text: &str) -> usize {
    text.lines().count()
}

/// Decode raw bytes, substituting U+FFFD for invalid UTF-8
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Validator over the configured empty-sensitive families
#[derive(Debug, Clone)]
pub struct ContentValidator {
    families: Vec<EmptyContentFamily>,
}

impl ContentValidator {
    pub fn new(families: Vec<EmptyContentFamily>) -> Self {
        Self { families }
    }

    pub fn validate(&self, filename: &str, decoded_text: &str) -> ValidationOutcome {
        let line_count = count_lines(decoded_text);
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| filename.to_lowercase());

        let rejected_by = self.families.iter().find(|family| {
            family
                .prefixes
                .iter()
                .any(|prefix| name.starts_with(&prefix.to_lowercase()))
                && line_count <= family.max_empty_lines
        });

        match rejected_by {
            Some(family) => ValidationOutcome {
                is_valid: false,
                reason: family.label.clone(),
                line_count,
            },
            None => ValidationOutcome {
                is_valid: true,
                reason: OK_REASON.to_string(),
                line_count,
            },
        }
    }
}
