//! Lenient JSON-object extraction from model output.
//!
//! Models asked for "ONLY valid JSON" still occasionally wrap the object in
//! markdown fences or a sentence of commentary.  [`extract_json`] tries a
//! strict parse first, then retries on the span from the first `{` to the
//! last `}`.  Schema checks are left to the caller.

use serde_json::{Map, Value};
use thiserror::Error;

/// The model output could not be read as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model returned invalid JSON")]
pub struct MalformedModelOutput {
    /// Untouched model text, kept for diagnostics.
    pub raw: String,
}

/// Parse `text` into a JSON object, tolerating wrapping prose.
///
/// The fallback span is greedy: it starts at the first `{` and ends at the
/// last `}`.  Two sibling objects in one response therefore fail rather
/// than silently picking one.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, MalformedModelOutput> {
    let trimmed = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(map);
    }

    let malformed = || MalformedModelOutput {
        raw: text.to_string(),
    };

    let start = trimmed.find('{').ok_or_else(malformed)?;
    let end = trimmed.rfind('}').ok_or_else(malformed)?;
    if end < start {
        return Err(malformed());
    }

    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(malformed()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
