//! Oracle reply interpretation
//!
//! Model output is not contractually JSON: it may be fenced, wrapped in
//! prose, or garbage. Everything fragile about reading it lives here.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Suggestion returned when the oracle reply cannot be parsed
pub const PARSE_FAILURE_SUGGESTION: &str = "Error parsing LLM response.";

/// Suggestion returned when the oracle call itself fails
pub const PROCESSING_FAILURE_SUGGESTION: &str = "Error processing the image.";

/// Suggestion returned when the oracle credential is missing
pub const NOT_CONFIGURED_SUGGESTION: &str = "Server error: API key not configured.";

/// Outcome of one advisory turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Whether the caller can stop adjusting
    pub ready_to_proceed: bool,
    /// Adjustment to make; empty when ready
    pub suggestion: String,
}

impl Directive {
    /// A directive with the given fields
    #[must_use]
    pub fn new(ready_to_proceed: bool, suggestion: impl Into<String>) -> Self {
        Self {
            ready_to_proceed,
            suggestion: suggestion.into(),
        }
    }

    /// Fallback for an unparsable oracle reply
    #[must_use]
    pub fn parse_failure() -> Self {
        Self::new(false, PARSE_FAILURE_SUGGESTION)
    }

    /// Fallback for an unreachable or empty oracle
    #[must_use]
    pub fn processing_failure() -> Self {
        Self::new(false, PROCESSING_FAILURE_SUGGESTION)
    }

    /// Fallback for a missing oracle credential
    #[must_use]
    pub fn not_configured() -> Self {
        Self::new(false, NOT_CONFIGURED_SUGGESTION)
    }
}

/// Parse raw oracle text into a directive.
///
/// Expects an object with `ready_to_shoot` (0/1) and `suggestion`. Tolerates
/// code fences and surrounding prose.
///
/// # Errors
///
/// Returns `Error::ResponseFormat` if no JSON object can be recovered
pub fn parse_directive(raw: &str) -> Result<Directive> {
    let candidate = extract_object(strip_fences(raw.trim()));

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| Error::ResponseFormat(format!("invalid JSON: {e}")))?;

    let Value::Object(fields) = value else {
        return Err(Error::ResponseFormat("expected a JSON object".to_string()));
    };

    let ready_to_proceed = fields.get("ready_to_shoot").is_some_and(truthy);
    let suggestion = match fields.get("suggestion") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(Directive {
        ready_to_proceed,
        suggestion,
    })
}

/// Remove a leading ```` ``` ```` (with optional language tag) and a trailing ```` ``` ````
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Slice from the first `{` to the last `}` when the text isn't already an object
fn extract_object(text: &str) -> &str {
    if text.starts_with('{') {
        return text;
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>().map_or_else(|_| s.eq_ignore_ascii_case("true"), |f| f != 0.0)
        }
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
