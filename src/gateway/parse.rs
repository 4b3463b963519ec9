/// Schema parse of risk-assessment replies.
///
/// The model is asked for a bare JSON object. Anything that does not decode
/// into a [`PredictionResult`] is a [`ParseError`]; the gateway answers that
/// case with the glucose fallback, never with a failure.
///
/// Checks, in order:
/// 1. **Fence**: a reply wrapped in a Markdown code fence is unwrapped.
/// 2. **JSON**: the remaining text must be a JSON object.
/// 3. **Schema**: `prediction`, `probability` and `risk` must be present
///    with known values. Extra keys are ignored.
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::assessment::PredictionResult;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("fence pattern is valid")
});

/// Why a reply could not be read as a prediction.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("reply is empty")]
    Empty,
    #[error("reply is not a JSON object: {0}")]
    NotJson(String),
    #[error("reply does not match the prediction schema: {0}")]
    Schema(String),
}

/// Parse a model reply into a [`PredictionResult`].
pub fn parse_prediction(content: &str) -> Result<PredictionResult, ParseError> {
    let body = strip_code_fence(content).trim();
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ParseError::NotJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ParseError::NotJson(format!("expected an object, got {value}")));
    }

    serde_json::from_value(value).map_err(|e| ParseError::Schema(e.to_string()))
}

/// Return the inside of a Markdown code fence, or the input unchanged.
fn strip_code_fence(content: &str) -> &str {
    FENCED_BLOCK
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or(content, |m| m.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
