//! Schema-validation gate
//!
//! First line of defense against model output. Decodes the raw reply into
//! typed steps and gaps; anything that does not fit the types is rejected
//! outright. Structural defects that do fit (duplicates, dangling edges,
//! cycles, out-of-range scores) pass through for graph repair.

use crate::error::SchemaError;
use flowscope_model::{Gap, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CODE_FENCE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```\s*$").ok()
});

/// Schema-valid, structurally unchecked model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDecomposition {
    /// Process title; may be blank
    #[serde(default)]
    pub title: String,
    /// Steps as generated, before repair
    pub steps: Vec<Step>,
    /// Gaps as generated, before repair
    #[serde(default)]
    pub gaps: Vec<Gap>,
}

/// Remove a surrounding Markdown code fence, if any
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|fence| fence.captures(text))
        .and_then(|captures| captures.get(1))
        .map_or_else(|| text.trim(), |body| body.as_str().trim())
}

/// Decode raw model output
///
/// # Errors
/// Returns [`SchemaError::Empty`] for blank output and
/// [`SchemaError::Json`] when the text is not a decomposition
pub fn parse_model_output(text: &str) -> Result<ModelDecomposition, SchemaError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(SchemaError::Empty);
    }
    Ok(serde_json::from_str(body)?)
}
