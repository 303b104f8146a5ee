//! Splitting prompts into schema block + body, and recombining them.
//!
//! The block format is deliberately dumb: first occurrence of each marker,
//! found with substring search, no nesting awareness. Everything that can go
//! wrong (missing marker, misordered markers, bad JSON, non-object JSON)
//! degrades to "no schema, whole string is body", so a stored prompt is
//! always at least a valid body.

use super::schema::ParamSchema;
use serde_json::Value;

/// Opens the embedded schema block.
pub const BLOCK_START: &str = "<!-- VARS";

/// Closes the embedded schema block.
pub const BLOCK_END: &str = "VARS -->";

/// Result of splitting a raw prompt.
///
/// `schema: None` means no (valid) schema block was found; `Some` with zero
/// entries means a block was present and parsed to an empty object. Both
/// render as "no parameters", but only the former leaves the raw text intact
/// as the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    /// The declared parameter schema, if a valid block was found.
    pub schema: Option<ParamSchema>,
    /// The prompt body following the block (or the whole input).
    pub body: String,
}

impl PromptParts {
    fn body_only(body: impl Into<String>) -> Self {
        Self {
            schema: None,
            body: body.into(),
        }
    }
}

/// Locate the candidate schema region.
///
/// Returns the byte range between the first start marker and the first end
/// marker, or `None` when either marker is missing or the end marker comes
/// at or before the start marker. The range may be empty or inverted when
/// the markers overlap; the caller treats that as unparseable JSON.
fn locate_block(raw: &str) -> Option<(usize, usize)> {
    let start = raw.find(BLOCK_START)?;
    let end = raw.find(BLOCK_END)?;
    if end <= start {
        return None;
    }
    Some((start + BLOCK_START.len(), end))
}

/// Parse a raw prompt into its schema and body.
///
/// The text between the markers is parsed as JSON; it must be an object or
/// the block is ignored. The body is everything after the end marker with a
/// single immediately-following line break (if any) stripped.
pub fn extract_vars(raw: &str) -> PromptParts {
    if raw.is_empty() {
        return PromptParts::body_only(String::new());
    }

    let Some((json_start, json_end)) = locate_block(raw) else {
        return PromptParts::body_only(raw);
    };

    // Overlapping markers leave no region; feed the parser an empty string
    // so the block degrades like any other bad JSON.
    let json_raw = if json_start <= json_end {
        raw[json_start..json_end].trim()
    } else {
        ""
    };

    let value: Value = match serde_json::from_str(json_raw) {
        Ok(value) => value,
        Err(_) => return PromptParts::body_only(raw),
    };

    let Some(schema) = ParamSchema::from_json(&value) else {
        return PromptParts::body_only(raw);
    };

    let after = &raw[json_end + BLOCK_END.len()..];
    let body = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    PromptParts {
        schema: Some(schema),
        body: body.to_string(),
    }
}

/// Recombine a schema and body into a single stored prompt string.
///
/// An absent or empty schema yields the body unchanged (no block emitted).
/// Otherwise the block is pretty-printed with 2-space indentation and
/// separated from the body by exactly one newline; a body that already
/// starts with a newline gets no extra one.
pub fn compose_prompt(schema: Option<&ParamSchema>, body: &str) -> String {
    let Some(schema) = schema.filter(|s| !s.is_empty()) else {
        return body.to_string();
    };

    let pretty = serde_json::to_string_pretty(&schema.to_json())
        .expect("schema JSON serialization cannot fail");
    let separator = if body.starts_with('\n') { "" } else { "\n" };

    format!("{BLOCK_START}\n{pretty}\n{BLOCK_END}{separator}{body}")
}
