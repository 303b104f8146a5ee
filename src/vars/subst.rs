//! Value substitution into prompt bodies.

use super::schema::ParamSchema;
use std::collections::BTreeMap;

/// Replace `{key}` tokens in a body with the supplied values.
///
/// Each value's token is replaced everywhere it occurs, as a literal
/// substring match (braces and key text have no special meaning). Keys that
/// never occur in the body are ignored; tokens with no matching key are left
/// untouched. Substitution is schema-agnostic: it sees only the body text
/// and a flat value mapping.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use agentry::vars::apply_values;
///
/// let mut values = BTreeMap::new();
/// values.insert("name".to_string(), "Ada".to_string());
///
/// assert_eq!(apply_values("Hello {name}, {age}", &values), "Hello Ada, {age}");
/// ```
pub fn apply_values(body: &str, values: &BTreeMap<String, String>) -> String {
    if body.is_empty() {
        return String::new();
    }

    let mut out = body.to_string();
    for (name, value) in values {
        let token = format!("{{{name}}}");
        out = out.replace(&token, value);
    }
    out
}

/// Produce the override prompt for a run, if one is available.
///
/// Returns `Some(substituted body)` only when the schema declares at least
/// one parameter and every `required` parameter has a non-empty value.
/// `None` is not an error: it signals that the caller should fall back to
/// running the unmodified template body.
pub fn override_prompt(
    schema: &ParamSchema,
    body: &str,
    values: &BTreeMap<String, String>,
) -> Option<String> {
    if schema.is_empty() {
        return None;
    }

    for (name, spec) in schema.iter() {
        if spec.required && values.get(name).is_none_or(|v| v.is_empty()) {
            return None;
        }
    }

    Some(apply_values(body, values))
}

/// Names of required parameters that currently lack a non-empty value.
///
/// Used by callers to explain why no override prompt was produced.
pub fn missing_required<'a>(
    schema: &'a ParamSchema,
    values: &BTreeMap<String, String>,
) -> Vec<&'a str> {
    schema
        .iter()
        .filter(|(name, spec)| spec.required && values.get(*name).is_none_or(|v| v.is_empty()))
        .map(|(name, _)| name)
        .collect()
}
