//! Parameter schema types and the JSON decoder.
//!
//! Schema JSON is authored by hand inside prompts, so nothing about its shape
//! can be trusted. Decoding is total: every field is coerced defensively, and
//! entries that are not objects are dropped rather than failing the parse.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Fallback parameter name when normalization strips everything.
const FALLBACK_NAME: &str = "param";

/// Input widget kind for a parameter.
///
/// Unrecognized kinds are carried through as-is (`Other`) rather than
/// rejected; renderers treat them like `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Closed set of options (see [`ParamSpec::options`]).
    Select,
    /// Numeric input; the value is still stored as text.
    Number,
    /// Unrecognized kind, preserved verbatim.
    Other(String),
}

impl ParamKind {
    /// Parse a kind from its string form. Never fails; unknown names are
    /// preserved as [`ParamKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => ParamKind::Text,
            "textarea" => ParamKind::Textarea,
            "select" => ParamKind::Select,
            "number" => ParamKind::Number,
            other => ParamKind::Other(other.to_string()),
        }
    }

    /// The string form used in schema JSON.
    pub fn as_str(&self) -> &str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Textarea => "textarea",
            ParamKind::Select => "select",
            ParamKind::Number => "number",
            ParamKind::Other(name) => name,
        }
    }
}

impl Default for ParamKind {
    fn default() -> Self {
        ParamKind::Text
    }
}

/// Declaration of one named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Display name. Defaults to the parameter's name when absent.
    pub label: String,

    /// Input placeholder text.
    pub placeholder: Option<String>,

    /// Input widget kind.
    pub kind: ParamKind,

    /// Acceptable values for `select` parameters. Advisory only: neither
    /// substitution nor the run path enforces membership.
    pub options: Option<Vec<String>>,

    /// Default value, always stored as text (also for `number`).
    pub default: Option<String>,

    /// Whether a non-empty value is needed to produce an override prompt.
    pub required: bool,
}

impl ParamSpec {
    /// Create a spec with the given label and all other fields defaulted.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            placeholder: None,
            kind: ParamKind::Text,
            options: None,
            default: None,
            required: false,
        }
    }

    /// Decode a spec from one schema JSON entry.
    ///
    /// Returns `None` when the value is not a non-null object (such entries
    /// are dropped from the schema). Field coercion rules:
    ///
    /// - `label`: scalar coerced to string, else the parameter name
    /// - `placeholder`: kept only for truthy values
    /// - `type`: string passed through, else `text`
    /// - `options`: kept only for arrays, each element stringified
    /// - `default`: present non-null values stringified (`0` → `"0"`,
    ///   `false` → `"false"`)
    /// - `required`: truthy coercion, default false
    pub fn from_json(name: &str, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        Some(Self {
            label: obj
                .get("label")
                .and_then(scalar_string)
                .unwrap_or_else(|| name.to_string()),
            placeholder: obj.get("placeholder").filter(|v| is_truthy(v)).map(text_of),
            kind: obj
                .get("type")
                .and_then(Value::as_str)
                .map(ParamKind::from_name)
                .unwrap_or_default(),
            options: obj
                .get("options")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(text_of).collect()),
            default: obj.get("default").filter(|v| !v.is_null()).map(text_of),
            required: obj.get("required").map(is_truthy).unwrap_or(false),
        })
    }

    /// Encode the spec as a schema JSON object.
    ///
    /// Optional fields are omitted when absent; `label`, `type` and
    /// `required` are always written so a re-parse reproduces the spec.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("label".to_string(), Value::String(self.label.clone()));
        if let Some(ref placeholder) = self.placeholder {
            obj.insert(
                "placeholder".to_string(),
                Value::String(placeholder.clone()),
            );
        }
        obj.insert(
            "type".to_string(),
            Value::String(self.kind.as_str().to_string()),
        );
        if let Some(ref options) = self.options {
            obj.insert(
                "options".to_string(),
                Value::Array(options.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(ref default) = self.default {
            obj.insert("default".to_string(), Value::String(default.clone()));
        }
        obj.insert("required".to_string(), Value::Bool(self.required));
        Value::Object(obj)
    }
}

/// Ordered mapping from parameter name to spec.
///
/// Insertion order is significant: it determines form rendering order and
/// the field order of the serialized schema block. Names are unique; an
/// insert under an existing name replaces the spec in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSchema {
    entries: Vec<(String, ParamSpec)>,
}

impl ParamSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a parameter, replacing an existing spec with the same name
    /// while keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, spec: ParamSpec) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = spec;
        } else {
            self.entries.push((name, spec));
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Iterate parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.entries.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    /// Default values per parameter, empty string where no default is set.
    ///
    /// This is the value mapping a parameter form starts from before any
    /// user input or URL prefill.
    pub fn defaults(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default.clone().unwrap_or_default()))
            .collect()
    }

    /// Decode a schema from parsed JSON.
    ///
    /// Returns `None` when the value is not an object (the caller then treats
    /// the whole prompt as body). Entries whose value is not a non-null
    /// object are dropped silently; an empty object yields an empty schema,
    /// which is distinct from "no schema block".
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut schema = Self::new();
        for (name, entry) in obj {
            if let Some(spec) = ParamSpec::from_json(name, entry) {
                schema.insert(name.clone(), spec);
            }
        }
        Some(schema)
    }

    /// Encode the schema as a JSON object, preserving insertion order.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (name, spec) in &self.entries {
            obj.insert(name.clone(), spec.to_json());
        }
        Value::Object(obj)
    }
}

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("separator pattern is valid"));
static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("invalid-chars pattern is valid"));

/// Normalize a raw parameter name to `[a-z0-9_]+`.
///
/// Lowercases, turns whitespace/hyphen runs into underscores, and strips
/// everything else. An input that normalizes to nothing falls back to
/// `"param"`. Applied on the authoring path; parsing passes stored names
/// through verbatim.
pub fn normalize_param_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let underscored = SEPARATORS.replace_all(&lowered, "_");
    let cleaned = INVALID_CHARS.replace_all(&underscored, "");
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Coerce a scalar JSON value to a string. Structured values and null yield
/// `None` so callers can apply their own fallback.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Stringify any JSON value: strings verbatim, everything else as its
/// compact JSON text.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness for schema fields that use it
/// (`placeholder`, `required`).
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
