//! Decoding of tag-like field values.
//!
//! Upstream platforms hand tags over in several shapes: a proper JSON
//! array, a bare string, or a string that itself encodes a list (tabular
//! exports turn `["a", "b"]` into the text `"['a', 'b']"`). [`TagValue`]
//! is decoded once at the ingestion boundary so the collector only ever
//! sees flat scalars.
//!
//! A string that looks like an encoded list but does not parse is kept
//! as a literal scalar and reported on the `mlentory::quality` log
//! target.

use serde_json::Value;

/// Log target for data-quality findings.
pub const QUALITY_TARGET: &str = "mlentory::quality";

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Scalar(String),
    EncodedList(Vec<String>),
}

impl TagValue {
    /// Decode one raw string read from `field`.
    ///
    /// `field` only labels the quality warning for a malformed list.
    pub fn parse(field: &str, raw: &str) -> Self {
        let trimmed = raw.trim();
        if !looks_like_list(trimmed) {
            return TagValue::Scalar(raw.to_string());
        }
        match decode_list(field, trimmed) {
            Some(items) => TagValue::EncodedList(items),
            None => {
                tracing::warn!(
                    target: QUALITY_TARGET,
                    field = %field,
                    value = %raw,
                    "malformed encoded list kept as literal tag"
                );
                TagValue::Scalar(raw.to_string())
            }
        }
    }

    /// Flatten into scalar strings.
    pub fn into_scalars(self) -> Vec<String> {
        match self {
            TagValue::Scalar(s) => vec![s],
            TagValue::EncodedList(items) => items,
        }
    }
}

/// Flatten an arbitrary JSON value into scalar tag strings.
///
/// Arrays flatten recursively, strings go through [`TagValue::parse`],
/// numbers and booleans become their text, and `null` contributes
/// nothing. Objects are kept as their JSON text.
pub fn flatten_value(field: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(field, value, &mut out);
    out
}

fn flatten_into(field: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.extend(TagValue::parse(field, s).into_scalars()),
        Value::Array(items) => {
            for item in items {
                flatten_into(field, item, out);
            }
        }
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Object(_) => out.push(value.to_string()),
    }
}

fn looks_like_list(s: &str) -> bool {
    s.starts_with('[')
}

fn decode_list(field: &str, s: &str) -> Option<Vec<String>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
        let mut out = Vec::new();
        for item in &items {
            flatten_into(field, item, &mut out);
        }
        return Some(out);
    }
    decode_quoted_list(s)
}

/// Parse a single-level list of quoted strings, accepting `'` or `"`
/// quotes and backslash escapes: `['a', "b", 'it\'s']`.
fn decode_quoted_list(s: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => item.push(chars.next()?),
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return None;
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}
