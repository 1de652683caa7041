//! Field values of canonical entity records.
//!
//! Entities are open records: a fixed set of known fields per type plus any
//! unknown fields carried verbatim. Every field holds a [`Value`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// An ordered field map. Field order follows the source document.
pub type Record = IndexMap<Arc<str>, Value>;

/// A field value in a canonical record.
///
/// Serialized untagged, so a record dumps as a plain JSON/YAML mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null, as found in embedded JSON sub-documents.
    Null,
    /// Boolean value (e.g. `directed` on edges).
    Boolean(bool),
    /// Integer value (e.g. predicate `arity`).
    Integer(i64),
    /// Floating-point value.
    Real(f64),
    /// Text value. Everything decoded from a document starts out as text.
    String(Arc<str>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested record.
    Record(Record),
}

impl Value {
    /// Returns the text if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields if this is a record value.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Whether this is a scalar (not a list or record).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Record(_))
    }

    /// Text form of a scalar, as written into a document.
    ///
    /// Lists and records have no text form.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(Cow::Borrowed(s)),
            Self::Null => Some(Cow::Borrowed("")),
            Self::Boolean(b) => Some(Cow::Owned(b.to_string())),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Real(r) => Some(Cow::Owned(r.to_string())),
            Self::List(_) | Self::Record(_) => None,
        }
    }

    /// Whether the value would count as "set" when picking a display label.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::String(s) => !s.is_empty(),
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Real(r) => *r != 0.0 && !r.is_nan(),
            Self::List(_) | Self::Record(_) => true,
        }
    }

    /// Name of the value's type, as used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Real(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Record(_) => "object",
        }
    }

    /// Join a list of scalars with single spaces.
    ///
    /// Non-list values are returned as their own text.
    pub fn join_words(&self) -> Option<String> {
        match self {
            Self::List(items) => Some(
                items
                    .iter()
                    .filter_map(Value::to_text)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            other => other.to_text().map(Cow::into_owned),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Build a record from `(field, value)` pairs.
///
/// ```ignore
/// let location = record([("id", "hall".into()), ("atLocations", vec!["lobby"].into())]);
/// ```
pub fn record<const N: usize>(fields: [(&str, Value); N]) -> Record {
    fields
        .into_iter()
        .map(|(key, value)| (Arc::from(key), value))
        .collect()
}

/// Collapse runs of whitespace (spaces, tabs, line breaks) into single spaces.
///
/// Leading and trailing whitespace is collapsed as well, not removed.
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.contains(['\r', '\n', '\t']);
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\r' | '\n' | '\t') {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    Cow::Owned(out)
}

/// Split text on whitespace into non-empty tokens.
pub fn split_words(text: &str) -> Vec<Value> {
    text.split_whitespace().map(Value::from).collect()
}
