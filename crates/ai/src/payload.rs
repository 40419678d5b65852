//! Lenient model of the generated report object.
//!
//! The provider is asked for `{summary, sections, recommendations}` but may
//! omit keys or use the wrong JSON types. The object is kept as decoded and
//! each field is projected on demand as [`Field`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of reading one key from a loosely-typed object.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Key not present.
    Absent,
    /// Key present with an unexpected JSON type.
    WrongType(Value),
    /// Key present and well-formed.
    Present(T),
}

impl<T> Field<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.present().unwrap_or_default()
    }
}

/// One titled block of report content. `content` is an HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

/// A decoded report object.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    fields: Map<String, Value>,
}

impl ReportPayload {
    /// Decode text as a JSON object. Arrays, scalars, and malformed JSON fail.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { fields })
    }

    pub fn summary(&self) -> Field<&str> {
        match self.fields.get("summary") {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(s.as_str()),
            Some(other) => Field::WrongType(other.clone()),
        }
    }

    /// Sections in order. Non-object entries are skipped; missing or
    /// non-string `title`/`content` become empty strings.
    pub fn sections(&self) -> Field<Vec<ReportSection>> {
        match self.fields.get("sections") {
            None => Field::Absent,
            Some(Value::Array(items)) => Field::Present(
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|obj| ReportSection {
                        title: string_or_empty(obj.get("title")),
                        content: string_or_empty(obj.get("content")),
                    })
                    .collect(),
            ),
            Some(other) => Field::WrongType(other.clone()),
        }
    }

    /// String recommendations in order; non-string entries are skipped.
    pub fn recommendations(&self) -> Field<Vec<String>> {
        match self.fields.get("recommendations") {
            None => Field::Absent,
            Some(Value::Array(items)) => Field::Present(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            ),
            Some(other) => Field::WrongType(other.clone()),
        }
    }

    /// Compact encoding with top-level keys in sorted order.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        let sorted: BTreeMap<&String, &Value> = self.fields.iter().collect();
        serde_json::to_string(&sorted)
    }
}

fn string_or_empty(v: Option<&Value>) -> String {
    v.and_then(Value::as_str).unwrap_or_default().to_owned()
}
