//! Purpose: Provide the runtime JSON decode/encode entrypoints.
//! Exports: `from_object_slice`, `to_string`, `ParseFailureCategory`, `categorize_error`, `hint_for_error`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Category mapping is deterministic for a given serde_json error.
//! Invariants: `from_object_slice` accepts only a top-level JSON object; repeated keys keep the last value.
//! Notes: Error mapping is done by callsites so domain context stays explicit.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Data,
    Eof,
    Io,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Io => "io",
        }
    }
}

/// Decode a record from a JSON object only. Arrays and scalars are `Data` errors.
pub(crate) fn from_object_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_slice(input)?;
    serde_json::from_value(Value::Object(object))
}

pub(crate) fn to_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Syntax => ParseFailureCategory::Syntax,
        Category::Data => ParseFailureCategory::Data,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Io => ParseFailureCategory::Io,
    }
}

pub(crate) fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    let advice = match category {
        ParseFailureCategory::Syntax => "input is not valid JSON",
        ParseFailureCategory::Data => "expected {\"name\": string, \"params\": [integer, ...]}",
        ParseFailureCategory::Eof => "input ended before the JSON document was complete",
        ParseFailureCategory::Io => "input could not be read",
    };
    format!(
        "{advice} (parse category: {}; context: {context}; line {}, column {})",
        category.label(),
        err.line(),
        err.column()
    )
}
