//! Purpose: Define the request and response records of one invocation.
//! Exports: `Request`, `Response`.
//! Role: Wire shapes for stdin and stdout JSON; no behavior beyond construction.
//! Invariants: Missing or `null` fields decode as their empty defaults; unknown fields are ignored.
//! Invariants: Requests are decoded through `json::parse::from_object_slice`, so only JSON objects qualify.
//! Invariants: `Response` field names are exactly `name`, `sum`, `version`.
use serde::{Deserialize, Deserializer, Serialize};

use super::reduce::sum_params;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Vec<i64>,
    /// Upstream trace id, decimal u64, used to link the root span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    pub sum: i64,
    pub version: String,
}

impl Response {
    pub fn from_request(request: &Request, version: &str) -> Self {
        Self {
            name: request.name.clone(),
            sum: sum_params(&request.params),
            version: version.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
