//! Request and response model types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// HTTP verb of an API operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether this verb carries a JSON body
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server response envelope wrapping every API payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Query parameter value with a declared domain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    StrList(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

/// Ordered parameter map; ordering keeps query strings deterministic
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Ordered header map
pub type HeaderMap = BTreeMap<String, String>;

/// JSON object used for request bodies
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

fn encode(component: &str) -> String {
    url::form_urlencoded::byte_serialize(component.as_bytes()).collect()
}

/// Serialize parameters as a query string.
///
/// Array values repeat the key with a `[]` suffix
/// (`tags[]=a&tags[]=b`); null values are omitted entirely.
pub fn to_query_string(params: &ParamMap) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (key, value) in params {
        match value {
            ParamValue::Null => {}
            ParamValue::Bool(b) => parts.push(format!("{}={}", encode(key), b)),
            ParamValue::Int(i) => parts.push(format!("{}={}", encode(key), i)),
            ParamValue::Str(s) => parts.push(format!("{}={}", encode(key), encode(s))),
            ParamValue::StrList(items) => {
                for item in items {
                    parts.push(format!("{}[]={}", encode(key), encode(item)));
                }
            }
        }
    }
    parts.join("&")
}
