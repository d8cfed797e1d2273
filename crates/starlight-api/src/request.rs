//! Per-call request values and descriptor merging
//!
//! Merging combines a descriptor's fixed fields with the caller's
//! values: fixed fields form the base layer, caller values win on key
//! collision. Path parameters substitute into `{name}` placeholders;
//! an unmatched placeholder stays literal, matching the backend's
//! routing expectations. The merge is pure — concurrent calls over
//! the same descriptor never share state.

use std::collections::BTreeMap;

use crate::descriptor::ApiDescriptor;
use crate::model::{HeaderMap, JsonObject, ParamMap, ParamValue, RequestMethod};

/// Caller-supplied request values, all optional
#[derive(Clone, Debug, Default)]
pub struct ApiRequest {
    pub params: ParamMap,
    pub path_params: BTreeMap<String, String>,
    pub data: Option<JsonObject>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_path_param(mut self, key: &str, value: impl ToString) -> Self {
        self.path_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data
            .get_or_insert_with(JsonObject::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn with_body(mut self, body: JsonObject) -> Self {
        self.data = Some(body);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// A descriptor and a per-call request combined into one concrete call
#[derive(Clone, Debug)]
pub struct MergedRequest {
    pub uri: String,
    pub method: RequestMethod,
    pub params: ParamMap,
    pub data: Option<JsonObject>,
    pub headers: HeaderMap,
}

/// Substitute `{name}` placeholders from `path_params`.
///
/// Placeholders without a matching parameter are left as literal text.
pub fn resolve_uri(template: &str, path_params: &BTreeMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        result.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                let name = &after[1..end];
                match path_params.get(name) {
                    Some(value) => result.push_str(value),
                    None => result.push_str(&after[..=end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(after);
                return result;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Merge a descriptor with a per-call request; the caller wins on
/// key collision, the body merge applies only to POST/PUT.
pub fn merge_request(descriptor: &ApiDescriptor, request: Option<&ApiRequest>) -> MergedRequest {
    let empty = ApiRequest::default();
    let request = request.unwrap_or(&empty);

    let mut params = descriptor.fixed_params.clone();
    params.extend(request.params.clone());

    let mut headers = descriptor.fixed_headers.clone();
    headers.extend(request.headers.clone());

    let data = if descriptor.method.has_body() {
        match (&descriptor.fixed_data, &request.data) {
            (Some(fixed), Some(own)) => {
                let mut merged = fixed.clone();
                merged.extend(own.clone());
                Some(merged)
            }
            (Some(fixed), None) => Some(fixed.clone()),
            (None, own) => own.clone(),
        }
    } else {
        None
    };

    MergedRequest {
        uri: resolve_uri(&descriptor.uri, &request.path_params),
        method: descriptor.method,
        params,
        data,
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uri_substitutes_all() {
        let mut params = BTreeMap::new();
        params.insert("x".to_string(), "1".to_string());
        params.insert("y".to_string(), "2".to_string());
        assert_eq!(resolve_uri("/a/{x}/b/{y}", &params), "/a/1/b/2");
    }

    #[test]
    fn test_resolve_uri_unmatched_stays_literal() {
        let mut params = BTreeMap::new();
        params.insert("x".to_string(), "1".to_string());
        assert_eq!(resolve_uri("/a/{x}/b/{y}", &params), "/a/1/b/{y}");
        assert_eq!(resolve_uri("/plain", &params), "/plain");
        // Unterminated brace is passed through untouched
        assert_eq!(resolve_uri("/a/{x", &params), "/a/{x");
    }

    #[test]
    fn test_merge_caller_wins_on_collision() {
        let descriptor = ApiDescriptor::get("/list").with_fixed_param("scope", "admin");
        let request = ApiRequest::new()
            .with_param("scope", "user")
            .with_param("q", "x");

        let merged = merge_request(&descriptor, Some(&request));
        assert_eq!(
            merged.params.get("scope"),
            Some(&ParamValue::Str("user".to_string()))
        );
        assert_eq!(
            merged.params.get("q"),
            Some(&ParamValue::Str("x".to_string()))
        );
        assert_eq!(merged.params.len(), 2);
    }

    #[test]
    fn test_merge_body_only_for_write_verbs() {
        let descriptor = ApiDescriptor::get("/list")
            .with_fixed_data("kind", serde_json::json!("fixed"));
        let request = ApiRequest::new().with_data("name", serde_json::json!("n"));

        // GET drops body entirely
        let merged = merge_request(&descriptor, Some(&request));
        assert!(merged.data.is_none());

        let descriptor = ApiDescriptor::post("/create")
            .with_fixed_data("kind", serde_json::json!("fixed"))
            .with_fixed_data("name", serde_json::json!("default"));
        let merged = merge_request(&descriptor, Some(&request));
        let data = merged.data.unwrap();
        assert_eq!(data.get("kind"), Some(&serde_json::json!("fixed")));
        // Caller overrides the fixed value
        assert_eq!(data.get("name"), Some(&serde_json::json!("n")));
    }

    #[test]
    fn test_merge_is_pure() {
        let descriptor = ApiDescriptor::get("/item/{id}").with_fixed_param("scope", "admin");

        let first = merge_request(
            &descriptor,
            Some(&ApiRequest::new().with_path_param("id", 1)),
        );
        let second = merge_request(
            &descriptor,
            Some(&ApiRequest::new().with_path_param("id", 2)),
        );

        assert_eq!(first.uri, "/item/1");
        assert_eq!(second.uri, "/item/2");
        assert_eq!(descriptor.uri, "/item/{id}");
        assert_eq!(descriptor.fixed_params.len(), 1);
    }
}
