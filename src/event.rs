//! API Gateway proxy event construction.

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const STAGE: &str = "prod";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub http_method: String,
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query_string_parameters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    pub is_base64_encoded: bool,
    pub request_context: RequestContext,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: String,
    pub stage: String,
    pub http_method: String,
    pub path: String,
}

/// Raw request flags as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub method: String,
    pub path: String,
    pub headers: String,
    pub query: String,
    pub body: String,
}

impl ProxyEvent {
    pub fn build(spec: &RequestSpec, request_id: String) -> Self {
        let method = spec.method.to_uppercase();
        Self {
            http_method: method.clone(),
            path: spec.path.clone(),
            query_string_parameters: parse_pairs(&spec.query, '='),
            headers: parse_pairs(&spec.headers, ':'),
            body: spec.body.clone(),
            is_base64_encoded: false,
            request_context: RequestContext {
                request_id,
                stage: STAGE.to_string(),
                http_method: method,
                path: spec.path.clone(),
            },
        }
    }
}

pub fn new_request_id(version: &str) -> String {
    format!("bedlamb-{version}-{}", Uuid::new_v4())
}

/// Parses `k<sep>v,k<sep>v`. Entries without `sep` are dropped; later keys win.
pub fn parse_pairs(input: &str, sep: char) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if input.is_empty() {
        return map;
    }
    for entry in input.split(',') {
        match entry.trim().split_once(sep) {
            Some((key, value)) => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => tracing::debug!(entry, separator = %sep, "dropping malformed pair"),
        }
    }
    map
}
