use reqwest::Method;
use serde_json::Value;

use crate::CancellationHandle;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Per-fetcher request options. The key (url) alone decides whether a new
/// request is needed; options are fixed for the lifetime of a fetcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    /// Serialized as JSON when present.
    pub body: Option<Value>,
}

impl FetchOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A single request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    /// At most one entry per name, compared case-insensitively. Starts from
    /// `Content-Type: application/json`; a caller header with the same name
    /// replaces the earlier entry in place.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub cancellation: CancellationHandle,
}

impl FetchRequest {
    pub fn new(
        url: &str,
        options: &FetchOptions,
        cancellation: CancellationHandle,
    ) -> Self {
        let mut headers =
            vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())];
        for (name, value) in &options.headers {
            let existing =
                headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name));
            match existing {
                Some(entry) => *entry = (name.clone(), value.clone()),
                None => headers.push((name.clone(), value.clone())),
            }
        }

        FetchRequest {
            url: url.to_string(),
            method: options.method.clone(),
            headers,
            body: options.body.clone(),
            cancellation,
        }
    }

    /// Value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
