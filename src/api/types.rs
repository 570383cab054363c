//! Request and response types shared by the client and its transports.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::QueryParams;
use crate::error::Result;

/// HTTP verbs the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// `multipart/form-data`, used for image uploads.
    Multipart(Vec<FormField>),
}

/// Per-call options.
///
/// `cache` is the only option the client interprets itself. It decides
/// whether a GET reads from and writes to the response cache, and it has no
/// effect on other verbs. Everything else goes to the transport unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub params: QueryParams,
    pub cache: bool,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            params: QueryParams::new(),
            cache: true,
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a parameter only when `value` is present.
    pub fn param_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Skip the response cache for this call, both read and write.
    pub fn no_cache(mut self) -> Self {
        self.cache = false;
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json_of<T: Serialize>(self, body: &T) -> Result<Self> {
        Ok(self.json(serde_json::to_value(body)?))
    }

    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = Some(RequestBody::Multipart(fields));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What a [`super::Transport`] is asked to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL.
    pub path: String,
    pub params: QueryParams,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Bearer token from the session store, when a session exists.
    pub bearer_token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
            bearer_token: None,
        }
    }
}

/// A backend response, or a replay of one from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body. Empty bodies are `null`; non-JSON text is a string.
    pub data: Value,
    /// True when served from the response cache without a network call.
    pub from_cache: bool,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            data,
            from_cache: false,
        }
    }

    /// Synthetic success envelope for a cache hit.
    pub fn cached(data: Value) -> Self {
        Self {
            status: 200,
            data,
            from_cache: true,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}
