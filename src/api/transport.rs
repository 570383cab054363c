//! HTTP transport behind the API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{InkpostError, Result};

use super::types::{ApiRequest, ApiResponse, FormField, RequestBody};

/// Sends one request to the backend.
///
/// Implementations return `Ok` for every response the backend produced,
/// whatever its status; status handling belongs to the client. `Err` means
/// no response arrived.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    default_timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(base_url: &str, default_timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), &config.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a request path onto the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build_form(fields: Vec<FormField>) -> Result<Form> {
        let mut form = Form::new();
        for field in fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| {
                            InkpostError::InvalidRequest(format!(
                                "invalid MIME type '{}': {}",
                                mime, e
                            ))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .timeout(request.timeout.unwrap_or(self.default_timeout));

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Multipart(fields)) => builder.multipart(Self::build_form(fields)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(status, bytes = bytes.len(), "Received response");

        Ok(ApiResponse::new(status, parse_body(&bytes)))
    }
}

/// Empty bodies become `null`; bodies that are not JSON become a string.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Method;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://127.0.0.1:{}/api", port), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        if text[..header_end]
            .to_ascii_lowercase()
            .contains("transfer-encoding: chunked")
        {
            return text.ends_with("0\r\n\r\n");
        }
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(5), "inkpost-test").unwrap()
    }

    #[test]
    fn test_url_for_joins_slashes() {
        let t = transport("https://example.com/api/");
        assert_eq!(t.url_for("/posts/42"), "https://example.com/api/posts/42");
        assert_eq!(t.url_for("posts"), "https://example.com/api/posts");
        assert_eq!(
            t.url_for("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body(b"Internal error"), json!("Internal error"));
    }

    #[tokio::test]
    async fn test_get_with_params_and_bearer() {
        let (base, server) = serve_once("200 OK", r#"{"title":"A"}"#).await;
        let t = transport(&base);

        let mut request = ApiRequest::new(Method::Get, "/posts/latest");
        request.params.insert("limit".into(), "4".into());
        request.bearer_token = Some("tok-123".into());

        let response = t.send(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!({"title": "A"}));
        assert!(!response.from_cache);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /api/posts/latest?limit=4 HTTP/1.1"), "raw: {}", raw);
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let (base, server) = serve_once("201 Created", r#"{"_id":"c1"}"#).await;
        let t = transport(&base);

        let mut request = ApiRequest::new(Method::Post, "/posts/7/comments");
        request.body = Some(RequestBody::Json(json!({"text": "nice"})));

        let response = t.send(request).await.unwrap();
        assert_eq!(response.status, 201);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/posts/7/comments"));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"text":"nice"}"#));
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let (base, server) = serve_once("404 Not Found", r#"{"error":"Post not found"}"#).await;
        let t = transport(&base);

        let response = t.send(ApiRequest::new(Method::Get, "/posts/missing")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.data["error"], "Post not found");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let (base, server) = serve_once("201 Created", "{}").await;
        let t = transport(&base);

        let mut request = ApiRequest::new(Method::Post, "/posts");
        request.body = Some(RequestBody::Multipart(vec![
            FormField::text("title", "Hello"),
            FormField::File {
                name: "image".into(),
                file_name: "cover.png".into(),
                mime: "image/png".into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            },
        ]));
        t.send(request).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.contains("multipart/form-data"));
        assert!(raw.contains("name=\"title\""));
        assert!(raw.contains("filename=\"cover.png\""));
    }

    #[tokio::test]
    async fn test_invalid_mime_is_rejected() {
        let t = transport("http://127.0.0.1:9/api");
        let mut request = ApiRequest::new(Method::Post, "/posts");
        request.body = Some(RequestBody::Multipart(vec![FormField::File {
            name: "image".into(),
            file_name: "x".into(),
            mime: "not a mime".into(),
            bytes: vec![],
        }]));
        let err = t.send(request).await.unwrap_err();
        assert!(matches!(err, InkpostError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let t = transport(&format!("http://127.0.0.1:{}/api", port));
        let err = t.send(ApiRequest::new(Method::Get, "/posts")).await.unwrap_err();
        assert!(matches!(err, InkpostError::Http(_)));
    }
}
