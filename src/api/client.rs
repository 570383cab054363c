//! Caching API client.
//!
//! Every request gets the session's bearer token. GET requests consult the
//! shared [`ResponseCache`] first and populate it on success. A 401/403
//! tears the session down and sends the application to the login boundary.
//! Concurrent identical GETs are not coalesced; each miss reaches the
//! transport.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{LogBoundary, LoginBoundary, SessionStore};
use crate::cache::{CacheSweeper, QueryParams, ResponseCache};
use crate::config::Config;
use crate::error::{InkpostError, Result};

use super::transport::{HttpTransport, Transport};
use super::types::{ApiRequest, ApiResponse, Method, RequestOptions};

/// Statuses that invalidate the current session.
const SESSION_REJECTED: [u16; 2] = [401, 403];

/// HTTP client wrapper with response caching and session handling.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    session: Arc<SessionStore>,
    boundary: Arc<dyn LoginBoundary>,
    cache_enabled: bool,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("cache_entries", &self.cache.len())
            .field("cache_enabled", &self.cache_enabled)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

impl ApiClient {
    /// Build a client around an explicit transport, cache and session.
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<ResponseCache>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            transport,
            cache,
            session,
            boundary: Arc::new(LogBoundary::new()),
            cache_enabled: true,
        }
    }

    /// Build the production client: reqwest transport, fresh cache and the
    /// session file named by the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.api)?;
        let session = SessionStore::open(config.session.resolved_path())?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(ResponseCache::new()),
            Arc::new(session),
        )
        .with_cache_enabled(config.cache.enabled))
    }

    pub fn with_boundary(mut self, boundary: Arc<dyn LoginBoundary>) -> Self {
        self.boundary = boundary;
        self
    }

    /// Globally enable or disable the response cache for this client.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Send a request.
    ///
    /// A GET whose options leave `cache` on is answered from the cache when
    /// an entry exists (status 200, `from_cache = true`), and stored in the
    /// cache after a successful response. Failures never touch the cache.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let bearer_token = self.session.token();

        let cache_key = (method == Method::Get && options.cache && self.cache_enabled)
            .then(|| ResponseCache::cache_key(path, &options.params));

        if let Some(key) = &cache_key {
            if let Some(data) = self.cache.get(key) {
                return Ok(ApiResponse::cached(data));
            }
        }

        let request = ApiRequest {
            method,
            path: path.to_string(),
            params: options.params,
            body: options.body,
            headers: options.headers,
            timeout: options.timeout,
            bearer_token,
        };

        let response = self.transport.send(request).await?;

        if SESSION_REJECTED.contains(&response.status) {
            self.teardown_session(response.status, path);
            return Err(InkpostError::Unauthorized {
                status: response.status,
            });
        }

        if !response.is_success() {
            debug!(method = %method, path, status = response.status, "Request failed");
            return Err(InkpostError::Status {
                status: response.status,
                body: response.data,
            });
        }

        if let Some(key) = cache_key {
            self.cache.insert(key, response.data.clone());
        }

        Ok(response)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::Get, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::Post, path, options).await
    }

    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::Put, path, options).await
    }

    pub async fn patch(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::Patch, path, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::Delete, path, options).await
    }

    /// GET and deserialize the body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.get(path, options).await?.json()
    }

    /// Send any verb and deserialize the body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(method, path, options).await?.json()
    }

    // ========================================================================
    // Cache control
    // ========================================================================

    /// Evict the cached GET for `path` + `params`. Returns `false` if absent.
    pub fn clear_cache_for(&self, path: &str, params: &QueryParams) -> bool {
        self.cache.remove(&ResponseCache::cache_key(path, params))
    }

    /// Evict the cached GETs for `path` under any params.
    pub fn clear_cache_for_path(&self, path: &str) -> usize {
        self.cache.remove_path(path)
    }

    /// Evict the cached GETs for `path` and everything beneath it.
    pub fn clear_cache_under(&self, path: &str) -> usize {
        self.cache.remove_subtree(path)
    }

    /// Evict every cached GET.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Evict cached GETs older than `max_age`. Returns how many were removed.
    pub fn invalidate_cache(&self, max_age: Duration) -> usize {
        self.cache.invalidate_older_than(max_age)
    }

    /// Start the periodic age sweep over this client's cache.
    pub fn start_sweeper(&self, interval: Duration, max_age: Duration) -> CacheSweeper {
        CacheSweeper::start(Arc::clone(&self.cache), interval, max_age)
    }

    fn teardown_session(&self, status: u16, path: &str) {
        warn!(status, path, "Backend rejected the session");
        match self.session.clear() {
            Ok(true) => info!("Session token cleared"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to clear session token"),
        }
        if !self.boundary.is_active() {
            self.boundary.enter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::MockTransport;
    use serde_json::json;

    fn client(mock: MockTransport) -> ApiClient {
        ApiClient::new(
            Arc::new(mock),
            Arc::new(ResponseCache::new()),
            Arc::new(SessionStore::in_memory()),
        )
    }

    #[tokio::test]
    async fn test_second_get_served_from_cache() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"title": "A"}))));
        let api = client(mock);

        let first = api.get("/posts/42", RequestOptions::new()).await.unwrap();
        assert!(!first.from_cache);
        let second = api.get("/posts/42", RequestOptions::new()).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.status, 200);
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn test_no_cache_skips_read_and_write() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(3)
            .returning(|_| Ok(ApiResponse::new(200, json!([1, 2]))));
        let api = client(mock);

        api.get("/messages/unread", RequestOptions::new().no_cache())
            .await
            .unwrap();
        assert!(api.cache().is_empty());

        // A cached entry exists now, but a no-cache call still goes out.
        api.get("/messages/unread", RequestOptions::new()).await.unwrap();
        let resp = api
            .get("/messages/unread", RequestOptions::new().no_cache())
            .await
            .unwrap();
        assert!(!resp.from_cache);
    }

    #[tokio::test]
    async fn test_params_are_part_of_the_key() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|req| Ok(ApiResponse::new(200, json!({"page": req.params["page"]}))));
        let api = client(mock);

        let p1 = api.get("/posts", RequestOptions::new().param("page", 1)).await.unwrap();
        let p2 = api.get("/posts", RequestOptions::new().param("page", 2)).await.unwrap();
        assert_eq!(p1.data["page"], "1");
        assert_eq!(p2.data["page"], "2");
        assert_eq!(api.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_cache_untouched() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(InkpostError::Http("connection reset".into())));
        let api = client(mock);
        api.cache().insert("/other{}".into(), json!("keep"));

        let err = api.get("/posts/1", RequestOptions::new()).await.unwrap_err();
        assert!(matches!(err, InkpostError::Http(_)));
        assert_eq!(api.cache().len(), 1);
        assert_eq!(api.cache().peek("/other{}").unwrap().payload, json!("keep"));
    }

    #[tokio::test]
    async fn test_error_status_is_not_cached() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(ApiResponse::new(404, json!({"error": "Post not found"}))));
        let api = client(mock);

        for _ in 0..2 {
            let err = api.get("/posts/missing", RequestOptions::new()).await.unwrap_err();
            assert_eq!(err.status(), Some(404));
        }
        assert!(api.cache().is_empty());
    }

    #[tokio::test]
    async fn test_non_get_is_never_cached() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(ApiResponse::new(200, json!({"likes": 3}))));
        let api = client(mock);

        api.post("/posts/7/like", RequestOptions::new()).await.unwrap();
        api.post("/posts/7/like", RequestOptions::new()).await.unwrap();
        assert!(api.cache().is_empty());
    }

    #[tokio::test]
    async fn test_cache_disabled_globally() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(ApiResponse::new(200, json!({}))));
        let api = client(mock).with_cache_enabled(false);

        api.get("/posts", RequestOptions::new()).await.unwrap();
        api.get("/posts", RequestOptions::new()).await.unwrap();
        assert!(api.cache().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.bearer_token.as_deref() == Some("tok"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({}))));
        let api = client(mock);
        api.session().set_token("tok").unwrap();

        api.get("/me", RequestOptions::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_token_means_no_bearer() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.bearer_token.is_none())
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!([]))));
        let api = client(mock);

        api.get("/posts/latest", RequestOptions::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_tears_down_session() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, json!({"error": "Token expired"}))));
        let boundary = Arc::new(LogBoundary::new());
        let api = client(mock).with_boundary(boundary.clone());
        api.session().set_token("stale").unwrap();
        api.cache().insert("/posts{}".into(), json!([]));

        let err = api.get("/me", RequestOptions::new()).await.unwrap_err();
        assert!(matches!(err, InkpostError::Unauthorized { status: 401 }));
        assert!(api.session().token().is_none());
        assert_eq!(boundary.times_entered(), 1);
        // 401 is not a cache event.
        assert!(api.cache().contains("/posts{}"));
        assert!(!api.cache().contains("/me{}"));
    }

    #[tokio::test]
    async fn test_forbidden_also_tears_down_session() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(403, json!({}))));
        let api = client(mock);
        api.session().set_token("t").unwrap();

        let err = api.delete("/posts/1", RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_unauthorized_at_login_boundary_does_not_reenter() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(ApiResponse::new(401, json!({}))));
        let boundary = Arc::new(LogBoundary::new());
        let api = client(mock).with_boundary(boundary.clone());

        let _ = api.get("/me", RequestOptions::new()).await;
        let _ = api.get("/me", RequestOptions::new()).await;
        assert_eq!(boundary.times_entered(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_for_forces_network() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(ApiResponse::new(200, json!({"title": "A"}))));
        let api = client(mock);

        api.get("/posts/42", RequestOptions::new()).await.unwrap();
        assert!(api.clear_cache_for("/posts/42", &QueryParams::new()));
        assert!(!api.clear_cache_for("/posts/42", &QueryParams::new()));
        let resp = api.get("/posts/42", RequestOptions::new()).await.unwrap();
        assert!(!resp.from_cache);
    }

    #[tokio::test]
    async fn test_clear_cache_and_invalidate() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(ApiResponse::new(200, json!(null))));
        let api = client(mock);

        api.get("/a", RequestOptions::new()).await.unwrap();
        api.get("/b", RequestOptions::new()).await.unwrap();
        assert_eq!(api.invalidate_cache(Duration::from_secs(300)), 0);
        assert_eq!(api.cache().len(), 2);
        api.clear_cache();
        assert!(api.cache().is_empty());
    }

    #[tokio::test]
    async fn test_options_pass_through_to_transport() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Patch
                    && req.path == "/posts/9"
                    && req.timeout == Some(Duration::from_secs(3))
                    && req.headers == vec![("X-Trace".to_string(), "1".to_string())]
                    && req.body == Some(crate::api::RequestBody::Json(json!({"featured": true})))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"featured": true}))));
        let api = client(mock);

        let opts = RequestOptions::new()
            .json(json!({"featured": true}))
            .header("X-Trace", "1")
            .timeout(Duration::from_secs(3));
        let resp = api.patch("/posts/9", opts).await.unwrap();
        assert_eq!(resp.data["featured"], true);
    }
}
