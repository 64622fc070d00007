//! HTTP client: merged default headers, per-attempt timeout, retry with `attempt * step` backoff.

use crate::config::{resolve_auth_token, Config, HttpConfig};
use crate::http::ApiResult;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("HTTP Error: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("relative URL {0} needs http.baseUrl")]
    RelativeUrl(String),
}

/// Waits between retry attempts. Injected so tests can record delays instead of sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Per-call options. Unset timeout/retries fall back to the client's configured defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Extra headers; these win over the client's defaults.
    pub headers: Vec<(String, String)>,
    /// Serialized as JSON when present.
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: None,
            retries: None,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Successful response body: parsed JSON when the server says so, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    /// Text body as is; a JSON string unwrapped; any other JSON rendered compactly.
    pub fn into_text(self) -> String {
        match self {
            ResponseBody::Text(s) => s,
            ResponseBody::Json(serde_json::Value::String(s)) => s,
            ResponseBody::Json(v) => v.to_string(),
        }
    }
}

/// Request executor shared by the chat gateway and the record fetcher.
#[derive(Clone)]
pub struct HttpClient {
    base_url: Option<String>,
    default_headers: HeaderMap,
    timeout: Duration,
    retries: u32,
    backoff_step: Duration,
    sleeper: Arc<dyn Sleeper>,
    client: reqwest::Client,
}

impl HttpClient {
    /// Client with the given defaults and no auth token.
    pub fn new(config: &HttpConfig) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            base_url: config
                .base_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            default_headers,
            timeout: config.timeout(),
            retries: config.retries,
            backoff_step: config.backoff_step(),
            sleeper: Arc::new(TokioSleeper),
            client: reqwest::Client::new(),
        }
    }

    /// Client from the full config, with the resolved auth token applied.
    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        let mut client = Self::new(&config.http);
        if let Some(token) = resolve_auth_token(config) {
            client.set_auth_token(&token)?;
        }
        Ok(client)
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Send `Authorization: Bearer <token>` on every subsequent request.
    pub fn set_auth_token(&mut self, token: &str) -> Result<(), HttpError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HttpError::InvalidHeader(format!("authorization: {}", e)))?;
        self.default_headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    pub fn remove_auth_token(&mut self) {
        self.default_headers.remove(AUTHORIZATION);
    }

    fn resolve_url(&self, url: &str) -> Result<String, HttpError> {
        if url.starts_with("http") {
            return Ok(url.to_string());
        }
        match &self.base_url {
            Some(base) if url.starts_with('/') => Ok(format!("{}{}", base, url)),
            Some(base) => Ok(format!("{}/{}", base, url)),
            None => Err(HttpError::RelativeUrl(url.to_string())),
        }
    }

    fn merged_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, HttpError> {
        let mut headers = self.default_headers.clone();
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Run the request, retrying failed attempts. Never returns an error outside the `ApiResult`.
    pub async fn request(&self, url: &str, options: RequestOptions) -> ApiResult<ResponseBody> {
        let timeout = options.timeout.unwrap_or(self.timeout);
        let retries = options.retries.unwrap_or(self.retries);
        let prepared = self
            .resolve_url(url)
            .and_then(|full| self.merged_headers(&options.headers).map(|h| (full, h)));
        let (full_url, headers) = match prepared {
            Ok(p) => p,
            Err(e) => {
                log::error!("http: {} {} not sent: {}", options.method, url, e);
                return ApiResult::failure(e.to_string());
            }
        };

        let mut attempt: u32 = 0;
        loop {
            match self.attempt(&full_url, &options, &headers, timeout).await {
                Ok(body) => return ApiResult::success(body),
                Err(e) => {
                    log::warn!(
                        "http: {} {} failed (attempt {}/{}): {}",
                        options.method,
                        full_url,
                        attempt + 1,
                        retries.saturating_add(1),
                        e
                    );
                    if attempt >= retries {
                        return ApiResult::failure(e.to_string());
                    }
                    attempt += 1;
                    let backoff = self
                        .backoff_step
                        .checked_mul(attempt)
                        .unwrap_or(Duration::MAX);
                    self.sleeper.sleep(backoff).await;
                }
            }
        }
    }

    /// Like [`request`](Self::request) but deserializes a JSON body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.request(url, options).await.and_then(|body| match body {
            ResponseBody::Json(v) => serde_json::from_value::<T>(v)
                .map_err(HttpError::Decode)
                .into(),
            ResponseBody::Text(_) => ApiResult::failure("expected a JSON response body"),
        })
    }

    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<ResponseBody, HttpError> {
        let mut req = self
            .client
            .request(options.method.clone(), url)
            .headers(headers.clone());
        if let Some(ref body) = options.body {
            req = req.json(body);
        }
        tokio::time::timeout(timeout, exchange(req))
            .await
            .map_err(|_| HttpError::Timeout(timeout))?
    }

    pub async fn get(&self, url: &str) -> ApiResult<ResponseBody> {
        self.request(url, RequestOptions::new(Method::GET)).await
    }

    pub async fn post(&self, url: &str, body: serde_json::Value) -> ApiResult<ResponseBody> {
        self.request(url, RequestOptions::new(Method::POST).body(body))
            .await
    }

    pub async fn put(&self, url: &str, body: serde_json::Value) -> ApiResult<ResponseBody> {
        self.request(url, RequestOptions::new(Method::PUT).body(body))
            .await
    }

    pub async fn patch(&self, url: &str, body: serde_json::Value) -> ApiResult<ResponseBody> {
        self.request(url, RequestOptions::new(Method::PATCH).body(body))
            .await
    }

    pub async fn delete(&self, url: &str) -> ApiResult<ResponseBody> {
        self.request(url, RequestOptions::new(Method::DELETE)).await
    }
}

/// One request/response exchange: status check, then JSON or text body.
async fn exchange(req: reqwest::RequestBuilder) -> Result<ResponseBody, HttpError> {
    let res = req.send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);
    let text = res.text().await?;
    if is_json {
        Ok(ResponseBody::Json(serde_json::from_str(&text)?))
    } else {
        Ok(ResponseBody::Text(text))
    }
}
