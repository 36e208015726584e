use crate::{ApiError, ApiResult, ApiSettings, SessionManager};

use log::{debug, error, warn};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client for the backend REST API.
///
/// Every request carries the configured API key and, when someone is
/// signed in, the bearer token of the live session (read at request time,
/// so a sign-in or sign-out applies to the next call).
pub struct ApiClient {
    pub base_url: String,
    api_key: Option<String>,
    session: SessionManager,
    client: ReqwestClient,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: SessionManager) -> ApiResult<Self> {
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            session,
            client: settings.http_client()?,
        })
    }

    /// Build a request with API key and bearer headers
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("[API] {} {}", method, path);

        let mut req = self.client.request(method, &url);

        if let Some(ref api_key) = self.api_key {
            req = req.header(API_KEY_HEADER, api_key);
        }

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Execute request and handle errors
    async fn execute(&self, req: reqwest::RequestBuilder) -> ApiResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(ApiError::from_json(e)),
                Err(_) => Value::String(text),
            }
        };

        if !status.is_success() {
            log_failure(status, &body);
            return Err(ApiError::status(status.as_u16(), body));
        }

        Ok(body)
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, path);
        self.execute(req).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let req = self.request(Method::POST, path).json(body);
        self.execute(req).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let req = self.request(Method::PUT, path).json(body);
        self.execute(req).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        let req = self.request(Method::DELETE, path);
        self.execute(req).await
    }
}

fn log_failure(status: StatusCode, body: &Value) {
    match status {
        StatusCode::UNAUTHORIZED => warn!("[API] Unauthorized - token or API key rejected"),
        StatusCode::FORBIDDEN => warn!("[API] Forbidden"),
        StatusCode::TOO_MANY_REQUESTS => warn!("[API] Rate limit exceeded - please wait"),
        s if s.is_server_error() => error!("[API] Server error {}: {}", s.as_u16(), body),
        s => warn!("[API] Error {}: {}", s.as_u16(), body),
    }
}
