use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::ApiError;
use crate::session::Tokens;

// =============================================================================
// 1. REQUEST / RESPONSE VALUE TYPES
// =============================================================================

/// HTTP method subset used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// A single request to the backend, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

/// Raw response: status code plus the decoded JSON body (`Null` when the
/// body is empty, e.g. a 204 on delete).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort human-readable error detail. The backend usually sends
    /// `{"detail": "..."}` but validation failures arrive as a list.
    pub fn detail(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            Value::Array(parts) => parts
                .iter()
                .map(|part| part.as_str().map(str::to_string).unwrap_or_else(|| part.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
            Value::Object(map) => match map.get("detail").and_then(Value::as_str) {
                Some(detail) => detail.to_string(),
                None => self.body.to_string(),
            },
            _ => self.body.to_string(),
        }
    }
}

// =============================================================================
// 2. THE TRANSPORT SEAM
// =============================================================================

/// Executes requests against the backend. Implemented by [`HttpTransport`]
/// in production and by a channel-backed mock in tests, so every domain
/// client can be exercised without a live server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Patch => self.http.patch(&url),
            Method::Delete => self.http.delete(&url),
        };
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                // Error pages are not always JSON; keep the text for detail().
                Err(_) if !(200..300).contains(&status) => {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                Err(err) => return Err(ApiError::Decode(err.to_string())),
            }
        };

        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// 3. THE API CLIENT
// =============================================================================

/// The one shared request pipeline every domain client wraps.
///
/// Attaches the bearer token, maps HTTP statuses onto [`ApiError`], and
/// performs the single refresh-on-401 retry: an access token rejected once
/// is refreshed through `/auth/jwt/refresh/` and the original request is
/// replayed exactly once. A second rejection clears the tokens and surfaces
/// [`ApiError::Unauthorized`] so the caller can tear the session down.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<RwLock<Option<Tokens>>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tokens: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_tokens(&self, tokens: Tokens) {
        *self.tokens.write().await = Some(tokens);
    }

    pub async fn clear_tokens(&self) {
        *self.tokens.write().await = None;
    }

    pub async fn has_session(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::Get, path, None).await?;
        Self::decode(response)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let response = self.send(Method::Post, path, Some(body)).await?;
        Self::decode(response)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let response = self.send(Method::Patch, path, Some(body)).await?;
        Self::decode(response)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::Delete, path, None).await?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(path = %path))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        debug!("Sending request");
        let token = self.access_token().await;
        let response = self
            .transport
            .execute(ApiRequest {
                method,
                path: path.to_string(),
                body: body.clone(),
                token,
            })
            .await?;
        if response.status != 401 {
            return Self::check(path, response);
        }

        // One refresh, one replay. A 401 without a refresh token on hand is
        // terminal immediately.
        debug!("Access token rejected, refreshing session");
        self.refresh().await?;
        let token = self.access_token().await;
        let response = self
            .transport
            .execute(ApiRequest {
                method,
                path: path.to_string(),
                body,
                token,
            })
            .await?;
        if response.status == 401 {
            warn!("Request unauthorized after token refresh, clearing session");
            self.clear_tokens().await;
            return Err(ApiError::Unauthorized);
        }
        Self::check(path, response)
    }

    async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.access.clone())
    }

    /// Exchanges the refresh token for a new access token.
    async fn refresh(&self) -> Result<(), ApiError> {
        let refresh = match self.tokens.read().await.as_ref() {
            Some(tokens) => tokens.refresh.clone(),
            None => return Err(ApiError::Unauthorized),
        };

        let response = self
            .transport
            .execute(ApiRequest {
                method: Method::Post,
                path: "/auth/jwt/refresh/".to_string(),
                body: Some(json!({ "refresh": refresh })),
                token: None,
            })
            .await?;
        if !response.is_success() {
            warn!(status = response.status, "Token refresh rejected, clearing session");
            self.clear_tokens().await;
            return Err(ApiError::Unauthorized);
        }

        let access = response
            .body
            .get("access")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Decode("refresh response missing access token".to_string()))?
            .to_string();
        if let Some(tokens) = self.tokens.write().await.as_mut() {
            tokens.access = access;
        }
        Ok(())
    }

    fn check(path: &str, response: ApiResponse) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        Err(match response.status {
            400 => ApiError::BadRequest { detail: response.detail() },
            403 => ApiError::Forbidden { detail: response.detail() },
            404 => ApiError::NotFound { path: path.to_string() },
            status => ApiError::Status { status, detail: response.detail() },
        })
    }

    fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
        serde_json::from_value(response.body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_framework::{authed_client, expect_request, mock_transport};
    use serde_json::json;

    #[tokio::test]
    async fn maps_error_statuses() {
        let (api, mut rx) = authed_client(4).await;

        let task = tokio::spawn(async move { api.get::<Value>("/api/cart/").await });
        let recorded = expect_request(&mut rx, Method::Get, "/api/cart/").await;
        recorded.respond(403, json!({ "detail": "customers only" }));

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { detail } if detail == "customers only"));
    }

    #[tokio::test]
    async fn refreshes_once_on_401_and_replays() {
        let (api, mut rx) = authed_client(4).await;

        let task = {
            let api = api.clone();
            tokio::spawn(async move { api.get::<Value>("/api/orders/").await })
        };

        let recorded = expect_request(&mut rx, Method::Get, "/api/orders/").await;
        assert_eq!(recorded.request.token.as_deref(), Some("access-token"));
        recorded.respond(401, json!({ "detail": "token expired" }));

        let refresh = expect_request(&mut rx, Method::Post, "/auth/jwt/refresh/").await;
        assert_eq!(refresh.request.body.as_ref().unwrap()["refresh"], "refresh-token");
        refresh.respond(200, json!({ "access": "fresh-token" }));

        let replay = expect_request(&mut rx, Method::Get, "/api/orders/").await;
        assert_eq!(replay.request.token.as_deref(), Some("fresh-token"));
        replay.respond(200, json!([]));

        assert_eq!(task.await.unwrap().unwrap(), json!([]));
    }

    #[tokio::test]
    async fn second_401_clears_session() {
        let (api, mut rx) = authed_client(4).await;

        let task = {
            let api = api.clone();
            tokio::spawn(async move { api.get::<Value>("/api/orders/").await })
        };

        expect_request(&mut rx, Method::Get, "/api/orders/")
            .await
            .respond(401, json!({ "detail": "token expired" }));
        expect_request(&mut rx, Method::Post, "/auth/jwt/refresh/")
            .await
            .respond(200, json!({ "access": "fresh-token" }));
        expect_request(&mut rx, Method::Get, "/api/orders/")
            .await
            .respond(401, json!({ "detail": "still expired" }));

        assert!(matches!(task.await.unwrap().unwrap_err(), ApiError::Unauthorized));
        assert!(!api.has_session().await);
    }

    #[tokio::test]
    async fn unauthenticated_401_is_terminal_without_refresh() {
        let (transport, mut rx) = mock_transport(4);
        let api = ApiClient::new(std::sync::Arc::new(transport));

        let task = {
            let api = api.clone();
            tokio::spawn(async move { api.get::<Value>("/api/cart/").await })
        };

        expect_request(&mut rx, Method::Get, "/api/cart/")
            .await
            .respond(401, json!({ "detail": "no credentials" }));

        assert!(matches!(task.await.unwrap().unwrap_err(), ApiError::Unauthorized));
        // No refresh attempt may follow when no refresh token exists.
        assert!(rx.try_recv().is_err());
    }
}
