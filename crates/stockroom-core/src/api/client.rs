//! API client for the stockroom REST API.
//!
//! This module provides the `ApiClient` struct. Every request it builds
//! carries `Content-Type: application/json` and, when the session holds a
//! token, `Authorization: Bearer <token>`. A 401 response is reported as
//! `ApiError::SessionExpired` unless it came from an auth endpoint or was
//! received on the login/register pages; the caller decides what to do
//! about it.

use std::time::Duration;

use reqwest::{header, Client, Method, Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::Session;
use crate::config::Config;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::router;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";

/// Endpoints whose 401 means bad credentials rather than an expired session
const AUTH_ENDPOINTS: &[&str] = &[LOGIN_ENDPOINT, REGISTER_ENDPOINT];

/// True if the URL targets the login or register endpoint
pub fn is_auth_endpoint(url: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|endpoint| url.contains(endpoint))
}

/// Whether a 401 for `url`, received while at `location`, should end the
/// session.
pub fn expires_session(url: &str, location: &str) -> bool {
    !is_auth_endpoint(url) && !router::is_auth_page(location)
}

/// What a request needs to know about its caller: the session supplying the
/// token and the client-side location the request is made from.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub session: &'a Session,
    pub location: &'a str,
}

impl<'a> RequestContext<'a> {
    pub fn new(session: &'a Session, location: &'a str) -> Self {
        Self { session, location }
    }
}

/// API client for the stockroom backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the base URL in `config`
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(config.resolved_base_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path. Absolute URLs are passed through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_headers(session: &Session) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = session.token() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Build a request with the JSON content type and the session's token
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext<'_>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Request, ApiError> {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .headers(Self::auth_headers(ctx.session)?);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }

    /// Pass successful responses through and turn failures into errors.
    pub async fn check_response(
        response: Response,
        request_url: &str,
        location: &str,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            if expires_session(request_url, location) {
                warn!(url = request_url, location, "Unauthorized response, session expired");
                return Err(ApiError::SessionExpired);
            }
            debug!(url = request_url, location, "Unauthorized response on auth flow");
        }

        Err(ApiError::from_status(status, &body))
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext<'_>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let request = self.build_request(ctx, method, path, body)?;
        let url = request.url().to_string();
        debug!(
            method = %request.method(),
            url = %url,
            authenticated = ctx.session.has_token(),
            "Sending request"
        );

        let response = self.client.execute(request).await?;
        Self::check_response(response, &url, ctx.location).await
    }

    /// Send a request and parse the JSON body. An empty body parses as `null`.
    pub async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext<'_>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let response = self.execute(ctx, method, path, body).await?;
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, ctx: &RequestContext<'_>, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(ctx, Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext<'_>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ctx, Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext<'_>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ctx, Method::PUT, path, Some(body)).await
    }

    /// Delete a resource, ignoring any response body
    pub async fn delete(&self, ctx: &RequestContext<'_>, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(ctx, Method::DELETE, path, None).await?;
        Ok(())
    }

    // ===== Authentication =====

    pub async fn login(&self, ctx: &RequestContext<'_>, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post(ctx, LOGIN_ENDPOINT, credentials).await
    }

    pub async fn register(&self, ctx: &RequestContext<'_>, details: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post(ctx, REGISTER_ENDPOINT, details).await
    }
}
