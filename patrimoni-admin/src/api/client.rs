//! HTTP client wrapper
//!
//! One [`ApiClient`] serves both trust levels:
//! - [`Channel::Public`] never attaches a credential
//! - [`Channel::Authenticated`] attaches the bearer token when one is held,
//!   and turns an unauthorized response into a session logout
//!
//! The bearer token has exactly one writer ([`ApiClient::set_token`] and the
//! unauthorized handler); every login/logout transition is broadcast on the
//! client's [`SessionBus`].

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use patrimoni_common::config::ClientConfig;
use patrimoni_common::events::{LogoutReason, SessionBus, SessionEvent};
use patrimoni_common::models::PendingImage;
use patrimoni_common::normalize::WirePayload;
use patrimoni_common::validation::ValidationError;

use super::error::{ApiError, ApiResult};

const USER_AGENT: &str = concat!("patrimoni-admin/", env!("CARGO_PKG_VERSION"));

/// Trust level of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Public,
    Authenticated,
}

/// Shared handle to the backend; cheap to clone
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    token: RwLock<Option<String>>,
    bus: SessionBus,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.config.api_base)
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl ApiClient {
    /// Create a client with its own session bus
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let bus = SessionBus::new(config.event_capacity);
        Self::with_bus(config, bus)
    }

    /// Create a client publishing session transitions on `bus`
    pub fn with_bus(config: ClientConfig, bus: SessionBus) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                token: RwLock::new(None),
                bus,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn api_base(&self) -> &str {
        &self.inner.config.api_base
    }

    pub fn session_bus(&self) -> &SessionBus {
        &self.inner.bus
    }

    /// Receive every session transition emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.bus.subscribe()
    }

    // ========================================
    // Credential store
    // ========================================

    fn read_token(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.inner.token.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_token(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.inner.token.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Store or clear the bearer token
    ///
    /// Storing emits [`SessionEvent::Login`]; clearing emits a manual
    /// [`SessionEvent::Logout`]. A blank token counts as clearing.
    pub fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.trim().is_empty());
        let event = match token {
            Some(_) => SessionEvent::Login,
            None => SessionEvent::Logout {
                reason: LogoutReason::Manual,
            },
        };
        *self.write_token() = token;
        info!(?event, "Session credential updated");
        self.inner.bus.emit_lossy(event);
    }

    pub fn clear_token(&self) {
        self.set_token(None);
    }

    pub fn token(&self) -> Option<String> {
        self.read_token().clone()
    }

    pub fn has_token(&self) -> bool {
        self.read_token().is_some()
    }

    /// The server rejected our credential: drop it and broadcast once
    fn handle_unauthorized(&self) {
        let had_token = self.write_token().take().is_some();
        warn!(had_token, "Unauthorized response, clearing session credential");
        self.inner.bus.emit_lossy(SessionEvent::Logout {
            reason: LogoutReason::TokenInvalidOrExpired,
        });
    }

    // ========================================
    // Request plumbing
    // ========================================

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.config.api_base, path)
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.http.request(method, self.url(path))
    }

    /// Send a request and map any non-success status to [`ApiError`]
    ///
    /// On the authenticated channel an unauthorized status clears the
    /// credential and emits a logout, and the error is still returned.
    async fn execute(&self, channel: Channel, builder: RequestBuilder) -> ApiResult<Response> {
        let builder = match (channel, self.token()) {
            (Channel::Authenticated, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        };
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(method = %method, url = %url, channel = ?channel, "API request");

        let response = self.inner.http.execute(request).await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "API request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!(method = %method, url = %url, status = status.as_u16(), "API response");
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %url, error = %e, "Could not read error body");
                Default::default()
            }
        };
        let err = ApiError::from_parts(status, &headers, &body);

        if status == StatusCode::UNAUTHORIZED && channel == Channel::Authenticated {
            self.handle_unauthorized();
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, retry_after = ?err.retry_after_seconds(), "Request throttled");
        }
        Err(err)
    }

    /// Decode a body as JSON; an empty body reads as `null`
    async fn read_json(response: Response) -> ApiResult<Value> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn get_value(
        &self,
        channel: Channel,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Value> {
        let builder = self.builder(Method::GET, path).query(query);
        let response = self.execute(channel, builder).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_json(
        &self,
        channel: Channel,
        method: Method,
        path: &str,
        body: &WirePayload,
    ) -> ApiResult<Value> {
        let builder = self.builder(method, path).json(body);
        let response = self.execute(channel, builder).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_form(
        &self,
        channel: Channel,
        path: &str,
        form: &[(&str, &str)],
    ) -> ApiResult<Value> {
        let builder = self.builder(Method::POST, path).form(form);
        let response = self.execute(channel, builder).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_empty(
        &self,
        channel: Channel,
        method: Method,
        path: &str,
    ) -> ApiResult<Value> {
        let response = self.execute(channel, self.builder(method, path)).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_multipart(
        &self,
        channel: Channel,
        method: Method,
        path: &str,
        field: &'static str,
        image: &PendingImage,
    ) -> ApiResult<Value> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|_| {
                ValidationError::on_field(
                    "image",
                    format!("Type de fichier invalide : {}", image.content_type),
                )
            })?;
        let form = Form::new().part(field, part);
        let builder = self.builder(method, path).multipart(form);
        let response = self.execute(channel, builder).await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let c = client();
        assert_eq!(c.url("/articles/3"), "http://localhost:8000/articles/3");
    }

    #[test]
    fn test_set_token_emits_login() {
        let c = client();
        let mut rx = c.subscribe();
        c.set_token(Some("abc".into()));
        assert!(c.has_token());
        assert_eq!(c.token().as_deref(), Some("abc"));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Login);
    }

    #[test]
    fn test_clear_token_emits_manual_logout() {
        let c = client();
        c.set_token(Some("abc".into()));
        let mut rx = c.subscribe();
        c.clear_token();
        assert!(!c.has_token());
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Logout {
                reason: LogoutReason::Manual
            }
        );
    }

    #[test]
    fn test_blank_token_counts_as_logout() {
        let c = client();
        let mut rx = c.subscribe();
        c.set_token(Some("   ".into()));
        assert!(!c.has_token());
        assert!(matches!(rx.try_recv().unwrap(), SessionEvent::Logout { .. }));
    }

    #[test]
    fn test_unauthorized_handler_emits_single_logout() {
        let c = client();
        c.set_token(Some("abc".into()));
        let mut rx = c.subscribe();
        c.handle_unauthorized();
        assert!(!c.has_token());
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Logout {
                reason: LogoutReason::TokenInvalidOrExpired
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let c = client();
        c.set_token(Some("secret-token".into()));
        let debug = format!("{c:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("has_token: true"));
    }
}
