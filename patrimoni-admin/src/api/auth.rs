//! Authentication endpoints

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use patrimoni_common::models::{AuthToken, Credentials, User};
use patrimoni_common::normalize::{to_canonical, WirePayload};
use patrimoni_common::validation::{validate_login, validate_registration};

use super::client::{ApiClient, Channel};
use super::error::{ApiError, ApiResult};

impl ApiClient {
    /// Exchange credentials for a bearer token (form-encoded)
    ///
    /// The token is returned, not stored; see [`ApiClient::set_token`].
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        validate_login(credentials)?;
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let raw = self.send_form(Channel::Public, "/auth/login", &form).await?;
        let token: AuthToken =
            serde_json::from_value(raw).map_err(|e| ApiError::Decode(e.to_string()))?;
        info!(username = %credentials.username, "Login accepted");
        Ok(token)
    }

    /// The user owning the current credential
    pub async fn me(&self) -> ApiResult<User> {
        let raw = self
            .get_value(Channel::Authenticated, "/auth/me", &[])
            .await?;
        Ok(to_canonical(&raw)?)
    }

    /// Create an account
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<User> {
        validate_registration(credentials)?;
        let mut payload = WirePayload::new();
        payload.insert("username".into(), Value::from(credentials.username.as_str()));
        payload.insert("password".into(), Value::from(credentials.password.as_str()));
        let raw = self
            .send_json(Channel::Public, Method::POST, "/auth/register", &payload)
            .await?;
        Ok(to_canonical(&raw)?)
    }
}
