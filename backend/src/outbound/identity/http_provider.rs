//! Reqwest-backed identity provider adapter.
//!
//! Targets a GoTrue-compatible REST API (`/auth/v1/...`). Every request
//! carries the project API key; token-scoped calls add a bearer token.
//! Client errors become [`IdentityProviderError::Rejected`], transport and
//! server errors [`IdentityProviderError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{
    EmailDto, PasswordDto, PasswordGrantDto, ResendDto, SignUpDto, SignUpMetadataDto,
    TokenResponseDto, UserDto,
};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{
    AccessToken, AuthSession, EmailAddress, Identity, LoginCredentials, NewPassword, Registration,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const PREVIEW_CHAR_LIMIT: usize = 160;

/// Connection settings for [`HttpIdentityProvider`].
#[derive(Clone)]
pub struct IdentityProviderSettings {
    /// Base URL of the auth service, e.g. `https://project.example.com`.
    pub base_url: Url,
    /// Project API key sent as the `apikey` header.
    pub api_key: Zeroizing<String>,
    /// Page the password-reset email links back to.
    pub reset_redirect: Option<Url>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl IdentityProviderSettings {
    /// Settings with the default timeout and no reset redirect.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: Zeroizing::new(api_key.into()),
            reset_redirect: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Identity provider reached over HTTP.
pub struct HttpIdentityProvider {
    client: Client,
    settings: IdentityProviderSettings,
}

impl HttpIdentityProvider {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: IdentityProviderSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        self.settings
            .base_url
            .join(&format!("auth/v1/{path}"))
            .map_err(|err| IdentityProviderError::unavailable(format!("endpoint {path}: {err}")))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.settings.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, IdentityProviderError> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(map_status_error(status, body.as_ref()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), IdentityProviderError> {
        self.send(builder).await.map(drop)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, IdentityProviderError> {
    let body = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(body.as_ref())
        .map_err(|err| IdentityProviderError::decode(format!("invalid JSON payload: {err}")))
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_identity(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Identity>, IdentityProviderError> {
        let url = self.endpoint("user")?;
        let result = self
            .send(self.client.get(url).bearer_auth(token.expose()))
            .await;
        let response = match result {
            Ok(response) => response,
            Err(IdentityProviderError::Rejected { message }) => {
                debug!(%message, "access token not recognised");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let user: UserDto = decode(response).await?;
        user.into_identity()
            .map(Some)
            .map_err(IdentityProviderError::decode)
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, IdentityProviderError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = PasswordGrantDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let token: TokenResponseDto = decode(response).await?;
        let identity = token
            .user
            .into_identity()
            .map_err(IdentityProviderError::decode)?;
        let access_token = AccessToken::new(token.access_token)
            .ok_or_else(|| IdentityProviderError::decode("empty access token"))?;
        Ok(AuthSession {
            access_token,
            identity,
        })
    }

    async fn sign_up(&self, registration: &Registration) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("signup")?;
        let body = SignUpDto {
            email: registration.email().as_ref(),
            password: registration.password().expose(),
            data: SignUpMetadataDto {
                full_name: registration.full_name(),
            },
        };
        self.send_empty(self.client.post(url).json(&body)).await
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("logout")?;
        self.send_empty(self.client.post(url).bearer_auth(token.expose()))
            .await
    }

    async fn send_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<(), IdentityProviderError> {
        let mut url = self.endpoint("recover")?;
        if let Some(redirect) = &self.settings.reset_redirect {
            url.query_pairs_mut()
                .append_pair("redirect_to", redirect.as_str());
        }
        let body = EmailDto {
            email: email.as_ref(),
        };
        self.send_empty(self.client.post(url).json(&body)).await
    }

    async fn update_password(
        &self,
        token: &AccessToken,
        password: &NewPassword,
    ) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("user")?;
        let body = PasswordDto {
            password: password.expose(),
        };
        self.send_empty(self.client.put(url).bearer_auth(token.expose()).json(&body))
            .await
    }

    async fn resend_confirmation(
        &self,
        email: &EmailAddress,
    ) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("resend")?;
        let body = ResendDto {
            kind: "signup",
            email: email.as_ref(),
        };
        self.send_empty(self.client.post(url).json(&body)).await
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            IdentityProviderError::unavailable(message)
        }
        _ if status.is_client_error() => IdentityProviderError::rejected(message),
        _ => IdentityProviderError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
