//! Driven port for the external identity provider.
//!
//! The provider owns credentials, confirmation emails, and access tokens.
//! Adapters translate its responses into domain identities; raw provider text
//! stays inside [`IdentityProviderError`] and never reaches clients.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, AuthSession, EmailAddress, Identity, LoginCredentials, NewPassword, Registration,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the request (bad credentials, unknown user,
        /// weak password, expired token).
        Rejected { message: String } => "identity provider rejected request: {message}",
        /// The provider could not be reached or failed internally.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// The provider answered with a payload the adapter could not read.
        Decode { message: String } => "identity provider response invalid: {message}",
    }
}

/// Port for authentication and identity lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate `token` with the provider and return its identity.
    ///
    /// Returns `Ok(None)` when the provider no longer recognises the token.
    async fn current_identity(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Identity>, IdentityProviderError>;

    /// Exchange credentials for a session.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, IdentityProviderError>;

    /// Register a pending identity; the provider sends the confirmation email.
    async fn sign_up(&self, registration: &Registration) -> Result<(), IdentityProviderError>;

    /// Revoke `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityProviderError>;

    /// Email a password-reset link.
    async fn send_password_reset(&self, email: &EmailAddress)
    -> Result<(), IdentityProviderError>;

    /// Replace the password of the identity behind `token`.
    async fn update_password(
        &self,
        token: &AccessToken,
        password: &NewPassword,
    ) -> Result<(), IdentityProviderError>;

    /// Resend the sign-up confirmation email.
    async fn resend_confirmation(&self, email: &EmailAddress)
    -> Result<(), IdentityProviderError>;
}
