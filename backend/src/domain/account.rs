//! Account flows delegated to the identity provider.
//!
//! Failures reach clients only as the fixed messages below; provider detail is
//! logged and dropped. Sign-up, reset, and resend answer identically for known
//! and unknown addresses.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{IdentityProvider, IdentityProviderError};
use super::service_support::map_identity_error;
use super::{
    AccessToken, AuthSession, EmailAddress, Error, LoginCredentials, NewPassword, Registration,
};

/// Shown for every failed sign-in.
pub const LOGIN_FAILED: &str = "Invalid login credentials.";
/// Shown when the provider cannot be reached for a sign-up.
pub const SIGNUP_FAILED: &str = "Sign-up failed. Please check your details and try again.";
/// Shown after a sign-up was accepted.
pub const SIGNUP_PENDING: &str = "Check your email to confirm your account.";
/// Shown when the provider cannot be reached for a reset.
pub const RESET_FAILED: &str =
    "Failed to send reset email. Please check the address and try again.";
/// Shown after a reset email was requested.
pub const RESET_SENT: &str = "Password reset link sent! Check your email.";
/// Shown when the confirmation field differs.
pub const PASSWORD_MISMATCH: &str = "Passwords do not match. Please try again.";
/// Shown when the provider refused the new password.
pub const PASSWORD_UPDATE_FAILED: &str = "Failed to update password. Please try again.";
/// Shown after a successful password change.
pub const PASSWORD_UPDATED: &str =
    "Password updated successfully! You can now log in with your new password.";
/// Shown after a confirmation resend, whether or not the address is known.
pub const CONFIRMATION_SENT: &str =
    "If that address is awaiting confirmation, a new link is on its way.";
/// Shown when the provider cannot be reached for a resend.
pub const CONFIRMATION_FAILED: &str = "Could not resend the confirmation email. Please try again.";

/// Sign-in, sign-up, and password management.
#[derive(Clone)]
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
}

impl AccountService {
    /// Create the service over `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let session = self
            .provider
            .sign_in(credentials)
            .await
            .map_err(|err| map_identity_error(&err, LOGIN_FAILED))?;
        info!(user_id = %session.identity.id(), "signed in");
        Ok(session)
    }

    /// Register a pending identity; the provider emails a confirmation link.
    ///
    /// Provider rejections (an address that is already registered) are
    /// reported as pending so the response never confirms an account exists.
    pub async fn signup(&self, registration: &Registration) -> Result<&'static str, Error> {
        match self.provider.sign_up(registration).await {
            Ok(()) => info!("sign-up accepted; confirmation pending"),
            Err(err @ IdentityProviderError::Rejected { .. }) => {
                info!(error = %err, "sign-up rejected");
            }
            Err(err) => return Err(map_identity_error(&err, SIGNUP_FAILED)),
        }
        Ok(SIGNUP_PENDING)
    }

    /// Revoke the session token.
    ///
    /// The local session is cleared regardless, so provider failures are only
    /// logged.
    pub async fn logout(&self, token: Option<&AccessToken>) {
        let Some(token) = token else {
            return;
        };
        if let Err(err) = self.provider.sign_out(token).await {
            warn!(error = %err, "sign-out failed at identity provider");
        }
    }

    /// Request a password-reset email.
    ///
    /// Unknown addresses get the same answer as known ones.
    pub async fn send_password_reset(&self, email: &EmailAddress) -> Result<&'static str, Error> {
        match self.provider.send_password_reset(email).await {
            Ok(()) => Ok(RESET_SENT),
            Err(err @ IdentityProviderError::Rejected { .. }) => {
                info!(error = %err, "password reset rejected");
                Ok(RESET_SENT)
            }
            Err(err) => Err(map_identity_error(&err, RESET_FAILED)),
        }
    }

    /// Change the password for the identity behind `token`.
    pub async fn update_password(
        &self,
        token: &AccessToken,
        password: &NewPassword,
    ) -> Result<&'static str, Error> {
        self.provider
            .update_password(token, password)
            .await
            .map_err(|err| map_identity_error(&err, PASSWORD_UPDATE_FAILED))?;
        info!("password updated");
        Ok(PASSWORD_UPDATED)
    }

    /// Resend the sign-up confirmation email.
    ///
    /// Provider rejections are reported as success.
    pub async fn resend_confirmation(&self, email: &EmailAddress) -> Result<&'static str, Error> {
        match self.provider.resend_confirmation(email).await {
            Ok(()) => Ok(CONFIRMATION_SENT),
            Err(err @ IdentityProviderError::Rejected { .. }) => {
                info!(error = %err, "confirmation resend rejected");
                Ok(CONFIRMATION_SENT)
            }
            Err(err) => Err(map_identity_error(&err, CONFIRMATION_FAILED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockIdentityProvider;
    use crate::domain::{ErrorCode, Identity, UserId};
    use rstest::rstest;

    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("ada@example.com", "hunter22").expect("credentials")
    }

    #[rstest]
    #[case(IdentityProviderError::rejected("Invalid login credentials"))]
    #[case(IdentityProviderError::rejected("Email not confirmed"))]
    #[tokio::test]
    async fn login_failures_share_one_message(#[case] failure: IdentityProviderError) {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .return_once(move |_| Err(failure));
        let service = AccountService::new(Arc::new(provider));

        let err = service.login(&credentials()).await.expect_err("rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn login_returns_the_provider_session() {
        let identity = Identity::new(
            UserId::random(),
            EmailAddress::new("ada@example.com").expect("email"),
        );
        let expected = identity.clone();
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_in().return_once(move |_| {
            Ok(AuthSession {
                access_token: AccessToken::new("tok").expect("token"),
                identity,
            })
        });
        let service = AccountService::new(Arc::new(provider));

        let session = service.login(&credentials()).await.expect("session");

        assert_eq!(session.identity, expected);
    }

    #[tokio::test]
    async fn resend_hides_unknown_addresses() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_resend_confirmation()
            .return_once(|_| Err(IdentityProviderError::rejected("User not found")));
        let service = AccountService::new(Arc::new(provider));
        let email = EmailAddress::new("ghost@example.com").expect("email");

        let message = service.resend_confirmation(&email).await.expect("ok");

        assert_eq!(message, CONFIRMATION_SENT);
    }

    #[rstest]
    #[case(Ok(()))]
    #[case(Err(IdentityProviderError::rejected("User not found")))]
    #[tokio::test]
    async fn reset_answers_alike_for_known_and_unknown_addresses(
        #[case] outcome: Result<(), IdentityProviderError>,
    ) {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_send_password_reset()
            .return_once(move |_| outcome);
        let service = AccountService::new(Arc::new(provider));
        let email = EmailAddress::new("ada@example.com").expect("email");

        let message = service.send_password_reset(&email).await.expect("ok");

        assert_eq!(message, RESET_SENT);
    }

    #[tokio::test]
    async fn signup_for_a_registered_address_still_reports_pending() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_up()
            .return_once(|_| Err(IdentityProviderError::rejected("User already registered")));
        let service = AccountService::new(Arc::new(provider));
        let registration =
            Registration::try_from_parts("ada@example.com", "hunter22", "Ada").expect("form");

        let message = service.signup(&registration).await.expect("ok");

        assert_eq!(message, SIGNUP_PENDING);
    }

    #[tokio::test]
    async fn reset_outage_is_unavailable_with_generic_text() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_send_password_reset()
            .return_once(|_| Err(IdentityProviderError::unavailable("502 from upstream")));
        let service = AccountService::new(Arc::new(provider));
        let email = EmailAddress::new("ada@example.com").expect("email");

        let err = service.send_password_reset(&email).await.expect_err("down");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), RESET_FAILED);
    }

    #[tokio::test]
    async fn logout_swallows_provider_failures() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_out()
            .times(1)
            .return_once(|_| Err(IdentityProviderError::unavailable("timeout")));
        let service = AccountService::new(Arc::new(provider));
        let token = AccessToken::new("tok").expect("token");

        service.logout(Some(&token)).await;
    }
}
