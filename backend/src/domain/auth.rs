//! Authentication primitives: credentials, registrations, and access tokens.
//!
//! Inbound adapters parse raw form values through these constructors before
//! anything reaches the identity provider port.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Identity, IdentityValidationError};

/// Minimum length accepted for new passwords.
pub const PASSWORD_MIN: usize = 6;

/// Validation failures for authentication inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Email was missing or malformed.
    #[error(transparent)]
    Email(#[from] IdentityValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// New password shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Required minimum.
        min: usize,
    },
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Validated sign-in credentials.
///
/// The password is kept verbatim (no trimming) and zeroed on drop.
///
/// # Examples
/// ```
/// use cadence::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A password that satisfies the minimum-length rule.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a fresh password.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Validate a password together with its confirmation field.
    pub fn confirmed(password: &str, confirm: &str) -> Result<Self, AuthValidationError> {
        if password != confirm {
            return Err(AuthValidationError::PasswordMismatch);
        }
        Self::new(password)
    }

    /// Expose the secret for the provider call.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(**redacted**)")
    }
}

/// Account registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: EmailAddress,
    password: NewPassword,
    full_name: String,
}

impl Registration {
    /// Validate a sign-up form.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: NewPassword::new(password)?,
            full_name: full_name.trim().to_owned(),
        })
    }

    /// Email to register.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to register.
    pub fn password(&self) -> &NewPassword {
        &self.password
    }

    /// Display name passed as provider metadata.
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }
}

/// Opaque bearer token issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token; blank tokens are rejected.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Raw token for transport headers and session storage.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Token to persist in the session cookie.
    pub access_token: AccessToken,
    /// Identity the token belongs to.
    pub identity: Identity,
}
