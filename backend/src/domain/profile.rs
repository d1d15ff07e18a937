//! Per-identity profile: role, instrument, and display details.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmailAddress, Role, UserId};

/// Maximum length of an instrument label.
pub const INSTRUMENT_MAX: usize = 64;

/// Validation errors for profile values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    /// The instrument label was blank.
    #[error("instrument must not be empty")]
    EmptyInstrument,
    /// The instrument label exceeded [`INSTRUMENT_MAX`].
    #[error("instrument must be at most {max} characters")]
    InstrumentTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Instrument a student learns or a teacher authors lessons for.
///
/// Stored trimmed and lower-cased so catalogue filtering compares like with
/// like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instrument(String);

impl Instrument {
    /// Validate and normalise an instrument label.
    ///
    /// # Examples
    /// ```
    /// use cadence::domain::Instrument;
    ///
    /// assert_eq!(Instrument::new(" Piano ").unwrap().as_ref(), "piano");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProfileValidationError::EmptyInstrument);
        }
        if trimmed.chars().count() > INSTRUMENT_MAX {
            return Err(ProfileValidationError::InstrumentTooLong {
                max: INSTRUMENT_MAX,
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Instrument {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Instrument> for String {
    fn from(value: Instrument) -> Self {
        value.0
    }
}

impl TryFrom<String> for Instrument {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unvalidated-by-type parts used to assemble a [`Profile`].
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    /// Identity the profile belongs to.
    pub id: UserId,
    /// Contact email mirrored from the identity provider.
    pub email: Option<EmailAddress>,
    /// Assigned role; `None` until onboarding completes.
    pub role: Option<Role>,
    /// Instrument for students and teachers.
    pub instrument: Option<Instrument>,
    /// Display name; may be empty.
    pub full_name: String,
    /// Optional avatar image.
    pub avatar_url: Option<String>,
    /// Provisioning timestamp.
    pub created_at: DateTime<Utc>,
}

/// Profile attached one-to-one to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    id: UserId,
    email: Option<EmailAddress>,
    role: Option<Role>,
    instrument: Option<Instrument>,
    full_name: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl Profile {
    /// Assemble a profile from its parts.
    #[must_use]
    pub fn new(draft: ProfileDraft) -> Self {
        let ProfileDraft {
            id,
            email,
            role,
            instrument,
            full_name,
            avatar_url,
            created_at,
        } = draft;
        Self {
            id,
            email,
            role,
            instrument,
            full_name: full_name.trim().to_owned(),
            avatar_url,
            created_at,
        }
    }

    /// Identity identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Contact email, when known.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Assigned role, if onboarding has completed.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Instrument, if one has been recorded.
    #[must_use]
    pub const fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    /// Display name; empty when never provided.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Avatar image URL.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Provisioning timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
