//! Role gate for dashboard areas.
//!
//! Every gated handler passes the resolved identity (or `None`) and the area
//! it serves; the gate answers with the actor's profile or an access denial.
//! Denials are ordered: no identity, then missing or unset role, then a role
//! outside the area's allowed set.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::ports::ProfileRepository;
use super::service_support::map_profile_error;
use super::{Error, Identity, Profile, Role, SelectableRole};

/// Path of the onboarding role-selection flow.
pub const CHOOSE_ROLE_PATH: &str = "/auth/choose-role";
/// Path of the sign-in page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Role-specific dashboard areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardArea {
    /// Lesson list and progress for students.
    Student,
    /// Lesson authoring and rosters.
    Teacher,
    /// Parent overview.
    Parent,
    /// User directory.
    Admin,
}

impl DashboardArea {
    /// Roles admitted to the area.
    ///
    /// Admin access is granted only by an explicit `admin` role.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::Student => &[Role::Student],
            Self::Teacher => &[Role::Teacher],
            Self::Parent => &[Role::Parent],
            Self::Admin => &[Role::Admin],
        }
    }

    /// Whether `role` may enter.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Why a gated request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenial {
    /// No identity resolved.
    Unauthenticated,
    /// Profile missing or role unset.
    ProfileIncomplete,
    /// Role outside the area's allowed set.
    RoleMismatch {
        /// The actor's actual role.
        actual: Role,
    },
}

impl AccessDenial {
    /// Where the actor should be sent instead.
    #[must_use]
    pub const fn redirect_path(self) -> &'static str {
        match self {
            Self::Unauthenticated => LOGIN_PATH,
            Self::ProfileIncomplete => CHOOSE_ROLE_PATH,
            Self::RoleMismatch { actual } => actual.dashboard_path(),
        }
    }
}

impl From<AccessDenial> for Error {
    fn from(denial: AccessDenial) -> Self {
        let redirect = Value::String(denial.redirect_path().to_owned());
        let error = match denial {
            AccessDenial::Unauthenticated => Self::unauthorized("sign in required"),
            AccessDenial::ProfileIncomplete => Self::profile_incomplete("choose a role to continue"),
            AccessDenial::RoleMismatch { actual } => {
                Self::role_mismatch(format!("area not available to role {actual}"))
            }
        };
        error.with_detail("redirect", redirect)
    }
}

/// Profile lookup and role gating.
#[derive(Clone)]
pub struct ProfileGate {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileGate {
    /// Create a gate over the profile store.
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Load the profile attached to `identity`, if provisioned.
    pub async fn load_profile(&self, identity: &Identity) -> Result<Option<Profile>, Error> {
        self.profiles
            .find_by_id(identity.id())
            .await
            .map_err(map_profile_error)
    }

    /// Admit the actor to `area` or explain why not.
    ///
    /// # Errors
    /// Store failures surface as their mapped error; denials convert via
    /// [`AccessDenial`].
    pub async fn require_area(
        &self,
        identity: Option<&Identity>,
        area: DashboardArea,
    ) -> Result<Profile, Error> {
        let Some(identity) = identity else {
            return Err(AccessDenial::Unauthenticated.into());
        };
        let profile = self.load_profile(identity).await?;
        Self::admit(profile, area).map_err(|denial| {
            debug!(user_id = %identity.id(), ?area, ?denial, "dashboard access denied");
            Error::from(denial)
        })
    }

    /// Require any profile with a role, for pages shared across roles.
    pub async fn require_any_role(&self, identity: Option<&Identity>) -> Result<Profile, Error> {
        let Some(identity) = identity else {
            return Err(AccessDenial::Unauthenticated.into());
        };
        match self.load_profile(identity).await? {
            Some(profile) if profile.role().is_some() => Ok(profile),
            _ => Err(AccessDenial::ProfileIncomplete.into()),
        }
    }

    /// Pure admission decision.
    pub fn admit(profile: Option<Profile>, area: DashboardArea) -> Result<Profile, AccessDenial> {
        let Some(profile) = profile else {
            return Err(AccessDenial::ProfileIncomplete);
        };
        match profile.role() {
            None => Err(AccessDenial::ProfileIncomplete),
            Some(role) if area.admits(role) => Ok(profile),
            Some(actual) => Err(AccessDenial::RoleMismatch { actual }),
        }
    }

    /// Record the onboarding role choice and return the updated profile.
    pub async fn choose_role(
        &self,
        identity: &Identity,
        role: SelectableRole,
    ) -> Result<Profile, Error> {
        let role = Role::from(role);
        let profile = self
            .profiles
            .assign_role(identity, role)
            .await
            .map_err(map_profile_error)?;
        info!(user_id = %identity.id(), %role, "role selected");
        Ok(profile)
    }

    /// Landing path for `/dashboard`.
    pub async fn dashboard_for(&self, identity: Option<&Identity>) -> Result<&'static str, Error> {
        let Some(identity) = identity else {
            return Ok(LOGIN_PATH);
        };
        let path = self
            .load_profile(identity)
            .await?
            .and_then(|profile| profile.role())
            .map_or(CHOOSE_ROLE_PATH, Role::dashboard_path);
        Ok(path)
    }
}
