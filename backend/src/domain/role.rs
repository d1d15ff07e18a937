//! Closed set of account roles and the dashboards they land on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role attached to a profile.
///
/// A profile without a role is represented as `Option<Role>::None`; there is
/// no "unset" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Works through lessons for their instrument.
    Student,
    /// Authors lessons and oversees student progress.
    Teacher,
    /// Observes a linked student.
    Parent,
    /// Operates the user directory.
    Admin,
}

/// Raised when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 4] = [Self::Student, Self::Teacher, Self::Parent, Self::Admin];

    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }

    /// Landing path for the role's dashboard.
    ///
    /// # Examples
    /// ```
    /// use cadence::domain::Role;
    ///
    /// assert_eq!(Role::Teacher.dashboard_path(), "/dashboard/teacher");
    /// ```
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Student => "/dashboard/student",
            Self::Teacher => "/dashboard/teacher",
            Self::Parent => "/dashboard/parent",
            Self::Admin => "/dashboard/admin/users",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Role a user may pick for themselves during onboarding.
///
/// `admin` is deliberately absent: it can only be granted out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectableRole {
    /// See [`Role::Student`].
    Student,
    /// See [`Role::Teacher`].
    Teacher,
    /// See [`Role::Parent`].
    Parent,
}

impl SelectableRole {
    /// Parse a role submitted by the onboarding form.
    pub fn parse(raw: &str) -> Result<Self, UnknownRole> {
        match Role::from_str(raw.trim())? {
            Role::Student => Ok(Self::Student),
            Role::Teacher => Ok(Self::Teacher),
            Role::Parent => Ok(Self::Parent),
            Role::Admin => Err(UnknownRole(raw.to_owned())),
        }
    }
}

impl From<SelectableRole> for Role {
    fn from(value: SelectableRole) -> Self {
        match value {
            SelectableRole::Student => Self::Student,
            SelectableRole::Teacher => Self::Teacher,
            SelectableRole::Parent => Self::Parent,
        }
    }
}
